//! Error types for the `gifsplit` crate.
//!
//! This module defines [`GifSplitError`], the unified error type returned by
//! all fallible operations in the crate. The variants follow the batch's
//! failure taxonomy: configuration errors reject a whole batch up front,
//! while decode, matting, and write errors are scoped to a single file and
//! never stop the batch.

use std::{io::Error as IoError, path::PathBuf};

use image::ImageError;
use thiserror::Error;

/// The unified error type for all `gifsplit` operations.
///
/// Every public method that can fail returns `Result<T, GifSplitError>`.
/// Variants carry enough context (paths, frame indices, upstream messages)
/// to be shown to an operator verbatim.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GifSplitError {
    /// The export configuration is invalid. The batch is rejected before
    /// any file is opened or any directory is created.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A source file could not be opened or is not a supported container.
    #[error("Failed to decode {path}: {reason}")]
    Decode {
        /// Path of the source file.
        path: PathBuf,
        /// Underlying reason the decode failed.
        reason: String,
    },

    /// The matting engine failed on a frame.
    #[error("Background removal failed on frame {frame_index}: {reason}")]
    Matting {
        /// Zero-based index of the frame being matted.
        frame_index: usize,
        /// Message reported by the engine.
        reason: String,
    },

    /// An artifact could not be written.
    #[error("Failed to write {path}: {reason}")]
    Write {
        /// Path of the artifact (or directory) that could not be written.
        path: PathBuf,
        /// Underlying reason the write failed.
        reason: String,
    },

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,

    /// An I/O error occurred outside of a specific artifact write.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate.
    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),
}

/// Coarse classification of a [`GifSplitError`].
///
/// Used by [`FileOutcome::Failed`](crate::FileOutcome) so callers can group
/// failures without matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid option combination.
    Config,
    /// Unreadable, corrupt, or unsupported source.
    Decode,
    /// Matting engine failure.
    Matting,
    /// Artifact could not be written.
    Write,
    /// Cancelled by the caller.
    Cancelled,
    /// Anything else (raw I/O or image errors).
    Other,
}

impl GifSplitError {
    /// Build a [`GifSplitError::Decode`] for `path`.
    pub fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`GifSplitError::Write`] for `path`.
    pub fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Write {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`GifSplitError::Matting`] for the frame at `frame_index`.
    pub fn matting(frame_index: usize, reason: impl ToString) -> Self {
        Self::Matting {
            frame_index,
            reason: reason.to_string(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GifSplitError::Config(_) => ErrorKind::Config,
            GifSplitError::Decode { .. } => ErrorKind::Decode,
            GifSplitError::Matting { .. } => ErrorKind::Matting,
            GifSplitError::Write { .. } => ErrorKind::Write,
            GifSplitError::Cancelled => ErrorKind::Cancelled,
            GifSplitError::Io(_) | GifSplitError::Image(_) => ErrorKind::Other,
        }
    }
}
