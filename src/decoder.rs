//! Lazy, pull-based GIF frame decoding.
//!
//! [`FrameDecoder::open`] probes a GIF for its [`SequenceMetadata`] and
//! returns a [`FrameIterator`] that decodes one frame per call to
//! [`next()`](Iterator::next). Each frame is composited onto the logical
//! screen (honouring the source's own disposal methods) and normalized to
//! RGBA before it is yielded, so downstream stages never see palette or
//! colour-mode differences.
//!
//! # Example
//!
//! ```no_run
//! use gifsplit::FrameDecoder;
//!
//! let (metadata, frames) = FrameDecoder::open("dance.gif")?;
//! for frame in frames {
//!     let frame = frame?;
//!     println!("frame {}/{}", frame.index() + 1, metadata.frame_count);
//! }
//! # Ok::<(), gifsplit::GifSplitError>(())
//! ```

use std::path::{Path, PathBuf};

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, Frames};

use crate::conversion::normalize_rgba;
use crate::error::GifSplitError;
use crate::frame::Frame;
use crate::metadata::SequenceMetadata;
use crate::probe::{DEFAULT_FRAME_COUNT_CAP, GifProbe, open_gif};

/// Opens GIF sources for frame-by-frame decoding.
pub struct FrameDecoder;

impl FrameDecoder {
    /// Open `path` with the default frame-count cap.
    ///
    /// # Errors
    ///
    /// Returns [`GifSplitError::Decode`] if the file cannot be opened or is
    /// not a GIF.
    pub fn open<P: AsRef<Path>>(
        path: P,
    ) -> Result<(SequenceMetadata, FrameIterator), GifSplitError> {
        Self::open_with_cap(path, DEFAULT_FRAME_COUNT_CAP)
    }

    /// Open `path`, counting at most `frame_count_cap` frames for the
    /// reported metadata. The iterator itself always runs to the real end
    /// of the stream.
    pub fn open_with_cap<P: AsRef<Path>>(
        path: P,
        frame_count_cap: usize,
    ) -> Result<(SequenceMetadata, FrameIterator), GifSplitError> {
        let path = path.as_ref();
        let metadata = GifProbe::probe_with_cap(path, frame_count_cap)?;

        let reader = open_gif(path)?;
        let decoder = GifDecoder::new(reader).map_err(|e| GifSplitError::decode(path, e))?;

        log::debug!(
            "Opened {path:?} for decoding ({} frame(s){}, {} ms delay)",
            metadata.frame_count,
            if metadata.frame_count_exact { "" } else { ", capped" },
            metadata.frame_delay_ms,
        );

        let iterator = FrameIterator {
            path: path.to_path_buf(),
            frames: decoder.into_frames(),
            declared_total: metadata.frame_count,
            next_index: 0,
            done: false,
        };
        Ok((metadata, iterator))
    }
}

/// A lazy, forward-only iterator over the frames of one GIF.
///
/// Not restartable: open the file again to decode it a second time. After
/// the first error the iterator is fused and yields `None`.
pub struct FrameIterator {
    path: PathBuf,
    frames: Frames<'static>,
    declared_total: usize,
    next_index: usize,
    done: bool,
}

impl FrameIterator {
    /// Frame count declared by the metadata this iterator was opened with.
    pub fn declared_total(&self) -> usize {
        self.declared_total
    }

    /// Number of frames yielded so far.
    pub fn decoded(&self) -> usize {
        self.next_index
    }
}

impl Iterator for FrameIterator {
    type Item = Result<Frame, GifSplitError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.frames.next() {
            Some(Ok(decoded)) => {
                let image = normalize_rgba(DynamicImage::ImageRgba8(decoded.into_buffer()));
                let frame = Frame::new(self.next_index, self.declared_total, image);
                self.next_index += 1;
                Some(Ok(frame))
            }
            Some(Err(e)) => {
                self.done = true;
                Some(Err(GifSplitError::decode(
                    &self.path,
                    format!("frame {}: {e}", self.next_index),
                )))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}
