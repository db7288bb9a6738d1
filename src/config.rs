//! Export and batch configuration.
//!
//! [`ExportConfig`] says *what* a batch produces. [`BatchOptions`] is a
//! builder that threads progress callbacks, cancellation tokens, and other
//! operational settings through a batch run without polluting every
//! function signature.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use gifsplit::{BatchOptions, CancellationToken, ExportConfig, ProgressMailbox};
//!
//! let export = ExportConfig::new()
//!     .with_remove_background(true)
//!     .with_export_animated(true)
//!     .normalized();
//! export.validate()?;
//!
//! let token = CancellationToken::new();
//! let options = BatchOptions::new()
//!     .with_progress(Arc::new(ProgressMailbox::new()))
//!     .with_cancellation(token.clone())
//!     .with_frame_count_cap(500);
//! # Ok::<(), gifsplit::GifSplitError>(())
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::sync::Arc;

use crate::artifact::AnimationOptions;
use crate::error::GifSplitError;
use crate::probe::DEFAULT_FRAME_COUNT_CAP;
use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};

/// Which artifacts a batch produces.
///
/// The default exports still frames only, without background removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportConfig {
    /// Run every frame through the matting engine.
    pub remove_background: bool,
    /// Write every frame as `{base}_frame_{i}.png`.
    pub export_stills: bool,
    /// Write the processed frames as `nobg_{base}.gif`. Only honoured with
    /// background removal.
    pub export_animated: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            remove_background: false,
            export_stills: true,
            export_animated: false,
        }
    }
}

impl ExportConfig {
    /// Create the default configuration (stills only).
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable background removal.
    #[must_use]
    pub fn with_remove_background(mut self, enabled: bool) -> Self {
        self.remove_background = enabled;
        self
    }

    /// Enable or disable still-frame export.
    #[must_use]
    pub fn with_export_stills(mut self, enabled: bool) -> Self {
        self.export_stills = enabled;
        self
    }

    /// Enable or disable animated re-export.
    #[must_use]
    pub fn with_export_animated(mut self, enabled: bool) -> Self {
        self.export_animated = enabled;
        self
    }

    /// Apply the option coupling rules.
    ///
    /// Without background removal the only meaningful output is still
    /// frames, so `export_stills` is forced on and `export_animated` off.
    /// With background removal the flags are kept as given.
    #[must_use]
    pub fn normalized(self) -> Self {
        if self.remove_background {
            self
        } else {
            Self {
                remove_background: false,
                export_stills: true,
                export_animated: false,
            }
        }
    }

    /// Check that the configuration produces at least one artifact.
    ///
    /// # Errors
    ///
    /// Returns [`GifSplitError::Config`] when background removal is enabled
    /// but neither stills nor the animation is selected.
    pub fn validate(&self) -> Result<(), GifSplitError> {
        if self.remove_background && !(self.export_stills || self.export_animated) {
            return Err(GifSplitError::Config(
                "select at least one export option (PNG frames or GIF)".to_string(),
            ));
        }
        Ok(())
    }

    /// `true` when the animated re-export will actually be written.
    pub fn writes_animation(&self) -> bool {
        self.remove_background && self.export_animated
    }

    /// Name of the output subdirectory for this configuration.
    pub fn output_dir_name(&self) -> &'static str {
        if self.remove_background {
            "nobg_converted"
        } else {
            "converted"
        }
    }
}

/// Operational settings for a batch run.
///
/// All fields have sensible defaults; a default-constructed value reports
/// progress nowhere, is never cancelled, caps frame counting at 1000, and
/// writes next to the first input.
#[derive(Clone)]
pub struct BatchOptions {
    /// Progress observer. Defaults to a no-op.
    pub(crate) progress: Arc<dyn ProgressCallback>,
    /// Cancellation token. `None` means never cancelled.
    pub(crate) cancellation: Option<CancellationToken>,
    /// Frames counted before the reported count is capped.
    pub(crate) frame_count_cap: usize,
    /// Directory receiving the `converted` / `nobg_converted` folder.
    /// `None` uses the first input's parent directory.
    pub(crate) output_root: Option<PathBuf>,
    /// Encoder settings for the animated re-export.
    pub(crate) animation: AnimationOptions,
}

impl Debug for BatchOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("BatchOptions")
            .field("has_progress", &true)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("frame_count_cap", &self.frame_count_cap)
            .field("output_root", &self.output_root)
            .field("animation", &self.animation)
            .finish()
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            frame_count_cap: DEFAULT_FRAME_COUNT_CAP,
            output_root: None,
            animation: AnimationOptions::default(),
        }
    }

    /// Attach a progress observer.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    ///
    /// When the token is cancelled the batch stops before the next frame or
    /// file and marks the remaining files as cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set how many frames are counted before the reported frame count is
    /// capped. Decoding always continues to the real end of each file.
    /// Clamped to a minimum of 1.
    #[must_use]
    pub fn with_frame_count_cap(mut self, cap: usize) -> Self {
        self.frame_count_cap = cap.max(1);
        self
    }

    /// Write artifacts under `root` instead of the first input's directory.
    #[must_use]
    pub fn with_output_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.output_root = Some(root.into());
        self
    }

    /// Set encoder settings for the animated re-export.
    #[must_use]
    pub fn with_animation(mut self, animation: AnimationOptions) -> Self {
        self.animation = animation;
        self
    }

    /// Returns `true` if cancellation has been requested.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
