//! # gifsplit
//!
//! Batch-convert animated GIFs into still frames and, optionally,
//! background-free re-encoded animations.
//!
//! `gifsplit` decodes each GIF lazily into RGBA frames, optionally runs every
//! frame through a pluggable [`BackgroundMatter`], and writes the results as
//! numbered PNG stills and/or a looping `nobg_*.gif`. A batch processes files
//! strictly in order on one worker, reports progress after every frame, and
//! keeps going when a single file fails.
//!
//! ## Quick Start
//!
//! ### Split GIFs into PNG frames
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use gifsplit::{BatchCoordinator, ExportConfig, UnavailableMatter};
//!
//! let coordinator = BatchCoordinator::new(Arc::new(UnavailableMatter));
//! let report = coordinator.run(&["gifs/dance.gif", "gifs/wave.gif"], ExportConfig::default())?;
//! // gifs/converted/dance_frame_0.png, dance_frame_1.png, ...
//! println!("{report}");
//! # Ok::<(), gifsplit::GifSplitError>(())
//! ```
//!
//! ### Remove backgrounds and re-encode
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use gifsplit::{BatchCoordinator, ColorKeyMatter, ExportConfig};
//!
//! let coordinator = BatchCoordinator::new(Arc::new(ColorKeyMatter::new().with_tolerance(20)));
//! let config = ExportConfig::new()
//!     .with_remove_background(true)
//!     .with_export_animated(true);
//! // gifs/nobg_converted/dance_frame_*.png and gifs/nobg_converted/nobg_dance.gif
//! coordinator.run(&["gifs/dance.gif"], config)?;
//! # Ok::<(), gifsplit::GifSplitError>(())
//! ```
//!
//! ## Features
//!
//! - **Lazy decoding**: [`FrameDecoder`] yields composited RGBA frames one
//!   at a time; [`GifProbe`] reads frame count and delay without pixels
//! - **Pluggable matting**: any [`BackgroundMatter`]; the built-in
//!   [`ColorKeyMatter`] keys out flat backgrounds, and
//!   [`UnavailableMatter`] represents an environment without an engine
//! - **Artifacts**: `{base}_frame_{i}.png` stills and `nobg_{base}.gif`
//!   animations with background disposal and infinite looping
//! - **Progress & cancellation**: per-frame [`ProgressInfo`] through a
//!   [`ProgressCallback`], a latest-value [`ProgressMailbox`], and
//!   `CancellationToken` checked between frames
//! - **Partial failure**: per-file [`FileOutcome`]s aggregated into a
//!   [`BatchReport`]

pub mod artifact;
pub mod batch;
pub mod config;
mod conversion;
pub mod decoder;
pub mod error;
pub mod frame;
pub mod matting;
pub mod metadata;
pub mod pipeline;
pub mod probe;
pub mod progress;
pub mod source;

pub use artifact::{
    AnimationOptions, ArtifactWriter, animation_file_name, output_directory, output_directory_in,
    still_file_name,
};
pub use batch::{BatchCoordinator, BatchHandle, BatchReport, BatchState, FileOutcome, FileResult};
pub use config::{BatchOptions, ExportConfig};
pub use conversion::normalize_rgba;
pub use decoder::{FrameDecoder, FrameIterator};
pub use error::{ErrorKind, GifSplitError};
pub use frame::{Frame, FrameSequence};
pub use matting::{BackgroundMatter, ColorKeyMatter, UnavailableMatter};
pub use metadata::{DEFAULT_FRAME_DELAY_MS, SequenceMetadata};
pub use pipeline::FrameTransformPipeline;
pub use probe::{DEFAULT_FRAME_COUNT_CAP, GifProbe};
pub use progress::{
    CancellationToken, ProgressCallback, ProgressInfo, ProgressMailbox, progress_percent,
};
pub use source::{SourceFile, discover_gifs};
