//! Artifact writing: still PNG frames and the re-encoded animation.
//!
//! [`ArtifactWriter`] turns a processed [`FrameSequence`] into files inside
//! an output directory:
//!
//! - `{base}_frame_{i}.png` for every frame when stills are enabled;
//! - `nobg_{base}.gif` when background removal and animated export are both
//!   enabled. The animation loops forever, uses the source's first-frame
//!   delay for every frame, and clears each frame to the background before
//!   the next is drawn so transparent regions do not show earlier frames.
//!
//! Writes are independent: a failure part-way through a file's stills leaves
//! the frames already written in place.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use gifsplit::{
//!     ArtifactWriter, ExportConfig, FrameDecoder, FrameTransformPipeline, SourceFile,
//!     UnavailableMatter, output_directory,
//! };
//!
//! let source = SourceFile::new("dance.gif");
//! let config = ExportConfig::default();
//! let (metadata, frames) = FrameDecoder::open(source.path())?;
//! let sequence = FrameTransformPipeline::new(Arc::new(UnavailableMatter))
//!     .process(frames, &metadata, &config, |_| Ok(()))?;
//!
//! let dir = output_directory(&source, &config);
//! let written = ArtifactWriter::new().write(&source, &sequence, &metadata, &config, &dir)?;
//! println!("wrote {} file(s)", written.len());
//! # Ok::<(), gifsplit::GifSplitError>(())
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use gif::{DisposalMethod, Encoder, Repeat};
use image::ImageFormat;

use crate::config::ExportConfig;
use crate::conversion::ms_to_centiseconds;
use crate::error::GifSplitError;
use crate::frame::FrameSequence;
use crate::metadata::SequenceMetadata;
use crate::source::SourceFile;

/// Encoder settings for the animated re-export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationOptions {
    /// How many times the GIF repeats. `None` loops forever.
    pub repeat: Option<u16>,
    /// Palette quantizer speed, 1 (best) to 30 (fastest). Default 10.
    pub quantizer_speed: i32,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            repeat: None,
            quantizer_speed: 10,
        }
    }
}

impl AnimationOptions {
    /// Create default options (infinite loop, speed 10).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the repeat count. `None` means loop forever.
    #[must_use]
    pub fn with_repeat(mut self, repeat: Option<u16>) -> Self {
        self.repeat = repeat;
        self
    }

    /// Set the quantizer speed, clamped to 1..=30.
    #[must_use]
    pub fn with_quantizer_speed(mut self, speed: i32) -> Self {
        self.quantizer_speed = speed.clamp(1, 30);
        self
    }
}

/// Name of the still image for frame `index` of `base_name`.
pub fn still_file_name(base_name: &str, index: usize) -> String {
    format!("{base_name}_frame_{index}.png")
}

/// Name of the re-encoded animation for `base_name`.
pub fn animation_file_name(base_name: &str) -> String {
    format!("nobg_{base_name}.gif")
}

/// Output directory for a batch whose first input is `first_source`:
/// `converted` (or `nobg_converted` with background removal) next to it.
pub fn output_directory(first_source: &SourceFile, config: &ExportConfig) -> PathBuf {
    output_directory_in(&first_source.parent_dir(), config)
}

/// Output directory for `config` under an explicit `root`.
pub fn output_directory_in(root: &Path, config: &ExportConfig) -> PathBuf {
    root.join(config.output_dir_name())
}

/// Writes the artifacts of one processed file.
#[derive(Debug, Clone, Default)]
pub struct ArtifactWriter {
    animation: AnimationOptions,
}

impl ArtifactWriter {
    /// Create a writer with default animation settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with the given animation settings.
    pub fn with_animation(animation: AnimationOptions) -> Self {
        Self { animation }
    }

    /// Write every artifact `config` asks for and return their paths.
    ///
    /// # Errors
    ///
    /// Returns [`GifSplitError::Write`] for the first artifact (or the
    /// output directory) that could not be written.
    pub fn write(
        &self,
        source: &SourceFile,
        sequence: &FrameSequence,
        metadata: &SequenceMetadata,
        config: &ExportConfig,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, GifSplitError> {
        let mut written = Vec::new();
        if config.export_stills {
            written.extend(self.write_stills(source.base_name(), sequence, output_dir)?);
        }
        if config.writes_animation() {
            written.push(self.write_animation(
                source.base_name(),
                sequence,
                metadata.frame_delay_ms,
                output_dir,
            )?);
        }
        Ok(written)
    }

    /// Write each frame as a numbered PNG. Existing files are overwritten.
    pub fn write_stills(
        &self,
        base_name: &str,
        sequence: &FrameSequence,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, GifSplitError> {
        ensure_dir(output_dir)?;
        log::debug!(
            "Writing {} PNG frame(s) for {base_name} to {output_dir:?}",
            sequence.len()
        );

        let mut written = Vec::with_capacity(sequence.len());
        for frame in sequence {
            let path = output_dir.join(still_file_name(base_name, frame.index()));
            frame
                .image()
                .save_with_format(&path, ImageFormat::Png)
                .map_err(|e| GifSplitError::write(&path, e))?;
            written.push(path);
        }
        Ok(written)
    }

    /// Re-encode `sequence` as a looping GIF with a uniform `delay_ms`.
    pub fn write_animation(
        &self,
        base_name: &str,
        sequence: &FrameSequence,
        delay_ms: u32,
        output_dir: &Path,
    ) -> Result<PathBuf, GifSplitError> {
        ensure_dir(output_dir)?;
        let path = output_dir.join(animation_file_name(base_name));
        log::debug!(
            "Encoding {} frame(s) to {path:?} (delay={delay_ms} ms, repeat={:?})",
            sequence.len(),
            self.animation.repeat,
        );
        self.encode_gif(&path, sequence, delay_ms)?;
        Ok(path)
    }

    fn encode_gif(
        &self,
        path: &Path,
        sequence: &FrameSequence,
        delay_ms: u32,
    ) -> Result<(), GifSplitError> {
        let Some(first) = sequence.frames().first() else {
            return Err(GifSplitError::write(path, "no frames to encode"));
        };
        let width = gif_dimension(path, first.width())?;
        let height = gif_dimension(path, first.height())?;

        let file = File::create(path).map_err(|e| GifSplitError::write(path, e))?;
        let mut encoder = Encoder::new(BufWriter::new(file), width, height, &[])
            .map_err(|e| GifSplitError::write(path, format!("failed to create GIF encoder: {e}")))?;

        let repeat = match self.animation.repeat {
            None => Repeat::Infinite,
            Some(n) => Repeat::Finite(n),
        };
        encoder
            .set_repeat(repeat)
            .map_err(|e| GifSplitError::write(path, format!("failed to set GIF repeat: {e}")))?;

        let delay = ms_to_centiseconds(delay_ms);
        let speed = self.animation.quantizer_speed.clamp(1, 30);
        for frame in sequence {
            if (frame.width(), frame.height()) != (first.width(), first.height()) {
                return Err(GifSplitError::write(
                    path,
                    format!(
                        "frame {} is {}x{}, expected {}x{}",
                        frame.index(),
                        frame.width(),
                        frame.height(),
                        first.width(),
                        first.height(),
                    ),
                ));
            }

            let mut pixels = frame.image().as_raw().clone();
            let mut gif_frame = gif::Frame::from_rgba_speed(width, height, &mut pixels, speed);
            gif_frame.delay = delay;
            gif_frame.dispose = DisposalMethod::Background;

            encoder.write_frame(&gif_frame).map_err(|e| {
                GifSplitError::write(path, format!("failed to write frame {}: {e}", frame.index()))
            })?;
        }

        let mut writer = encoder
            .into_inner()
            .map_err(|e| GifSplitError::write(path, e))?;
        writer.flush().map_err(|e| GifSplitError::write(path, e))?;
        Ok(())
    }
}

fn ensure_dir(dir: &Path) -> Result<(), GifSplitError> {
    fs::create_dir_all(dir).map_err(|e| GifSplitError::write(dir, e))
}

fn gif_dimension(path: &Path, value: u32) -> Result<u16, GifSplitError> {
    u16::try_from(value).map_err(|_| {
        GifSplitError::write(path, format!("dimension {value} exceeds the GIF limit of 65535"))
    })
}
