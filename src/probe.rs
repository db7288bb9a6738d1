//! Lightweight GIF probing.
//!
//! [`GifProbe`] reads a GIF's frame descriptors without keeping pixel data,
//! producing the [`SequenceMetadata`] the pipeline needs before decoding
//! starts. GIF has no header field holding the frame count, so the count is
//! discovered by walking the stream up to a cap.
//!
//! # Example
//!
//! ```no_run
//! use gifsplit::GifProbe;
//!
//! let metadata = GifProbe::probe("dance.gif")?;
//! println!(
//!     "{} frames, {} ms/frame, {}x{}",
//!     metadata.frame_count, metadata.frame_delay_ms, metadata.width, metadata.height,
//! );
//! # Ok::<(), gifsplit::GifSplitError>(())
//! ```

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use image::ImageFormat;

use crate::conversion::centiseconds_to_ms;
use crate::error::GifSplitError;
use crate::metadata::SequenceMetadata;

/// Frames counted before giving up on an exact count.
pub const DEFAULT_FRAME_COUNT_CAP: usize = 1000;

/// Lightweight GIF probe.
pub struct GifProbe;

impl GifProbe {
    /// Probe a GIF with the default frame-count cap.
    ///
    /// # Errors
    ///
    /// Returns [`GifSplitError::Decode`] if the file cannot be opened, is not
    /// a GIF, or its stream is malformed before the first frame.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<SequenceMetadata, GifSplitError> {
        Self::probe_with_cap(path, DEFAULT_FRAME_COUNT_CAP)
    }

    /// Probe a GIF, counting at most `cap` frames.
    ///
    /// When the cap is reached the reported `frame_count` is the cap and
    /// `frame_count_exact` is `false`.
    pub fn probe_with_cap<P: AsRef<Path>>(
        path: P,
        cap: usize,
    ) -> Result<SequenceMetadata, GifSplitError> {
        let path = path.as_ref();
        let cap = cap.max(1);
        let mut reader = open_gif(path)?;

        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::Indexed);
        let mut decoder = options
            .read_info(&mut reader)
            .map_err(|e| GifSplitError::decode(path, e))?;

        let width = u32::from(decoder.width());
        let height = u32::from(decoder.height());
        let mut first_delay = None;
        let mut counted = 0_usize;
        let mut exact = true;

        loop {
            let info = match decoder.next_frame_info() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                // A truncated tail still leaves the frames before it usable.
                Err(e) if counted > 0 => {
                    log::warn!("Stopped counting frames in {path:?} after {counted}: {e}");
                    break;
                }
                Err(e) => return Err(GifSplitError::decode(path, e)),
            };
            if first_delay.is_none() {
                first_delay = Some(info.delay);
            }
            counted += 1;
            if counted >= cap {
                exact = decoder.next_frame_info().map(|f| f.is_none()).unwrap_or(true);
                break;
            }
        }

        if counted == 0 {
            return Err(GifSplitError::decode(path, "GIF contains no frames"));
        }

        let metadata = SequenceMetadata {
            frame_count: counted,
            frame_count_exact: exact,
            frame_delay_ms: centiseconds_to_ms(first_delay.unwrap_or(0)),
            width,
            height,
        };
        log::debug!("Probed {path:?}: {metadata:?}");
        Ok(metadata)
    }

    /// Probe several GIFs. Failures produce an `Err` entry rather than
    /// aborting the others.
    pub fn probe_many<P: AsRef<Path>>(paths: &[P]) -> Vec<Result<SequenceMetadata, GifSplitError>> {
        paths.iter().map(|path| Self::probe(path)).collect()
    }
}

/// Open `path` and check its signature is GIF, leaving the reader at the
/// start of the file.
pub(crate) fn open_gif(path: &Path) -> Result<BufReader<File>, GifSplitError> {
    let mut file = File::open(path).map_err(|e| GifSplitError::decode(path, e))?;

    let mut signature = Vec::with_capacity(6);
    (&mut file)
        .take(6)
        .read_to_end(&mut signature)
        .map_err(|e| GifSplitError::decode(path, e))?;
    match image::guess_format(&signature) {
        Ok(ImageFormat::Gif) => {}
        Ok(other) => {
            return Err(GifSplitError::decode(
                path,
                format!("unsupported container: {other:?} (only GIF is supported)"),
            ));
        }
        Err(_) => {
            return Err(GifSplitError::decode(
                path,
                "unsupported container: not a GIF file",
            ));
        }
    }

    file.rewind().map_err(|e| GifSplitError::decode(path, e))?;
    Ok(BufReader::new(file))
}
