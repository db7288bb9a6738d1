//! Per-frame transform pipeline.
//!
//! [`FrameTransformPipeline`] pulls frames from a decoder in container
//! order, runs each through the matting engine when background removal is
//! enabled, and collects the results into a [`FrameSequence`]. It reports
//! after every frame through a caller-supplied hook, which is also where a
//! batch checks for cancellation.

use std::sync::Arc;

use crate::config::ExportConfig;
use crate::error::GifSplitError;
use crate::frame::{Frame, FrameSequence};
use crate::matting::BackgroundMatter;
use crate::metadata::SequenceMetadata;

/// Decode → matte → collect, one frame at a time.
#[derive(Clone)]
pub struct FrameTransformPipeline {
    matter: Arc<dyn BackgroundMatter>,
}

impl FrameTransformPipeline {
    /// Create a pipeline using `matter` for background removal.
    pub fn new(matter: Arc<dyn BackgroundMatter>) -> Self {
        Self { matter }
    }

    /// The matting engine this pipeline uses.
    pub fn matter(&self) -> &Arc<dyn BackgroundMatter> {
        &self.matter
    }

    /// Process every frame yielded by `frames`.
    ///
    /// `after_frame` is called with the index of each frame once it has been
    /// collected; returning an error (typically
    /// [`GifSplitError::Cancelled`]) stops processing.
    ///
    /// # Errors
    ///
    /// The first decode, matting, or hook error aborts the file; the
    /// partially built sequence is dropped.
    pub fn process<I, F>(
        &self,
        frames: I,
        metadata: &SequenceMetadata,
        config: &ExportConfig,
        mut after_frame: F,
    ) -> Result<FrameSequence, GifSplitError>
    where
        I: IntoIterator<Item = Result<Frame, GifSplitError>>,
        F: FnMut(usize) -> Result<(), GifSplitError>,
    {
        let mut sequence = FrameSequence::with_capacity(metadata.frame_count);

        for frame in frames {
            let frame = frame?;
            let index = frame.index();
            let frame = if config.remove_background {
                self.transform(&frame)?
            } else {
                frame
            };
            sequence.push(frame);
            after_frame(index)?;
        }

        if sequence.len() != metadata.frame_count {
            log::debug!(
                "Collected {} frame(s), {} declared",
                sequence.len(),
                metadata.frame_count
            );
        }
        Ok(sequence)
    }

    fn transform(&self, frame: &Frame) -> Result<Frame, GifSplitError> {
        let matted = self.matter.matte(frame).map_err(|e| {
            if matches!(e, GifSplitError::Matting { .. }) {
                e
            } else {
                GifSplitError::matting(frame.index(), e)
            }
        })?;
        if matted.image().dimensions() != frame.image().dimensions() {
            return Err(GifSplitError::matting(
                frame.index(),
                format!(
                    "engine {} changed frame size from {}x{} to {}x{}",
                    self.matter.name(),
                    frame.width(),
                    frame.height(),
                    matted.width(),
                    matted.height(),
                ),
            ));
        }
        Ok(matted)
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::matting::{ColorKeyMatter, UnavailableMatter};

    fn metadata(frame_count: usize) -> SequenceMetadata {
        SequenceMetadata {
            frame_count,
            frame_count_exact: true,
            frame_delay_ms: 100,
            width: 2,
            height: 2,
        }
    }

    fn frames(count: usize) -> Vec<Result<Frame, GifSplitError>> {
        (0..count)
            .map(|i| {
                let mut image = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255]));
                image.put_pixel(1, 1, Rgba([i as u8, 0, 0, 255]));
                Ok(Frame::new(i, count, image))
            })
            .collect()
    }

    #[test]
    fn collects_in_order_and_reports_each_frame() {
        let pipeline = FrameTransformPipeline::new(Arc::new(UnavailableMatter));
        let mut seen = Vec::new();
        let sequence = pipeline
            .process(frames(3), &metadata(3), &ExportConfig::default(), |i| {
                seen.push(i);
                Ok(())
            })
            .unwrap();

        assert_eq!(seen, vec![0, 1, 2]);
        let indices: Vec<usize> = sequence.iter().map(Frame::index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn mattes_when_enabled() {
        let pipeline = FrameTransformPipeline::new(Arc::new(ColorKeyMatter::new()));
        let config = ExportConfig::new().with_remove_background(true);
        let sequence = pipeline
            .process(frames(2), &metadata(2), &config, |_| Ok(()))
            .unwrap();

        for frame in &sequence {
            assert_eq!(frame.image().get_pixel(0, 0).0[3], 0);
            assert_eq!(frame.image().get_pixel(1, 1).0[3], 255);
        }
    }

    #[test]
    fn matting_failure_aborts_file() {
        let pipeline = FrameTransformPipeline::new(Arc::new(UnavailableMatter));
        let config = ExportConfig::new().with_remove_background(true);
        let mut calls = 0;
        let result = pipeline.process(frames(3), &metadata(3), &config, |_| {
            calls += 1;
            Ok(())
        });

        assert!(matches!(result, Err(GifSplitError::Matting { frame_index: 0, .. })));
        assert_eq!(calls, 0);
    }

    #[test]
    fn hook_error_stops_processing() {
        let pipeline = FrameTransformPipeline::new(Arc::new(UnavailableMatter));
        let result = pipeline.process(frames(5), &metadata(5), &ExportConfig::default(), |i| {
            if i == 1 {
                Err(GifSplitError::Cancelled)
            } else {
                Ok(())
            }
        });
        assert!(matches!(result, Err(GifSplitError::Cancelled)));
    }

    #[test]
    fn keeps_frames_past_declared_count() {
        let pipeline = FrameTransformPipeline::new(Arc::new(UnavailableMatter));
        let sequence = pipeline
            .process(frames(4), &metadata(2), &ExportConfig::default(), |_| Ok(()))
            .unwrap();
        assert_eq!(sequence.len(), 4);
    }
}
