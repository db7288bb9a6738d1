//! Pluggable background matting.
//!
//! A [`BackgroundMatter`] takes one frame and returns a new frame whose
//! background pixels are transparent. The capability is optional: an
//! environment without a matting engine runs with [`UnavailableMatter`],
//! whose [`is_available`](BackgroundMatter::is_available) probe returns
//! `false`, and the batch rejects background removal up front instead of
//! failing frame by frame.
//!
//! [`ColorKeyMatter`] is the built-in engine. It keys out one background
//! colour, either fixed or sampled from the frame's corners, which suits the
//! flat backgrounds typical of sprite and sticker animations.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use gifsplit::{BackgroundMatter, BatchCoordinator, ColorKeyMatter};
//!
//! let matter: Arc<dyn BackgroundMatter> = Arc::new(ColorKeyMatter::new().with_tolerance(24));
//! let coordinator = BatchCoordinator::new(matter);
//! assert!(coordinator.matting_available());
//! ```

use image::Rgba;

use crate::error::GifSplitError;
use crate::frame::Frame;

/// A matting engine.
///
/// Implementations must be [`Send`] and [`Sync`] because the batch runs on
/// a worker thread. `matte` must not modify its input; it returns a new
/// frame at the same index.
pub trait BackgroundMatter: Send + Sync {
    /// Short engine name for logs and status output.
    fn name(&self) -> &str;

    /// Whether this engine can actually matte frames.
    fn is_available(&self) -> bool {
        true
    }

    /// Produce a copy of `frame` with background pixels made transparent.
    ///
    /// # Errors
    ///
    /// Returns [`GifSplitError::Matting`] on engine failure.
    fn matte(&self, frame: &Frame) -> Result<Frame, GifSplitError>;
}

/// Stand-in used when no matting engine is installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableMatter;

impl BackgroundMatter for UnavailableMatter {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn matte(&self, frame: &Frame) -> Result<Frame, GifSplitError> {
        Err(GifSplitError::matting(
            frame.index(),
            "no matting engine is available",
        ))
    }
}

/// Colour-key matting engine.
///
/// Pixels whose largest per-channel difference from the key colour is at
/// most `tolerance` become fully transparent; every other pixel is copied
/// unchanged. Deterministic: the same frame always produces the same output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorKeyMatter {
    /// Maximum per-channel distance from the key that counts as background.
    pub tolerance: u8,
    /// Fixed key colour. `None` samples the most common corner colour of
    /// each frame.
    pub key: Option<[u8; 3]>,
}

impl Default for ColorKeyMatter {
    fn default() -> Self {
        Self {
            tolerance: 16,
            key: None,
        }
    }
}

impl ColorKeyMatter {
    /// Create a matter that samples its key from frame corners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-channel tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: u8) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Key out a fixed colour instead of sampling corners.
    #[must_use]
    pub fn with_key(mut self, key: [u8; 3]) -> Self {
        self.key = Some(key);
        self
    }

    fn key_for(&self, frame: &Frame) -> Option<[u8; 3]> {
        if let Some(key) = self.key {
            return Some(key);
        }
        let image = frame.image();
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return None;
        }

        // Already-transparent corners say nothing about the background colour.
        let samples: Vec<[u8; 3]> = [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1)]
            .into_iter()
            .map(|(x, y)| image.get_pixel(x, y).0)
            .filter(|&[_, _, _, a]| a > 0)
            .map(|[r, g, b, _]| [r, g, b])
            .collect();

        // Most frequent corner colour; ties go to the first in scan order.
        let mut best: Option<([u8; 3], usize)> = None;
        for rgb in &samples {
            let count = samples.iter().filter(|other| *other == rgb).count();
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((*rgb, count));
            }
        }
        best.map(|(rgb, _)| rgb)
    }

    fn is_background(&self, pixel: &Rgba<u8>, key: [u8; 3]) -> bool {
        pixel.0[..3]
            .iter()
            .zip(key)
            .all(|(&c, k)| c.abs_diff(k) <= self.tolerance)
    }
}

impl BackgroundMatter for ColorKeyMatter {
    fn name(&self) -> &str {
        "color-key"
    }

    fn matte(&self, frame: &Frame) -> Result<Frame, GifSplitError> {
        let Some(key) = self.key_for(frame) else {
            // Fully transparent or empty frame: nothing left to key out.
            return Ok(frame.clone());
        };

        let mut output = frame.image().clone();
        for pixel in output.pixels_mut() {
            if self.is_background(pixel, key) {
                *pixel = Rgba([0, 0, 0, 0]);
            }
        }
        Ok(frame.with_image(output))
    }
}

#[cfg(test)]
mod tests {
    use image::RgbaImage;

    use super::*;

    fn framed(background: [u8; 4], subject: [u8; 4]) -> Frame {
        let mut image = RgbaImage::from_pixel(4, 4, Rgba(background));
        image.put_pixel(1, 1, Rgba(subject));
        image.put_pixel(2, 2, Rgba(subject));
        Frame::new(0, 1, image)
    }

    #[test]
    fn keys_out_sampled_corner_colour() {
        let frame = framed([255, 255, 255, 255], [200, 0, 0, 255]);
        let matted = ColorKeyMatter::new().matte(&frame).unwrap();

        assert_eq!(matted.image().get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
        assert_eq!(matted.image().get_pixel(1, 1), &Rgba([200, 0, 0, 255]));
        // Input untouched.
        assert_eq!(frame.image().get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn tolerance_bounds_the_key() {
        let frame = framed([250, 250, 250, 255], [230, 230, 230, 255]);
        let strict = ColorKeyMatter::new()
            .with_key([255, 255, 255])
            .with_tolerance(5)
            .matte(&frame)
            .unwrap();
        assert_eq!(strict.image().get_pixel(0, 0).0[3], 0);
        assert_eq!(strict.image().get_pixel(1, 1).0[3], 255);

        let loose = ColorKeyMatter::new()
            .with_key([255, 255, 255])
            .with_tolerance(30)
            .matte(&frame)
            .unwrap();
        assert_eq!(loose.image().get_pixel(1, 1).0[3], 0);
    }

    #[test]
    fn majority_corner_wins() {
        let mut image = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 255, 255]));
        image.put_pixel(0, 0, Rgba([0, 255, 0, 255]));
        let frame = Frame::new(0, 1, image);
        assert_eq!(ColorKeyMatter::new().key_for(&frame), Some([0, 0, 255]));
    }

    #[test]
    fn transparent_frame_is_returned_unchanged() {
        let frame = Frame::new(2, 3, RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 0])));
        let matted = ColorKeyMatter::new().matte(&frame).unwrap();
        assert_eq!(matted, frame);
    }

    #[test]
    fn builders_set_key_and_tolerance() {
        let matter = ColorKeyMatter::new().with_tolerance(3).with_key([1, 2, 3]);
        assert_eq!(matter.tolerance, 3);
        assert_eq!(matter.key, Some([1, 2, 3]));
        assert_eq!(ColorKeyMatter::new().tolerance, 16);
    }

    #[test]
    fn unavailable_matter_reports_and_fails() {
        let matter = UnavailableMatter;
        assert!(!matter.is_available());
        let frame = Frame::new(4, 5, RgbaImage::new(1, 1));
        let err = matter.matte(&frame).unwrap_err();
        assert!(err.to_string().contains("frame 4"));
    }
}
