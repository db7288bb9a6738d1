//! Internal conversion helpers.
//!
//! Colour-mode normalization and the unit conversions between GIF's
//! centisecond delays and the millisecond delays used everywhere else.

use image::{DynamicImage, RgbaImage};

use crate::metadata::DEFAULT_FRAME_DELAY_MS;

/// Convert any colour mode to 8-bit RGBA.
///
/// RGBA8 input is moved through without copying; everything else is
/// converted, with opaque alpha for modes that have none.
pub fn normalize_rgba(image: DynamicImage) -> RgbaImage {
    match image {
        DynamicImage::ImageRgba8(rgba) => rgba,
        other => other.to_rgba8(),
    }
}

/// Convert a GIF delay (hundredths of a second) to milliseconds, falling
/// back to [`DEFAULT_FRAME_DELAY_MS`] when the source declares none.
pub(crate) fn centiseconds_to_ms(delay: u16) -> u32 {
    if delay == 0 {
        DEFAULT_FRAME_DELAY_MS
    } else {
        u32::from(delay) * 10
    }
}

/// Convert a millisecond delay to GIF centiseconds, rounding to nearest and
/// saturating at the format's limit.
pub(crate) fn ms_to_centiseconds(delay_ms: u32) -> u16 {
    let centiseconds = (delay_ms.saturating_add(5)) / 10;
    u16::try_from(centiseconds).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma, Rgba};

    use super::*;

    #[test]
    fn gray_gains_opaque_alpha() {
        let gray = GrayImage::from_pixel(2, 2, Luma([40]));
        let rgba = normalize_rgba(DynamicImage::ImageLuma8(gray));
        assert_eq!(rgba.get_pixel(1, 1), &Rgba([40, 40, 40, 255]));
    }

    #[test]
    fn rgba_passes_through() {
        let source = RgbaImage::from_pixel(1, 1, Rgba([1, 2, 3, 4]));
        let rgba = normalize_rgba(DynamicImage::ImageRgba8(source.clone()));
        assert_eq!(rgba, source);
    }

    #[test]
    fn delay_conversions() {
        assert_eq!(centiseconds_to_ms(0), DEFAULT_FRAME_DELAY_MS);
        assert_eq!(centiseconds_to_ms(7), 70);
        assert_eq!(ms_to_centiseconds(100), 10);
        assert_eq!(ms_to_centiseconds(94), 9);
        assert_eq!(ms_to_centiseconds(95), 10);
        assert_eq!(ms_to_centiseconds(u32::MAX), u16::MAX);
    }
}
