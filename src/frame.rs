//! Immutable frames and per-file frame sequences.

use image::RgbaImage;

/// One decoded (or matted) frame.
///
/// Frames are never modified in place. A transform such as background
/// removal produces a new `Frame` through [`Frame::with_image`] and the
/// original is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    index: usize,
    total: usize,
    image: RgbaImage,
}

impl Frame {
    /// Create a frame at `index` of a source declaring `total` frames.
    pub fn new(index: usize, total: usize, image: RgbaImage) -> Self {
        Self {
            index,
            total,
            image,
        }
    }

    /// Zero-based position within its source file.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Declared frame count of the source file.
    pub fn total(&self) -> usize {
        self.total
    }

    /// RGBA pixel buffer.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// A new frame at the same position carrying `image`.
    #[must_use]
    pub fn with_image(&self, image: RgbaImage) -> Frame {
        Frame {
            index: self.index,
            total: self.total,
            image,
        }
    }

    /// Consume the frame, returning its pixel buffer.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

/// The ordered frames of one source file, ready for artifact writing.
///
/// Length equals the declared frame count, or the number actually decoded
/// when the source holds more frames than it declared.
#[derive(Debug, Clone, Default)]
pub struct FrameSequence {
    frames: Vec<Frame>,
}

impl FrameSequence {
    /// An empty sequence with room for `capacity` frames.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Vec::with_capacity(capacity),
        }
    }

    /// Append the next frame in container order.
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Number of frames collected.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` if no frame was collected.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames in order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Iterate over frames in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }
}

impl<'a> IntoIterator for &'a FrameSequence {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}
