//! Animation metadata types.
//!
//! [`SequenceMetadata`] is produced by [`GifProbe`](crate::GifProbe) and
//! returned alongside the frame iterator from
//! [`FrameDecoder::open`](crate::FrameDecoder::open).

/// Delay used when a source declares no (or a zero) inter-frame delay.
pub const DEFAULT_FRAME_DELAY_MS: u32 = 100;

/// File-level metadata for an animated source.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct SequenceMetadata {
    /// Frame count used for progress reporting. Always at least 1; capped by
    /// [`BatchOptions::with_frame_count_cap`](crate::BatchOptions::with_frame_count_cap).
    pub frame_count: usize,
    /// `false` when counting stopped at the cap, in which case the source
    /// holds more frames than `frame_count`.
    pub frame_count_exact: bool,
    /// Inter-frame delay of the first frame, in milliseconds.
    pub frame_delay_ms: u32,
    /// Logical screen width in pixels.
    pub width: u32,
    /// Logical screen height in pixels.
    pub height: u32,
}
