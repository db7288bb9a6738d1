//! Progress reporting and cancellation support.
//!
//! A batch pushes [`ProgressInfo`] snapshots, state changes, per-file
//! failures, and one terminal [`BatchReport`] to a [`ProgressCallback`].
//! [`ProgressMailbox`] is a ready-made callback holding only the latest
//! snapshot, so a presentation thread can poll at its own cadence without
//! ever reading a half-written value. [`CancellationToken`] stops a running
//! batch between frames.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use gifsplit::{
//!     BatchCoordinator, BatchOptions, ColorKeyMatter, ExportConfig, ProgressMailbox,
//! };
//!
//! let mailbox = ProgressMailbox::new();
//! let coordinator = BatchCoordinator::new(Arc::new(ColorKeyMatter::new()))
//!     .with_options(BatchOptions::new().with_progress(Arc::new(mailbox.clone())));
//!
//! let handle = coordinator.spawn(vec!["a.gif".into(), "b.gif".into()], ExportConfig::default())?;
//! while !handle.is_finished() {
//!     if let Some(info) = mailbox.latest() {
//!         println!("{:5.1}% {}", info.overall_percent, info.status);
//!     }
//!     std::thread::sleep(std::time::Duration::from_millis(50));
//! }
//! let report = handle.join()?;
//! println!("{report}");
//! # Ok::<(), gifsplit::GifSplitError>(())
//! ```

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use crate::batch::{BatchReport, BatchState, FileResult};

/// A snapshot of batch progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressInfo {
    /// Overall completion across all files, 0.0 – 100.0. Never decreases
    /// within one batch run.
    pub overall_percent: f32,
    /// Human-readable status line.
    pub status: String,
    /// Zero-based index of the file being processed, if any.
    pub file_index: Option<usize>,
    /// Zero-based index of the frame just processed, if any.
    pub frame_index: Option<usize>,
}

/// Observer for batch progress.
///
/// Implementations must be [`Send`] and [`Sync`] because callbacks are
/// invoked from the batch worker thread.
///
/// Callbacks are **infallible**: they observe but cannot halt the batch.
/// Use [`CancellationToken`] to stop it.
pub trait ProgressCallback: Send + Sync {
    /// Called after every frame and at every status change.
    fn on_progress(&self, info: &ProgressInfo);

    /// Called when the batch moves to a new [`BatchState`].
    fn on_state(&self, _state: &BatchState) {}

    /// Called once for each file that failed, as soon as it fails.
    fn on_file_failed(&self, _result: &FileResult) {}

    /// Called exactly once when a validated batch ends.
    fn on_finished(&self, _report: &BatchReport) {}
}

/// A no-op implementation that discards all notifications.
///
/// This is the default when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone this token and share it between threads; call [`cancel`](CancellationToken::cancel)
/// from any thread to request cancellation. The batch checks
/// [`is_cancelled`](CancellationToken::is_cancelled) before each file and
/// each frame.
///
/// # Example
///
/// ```
/// use gifsplit::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation.
    ///
    /// All clones of this token will observe the cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct MailboxSlot {
    latest: Option<ProgressInfo>,
    state: Option<BatchState>,
    failures: Vec<FileResult>,
    report: Option<BatchReport>,
}

/// Single-slot, latest-value-wins progress mailbox.
///
/// Every write replaces the previous snapshot; reads return a whole
/// snapshot taken under the lock. Per-file failures are queued (none are
/// dropped) and the terminal report is kept until read.
#[derive(Debug, Clone, Default)]
pub struct ProgressMailbox {
    slot: Arc<Mutex<MailboxSlot>>,
}

impl ProgressMailbox {
    /// Create an empty mailbox.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MailboxSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The most recent progress snapshot, if any was posted.
    pub fn latest(&self) -> Option<ProgressInfo> {
        self.lock().latest.clone()
    }

    /// The most recent batch state, if any was posted.
    pub fn state(&self) -> Option<BatchState> {
        self.lock().state
    }

    /// Remove and return the failures posted since the last call.
    pub fn take_failures(&self) -> Vec<FileResult> {
        std::mem::take(&mut self.lock().failures)
    }

    /// The terminal report, once the batch has finished.
    pub fn report(&self) -> Option<BatchReport> {
        self.lock().report.clone()
    }

    /// `true` once the terminal report has been posted.
    pub fn is_finished(&self) -> bool {
        self.lock().report.is_some()
    }
}

impl ProgressCallback for ProgressMailbox {
    fn on_progress(&self, info: &ProgressInfo) {
        self.lock().latest = Some(info.clone());
    }

    fn on_state(&self, state: &BatchState) {
        self.lock().state = Some(*state);
    }

    fn on_file_failed(&self, result: &FileResult) {
        self.lock().failures.push(result.clone());
    }

    fn on_finished(&self, report: &BatchReport) {
        self.lock().report = Some(report.clone());
    }
}

/// Overall percent after frame `frame_index` of file `file_index`.
///
/// `(f / F) * 100 + (i / N) * (100 / F)`. A frame index at or past the
/// declared count (a source holding more frames than it declared) is held
/// at the last declared frame so the value stays inside the file's share.
///
/// ```
/// // Two files; second frame of a four-frame first file.
/// assert_eq!(gifsplit::progress_percent(0, 2, 1, 4), 12.5);
/// ```
pub fn progress_percent(
    file_index: usize,
    total_files: usize,
    frame_index: usize,
    frame_count: usize,
) -> f32 {
    if total_files == 0 {
        return 100.0;
    }
    let files = total_files as f64;
    let file_share = 100.0 / files;
    let frame_fraction = if frame_count == 0 {
        0.0
    } else {
        frame_index.min(frame_count - 1) as f64 / frame_count as f64
    };
    ((file_index as f64 / files) * 100.0 + frame_fraction * file_share) as f32
}

/// Internal helper that tracks the high-water mark and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total_files: usize,
    percent: f32,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Arc<dyn ProgressCallback>, total_files: usize) -> Self {
        Self {
            callback,
            total_files,
            percent: 0.0,
        }
    }

    pub(crate) fn callback(&self) -> &Arc<dyn ProgressCallback> {
        &self.callback
    }

    /// Current overall percent.
    pub(crate) fn percent(&self) -> f32 {
        self.percent
    }

    /// Announce the start of file `file_index`.
    pub(crate) fn file_started(&mut self, file_index: usize, base_name: &str) {
        let percent = progress_percent(file_index, self.total_files, 0, 1);
        let status = format!(
            "Processing {base_name} ({}/{})",
            file_index + 1,
            self.total_files
        );
        self.emit(percent, status, Some(file_index), None);
    }

    /// Record that `frame_index` of `frame_count` has been processed.
    pub(crate) fn frame_done(
        &mut self,
        file_index: usize,
        base_name: &str,
        frame_index: usize,
        frame_count: usize,
    ) {
        let percent = progress_percent(file_index, self.total_files, frame_index, frame_count);
        let status = format!(
            "Processing {base_name}: frame {}/{frame_count}",
            frame_index + 1
        );
        self.emit(percent, status, Some(file_index), Some(frame_index));
    }

    /// Change the status line without moving the percentage.
    pub(crate) fn status(&mut self, file_index: Option<usize>, status: String) {
        self.emit(self.percent, status, file_index, None);
    }

    /// Emit the terminal status, forcing 100 % when `complete`.
    pub(crate) fn finish(&mut self, status: String, complete: bool) {
        let percent = if complete { 100.0 } else { self.percent };
        self.emit(percent, status, None, None);
    }

    fn emit(
        &mut self,
        percent: f32,
        status: String,
        file_index: Option<usize>,
        frame_index: Option<usize>,
    ) {
        self.percent = self.percent.max(percent.clamp(0.0, 100.0));
        let info = ProgressInfo {
            overall_percent: self.percent,
            status,
            file_index,
            frame_index,
        };
        self.callback.on_progress(&info);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formula_matches_reference_points() {
        assert_eq!(progress_percent(0, 2, 1, 4), 12.5);
        assert_eq!(progress_percent(1, 2, 0, 2), 50.0);
        assert_eq!(progress_percent(1, 2, 1, 2), 75.0);
        assert_eq!(progress_percent(0, 1, 0, 1), 0.0);
    }

    #[test]
    fn over_reported_frames_stay_in_file_share() {
        // Declared 4, but the source holds more.
        assert_eq!(progress_percent(0, 2, 9, 4), progress_percent(0, 2, 3, 4));
        assert!(progress_percent(0, 2, 9, 4) < 50.0);
    }

    #[test]
    fn tracker_never_goes_backwards() {
        let mailbox = ProgressMailbox::new();
        let mut tracker = ProgressTracker::new(Arc::new(mailbox.clone()), 2);

        tracker.frame_done(0, "a", 3, 4);
        let high = tracker.percent();
        tracker.file_started(0, "a");
        assert_eq!(tracker.percent(), high);
        assert_eq!(mailbox.latest().unwrap().overall_percent, high);
    }

    #[test]
    fn finish_forces_full_only_when_complete() {
        let mailbox = ProgressMailbox::new();
        let mut tracker = ProgressTracker::new(Arc::new(mailbox.clone()), 4);
        tracker.frame_done(1, "a", 0, 1);
        tracker.finish("Processing cancelled".to_string(), false);
        assert_eq!(mailbox.latest().unwrap().overall_percent, 25.0);

        tracker.finish("Processing complete!".to_string(), true);
        assert_eq!(mailbox.latest().unwrap().overall_percent, 100.0);
    }

    #[test]
    fn status_messages_follow_format() {
        let mailbox = ProgressMailbox::new();
        let mut tracker = ProgressTracker::new(Arc::new(mailbox.clone()), 3);

        tracker.file_started(1, "dance");
        assert_eq!(mailbox.latest().unwrap().status, "Processing dance (2/3)");

        tracker.frame_done(1, "dance", 0, 5);
        assert_eq!(mailbox.latest().unwrap().status, "Processing dance: frame 1/5");
    }
}
