//! Batch coordination.
//!
//! [`BatchCoordinator`] processes a list of GIFs strictly in order, one file
//! fully (decode → transform → write) before the next. A bad file never
//! stops the batch: its error is recorded in the [`BatchReport`], surfaced
//! through [`ProgressCallback::on_file_failed`](crate::ProgressCallback::on_file_failed),
//! and the loop moves on. Only an invalid [`ExportConfig`] rejects the whole
//! batch, before any file is opened or any directory is created.
//!
//! A run moves through [`BatchState`]s: `Idle → Validating →
//! Running { file_index } → Completed`.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use gifsplit::{BatchCoordinator, ExportConfig, UnavailableMatter};
//!
//! let coordinator = BatchCoordinator::new(Arc::new(UnavailableMatter));
//! let report = coordinator.run(&["a.gif", "b.gif"], ExportConfig::default())?;
//! for result in &report.results {
//!     println!("{}: {:?}", result.display_name, result.outcome);
//! }
//! # Ok::<(), gifsplit::GifSplitError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::artifact::{ArtifactWriter, output_directory, output_directory_in};
use crate::config::{BatchOptions, ExportConfig};
use crate::decoder::FrameDecoder;
use crate::error::{ErrorKind, GifSplitError};
use crate::matting::BackgroundMatter;
use crate::pipeline::FrameTransformPipeline;
use crate::progress::{CancellationToken, ProgressTracker};
use crate::source::SourceFile;

/// Lifecycle of one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    /// Nothing submitted yet.
    Idle,
    /// Checking the export configuration.
    Validating,
    /// Processing the file at `file_index`.
    Running {
        /// Zero-based index into the submitted paths.
        file_index: usize,
    },
    /// Every file has been handled (or the run was cancelled).
    Completed,
}

/// Outcome for a single file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// All requested artifacts were written.
    Succeeded {
        /// Frames processed.
        frames: usize,
        /// Paths of the artifacts written.
        artifacts: Vec<PathBuf>,
    },
    /// Processing stopped on an error; later files were still processed.
    Failed {
        /// Failure category.
        kind: ErrorKind,
        /// Human-readable reason.
        reason: String,
    },
    /// The batch was cancelled before or while this file was processed.
    Cancelled,
}

/// Per-file entry of a [`BatchReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct FileResult {
    /// Path as submitted.
    pub path: PathBuf,
    /// File name shown to the operator.
    pub display_name: String,
    /// What happened.
    pub outcome: FileOutcome,
}

impl FileResult {
    /// `true` if the file succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, FileOutcome::Succeeded { .. })
    }

    /// `true` if the file failed.
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, FileOutcome::Failed { .. })
    }
}

/// Aggregated results of a batch, one entry per submitted path, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Per-file results in submission order.
    pub results: Vec<FileResult>,
    /// `true` if the run was stopped by a [`CancellationToken`].
    pub cancelled: bool,
}

impl BatchReport {
    /// Number of files that succeeded.
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    /// Number of files that failed.
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.is_failure()).count()
    }

    /// The failed entries, in order.
    pub fn failures(&self) -> impl Iterator<Item = &FileResult> {
        self.results.iter().filter(|r| r.is_failure())
    }

    /// `true` when every file succeeded and the run was not cancelled.
    pub fn is_success(&self) -> bool {
        !self.cancelled && self.failed() == 0
    }

    /// The terminal status line for this report.
    pub fn status_line(&self) -> String {
        if self.cancelled {
            "Processing cancelled".to_string()
        } else if self.failed() == 0 {
            "Processing complete!".to_string()
        } else {
            format!(
                "Processing complete with errors ({}/{} failed)",
                self.failed(),
                self.results.len()
            )
        }
    }
}

impl Display for BatchReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "{}", self.status_line())?;
        for result in &self.results {
            match &result.outcome {
                FileOutcome::Succeeded { frames, artifacts } => writeln!(
                    f,
                    "[OK] {}: {frames} frame(s), {} artifact(s)",
                    result.display_name,
                    artifacts.len()
                )?,
                FileOutcome::Failed { reason, .. } => {
                    writeln!(f, "[FAILED] {}: {reason}", result.display_name)?
                }
                FileOutcome::Cancelled => writeln!(f, "[CANCELLED] {}", result.display_name)?,
            }
        }
        writeln!(
            f,
            "{} succeeded, {} failed",
            self.succeeded(),
            self.failed()
        )
    }
}

/// Drives decode, transform, and write for a list of files.
#[derive(Clone)]
pub struct BatchCoordinator {
    pipeline: FrameTransformPipeline,
    options: BatchOptions,
}

impl BatchCoordinator {
    /// Create a coordinator using `matter` for background removal.
    pub fn new(matter: Arc<dyn BackgroundMatter>) -> Self {
        Self {
            pipeline: FrameTransformPipeline::new(matter),
            options: BatchOptions::default(),
        }
    }

    /// Replace the operational options.
    #[must_use]
    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Whether background removal can be offered to the user.
    pub fn matting_available(&self) -> bool {
        self.pipeline.matter().is_available()
    }

    /// Check `config` against this coordinator's capabilities.
    ///
    /// # Errors
    ///
    /// Returns [`GifSplitError::Config`] if no artifact would be produced or
    /// background removal is requested without an available engine.
    pub fn validate(&self, config: &ExportConfig) -> Result<(), GifSplitError> {
        config.validate()?;
        if config.remove_background && !self.matting_available() {
            return Err(GifSplitError::Config(format!(
                "background removal requested but the matting engine ({}) is not available",
                self.pipeline.matter().name()
            )));
        }
        Ok(())
    }

    /// Run the batch on the current thread.
    ///
    /// Returns one [`FileResult`] per path, in order. Per-file failures are
    /// inside the report; the only `Err` is a configuration rejection.
    pub fn run<P: AsRef<Path>>(
        &self,
        paths: &[P],
        config: ExportConfig,
    ) -> Result<BatchReport, GifSplitError> {
        let callback = self.options.progress.clone();
        callback.on_state(&BatchState::Validating);
        if let Err(e) = self.validate(&config) {
            callback.on_state(&BatchState::Idle);
            return Err(e);
        }
        let sources: Vec<SourceFile> = paths.iter().map(|p| SourceFile::new(p.as_ref())).collect();
        Ok(self.run_validated(&sources, config))
    }

    /// Validate, then run the batch on a dedicated worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`GifSplitError::Config`] without starting a thread when the
    /// configuration is rejected, or [`GifSplitError::Io`] if the thread
    /// cannot be spawned.
    pub fn spawn(
        &self,
        paths: Vec<PathBuf>,
        config: ExportConfig,
    ) -> Result<BatchHandle, GifSplitError> {
        let mut coordinator = self.clone();
        let token = coordinator
            .options
            .cancellation
            .get_or_insert_with(CancellationToken::new)
            .clone();

        let callback = coordinator.options.progress.clone();
        callback.on_state(&BatchState::Validating);
        if let Err(e) = coordinator.validate(&config) {
            callback.on_state(&BatchState::Idle);
            return Err(e);
        }

        let handle = thread::Builder::new()
            .name("gifsplit-batch".to_string())
            .spawn(move || {
                let sources: Vec<SourceFile> = paths.into_iter().map(SourceFile::new).collect();
                coordinator.run_validated(&sources, config)
            })?;

        Ok(BatchHandle { handle, token })
    }

    fn run_validated(&self, sources: &[SourceFile], config: ExportConfig) -> BatchReport {
        let mut tracker = ProgressTracker::new(self.options.progress.clone(), sources.len());
        let writer = ArtifactWriter::with_animation(self.options.animation.clone());
        let output_dir = match (&self.options.output_root, sources.first()) {
            (Some(root), _) => output_directory_in(root, &config),
            (None, Some(first)) => output_directory(first, &config),
            (None, None) => PathBuf::new(),
        };

        log::info!(
            "Starting batch of {} file(s) into {output_dir:?} ({config:?})",
            sources.len()
        );

        let mut report = BatchReport::default();
        for (file_index, source) in sources.iter().enumerate() {
            if report.cancelled || self.options.is_cancelled() {
                report.cancelled = true;
                report.results.push(cancelled_result(source));
                continue;
            }

            tracker
                .callback()
                .on_state(&BatchState::Running { file_index });
            tracker.file_started(file_index, source.base_name());

            let outcome =
                match self.process_file(file_index, source, &config, &output_dir, &writer, &mut tracker)
                {
                    Ok((frames, artifacts)) => {
                        log::debug!(
                            "Finished {} ({frames} frame(s), {} artifact(s))",
                            source.display_name(),
                            artifacts.len()
                        );
                        FileOutcome::Succeeded { frames, artifacts }
                    }
                    Err(GifSplitError::Cancelled) => {
                        log::info!(
                            "Batch cancelled while processing {} at {:.1}%",
                            source.display_name(),
                            tracker.percent()
                        );
                        report.cancelled = true;
                        FileOutcome::Cancelled
                    }
                    Err(e) => {
                        log::warn!("Failed to convert {}: {e}", source.path().display());
                        tracker.status(
                            Some(file_index),
                            format!("Error processing {}", source.display_name()),
                        );
                        FileOutcome::Failed {
                            kind: e.kind(),
                            reason: e.to_string(),
                        }
                    }
                };

            let result = FileResult {
                path: source.path().to_path_buf(),
                display_name: source.display_name().to_string(),
                outcome,
            };
            if result.is_failure() {
                tracker.callback().on_file_failed(&result);
            }
            report.results.push(result);
        }

        tracker.finish(report.status_line(), !report.cancelled);
        tracker.callback().on_state(&BatchState::Completed);
        tracker.callback().on_finished(&report);
        log::info!(
            "Batch finished: {} succeeded, {} failed{}",
            report.succeeded(),
            report.failed(),
            if report.cancelled { ", cancelled" } else { "" }
        );
        report
    }

    fn process_file(
        &self,
        file_index: usize,
        source: &SourceFile,
        config: &ExportConfig,
        output_dir: &Path,
        writer: &ArtifactWriter,
        tracker: &mut ProgressTracker,
    ) -> Result<(usize, Vec<PathBuf>), GifSplitError> {
        let (metadata, frames) =
            FrameDecoder::open_with_cap(source.path(), self.options.frame_count_cap)?;
        if !metadata.frame_count_exact {
            log::warn!(
                "{} has more than {} frames; progress is estimated",
                source.display_name(),
                metadata.frame_count
            );
        }

        let sequence = self
            .pipeline
            .process(frames, &metadata, config, |frame_index| {
                tracker.frame_done(
                    file_index,
                    source.base_name(),
                    frame_index,
                    metadata.frame_count,
                );
                if self.options.is_cancelled() {
                    return Err(GifSplitError::Cancelled);
                }
                Ok(())
            })?;

        let mut artifacts = Vec::new();
        if config.export_stills {
            tracker.status(
                Some(file_index),
                format!("Saving PNG frames for {}", source.base_name()),
            );
            artifacts.extend(writer.write_stills(source.base_name(), &sequence, output_dir)?);
        }
        if config.writes_animation() {
            tracker.status(
                Some(file_index),
                format!("Saving processed GIF for {}", source.base_name()),
            );
            artifacts.push(writer.write_animation(
                source.base_name(),
                &sequence,
                metadata.frame_delay_ms,
                output_dir,
            )?);
        }
        Ok((sequence.len(), artifacts))
    }
}

fn cancelled_result(source: &SourceFile) -> FileResult {
    FileResult {
        path: source.path().to_path_buf(),
        display_name: source.display_name().to_string(),
        outcome: FileOutcome::Cancelled,
    }
}

/// A batch running on its worker thread.
pub struct BatchHandle {
    handle: JoinHandle<BatchReport>,
    token: CancellationToken,
}

impl BatchHandle {
    /// Request cancellation; the worker stops before its next frame.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The token controlling this batch.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    /// `true` once the worker has returned.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the worker and return its report.
    ///
    /// # Errors
    ///
    /// Returns [`GifSplitError::Io`] if the worker thread panicked.
    pub fn join(self) -> Result<BatchReport, GifSplitError> {
        self.handle
            .join()
            .map_err(|_| GifSplitError::Io(std::io::Error::other("batch worker panicked")))
    }
}
