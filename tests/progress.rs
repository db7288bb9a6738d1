//! Progress, mailbox, and cancellation integration tests.

use std::sync::Arc;
use std::thread;

use gifsplit::{
    BatchReport, BatchState, CancellationToken, ErrorKind, FileOutcome, FileResult,
    ProgressCallback, ProgressInfo, ProgressMailbox, progress_percent,
};

fn info(percent: f32, status: &str) -> ProgressInfo {
    ProgressInfo {
        overall_percent: percent,
        status: status.to_string(),
        file_index: Some(0),
        frame_index: None,
    }
}

// ── CancellationToken ──────────────────────────────────────────────

#[test]
fn cancellation_token_default_not_cancelled() {
    assert!(!CancellationToken::new().is_cancelled());
    assert!(!CancellationToken::default().is_cancelled());
}

#[test]
fn cancellation_token_clone_shares_state() {
    let token = CancellationToken::new();
    let clone = token.clone();
    assert!(!clone.is_cancelled());

    token.cancel();
    assert!(clone.is_cancelled());
}

#[test]
fn cancellation_token_crosses_threads() {
    let token = CancellationToken::new();
    let remote = token.clone();
    thread::spawn(move || remote.cancel()).join().unwrap();
    assert!(token.is_cancelled());
}

// ── ProgressMailbox ────────────────────────────────────────────────

#[test]
fn mailbox_starts_empty() {
    let mailbox = ProgressMailbox::new();
    assert!(mailbox.latest().is_none());
    assert!(mailbox.state().is_none());
    assert!(mailbox.take_failures().is_empty());
    assert!(!mailbox.is_finished());
}

#[test]
fn mailbox_keeps_only_latest_snapshot() {
    let mailbox = ProgressMailbox::new();
    mailbox.on_progress(&info(10.0, "first"));
    mailbox.on_progress(&info(20.0, "second"));
    mailbox.on_state(&BatchState::Running { file_index: 1 });

    assert_eq!(mailbox.latest(), Some(info(20.0, "second")));
    assert_eq!(mailbox.state(), Some(BatchState::Running { file_index: 1 }));
}

#[test]
fn mailbox_queues_every_failure() {
    let mailbox = ProgressMailbox::new();
    for name in ["a.gif", "b.gif"] {
        mailbox.on_file_failed(&FileResult {
            path: name.into(),
            display_name: name.to_string(),
            outcome: FileOutcome::Failed {
                kind: ErrorKind::Decode,
                reason: "bad".to_string(),
            },
        });
    }

    let failures = mailbox.take_failures();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[1].display_name, "b.gif");
    assert!(mailbox.take_failures().is_empty());
}

#[test]
fn mailbox_clones_share_one_slot() {
    let mailbox = ProgressMailbox::new();
    let writer: Arc<dyn ProgressCallback> = Arc::new(mailbox.clone());

    thread::spawn(move || {
        for i in 0..=100 {
            writer.on_progress(&info(i as f32, "working"));
        }
        writer.on_finished(&BatchReport::default());
    })
    .join()
    .unwrap();

    assert_eq!(mailbox.latest().unwrap().overall_percent, 100.0);
    assert!(mailbox.is_finished());
    assert_eq!(mailbox.report(), Some(BatchReport::default()));
}

// ── progress_percent ───────────────────────────────────────────────

#[test]
fn percent_for_two_files() {
    assert_eq!(progress_percent(0, 2, 1, 4), 12.5);
    assert_eq!(progress_percent(1, 2, 0, 2), 50.0);
    assert_eq!(progress_percent(1, 2, 1, 2), 75.0);
}

#[test]
fn percent_is_monotonic_across_a_batch() {
    let counts = [3, 1, 5];
    let mut last = 0.0;
    for (f, &n) in counts.iter().enumerate() {
        for i in 0..n {
            let p = progress_percent(f, counts.len(), i, n);
            assert!(p >= last, "file {f} frame {i}: {p} < {last}");
            assert!(p < 100.0);
            last = p;
        }
    }
}

#[test]
fn percent_handles_degenerate_inputs() {
    assert_eq!(progress_percent(0, 0, 0, 0), 100.0);
    assert_eq!(progress_percent(0, 1, 0, 0), 0.0);
    assert_eq!(progress_percent(0, 1, 50, 10), progress_percent(0, 1, 9, 10));
}
