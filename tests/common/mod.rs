//! Shared fixtures for the integration tests.
//!
//! GIFs are generated on the fly with the `gif` encoder into a temporary
//! directory, so the suite needs no checked-in binaries. Every fixture is an
//! 8x8 image with a white background and a 4x4 coloured square in the middle,
//! drawn from a fixed palette so decoded pixels are exact.

#![allow(dead_code)]

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use gifsplit::{BatchReport, BatchState, FileResult, ProgressCallback, ProgressInfo};

pub const SIZE: u16 = 8;

pub const PALETTE: [[u8; 3]; 8] = [
    [255, 255, 255],
    [255, 0, 0],
    [0, 160, 0],
    [0, 0, 255],
    [200, 120, 0],
    [120, 0, 160],
    [0, 140, 140],
    [60, 60, 60],
];

/// Colour of the centre square in frame `index`.
pub fn square_color(index: usize) -> [u8; 3] {
    PALETTE[1 + index % (PALETTE.len() - 1)]
}

/// Write an `frames`-frame GIF with a per-frame delay of `delay_cs`
/// hundredths of a second.
pub fn write_gif(path: &Path, frames: usize, delay_cs: u16) {
    let flat: Vec<u8> = PALETTE.iter().flatten().copied().collect();
    let file = File::create(path).unwrap();
    let mut encoder = gif::Encoder::new(file, SIZE, SIZE, &flat).unwrap();
    encoder.set_repeat(gif::Repeat::Infinite).unwrap();

    for i in 0..frames {
        let colour = (1 + i % (PALETTE.len() - 1)) as u8;
        let mut buffer = vec![0_u8; usize::from(SIZE) * usize::from(SIZE)];
        for y in 2..6 {
            for x in 2..6 {
                buffer[y * usize::from(SIZE) + x] = colour;
            }
        }
        let frame = gif::Frame {
            width: SIZE,
            height: SIZE,
            delay: delay_cs,
            buffer: buffer.into(),
            ..gif::Frame::default()
        };
        encoder.write_frame(&frame).unwrap();
    }
}

/// Create `name` inside `dir` as a GIF and return its path.
pub fn gif_in(dir: &Path, name: &str, frames: usize, delay_cs: u16) -> PathBuf {
    let path = dir.join(name);
    write_gif(&path, frames, delay_cs);
    path
}

/// Create a file with a `.gif` name but non-GIF content.
pub fn garbage_in(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"definitely not a gif").unwrap();
    path
}

/// Everything a batch reported, in order.
#[derive(Default)]
pub struct Recorded {
    pub progress: Vec<ProgressInfo>,
    pub states: Vec<BatchState>,
    pub failures: Vec<FileResult>,
    pub finished: Vec<BatchReport>,
}

/// A [`ProgressCallback`] that records every notification.
#[derive(Clone, Default)]
pub struct Recorder {
    pub inner: Arc<Mutex<Recorded>>,
}

impl Recorder {
    pub fn percents(&self) -> Vec<f32> {
        self.inner
            .lock()
            .unwrap()
            .progress
            .iter()
            .map(|p| p.overall_percent)
            .collect()
    }

    pub fn last(&self) -> ProgressInfo {
        self.inner.lock().unwrap().progress.last().cloned().unwrap()
    }
}

impl ProgressCallback for Recorder {
    fn on_progress(&self, info: &ProgressInfo) {
        self.inner.lock().unwrap().progress.push(info.clone());
    }

    fn on_state(&self, state: &BatchState) {
        self.inner.lock().unwrap().states.push(*state);
    }

    fn on_file_failed(&self, result: &FileResult) {
        self.inner.lock().unwrap().failures.push(result.clone());
    }

    fn on_finished(&self, report: &BatchReport) {
        self.inner.lock().unwrap().finished.push(report.clone());
    }
}
