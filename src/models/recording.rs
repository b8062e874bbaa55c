// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Decoded audio recording.

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A decoded recording. Immutable once loaded; re-decoded every time
/// the file is opened.
#[derive(Debug, Clone)]
pub struct Recording {
    path: PathBuf,
    sample_rate: u32,
    channels: u16,
    /// Interleaved samples normalized to [-1.0, 1.0].
    samples: Arc<Vec<f32>>,
}

impl Recording {
    pub fn new(path: PathBuf, sample_rate: u32, channels: u16, samples: Vec<f32>) -> Self {
        Self {
            path,
            sample_rate,
            channels: channels.max(1),
            samples: Arc::new(samples),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn samples(&self) -> &Arc<Vec<f32>> {
        &self.samples
    }

    /// Number of sample frames (one sample per channel).
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Total duration in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// Samples of the first channel, used for the spectrogram.
    pub fn first_channel(&self) -> Vec<f32> {
        self.samples
            .iter()
            .step_by(self.channels as usize)
            .copied()
            .collect()
    }

    /// Frame index corresponding to a time offset, clamped to the recording.
    pub fn frame_at(&self, seconds: f64) -> usize {
        let frame = (seconds.max(0.0) * self.sample_rate as f64).floor() as usize;
        frame.min(self.frame_count())
    }
}
