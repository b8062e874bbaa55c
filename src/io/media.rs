// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Audio file loading.
//!
//! This module decodes WAV recordings into normalized `f32` samples
//! ready for spectrogram computation and playback.

use crate::error::{AnnotatorError, Result};
use crate::models::recording::Recording;
use std::path::Path;

/// Decode a WAV file. Integer PCM is scaled into [-1.0, 1.0].
pub fn load_recording(path: &Path) -> Result<Recording> {
    let decode_error = |reason: String| AnnotatorError::Decode {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = hound::WavReader::open(path).map_err(|e| decode_error(e.to_string()))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| decode_error(e.to_string()))?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| decode_error(e.to_string()))?
        }
    };

    if samples.len() < spec.channels.max(1) as usize {
        return Err(decode_error("file contains no audio".to_string()));
    }

    let recording = Recording::new(path.to_path_buf(), spec.sample_rate, spec.channels, samples);
    log::info!(
        "Decoded {} ({} Hz, {} ch, {:.2}s)",
        path.display(),
        recording.sample_rate(),
        recording.channels(),
        recording.duration()
    );
    Ok(recording)
}
