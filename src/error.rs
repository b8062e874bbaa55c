// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for the annotation core.
//!
//! Every failure here is local and recoverable: the UI reports it and
//! keeps running. Navigation boundaries are not errors and live in
//! [`crate::models::queue::Navigation`] instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnotatorError {
    #[error("No WAV files found in {}", .0.display())]
    NoAudioFiles(PathBuf),

    #[error("Failed to scan {}: {source}", path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("Failed to read annotation table {}: {source}", path.display())]
    TableRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to save annotations to {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Audio device error: {0}")]
    Playback(String),

    #[error("No recording is loaded")]
    NoRecording,
}

pub type Result<T> = std::result::Result<T, AnnotatorError>;
