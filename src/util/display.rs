// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Text formatting for labels.

use std::path::{Component, Path, PathBuf};

/// The file name plus at most its last three parent directories.
pub fn short_path(path: &Path) -> String {
    let parts: Vec<Component> = path
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect();
    let keep = parts.len().min(4);
    parts[parts.len() - keep..]
        .iter()
        .collect::<PathBuf>()
        .display()
        .to_string()
}

/// Seconds as `m:ss.s`.
pub fn format_time(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let minutes = (seconds / 60.0).floor();
    format!("{}:{:04.1}", minutes as u64, seconds - minutes * 60.0)
}
