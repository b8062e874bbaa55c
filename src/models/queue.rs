// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Queue of recordings left to annotate.

use crate::error::{AnnotatorError, Result};
use crate::models::annotation::{basename, AnnotationStore};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recognized recording extensions, compared case-insensitively.
pub const AUDIO_EXTENSIONS: &[&str] = &["wav"];

/// Outcome of moving through the queue. Boundaries are informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved(usize),
    AtFirst,
    AtLast,
    Empty,
}

/// Counts reported after a folder is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSummary {
    pub found: usize,
    pub already_annotated: usize,
}

#[derive(Debug, Default)]
pub struct FileQueue {
    /// Every discovered recording, sorted ascending by path.
    all_files: Vec<PathBuf>,
    /// Subsequence of `all_files` not yet annotated when the folder was opened.
    remaining: Vec<PathBuf>,
    current_index: usize,
}

impl FileQueue {
    /// Recursively discover recordings under `folder`.
    pub fn build(folder: &Path) -> Result<Self> {
        let mut all_files = Vec::new();
        for entry in WalkDir::new(folder) {
            let entry = entry.map_err(|source| AnnotatorError::Discovery {
                path: folder.to_path_buf(),
                source,
            })?;
            if entry.file_type().is_file() && is_audio_file(entry.path()) {
                all_files.push(entry.into_path());
            }
        }

        if all_files.is_empty() {
            return Err(AnnotatorError::NoAudioFiles(folder.to_path_buf()));
        }
        all_files.sort();
        warn_on_shared_basenames(&all_files);

        log::info!("Found {} recordings under {}", all_files.len(), folder.display());
        Ok(Self {
            remaining: all_files.clone(),
            all_files,
            current_index: 0,
        })
    }

    /// Drop files whose basename matches the basename of any saved record.
    ///
    /// Records are keyed by full path but this comparison only looks at
    /// basenames, so recordings sharing a name in different folders are
    /// treated as one.
    pub fn filter_remaining(&mut self, store: &AnnotationStore) -> QueueSummary {
        let annotated = store.annotated_basenames();
        self.remaining = self
            .all_files
            .iter()
            .filter(|path| !annotated.contains(basename(&path.to_string_lossy())))
            .cloned()
            .collect();
        self.current_index = 0;

        QueueSummary {
            found: self.all_files.len(),
            already_annotated: self.all_files.len() - self.remaining.len(),
        }
    }

    pub fn all_files(&self) -> &[PathBuf] {
        &self.all_files
    }

    pub fn remaining(&self) -> &[PathBuf] {
        &self.remaining
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current(&self) -> Option<&Path> {
        self.remaining.get(self.current_index).map(PathBuf::as_path)
    }

    pub fn advance(&mut self) -> Navigation {
        if self.remaining.is_empty() {
            return Navigation::Empty;
        }
        if self.current_index + 1 < self.remaining.len() {
            self.current_index += 1;
            Navigation::Moved(self.current_index)
        } else {
            Navigation::AtLast
        }
    }

    pub fn retreat(&mut self) -> Navigation {
        if self.remaining.is_empty() {
            return Navigation::Empty;
        }
        if self.current_index > 0 {
            self.current_index -= 1;
            Navigation::Moved(self.current_index)
        } else {
            Navigation::AtFirst
        }
    }
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

fn warn_on_shared_basenames(files: &[PathBuf]) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for file in files {
        *counts.entry(basename(&file.to_string_lossy()).to_string()).or_default() += 1;
    }
    for (name, count) in counts.into_iter().filter(|(_, count)| *count > 1) {
        log::warn!(
            "{} recordings share the name {}; annotating one marks all as done",
            count,
            name
        );
    }
}
