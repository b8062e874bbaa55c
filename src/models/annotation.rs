// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the transcript record and the table-backed store
//! that keeps one transcript per recording, sorted by filename.

use crate::error::{AnnotatorError, Result};
use crate::io::serialization;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A transcript for one recording, keyed by the recording's path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    #[serde(rename = "Filename")]
    pub filename: String,
    #[serde(rename = "Transcription", default)]
    pub transcription: String,
}

impl AnnotationRecord {
    pub fn new(filename: String, transcription: String) -> Self {
        Self {
            filename,
            transcription,
        }
    }

    /// Final path component of the filename key.
    pub fn basename(&self) -> &str {
        basename(&self.filename)
    }
}

/// Final component of a path string, or the whole string if it has none.
pub fn basename(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}

/// Filename-unique transcript table persisted as a whole on every change.
#[derive(Debug)]
pub struct AnnotationStore {
    path: PathBuf,
    /// Sorted ascending by filename, no duplicates.
    records: Vec<AnnotationRecord>,
}

impl AnnotationStore {
    /// Empty store that will persist to `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            records: Vec::new(),
        }
    }

    /// Read the table at `path` if present, otherwise start empty.
    pub fn load(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            log::info!("No annotation table at {}, starting empty", path.display());
            return Ok(Self::new(path));
        }

        let rows = serialization::read_table(&path).map_err(|source| AnnotatorError::TableRead {
            path: path.clone(),
            source,
        })?;
        let total = rows.len();
        let records = normalize(rows);
        if records.len() < total {
            log::warn!(
                "Annotation table {} repeats {} filename(s); keeping the last row of each",
                path.display(),
                total - records.len()
            );
        }
        log::info!("Loaded {} annotations from {}", records.len(), path.display());

        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[AnnotationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Transcript for `filename`, or an empty string if none was saved.
    pub fn get(&self, filename: &str) -> &str {
        self.position(filename)
            .map(|idx| self.records[idx].transcription.as_str())
            .unwrap_or("")
    }

    /// Basenames of every annotated file.
    pub fn annotated_basenames(&self) -> HashSet<&str> {
        self.records.iter().map(AnnotationRecord::basename).collect()
    }

    /// Insert or replace the transcript for `filename` and rewrite the
    /// whole table. On a write failure the store is left untouched.
    pub fn upsert(&mut self, filename: &str, text: &str) -> Result<()> {
        let mut updated = self.records.clone();
        match self.position(filename) {
            Some(idx) => updated[idx].transcription = text.to_string(),
            None => {
                updated.push(AnnotationRecord::new(filename.to_string(), text.to_string()));
                updated.sort_by(|a, b| a.filename.cmp(&b.filename));
            }
        }

        serialization::write_table(&self.path, &updated).map_err(|source| {
            AnnotatorError::Persist {
                path: self.path.clone(),
                source,
            }
        })?;

        self.records = updated;
        log::info!("Saved transcription for {} ({} total)", filename, self.records.len());
        Ok(())
    }

    fn position(&self, filename: &str) -> Option<usize> {
        self.records
            .binary_search_by(|record| record.filename.as_str().cmp(filename))
            .ok()
    }
}

/// Sort by filename and drop repeated filenames, keeping the last row.
fn normalize(rows: Vec<AnnotationRecord>) -> Vec<AnnotationRecord> {
    let mut seen = HashSet::new();
    let mut records: Vec<AnnotationRecord> = rows
        .into_iter()
        .rev()
        .filter(|record| seen.insert(record.filename.clone()))
        .collect();
    records.sort_by(|a, b| a.filename.cmp(&b.filename));
    records
}
