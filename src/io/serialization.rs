// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation table serialization.
//!
//! The persisted table is pipe-delimited text with a `Filename|Transcription`
//! header. Fields containing the delimiter, quotes or newlines are quoted.
//! Exports to YAML and JSON are also provided.

use crate::models::annotation::AnnotationRecord;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Field separator of the annotation table.
pub const TABLE_DELIMITER: u8 = b'|';

/// Read every row of an annotation table, in file order.
pub fn read_table(path: &Path) -> std::result::Result<Vec<AnnotationRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(TABLE_DELIMITER)
        .has_headers(true)
        .from_path(path)?;

    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// Write the full table to `path`.
///
/// Rows go to a sibling temporary file which then replaces `path`, so a
/// failed write never leaves a truncated table behind.
pub fn write_table(path: &Path, records: &[AnnotationRecord]) -> std::result::Result<(), csv::Error> {
    let tmp = temporary_path(path);
    let result = write_rows(&tmp, records).and_then(|()| fs::rename(&tmp, path).map_err(csv::Error::from));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn write_rows(path: &Path, records: &[AnnotationRecord]) -> std::result::Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(TABLE_DELIMITER)
        .has_headers(true)
        .from_path(path)?;
    if records.is_empty() {
        writer.write_record(["Filename", "Transcription"])?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Export annotations to YAML format.
pub fn export_yaml(records: &[AnnotationRecord], path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(records)?;
    fs::write(path, yaml).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Export annotations to JSON format.
pub fn export_json(records: &[AnnotationRecord], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
