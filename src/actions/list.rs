//! Listing of selected files and duplicate groups.
//!
//! Text output uses one fixed-width line per file:
//!
//! ```text
//! report.txt                     2048
//! ```
//!
//! and, in duplicate mode, a `checksum:` header per group followed by its
//! members oldest first:
//!
//! ```text
//! checksum: 9f86d081...
//! /data/a/report.txt             last modified: 2024-03-01 10:22:31
//! /data/b/report.txt             last modified: 2024-03-04 08:01:12
//! ```
//!
//! JSON output writes the whole selection as one document.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};
use log::Level;
use serde::Serialize;

use super::RecordSink;
use crate::config::OutputFormat;
use crate::duplicates::{DuplicateGroup, DuplicateReport};
use crate::scanner::{FileRecord, ScanError};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Text line for one selected file.
#[must_use]
pub fn format_file_record(record: &FileRecord) -> String {
    format!("{:<30} {:<15}", record.file_name(), record.size)
}

/// Text line for one member of a duplicate group.
#[must_use]
pub fn format_duplicate_member(record: &FileRecord) -> String {
    format!(
        "{:<30} last modified: {}",
        absolute(&record.path).display(),
        format_timestamp(record.modified)
    )
}

/// Local time rendering of a modification time.
#[must_use]
pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format(TIMESTAMP_FORMAT).to_string()
}

/// Render an elapsed duration as `HH:MM:SS.mmm`.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    let secs = millis / 1000;
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        millis % 1000
    )
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[derive(Serialize)]
struct JsonFile {
    path: PathBuf,
    name: String,
    size: u64,
    modified: DateTime<Local>,
}

impl From<&FileRecord> for JsonFile {
    fn from(record: &FileRecord) -> Self {
        Self {
            path: absolute(&record.path),
            name: record.file_name(),
            size: record.size,
            modified: DateTime::<Local>::from(record.modified),
        }
    }
}

#[derive(Serialize)]
struct JsonGroup {
    checksum: String,
    size: u64,
    files: Vec<JsonFile>,
}

impl From<&DuplicateGroup> for JsonGroup {
    fn from(group: &DuplicateGroup) -> Self {
        Self {
            checksum: group.hash_hex(),
            size: group.size,
            files: group.files.iter().map(JsonFile::from).collect(),
        }
    }
}

#[derive(Serialize)]
struct JsonFileList {
    files: Vec<JsonFile>,
    total_size: u64,
}

#[derive(Serialize)]
struct JsonDuplicateList {
    groups: Vec<JsonGroup>,
    reclaimable_space: u64,
}

fn emit_json<T: Serialize>(document: &T, sink: &dyn RecordSink) {
    match serde_json::to_string_pretty(document) {
        Ok(json) => sink.record(Level::Info, &json),
        Err(e) => sink.record(Level::Error, &format!("failed to serialize output: {}", e)),
    }
}

/// List selected files once the whole walk has succeeded.
///
/// Returns the number of files listed.
///
/// # Errors
///
/// Returns the first [`ScanError`] produced by `records`. Nothing is emitted
/// in that case.
pub fn list_files<I>(records: I, format: OutputFormat, sink: &dyn RecordSink) -> Result<usize, ScanError>
where
    I: IntoIterator<Item = Result<FileRecord, ScanError>>,
{
    let records = records.into_iter().collect::<Result<Vec<_>, _>>()?;

    match format {
        OutputFormat::Text => {
            for record in &records {
                sink.record(Level::Info, &format_file_record(record));
            }
        }
        OutputFormat::Json => {
            let document = JsonFileList {
                total_size: records.iter().map(|r| r.size).sum(),
                files: records.iter().map(JsonFile::from).collect(),
            };
            emit_json(&document, sink);
        }
    }
    Ok(records.len())
}

/// List duplicate groups. Returns the number of files listed.
pub fn list_duplicates(report: &DuplicateReport, format: OutputFormat, sink: &dyn RecordSink) -> usize {
    match format {
        OutputFormat::Text => {
            for group in report {
                sink.record(Level::Info, &format!("checksum: {}", group.hash_hex()));
                for file in &group.files {
                    sink.record(Level::Info, &format_duplicate_member(file));
                }
            }
        }
        OutputFormat::Json => {
            let document = JsonDuplicateList {
                groups: report.iter().map(JsonGroup::from).collect(),
                reclaimable_space: report.reclaimable_space(),
            };
            emit_json(&document, sink);
        }
    }
    report.file_count()
}
