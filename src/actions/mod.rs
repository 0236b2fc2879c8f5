//! File actions module.
//!
//! This module provides functionality for:
//! - Listing selected files or duplicate groups (text or JSON)
//! - Deleting selected files with per-file failure isolation
//! - Record sinks that receive the user-facing output
//!
//! [`execute`] runs one [`Action`] against a [`Query`] and ends every run
//! with an elapsed-time record.
//!
//! ```no_run
//! use fquery::actions::{execute, Action, StdoutSink};
//! use fquery::config::OutputFormat;
//! use fquery::constraints::FileFilter;
//! use fquery::query::{Query, QueryConfig};
//! use std::path::PathBuf;
//!
//! let query = Query::new(QueryConfig::new(PathBuf::from("."), FileFilter::default()));
//! let outcome = execute(&query, &Action::List(OutputFormat::Text), &StdoutSink).unwrap();
//! println!("{} files", outcome.selected);
//! ```

pub mod delete;
pub mod list;
pub mod sink;

use std::time::{Duration, Instant};

use log::Level;

pub use delete::{
    delete_batch, delete_file, delete_to_trash, permanent_delete, select_copies,
    BatchDeleteResult, DeleteConfig, DeleteError, DeleteResult,
};
pub use list::{format_elapsed, list_duplicates, list_files};
pub use sink::{LogSink, RecordSink, StdoutSink};

use crate::config::OutputFormat;
use crate::query::{Query, QueryError};
use crate::scanner::FileRecord;

/// What to do with the selected files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Report the selection
    List(OutputFormat),
    /// Remove the selection
    Delete(DeleteConfig),
}

/// Summary of one executed action.
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    /// Files listed, or deletions attempted
    pub selected: usize,
    /// Files that could not be hashed or deleted
    pub failures: usize,
    /// Wall-clock duration of the action
    pub elapsed: Duration,
}

/// Run `action` over the files selected by `query`.
///
/// # Errors
///
/// Returns [`QueryError`] if traversal fails or the run is interrupted.
/// Nothing is deleted when traversal fails.
pub fn execute(query: &Query, action: &Action, sink: &dyn RecordSink) -> Result<Outcome, QueryError> {
    let start = Instant::now();

    let mut outcome = match action {
        Action::List(format) => run_list(query, *format, sink)?,
        Action::Delete(config) => run_delete(query, config, sink)?,
    };
    outcome.elapsed = start.elapsed();

    let elapsed = format!("elapsed time: {}", format_elapsed(outcome.elapsed));
    match action {
        // Keep stdout a single JSON document.
        Action::List(OutputFormat::Json) => log::info!("{}", elapsed),
        _ => sink.record(Level::Info, &elapsed),
    }

    Ok(outcome)
}

fn run_list(query: &Query, format: OutputFormat, sink: &dyn RecordSink) -> Result<Outcome, QueryError> {
    if query.is_duplicate_mode() {
        let (report, stats) = query.duplicates_with_stats()?;
        Ok(Outcome {
            selected: list_duplicates(report, format, sink),
            failures: stats.failed_files,
            ..Default::default()
        })
    } else {
        Ok(Outcome {
            selected: list_files(query.files()?, format, sink)?,
            ..Default::default()
        })
    }
}

fn run_delete(query: &Query, config: &DeleteConfig, sink: &dyn RecordSink) -> Result<Outcome, QueryError> {
    let (targets, hash_failures) = if query.is_duplicate_mode() {
        let (report, stats) = query.duplicates_with_stats()?;
        (select_copies(report), stats.failed_files)
    } else {
        let files = query.files()?.collect::<Result<Vec<FileRecord>, _>>()?;
        (files, 0)
    };

    log::debug!("{} files selected for deletion", targets.len());
    let result = delete_batch(&targets, config, sink);

    Ok(Outcome {
        selected: targets.len(),
        failures: hash_failures + result.failure_count(),
        ..Default::default()
    })
}
