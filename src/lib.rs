//! fquery - select files by name and size, find duplicates, list or delete them
//!
//! A query walks a source directory, keeps the files that satisfy a
//! filename constraint and a size constraint, and optionally narrows them to
//! groups of identical content using a two-phase size-then-BLAKE3 comparison.
//! The selection is then listed or deleted.

pub mod actions;
pub mod cli;
pub mod config;
pub mod constraints;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod progress;
pub mod query;
pub mod scanner;
pub mod signal;

use std::sync::Arc;

use anyhow::Context;

use crate::actions::{execute, Action, DeleteConfig, LogSink, RecordSink, StdoutSink};
use crate::cli::Cli;
use crate::config::Config;
use crate::constraints::{FileFilter, FilenameConstraint, FilenameConstraintConfig, SizeConstraint};
use crate::duplicates::DetectorConfig;
use crate::error::ExitCode;
use crate::progress::Progress;
use crate::query::{Query, QueryConfig};
use crate::signal::ShutdownHandler;

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened, traversal fails or the
/// run is interrupted. Per-file failures and empty selections are reported
/// through the sink and still exit with [`ExitCode::Success`].
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())
        .context("Failed to open log file")?;

    let config = Config::load();
    log::debug!("Effective configuration: {:?}", config);

    let shutdown = signal::install_handler().unwrap_or_else(|e| {
        log::warn!("{}, Ctrl+C will terminate immediately", e);
        ShutdownHandler::new()
    });

    let filter = FileFilter::new(
        FilenameConstraint::new(FilenameConstraintConfig {
            contains: cli.matches.clone(),
            include_extensions: cli.include_ext.clone(),
            exclude_extensions: cli.exclude_ext.clone(),
            case_insensitive: cli.case_insensitive || config.case_insensitive,
        }),
        SizeConstraint::new(cli.min_size, cli.max_size, cli.exact_size),
    );

    let mut detector = DetectorConfig::default()
        .with_io_threads(cli.io_threads.unwrap_or(config.io_threads))
        .with_shutdown_flag(shutdown.get_flag());
    if cli.duplicates && config.progress && !cli.no_progress && !cli.quiet {
        detector = detector.with_progress_callback(Arc::new(Progress::new()));
    }

    let query = Query::new(
        QueryConfig::new(cli.source.clone(), filter)
            .recursive(cli.recursive)
            .duplicates(cli.duplicates)
            .with_detector(detector),
    );

    let action = if cli.delete {
        if cli.trash || config.trash {
            Action::Delete(DeleteConfig::trash())
        } else {
            Action::Delete(DeleteConfig::permanent())
        }
    } else {
        Action::List(cli.output.unwrap_or(config.output))
    };

    let sink: &dyn RecordSink = if cli.log_file.is_some() {
        &LogSink
    } else {
        &StdoutSink
    };

    log::debug!("Running {:?} on {}", action, query.root().display());
    let outcome = execute(&query, &action, sink)
        .with_context(|| format!("Query on {} failed", cli.source.display()))?;

    if outcome.failures > 0 {
        log::warn!("{} file(s) could not be hashed or deleted", outcome.failures);
    }
    log::debug!("Selected {} file(s) in {:?}", outcome.selected, outcome.elapsed);

    Ok(ExitCode::Success)
}
