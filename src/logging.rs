//! Logging infrastructure for fquery.
//!
//! This module provides structured logging using the `log` facade and `env_logger` backend.
//! Log levels are determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. Default: info level
//!
//! Output goes to stderr unless a log file is requested, in which case the
//! file is created (or truncated) and receives every record instead.
//!
//! # Build-specific Formatting
//!
//! - **Debug builds**: Include timestamp, level, and module path for detailed debugging
//! - **Release builds**: Compact format with level and message only for cleaner output
//!
//! # Example
//!
//! ```rust,no_run
//! use fquery::logging::init_logging;
//!
//! // Initialize with default (info) level on stderr
//! init_logging(0, false, None).unwrap();
//! ```

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Initialize the logging subsystem based on CLI verbosity flags.
///
/// This function should be called once at the start of the application,
/// before any logging calls are made. Later calls leave the first logger in
/// place.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=normal, 1=debug, 2+=trace)
/// * `quiet` - If true, only show errors (overridden by RUST_LOG)
/// * `log_file` - Optional file (or directory) to write records to
///
/// # Errors
///
/// Returns an I/O error if the log file cannot be created.
pub fn init_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> io::Result<()> {
    let use_env = env::var("RUST_LOG").is_ok();

    let mut builder = Builder::new();

    if use_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    let file_path = match log_file {
        Some(path) => {
            let path = resolve_log_path(path);
            let file = File::create(&path)?;
            builder.target(Target::Pipe(Box::new(file)));
            Some(path)
        }
        None => None,
    };

    configure_format(&mut builder, verbose, file_path.is_some());

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized, keeping existing configuration");
        return Ok(());
    }

    if use_env {
        log::debug!(
            "Logging initialized from RUST_LOG environment variable: {:?}",
            env::var("RUST_LOG").ok()
        );
    } else {
        log::debug!(
            "Logging initialized at level: {:?}",
            determine_level(verbose, quiet)
        );
    }
    if let Some(path) = file_path {
        log::debug!("Writing log to {}", path.display());
    }

    Ok(())
}

/// Resolve the file a log should be written to.
///
/// A directory gets a timestamped `fquery-<timestamp>.log` file inside it;
/// any other path is used as given.
#[must_use]
pub fn resolve_log_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        path.join(format!("fquery-{}.log", stamp))
    } else {
        path.to_path_buf()
    }
}

fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Configure the log format based on build type and verbosity.
///
/// Files always get timestamps, since nothing else records when a line was written.
fn configure_format(builder: &mut Builder, verbose: u8, to_file: bool) {
    #[cfg(debug_assertions)]
    {
        let _ = to_file;
        builder.format(move |buf, record| {
            let timestamp = buf.timestamp_seconds();
            let level = record.level();
            let level_style = buf.default_level_style(level);

            if verbose >= 1 {
                writeln!(
                    buf,
                    "{} {level_style}{:<5}{level_style:#} [{}] {}",
                    timestamp,
                    level,
                    record.module_path().unwrap_or("unknown"),
                    record.args()
                )
            } else {
                writeln!(
                    buf,
                    "{} {level_style}{:<5}{level_style:#} {}",
                    timestamp,
                    level,
                    record.args()
                )
            }
        });
    }

    #[cfg(not(debug_assertions))]
    {
        let _ = verbose;
        builder.format(move |buf, record| {
            let level = record.level();
            let level_style = buf.default_level_style(level);
            if to_file {
                writeln!(
                    buf,
                    "{} {level_style}{:<5}{level_style:#} {}",
                    buf.timestamp_seconds(),
                    level,
                    record.args()
                )
            } else {
                writeln!(
                    buf,
                    "{level_style}{:<5}{level_style:#} {}",
                    level,
                    record.args()
                )
            }
        });
    }
}
