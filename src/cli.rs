//! Command-line interface definitions for fquery.
//!
//! This module defines all CLI arguments using the clap derive API. Options
//! left unset fall back to the layered configuration (see [`crate::config`]).
//!
//! # Example
//!
//! ```bash
//! # List .log files larger than 1 MiB anywhere under /var
//! fquery -r --include-ext log --min-size 1MiB /var
//!
//! # List duplicate groups as JSON
//! fquery -r -d --output json ~/Downloads
//!
//! # Delete every duplicate copy, keeping the oldest file of each group
//! fquery -r -d --delete ~/Pictures
//! ```

use bytesize::ByteSize;
use clap::Parser;
use std::path::PathBuf;

use crate::config::OutputFormat;

/// Select files by name and size, find duplicates, list or delete them.
#[derive(Debug, Parser)]
#[command(name = "fquery")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to select files from
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Descend into subdirectories
    #[arg(short, long = "recurse")]
    pub recursive: bool,

    /// Select duplicate groups instead of individual files
    #[arg(short, long)]
    pub duplicates: bool,

    /// Delete the selected files instead of listing them
    ///
    /// With --duplicates, the oldest file of each group is kept.
    #[arg(long)]
    pub delete: bool,

    /// Move deleted files to the system trash instead of unlinking them
    #[arg(long, requires = "delete")]
    pub trash: bool,

    /// Keep only files whose name (without extension) contains this text
    #[arg(short, long = "matches", value_name = "TEXT")]
    pub matches: Option<String>,

    /// Keep only files with one of these extensions (repeatable)
    #[arg(long = "include-ext", value_name = "EXT", num_args = 1..)]
    pub include_ext: Vec<String>,

    /// Drop files with any of these extensions (repeatable)
    #[arg(long = "exclude-ext", value_name = "EXT", num_args = 1..)]
    pub exclude_ext: Vec<String>,

    /// Compare names and extensions case-insensitively
    #[arg(short = 'i', long)]
    pub case_insensitive: bool,

    /// Keep only files strictly larger than SIZE (e.g. 100, 4KB, 1MiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Keep only files strictly smaller than SIZE
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Keep only files of exactly SIZE
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub exact_size: Option<u64>,

    /// Output format for listed records
    #[arg(long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Number of I/O threads for hashing (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Write log records to this file, or to a timestamped file if it is a directory
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Report errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Parse a human-readable size such as `1024`, `4KB` or `1.5MiB` into bytes.
///
/// # Errors
///
/// Returns a message if the value is empty or not a valid size.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }
    s.parse::<ByteSize>()
        .map(|size| size.as_u64())
        .map_err(|e| format!("Invalid size '{s}': {e}"))
}
