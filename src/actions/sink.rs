//! Destinations for the records produced by list and delete.

use std::io::{self, Write};

use log::Level;

/// Receiver for user-facing records.
pub trait RecordSink {
    /// Emit one record at the given level.
    fn record(&self, level: Level, message: &str);
}

/// Writes records to standard output.
///
/// Warnings and errors go to stderr so that stdout stays parseable;
/// debug and trace records are handed to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl RecordSink for StdoutSink {
    fn record(&self, level: Level, message: &str) {
        match level {
            Level::Error | Level::Warn => {
                let _ = writeln!(io::stderr().lock(), "{}: {}", level.as_str().to_lowercase(), message);
            }
            Level::Info => {
                // Broken pipes (e.g. `| head`) are not worth reporting.
                let _ = writeln!(io::stdout().lock(), "{}", message);
            }
            Level::Debug | Level::Trace => log::log!(level, "{}", message),
        }
    }
}

/// Forwards records to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl RecordSink for LogSink {
    fn record(&self, level: Level, message: &str) {
        log::log!(target: "fquery::records", level, "{}", message);
    }
}
