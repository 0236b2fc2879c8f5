//! Shared helpers for integration tests.

use filetime::FileTime;
use fquery::actions::RecordSink;
use log::Level;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Sink that keeps every record for later inspection.
#[derive(Default)]
pub struct CollectingSink {
    records: Mutex<Vec<(Level, String)>>,
}

impl CollectingSink {
    pub fn at(&self, level: Level) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl RecordSink for CollectingSink {
    fn record(&self, level: Level, message: &str) {
        self.records.lock().unwrap().push((level, message.to_string()));
    }
}

/// Write `content` to `dir/name`, creating parent directories, and pin its
/// modification time to `mtime` seconds after the epoch.
pub fn write_file(dir: &Path, name: &str, content: &[u8], mtime: i64) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    filetime::set_file_mtime(&path, FileTime::from_unix_time(mtime, 0)).unwrap();
    path
}
