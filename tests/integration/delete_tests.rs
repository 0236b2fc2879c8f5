use crate::common::{write_file, CollectingSink};
use fquery::actions::{delete_batch, execute, Action, DeleteConfig};
use fquery::constraints::{FileFilter, FilenameConstraint, FilenameConstraintConfig, SizeConstraint};
use fquery::query::{Query, QueryConfig};
use fquery::scanner::FileRecord;
use log::Level;
use std::fs;
use std::time::SystemTime;
use tempfile::TempDir;

fn record(path: std::path::PathBuf) -> FileRecord {
    let meta = fs::metadata(&path).unwrap();
    FileRecord::new(path, meta.len(), meta.modified().unwrap())
}

#[test]
fn test_second_of_three_fails_others_are_deleted() {
    let dir = TempDir::new().unwrap();
    let first = record(write_file(dir.path(), "first.tmp", b"1111", 0));
    let second = FileRecord::new(dir.path().join("vanished.tmp"), 4, SystemTime::now());
    let third = record(write_file(dir.path(), "third.tmp", b"333", 0));
    let sink = CollectingSink::default();

    let result = delete_batch(
        &[first.clone(), second.clone(), third.clone()],
        &DeleteConfig::permanent(),
        &sink,
    );

    assert!(!first.path.exists());
    assert!(!third.path.exists());
    assert_eq!(result.success_count(), 2);
    assert_eq!(result.failure_count(), 1);
    assert_eq!(result.failures[0].0, second.path);
    assert_eq!(result.bytes_freed, 7);

    let deleted = sink.at(Level::Info);
    assert_eq!(deleted.len(), 2);
    assert!(deleted[0].starts_with("first.tmp"));
    assert!(deleted[1].starts_with("third.tmp"));
    let errors = sink.at(Level::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("vanished.tmp"));
}

#[cfg(unix)]
#[test]
fn test_permission_failure_is_isolated() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let free = record(write_file(dir.path(), "free/a.tmp", b"a", 0));
    let locked_dir = dir.path().join("locked");
    let locked = record(write_file(dir.path(), "locked/b.tmp", b"b", 0));
    fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o555)).unwrap();

    let result = delete_batch(&[locked.clone(), free.clone()], &DeleteConfig::permanent(), &CollectingSink::default());
    fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(!free.path.exists());
    // Privileged users bypass directory permissions.
    if locked.path.exists() {
        assert_eq!(result.failure_count(), 1);
        assert_eq!(result.failures[0].0, locked.path);
    }
    assert!(result.successes.iter().any(|d| d.path == free.path));
}

#[test]
fn test_delete_command_removes_only_selected_files() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "keep.txt", b"keep", 0);
    write_file(dir.path(), "drop.log", b"drop", 0);
    write_file(dir.path(), "nested/drop2.log", b"drop", 0);
    let filter = FileFilter::new(
        FilenameConstraint::new(FilenameConstraintConfig {
            include_extensions: vec![".log".to_string()],
            ..Default::default()
        }),
        SizeConstraint::unbounded(),
    );
    let query = Query::new(QueryConfig::new(dir.path().to_path_buf(), filter).recursive(true));
    let sink = CollectingSink::default();

    let outcome = execute(&query, &Action::Delete(DeleteConfig::permanent()), &sink).unwrap();

    assert_eq!(outcome.selected, 2);
    assert_eq!(outcome.failures, 0);
    assert!(dir.path().join("keep.txt").exists());
    assert!(!dir.path().join("drop.log").exists());
    assert!(!dir.path().join("nested/drop2.log").exists());
}

#[test]
fn test_delete_duplicates_preserves_oldest() {
    let dir = TempDir::new().unwrap();
    let oldest = write_file(dir.path(), "z_oldest.jpg", b"photo", 1_000);
    let newer = write_file(dir.path(), "a_newer.jpg", b"photo", 2_000);
    let newest = write_file(dir.path(), "m_newest.jpg", b"photo", 3_000);
    let unique = write_file(dir.path(), "unique.jpg", b"other", 500);
    let query = Query::new(
        QueryConfig::new(dir.path().to_path_buf(), FileFilter::default()).duplicates(true),
    );
    let sink = CollectingSink::default();

    let outcome = execute(&query, &Action::Delete(DeleteConfig::permanent()), &sink).unwrap();

    assert_eq!(outcome.selected, 2);
    assert!(oldest.exists());
    assert!(!newer.exists());
    assert!(!newest.exists());
    assert!(unique.exists());
}

#[test]
fn test_nothing_selected_deletes_nothing() {
    let dir = TempDir::new().unwrap();
    let file = write_file(dir.path(), "small", b"x", 0);
    let filter = FileFilter::new(
        FilenameConstraint::accept_all(),
        SizeConstraint::new(Some(10), None, None),
    );
    let query = Query::new(QueryConfig::new(dir.path().to_path_buf(), filter));

    let outcome = execute(
        &query,
        &Action::Delete(DeleteConfig::permanent()),
        &CollectingSink::default(),
    )
    .unwrap();

    assert_eq!(outcome.selected, 0);
    assert!(file.exists());
}
