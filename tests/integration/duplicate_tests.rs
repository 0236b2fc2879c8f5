use crate::common::{write_file, CollectingSink};
use fquery::actions::{execute, Action};
use fquery::config::OutputFormat;
use fquery::constraints::{FileFilter, FilenameConstraint, SizeConstraint};
use fquery::duplicates::DetectorConfig;
use fquery::query::{Query, QueryConfig};
use fquery::scanner::hash_to_hex;
use log::Level;
use std::path::PathBuf;
use tempfile::TempDir;

fn duplicate_query(dir: &TempDir) -> Query {
    Query::new(
        QueryConfig::new(dir.path().to_path_buf(), FileFilter::default())
            .recursive(true)
            .duplicates(true),
    )
}

#[test]
fn test_same_size_different_content_is_not_grouped() {
    let dir = TempDir::new().unwrap();
    let a = write_file(dir.path(), "A", b"XXXXXXXXXX", 100);
    let b = write_file(dir.path(), "B", b"XXXXXXXXXX", 200);
    write_file(dir.path(), "C", b"YYYYYYYYYY", 300);
    write_file(dir.path(), "D", b"XXXXXXXXXXXXXXXXXXXX", 400);

    let query = duplicate_query(&dir);
    let report = query.duplicates().unwrap();

    assert_eq!(report.len(), 1);
    assert_eq!(report.groups()[0].paths(), vec![a, b]);
    assert_eq!(report.groups()[0].size, 10);
}

#[test]
fn test_groups_are_addressable_by_checksum() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "one", b"payload", 0);
    write_file(dir.path(), "two", b"payload", 0);

    let query = duplicate_query(&dir);
    let report = query.duplicates().unwrap();
    let hex = hash_to_hex(&blake3::hash(b"payload").into());

    let group = report.get(&hex).unwrap();
    assert_eq!(group.len(), 2);
    assert!(report.get(&hex.to_uppercase()).is_some());
    assert!(report.get(&"0".repeat(64)).is_none());
}

#[test]
fn test_members_ordered_by_mtime_then_path() {
    let dir = TempDir::new().unwrap();
    let newest = write_file(dir.path(), "a/newest", b"same bytes", 3_000);
    let tie_b = write_file(dir.path(), "b/tie", b"same bytes", 1_000);
    let tie_a = write_file(dir.path(), "a/tie", b"same bytes", 1_000);
    let middle = write_file(dir.path(), "c/middle", b"same bytes", 2_000);

    let query = duplicate_query(&dir);
    let group = &query.duplicates().unwrap().groups()[0];

    assert_eq!(group.paths(), vec![tie_a, tie_b, middle, newest]);
}

#[test]
fn test_repeated_detection_is_identical() {
    let dir = TempDir::new().unwrap();
    for i in 0..6 {
        write_file(dir.path(), &format!("set1/{}.bin", i), b"first set", i);
        write_file(dir.path(), &format!("set2/{}.bin", i), b"the second set", i);
    }
    write_file(dir.path(), "lonely.bin", b"nothing like me", 0);

    let first = duplicate_query(&dir).duplicates().unwrap().clone();
    let second = duplicate_query(&dir).duplicates().unwrap().clone();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert!(first.groups()[0].size >= first.groups()[1].size);
}

#[test]
fn test_every_group_shares_size_and_hash() {
    let dir = TempDir::new().unwrap();
    let contents: [&[u8]; 4] = [b"alpha", b"bravo", b"alpha", b"charlie"];
    for (i, content) in contents.iter().enumerate() {
        write_file(dir.path(), &format!("f{}", i), content, 0);
        write_file(dir.path(), &format!("copy/f{}", i), content, 0);
    }

    let query = duplicate_query(&dir);
    let report = query.duplicates().unwrap();

    for group in report {
        assert!(group.len() >= 2);
        for file in &group.files {
            assert_eq!(file.size, group.size);
            let bytes = std::fs::read(&file.path).unwrap();
            assert_eq!(*blake3::hash(&bytes).as_bytes(), group.hash);
        }
    }
    let alpha = report.get(&hash_to_hex(&blake3::hash(b"alpha").into())).unwrap();
    assert_eq!(alpha.len(), 4);
}

#[test]
fn test_constraints_apply_before_detection() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "big1", &[1u8; 4096], 0);
    write_file(dir.path(), "big2", &[1u8; 4096], 0);
    write_file(dir.path(), "small1", b"tiny", 0);
    write_file(dir.path(), "small2", b"tiny", 0);

    let filter = FileFilter::new(
        FilenameConstraint::accept_all(),
        SizeConstraint::new(Some(1024), None, None),
    );
    let query = Query::new(
        QueryConfig::new(dir.path().to_path_buf(), filter)
            .duplicates(true)
            .with_detector(DetectorConfig::default().with_io_threads(2)),
    );

    let report = query.duplicates().unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report.groups()[0].size, 4096);
}

#[test]
fn test_list_duplicates_text_format() {
    let dir = TempDir::new().unwrap();
    let old = write_file(dir.path(), "old.txt", b"dup", 1_000);
    let new = write_file(dir.path(), "new.txt", b"dup", 2_000);
    let sink = CollectingSink::default();

    let outcome = execute(&duplicate_query(&dir), &Action::List(OutputFormat::Text), &sink).unwrap();

    assert_eq!(outcome.selected, 2);
    let lines = sink.at(Level::Info);
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        format!("checksum: {}", hash_to_hex(&blake3::hash(b"dup").into()))
    );
    let absolute = |p: PathBuf| std::path::absolute(p).unwrap().display().to_string();
    assert!(lines[1].starts_with(&absolute(old)));
    assert!(lines[2].starts_with(&absolute(new)));
    assert!(lines[1].contains(" last modified: "));
    assert!(lines[3].starts_with("elapsed time: "));
}

#[test]
fn test_list_duplicates_json_format() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "x1", b"json", 0);
    write_file(dir.path(), "x2", b"json", 0);
    write_file(dir.path(), "y", b"solo", 0);
    let sink = CollectingSink::default();

    execute(&duplicate_query(&dir), &Action::List(OutputFormat::Json), &sink).unwrap();

    let lines = sink.at(Level::Info);
    assert_eq!(lines.len(), 1);
    let doc: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    let groups = doc["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["files"].as_array().unwrap().len(), 2);
    assert_eq!(doc["reclaimable_space"], 4);
}
