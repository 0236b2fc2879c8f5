use crate::common::{write_file, CollectingSink};
use fquery::actions::{execute, Action};
use fquery::config::OutputFormat;
use fquery::constraints::{FileFilter, FilenameConstraint, FilenameConstraintConfig, SizeConstraint};
use fquery::query::{Query, QueryConfig, QueryError};
use fquery::scanner::ScanError;
use log::Level;
use tempfile::TempDir;

fn names(query: &Query) -> Vec<String> {
    query
        .files()
        .unwrap()
        .map(|r| r.unwrap().file_name())
        .collect()
}

fn populate() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "monthly_report.TXT", &[b'r'; 120], 0);
    write_file(dir.path(), "notes.md", &[b'n'; 40], 0);
    write_file(dir.path(), "notes.txt", &[b'n'; 60], 0);
    write_file(dir.path(), "Makefile", &[b'm'; 80], 0);
    write_file(dir.path(), "archive/old_report.txt", &[b'o'; 200], 0);
    dir
}

#[test]
fn test_case_insensitive_substring_and_extension() {
    let dir = populate();
    let filter = FileFilter::new(
        FilenameConstraint::new(FilenameConstraintConfig {
            contains: Some("Report".to_string()),
            include_extensions: vec!["txt".to_string()],
            case_insensitive: true,
            ..Default::default()
        }),
        SizeConstraint::unbounded(),
    );
    let query = Query::new(QueryConfig::new(dir.path().to_path_buf(), filter).recursive(true));

    assert_eq!(names(&query), vec!["old_report.txt", "monthly_report.TXT"]);
}

#[test]
fn test_case_sensitive_extension_rejects_other_case() {
    let dir = populate();
    let filter = FileFilter::new(
        FilenameConstraint::new(FilenameConstraintConfig {
            include_extensions: vec!["txt".to_string()],
            ..Default::default()
        }),
        SizeConstraint::unbounded(),
    );
    let query = Query::new(QueryConfig::new(dir.path().to_path_buf(), filter));

    assert_eq!(names(&query), vec!["notes.txt"]);
}

#[test]
fn test_exclusion_wins_over_inclusion() {
    let dir = populate();
    let filter = FileFilter::new(
        FilenameConstraint::new(FilenameConstraintConfig {
            include_extensions: vec!["txt".to_string(), "md".to_string()],
            exclude_extensions: vec!["md".to_string()],
            ..Default::default()
        }),
        SizeConstraint::unbounded(),
    );
    let query = Query::new(QueryConfig::new(dir.path().to_path_buf(), filter));

    assert_eq!(names(&query), vec!["notes.txt"]);
}

#[test]
fn test_dotless_names_fail_extension_constraints_only() {
    let dir = populate();
    let by_ext = FileFilter::new(
        FilenameConstraint::new(FilenameConstraintConfig {
            exclude_extensions: vec!["md".to_string()],
            ..Default::default()
        }),
        SizeConstraint::unbounded(),
    );
    let by_name = FileFilter::new(
        FilenameConstraint::new(FilenameConstraintConfig {
            contains: Some("Make".to_string()),
            ..Default::default()
        }),
        SizeConstraint::unbounded(),
    );

    let ext_query = Query::new(QueryConfig::new(dir.path().to_path_buf(), by_ext));
    let name_query = Query::new(QueryConfig::new(dir.path().to_path_buf(), by_name));

    assert!(!names(&ext_query).contains(&"Makefile".to_string()));
    assert_eq!(names(&name_query), vec!["Makefile"]);
}

#[test]
fn test_size_bounds_are_exclusive_and_normalized() {
    let dir = populate();
    let filter = FileFilter::new(
        FilenameConstraint::accept_all(),
        SizeConstraint::new(Some(120), Some(40), None),
    );
    let query = Query::new(QueryConfig::new(dir.path().to_path_buf(), filter).recursive(true));

    assert_eq!(names(&query), vec!["Makefile", "notes.txt"]);
}

#[test]
fn test_exact_size() {
    let dir = populate();
    let filter = FileFilter::new(
        FilenameConstraint::accept_all(),
        SizeConstraint::new(None, None, Some(200)),
    );
    let query = Query::new(QueryConfig::new(dir.path().to_path_buf(), filter).recursive(true));

    assert_eq!(names(&query), vec!["old_report.txt"]);
}

#[test]
fn test_shallow_query_skips_subdirectories() {
    let dir = populate();
    let query = Query::new(QueryConfig::new(dir.path().to_path_buf(), FileFilter::default()));

    assert_eq!(names(&query).len(), 4);
}

#[test]
fn test_list_reports_every_selected_file() {
    let dir = populate();
    let query = Query::new(
        QueryConfig::new(dir.path().to_path_buf(), FileFilter::default()).recursive(true),
    );
    let sink = CollectingSink::default();

    let outcome = execute(&query, &Action::List(OutputFormat::Text), &sink).unwrap();

    assert_eq!(outcome.selected, 5);
    let lines = sink.at(Level::Info);
    assert_eq!(lines.len(), 6);
    assert!(lines.iter().any(|l| l.starts_with("notes.md ") && l.contains("40")));
    assert!(lines[5].starts_with("elapsed time: "));
}

#[test]
fn test_missing_root_is_a_traversal_error() {
    let dir = TempDir::new().unwrap();
    let query = Query::new(QueryConfig::new(
        dir.path().join("does-not-exist"),
        FileFilter::default(),
    ));
    let sink = CollectingSink::default();

    let result = execute(&query, &Action::List(OutputFormat::Text), &sink);

    assert!(matches!(result, Err(QueryError::Scan(ScanError::NotFound(_)))));
    assert!(sink.at(Level::Info).is_empty());
}

#[test]
fn test_file_root_is_a_traversal_error() {
    let dir = populate();
    let query = Query::new(QueryConfig::new(
        dir.path().join("notes.md"),
        FileFilter::default(),
    ));

    assert!(matches!(query.files(), Err(ScanError::NotADirectory(_))));
}
