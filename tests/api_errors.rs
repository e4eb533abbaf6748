// API error path tests
// These exercise the error taxonomy and the atomicity guarantees of the
// store-mutating operations.

use flon_core::error::{ParserError, QueryError};
use flon_core::{Flon, FlonError, Value};

#[test]
fn test_get_missing_path_is_key_error() {
    let mut flon = Flon::new();
    flon.parse("@root (a: 1)").unwrap();

    let err = flon.get("nonexistent/path").unwrap_err();
    assert!(matches!(
        err,
        FlonError::Query(QueryError::PathNotFound { .. })
    ));
}

#[test]
fn test_get_missing_segment_names_it() {
    let mut flon = Flon::new();
    flon.parse("@root (a: 1)").unwrap();

    match flon.get("root/missing").unwrap_err() {
        FlonError::Query(QueryError::PathNotFound { path, segment }) => {
            assert_eq!(path, "root/missing");
            assert_eq!(segment, "missing");
        }
        other => panic!("expected PathNotFound, got {other:?}"),
    }
}

#[test]
fn test_descending_into_scalar_is_key_error() {
    let mut flon = Flon::new();
    flon.parse(r#"@root (app: "MyApp")"#).unwrap();

    let err = flon.get("root/app/deeper").unwrap_err();
    assert!(matches!(
        err,
        FlonError::Query(QueryError::NotAnObject { .. })
    ));
}

#[test]
fn test_invalid_mode_is_value_error() {
    let mut flon = Flon::new();
    flon.parse("@users (a: 1)").unwrap();

    match flon.get_mode("users", Some("invalid_mode")).unwrap_err() {
        FlonError::Query(QueryError::InvalidMode { mode }) => {
            assert_eq!(mode, "invalid_mode");
        }
        other => panic!("expected InvalidMode, got {other:?}"),
    }
}

#[test]
fn test_type_mismatch_propagates_with_path() {
    let mut flon = Flon::new();
    let err = flon.parse(r#"@root (name: int: "text")"#).unwrap_err();
    match err {
        FlonError::Parser(ParserError::TypeMismatch { path, .. }) => {
            assert_eq!(path, "root/name");
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
}

#[test]
fn test_failed_parse_leaves_store_untouched() {
    let mut flon = Flon::new();
    flon.parse(r#"@root (app: "MyApp")"#).unwrap();

    let err = flon.parse("@root (broken: int: ");
    assert!(err.is_err());

    // Prior state intact, nothing from the failed document.
    assert_eq!(
        flon.get("root/app").unwrap(),
        Value::String("MyApp".to_string())
    );
    assert!(flon.get("root/broken").is_err());
}

#[test]
fn test_failed_parse_does_not_add_other_roots() {
    let mut flon = Flon::new();
    // The first block is valid but the document as a whole is not.
    let err = flon.parse("@ok (a: 1) @bad (b: ");
    assert!(err.is_err());
    assert!(flon.get("ok/a").is_err());
}

#[test]
fn test_load_missing_file() {
    let mut flon = Flon::new();
    let err = flon.load("definitely/not/here.flon").unwrap_err();
    assert!(matches!(err, FlonError::FileNotFound { .. }));
}

#[test]
fn test_load_parse_error_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.flon");
    std::fs::write(&path, "@root (a: ").unwrap();

    let mut flon = Flon::new();
    let err = flon.load(&path).unwrap_err();
    assert!(matches!(err, FlonError::Parser(_)));
}

#[test]
fn test_pretty_on_missing_path_fails() {
    let flon = Flon::new();
    assert!(matches!(
        flon.pretty("ghost").unwrap_err(),
        FlonError::Query(QueryError::PathNotFound { .. })
    ));
}

#[test]
fn test_empty_path_is_key_error() {
    let mut flon = Flon::new();
    flon.parse("@root (a: 1)").unwrap();
    assert!(matches!(
        flon.get("").unwrap_err(),
        FlonError::Query(QueryError::PathNotFound { .. })
    ));
}
