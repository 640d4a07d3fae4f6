// tests/walk_tests.rs
use std::fs;

use oops::error::ErrorKind;
use oops::list_files;
use tempfile::tempdir;

#[test]
fn test_list_files_recurses_and_skips_directories() {
    let root = tempdir().unwrap();
    let nested = root.path().join("a/b/c");
    fs::create_dir_all(&nested).unwrap();
    fs::create_dir_all(root.path().join("empty")).unwrap();

    for i in 0..4 {
        fs::write(root.path().join(format!("top-{i}")), b"x").unwrap();
    }
    for i in 0..6 {
        fs::write(nested.join(format!("deep-{i}")), b"y").unwrap();
    }

    let files = list_files(root.path()).unwrap();

    assert_eq!(files.len(), 10);
    assert!(files.iter().all(|p| p.is_absolute() && p.is_file()));
}

#[test]
fn test_list_files_of_empty_root_is_empty() {
    let root = tempdir().unwrap();
    assert!(list_files(root.path()).unwrap().is_empty());
}

#[test]
fn test_list_files_fails_for_missing_root() {
    let root = tempdir().unwrap();
    let err = list_files(root.path().join("does-not-exist")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}
