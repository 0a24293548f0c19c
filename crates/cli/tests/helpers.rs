use std::fs;

use seminal_slicer::{canonicalize_or_current, sha256_file};
use sha2::{Digest, Sha256};
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_returns_cwd_for_dot() {
    let cwd = std::env::current_dir().expect("cwd");
    assert_eq!(canonicalize_or_current(".").expect("canonicalize"), cwd);
}

#[test]
fn canonicalize_or_current_resolves_existing_path() {
    let tmp = tempdir().expect("tempdir");
    let nested = tmp.path().join("nested");
    fs::create_dir_all(&nested).expect("create nested");

    let result = canonicalize_or_current(nested.to_str().unwrap()).expect("canonicalize nested");
    assert_eq!(result, nested.canonicalize().expect("canonicalize"));
}

#[test]
fn canonicalize_or_current_joins_missing_relative_path() {
    let cwd = std::env::current_dir().expect("cwd");
    let result = canonicalize_or_current("does/not/exist.json").expect("join");
    assert_eq!(result, cwd.join("does/not/exist.json"));
}

#[test]
fn sha256_file_matches_direct_digest() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("module.json");
    fs::write(&path, b"{\"name\":\"m\"}").expect("write");

    let mut hasher = Sha256::new();
    hasher.update(b"{\"name\":\"m\"}");
    let expected = format!("{:x}", hasher.finalize());
    assert_eq!(sha256_file(&path).expect("hash"), expected);
}

#[test]
fn sha256_file_reports_missing_path() {
    let tmp = tempdir().expect("tempdir");
    let err = sha256_file(&tmp.path().join("absent.json")).unwrap_err();
    assert!(err.to_string().contains("Failed to open file for hashing"));
}
