// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn nonexistent_directory_is_reported_as_a_single_failure() {
    let report = discover(Path::new("/no/such/directory/at/all"), "so");
    assert!(report.loaded.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert!(!report.is_clean());
}

#[yare::parameterized(
    empty_directory          = { vec![] },
    non_matching_extensions  = { vec![("notes.txt", "not a plugin"), ("readme.md", "not a plugin either")] },
)]
fn directories_with_no_plugin_candidates_yield_a_clean_report(files: Vec<(&str, &str)>) {
    let dir = tempdir().unwrap();
    for (name, contents) in files {
        fs::write(dir.path().join(name), contents.as_bytes()).unwrap();
    }

    let report = discover(dir.path(), "so");
    assert!(report.loaded.is_empty());
    assert!(report.failures.is_empty());
    assert!(report.is_clean());
}

#[test]
fn a_file_with_the_matching_extension_that_is_not_a_real_library_fails_without_aborting_the_sweep() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bogus.so"), b"this is not an ELF shared object").unwrap();
    fs::write(dir.path().join("also_bogus.so"), b"neither is this").unwrap();
    fs::write(dir.path().join("skip_me.txt"), b"ignored").unwrap();

    let report = discover(dir.path(), "so");
    assert!(report.loaded.is_empty());
    assert_eq!(report.failures.len(), 2);
    let failed_paths: Vec<_> = report.failures.iter().map(|f| f.path.clone()).collect();
    assert!(failed_paths.contains(&dir.path().join("bogus.so")));
    assert!(failed_paths.contains(&dir.path().join("also_bogus.so")));
    assert!(!report.is_clean());
}
