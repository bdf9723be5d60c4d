// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn missing_progress_file_reads_as_placeholder() {
    let dir = tempdir().unwrap();
    assert_eq!(read_progress(dir.path()), NO_PROGRESS_YET);
}

#[test]
fn reads_existing_progress_file() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("progress.txt"), "step 2 of 5").unwrap();
    assert_eq!(read_progress(dir.path()), "step 2 of 5");
}

#[test]
fn archive_moves_progress_under_run_id() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("progress.txt"), "done").unwrap();
    archive_progress(dir.path(), "run-1").unwrap();

    assert!(!dir.path().join("progress.txt").exists());
    let archived = dir.path().join("archive").join("run-1").join("progress.txt");
    assert_eq!(std::fs::read_to_string(archived).unwrap(), "done");
}

#[test]
fn archive_without_a_progress_file_is_a_no_op() {
    let dir = tempdir().unwrap();
    archive_progress(dir.path(), "run-1").unwrap();
    assert!(!dir.path().join("archive").exists());
}
