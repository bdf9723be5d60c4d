// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The only path by which filesystem state influences scheduling: reading
//! and archiving a developer agent's `progress.txt`.

use std::path::Path;

const NO_PROGRESS_YET: &str = "(no progress yet)";

/// Read `progress.txt` from an agent's workspace. A missing file is not an
/// error — it simply means the agent hasn't reported anything yet.
pub fn read_progress(workspace_root: &Path) -> String {
    match std::fs::read_to_string(workspace_root.join("progress.txt")) {
        Ok(contents) => contents,
        Err(_) => NO_PROGRESS_YET.to_string(),
    }
}

/// Move `progress.txt` to `archive/<run_id>/progress.txt` on run completion.
/// A missing source file is a no-op: there is nothing to archive.
pub fn archive_progress(workspace_root: &Path, run_id: &str) -> std::io::Result<()> {
    let source = workspace_root.join("progress.txt");
    if !source.exists() {
        return Ok(());
    }
    let archive_dir = workspace_root.join("archive").join(run_id);
    std::fs::create_dir_all(&archive_dir)?;
    std::fs::rename(&source, archive_dir.join("progress.txt"))
}

#[cfg(test)]
#[path = "workspace_bridge_tests.rs"]
mod tests;
