// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transactional access to the event-sourced projection.
//!
//! `Store` ties the WAL, the materialized projection, and periodic
//! checkpointing together behind one API: every engine operation that
//! touches more than one row builds a batch of `Event`s and hands it to
//! [`Store::apply`], which appends the whole batch to the WAL and applies it
//! to the projection before returning — a crash mid-batch sees none of its
//! effects on the next replay, never some of them.

use crate::{CheckpointError, Checkpointer, MaterializedState, Snapshot, SnapshotError, Wal, WalError};
use antfarm_core::{Error, Event};
use std::path::{Path, PathBuf};

/// Checkpoint once the WAL has this many unprocessed entries since the last
/// snapshot.
const CHECKPOINT_THRESHOLD: u64 = 500;

impl From<WalError> for Error {
    fn from(e: WalError) -> Self {
        Error::StoreError(e.to_string())
    }
}

impl From<SnapshotError> for Error {
    fn from(e: SnapshotError) -> Self {
        Error::StoreError(e.to_string())
    }
}

impl From<CheckpointError> for Error {
    fn from(e: CheckpointError) -> Self {
        Error::StoreError(e.to_string())
    }
}

pub struct Store {
    wal: Wal,
    state: MaterializedState,
    checkpointer: Checkpointer,
    snapshot_path: PathBuf,
    last_checkpoint_seq: u64,
}

impl Store {
    /// Open the store rooted at `dir`, replaying the last snapshot (if any)
    /// and every WAL entry committed after it.
    pub fn open(dir: &Path) -> Result<Self, Error> {
        std::fs::create_dir_all(dir)?;
        let snapshot_path = dir.join("snapshot.zst");
        let wal_path = dir.join("wal.jsonl");

        let (mut state, seq) = match crate::load_snapshot(&snapshot_path)? {
            Some(snapshot) => (snapshot.state, snapshot.seq),
            None => (MaterializedState::default(), 0),
        };

        let mut wal = Wal::open(&wal_path, seq)?;
        while let Some(entry) = wal.next_unprocessed()? {
            state.apply_event(&entry.event);
            wal.mark_processed(entry.seq);
        }

        Ok(Self {
            wal,
            state,
            checkpointer: Checkpointer::new(snapshot_path.clone()),
            snapshot_path,
            last_checkpoint_seq: seq,
        })
    }

    pub fn state(&self) -> &MaterializedState {
        &self.state
    }

    /// Apply a batch of events atomically: append every event to the WAL,
    /// flush once, then fold them into the projection in order.
    pub fn apply(&mut self, events: &[Event]) -> Result<(), Error> {
        let mut last_seq = self.wal.processed_seq();
        for event in events {
            last_seq = self.wal.append(event)?;
        }
        self.wal.flush()?;
        for event in events {
            self.state.apply_event(event);
        }
        self.wal.mark_processed(last_seq);
        self.maybe_checkpoint()?;
        Ok(())
    }

    fn maybe_checkpoint(&mut self) -> Result<(), Error> {
        let seq = self.wal.processed_seq();
        if seq.saturating_sub(self.last_checkpoint_seq) < CHECKPOINT_THRESHOLD {
            return Ok(());
        }
        let result = self.checkpointer.checkpoint_sync(seq, &self.state)?;
        self.wal.truncate_before(result.seq)?;
        self.last_checkpoint_seq = result.seq;
        Ok(())
    }

    /// Force a synchronous checkpoint and WAL truncation, for shutdown.
    pub fn checkpoint_now(&mut self) -> Result<(), Error> {
        let seq = self.wal.processed_seq();
        let result = self.checkpointer.checkpoint_sync(seq, &self.state)?;
        self.wal.truncate_before(result.seq)?;
        self.last_checkpoint_seq = result.seq;
        Ok(())
    }

    /// Write a snapshot without touching the WAL (used by tests that want to
    /// assert on [`Snapshot`] contents directly).
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.wal.processed_seq(), self.state.clone())
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
