// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Storage layer for Antfarm: the event-sourced WAL, the materialized state
//! it replays into, and periodic compressed checkpoints.

mod checkpoint;
mod migration;
mod snapshot;
mod state;
mod store;
mod wal;

pub use checkpoint::{
    load_snapshot, CheckpointError, CheckpointHandle, CheckpointResult, CheckpointWriter,
    Checkpointer, FsCheckpointWriter, CURRENT_SNAPSHOT_VERSION,
};
pub use migration::{Migration, MigrationError, MigrationRegistry};
pub use snapshot::{Snapshot, SnapshotError};
pub use state::MaterializedState;
pub use store::Store;
pub use wal::{Wal, WalEntry, WalError};
