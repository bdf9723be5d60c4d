// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Antfarm daemon library.
//!
//! Exposes the IPC protocol types for CLI clients plus the lifecycle and
//! listener machinery the `antfarmd` binary wires together.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod lifecycle;
pub mod listener;
pub mod protocol;
pub mod workflow_ops;

pub use protocol::{
    ClaimedWorkDto, ManifestFormat, ProtocolError, Query, Request, Response, RunDetail,
    RunSummary, WorkflowSummary, DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE, PROTOCOL_VERSION,
};
