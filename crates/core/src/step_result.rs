// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Immutable record of one terminal step completion.

use crate::workflow::{AgentId, StepId};
use serde::{Deserialize, Serialize};
use std::fmt;

crate::define_id! {
    pub struct StepResultId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepResultStatus {
    #[default]
    Done,
    Retry,
    Blocked,
}

impl fmt::Display for StepResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepResultStatus::Done => write!(f, "done"),
            StepResultStatus::Retry => write!(f, "retry"),
            StepResultStatus::Blocked => write!(f, "blocked"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub id: StepResultId,
    pub step_def_id: StepId,
    pub agent_id: AgentId,
    pub output: String,
    pub status: StepResultStatus,
    pub completed_at_ms: u64,
}

#[cfg(test)]
#[path = "step_result_tests.rs"]
mod tests;
