// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A `Run` is one execution of an installed workflow.

use crate::step_result::StepResult;
use crate::workflow::{AgentId, WorkflowId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

crate::define_id! {
    /// Identifier of a run.
    pub struct RunId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Paused,
    Blocked,
    Completed,
    Canceled,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Canceled)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Running => write!(f, "running"),
            RunStatus::Paused => write!(f, "paused"),
            RunStatus::Blocked => write!(f, "blocked"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Canceled => write!(f, "canceled"),
        }
    }
}

/// One live execution of a `WorkflowSpec`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub workflow_id: WorkflowId,
    pub task_title: String,
    pub lead_agent_id: AgentId,
    pub session_label: String,
    pub status: RunStatus,
    pub current_step_index: usize,
    #[serde(default)]
    pub context: HashMap<String, String>,
    #[serde(default)]
    pub results: Vec<StepResult>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl Run {
    /// Merge context entries, last-writer-wins (invariant 6).
    pub fn merge_context(&mut self, entries: impl IntoIterator<Item = (String, String)>) {
        for (k, v) in entries {
            self.context.insert(k, v);
        }
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
