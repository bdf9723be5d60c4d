// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One step, instantiated for one run.

use crate::run::RunId;
use crate::story::StoryId;
use crate::workflow::{AgentId, StepId, StepKind};
use serde::{Deserialize, Serialize};
use std::fmt;

crate::define_id! {
    /// Identifier of a step instance.
    pub struct StepInstanceId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepInstanceStatus {
    Waiting,
    Pending,
    Running,
    Done,
    Failed,
}

impl fmt::Display for StepInstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepInstanceStatus::Waiting => write!(f, "waiting"),
            StepInstanceStatus::Pending => write!(f, "pending"),
            StepInstanceStatus::Running => write!(f, "running"),
            StepInstanceStatus::Done => write!(f, "done"),
            StepInstanceStatus::Failed => write!(f, "failed"),
        }
    }
}

/// `StepDef.kind` and `.on_fail` are denormalized onto the instance (a copy
/// taken at run-creation time) so a manifest edit never retroactively
/// changes work already in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepInstance {
    pub id: StepInstanceId,
    pub run_id: RunId,
    pub def_id: StepId,
    pub agent_id: AgentId,
    pub kind: StepKind,
    pub status: StepInstanceStatus,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default)]
    pub current_story_id: Option<StoryId>,
}

#[cfg(test)]
#[path = "step_instance_tests.rs"]
mod tests;
