// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event log schema.
//!
//! Every mutation the engine performs is recorded as one or more `Event`s,
//! appended to the write-ahead log and applied, in order, to the in-memory
//! projection (`antfarm_storage::MaterializedState`). Applying the same
//! event twice must be a no-op (see `MaterializedState::apply_event`):
//! handlers guard on the current value rather than blindly overwriting, so
//! a WAL entry replayed after a crash mid-flush never double-applies.
//!
//! Serializes as `{"type": "run:created", ...fields}`; unknown type tags are
//! rejected rather than silently dropped, since a log this system can't
//! fully replay is a `StoreError`, not something to paper over.

use crate::run::{RunId, RunStatus};
use crate::step_instance::{StepInstanceId, StepInstanceStatus};
use crate::step_result::StepResult;
use crate::story::{Story, StoryId, StoryStatus};
use crate::workflow::{AgentId, StepId, StepKind, WorkflowId, WorkflowSpec};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "workflow:installed")]
    WorkflowInstalled { spec: WorkflowSpec },

    #[serde(rename = "workflow:removed")]
    WorkflowRemoved { id: WorkflowId },

    #[serde(rename = "run:created")]
    RunCreated {
        id: RunId,
        workflow_id: WorkflowId,
        task_title: String,
        lead_agent_id: AgentId,
        session_label: String,
        created_at_epoch_ms: u64,
    },

    #[serde(rename = "run:status_changed")]
    RunStatusChanged {
        id: RunId,
        status: RunStatus,
        updated_at_epoch_ms: u64,
    },

    #[serde(rename = "run:step_advanced")]
    RunStepAdvanced {
        id: RunId,
        current_step_index: usize,
    },

    #[serde(rename = "run:context_merged")]
    RunContextMerged {
        id: RunId,
        entries: HashMap<String, String>,
    },

    #[serde(rename = "run:result_appended")]
    RunResultAppended { id: RunId, result: StepResult },

    #[serde(rename = "step_instance:created")]
    StepInstanceCreated {
        id: StepInstanceId,
        run_id: RunId,
        def_id: StepId,
        agent_id: AgentId,
        kind: StepKind,
        status: StepInstanceStatus,
    },

    #[serde(rename = "step_instance:status_changed")]
    StepInstanceStatusChanged {
        id: StepInstanceId,
        status: StepInstanceStatus,
    },

    #[serde(rename = "step_instance:retry_count_set")]
    StepInstanceRetryCountSet { id: StepInstanceId, retry_count: u32 },

    #[serde(rename = "step_instance:current_story_set")]
    StepInstanceCurrentStorySet {
        id: StepInstanceId,
        story_id: Option<StoryId>,
    },

    #[serde(rename = "story:created")]
    StoryCreated { story: Story },

    #[serde(rename = "story:status_changed")]
    StoryStatusChanged { id: StoryId, status: StoryStatus },

    #[serde(rename = "story:retry_count_set")]
    StoryRetryCountSet { id: StoryId, retry_count: u32 },

    #[serde(rename = "story:output_set")]
    StoryOutputSet { id: StoryId, output: String },
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
