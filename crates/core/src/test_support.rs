// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::event::Event;
use crate::run::{RunId, RunStatus};
use crate::step_instance::{StepInstanceId, StepInstanceStatus};
use crate::workflow::{AgentId, StepId, StepKind, WorkflowId};
use std::collections::HashMap;

pub fn run_created_event(id: &str, workflow_id: &str, title: &str) -> Event {
    Event::RunCreated {
        id: RunId::new(id),
        workflow_id: WorkflowId::new(workflow_id),
        task_title: title.to_string(),
        lead_agent_id: AgentId::new("dev"),
        session_label: "main".to_string(),
        created_at_epoch_ms: 1_000_000,
    }
}

pub fn run_status_changed_event(id: &str, status: RunStatus) -> Event {
    Event::RunStatusChanged {
        id: RunId::new(id),
        status,
        updated_at_epoch_ms: 1_000_000,
    }
}

pub fn step_instance_created_event(
    id: &str,
    run_id: &str,
    def_id: &str,
    agent_id: &str,
    status: StepInstanceStatus,
) -> Event {
    Event::StepInstanceCreated {
        id: StepInstanceId::new(id),
        run_id: RunId::new(run_id),
        def_id: StepId::new(def_id),
        agent_id: AgentId::new(agent_id),
        kind: StepKind::Single,
        status,
    }
}

pub fn step_instance_status_changed_event(id: &str, status: StepInstanceStatus) -> Event {
    Event::StepInstanceStatusChanged {
        id: StepInstanceId::new(id),
        status,
    }
}

pub fn context_merged_event(run_id: &str, entries: &[(&str, &str)]) -> Event {
    Event::RunContextMerged {
        id: RunId::new(run_id),
        entries: entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
    }
}
