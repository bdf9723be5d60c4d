// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event-batch construction for workflow install/run, the one layer of the
//! run lifecycle the step engine itself doesn't own (§4.4 only covers
//! `claim`/`complete`/`fail`/`cancel_run` on an already-running run).

use antfarm_core::{
    AgentId, Clock, Event, IdGen, RunId, StepInstanceId, StepInstanceStatus, WorkflowId,
    WorkflowSpec,
};
use antfarm_storage::Store;

/// Build the single event that installs (or reinstalls) a workflow spec.
pub fn install_event(spec: WorkflowSpec) -> Event {
    Event::WorkflowInstalled { spec }
}

/// Build the event that removes an installed workflow. Runs already created
/// from it are unaffected — they keep the spec denormalized onto their own
/// step instances.
pub fn uninstall_event(workflow_id: &str) -> Event {
    Event::WorkflowRemoved {
        id: WorkflowId::new(workflow_id),
    }
}

/// Start a new run of `workflow`: one `RunCreated` plus one
/// `StepInstanceCreated` per step definition, the first `pending` and the
/// rest `waiting` (mirrors the state `claim`/`complete` expect to find
/// already in place for every run they touch).
pub fn start_run_events<C: Clock, I: IdGen>(
    clock: &C,
    id_gen: &I,
    workflow: &WorkflowSpec,
    task_title: &str,
    lead_agent_id: &str,
    session_label: &str,
) -> (RunId, Vec<Event>) {
    let run_id = RunId::new(id_gen.next());
    let now = clock.epoch_ms();

    let mut events = vec![Event::RunCreated {
        id: run_id.clone(),
        workflow_id: workflow.id.clone(),
        task_title: task_title.to_string(),
        lead_agent_id: AgentId::new(lead_agent_id),
        session_label: session_label.to_string(),
        created_at_epoch_ms: now,
    }];

    for (idx, step) in workflow.steps.iter().enumerate() {
        let status = if idx == 0 {
            StepInstanceStatus::Pending
        } else {
            StepInstanceStatus::Waiting
        };
        events.push(Event::StepInstanceCreated {
            id: StepInstanceId::new(format!("{run_id}:{}", step.id)),
            run_id: run_id.clone(),
            def_id: step.id.clone(),
            agent_id: step.agent.clone(),
            kind: step.kind.clone(),
            status,
        });
    }

    (run_id, events)
}

/// Apply `events` to `store` in one batch.
pub fn apply(store: &mut Store, events: &[Event]) -> antfarm_core::Result<()> {
    store.apply(events)
}

#[cfg(test)]
#[path = "workflow_ops_tests.rs"]
mod tests;
