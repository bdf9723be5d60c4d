// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use antfarm_core::test_support::{
    context_merged_event, run_created_event, run_status_changed_event,
    step_instance_created_event, step_instance_status_changed_event,
};
use antfarm_core::{RunStatus, StepInstanceStatus};

#[test]
fn run_created_is_idempotent() {
    let mut state = MaterializedState::default();
    let event = run_created_event("run-1", "wf-1", "demo");
    state.apply_event(&event);
    state.apply_event(&event);
    assert_eq!(state.runs.len(), 1);
}

#[test]
fn run_status_changed_applies_as_assignment() {
    let mut state = MaterializedState::default();
    state.apply_event(&run_created_event("run-1", "wf-1", "demo"));
    state.apply_event(&run_status_changed_event("run-1", RunStatus::Blocked));
    state.apply_event(&run_status_changed_event("run-1", RunStatus::Blocked));
    assert_eq!(state.get_run("run-1").unwrap().status, RunStatus::Blocked);
}

#[test]
fn context_merge_is_last_writer_wins_and_idempotent() {
    let mut state = MaterializedState::default();
    state.apply_event(&run_created_event("run-1", "wf-1", "demo"));
    state.apply_event(&context_merged_event("run-1", &[("k", "v1")]));
    state.apply_event(&context_merged_event("run-1", &[("k", "v2")]));
    state.apply_event(&context_merged_event("run-1", &[("k", "v2")]));
    assert_eq!(
        state.get_run("run-1").unwrap().context.get("k"),
        Some(&"v2".to_string())
    );
}

#[test]
fn get_run_resolves_unique_prefix() {
    let mut state = MaterializedState::default();
    state.apply_event(&run_created_event("run-abcdef", "wf-1", "demo"));
    assert!(state.get_run("run-abc").is_some());
}

#[test]
fn get_run_prefix_ambiguous_returns_none() {
    let mut state = MaterializedState::default();
    state.apply_event(&run_created_event("run-abc1", "wf-1", "demo"));
    state.apply_event(&run_created_event("run-abc2", "wf-1", "demo"));
    assert!(state.get_run("run-abc").is_none());
}

#[test]
fn next_pending_step_for_agent_requires_running_run() {
    let mut state = MaterializedState::default();
    state.apply_event(&run_created_event("run-1", "wf-1", "demo"));
    state.apply_event(&step_instance_created_event(
        "si-1",
        "run-1",
        "plan",
        "dev",
        StepInstanceStatus::Pending,
    ));
    assert!(state.next_pending_step_for_agent("dev").is_some());

    state.apply_event(&run_status_changed_event("run-1", RunStatus::Blocked));
    assert!(state.next_pending_step_for_agent("dev").is_none());
}

#[test]
fn next_pending_step_for_agent_tie_breaks_by_created_at_then_step_index() {
    use antfarm_core::{AgentId, WorkflowId};

    let mut state = MaterializedState::default();

    // A step instance id that sorts *before* the older run's, to prove the
    // pick isn't following id order.
    state.apply_event(&Event::RunCreated {
        id: RunId::new("run-zzz-newer"),
        workflow_id: WorkflowId::new("wf-1"),
        task_title: "newer".to_string(),
        lead_agent_id: AgentId::new("dev"),
        session_label: "main".to_string(),
        created_at_epoch_ms: 2_000,
    });
    state.apply_event(&step_instance_created_event(
        "si-a",
        "run-zzz-newer",
        "plan",
        "dev",
        StepInstanceStatus::Pending,
    ));

    state.apply_event(&Event::RunCreated {
        id: RunId::new("run-aaa-older"),
        workflow_id: WorkflowId::new("wf-1"),
        task_title: "older".to_string(),
        lead_agent_id: AgentId::new("dev"),
        session_label: "main".to_string(),
        created_at_epoch_ms: 1_000,
    });
    state.apply_event(&step_instance_created_event(
        "si-z",
        "run-aaa-older",
        "plan",
        "dev",
        StepInstanceStatus::Pending,
    ));

    let next = state
        .next_pending_step_for_agent("dev")
        .expect("a pending step");
    assert_eq!(next.run_id.as_str(), "run-aaa-older");
}

#[test]
fn step_instance_status_changed_is_idempotent() {
    let mut state = MaterializedState::default();
    state.apply_event(&run_created_event("run-1", "wf-1", "demo"));
    state.apply_event(&step_instance_created_event(
        "si-1",
        "run-1",
        "plan",
        "dev",
        StepInstanceStatus::Pending,
    ));
    state.apply_event(&step_instance_status_changed_event(
        "si-1",
        StepInstanceStatus::Running,
    ));
    state.apply_event(&step_instance_status_changed_event(
        "si-1",
        StepInstanceStatus::Running,
    ));
    assert_eq!(
        state.get_step_instance("si-1").unwrap().status,
        StepInstanceStatus::Running
    );
}
