// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn sample_run() -> Run {
    Run {
        id: RunId::new("run-1"),
        workflow_id: WorkflowId::new("wf-1"),
        task_title: "Add feature".into(),
        lead_agent_id: AgentId::new("dev"),
        session_label: "main".into(),
        status: RunStatus::Running,
        current_step_index: 0,
        context: Default::default(),
        results: Vec::new(),
        created_at_ms: 0,
        updated_at_ms: 0,
    }
}

#[test]
fn merge_context_is_last_writer_wins() {
    let mut run = sample_run();
    run.merge_context([("k".to_string(), "v1".to_string())]);
    run.merge_context([("k".to_string(), "v2".to_string())]);
    assert_eq!(run.context.get("k"), Some(&"v2".to_string()));
}

#[test]
fn terminal_statuses() {
    assert!(RunStatus::Completed.is_terminal());
    assert!(RunStatus::Canceled.is_terminal());
    assert!(!RunStatus::Running.is_terminal());
    assert!(!RunStatus::Blocked.is_terminal());
}
