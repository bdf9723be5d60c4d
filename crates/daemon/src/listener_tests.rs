// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Instant;

use antfarm_core::{AgentDef, AgentId, StepDef, StepId, StepKind, WorkflowId, WorkflowSpec};
use antfarm_engine::Engine;
use antfarm_storage::Store;
use tempfile::tempdir;
use tokio::sync::{Mutex, Notify};

use super::*;

fn test_ctx(dir: &std::path::Path) -> ListenCtx {
    let store = Store::open(dir).expect("open store");
    ListenCtx {
        store: Arc::new(Mutex::new(store)),
        engine: Engine::new(),
        gateway: None,
        start_time: Instant::now(),
        shutdown: Arc::new(Notify::new()),
    }
}

fn sample_workflow(id: &str) -> WorkflowSpec {
    WorkflowSpec {
        id: WorkflowId::new(id),
        name: "example".to_string(),
        version: "1".to_string(),
        agents: vec![AgentDef {
            id: AgentId::new("dev"),
            name: None,
            description: None,
            workspace_root: std::path::PathBuf::from("/tmp/dev"),
        }],
        steps: vec![StepDef {
            id: StepId::new("plan"),
            agent: AgentId::new("dev"),
            kind: StepKind::Single,
            input: "plan the work".to_string(),
            expects: "STATUS: done".to_string(),
            max_retries: 2,
            on_fail: None,
        }],
    }
}

#[tokio::test]
async fn ping_returns_pong() {
    let dir = tempdir().expect("tempdir");
    let ctx = test_ctx(dir.path());
    let response = handle_request(Request::Ping, &ctx).await;
    assert_eq!(response, Response::Pong);
}

#[tokio::test]
async fn install_then_list_workflow() {
    let dir = tempdir().expect("tempdir");
    let ctx = test_ctx(dir.path());
    let event = workflow_ops::install_event(sample_workflow("wf-1"));
    {
        let mut store = ctx.store.lock().await;
        workflow_ops::apply(&mut store, &[event]).expect("apply");
    }

    let response = handle_request(
        Request::Query {
            query: Query::WorkflowList,
        },
        &ctx,
    )
    .await;

    match response {
        Response::Workflows { workflows } => {
            assert_eq!(workflows.len(), 1);
            assert_eq!(workflows[0].id, "wf-1");
            assert_eq!(workflows[0].step_count, 1);
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn run_unknown_workflow_is_an_error() {
    let dir = tempdir().expect("tempdir");
    let ctx = test_ctx(dir.path());

    let response = handle_request(
        Request::WorkflowRun {
            workflow_id: "nonexistent".to_string(),
            task_title: "do the thing".to_string(),
            lead_agent_id: "dev".to_string(),
            session_label: "main".to_string(),
        },
        &ctx,
    )
    .await;

    assert!(matches!(response, Response::Error { .. }));
}

#[tokio::test]
async fn run_then_claim_hands_out_first_step() {
    let dir = tempdir().expect("tempdir");
    let ctx = test_ctx(dir.path());
    let install = workflow_ops::install_event(sample_workflow("wf-2"));
    {
        let mut store = ctx.store.lock().await;
        workflow_ops::apply(&mut store, &[install]).expect("apply");
    }

    let run_response = handle_request(
        Request::WorkflowRun {
            workflow_id: "wf-2".to_string(),
            task_title: "do the thing".to_string(),
            lead_agent_id: "dev".to_string(),
            session_label: "main".to_string(),
        },
        &ctx,
    )
    .await;
    assert!(matches!(run_response, Response::RunStarted { .. }));

    let claim_response = handle_request(
        Request::StepClaim {
            agent_id: "dev".to_string(),
        },
        &ctx,
    )
    .await;

    match claim_response {
        Response::Claimed { work: Some(work) } => {
            assert_eq!(work.rendered_input, "plan the work");
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn shutdown_notifies() {
    let dir = tempdir().expect("tempdir");
    let ctx = test_ctx(dir.path());
    let response = handle_request(Request::Shutdown, &ctx).await;
    assert_eq!(response, Response::ShuttingDown);
    // notify_one doesn't block if nothing is waiting; this just confirms
    // the call didn't panic and a waiter would be woken.
    ctx.shutdown.notify_one();
}
