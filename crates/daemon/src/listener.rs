// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! Accepts connections and spawns a task per connection, but every request
//! that touches the store is serialized through the one `Mutex<Store>` the
//! daemon holds (§5: "single-writer with respect to durable state").

use std::sync::Arc;
use std::time::Instant;

use antfarm_core::WorkflowSpec;
use antfarm_storage::Store;
use thiserror::Error;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{Mutex, Notify};
use tracing::{debug, error};

use crate::protocol::{
    self, ClaimedWorkDto, Query, Request, Response, RunDetail, RunSummary, WorkflowSummary,
    DEFAULT_TIMEOUT, PROTOCOL_VERSION,
};
use crate::workflow_ops;
use antfarm_engine::Engine;

/// Shared daemon context for all request handlers.
pub struct ListenCtx {
    pub store: Arc<Mutex<Store>>,
    pub engine: Engine,
    pub gateway: Option<antfarm_engine::CronGatewayClient>,
    pub start_time: Instant,
    pub shutdown: Arc<Notify>,
}

pub struct Listener {
    socket: UnixListener,
    ctx: Arc<ListenCtx>,
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),
}

impl Listener {
    pub fn new(socket: UnixListener, ctx: Arc<ListenCtx>) -> Self {
        Self { socket, ctx }
    }

    /// Run the listener loop until the process exits, spawning a task per
    /// connection.
    pub async fn run(self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, _)) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &ctx).await {
                            match e {
                                ConnectionError::Protocol(
                                    protocol::ProtocolError::ConnectionClosed,
                                ) => debug!("client disconnected"),
                                ConnectionError::Protocol(protocol::ProtocolError::Timeout) => {
                                    tracing::warn!("connection timeout")
                                }
                                _ => error!("connection error: {}", e),
                            }
                        }
                    });
                }
                Err(e) => error!("accept error: {}", e),
            }
        }
    }
}

async fn handle_connection(stream: UnixStream, ctx: &ListenCtx) -> Result<(), ConnectionError> {
    let (mut reader, mut writer) = stream.into_split();

    let request = protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await?;

    if matches!(request, Request::Query { .. }) {
        debug!(request = ?request, "received query");
    } else {
        tracing::info!(request = ?request, "received request");
    }

    let response = handle_request(request, ctx).await;

    debug!(response = ?response, "sending response");
    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT).await?;
    Ok(())
}

async fn handle_request(request: Request, ctx: &ListenCtx) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version: _ } => Response::Hello {
            version: PROTOCOL_VERSION.to_string(),
        },

        Request::Status => {
            let store = ctx.store.lock().await;
            let state = store.state();
            Response::Status {
                uptime_secs: ctx.start_time.elapsed().as_secs(),
                workflows_installed: state.workflow_count(),
                runs_active: state.active_run_count(),
            }
        }

        Request::WorkflowInstall {
            workflow_id,
            manifest,
            format,
        } => install_workflow(ctx, &workflow_id, &manifest, format.into()).await,

        Request::WorkflowUpdate {
            workflow_id,
            manifest,
            format,
        } => install_workflow(ctx, &workflow_id, &manifest, format.into()).await,

        Request::WorkflowUninstall { workflow_id } => {
            let event = workflow_ops::uninstall_event(&workflow_id);
            let mut store = ctx.store.lock().await;
            match workflow_ops::apply(&mut store, &[event]) {
                Ok(()) => Response::WorkflowUninstalled { workflow_id },
                Err(e) => error_response(e),
            }
        }

        Request::WorkflowRun {
            workflow_id,
            task_title,
            lead_agent_id,
            session_label,
        } => {
            let mut store = ctx.store.lock().await;
            let Some(spec) = store.state().get_workflow(&workflow_id).cloned() else {
                return Response::Error {
                    message: format!("unknown workflow '{workflow_id}'"),
                };
            };
            let clock = antfarm_core::SystemClock;
            let id_gen = antfarm_core::UuidIdGen;
            let (run_id, events) = workflow_ops::start_run_events(
                &clock,
                &id_gen,
                &spec,
                &task_title,
                &lead_agent_id,
                &session_label,
            );
            match workflow_ops::apply(&mut store, &events) {
                Ok(()) => Response::RunStarted {
                    run_id: run_id.to_string(),
                },
                Err(e) => error_response(e),
            }
        }

        Request::StepClaim { agent_id } => {
            let mut store = ctx.store.lock().await;
            match ctx.engine.claim(&mut store, &agent_id) {
                Ok(work) => Response::Claimed {
                    work: work.map(ClaimedWorkDto::from),
                },
                Err(e) => error_response(e),
            }
        }

        Request::StepComplete {
            step_instance_id,
            output,
        } => {
            let mut store = ctx.store.lock().await;
            match ctx.engine.complete(&mut store, &step_instance_id, &output) {
                Ok(result) => Response::StepResult { result },
                Err(e) => error_response(e),
            }
        }

        Request::StepFail {
            step_instance_id,
            error,
        } => {
            let mut store = ctx.store.lock().await;
            match ctx.engine.fail(&mut store, &step_instance_id, &error) {
                Ok(result) => Response::StepResult { result },
                Err(e) => error_response(e),
            }
        }

        Request::RunCancel { run_id } => {
            let mut store = ctx.store.lock().await;
            match ctx.engine.cancel_run(&mut store, &run_id) {
                Ok(()) => Response::Canceled { run_id },
                Err(e) => error_response(e),
            }
        }

        Request::Query { query } => handle_query(ctx, query).await,

        Request::Shutdown => {
            ctx.shutdown.notify_one();
            Response::ShuttingDown
        }
    }
}

async fn install_workflow(
    ctx: &ListenCtx,
    workflow_id: &str,
    manifest: &str,
    format: antfarm_runbook::Format,
) -> Response {
    let spec = match antfarm_runbook::parse_manifest(manifest, format, workflow_id) {
        Ok(spec) => spec,
        Err(e) => {
            return Response::Error {
                message: e.to_string(),
            }
        }
    };
    let event = workflow_ops::install_event(spec);
    let mut store = ctx.store.lock().await;
    match workflow_ops::apply(&mut store, &[event]) {
        Ok(()) => Response::WorkflowInstalled {
            workflow_id: workflow_id.to_string(),
        },
        Err(e) => error_response(e),
    }
}

async fn handle_query(ctx: &ListenCtx, query: Query) -> Response {
    match query {
        Query::WorkflowList => {
            let store = ctx.store.lock().await;
            let workflows = store
                .state()
                .workflows()
                .map(summarize_workflow)
                .collect();
            Response::Workflows { workflows }
        }

        Query::WorkflowStatus { workflow_id } => {
            let store = ctx.store.lock().await;
            let workflow = store
                .state()
                .get_workflow(&workflow_id)
                .map(summarize_workflow);
            Response::Workflow { workflow }
        }

        Query::RunList => {
            let store = ctx.store.lock().await;
            let runs = store.state().runs().map(summarize_run).collect();
            Response::Runs { runs }
        }

        Query::RunGet { run_id } => {
            let store = ctx.store.lock().await;
            let state = store.state();
            let run = match state.get_run(&run_id) {
                Some(run) => run,
                None => return Response::Run { run: None },
            };
            let steps = state
                .step_instances_for_run(&run.id)
                .into_iter()
                .cloned()
                .collect();
            let stories = state
                .stories_for_run(&run.id)
                .into_iter()
                .cloned()
                .collect();
            Response::Run {
                run: Some(RunDetail {
                    run: run.clone(),
                    steps,
                    stories,
                }),
            }
        }

        Query::StepStories { step_instance_id } => {
            let store = ctx.store.lock().await;
            let state = store.state();
            let Some(step) = state.get_step_instance(&step_instance_id) else {
                return Response::Error {
                    message: format!("unknown step instance '{step_instance_id}'"),
                };
            };
            let stories = state
                .stories_for_run(&step.run_id)
                .into_iter()
                .cloned()
                .collect();
            Response::Stories { stories }
        }

        Query::ListCronJobs => {
            let Some(gateway) = &ctx.gateway else {
                return Response::Error {
                    message: "no cron gateway configured".to_string(),
                };
            };
            match gateway.list().await {
                Ok(jobs) => Response::CronJobs { jobs },
                Err(e) => error_response(e),
            }
        }
    }
}

fn summarize_workflow(spec: &WorkflowSpec) -> WorkflowSummary {
    WorkflowSummary {
        id: spec.id.to_string(),
        name: spec.name.clone(),
        version: spec.version.clone(),
        agent_count: spec.agents.len(),
        step_count: spec.steps.len(),
    }
}

fn summarize_run(run: &antfarm_core::Run) -> RunSummary {
    RunSummary {
        id: run.id.to_string(),
        workflow_id: run.workflow_id.to_string(),
        task_title: run.task_title.clone(),
        status: run.status.to_string(),
        current_step_index: run.current_step_index,
    }
}

fn error_response(e: antfarm_core::Error) -> Response {
    Response::Error {
        message: e.to_string(),
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
