// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client for CLI commands.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::daemon_process::{
    cleanup_stale_socket, daemon_dir, daemon_socket, probe_socket, read_startup_error,
    start_daemon_background, wrap_with_startup_error,
};

use antfarm_daemon::protocol::{self, ProtocolError};
use antfarm_daemon::{Query, Request, Response};
use thiserror::Error;
use tokio::net::UnixStream;

/// Timeout for IPC requests (hello, status, mutation, query, shutdown).
pub fn timeout_ipc() -> Duration {
    crate::env::timeout_ipc_ms().unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for the daemon to start.
pub fn timeout_connect() -> Duration {
    crate::env::timeout_connect_ms().unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for the daemon process to exit.
pub fn timeout_exit() -> Duration {
    crate::env::timeout_exit_ms().unwrap_or(Duration::from_secs(2))
}

/// Polling interval for connection retries.
pub fn poll_interval() -> Duration {
    crate::env::connect_poll_ms().unwrap_or(Duration::from_millis(50))
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon not running")]
    DaemonNotRunning,

    #[error("failed to start daemon: {0}")]
    DaemonStartFailed(String),

    #[error("timeout waiting for daemon to start")]
    DaemonStartTimeout,

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("unexpected response from daemon")]
    UnexpectedResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not determine state directory")]
    NoStateDir,
}

pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// For mutating commands (`workflow run`, `step complete`, ...): connect,
    /// auto-starting the daemon in the background if it isn't running.
    pub fn for_action() -> Result<Self, ClientError> {
        Self::connect_or_start()
    }

    /// For read-only commands (`workflow list`, `run get`, ...): connect only,
    /// never auto-start. There's nothing useful to query from a daemon that
    /// isn't there.
    pub fn for_query() -> Result<Self, ClientError> {
        Self::connect()
    }

    /// Connect to the daemon, starting it in the background if no socket is
    /// listening yet.
    pub fn connect_or_start() -> Result<Self, ClientError> {
        match Self::connect() {
            Ok(client) => {
                if probe_socket(&client.socket_path) {
                    Ok(client)
                } else {
                    cleanup_stale_socket()?;
                    let child = start_daemon_background()?;
                    Self::connect_with_retry(timeout_connect(), child)
                }
            }
            Err(ClientError::DaemonNotRunning) => {
                let child = start_daemon_background()?;
                Self::connect_with_retry(timeout_connect(), child)
            }
            Err(e) => Err(wrap_with_startup_error(e)),
        }
    }

    /// Connect to an already-running daemon. No auto-start.
    pub fn connect() -> Result<Self, ClientError> {
        let socket_path = daemon_socket()?;
        if !socket_path.exists() {
            return Err(ClientError::DaemonNotRunning);
        }
        Ok(Self { socket_path })
    }

    fn connect_with_retry(
        timeout: Duration,
        mut child: std::process::Child,
    ) -> Result<Self, ClientError> {
        let start = Instant::now();
        while start.elapsed() < timeout {
            match child.try_wait() {
                Ok(Some(status)) => {
                    let poll_start = Instant::now();
                    while poll_start.elapsed() < timeout_exit() {
                        if let Some(err) = read_startup_error() {
                            return Err(ClientError::DaemonStartFailed(err));
                        }
                        std::thread::sleep(poll_interval());
                    }
                    return Err(ClientError::DaemonStartFailed(format!(
                        "exited with {status}"
                    )));
                }
                Ok(None) => {}
                Err(_) => {}
            }

            match Self::connect() {
                Ok(client) => return Ok(client),
                Err(ClientError::DaemonNotRunning) => {
                    std::thread::sleep(poll_interval());
                }
                Err(e) => return Err(wrap_with_startup_error(e)),
            }
        }

        Err(wrap_with_startup_error(ClientError::DaemonStartTimeout))
    }

    async fn send_with_timeout(
        &self,
        request: &Request,
        read_timeout: Duration,
        write_timeout: Duration,
    ) -> Result<Response, ClientError> {
        let stream = UnixStream::connect(&self.socket_path).await?;
        let (mut reader, mut writer) = stream.into_split();

        let data = protocol::encode(request)?;
        tokio::time::timeout(write_timeout, protocol::write_message(&mut writer, &data))
            .await
            .map_err(|_| ProtocolError::Timeout)??;

        let response_bytes =
            tokio::time::timeout(read_timeout, protocol::read_message(&mut reader))
                .await
                .map_err(|_| ProtocolError::Timeout)??;

        Ok(protocol::decode(&response_bytes)?)
    }

    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        self.send_with_timeout(request, timeout_ipc(), timeout_ipc())
            .await
    }

    fn reject<T>(response: Response) -> Result<T, ClientError> {
        match response {
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        match self.send(&Request::Ping).await? {
            Response::Pong => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn hello(&self) -> Result<String, ClientError> {
        let request = Request::Hello {
            version: antfarm_daemon::PROTOCOL_VERSION.to_string(),
        };
        match self.send(&request).await? {
            Response::Hello { version } => Ok(version),
            other => Self::reject(other),
        }
    }

    pub async fn status(&self) -> Result<(u64, usize, usize), ClientError> {
        match self.send(&Request::Status).await? {
            Response::Status {
                uptime_secs,
                workflows_installed,
                runs_active,
            } => Ok((uptime_secs, workflows_installed, runs_active)),
            other => Self::reject(other),
        }
    }

    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown).await? {
            Response::Ok | Response::ShuttingDown => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn workflow_install(
        &self,
        workflow_id: &str,
        manifest: &str,
        format: antfarm_daemon::ManifestFormat,
    ) -> Result<String, ClientError> {
        let request = Request::WorkflowInstall {
            workflow_id: workflow_id.to_string(),
            manifest: manifest.to_string(),
            format,
        };
        match self.send(&request).await? {
            Response::WorkflowInstalled { workflow_id } => Ok(workflow_id),
            other => Self::reject(other),
        }
    }

    pub async fn workflow_update(
        &self,
        workflow_id: &str,
        manifest: &str,
        format: antfarm_daemon::ManifestFormat,
    ) -> Result<String, ClientError> {
        let request = Request::WorkflowUpdate {
            workflow_id: workflow_id.to_string(),
            manifest: manifest.to_string(),
            format,
        };
        match self.send(&request).await? {
            Response::WorkflowInstalled { workflow_id } => Ok(workflow_id),
            other => Self::reject(other),
        }
    }

    pub async fn workflow_uninstall(&self, workflow_id: &str) -> Result<String, ClientError> {
        let request = Request::WorkflowUninstall {
            workflow_id: workflow_id.to_string(),
        };
        match self.send(&request).await? {
            Response::WorkflowUninstalled { workflow_id } => Ok(workflow_id),
            other => Self::reject(other),
        }
    }

    pub async fn workflow_list(&self) -> Result<Vec<antfarm_daemon::WorkflowSummary>, ClientError> {
        let request = Request::Query {
            query: Query::WorkflowList,
        };
        match self.send(&request).await? {
            Response::Workflows { workflows } => Ok(workflows),
            other => Self::reject(other),
        }
    }

    pub async fn workflow_status(
        &self,
        workflow_id: &str,
    ) -> Result<Option<antfarm_daemon::WorkflowSummary>, ClientError> {
        let request = Request::Query {
            query: Query::WorkflowStatus {
                workflow_id: workflow_id.to_string(),
            },
        };
        match self.send(&request).await? {
            Response::Workflow { workflow } => Ok(workflow),
            other => Self::reject(other),
        }
    }

    pub async fn workflow_run(
        &self,
        workflow_id: &str,
        task_title: &str,
        lead_agent_id: &str,
        session_label: &str,
    ) -> Result<String, ClientError> {
        let request = Request::WorkflowRun {
            workflow_id: workflow_id.to_string(),
            task_title: task_title.to_string(),
            lead_agent_id: lead_agent_id.to_string(),
            session_label: session_label.to_string(),
        };
        match self.send(&request).await? {
            Response::RunStarted { run_id } => Ok(run_id),
            other => Self::reject(other),
        }
    }

    pub async fn step_claim(
        &self,
        agent_id: &str,
    ) -> Result<Option<antfarm_daemon::ClaimedWorkDto>, ClientError> {
        let request = Request::StepClaim {
            agent_id: agent_id.to_string(),
        };
        match self.send(&request).await? {
            Response::Claimed { work } => Ok(work),
            other => Self::reject(other),
        }
    }

    pub async fn step_complete(
        &self,
        step_instance_id: &str,
        output: &str,
    ) -> Result<antfarm_core::StepResult, ClientError> {
        let request = Request::StepComplete {
            step_instance_id: step_instance_id.to_string(),
            output: output.to_string(),
        };
        match self.send(&request).await? {
            Response::StepResult { result } => Ok(result),
            other => Self::reject(other),
        }
    }

    pub async fn step_fail(
        &self,
        step_instance_id: &str,
        error: &str,
    ) -> Result<antfarm_core::StepResult, ClientError> {
        let request = Request::StepFail {
            step_instance_id: step_instance_id.to_string(),
            error: error.to_string(),
        };
        match self.send(&request).await? {
            Response::StepResult { result } => Ok(result),
            other => Self::reject(other),
        }
    }

    pub async fn step_stories(
        &self,
        step_instance_id: &str,
    ) -> Result<Vec<antfarm_core::Story>, ClientError> {
        let request = Request::Query {
            query: Query::StepStories {
                step_instance_id: step_instance_id.to_string(),
            },
        };
        match self.send(&request).await? {
            Response::Stories { stories } => Ok(stories),
            other => Self::reject(other),
        }
    }

    pub async fn run_list(&self) -> Result<Vec<antfarm_daemon::RunSummary>, ClientError> {
        let request = Request::Query {
            query: Query::RunList,
        };
        match self.send(&request).await? {
            Response::Runs { runs } => Ok(runs),
            other => Self::reject(other),
        }
    }

    pub async fn run_get(
        &self,
        run_id: &str,
    ) -> Result<Option<antfarm_daemon::RunDetail>, ClientError> {
        let request = Request::Query {
            query: Query::RunGet {
                run_id: run_id.to_string(),
            },
        };
        match self.send(&request).await? {
            Response::Run { run } => Ok(run),
            other => Self::reject(other),
        }
    }

    pub async fn run_cancel(&self, run_id: &str) -> Result<String, ClientError> {
        let request = Request::RunCancel {
            run_id: run_id.to_string(),
        };
        match self.send(&request).await? {
            Response::Canceled { run_id } => Ok(run_id),
            other => Self::reject(other),
        }
    }

    pub async fn list_cron_jobs(&self) -> Result<serde_json::Value, ClientError> {
        let request = Request::Query {
            query: Query::ListCronJobs,
        };
        match self.send(&request).await? {
            Response::CronJobs { jobs } => Ok(jobs),
            other => Self::reject(other),
        }
    }
}

/// Stop the daemon (graceful first, then forceful). Returns `true` if it was
/// running.
pub async fn daemon_stop() -> Result<bool, ClientError> {
    let client = match DaemonClient::connect() {
        Ok(c) => c,
        Err(ClientError::DaemonNotRunning) => {
            if let Ok(dir) = daemon_dir() {
                crate::daemon_process::cleanup_stale_pid(&dir);
            }
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    let shutdown_result = client.shutdown().await;

    if let Some(pid) = crate::daemon_process::read_daemon_pid()? {
        if shutdown_result.is_ok() {
            crate::daemon_process::wait_for_exit(pid, timeout_exit()).await;
        }
        if crate::daemon_process::process_exists(pid) {
            crate::daemon_process::force_kill_daemon(pid);
            crate::daemon_process::wait_for_exit(pid, timeout_exit()).await;
        }
    }

    if let Ok(dir) = daemon_dir() {
        crate::daemon_process::cleanup_stale_pid(&dir);
    }

    Ok(true)
}
