// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol for daemon communication.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload.

use antfarm_core::{Run, StepInstance, StepResult, Story};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

/// Manifest encoding accepted by `WorkflowInstall`/`WorkflowUpdate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestFormat {
    Hcl,
    Toml,
    Json,
}

impl From<ManifestFormat> for antfarm_runbook::Format {
    fn from(f: ManifestFormat) -> Self {
        match f {
            ManifestFormat::Hcl => antfarm_runbook::Format::Hcl,
            ManifestFormat::Toml => antfarm_runbook::Format::Toml,
            ManifestFormat::Json => antfarm_runbook::Format::Json,
        }
    }
}

/// Request from CLI to daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping.
    Ping,
    /// Version handshake.
    Hello { version: String },
    /// Daemon status.
    Status,
    /// Install a workflow manifest under a caller-assigned id.
    WorkflowInstall {
        workflow_id: String,
        manifest: String,
        format: ManifestFormat,
    },
    /// Remove an installed workflow (does not affect existing runs).
    WorkflowUninstall { workflow_id: String },
    /// Re-parse and reinstall a workflow manifest under its existing id.
    WorkflowUpdate {
        workflow_id: String,
        manifest: String,
        format: ManifestFormat,
    },
    /// Start a new run of an installed workflow.
    WorkflowRun {
        workflow_id: String,
        task_title: String,
        lead_agent_id: String,
        session_label: String,
    },
    /// Claim the next pending step for an agent.
    StepClaim { agent_id: String },
    /// Complete a running step with the agent's raw output.
    StepComplete {
        step_instance_id: String,
        output: String,
    },
    /// Fail a running step with an error message.
    StepFail {
        step_instance_id: String,
        error: String,
    },
    /// Cancel a run.
    RunCancel { run_id: String },
    /// Read-only query.
    Query { query: Query },
    /// Request daemon shutdown.
    Shutdown,
}

/// Query types for reading daemon state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Query {
    WorkflowList,
    WorkflowStatus { workflow_id: String },
    RunList,
    RunGet { run_id: String },
    StepStories { step_instance_id: String },
    ListCronJobs,
}

/// Response from daemon to CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    Ok,
    Pong,
    Hello { version: String },
    ShuttingDown,
    Error { message: String },
    Status {
        uptime_secs: u64,
        workflows_installed: usize,
        runs_active: usize,
    },
    WorkflowInstalled { workflow_id: String },
    WorkflowUninstalled { workflow_id: String },
    Workflows { workflows: Vec<WorkflowSummary> },
    Workflow { workflow: Option<WorkflowSummary> },
    RunStarted { run_id: String },
    Claimed { work: Option<ClaimedWorkDto> },
    StepResult { result: StepResult },
    Runs { runs: Vec<RunSummary> },
    Run { run: Option<RunDetail> },
    Stories { stories: Vec<Story> },
    CronJobs { jobs: serde_json::Value },
    Canceled { run_id: String },
}

/// Summary of an installed workflow for listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowSummary {
    pub id: String,
    pub name: String,
    pub version: String,
    pub agent_count: usize,
    pub step_count: usize,
}

/// Summary of a run for listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub id: String,
    pub workflow_id: String,
    pub task_title: String,
    pub status: String,
    pub current_step_index: usize,
}

/// Full detail for a single run, used by `RunGet`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunDetail {
    pub run: Run,
    pub steps: Vec<StepInstance>,
    pub stories: Vec<Story>,
}

/// Work handed back from a successful claim, over the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClaimedWorkDto {
    pub step_instance_id: String,
    pub run_id: String,
    pub rendered_input: String,
    pub expects: String,
}

impl From<antfarm_engine::ClaimedWork> for ClaimedWorkDto {
    fn from(w: antfarm_engine::ClaimedWork) -> Self {
        ClaimedWorkDto {
            step_instance_id: w.step_instance_id.to_string(),
            run_id: w.run_id.to_string(),
            rendered_input: w.rendered_input,
            expects: w.expects,
        }
    }
}

/// Protocol-level errors: framing and transport, not domain errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("connection closed")]
    ConnectionClosed,

    #[error("timeout")]
    Timeout,
}

/// Maximum message size (64 MB — agent output is plain text, never this large).
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Default IPC timeout.
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Protocol version, from the crate's own Cargo.toml.
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Encode a message to JSON bytes (without the length prefix).
pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    let json = serde_json::to_vec(msg)?;
    if json.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: json.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    Ok(json)
}

/// Decode a message from wire format.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Read a length-prefixed message from an async reader.
pub async fn read_message<R: tokio::io::AsyncReadExt + Unpin>(
    reader: &mut R,
) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::ConnectionClosed);
        }
        Err(e) => return Err(ProtocolError::Io(e)),
    }
    let len = u32::from_be_bytes(len_buf) as usize;

    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Write a length-prefixed message to an async writer.
pub async fn write_message<W: tokio::io::AsyncWriteExt + Unpin>(
    writer: &mut W,
    data: &[u8],
) -> Result<(), ProtocolError> {
    let len = data.len();
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }
    writer.write_all(&(len as u32).to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

/// Read a request with a timeout.
pub async fn read_request<R: tokio::io::AsyncReadExt + Unpin>(
    reader: &mut R,
    timeout: std::time::Duration,
) -> Result<Request, ProtocolError> {
    let bytes = tokio::time::timeout(timeout, read_message(reader))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    decode(&bytes)
}

/// Write a response with a timeout.
pub async fn write_response<W: tokio::io::AsyncWriteExt + Unpin>(
    writer: &mut W,
    response: &Response,
    timeout: std::time::Duration,
) -> Result<(), ProtocolError> {
    let data = encode(response)?;
    tokio::time::timeout(timeout, write_message(writer, &data))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
