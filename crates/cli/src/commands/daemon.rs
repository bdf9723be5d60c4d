// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `antfarm daemon` - daemon process management.

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use crate::client::{daemon_stop, DaemonClient};
use crate::daemon_process::start_daemon_background;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct DaemonArgs {
    /// Print daemon version
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    #[command(subcommand)]
    pub command: Option<DaemonCommand>,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start the daemon in the background if it isn't already running
    Start,
    /// Stop the daemon
    Stop,
    /// Stop and restart the daemon
    Restart,
    /// Check daemon status
    Status,
}

pub async fn daemon(args: DaemonArgs, format: OutputFormat) -> Result<()> {
    if args.version {
        return version(format).await;
    }

    match args.command {
        Some(DaemonCommand::Start) => start().await,
        Some(DaemonCommand::Stop) => stop().await,
        Some(DaemonCommand::Restart) => restart().await,
        Some(DaemonCommand::Status) | None => status(format).await,
    }
}

fn not_running(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("Daemon not running"),
        OutputFormat::Json => println!(r#"{{ "status": "not_running" }}"#),
    }
    Ok(())
}

async fn version(format: OutputFormat) -> Result<()> {
    let client = match DaemonClient::connect() {
        Ok(c) => c,
        Err(_) => return not_running(format),
    };

    let version = match client.hello().await {
        Ok(v) => v,
        Err(crate::client::ClientError::DaemonNotRunning) => return not_running(format),
        Err(_) => "unknown".to_string(),
    };

    match format {
        OutputFormat::Text => println!("antfarmd {version}"),
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "version": version }))
        }
    }
    Ok(())
}

async fn start() -> Result<()> {
    if let Ok(client) = DaemonClient::connect() {
        if let Ok((uptime, _, _)) = client.status().await {
            println!("Daemon already running (uptime: {uptime}s)");
            return Ok(());
        }
    }

    match DaemonClient::for_action() {
        Ok(_client) => {
            println!("Daemon started");
            Ok(())
        }
        Err(e) => Err(anyhow!("{e}")),
    }
}

async fn stop() -> Result<()> {
    match daemon_stop().await {
        Ok(true) => {
            println!("Daemon stopped");
            Ok(())
        }
        Ok(false) => {
            println!("Daemon not running");
            Ok(())
        }
        Err(e) => Err(anyhow!("failed to stop daemon: {e}")),
    }
}

async fn restart() -> Result<()> {
    let was_running = daemon_stop()
        .await
        .map_err(|e| anyhow!("failed to stop daemon: {e}"))?;

    if was_running {
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    }

    start_daemon_background().map_err(|e| anyhow!("{e}"))?;
    println!("Daemon restarted");
    Ok(())
}

async fn status(format: OutputFormat) -> Result<()> {
    let client = match DaemonClient::connect() {
        Ok(c) => c,
        Err(_) => return not_running(format),
    };

    let (uptime, workflows_installed, runs_active) = match client.status().await {
        Ok(result) => result,
        Err(crate::client::ClientError::DaemonNotRunning) => return not_running(format),
        Err(e) => return Err(anyhow!("{e}")),
    };
    let version = client.hello().await.unwrap_or_else(|_| "unknown".to_string());

    match format {
        OutputFormat::Text => {
            println!("Status:    running");
            println!("Version:   {version}");
            println!("Uptime:    {}", format_uptime(uptime));
            println!("Workflows: {workflows_installed} installed");
            println!("Runs:      {runs_active} active");
        }
        OutputFormat::Json => {
            let obj = serde_json::json!({
                "status": "running",
                "version": version,
                "uptime_secs": uptime,
                "uptime": format_uptime(uptime),
                "workflows_installed": workflows_installed,
                "runs_active": runs_active,
            });
            println!("{}", serde_json::to_string_pretty(&obj)?);
        }
    }

    Ok(())
}

fn format_uptime(secs: u64) -> String {
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;

    if hours > 0 {
        format!("{hours}h {mins}m {secs}s")
    } else if mins > 0 {
        format!("{mins}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
