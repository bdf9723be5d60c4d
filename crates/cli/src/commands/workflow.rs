// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `antfarm workflow` - install, run, and inspect workflow manifests.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};

use antfarm_daemon::ManifestFormat;
use antfarm_engine::CronGatewayClient;

use crate::client::DaemonClient;
use crate::color;
use crate::output::OutputFormat;
use crate::table::{Column, Table};

#[derive(Args)]
pub struct WorkflowArgs {
    #[command(subcommand)]
    pub command: WorkflowCommand,
}

#[derive(Subcommand)]
pub enum WorkflowCommand {
    /// Install a workflow manifest under a new id.
    Install {
        /// Id the workflow is installed under.
        workflow_id: String,
        /// Path to the manifest file (.hcl, .toml, or .json).
        manifest_path: PathBuf,
        /// Manifest format, inferred from the file extension if omitted.
        #[arg(long)]
        format: Option<String>,
    },
    /// Remove an installed workflow. Existing runs are unaffected.
    Uninstall {
        workflow_id: String,
    },
    /// Re-parse and reinstall a manifest under its existing id.
    Update {
        workflow_id: String,
        manifest_path: PathBuf,
        #[arg(long)]
        format: Option<String>,
    },
    /// List installed workflows.
    List,
    /// Show one installed workflow.
    Status {
        workflow_id: String,
    },
    /// Start a new run of an installed workflow.
    Run {
        workflow_id: String,
        /// Human-readable title for this run.
        task_title: String,
        /// Agent id the first step is assigned to.
        #[arg(long = "lead-agent")]
        lead_agent_id: String,
        /// Session label recorded on the run.
        #[arg(long, default_value = "main")]
        session: String,
    },
}

pub async fn workflow(args: WorkflowArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        WorkflowCommand::Install {
            workflow_id,
            manifest_path,
            format: fmt,
        } => install(&workflow_id, &manifest_path, fmt.as_deref(), format).await,
        WorkflowCommand::Uninstall { workflow_id } => uninstall(&workflow_id, format).await,
        WorkflowCommand::Update {
            workflow_id,
            manifest_path,
            format: fmt,
        } => update(&workflow_id, &manifest_path, fmt.as_deref(), format).await,
        WorkflowCommand::List => list(format).await,
        WorkflowCommand::Status { workflow_id } => status(&workflow_id, format).await,
        WorkflowCommand::Run {
            workflow_id,
            task_title,
            lead_agent_id,
            session,
        } => run(&workflow_id, &task_title, &lead_agent_id, &session, format).await,
    }
}

fn resolve_format(path: &Path, explicit: Option<&str>) -> Result<ManifestFormat> {
    if let Some(f) = explicit {
        return match f {
            "hcl" => Ok(ManifestFormat::Hcl),
            "toml" => Ok(ManifestFormat::Toml),
            "json" => Ok(ManifestFormat::Json),
            other => Err(anyhow!("unknown manifest format '{other}'")),
        };
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some("hcl") => Ok(ManifestFormat::Hcl),
        Some("toml") => Ok(ManifestFormat::Toml),
        Some("json") => Ok(ManifestFormat::Json),
        _ => Err(anyhow!(
            "cannot infer manifest format from '{}'; pass --format",
            path.display()
        )),
    }
}

/// Best-effort cron gateway registration. Failures are warned, never fatal —
/// installation of the workflow itself already succeeded.
async fn gateway_add(workflow_id: &str) {
    let Some(url) = crate::env::cron_gateway_url() else {
        return;
    };
    let gateway = CronGatewayClient::new(url, crate::env::cron_gateway_token());
    let job = serde_json::json!({ "workflow_id": workflow_id });
    if let Err(e) = gateway.add(job).await {
        eprintln!("warning: cron gateway registration failed: {e}");
    }
}

async fn gateway_remove(workflow_id: &str) {
    let Some(url) = crate::env::cron_gateway_url() else {
        return;
    };
    let gateway = CronGatewayClient::new(url, crate::env::cron_gateway_token());
    let job = serde_json::json!({ "workflow_id": workflow_id });
    if let Err(e) = gateway.remove(job).await {
        eprintln!("warning: cron gateway removal failed: {e}");
    }
}

async fn install(
    workflow_id: &str,
    manifest_path: &Path,
    fmt: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let manifest_format = resolve_format(manifest_path, fmt)?;
    let manifest = std::fs::read_to_string(manifest_path)
        .with_context(|| format!("reading {}", manifest_path.display()))?;

    let client = DaemonClient::for_action().map_err(|e| anyhow!("{e}"))?;
    let installed = client
        .workflow_install(workflow_id, &manifest, manifest_format)
        .await
        .map_err(|e| anyhow!("{e}"))?;

    gateway_add(&installed).await;

    match format {
        OutputFormat::Text => println!("Installed workflow '{installed}'"),
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "installed": installed }))
        }
    }
    Ok(())
}

async fn update(
    workflow_id: &str,
    manifest_path: &Path,
    fmt: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let manifest_format = resolve_format(manifest_path, fmt)?;
    let manifest = std::fs::read_to_string(manifest_path)
        .with_context(|| format!("reading {}", manifest_path.display()))?;

    let client = DaemonClient::for_action().map_err(|e| anyhow!("{e}"))?;
    let updated = client
        .workflow_update(workflow_id, &manifest, manifest_format)
        .await
        .map_err(|e| anyhow!("{e}"))?;

    match format {
        OutputFormat::Text => println!("Updated workflow '{updated}'"),
        OutputFormat::Json => println!("{}", serde_json::json!({ "updated": updated })),
    }
    Ok(())
}

async fn uninstall(workflow_id: &str, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::for_action().map_err(|e| anyhow!("{e}"))?;
    let removed = client
        .workflow_uninstall(workflow_id)
        .await
        .map_err(|e| anyhow!("{e}"))?;

    gateway_remove(&removed).await;

    match format {
        OutputFormat::Text => println!("Uninstalled workflow '{removed}'"),
        OutputFormat::Json => println!("{}", serde_json::json!({ "uninstalled": removed })),
    }
    Ok(())
}

async fn list(format: OutputFormat) -> Result<()> {
    let client = DaemonClient::for_query().map_err(|e| anyhow!("{e}"))?;
    let workflows = client.workflow_list().await.map_err(|e| anyhow!("{e}"))?;

    match format {
        OutputFormat::Text => {
            if workflows.is_empty() {
                println!("No workflows installed.");
                return Ok(());
            }
            let mut table = Table::new(vec![
                Column::left("ID"),
                Column::left("NAME"),
                Column::left("VERSION"),
                Column::right("AGENTS"),
                Column::right("STEPS"),
            ]);
            for w in &workflows {
                table.row(vec![
                    w.id.clone(),
                    w.name.clone(),
                    w.version.clone(),
                    w.agent_count.to_string(),
                    w.step_count.to_string(),
                ]);
            }
            table.render(&mut std::io::stdout());
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&workflows)?),
    }
    Ok(())
}

async fn status(workflow_id: &str, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::for_query().map_err(|e| anyhow!("{e}"))?;
    let workflow = client
        .workflow_status(workflow_id)
        .await
        .map_err(|e| anyhow!("{e}"))?;

    let Some(w) = workflow else {
        match format {
            OutputFormat::Text => println!("Workflow '{workflow_id}' not found"),
            OutputFormat::Json => println!("{}", serde_json::json!({ "workflow": null })),
        }
        return Ok(());
    };

    match format {
        OutputFormat::Text => {
            println!("{} {}", color::header("Workflow:"), w.id);
            println!("  Name:    {}", w.name);
            println!("  Version: {}", w.version);
            println!("  Agents:  {}", w.agent_count);
            println!("  Steps:   {}", w.step_count);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&w)?),
    }
    Ok(())
}

async fn run(
    workflow_id: &str,
    task_title: &str,
    lead_agent_id: &str,
    session: &str,
    format: OutputFormat,
) -> Result<()> {
    let client = DaemonClient::for_action().map_err(|e| anyhow!("{e}"))?;
    let run_id = client
        .workflow_run(workflow_id, task_title, lead_agent_id, session)
        .await
        .map_err(|e| anyhow!("{e}"))?;

    match format {
        OutputFormat::Text => println!("Started run '{run_id}'"),
        OutputFormat::Json => println!("{}", serde_json::json!({ "run_id": run_id })),
    }
    Ok(())
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
