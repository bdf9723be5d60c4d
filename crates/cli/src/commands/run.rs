// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `antfarm run` - inspect and control workflow runs.

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::color;
use crate::output::OutputFormat;
use crate::table::{Column, Table};

#[derive(Args)]
pub struct RunArgs {
    #[command(subcommand)]
    pub command: RunCommand,
}

#[derive(Subcommand)]
pub enum RunCommand {
    /// List every run.
    List,
    /// Show one run's steps, stories, and context.
    Get { run_id: String },
    /// Cancel a run. Steps already claimed finish; no further steps are handed out.
    Cancel { run_id: String },
}

pub async fn run(args: RunArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        RunCommand::List => list(format).await,
        RunCommand::Get { run_id } => get(&run_id, format).await,
        RunCommand::Cancel { run_id } => cancel(&run_id, format).await,
    }
}

async fn list(format: OutputFormat) -> Result<()> {
    let client = DaemonClient::for_query().map_err(|e| anyhow!("{e}"))?;
    let runs = client.run_list().await.map_err(|e| anyhow!("{e}"))?;

    match format {
        OutputFormat::Text => {
            if runs.is_empty() {
                println!("No runs.");
                return Ok(());
            }
            let mut table = Table::new(vec![
                Column::left("ID"),
                Column::left("WORKFLOW"),
                Column::left("TASK").with_max(40),
                Column::status("STATUS"),
                Column::right("STEP"),
            ]);
            for r in &runs {
                table.row(vec![
                    r.id.clone(),
                    r.workflow_id.clone(),
                    r.task_title.clone(),
                    r.status.clone(),
                    r.current_step_index.to_string(),
                ]);
            }
            table.render(&mut std::io::stdout());
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&runs)?),
    }
    Ok(())
}

async fn get(run_id: &str, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::for_query().map_err(|e| anyhow!("{e}"))?;
    let detail = client.run_get(run_id).await.map_err(|e| anyhow!("{e}"))?;

    let Some(detail) = detail else {
        match format {
            OutputFormat::Text => println!("Run '{run_id}' not found"),
            OutputFormat::Json => println!("{}", serde_json::json!({ "run": null })),
        }
        return Ok(());
    };

    match format {
        OutputFormat::Text => {
            println!("{} {}", color::header("Run:"), detail.run.id);
            println!("  Workflow: {}", detail.run.workflow_id);
            println!("  Task:     {}", detail.run.task_title);
            println!(
                "  Status:   {}",
                color::status(&detail.run.status.to_string())
            );
            println!("  Step:     {}", detail.run.current_step_index);

            if !detail.steps.is_empty() {
                println!("  {}", color::header("Steps:"));
                for s in &detail.steps {
                    println!(
                        "    {} {} {}",
                        s.id,
                        s.def_id,
                        color::status(&s.status.to_string())
                    );
                }
            }

            if !detail.stories.is_empty() {
                println!("  {}", color::header("Stories:"));
                for s in &detail.stories {
                    println!(
                        "    {} {} {}",
                        s.story_id,
                        s.title,
                        color::status(&s.status.to_string())
                    );
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&detail)?),
    }
    Ok(())
}

async fn cancel(run_id: &str, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::for_action().map_err(|e| anyhow!("{e}"))?;
    let canceled = client.run_cancel(run_id).await.map_err(|e| anyhow!("{e}"))?;

    match format {
        OutputFormat::Text => println!("Run '{canceled}' canceled"),
        OutputFormat::Json => println!("{}", serde_json::json!({ "canceled": canceled })),
    }
    Ok(())
}
