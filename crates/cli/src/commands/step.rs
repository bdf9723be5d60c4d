// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `antfarm step` - the interface external agent runtimes poll against.

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::color;
use crate::output::OutputFormat;
use crate::table::{Column, Table};

#[derive(Args)]
pub struct StepArgs {
    #[command(subcommand)]
    pub command: StepCommand,
}

#[derive(Subcommand)]
pub enum StepCommand {
    /// Claim the next pending step for an agent.
    Claim { agent_id: String },
    /// Complete a running step with the agent's raw output.
    Complete {
        step_instance_id: String,
        /// Raw agent output, including any STATUS/STORIES_JSON blocks.
        output: String,
    },
    /// Fail a running step with an error message.
    Fail {
        step_instance_id: String,
        error: String,
    },
    /// List stories attached to a step instance's run.
    Stories { step_instance_id: String },
}

pub async fn step(args: StepArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        StepCommand::Claim { agent_id } => claim(&agent_id, format).await,
        StepCommand::Complete {
            step_instance_id,
            output,
        } => complete(&step_instance_id, &output, format).await,
        StepCommand::Fail {
            step_instance_id,
            error,
        } => fail(&step_instance_id, &error, format).await,
        StepCommand::Stories { step_instance_id } => stories(&step_instance_id, format).await,
    }
}

async fn claim(agent_id: &str, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::for_action().map_err(|e| anyhow!("{e}"))?;
    let work = client.step_claim(agent_id).await.map_err(|e| anyhow!("{e}"))?;

    match format {
        OutputFormat::Text => match work {
            Some(w) => {
                println!("{} {}", color::header("Step:"), w.step_instance_id);
                println!("  Run:     {}", w.run_id);
                println!("  Expects: {}", w.expects);
                println!();
                println!("{}", w.rendered_input);
            }
            None => println!("No pending step for agent '{agent_id}'"),
        },
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&work)?),
    }
    Ok(())
}

async fn complete(step_instance_id: &str, output: &str, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::for_action().map_err(|e| anyhow!("{e}"))?;
    let result = client
        .step_complete(step_instance_id, output)
        .await
        .map_err(|e| anyhow!("{e}"))?;

    match format {
        OutputFormat::Text => {
            println!(
                "Step {} completed: {}",
                step_instance_id,
                color::status(&result.status.to_string())
            );
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }
    Ok(())
}

async fn fail(step_instance_id: &str, error: &str, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::for_action().map_err(|e| anyhow!("{e}"))?;
    let result = client
        .step_fail(step_instance_id, error)
        .await
        .map_err(|e| anyhow!("{e}"))?;

    match format {
        OutputFormat::Text => {
            println!(
                "Step {} failed: {}",
                step_instance_id,
                color::status(&result.status.to_string())
            );
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }
    Ok(())
}

async fn stories(step_instance_id: &str, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::for_query().map_err(|e| anyhow!("{e}"))?;
    let stories = client
        .step_stories(step_instance_id)
        .await
        .map_err(|e| anyhow!("{e}"))?;

    match format {
        OutputFormat::Text => {
            if stories.is_empty() {
                println!("No stories for this run.");
                return Ok(());
            }
            let mut table = Table::new(vec![
                Column::left("STORY"),
                Column::left("TITLE").with_max(40),
                Column::status("STATUS"),
                Column::right("RETRIES"),
            ]);
            for s in &stories {
                table.row(vec![
                    s.story_id.clone(),
                    s.title.clone(),
                    s.status.to_string(),
                    format!("{}/{}", s.retry_count, s.max_retries),
                ]);
            }
            table.render(&mut std::io::stdout());
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stories)?),
    }
    Ok(())
}
