// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! antfarm - coordination kernel CLI

mod client;
mod color;
mod commands;
mod daemon_process;
mod env;
mod exit_error;
mod output;
mod table;

use output::OutputFormat;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{daemon, run, step, workflow};

#[derive(Parser)]
#[command(
    name = "antfarm",
    version,
    about = "Coordination kernel for multi-agent software workflows"
)]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install, run, and inspect workflow manifests
    Workflow(workflow::WorkflowArgs),
    /// The interface external agent runtimes poll against
    Step(step::StepArgs),
    /// Inspect and control workflow runs
    Run(run::RunArgs),
    /// Daemon process management
    Daemon(daemon::DaemonArgs),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run_cli().await {
        let code = e.downcast_ref::<exit_error::ExitError>().map_or(1, |c| c.code);
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {msg}");
        }
        std::process::exit(code);
    }
}

/// Format an anyhow error, deduplicating the chain.
///
/// If the top-level Display already contains the source error text, skip
/// the "Caused by" chain to avoid noisy duplicate output (common when
/// thiserror variants use `#[error("... {0}")]` with `#[from]`).
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();

    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));

    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {i}: {cause}"));
    }
    buf
}

fn cli_command() -> clap::Command {
    use clap::CommandFactory;
    Cli::command().styles(color::styles())
}

async fn run_cli() -> Result<()> {
    use clap::FromArgMatches;
    let matches = cli_command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;
    let format = cli.output;

    match cli.command {
        Commands::Workflow(args) => workflow::workflow(args, format).await?,
        Commands::Step(args) => step::step(args, format).await?,
        Commands::Run(args) => run::run(args, format).await?,
        Commands::Daemon(args) => daemon::daemon(args, format).await?,
    }

    Ok(())
}
