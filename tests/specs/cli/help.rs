//! Top-level CLI surface: help output and argument errors.

use crate::prelude::*;

#[test]
fn no_args_prints_usage_and_fails() {
    cli().fails().stderr_has("Usage");
}

#[test]
fn help_lists_the_four_subcommands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("workflow")
        .stdout_has("step")
        .stdout_has("run")
        .stdout_has("daemon");
}

#[test]
fn unknown_subcommand_fails_with_usage() {
    cli().args(&["bogus"]).fails().stderr_has("Usage");
}

#[test]
fn workflow_status_of_unknown_id_reports_not_found() {
    let farm = Farm::new();

    farm.antfarm()
        .args(&["workflow", "status", "does-not-exist"])
        .passes()
        .stdout_has("not found");
}

#[test]
fn run_get_of_unknown_id_reports_not_found() {
    let farm = Farm::new();

    farm.antfarm()
        .args(&["run", "get", "does-not-exist"])
        .passes()
        .stdout_has("not found");
}
