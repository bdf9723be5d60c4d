//! `antfarm workflow` - install, list, status, run, uninstall.

use crate::prelude::*;

#[test]
fn install_then_list_shows_the_workflow() {
    let farm = Farm::new();
    let manifest = farm.manifest("workflow.toml", MINIMAL_WORKFLOW_TOML);

    farm.antfarm()
        .args(&["workflow", "install", "wf-1", manifest.to_str().unwrap()])
        .passes()
        .stdout_has("Installed workflow 'wf-1'");

    farm.antfarm()
        .args(&["workflow", "list"])
        .passes()
        .stdout_has("wf-1")
        .stdout_has("example");
}

#[test]
fn install_infers_format_from_extension() {
    let farm = Farm::new();
    let manifest = farm.manifest("workflow.toml", MINIMAL_WORKFLOW_TOML);

    farm.antfarm()
        .args(&["workflow", "install", "wf-1", manifest.to_str().unwrap()])
        .passes();
}

#[test]
fn install_rejects_an_unrecognized_extension_without_format_flag() {
    let farm = Farm::new();
    let manifest = farm.manifest("workflow.txt", MINIMAL_WORKFLOW_TOML);

    farm.antfarm()
        .args(&["workflow", "install", "wf-1", manifest.to_str().unwrap()])
        .fails()
        .stderr_has("--format");
}

#[test]
fn status_shows_agent_and_step_counts() {
    let farm = Farm::new();
    let manifest = farm.manifest("workflow.toml", MINIMAL_WORKFLOW_TOML);
    farm.antfarm()
        .args(&["workflow", "install", "wf-1", manifest.to_str().unwrap()])
        .passes();

    farm.antfarm()
        .args(&["workflow", "status", "wf-1"])
        .passes()
        .stdout_has("Agents:  1")
        .stdout_has("Steps:   1");
}

#[test]
fn run_starts_a_new_run_against_an_installed_workflow() {
    let farm = Farm::new();
    let manifest = farm.manifest("workflow.toml", MINIMAL_WORKFLOW_TOML);
    farm.antfarm()
        .args(&["workflow", "install", "wf-1", manifest.to_str().unwrap()])
        .passes();

    farm.antfarm()
        .args(&[
            "workflow",
            "run",
            "wf-1",
            "ship the feature",
            "--lead-agent",
            "lead",
        ])
        .passes()
        .stdout_has("Started run");
}

#[test]
fn run_against_an_unknown_workflow_fails() {
    let farm = Farm::new();

    farm.antfarm()
        .args(&[
            "workflow",
            "run",
            "does-not-exist",
            "ship it",
            "--lead-agent",
            "lead",
        ])
        .fails();
}

#[test]
fn uninstall_removes_the_workflow_from_the_listing() {
    let farm = Farm::new();
    let manifest = farm.manifest("workflow.toml", MINIMAL_WORKFLOW_TOML);
    farm.antfarm()
        .args(&["workflow", "install", "wf-1", manifest.to_str().unwrap()])
        .passes();

    farm.antfarm()
        .args(&["workflow", "uninstall", "wf-1"])
        .passes()
        .stdout_has("Uninstalled workflow 'wf-1'");

    farm.antfarm()
        .args(&["workflow", "list"])
        .passes()
        .stdout_has("No workflows installed");
}

#[test]
fn update_reinstalls_the_manifest_under_the_same_id() {
    let farm = Farm::new();
    let manifest = farm.manifest("workflow.toml", MINIMAL_WORKFLOW_TOML);
    farm.antfarm()
        .args(&["workflow", "install", "wf-1", manifest.to_str().unwrap()])
        .passes();

    farm.antfarm()
        .args(&["workflow", "update", "wf-1", manifest.to_str().unwrap()])
        .passes()
        .stdout_has("Updated workflow 'wf-1'");
}
