//! `antfarm run` - list, get, cancel.

use crate::prelude::*;

fn installed_and_running(farm: &Farm) {
    let manifest = farm.manifest("workflow.toml", MINIMAL_WORKFLOW_TOML);
    farm.antfarm()
        .args(&["workflow", "install", "wf-1", manifest.to_str().unwrap()])
        .passes();
    farm.antfarm()
        .args(&[
            "workflow",
            "run",
            "wf-1",
            "ship it",
            "--lead-agent",
            "lead",
        ])
        .passes();
}

#[test]
fn list_is_empty_before_any_run_starts() {
    let farm = Farm::new();

    farm.antfarm()
        .args(&["run", "list"])
        .passes()
        .stdout_has("No runs.");
}

#[test]
fn list_shows_a_started_run() {
    let farm = Farm::new();
    installed_and_running(&farm);

    farm.antfarm()
        .args(&["run", "list"])
        .passes()
        .stdout_has("wf-1")
        .stdout_has("ship it");
}

#[test]
fn get_shows_the_run_and_its_first_step() {
    let farm = Farm::new();
    installed_and_running(&farm);

    let listed = farm.antfarm().args(&["run", "list", "-o", "json"]).passes();
    let runs: serde_json::Value = serde_json::from_str(&listed.stdout()).expect("valid json");
    let run_id = runs[0]["id"].as_str().expect("id").to_string();

    farm.antfarm()
        .args(&["run", "get", &run_id])
        .passes()
        .stdout_has("ship it")
        .stdout_has("plan");
}

#[test]
fn cancel_reports_the_canceled_run() {
    let farm = Farm::new();
    installed_and_running(&farm);

    let listed = farm.antfarm().args(&["run", "list", "-o", "json"]).passes();
    let runs: serde_json::Value = serde_json::from_str(&listed.stdout()).expect("valid json");
    let run_id = runs[0]["id"].as_str().expect("id").to_string();

    farm.antfarm()
        .args(&["run", "cancel", &run_id])
        .passes()
        .stdout_has("canceled");
}
