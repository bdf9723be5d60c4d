//! `antfarm step` - claim, complete, fail, stories.

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
fn claim_with_no_runs_returns_nothing() {
    let farm = Farm::new();

    farm.antfarm()
        .args(&["step", "claim", "lead"])
        .passes()
        .stdout_has("No pending step");
}

#[test]
fn claim_returns_the_first_step_of_a_started_run() {
    let farm = Farm::new();
    installed_and_running(&farm);

    farm.antfarm()
        .args(&["step", "claim", "lead"])
        .passes()
        .stdout_has("Plan the task and report back.");
}

#[test]
fn complete_reports_the_parsed_status() {
    let farm = Farm::new();
    installed_and_running(&farm);

    let claimed = farm
        .antfarm()
        .args(&["step", "claim", "lead", "-o", "json"])
        .passes();
    let json: serde_json::Value =
        serde_json::from_str(&claimed.stdout()).expect("valid json");
    let step_instance_id = json["step_instance_id"].as_str().expect("id").to_string();

    farm.antfarm()
        .args(&["step", "complete", &step_instance_id, "STATUS: done"])
        .passes()
        .stdout_has("completed")
        .stdout_has("done");
}

#[test]
fn fail_reports_a_retry_status() {
    let farm = Farm::new();
    installed_and_running(&farm);

    let claimed = farm
        .antfarm()
        .args(&["step", "claim", "lead", "-o", "json"])
        .passes();
    let json: serde_json::Value =
        serde_json::from_str(&claimed.stdout()).expect("valid json");
    let step_instance_id = json["step_instance_id"].as_str().expect("id").to_string();

    farm.antfarm()
        .args(&["step", "fail", &step_instance_id, "agent crashed"])
        .passes()
        .stdout_has("failed");
}

#[test]
fn stories_for_a_fresh_run_starts_empty() {
    let farm = Farm::new();
    installed_and_running(&farm);

    let claimed = farm
        .antfarm()
        .args(&["step", "claim", "lead", "-o", "json"])
        .passes();
    let json: serde_json::Value =
        serde_json::from_str(&claimed.stdout()).expect("valid json");
    let step_instance_id = json["step_instance_id"].as_str().expect("id").to_string();

    farm.antfarm()
        .args(&["step", "stories", &step_instance_id])
        .passes()
        .stdout_has("No stories");
}
