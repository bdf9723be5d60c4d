//! `antfarm daemon` - start, status, restart, stop.

use crate::prelude::*;

#[test]
fn status_reports_not_running_before_first_command() {
    let farm = Farm::new();

    farm.antfarm()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("not running");
}

#[test]
fn workflow_list_auto_starts_the_daemon() {
    let farm = Farm::new();

    farm.antfarm()
        .args(&["workflow", "list"])
        .passes()
        .stdout_has("No workflows installed");

    farm.antfarm()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("running");
}

#[test]
fn stop_then_status_reports_not_running_again() {
    let farm = Farm::new();

    farm.antfarm().args(&["workflow", "list"]).passes();
    farm.antfarm().args(&["daemon", "stop"]).passes();

    farm.antfarm()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("not running");
}

#[test]
fn restart_leaves_the_daemon_reachable() {
    let farm = Farm::new();

    farm.antfarm().args(&["workflow", "list"]).passes();
    farm.antfarm().args(&["daemon", "restart"]).passes();

    assert!(wait_for(SPEC_WAIT_MAX_MS, || {
        farm.antfarm()
            .args(&["daemon", "status"])
            .command()
            .output()
            .map(|o| {
                o.status.success()
                    && String::from_utf8_lossy(&o.stdout).contains("running")
            })
            .unwrap_or(false)
    }));
}
