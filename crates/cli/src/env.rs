// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::client::ClientError;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Resolve state directory: `ANTFARM_STATE_DIR` > `XDG_STATE_HOME/antfarm` >
/// `~/.openclaw/antfarm`. Mirrors `antfarm_daemon::config`'s resolution so the
/// CLI and daemon always agree on where the socket and PID files live.
pub fn state_dir() -> Result<PathBuf, ClientError> {
    if let Ok(dir) = std::env::var("ANTFARM_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("antfarm"));
    }
    let home = std::env::var("HOME").map_err(|_| ClientError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".openclaw").join("antfarm"))
}

pub fn no_color() -> bool {
    std::env::var("NO_COLOR").is_ok_and(|v| v == "1")
}

pub fn force_color() -> bool {
    std::env::var("COLOR").is_ok_and(|v| v == "1")
}

pub fn daemon_binary() -> Option<String> {
    std::env::var("ANTFARM_DAEMON_BINARY").ok()
}

pub fn cargo_manifest_dir() -> Option<String> {
    std::env::var("CARGO_MANIFEST_DIR").ok()
}

/// Cron gateway endpoint the CLI talks to directly for `workflow install`/
/// `workflow uninstall` (the same variable the daemon reads for `listCronJobs`).
pub fn cron_gateway_url() -> Option<String> {
    std::env::var("ANTFARM_CRON_GATEWAY_URL").ok()
}

pub fn cron_gateway_token() -> Option<String> {
    std::env::var("ANTFARM_CRON_GATEWAY_TOKEN").ok()
}

pub fn timeout_ipc_ms() -> Option<Duration> {
    parse_duration_ms("ANTFARM_TIMEOUT_IPC_MS")
}
pub fn timeout_connect_ms() -> Option<Duration> {
    parse_duration_ms("ANTFARM_TIMEOUT_CONNECT_MS")
}
pub fn timeout_exit_ms() -> Option<Duration> {
    parse_duration_ms("ANTFARM_TIMEOUT_EXIT_MS")
}
pub fn connect_poll_ms() -> Option<Duration> {
    parse_duration_ms("ANTFARM_CONNECT_POLL_MS")
}
