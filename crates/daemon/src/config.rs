// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: state directory layout and cron gateway settings.

use std::path::PathBuf;

use crate::lifecycle::LifecycleError;

/// Resolve the state directory: `ANTFARM_STATE_DIR` > `XDG_STATE_HOME/antfarm` >
/// `~/.openclaw/antfarm`.
fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("ANTFARM_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("antfarm"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".openclaw").join("antfarm"))
}

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (default `~/.openclaw/antfarm/`).
    pub state_dir: PathBuf,
    /// Path to the Unix socket.
    pub socket_path: PathBuf,
    /// Path to the lock/PID file.
    pub lock_path: PathBuf,
    /// Path to the daemon log file.
    pub log_path: PathBuf,
    /// Root of the durable store (WAL + snapshot), passed to `Store::open`.
    pub store_dir: PathBuf,
    /// Root under which each installed workflow's agent workspaces live.
    pub workspaces_path: PathBuf,
    /// Cron gateway endpoint, if configured via `ANTFARM_CRON_GATEWAY_URL`.
    pub cron_gateway_url: Option<String>,
    /// Bearer token for the cron gateway, if configured via `ANTFARM_CRON_GATEWAY_TOKEN`.
    pub cron_gateway_token: Option<String>,
}

impl Config {
    /// Load configuration for the daemon. One daemon instance serves every
    /// installed workflow under the resolved state directory.
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = state_dir()?;

        Ok(Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            log_path: state_dir.join("daemon.log"),
            store_dir: state_dir.join("store"),
            workspaces_path: state_dir.join("workspaces"),
            cron_gateway_url: std::env::var("ANTFARM_CRON_GATEWAY_URL").ok(),
            cron_gateway_token: std::env::var("ANTFARM_CRON_GATEWAY_TOKEN").ok(),
            state_dir,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
