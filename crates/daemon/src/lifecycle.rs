// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, recovery.

use std::fs::File;
use std::sync::Arc;
use std::time::Instant;

use fs2::FileExt;
use antfarm_engine::{CronGatewayClient, Engine};
use antfarm_storage::Store;
use thiserror::Error;
use tokio::net::UnixListener;
use tokio::sync::Mutex;
use tracing::info;

use crate::config::Config;

/// Lifecycle errors.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine state directory")]
    NoStateDir,

    #[error("failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("failed to bind socket at {0}: {1}")]
    BindFailed(std::path::PathBuf, std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] antfarm_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Daemon state during operation: the store and engine behind one lock,
/// following the single-writer model — every mutating request is serialized
/// through this mutex, and reads take it only long enough to clone the slice
/// of the projection they need.
pub struct DaemonState {
    pub config: Config,
    #[allow(dead_code)]
    lock_file: File,
    pub store: Arc<Mutex<Store>>,
    pub engine: Engine,
    pub gateway: Option<CronGatewayClient>,
    pub start_time: Instant,
}

/// Result of daemon startup.
pub struct StartupResult {
    pub daemon: DaemonState,
    pub listener: UnixListener,
}

/// Start the daemon: acquire the lock, open the store, bind the socket.
pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // Acquire the lock file first, to avoid a startup race with a second
    // daemon launched concurrently.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    use std::io::Write;
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    std::fs::create_dir_all(&config.workspaces_path)?;

    // Opening the store replays the last snapshot plus any WAL entries
    // committed after it — no separate recovery step is needed here.
    let store = Store::open(&config.store_dir)?;
    info!(dir = %config.store_dir.display(), "opened store");

    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    let gateway = config
        .cron_gateway_url
        .as_ref()
        .map(|url| CronGatewayClient::new(url.clone(), config.cron_gateway_token.clone()));

    info!("daemon started");

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            lock_file,
            store: Arc::new(Mutex::new(store)),
            engine: Engine::new(),
            gateway,
            start_time: Instant::now(),
        },
        listener,
    })
}

fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

impl DaemonState {
    /// Shut down the daemon gracefully: force a checkpoint so the next
    /// startup replays a short WAL tail, then remove the socket and lock
    /// files. The lock itself is released when `lock_file` drops.
    pub async fn shutdown(&self) -> Result<(), LifecycleError> {
        info!("shutting down daemon...");

        {
            let mut store = self.store.lock().await;
            if let Err(e) = store.checkpoint_now() {
                tracing::warn!(error = %e, "failed to checkpoint on shutdown");
            }
        }

        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                tracing::warn!(error = %e, "failed to remove socket file");
            }
        }
        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                tracing::warn!(error = %e, "failed to remove lock file");
            }
        }

        info!("daemon shutdown complete");
        Ok(())
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
