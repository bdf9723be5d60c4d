// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::config::Config;

use super::{startup, LifecycleError};

fn test_config(dir: &std::path::Path) -> Config {
    Config {
        state_dir: dir.to_path_buf(),
        socket_path: dir.join("daemon.sock"),
        lock_path: dir.join("daemon.pid"),
        log_path: dir.join("daemon.log"),
        store_dir: dir.join("store"),
        workspaces_path: dir.join("workspaces"),
        cron_gateway_url: None,
        cron_gateway_token: None,
    }
}

#[tokio::test]
async fn startup_binds_socket_and_opens_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());

    let result = startup(&config).await.expect("startup should succeed");

    assert!(config.socket_path.exists());
    assert!(config.lock_path.exists());
    drop(result.listener);
    result.daemon.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn startup_fails_when_lock_already_held() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());

    let first = startup(&config).await.expect("first startup should succeed");

    let second = startup(&config).await;
    assert!(matches!(second, Err(LifecycleError::LockFailed(_))));

    drop(first.listener);
    first.daemon.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn shutdown_removes_socket_and_lock_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());

    let result = startup(&config).await.expect("startup");
    drop(result.listener);
    result.daemon.shutdown().await.expect("shutdown");

    assert!(!config.socket_path.exists());
    assert!(!config.lock_path.exists());
}
