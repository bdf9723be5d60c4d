//! Test helpers for behavioral specifications.
//!
//! Provides a high-level DSL for testing antfarm CLI behavior.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

// Aggressive timeouts for fast tests.
//
// IMPORTANT:
//   Do NOT change these.
//   File a performance bug instead.
const ANTFARM_TIMEOUT_CONNECT_MS: &str = "2000";
const ANTFARM_TIMEOUT_EXIT_MS: &str = "500";
const ANTFARM_TIMEOUT_IPC_MS: &str = "500";
const ANTFARM_CONNECT_POLL_MS: &str = "5";

pub const SPEC_POLL_INTERVAL_MS: u64 = 10;
pub const SPEC_WAIT_MAX_MS: u64 = 2000;

/// Returns the path to a binary, checking llvm-cov target directory first.
/// This works with both standard builds and llvm-cov coverage runs.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

fn antfarm_binary() -> PathBuf {
    binary_path("antfarm")
}

pub fn antfarmd_binary() -> PathBuf {
    binary_path("antfarmd")
}

pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

/// High-level CLI builder for fluent test assertions.
pub struct CliBuilder {
    args: Vec<String>,
    dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            dir: None,
            envs: vec![
                (
                    "ANTFARM_DAEMON_BINARY".into(),
                    antfarmd_binary().to_string_lossy().into(),
                ),
                (
                    "ANTFARM_TIMEOUT_CONNECT_MS".into(),
                    ANTFARM_TIMEOUT_CONNECT_MS.into(),
                ),
                ("ANTFARM_TIMEOUT_EXIT_MS".into(), ANTFARM_TIMEOUT_EXIT_MS.into()),
                ("ANTFARM_TIMEOUT_IPC_MS".into(), ANTFARM_TIMEOUT_IPC_MS.into()),
                ("ANTFARM_CONNECT_POLL_MS".into(), ANTFARM_CONNECT_POLL_MS.into()),
            ],
        }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn pwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((
            key.to_string(),
            value.as_ref().to_string_lossy().to_string(),
        ));
        self
    }

    pub fn command(self) -> Command {
        let mut cmd = Command::new(antfarm_binary());
        cmd.args(&self.args);

        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }

        for (key, value) in self.envs {
            cmd.env(key, value);
        }

        cmd
    }

    /// Run and expect success (exit code 0).
    pub fn passes(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    /// Run and expect failure (non-zero exit code).
    pub fn fails(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            !output.status.success(),
            "expected command to fail, but it passed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }
}

/// Result of a CLI run for chaining assertions.
pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(expected),
            "stdout does not contain '{}'\nstdout: {}",
            expected,
            stdout
        );
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(expected),
            "stderr does not contain '{}'\nstderr: {}",
            expected,
            stderr
        );
        self
    }
}

/// Poll a condition until it returns true or timeout is reached.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);
    let poll_interval = std::time::Duration::from_millis(SPEC_POLL_INTERVAL_MS);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

/// An isolated daemon state directory for one test, with a running
/// `antfarm` CLI bound to it via `ANTFARM_STATE_DIR`.
pub struct Farm {
    state_dir: tempfile::TempDir,
}

impl Farm {
    pub fn new() -> Self {
        Self {
            state_dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn state_path(&self) -> &Path {
        self.state_dir.path()
    }

    /// Write a manifest file into the state dir's scratch area and return
    /// its path.
    pub fn manifest(&self, name: &str, content: &str) -> PathBuf {
        let path = self.state_path().join(name);
        std::fs::write(&path, content).expect("write manifest");
        path
    }

    pub fn antfarm(&self) -> CliBuilder {
        cli().env("ANTFARM_STATE_DIR", self.state_path())
    }
}

impl Drop for Farm {
    fn drop(&mut self) {
        let mut cmd = self.antfarm().args(&["daemon", "stop"]).command();
        cmd.stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null());
        let _ = cmd.status();
    }
}

pub const MINIMAL_WORKFLOW_TOML: &str = r#"
[workflow]
name = "example"
version = "1"

[agent.lead]
workspace_root = "/tmp/antfarm-spec-lead"

[step.plan]
agent = "lead"
input = "Plan the task and report back."
expects = "STATUS: done"
"#;
