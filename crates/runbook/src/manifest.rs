// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The on-disk shape of a workflow manifest, before label injection and
//! cross-reference validation turn it into an `antfarm_core::WorkflowSpec`.
//!
//! Block labels (`agent "dev" { ... }`, `step "plan" { ... }`) are carried as
//! map keys here; [`crate::parser`] copies each key into the entity's `id`
//! field once the whole document has been deserialized.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestDocument {
    pub workflow: ManifestWorkflowMeta,
    #[serde(default, alias = "agent")]
    pub agents: IndexMap<String, ManifestAgent>,
    #[serde(default, alias = "step")]
    pub steps: IndexMap<String, ManifestStep>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestWorkflowMeta {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestAgent {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub workspace_root: std::path::PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestStep {
    pub agent: String,
    #[serde(default = "default_step_type")]
    #[serde(rename = "type")]
    pub step_type: String,
    #[serde(default)]
    pub r#loop: Option<ManifestLoopConfig>,
    pub input: String,
    pub expects: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default)]
    pub on_fail: Option<ManifestOnFail>,
}

fn default_step_type() -> String {
    "single".to_string()
}

fn default_max_retries() -> u32 {
    2
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestLoopConfig {
    #[serde(default = "default_over")]
    pub over: String,
    #[serde(default = "default_completion")]
    pub completion: String,
    #[serde(default = "default_fresh_session")]
    pub fresh_session: bool,
    #[serde(default)]
    pub verify_each: bool,
    #[serde(default)]
    pub verify_step: Option<String>,
}

fn default_over() -> String {
    "stories".to_string()
}

fn default_completion() -> String {
    "all_done".to_string()
}

fn default_fresh_session() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestOnFail {
    #[serde(default)]
    pub retry_step: Option<String>,
    #[serde(default)]
    pub escalate_to: Option<String>,
}
