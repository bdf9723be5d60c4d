// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow specification: agents and the ordered step graph.
//!
//! A `WorkflowSpec` is immutable once installed. The manifest front end
//! (`antfarm-runbook`) is responsible for producing one from HCL/TOML/JSON;
//! this module only defines the shape and the step-graph types the engine
//! walks.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifier of an installed workflow.
    pub struct WorkflowId;
}

crate::define_id! {
    /// Identifier of an agent declared in a workflow spec.
    pub struct AgentId;
}

crate::define_id! {
    /// Identifier of a step definition, unique within its workflow spec.
    pub struct StepId;
}

/// An agent declared by a workflow: who can be assigned steps, and where its
/// workspace (and `progress.txt`) lives on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDef {
    pub id: AgentId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub workspace_root: std::path::PathBuf,
}

/// Whether a step runs once or iterates over the run's stories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepKind {
    Single,
    Loop(LoopConfig),
}

impl StepKind {
    pub fn is_loop(&self) -> bool {
        matches!(self, StepKind::Loop(_))
    }
}

/// What a `loop`-type step iterates over and how it decides it's done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Always `stories` today; kept as a field (rather than implied) so a
    /// future loop source doesn't require a new step type.
    #[serde(default = "LoopConfig::default_over")]
    pub over: LoopOver,
    #[serde(default = "LoopConfig::default_completion")]
    pub completion: LoopCompletion,
    #[serde(default = "LoopConfig::default_fresh_session")]
    pub fresh_session: bool,
    #[serde(default)]
    pub verify_each: bool,
    #[serde(default)]
    pub verify_step: Option<StepId>,
}

impl LoopConfig {
    fn default_over() -> LoopOver {
        LoopOver::Stories
    }
    fn default_completion() -> LoopCompletion {
        LoopCompletion::AllDone
    }
    fn default_fresh_session() -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopOver {
    Stories,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopCompletion {
    AllDone,
}

/// Failure policy: rewind to an earlier step, escalate to a human-facing
/// agent, or (if both are absent) simply block the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OnFail {
    #[serde(default)]
    pub retry_step: Option<StepId>,
    #[serde(default)]
    pub escalate_to: Option<AgentId>,
}

fn default_max_retries() -> u32 {
    2
}

/// One step in a workflow's pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDef {
    pub id: StepId,
    pub agent: AgentId,
    #[serde(flatten)]
    pub kind: StepKind,
    pub input: String,
    pub expects: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default)]
    pub on_fail: Option<OnFail>,
}

impl StepDef {
    pub fn loop_config(&self) -> Option<&LoopConfig> {
        match &self.kind {
            StepKind::Loop(cfg) => Some(cfg),
            StepKind::Single => None,
        }
    }
}

/// An installed, immutable workflow: agents plus an ordered step pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSpec {
    pub id: WorkflowId,
    pub name: String,
    pub version: String,
    pub agents: Vec<AgentDef>,
    pub steps: Vec<StepDef>,
}

impl WorkflowSpec {
    pub fn agent(&self, id: &str) -> Option<&AgentDef> {
        self.agents.iter().find(|a| a.id == *id)
    }

    pub fn step(&self, id: &str) -> Option<&StepDef> {
        self.steps.iter().find(|s| s.id == *id)
    }

    pub fn step_index(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == *id)
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
