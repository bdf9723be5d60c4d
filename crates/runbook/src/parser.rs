// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow manifest parsing (HCL, TOML, and JSON)

use crate::manifest::{ManifestDocument, ManifestLoopConfig};
use antfarm_core::{
    AgentDef, LoopCompletion, LoopConfig, LoopOver, OnFail, StepDef, StepId, StepKind,
    WorkflowId, WorkflowSpec,
};
use std::collections::HashSet;
use thiserror::Error;

/// Manifest file format. HCL is the primary authoring format; TOML and JSON
/// are accepted as alternate encodings of the same schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Hcl,
    Toml,
    Json,
}

/// Errors that can occur while parsing or validating a workflow manifest.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("HCL parse error: {0}")]
    Hcl(#[from] hcl::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid manifest at {location}: {message}")]
    Validation { location: String, message: String },
}

impl ParseError {
    fn validation(location: impl Into<String>, message: impl Into<String>) -> Self {
        ParseError::Validation {
            location: location.into(),
            message: message.into(),
        }
    }
}

/// Parse a workflow manifest in the given format and validate it into a
/// `WorkflowSpec` identified by `workflow_id` (assigned by the caller at
/// install time; manifests themselves carry no identifier).
pub fn parse_manifest(
    content: &str,
    format: Format,
    workflow_id: &str,
) -> Result<WorkflowSpec, ParseError> {
    // 1. Serde does the heavy lifting.
    let doc: ManifestDocument = match format {
        Format::Hcl => hcl::from_str(content)?,
        Format::Toml => toml::from_str(content)?,
        Format::Json => serde_json::from_str(content)?,
    };

    // 2. Inject block-label names into id fields.
    let agents: Vec<AgentDef> = doc
        .agents
        .iter()
        .map(|(label, a)| AgentDef {
            id: label.as_str().into(),
            name: a.name.clone(),
            description: a.description.clone(),
            workspace_root: a.workspace_root.clone(),
        })
        .collect();

    let agent_ids: HashSet<&str> = agents.iter().map(|a| a.id.as_str()).collect();
    let step_ids: HashSet<&str> = doc.steps.keys().map(|k| k.as_str()).collect();

    // 3. Step ids are unique by construction (map keys); build StepDef list
    //    in manifest declaration order.
    let mut steps = Vec::with_capacity(doc.steps.len());
    for (label, m) in doc.steps.iter() {
        // 4. Validate the agent reference.
        if !agent_ids.contains(m.agent.as_str()) {
            return Err(ParseError::validation(
                format!("step.{label}.agent"),
                format!("references unknown agent '{}'", m.agent),
            ));
        }

        let kind = match m.step_type.as_str() {
            "single" => {
                if m.r#loop.is_some() {
                    return Err(ParseError::validation(
                        format!("step.{label}.loop"),
                        "loop config is only valid on a step of type 'loop'",
                    ));
                }
                StepKind::Single
            }
            "loop" => {
                let cfg = m.r#loop.as_ref().ok_or_else(|| {
                    ParseError::validation(
                        format!("step.{label}.loop"),
                        "type 'loop' requires a loop block",
                    )
                })?;
                StepKind::Loop(validate_loop_config(label, cfg, &step_ids)?)
            }
            other => {
                return Err(ParseError::validation(
                    format!("step.{label}.type"),
                    format!("unknown step type '{other}'; expected 'single' or 'loop'"),
                ));
            }
        };

        let on_fail = match &m.on_fail {
            None => None,
            Some(f) => {
                if let Some(ref retry_step) = f.retry_step {
                    if !step_ids.contains(retry_step.as_str()) {
                        return Err(ParseError::validation(
                            format!("step.{label}.on_fail.retry_step"),
                            format!("references unknown step '{retry_step}'"),
                        ));
                    }
                }
                if let Some(ref escalate_to) = f.escalate_to {
                    if !agent_ids.contains(escalate_to.as_str()) {
                        return Err(ParseError::validation(
                            format!("step.{label}.on_fail.escalate_to"),
                            format!("references unknown agent '{escalate_to}'"),
                        ));
                    }
                }
                Some(OnFail {
                    retry_step: f.retry_step.as_deref().map(StepId::from),
                    escalate_to: f.escalate_to.as_deref().map(Into::into),
                })
            }
        };

        steps.push(StepDef {
            id: label.as_str().into(),
            agent: m.agent.as_str().into(),
            kind,
            input: m.input.clone(),
            expects: m.expects.clone(),
            max_retries: m.max_retries,
            on_fail,
        });
    }

    Ok(WorkflowSpec {
        id: WorkflowId::new(workflow_id.to_string()),
        name: doc.workflow.name,
        version: doc.workflow.version,
        agents,
        steps,
    })
}

fn validate_loop_config(
    step_label: &str,
    cfg: &ManifestLoopConfig,
    step_ids: &HashSet<&str>,
) -> Result<LoopConfig, ParseError> {
    if cfg.over != "stories" {
        return Err(ParseError::validation(
            format!("step.{step_label}.loop.over"),
            format!("unsupported loop source '{}'; only 'stories' is defined", cfg.over),
        ));
    }
    if cfg.completion != "all_done" {
        return Err(ParseError::validation(
            format!("step.{step_label}.loop.completion"),
            format!(
                "unsupported completion policy '{}'; only 'all_done' is defined",
                cfg.completion
            ),
        ));
    }

    let verify_step = match &cfg.verify_step {
        None => {
            if cfg.verify_each {
                return Err(ParseError::validation(
                    format!("step.{step_label}.loop.verify_step"),
                    "verify_each requires a verify_step",
                ));
            }
            None
        }
        Some(vs) => {
            if vs == step_label {
                return Err(ParseError::validation(
                    format!("step.{step_label}.loop.verify_step"),
                    "a step cannot verify itself",
                ));
            }
            if !step_ids.contains(vs.as_str()) {
                return Err(ParseError::validation(
                    format!("step.{step_label}.loop.verify_step"),
                    format!("references unknown step '{vs}'"),
                ));
            }
            Some(StepId::from(vs.as_str()))
        }
    };

    Ok(LoopConfig {
        over: LoopOver::Stories,
        completion: LoopCompletion::AllDone,
        fresh_session: cfg.fresh_session,
        verify_each: cfg.verify_each,
        verify_step,
    })
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
