// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay.

use antfarm_core::{Event, Run, RunId, StepInstance, Story, WorkflowSpec};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The in-memory projection of every event ever applied: the current shape
/// of every installed workflow, run, step instance, and story.
///
/// Rebuilt by loading the last snapshot (if any) and replaying WAL entries
/// after it — never written to directly outside `apply_event`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterializedState {
    pub workflows: HashMap<String, WorkflowSpec>,
    pub runs: HashMap<String, Run>,
    pub step_instances: HashMap<String, StepInstance>,
    pub stories: HashMap<String, Story>,
}

impl MaterializedState {
    /// Get a run by ID or unique prefix (like git commit hashes).
    pub fn get_run(&self, id: &str) -> Option<&Run> {
        if let Some(run) = self.runs.get(id) {
            return Some(run);
        }
        let matches: Vec<_> = self.runs.iter().filter(|(k, _)| k.starts_with(id)).collect();
        if matches.len() == 1 {
            Some(matches[0].1)
        } else {
            None
        }
    }

    pub fn get_workflow(&self, id: &str) -> Option<&WorkflowSpec> {
        if let Some(wf) = self.workflows.get(id) {
            return Some(wf);
        }
        let matches: Vec<_> = self
            .workflows
            .iter()
            .filter(|(k, _)| k.starts_with(id))
            .collect();
        if matches.len() == 1 {
            Some(matches[0].1)
        } else {
            None
        }
    }

    pub fn get_step_instance(&self, id: &str) -> Option<&StepInstance> {
        if let Some(step) = self.step_instances.get(id) {
            return Some(step);
        }
        let matches: Vec<_> = self
            .step_instances
            .iter()
            .filter(|(k, _)| k.starts_with(id))
            .collect();
        if matches.len() == 1 {
            Some(matches[0].1)
        } else {
            None
        }
    }

    pub fn get_story(&self, id: &str) -> Option<&Story> {
        self.stories.get(id)
    }

    /// Every installed workflow, unordered.
    pub fn workflows(&self) -> impl Iterator<Item = &WorkflowSpec> {
        self.workflows.values()
    }

    /// Every run, unordered.
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.runs.values()
    }

    pub fn workflow_count(&self) -> usize {
        self.workflows.len()
    }

    /// Runs not yet in a terminal state.
    pub fn active_run_count(&self) -> usize {
        self.runs
            .values()
            .filter(|r| !r.status.is_terminal())
            .count()
    }

    /// Step instances belonging to a run, in the spec's step order.
    pub fn step_instances_for_run(&self, run_id: &RunId) -> Vec<&StepInstance> {
        let mut steps: Vec<&StepInstance> = self
            .step_instances
            .values()
            .filter(|s| s.run_id == *run_id)
            .collect();
        steps.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        steps
    }

    /// Stories belonging to a run, ordered by `story_index` (invariant 4).
    pub fn stories_for_run(&self, run_id: &RunId) -> Vec<&Story> {
        let mut stories: Vec<&Story> = self
            .stories
            .values()
            .filter(|s| s.run_id == *run_id)
            .collect();
        stories.sort_by_key(|s| s.story_index);
        stories
    }

    /// The lowest-`story_index` story in `pending` state for a run, if any
    /// (invariant 4: stories are claimed in order).
    pub fn next_pending_story(&self, run_id: &RunId) -> Option<&Story> {
        self.stories_for_run(run_id)
            .into_iter()
            .find(|s| s.status == antfarm_core::StoryStatus::Pending)
    }

    /// The lowest-ordered `pending` step instance assigned to `agent_id`,
    /// across every `running` run — the candidate `claim` hands out.
    ///
    /// Tie-broken by `(createdAt, stepIndex)` ascending (invariant
    /// §4.4.1), not by id: run ids are opaque-random, so sorting on them
    /// would hand out steps in an order unrelated to run creation time.
    pub fn next_pending_step_for_agent(&self, agent_id: &str) -> Option<&StepInstance> {
        let mut candidates: Vec<&StepInstance> = self
            .step_instances
            .values()
            .filter(|s| {
                s.agent_id == *agent_id
                    && s.status == antfarm_core::StepInstanceStatus::Pending
                    && self
                        .runs
                        .get(s.run_id.as_str())
                        .map(|r| r.status == antfarm_core::RunStatus::Running)
                        .unwrap_or(false)
            })
            .collect();
        candidates.sort_by_key(|s| self.claim_order_key(s));
        candidates.into_iter().next()
    }

    fn claim_order_key(&self, step: &StepInstance) -> (u64, usize) {
        let run = self.runs.get(step.run_id.as_str());
        let created_at_ms = run.map(|r| r.created_at_ms).unwrap_or(u64::MAX);
        let step_index = run
            .and_then(|r| self.workflows.get(r.workflow_id.as_str()))
            .and_then(|w| w.step_index(step.def_id.as_str()))
            .unwrap_or(usize::MAX);
        (created_at_ms, step_index)
    }

    /// Apply an event to derive state changes.
    ///
    /// # Idempotency requirement
    ///
    /// Every handler below must be idempotent: applying the same event twice
    /// (once for immediate visibility, once again on WAL replay after a
    /// restart) must leave the state identical to applying it once. That
    /// means: assignment instead of increment/accumulate, and existence
    /// checks guarding every insert.
    pub fn apply_event(&mut self, event: &Event) {
        match event {
            Event::WorkflowInstalled { spec } => {
                self.workflows.insert(spec.id.to_string(), spec.clone());
            }
            Event::WorkflowRemoved { id } => {
                self.workflows.remove(id.as_str());
            }
            Event::RunCreated {
                id,
                workflow_id,
                task_title,
                lead_agent_id,
                session_label,
                created_at_epoch_ms,
            } => {
                self.runs.entry(id.to_string()).or_insert_with(|| Run {
                    id: id.clone(),
                    workflow_id: workflow_id.clone(),
                    task_title: task_title.clone(),
                    lead_agent_id: lead_agent_id.clone(),
                    session_label: session_label.clone(),
                    status: antfarm_core::RunStatus::Running,
                    current_step_index: 0,
                    context: HashMap::new(),
                    results: Vec::new(),
                    created_at_ms: *created_at_epoch_ms,
                    updated_at_ms: *created_at_epoch_ms,
                });
            }
            Event::RunStatusChanged {
                id,
                status,
                updated_at_epoch_ms,
            } => {
                if let Some(run) = self.runs.get_mut(id.as_str()) {
                    run.status = *status;
                    run.updated_at_ms = *updated_at_epoch_ms;
                }
            }
            Event::RunStepAdvanced {
                id,
                current_step_index,
            } => {
                if let Some(run) = self.runs.get_mut(id.as_str()) {
                    run.current_step_index = *current_step_index;
                }
            }
            Event::RunContextMerged { id, entries } => {
                if let Some(run) = self.runs.get_mut(id.as_str()) {
                    run.merge_context(entries.clone());
                }
            }
            Event::RunResultAppended { id, result } => {
                if let Some(run) = self.runs.get_mut(id.as_str()) {
                    let already_present = run.results.iter().any(|r| r.id == result.id);
                    if !already_present {
                        run.results.push(result.clone());
                    }
                }
            }
            Event::StepInstanceCreated {
                id,
                run_id,
                def_id,
                agent_id,
                kind,
                status,
            } => {
                self.step_instances
                    .entry(id.to_string())
                    .or_insert_with(|| StepInstance {
                        id: id.clone(),
                        run_id: run_id.clone(),
                        def_id: def_id.clone(),
                        agent_id: agent_id.clone(),
                        kind: kind.clone(),
                        status: *status,
                        retry_count: 0,
                        current_story_id: None,
                    });
            }
            Event::StepInstanceStatusChanged { id, status } => {
                if let Some(step) = self.step_instances.get_mut(id.as_str()) {
                    step.status = *status;
                }
            }
            Event::StepInstanceRetryCountSet { id, retry_count } => {
                if let Some(step) = self.step_instances.get_mut(id.as_str()) {
                    step.retry_count = *retry_count;
                }
            }
            Event::StepInstanceCurrentStorySet { id, story_id } => {
                if let Some(step) = self.step_instances.get_mut(id.as_str()) {
                    step.current_story_id = story_id.clone();
                }
            }
            Event::StoryCreated { story } => {
                self.stories
                    .entry(story.id.to_string())
                    .or_insert_with(|| story.clone());
            }
            Event::StoryStatusChanged { id, status } => {
                if let Some(story) = self.stories.get_mut(id.as_str()) {
                    story.status = *status;
                }
            }
            Event::StoryRetryCountSet { id, retry_count } => {
                if let Some(story) = self.stories.get_mut(id.as_str()) {
                    story.retry_count = *retry_count;
                }
            }
            Event::StoryOutputSet { id, output } => {
                if let Some(story) = self.stories.get_mut(id.as_str()) {
                    story.output = Some(output.clone());
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
