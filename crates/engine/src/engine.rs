// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The step engine: `claim`, `complete`, `fail`, and `cancel_run`, plus the
//! pipeline-advancement and escalation logic they share.

use crate::output_parser::parse_output;
use crate::template::{self, LoopVarsInput};
use crate::workspace_bridge;
use antfarm_core::{
    Clock, Error, Event, IdGen, OnFail, Result, Run, RunId, RunStatus, StepDef, StepInstance,
    StepInstanceStatus, StepKind, StepResult, StepResultId, StepResultStatus, Story, StoryId,
    StoryStatus, SystemClock, UuidIdGen, WorkflowSpec,
};
use antfarm_storage::Store;
use std::collections::HashMap;
use std::path::Path;

/// Work handed back from a successful `claim`: the step to run and its
/// rendered input.
#[derive(Debug, Clone)]
pub struct ClaimedWork {
    pub step_instance_id: antfarm_core::StepInstanceId,
    pub run_id: RunId,
    pub rendered_input: String,
    pub expects: String,
}

/// Coordinates step transitions over a [`Store`]. Stateless beyond its clock
/// and id generator — every other piece of state lives in the store.
pub struct Engine<C: Clock = SystemClock, I: IdGen = UuidIdGen> {
    clock: C,
    id_gen: I,
}

impl Engine<SystemClock, UuidIdGen> {
    pub fn new() -> Self {
        Self {
            clock: SystemClock,
            id_gen: UuidIdGen,
        }
    }
}

impl Default for Engine<SystemClock, UuidIdGen> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock, I: IdGen> Engine<C, I> {
    pub fn with_clock_and_ids(clock: C, id_gen: I) -> Self {
        Self { clock, id_gen }
    }

    /// Claim the next ready step for `agent_id`, or `None` if it has nothing
    /// to do right now (§4.4.1).
    pub fn claim(&self, store: &mut Store, agent_id: &str) -> Result<Option<ClaimedWork>> {
        self.claim_inner(store, agent_id, true)
    }

    fn claim_inner(
        &self,
        store: &mut Store,
        agent_id: &str,
        allow_recurse: bool,
    ) -> Result<Option<ClaimedWork>> {
        let step = match store.state().next_pending_step_for_agent(agent_id) {
            Some(step) => step.clone(),
            None => return Ok(None),
        };

        let run = self.require_run(store, step.run_id.as_str())?;
        let workflow = self.require_workflow(store, run.workflow_id.as_str())?;
        let step_def = self.require_step_def(&workflow, step.def_id.as_str())?.clone();

        match step.kind.clone() {
            StepKind::Single => {
                let rendered = self.render_for_step(store, &workflow, &run, &step_def, None)?;
                store.apply(&[Event::StepInstanceStatusChanged {
                    id: step.id.clone(),
                    status: StepInstanceStatus::Running,
                }])?;
                tracing::info!(step_id = %step.id, agent_id, "claimed single step");
                Ok(Some(ClaimedWork {
                    step_instance_id: step.id,
                    run_id: run.id,
                    rendered_input: rendered,
                    expects: step_def.expects,
                }))
            }
            StepKind::Loop(_) => match store.state().next_pending_story(&run.id).cloned() {
                None => {
                    let mut events = vec![Event::StepInstanceStatusChanged {
                        id: step.id.clone(),
                        status: StepInstanceStatus::Done,
                    }];
                    let (advance_events, completed) =
                        self.advance_pipeline_events(store, &run, &workflow);
                    events.extend(advance_events);
                    store.apply(&events)?;
                    if completed {
                        self.archive_workspace_progress(&workflow, &run);
                    }
                    tracing::info!(step_id = %step.id, "loop step exhausted stories, advancing");

                    if allow_recurse {
                        self.claim_inner(store, agent_id, false)
                    } else {
                        Ok(None)
                    }
                }
                Some(story) => {
                    let rendered =
                        self.render_for_step(store, &workflow, &run, &step_def, Some(&story))?;
                    store.apply(&[
                        Event::StoryStatusChanged {
                            id: story.id.clone(),
                            status: StoryStatus::Running,
                        },
                        Event::StepInstanceCurrentStorySet {
                            id: step.id.clone(),
                            story_id: Some(story.id.clone()),
                        },
                        Event::StepInstanceStatusChanged {
                            id: step.id.clone(),
                            status: StepInstanceStatus::Running,
                        },
                    ])?;
                    tracing::info!(step_id = %step.id, story_id = %story.story_id, "claimed loop story");
                    Ok(Some(ClaimedWork {
                        step_instance_id: step.id,
                        run_id: run.id,
                        rendered_input: rendered,
                        expects: step_def.expects,
                    }))
                }
            },
        }
    }

    /// Record a step's outcome (§4.4.2).
    pub fn complete(&self, store: &mut Store, step_instance_id: &str, output: &str) -> Result<StepResult> {
        let step = self.require_step_instance(store, step_instance_id)?;
        let run = self.require_run(store, step.run_id.as_str())?;

        if run.status == RunStatus::Canceled {
            tracing::warn!(step_id = %step.id, run_id = %run.id, "ignoring complete for a canceled run");
            return Ok(StepResult {
                id: StepResultId::new(self.id_gen.next()),
                step_def_id: step.def_id.clone(),
                agent_id: step.agent_id.clone(),
                output: output.to_string(),
                status: StepResultStatus::Done,
                completed_at_ms: self.clock.epoch_ms(),
            });
        }

        if step.status == StepInstanceStatus::Done {
            return run
                .results
                .iter()
                .rev()
                .find(|r| r.step_def_id == step.def_id)
                .cloned()
                .ok_or_else(|| {
                    Error::invalid_state(format!(
                        "step '{step_instance_id}' is done but has no recorded result"
                    ))
                });
        }

        if step.status != StepInstanceStatus::Running {
            return Err(Error::invalid_state(format!(
                "step '{step_instance_id}' is '{}', not 'running'",
                step.status
            )));
        }

        let workflow = self.require_workflow(store, run.workflow_id.as_str())?;

        let parsed = parse_output(output)?;

        let mut events = Vec::new();
        if !parsed.context.is_empty() {
            events.push(Event::RunContextMerged {
                id: run.id.clone(),
                entries: parsed.context.clone(),
            });
        }
        if let Some(drafts) = &parsed.stories {
            let existing = store.state().stories_for_run(&run.id).len();
            for (offset, draft) in drafts.iter().enumerate() {
                events.push(Event::StoryCreated {
                    story: Story {
                        id: StoryId::new(self.id_gen.next()),
                        run_id: run.id.clone(),
                        story_index: existing + offset,
                        story_id: draft.id.clone(),
                        title: draft.title.clone(),
                        description: draft.description.clone(),
                        acceptance_criteria: draft.acceptance_criteria.clone(),
                        status: StoryStatus::Pending,
                        output: None,
                        retry_count: 0,
                        max_retries: antfarm_core::DEFAULT_STORY_MAX_RETRIES,
                    },
                });
            }
        }

        let result = StepResult {
            id: StepResultId::new(self.id_gen.next()),
            step_def_id: step.def_id.clone(),
            agent_id: step.agent_id.clone(),
            output: output.to_string(),
            status: parsed.status,
            completed_at_ms: self.clock.epoch_ms(),
        };
        events.push(Event::RunResultAppended {
            id: run.id.clone(),
            result: result.clone(),
        });

        let triggering_loop = store
            .state()
            .step_instances_for_run(&run.id)
            .into_iter()
            .find(|inst| {
                inst.id != step.id
                    && inst.status == StepInstanceStatus::Running
                    && matches!(&inst.kind, StepKind::Loop(cfg) if cfg.verify_step.as_ref().map(|s| s.as_str()) == Some(step.def_id.as_str()))
            })
            .cloned();

        match (&step.kind, step.current_story_id.clone(), triggering_loop) {
            (StepKind::Single, _, None) => {
                events.push(Event::StepInstanceStatusChanged {
                    id: step.id.clone(),
                    status: StepInstanceStatus::Done,
                });
                let (advance_events, completed) = self.advance_pipeline_events(store, &run, &workflow);
                events.extend(advance_events);
                store.apply(&events)?;
                if completed {
                    self.archive_workspace_progress(&workflow, &run);
                }
            }

            (StepKind::Loop(cfg), Some(story_id), _) => {
                events.push(Event::StoryStatusChanged {
                    id: story_id.clone(),
                    status: StoryStatus::Done,
                });
                events.push(Event::StoryOutputSet {
                    id: story_id.clone(),
                    output: output.to_string(),
                });
                events.push(Event::StepInstanceCurrentStorySet {
                    id: step.id.clone(),
                    story_id: None,
                });

                if cfg.verify_each {
                    let verify_def = cfg.verify_step.as_ref().ok_or_else(|| {
                        Error::invalid_state(format!(
                            "step '{}' has verify_each set but no verify_step",
                            step.def_id
                        ))
                    })?;
                    let verify_instance = store
                        .state()
                        .step_instances_for_run(&run.id)
                        .into_iter()
                        .find(|inst| &inst.def_id == verify_def)
                        .ok_or_else(|| {
                            Error::invalid_state(format!(
                                "no step instance for verify step '{verify_def}'"
                            ))
                        })?
                        .clone();
                    events.push(Event::StepInstanceStatusChanged {
                        id: verify_instance.id,
                        status: StepInstanceStatus::Pending,
                    });
                    events.push(Event::StepInstanceStatusChanged {
                        id: step.id.clone(),
                        status: StepInstanceStatus::Running,
                    });
                    store.apply(&events)?;
                } else {
                    let any_pending = store
                        .state()
                        .stories_for_run(&run.id)
                        .iter()
                        .any(|s| s.status == StoryStatus::Pending);
                    if any_pending {
                        events.push(Event::StepInstanceStatusChanged {
                            id: step.id.clone(),
                            status: StepInstanceStatus::Pending,
                        });
                        store.apply(&events)?;
                    } else {
                        events.push(Event::StepInstanceStatusChanged {
                            id: step.id.clone(),
                            status: StepInstanceStatus::Done,
                        });
                        let (advance_events, completed) =
                            self.advance_pipeline_events(store, &run, &workflow);
                        events.extend(advance_events);
                        store.apply(&events)?;
                        if completed {
                            self.archive_workspace_progress(&workflow, &run);
                        }
                    }
                }
            }

            (_, _, Some(loop_instance)) => {
                self.complete_verify_triggered_by_loop(
                    store,
                    &run,
                    &workflow,
                    &step,
                    &loop_instance,
                    result.status,
                    parsed.issues.as_deref(),
                    events,
                )?;
            }

            (StepKind::Loop(_), None, None) => {
                // A loop step completed with no story in flight and nothing
                // waiting on it: treat like a single step so it still
                // advances rather than stalling.
                events.push(Event::StepInstanceStatusChanged {
                    id: step.id.clone(),
                    status: StepInstanceStatus::Done,
                });
                let (advance_events, completed) = self.advance_pipeline_events(store, &run, &workflow);
                events.extend(advance_events);
                store.apply(&events)?;
                if completed {
                    self.archive_workspace_progress(&workflow, &run);
                }
            }
        }

        tracing::info!(step_id = %step.id, status = %result.status, "step completed");
        Ok(result)
    }

    #[allow(clippy::too_many_arguments)]
    fn complete_verify_triggered_by_loop(
        &self,
        store: &mut Store,
        run: &Run,
        workflow: &WorkflowSpec,
        verify_step: &StepInstance,
        loop_instance: &StepInstance,
        status: StepResultStatus,
        issues: Option<&str>,
        mut events: Vec<Event>,
    ) -> Result<()> {
        match status {
            StepResultStatus::Done => {
                let mut ctx = HashMap::new();
                ctx.insert("verify_feedback".to_string(), String::new());
                events.push(Event::RunContextMerged {
                    id: run.id.clone(),
                    entries: ctx,
                });

                let any_pending = store
                    .state()
                    .stories_for_run(&run.id)
                    .iter()
                    .any(|s| s.status == StoryStatus::Pending);
                if any_pending {
                    events.push(Event::StepInstanceStatusChanged {
                        id: loop_instance.id.clone(),
                        status: StepInstanceStatus::Pending,
                    });
                    events.push(Event::StepInstanceStatusChanged {
                        id: verify_step.id.clone(),
                        status: StepInstanceStatus::Waiting,
                    });
                    store.apply(&events)?;
                } else {
                    events.push(Event::StepInstanceStatusChanged {
                        id: loop_instance.id.clone(),
                        status: StepInstanceStatus::Done,
                    });
                    events.push(Event::StepInstanceStatusChanged {
                        id: verify_step.id.clone(),
                        status: StepInstanceStatus::Done,
                    });
                    let (advance_events, completed) = self.advance_pipeline_events(store, run, workflow);
                    events.extend(advance_events);
                    store.apply(&events)?;
                    if completed {
                        self.archive_workspace_progress(workflow, run);
                    }
                }
            }
            StepResultStatus::Retry => {
                let last_done = store
                    .state()
                    .stories_for_run(&run.id)
                    .into_iter()
                    .filter(|s| s.status == StoryStatus::Done)
                    .max_by_key(|s| s.story_index)
                    .cloned()
                    .ok_or_else(|| {
                        Error::invalid_state(
                            "verify returned retry with no completed story to attribute it to",
                        )
                    })?;

                let new_retry = last_done.retry_count + 1;
                if new_retry < last_done.max_retries {
                    events.push(Event::StoryRetryCountSet {
                        id: last_done.id.clone(),
                        retry_count: new_retry,
                    });
                    events.push(Event::StoryStatusChanged {
                        id: last_done.id.clone(),
                        status: StoryStatus::Pending,
                    });
                    let mut ctx = HashMap::new();
                    ctx.insert("verify_feedback".to_string(), issues.unwrap_or_default().to_string());
                    events.push(Event::RunContextMerged {
                        id: run.id.clone(),
                        entries: ctx,
                    });
                    events.push(Event::StepInstanceStatusChanged {
                        id: loop_instance.id.clone(),
                        status: StepInstanceStatus::Pending,
                    });
                    events.push(Event::StepInstanceStatusChanged {
                        id: verify_step.id.clone(),
                        status: StepInstanceStatus::Waiting,
                    });
                    store.apply(&events)?;
                } else {
                    events.push(Event::StoryRetryCountSet {
                        id: last_done.id.clone(),
                        retry_count: new_retry,
                    });
                    events.push(Event::StoryStatusChanged {
                        id: last_done.id.clone(),
                        status: StoryStatus::Failed,
                    });
                    events.push(Event::StepInstanceStatusChanged {
                        id: verify_step.id.clone(),
                        status: StepInstanceStatus::Done,
                    });
                    events.extend(self.escalate_step(store, loop_instance, workflow, run));
                    store.apply(&events)?;
                }
            }
            StepResultStatus::Blocked => {
                let now = self.clock.epoch_ms();
                events.push(Event::RunStatusChanged {
                    id: run.id.clone(),
                    status: RunStatus::Blocked,
                    updated_at_epoch_ms: now,
                });
                store.apply(&events)?;
            }
        }
        Ok(())
    }

    /// Record a step failure (§4.4.3).
    pub fn fail(&self, store: &mut Store, step_instance_id: &str, error: &str) -> Result<StepResult> {
        let step = self.require_step_instance(store, step_instance_id)?;
        let run = self.require_run(store, step.run_id.as_str())?;

        if run.status == RunStatus::Canceled {
            tracing::warn!(step_id = %step.id, run_id = %run.id, "ignoring fail for a canceled run");
            return Ok(StepResult {
                id: StepResultId::new(self.id_gen.next()),
                step_def_id: step.def_id.clone(),
                agent_id: step.agent_id.clone(),
                output: error.to_string(),
                status: StepResultStatus::Retry,
                completed_at_ms: self.clock.epoch_ms(),
            });
        }

        if step.status != StepInstanceStatus::Running {
            return Err(Error::invalid_state(format!(
                "step '{step_instance_id}' is '{}', not 'running'",
                step.status
            )));
        }

        let workflow = self.require_workflow(store, run.workflow_id.as_str())?;

        let result = StepResult {
            id: StepResultId::new(self.id_gen.next()),
            step_def_id: step.def_id.clone(),
            agent_id: step.agent_id.clone(),
            output: error.to_string(),
            status: StepResultStatus::Retry,
            completed_at_ms: self.clock.epoch_ms(),
        };
        let mut events = vec![Event::RunResultAppended {
            id: run.id.clone(),
            result: result.clone(),
        }];

        match (&step.kind, step.current_story_id.clone()) {
            (StepKind::Loop(_), Some(story_id)) => {
                let story = store
                    .state()
                    .get_story(story_id.as_str())
                    .cloned()
                    .ok_or_else(|| Error::not_found(format!("story '{story_id}'")))?;
                let new_retry = story.retry_count + 1;
                events.push(Event::StoryRetryCountSet {
                    id: story.id.clone(),
                    retry_count: new_retry,
                });
                events.push(Event::StepInstanceCurrentStorySet {
                    id: step.id.clone(),
                    story_id: None,
                });
                if new_retry < story.max_retries {
                    events.push(Event::StoryStatusChanged {
                        id: story.id.clone(),
                        status: StoryStatus::Pending,
                    });
                    events.push(Event::StepInstanceStatusChanged {
                        id: step.id.clone(),
                        status: StepInstanceStatus::Pending,
                    });
                } else {
                    events.push(Event::StoryStatusChanged {
                        id: story.id.clone(),
                        status: StoryStatus::Failed,
                    });
                    events.push(Event::StepInstanceStatusChanged {
                        id: step.id.clone(),
                        status: StepInstanceStatus::Failed,
                    });
                    events.extend(self.escalate_step(store, &step, &workflow, &run));
                }
            }
            _ => {
                let step_def = self.require_step_def(&workflow, step.def_id.as_str())?;
                let new_retry = step.retry_count + 1;
                events.push(Event::StepInstanceRetryCountSet {
                    id: step.id.clone(),
                    retry_count: new_retry,
                });
                if new_retry < step_def.max_retries {
                    events.push(Event::StepInstanceStatusChanged {
                        id: step.id.clone(),
                        status: StepInstanceStatus::Pending,
                    });
                } else {
                    events.push(Event::StepInstanceStatusChanged {
                        id: step.id.clone(),
                        status: StepInstanceStatus::Failed,
                    });
                    events.extend(self.escalate_step(store, &step, &workflow, &run));
                }
            }
        }

        store.apply(&events)?;
        tracing::warn!(step_id = %step.id, error, "step failed");
        Ok(result)
    }

    /// Transition a run to `canceled` (§5). Steps already claimed by an
    /// agent are left alone; their eventual `complete`/`fail` is ignored.
    pub fn cancel_run(&self, store: &mut Store, run_id: &str) -> Result<()> {
        let run = self.require_run(store, run_id)?;
        let now = self.clock.epoch_ms();
        store.apply(&[Event::RunStatusChanged {
            id: run.id.clone(),
            status: RunStatus::Canceled,
            updated_at_epoch_ms: now,
        }])?;
        tracing::info!(run_id, "run canceled");
        Ok(())
    }

    /// Apply `onFail` escalation (§4.4.4): a step's retry budget has just
    /// been exhausted and it's already marked `failed`.
    fn escalate_step(
        &self,
        store: &Store,
        failed: &StepInstance,
        workflow: &WorkflowSpec,
        run: &Run,
    ) -> Vec<Event> {
        let step_def = workflow.step(failed.def_id.as_str());
        let on_fail = step_def.and_then(|d| d.on_fail.as_ref());

        if let Some(retry_step) = on_fail.and_then(|f: &OnFail| f.retry_step.as_ref()) {
            let mut events = Vec::new();
            if let (Some(failed_idx), Some(retry_idx)) = (
                workflow.step_index(failed.def_id.as_str()),
                workflow.step_index(retry_step.as_str()),
            ) {
                let (lo, hi) = if retry_idx <= failed_idx {
                    (retry_idx, failed_idx)
                } else {
                    (failed_idx, retry_idx)
                };
                let instances = store.state().step_instances_for_run(&run.id);
                for def in &workflow.steps[lo..=hi] {
                    if let Some(inst) = instances.iter().find(|i| i.def_id == def.id) {
                        events.push(Event::StepInstanceStatusChanged {
                            id: inst.id.clone(),
                            status: StepInstanceStatus::Waiting,
                        });
                    }
                }
                if let Some(retry_inst) = instances.iter().find(|i| &i.def_id == retry_step) {
                    events.push(Event::StepInstanceStatusChanged {
                        id: retry_inst.id.clone(),
                        status: StepInstanceStatus::Pending,
                    });
                }
            }
            events.push(Event::StepInstanceRetryCountSet {
                id: failed.id.clone(),
                retry_count: 0,
            });
            events
        } else if let Some(agent) = on_fail.and_then(|f: &OnFail| f.escalate_to.as_ref()) {
            let now = self.clock.epoch_ms();
            let mut ctx = HashMap::new();
            ctx.insert("escalate_to".to_string(), agent.to_string());
            vec![
                Event::RunStatusChanged {
                    id: run.id.clone(),
                    status: RunStatus::Blocked,
                    updated_at_epoch_ms: now,
                },
                Event::RunContextMerged {
                    id: run.id.clone(),
                    entries: ctx,
                },
            ]
        } else {
            let now = self.clock.epoch_ms();
            vec![Event::RunStatusChanged {
                id: run.id.clone(),
                status: RunStatus::Blocked,
                updated_at_epoch_ms: now,
            }]
        }
    }

    /// Pipeline advancement (§4.4.5): returns the events to apply alongside
    /// the caller's own batch, plus whether the run just completed.
    fn advance_pipeline_events(&self, store: &Store, run: &Run, workflow: &WorkflowSpec) -> (Vec<Event>, bool) {
        let instances = store.state().step_instances_for_run(&run.id);
        let next = workflow.steps.iter().enumerate().find_map(|(idx, def)| {
            instances
                .iter()
                .find(|i| i.def_id == def.id && i.status == StepInstanceStatus::Waiting)
                .map(|inst| (idx, (**inst).clone()))
        });

        match next {
            Some((idx, inst)) => (
                vec![
                    Event::StepInstanceStatusChanged {
                        id: inst.id,
                        status: StepInstanceStatus::Pending,
                    },
                    Event::RunStepAdvanced {
                        id: run.id.clone(),
                        current_step_index: idx,
                    },
                ],
                false,
            ),
            None => {
                let now = self.clock.epoch_ms();
                (
                    vec![Event::RunStatusChanged {
                        id: run.id.clone(),
                        status: RunStatus::Completed,
                        updated_at_epoch_ms: now,
                    }],
                    true,
                )
            }
        }
    }

    fn archive_workspace_progress(&self, workflow: &WorkflowSpec, run: &Run) {
        if let Some(workspace) = loop_agent_workspace(workflow) {
            if let Err(err) = workspace_bridge::archive_progress(workspace, run.id.as_str()) {
                tracing::warn!(run_id = %run.id, error = %err, "failed to archive progress.txt");
            }
        }
    }

    fn render_for_step(
        &self,
        store: &Store,
        workflow: &WorkflowSpec,
        run: &Run,
        step_def: &StepDef,
        story: Option<&Story>,
    ) -> Result<String> {
        let mut vars = run.context.clone();

        let all_stories = store.state().stories_for_run(&run.id);
        if step_def.kind.is_loop() || story.is_some() || !all_stories.is_empty() {
            let progress = loop_agent_workspace(workflow)
                .map(workspace_bridge::read_progress)
                .unwrap_or_else(|| "(no progress yet)".to_string());
            let verify_feedback = run.context.get("verify_feedback").map(String::as_str);
            let loop_vars = template::loop_vars(LoopVarsInput {
                current_story: story,
                all_stories: &all_stories,
                verify_feedback,
                progress: &progress,
            });
            vars.extend(loop_vars);
        }

        Ok(template::render(&step_def.input, &vars))
    }

    fn require_run(&self, store: &Store, run_id: &str) -> Result<Run> {
        store
            .state()
            .get_run(run_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("run '{run_id}'")))
    }

    fn require_workflow(&self, store: &Store, workflow_id: &str) -> Result<WorkflowSpec> {
        store
            .state()
            .get_workflow(workflow_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("workflow '{workflow_id}'")))
    }

    fn require_step_instance(&self, store: &Store, step_instance_id: &str) -> Result<StepInstance> {
        store
            .state()
            .get_step_instance(step_instance_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("step instance '{step_instance_id}'")))
    }

    fn require_step_def<'a>(&self, workflow: &'a WorkflowSpec, step_id: &str) -> Result<&'a StepDef> {
        workflow
            .step(step_id)
            .ok_or_else(|| Error::not_found(format!("step definition '{step_id}'")))
    }
}

/// Resolve the workspace of the agent assigned to this workflow's (single)
/// loop step — the only agent whose `progress.txt` the engine reads.
fn loop_agent_workspace(workflow: &WorkflowSpec) -> Option<&Path> {
    let loop_step = workflow.steps.iter().find(|s| s.kind.is_loop())?;
    workflow.agent(loop_step.agent.as_str()).map(|a| a.workspace_root.as_path())
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
