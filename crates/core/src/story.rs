// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A unit of work inside a `loop` step.

use crate::run::RunId;
use serde::{Deserialize, Serialize};
use std::fmt;

crate::define_id! {
    /// Identifier of a story row (distinct from its human-readable `story_id` label).
    pub struct StoryId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryStatus {
    Pending,
    Running,
    Done,
    Failed,
}

impl fmt::Display for StoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoryStatus::Pending => write!(f, "pending"),
            StoryStatus::Running => write!(f, "running"),
            StoryStatus::Done => write!(f, "done"),
            StoryStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Default retry budget for a story created from a `STORIES_JSON` block.
pub const DEFAULT_STORY_MAX_RETRIES: u32 = 2;

fn default_max_retries() -> u32 {
    DEFAULT_STORY_MAX_RETRIES
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    pub run_id: RunId,
    /// Position within the run; stories are selected in this order (invariant 4).
    pub story_index: usize,
    /// Human label from `STORIES_JSON`, e.g. `"US-001"`. Unique within a run,
    /// but not the primary key — `id` is.
    pub story_id: String,
    pub title: String,
    pub description: String,
    pub acceptance_criteria: Vec<String>,
    pub status: StoryStatus,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// One entry parsed out of an agent's `STORIES_JSON` block, before it is
/// assigned a `StoryId`/`story_index` and inserted into the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryDraft {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "acceptanceCriteria")]
    pub acceptance_criteria: Vec<String>,
}

/// `STORIES_JSON` arrays longer than this are rejected (§4.3 boundary behavior).
pub const MAX_STORIES: usize = 20;

#[cfg(test)]
#[path = "story_tests.rs"]
mod tests;
