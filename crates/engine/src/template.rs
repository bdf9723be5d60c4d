// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `{{name}}` placeholder resolution for rendered step input.
//!
//! Resolution never fails: an unknown placeholder is replaced by the empty
//! string. Callers are responsible for pre-populating every variable a step
//! expects.

use antfarm_core::Story;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([a-zA-Z_][a-zA-Z0-9_]*)\}\}").expect("constant regex pattern is valid")
});

/// Replace every `{{name}}` in `template` with `vars[name]`, or the empty
/// string if `name` is absent.
pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures| {
            vars.get(&caps[1]).cloned().unwrap_or_default()
        })
        .to_string()
}

/// Inputs needed to compute the loop-aware variables described in the
/// template resolver's contract (`current_story`, `completed_stories`, ...).
pub struct LoopVarsInput<'a> {
    pub current_story: Option<&'a Story>,
    pub all_stories: &'a [&'a Story],
    pub verify_feedback: Option<&'a str>,
    pub progress: &'a str,
}

/// Build the loop-aware variable set for a run with stories. Merged into the
/// run's context (later entries win) before `render` is called.
pub fn loop_vars(input: LoopVarsInput<'_>) -> HashMap<String, String> {
    let mut vars = HashMap::new();

    if let Some(story) = input.current_story {
        let mut block = format!("{}: {}\n{}\n", story.story_id, story.title, story.description);
        block.push_str("Acceptance criteria:\n");
        for (i, criterion) in story.acceptance_criteria.iter().enumerate() {
            block.push_str(&format!("{}. {}\n", i + 1, criterion));
        }
        vars.insert("current_story".to_string(), block);
        vars.insert("current_story_id".to_string(), story.story_id.clone());
        vars.insert("current_story_title".to_string(), story.title.clone());
    } else {
        vars.insert("current_story".to_string(), String::new());
        vars.insert("current_story_id".to_string(), String::new());
        vars.insert("current_story_title".to_string(), String::new());
    }

    let done_summary = input
        .all_stories
        .iter()
        .filter(|s| s.status == antfarm_core::StoryStatus::Done)
        .map(|s| format!("- {}: {}", s.story_id, s.title))
        .collect::<Vec<_>>()
        .join("\n");
    vars.insert("completed_stories".to_string(), done_summary);

    let remaining = input
        .all_stories
        .iter()
        .filter(|s| s.status == antfarm_core::StoryStatus::Pending)
        .count();
    vars.insert("stories_remaining".to_string(), remaining.to_string());

    vars.insert(
        "verify_feedback".to_string(),
        input.verify_feedback.unwrap_or("").to_string(),
    );
    vars.insert("progress".to_string(), input.progress.to_string());

    vars
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
