// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parses an agent's free-text output into a status, context writes, and an
//! optional `STORIES_JSON` work list.

use antfarm_core::{Error, Result, StepResultStatus, StoryDraft, MAX_STORIES};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static KEY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z_][A-Z0-9_]*):\s?(.*)$").expect("constant regex pattern is valid"));

/// The result of classifying one agent turn's output.
#[derive(Debug, Clone, Default)]
pub struct ParsedOutput {
    pub status: StepResultStatus,
    pub context: HashMap<String, String>,
    pub stories: Option<Vec<StoryDraft>>,
    pub issues: Option<String>,
}

struct KeyBlock {
    key: String,
    /// Text immediately following the key on its own line. For
    /// `STORIES_JSON`/`ISSUES`, also any continuation lines up to (but
    /// excluding) the next key line — every other key is single-line only.
    block: String,
}

fn spans_lines(key: &str) -> bool {
    matches!(key, "STORIES_JSON" | "ISSUES")
}

pub fn parse_output(output: &str) -> Result<ParsedOutput> {
    let lines: Vec<&str> = output.lines().collect();

    let mut key_lines: Vec<(usize, String, String)> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if let Some(caps) = KEY_LINE.captures(line) {
            key_lines.push((i, caps[1].to_string(), caps[2].to_string()));
        }
    }

    let mut blocks = Vec::with_capacity(key_lines.len());
    for (idx, (line_idx, key, first_line_value)) in key_lines.iter().enumerate() {
        let mut block = first_line_value.clone();
        if spans_lines(key) {
            let next_key_line = key_lines.get(idx + 1).map(|(i, _, _)| *i).unwrap_or(lines.len());
            for continuation in &lines[(line_idx + 1).min(lines.len())..next_key_line] {
                block.push('\n');
                block.push_str(continuation);
            }
        }
        blocks.push(KeyBlock {
            key: key.clone(),
            block: block.trim().to_string(),
        });
    }

    let mut parsed = ParsedOutput {
        status: StepResultStatus::Done,
        ..Default::default()
    };

    for block in &blocks {
        match block.key.as_str() {
            "STATUS" => match block.block.as_str() {
                "done" => parsed.status = StepResultStatus::Done,
                "retry" => parsed.status = StepResultStatus::Retry,
                "blocked" => parsed.status = StepResultStatus::Blocked,
                other => {
                    parsed.context.insert("STATUS".to_string(), other.to_string());
                }
            },
            "STORIES_JSON" => {
                let stories = parse_stories(&block.block)?;
                parsed.stories = Some(stories);
            }
            "ISSUES" => {
                parsed.issues = Some(block.block.clone());
            }
            key => {
                parsed.context.insert(key.to_string(), block.block.clone());
            }
        }
    }

    Ok(parsed)
}

fn parse_stories(json: &str) -> Result<Vec<StoryDraft>> {
    let drafts: Vec<StoryDraft> = serde_json::from_str(json)
        .map_err(|e| Error::ParseError(format!("invalid STORIES_JSON: {e}")))?;

    if drafts.len() > MAX_STORIES {
        return Err(Error::ParseError(format!(
            "STORIES_JSON has {} entries; at most {MAX_STORIES} are allowed",
            drafts.len()
        )));
    }

    let mut seen = HashSet::new();
    for draft in &drafts {
        if draft.acceptance_criteria.is_empty() {
            return Err(Error::ParseError(format!(
                "story '{}' has no acceptance criteria",
                draft.id
            )));
        }
        if !seen.insert(draft.id.as_str()) {
            return Err(Error::ParseError(format!(
                "duplicate story id '{}' in STORIES_JSON",
                draft.id
            )));
        }
    }

    Ok(drafts)
}

#[cfg(test)]
#[path = "output_parser_tests.rs"]
mod tests;
