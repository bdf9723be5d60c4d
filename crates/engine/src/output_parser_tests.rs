// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn missing_status_defaults_to_done() {
    let parsed = parse_output("NOTES: all good").unwrap();
    assert_eq!(parsed.status, StepResultStatus::Done);
    assert_eq!(parsed.context["NOTES"], "all good");
}

#[test]
fn generic_context_keys_do_not_absorb_continuation_lines() {
    let parsed = parse_output("TASK_ID: 42\nsome free commentary\nSTATUS: done").unwrap();
    assert_eq!(parsed.context["TASK_ID"], "42");
    assert_eq!(parsed.status, StepResultStatus::Done);
}

#[test]
fn recognizes_status_and_context_lines() {
    let parsed = parse_output("STATUS: retry\nREASON: flaky test\nISSUES: the login test is flaky\nand needs a retry").unwrap();
    assert_eq!(parsed.status, StepResultStatus::Retry);
    assert_eq!(parsed.context["REASON"], "flaky test");
    assert_eq!(
        parsed.issues.as_deref(),
        Some("the login test is flaky\nand needs a retry")
    );
}

#[test]
fn parses_stories_json_spanning_multiple_lines() {
    let output = concat!(
        "STATUS: done\n",
        "STORIES_JSON: [\n",
        "  {\"id\": \"US-1\", \"title\": \"a\", \"description\": \"d\", \"acceptanceCriteria\": [\"works\"]}\n",
        "]\n",
        "NEXT: unrelated"
    );
    let parsed = parse_output(output).unwrap();
    let stories = parsed.stories.unwrap();
    assert_eq!(stories.len(), 1);
    assert_eq!(stories[0].id, "US-1");
    assert_eq!(parsed.context["NEXT"], "unrelated");
}

#[test]
fn rejects_more_than_twenty_stories() {
    let entries: Vec<String> = (0..21)
        .map(|i| {
            format!(
                r#"{{"id": "US-{i}", "title": "t", "description": "d", "acceptanceCriteria": ["x"]}}"#
            )
        })
        .collect();
    let output = format!("STORIES_JSON: [{}]", entries.join(","));
    let err = parse_output(&output).unwrap_err();
    assert!(matches!(err, antfarm_core::Error::ParseError(_)));
}

#[test]
fn rejects_duplicate_story_ids() {
    let output = r#"STORIES_JSON: [
        {"id": "US-1", "title": "a", "description": "d", "acceptanceCriteria": ["x"]},
        {"id": "US-1", "title": "b", "description": "d", "acceptanceCriteria": ["x"]}
    ]"#;
    let err = parse_output(output).unwrap_err();
    assert!(matches!(err, antfarm_core::Error::ParseError(_)));
}

#[test]
fn rejects_stories_with_no_acceptance_criteria() {
    let output = r#"STORIES_JSON: [{"id": "US-1", "title": "a", "description": "d", "acceptanceCriteria": []}]"#;
    let err = parse_output(output).unwrap_err();
    assert!(matches!(err, antfarm_core::Error::ParseError(_)));
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = parse_output("STORIES_JSON: not json").unwrap_err();
    assert!(matches!(err, antfarm_core::Error::ParseError(_)));
}
