//! Commands: timeline, entries, stats.

use serde::Deserialize;
use serde_json::{json, Value};

use chronofeed::{Chronofeed, Token};

use super::{parse_args, CommandDefinition};
use crate::error::CliResult;

#[derive(Debug, Deserialize)]
struct TimelineParams {
    key: String,
    #[serde(default)]
    per_page: Option<usize>,
    #[serde(default)]
    page: Option<Token>,
}

#[derive(Debug, Deserialize)]
struct EntriesParams {
    key: String,
}

pub fn timeline_definition() -> CommandDefinition {
    CommandDefinition {
        name: "timeline".to_string(),
        description: Some("Read one page of a timeline, newest cursor first".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "key": { "type": "string" },
                "per_page": { "type": "integer", "minimum": 0 },
                "page": { "type": "integer", "default": -1, "description": "next_page cursor" }
            },
            "required": ["key"]
        }),
    }
}

pub fn timeline(args: Value, feed: &Chronofeed) -> CliResult<Value> {
    let params: TimelineParams = parse_args(args)?;

    let mut request = feed.first_page();
    if let Some(per_page) = params.per_page {
        request.per_page = per_page;
    }
    if let Some(page) = params.page {
        request = request.from_cursor(page);
    }

    let page = feed.timeline(&params.key, request);
    Ok(serde_json::to_value(page)?)
}

pub fn entries_definition() -> CommandDefinition {
    CommandDefinition {
        name: "entries".to_string(),
        description: Some("List raw (token, event key) index entries of a timeline".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": { "key": { "type": "string" } },
            "required": ["key"]
        }),
    }
}

pub fn entries(args: Value, feed: &Chronofeed) -> CliResult<Value> {
    let params: EntriesParams = parse_args(args)?;
    let entries: Vec<Value> = feed
        .timeline_entries(&params.key)
        .into_iter()
        .map(|(token, key)| json!({ "token": token, "key": key }))
        .collect();
    Ok(json!({
        "timeline": params.key,
        "total": entries.len(),
        "entries": entries,
    }))
}

pub fn stats_definition() -> CommandDefinition {
    CommandDefinition {
        name: "stats".to_string(),
        description: Some("Show store sizes".to_string()),
        input_schema: json!({ "type": "object", "properties": {} }),
    }
}

pub fn stats(_args: Value, feed: &Chronofeed) -> CliResult<Value> {
    Ok(serde_json::to_value(feed.stats())?)
}
