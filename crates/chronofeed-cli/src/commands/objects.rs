//! Commands: record, unrecord.

use serde::Deserialize;
use serde_json::{json, Value};

use chronofeed::Chronofeed;

use super::{parse_args, CommandDefinition};
use crate::error::CliResult;

#[derive(Debug, Deserialize)]
struct RecordParams {
    key: String,
    data: Value,
}

#[derive(Debug, Deserialize)]
struct KeyParams {
    key: String,
}

pub fn record_definition() -> CommandDefinition {
    CommandDefinition {
        name: "record".to_string(),
        description: Some("Store object data referenced by events".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "key": { "type": "string" },
                "data": { "type": "object" }
            },
            "required": ["key", "data"]
        }),
    }
}

pub fn record(args: Value, feed: &Chronofeed) -> CliResult<Value> {
    let params: RecordParams = parse_args(args)?;
    feed.record(&params.key, params.data)?;
    Ok(json!({ "recorded": params.key }))
}

pub fn unrecord_definition() -> CommandDefinition {
    CommandDefinition {
        name: "unrecord".to_string(),
        description: Some("Remove object data".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": { "key": { "type": "string" } },
            "required": ["key"]
        }),
    }
}

pub fn unrecord(args: Value, feed: &Chronofeed) -> CliResult<Value> {
    let params: KeyParams = parse_args(args)?;
    feed.unrecord(&params.key);
    Ok(json!({ "unrecorded": params.key }))
}
