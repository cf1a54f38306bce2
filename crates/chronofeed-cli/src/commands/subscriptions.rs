//! Commands: subscribe, unsubscribe, connected, subscriptions.

use serde::Deserialize;
use serde_json::{json, Value};

use chronofeed::Chronofeed;

use super::{parse_args, CommandDefinition};
use crate::error::CliResult;

#[derive(Debug, Deserialize)]
struct SubscribeParams {
    subscriber: String,
    timeline: String,
    #[serde(default)]
    backlink: Option<String>,
    #[serde(default = "default_backfill")]
    backfill: bool,
}

fn default_backfill() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct UnsubscribeParams {
    subscriber: String,
    timeline: String,
}

#[derive(Debug, Deserialize)]
struct ConnectedParams {
    subscriber: String,
    #[serde(default)]
    backlink: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListParams {
    subscriber: String,
}

pub fn subscribe_definition() -> CommandDefinition {
    CommandDefinition {
        name: "subscribe".to_string(),
        description: Some("Register a timeline under a subscriber key".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "subscriber": { "type": "string" },
                "timeline": { "type": "string" },
                "backlink": { "type": "string" },
                "backfill": { "type": "boolean", "default": true }
            },
            "required": ["subscriber", "timeline"]
        }),
    }
}

pub fn subscribe(args: Value, feed: &Chronofeed) -> CliResult<Value> {
    let params: SubscribeParams = parse_args(args)?;
    feed.subscribe(
        &params.subscriber,
        &params.timeline,
        params.backlink.as_deref(),
        params.backfill,
    );
    Ok(json!({
        "subscriber": params.subscriber,
        "timeline": params.timeline,
        "backlink": params.backlink,
    }))
}

pub fn unsubscribe_definition() -> CommandDefinition {
    CommandDefinition {
        name: "unsubscribe".to_string(),
        description: Some("Remove a subscription entry".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "subscriber": { "type": "string" },
                "timeline": { "type": "string" }
            },
            "required": ["subscriber", "timeline"]
        }),
    }
}

pub fn unsubscribe(args: Value, feed: &Chronofeed) -> CliResult<Value> {
    let params: UnsubscribeParams = parse_args(args)?;
    feed.unsubscribe(&params.subscriber, &params.timeline);
    Ok(json!({
        "subscriber": params.subscriber,
        "timeline": params.timeline,
    }))
}

pub fn connected_definition() -> CommandDefinition {
    CommandDefinition {
        name: "connected".to_string(),
        description: Some("Check whether a subscriber holds a given backlink".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "subscriber": { "type": "string" },
                "backlink": { "type": "string" }
            },
            "required": ["subscriber"]
        }),
    }
}

pub fn connected(args: Value, feed: &Chronofeed) -> CliResult<Value> {
    let params: ConnectedParams = parse_args(args)?;
    let connected = feed.connected(&params.subscriber, params.backlink.as_deref());
    Ok(json!({ "connected": connected }))
}

pub fn subscriptions_definition() -> CommandDefinition {
    CommandDefinition {
        name: "subscriptions".to_string(),
        description: Some("List the timelines held under a subscriber key".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": { "subscriber": { "type": "string" } },
            "required": ["subscriber"]
        }),
    }
}

pub fn subscriptions(args: Value, feed: &Chronofeed) -> CliResult<Value> {
    let params: ListParams = parse_args(args)?;
    let entries: Vec<Value> = feed
        .subscriptions(&params.subscriber)
        .into_iter()
        .map(|(timeline, backlink)| json!({ "timeline": timeline, "backlink": backlink }))
        .collect();
    Ok(json!({
        "subscriber": params.subscriber,
        "total": entries.len(),
        "subscriptions": entries,
    }))
}
