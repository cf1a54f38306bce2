//! Commands: publish, unpublish, fetch, update.

use serde::Deserialize;
use serde_json::{json, Value};

use chronofeed::{now_token, Attributes, Chronofeed, Event, ObjectRefs, Token};

use super::{parse_args, CommandDefinition};
use crate::error::CliResult;

#[derive(Debug, Deserialize)]
struct PublishParams {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    token: Option<Token>,
    #[serde(default)]
    data: Attributes,
    #[serde(default)]
    timelines: Vec<String>,
    #[serde(default)]
    objects: ObjectRefs,
}

#[derive(Debug, Deserialize)]
struct KeyParams {
    key: String,
}

#[derive(Debug, Deserialize)]
struct UpdateParams {
    #[serde(flatten)]
    event: Event,
    #[serde(default)]
    update_timelines: bool,
}

fn event_schema() -> Value {
    json!({
        "key": { "type": "string" },
        "token": { "type": "integer", "minimum": 0 },
        "data": { "type": "object" },
        "timelines": { "type": "array", "items": { "type": "string" } },
        "objects": {
            "type": "object",
            "additionalProperties": { "type": "array", "items": { "type": "string" } }
        }
    })
}

pub fn publish_definition() -> CommandDefinition {
    CommandDefinition {
        name: "publish".to_string(),
        description: Some(
            "Publish an event and fan it out (key defaults to a fresh UUID, token to now)"
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": event_schema(),
            "required": ["timelines"]
        }),
    }
}

pub fn publish(args: Value, feed: &Chronofeed) -> CliResult<Value> {
    let params: PublishParams = parse_args(args)?;
    let event = Event {
        key: params
            .key
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        token: params.token.unwrap_or_else(now_token),
        data: params.data,
        timelines: params.timelines,
        objects: params.objects,
    };

    let key = feed.publish(&event)?;
    Ok(json!({ "key": key, "token": event.token }))
}

pub fn unpublish_definition() -> CommandDefinition {
    CommandDefinition {
        name: "unpublish".to_string(),
        description: Some("Remove an event (timeline entries are left in place)".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": { "key": { "type": "string" } },
            "required": ["key"]
        }),
    }
}

pub fn unpublish(args: Value, feed: &Chronofeed) -> CliResult<Value> {
    let params: KeyParams = parse_args(args)?;
    feed.unpublish(&params.key);
    Ok(json!({ "unpublished": params.key }))
}

pub fn fetch_definition() -> CommandDefinition {
    CommandDefinition {
        name: "fetch".to_string(),
        description: Some("Fetch one event with objects and subevents hydrated".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": { "key": { "type": "string" } },
            "required": ["key"]
        }),
    }
}

pub fn fetch(args: Value, feed: &Chronofeed) -> CliResult<Value> {
    let params: KeyParams = parse_args(args)?;
    let event = feed.fetch(&params.key);
    Ok(json!({ "event": event }))
}

pub fn update_definition() -> CommandDefinition {
    let mut properties = event_schema();
    properties["update_timelines"] = json!({ "type": "boolean", "default": false });
    CommandDefinition {
        name: "update".to_string(),
        description: Some("Overwrite a stored event".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": properties,
            "required": ["key", "token"]
        }),
    }
}

pub fn update(args: Value, feed: &Chronofeed) -> CliResult<Value> {
    let params: UpdateParams = parse_args(args)?;
    feed.update(&params.event, params.update_timelines)?;
    Ok(json!({ "updated": params.event.key }))
}
