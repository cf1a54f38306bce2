//! Command registration and dispatch.

use serde_json::Value;

use chronofeed::Chronofeed;

use super::{events, objects, subscriptions, timelines, CommandDefinition};
use crate::error::{CliError, CliResult};

pub struct CommandRegistry;

impl CommandRegistry {
    pub fn list_commands() -> Vec<CommandDefinition> {
        vec![
            objects::record_definition(),
            objects::unrecord_definition(),
            subscriptions::subscribe_definition(),
            subscriptions::unsubscribe_definition(),
            subscriptions::connected_definition(),
            subscriptions::subscriptions_definition(),
            events::publish_definition(),
            events::unpublish_definition(),
            events::fetch_definition(),
            events::update_definition(),
            timelines::timeline_definition(),
            timelines::entries_definition(),
            timelines::stats_definition(),
        ]
    }

    pub fn call(name: &str, arguments: Option<Value>, feed: &Chronofeed) -> CliResult<Value> {
        let args = arguments.unwrap_or(Value::Object(serde_json::Map::new()));

        match name {
            "record" => objects::record(args, feed),
            "unrecord" => objects::unrecord(args, feed),
            "subscribe" => subscriptions::subscribe(args, feed),
            "unsubscribe" => subscriptions::unsubscribe(args, feed),
            "connected" => subscriptions::connected(args, feed),
            "subscriptions" => subscriptions::subscriptions(args, feed),
            "publish" => events::publish(args, feed),
            "unpublish" => events::unpublish(args, feed),
            "fetch" => events::fetch(args, feed),
            "update" => events::update(args, feed),
            "timeline" => timelines::timeline(args, feed),
            "entries" => timelines::entries(args, feed),
            "stats" => timelines::stats(args, feed),
            _ => Err(CliError::UnknownCommand(name.to_string())),
        }
    }

    /// Run a single command line of the form `{"op": "<name>", ...args}`.
    pub fn call_line(line: &str, feed: &Chronofeed) -> CliResult<Value> {
        let mut value: Value =
            serde_json::from_str(line).map_err(|e| CliError::ParseError(e.to_string()))?;
        let Some(object) = value.as_object_mut() else {
            return Err(CliError::ParseError("command must be a JSON object".to_string()));
        };
        let op = match object.remove("op") {
            Some(Value::String(op)) => op,
            Some(_) => return Err(CliError::InvalidParams("`op` must be a string".to_string())),
            None => return Err(CliError::InvalidParams("missing `op`".to_string())),
        };
        Self::call(&op, Some(value), feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_codes;

    #[test]
    fn test_every_listed_command_dispatches() {
        let feed = Chronofeed::default();
        for def in CommandRegistry::list_commands() {
            // Empty args must never hit the unknown-command arm.
            if let Err(e) = CommandRegistry::call(&def.name, None, &feed) {
                assert_ne!(e.code(), error_codes::UNKNOWN_COMMAND, "{}", def.name);
            }
        }
    }

    #[test]
    fn test_unknown_command() {
        let feed = Chronofeed::default();
        let err = CommandRegistry::call("frobnicate", None, &feed).unwrap_err();
        assert_eq!(err.code(), error_codes::UNKNOWN_COMMAND);
    }

    #[test]
    fn test_call_line_requires_op() {
        let feed = Chronofeed::default();
        assert_eq!(
            CommandRegistry::call_line(r#"{"key": "x"}"#, &feed)
                .unwrap_err()
                .code(),
            error_codes::INVALID_PARAMS
        );
        assert_eq!(
            CommandRegistry::call_line("[1, 2]", &feed).unwrap_err().code(),
            error_codes::PARSE_ERROR
        );
        assert_eq!(
            CommandRegistry::call_line(r#"{"op":"#, &feed)
                .unwrap_err()
                .code(),
            error_codes::PARSE_ERROR
        );
    }
}
