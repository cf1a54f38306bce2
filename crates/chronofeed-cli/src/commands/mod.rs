//! Commands that drive the engine: definitions and dispatch.

pub mod events;
pub mod objects;
pub mod registry;
pub mod subscriptions;
pub mod timelines;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CliError, CliResult};

pub use registry::CommandRegistry;

/// Name, help text, and argument schema of a command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Deserialize command arguments, reporting failures as invalid params.
pub(crate) fn parse_args<T: serde::de::DeserializeOwned>(args: Value) -> CliResult<T> {
    serde_json::from_value(args).map_err(|e| CliError::InvalidParams(e.to_string()))
}
