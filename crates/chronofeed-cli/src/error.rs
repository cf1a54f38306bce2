//! Error types and numeric codes for the command surface.

/// Stable error codes reported alongside command failures.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const UNKNOWN_COMMAND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    pub const INVALID_ARGUMENT: i32 = -32850;
    pub const CONFIG_ERROR: i32 = -32851;
}

/// All errors that can occur while driving the engine from the CLI.
#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Feed error: {0}")]
    Feed(#[from] chronofeed::FeedError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn code(&self) -> i32 {
        use error_codes::*;
        match self {
            CliError::ParseError(_) | CliError::Json(_) => PARSE_ERROR,
            CliError::UnknownCommand(_) => UNKNOWN_COMMAND,
            CliError::InvalidParams(_) => INVALID_PARAMS,
            CliError::Feed(chronofeed::FeedError::InvalidArgument(_)) => INVALID_ARGUMENT,
            CliError::Feed(chronofeed::FeedError::Config(_)) => CONFIG_ERROR,
            CliError::Io(_) => INTERNAL_ERROR,
        }
    }

    /// JSON form written to script output.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        })
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_errors_keep_their_kind() {
        let err: CliError = chronofeed::FeedError::InvalidArgument("x".into()).into();
        assert_eq!(err.code(), error_codes::INVALID_ARGUMENT);

        let err: CliError = chronofeed::FeedError::Config("y".into()).into();
        assert_eq!(err.code(), error_codes::CONFIG_ERROR);
    }

    #[test]
    fn test_json_shape() {
        let value = CliError::UnknownCommand("frobnicate".into()).to_json();
        assert_eq!(value["error"]["code"], -32601);
        assert_eq!(value["error"]["message"], "Unknown command: frobnicate");
    }
}
