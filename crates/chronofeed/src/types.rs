//! Shared aliases and error types for the timeline engine.

use std::collections::BTreeMap;

use indexmap::IndexMap;

/// Attribute mapping carried by objects and events.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Ordering value for a timeline entry. Always non-negative once validated.
pub type Token = i64;

/// Role name → referenced object keys, as published.
pub type ObjectRefs = BTreeMap<String, Vec<String>>;

/// Role name → (object key → object data), as read back. Object keys keep
/// the order they were published in.
///
/// Keys missing from the object store map to `None`.
pub type HydratedObjects = BTreeMap<String, IndexMap<String, Option<Attributes>>>;

/// Errors that can occur in the timeline engine.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl FeedError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        FeedError::InvalidArgument(message.into())
    }
}

/// Convenience result type.
pub type FeedResult<T> = Result<T, FeedError>;
