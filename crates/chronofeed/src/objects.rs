//! Object store: arbitrary attribute mappings referenced by events.

use std::collections::HashMap;

use serde_json::Value;

use crate::types::{Attributes, FeedError, FeedResult};

/// In-memory container for recorded objects.
#[derive(Debug, Clone, Default)]
pub struct ObjectStore {
    objects: HashMap<String, Attributes>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` under `key`, replacing any previous value.
    ///
    /// `data` must be a JSON object.
    pub fn record(&mut self, key: &str, data: Value) -> FeedResult<()> {
        let Value::Object(data) = data else {
            return Err(FeedError::invalid(format!(
                "object data for '{key}' must be a mapping"
            )));
        };
        self.objects.insert(key.to_string(), data);
        Ok(())
    }

    /// Remove an object. Returns whether anything was removed.
    pub fn unrecord(&mut self, key: &str) -> bool {
        self.objects.remove(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Attributes> {
        self.objects.get(key)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
