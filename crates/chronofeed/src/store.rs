//! Event store and timeline index.

use std::collections::{BTreeMap, HashMap};

use crate::event::StoredEvent;
use crate::types::Token;

/// Published events keyed by event key.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: HashMap<String, StoredEvent>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record under its own key.
    pub fn put(&mut self, event: StoredEvent) -> Option<StoredEvent> {
        self.events.insert(event.key.clone(), event)
    }

    pub fn remove(&mut self, key: &str) -> Option<StoredEvent> {
        self.events.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&StoredEvent> {
        self.events.get(key)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Per-timeline ordered index: timeline key → (token → event key).
///
/// Tokens are unique per timeline. Writing an existing token replaces the
/// earlier event key.
#[derive(Debug, Clone, Default)]
pub struct TimelineIndex {
    timelines: HashMap<String, BTreeMap<Token, String>>,
}

impl TimelineIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// File `event_key` at `token` in `timeline`. Returns the key it displaced.
    pub fn insert(&mut self, timeline: &str, token: Token, event_key: &str) -> Option<String> {
        self.timelines
            .entry(timeline.to_string())
            .or_default()
            .insert(token, event_key.to_string())
    }

    /// Remove the entry at `token`. Empty timelines are dropped.
    pub fn remove(&mut self, timeline: &str, token: Token) -> Option<String> {
        let entries = self.timelines.get_mut(timeline)?;
        let removed = entries.remove(&token);
        if entries.is_empty() {
            self.timelines.remove(timeline);
        }
        removed
    }

    /// Entries of `timeline` in ascending token order. Unknown timelines are empty.
    pub fn entries(&self, timeline: &str) -> Vec<(Token, String)> {
        self.timelines
            .get(timeline)
            .map(|entries| entries.iter().map(|(t, k)| (*t, k.clone())).collect())
            .unwrap_or_default()
    }

    pub fn get(&self, timeline: &str, token: Token) -> Option<&str> {
        self.timelines.get(timeline)?.get(&token).map(String::as_str)
    }

    /// Number of entries in `timeline`.
    pub fn count(&self, timeline: &str) -> usize {
        self.timelines.get(timeline).map_or(0, BTreeMap::len)
    }

    /// Timeline keys that currently hold at least one entry, sorted.
    pub fn timeline_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.timelines.keys().cloned().collect();
        keys.sort();
        keys
    }
}
