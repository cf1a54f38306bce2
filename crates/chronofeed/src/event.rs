//! Event shapes and the contract an event must satisfy to be published.
//!
//! Three shapes exist:
//! - [`Event`] is what a client builds and publishes (object *references*).
//! - [`StoredEvent`] is what the event store keeps. It is only ever built from
//!   a transport projection via [`StoredEvent::from_columns`], and it has no
//!   room for hydrated objects or subevents.
//! - [`HydratedEvent`] is what readers get back: objects resolved, subevents
//!   expanded.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Attributes, FeedError, FeedResult, HydratedObjects, ObjectRefs, Token};

/// Flat attribute projection of an event, used to move it into storage.
pub type Transport = Attributes;

/// Anything that can be published into the engine.
///
/// The projection must carry `key`, `token`, `data`, `timelines` and
/// `objects`. It is validated by [`StoredEvent::from_columns`] before the
/// engine mutates anything.
pub trait Publishable {
    /// Caller-assigned event key.
    fn key(&self) -> &str;

    /// Flat projection handed to the storage side.
    fn to_transport(&self) -> Transport;
}

/// Current UTC time in microseconds, the default ordering token.
pub fn now_token() -> Token {
    chrono::Utc::now().timestamp_micros()
}

/// A client-built event, ready to publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub key: String,
    pub token: Token,
    #[serde(default)]
    pub data: Attributes,
    #[serde(default)]
    pub timelines: Vec<String>,
    #[serde(default)]
    pub objects: ObjectRefs,
}

impl Event {
    /// Create an event stamped with the current time as its token.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            token: now_token(),
            data: Attributes::new(),
            timelines: Vec::new(),
            objects: ObjectRefs::new(),
        }
    }

    pub fn with_token(mut self, token: Token) -> Self {
        self.token = token;
        self
    }

    pub fn with_data(mut self, data: Attributes) -> Self {
        self.data = data;
        self
    }

    /// Set a single data attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(name.into(), value.into());
        self
    }

    pub fn with_timeline(mut self, timeline: impl Into<String>) -> Self {
        self.timelines.push(timeline.into());
        self
    }

    /// Reference objects under a role, appending to any keys already there.
    pub fn with_objects<I, S>(mut self, role: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.objects
            .entry(role.into())
            .or_default()
            .extend(keys.into_iter().map(Into::into));
        self
    }
}

impl Publishable for Event {
    fn key(&self) -> &str {
        &self.key
    }

    fn to_transport(&self) -> Transport {
        let mut columns = Transport::new();
        columns.insert("key".to_string(), Value::String(self.key.clone()));
        columns.insert("token".to_string(), Value::from(self.token));
        columns.insert("data".to_string(), Value::Object(self.data.clone()));
        columns.insert("timelines".to_string(), serde_json::json!(self.timelines));
        columns.insert("objects".to_string(), serde_json::json!(self.objects));
        columns
    }
}

/// The persisted form of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub key: String,
    pub token: Token,
    pub data: Attributes,
    pub timelines: Vec<String>,
    pub objects: ObjectRefs,
}

impl StoredEvent {
    /// Build a stored record from a transport projection.
    ///
    /// Fails with `InvalidArgument` when a required column is missing or has
    /// the wrong shape, or when the token is negative. Repeated object
    /// references within a role collapse to their first occurrence, so the
    /// stored refs match what a hydrated read hands back.
    pub fn from_columns(columns: Transport) -> FeedResult<Self> {
        let mut event: StoredEvent = serde_json::from_value(Value::Object(columns))
            .map_err(|e| FeedError::invalid(format!("event does not satisfy the contract: {e}")))?;
        event.validate()?;
        for keys in event.objects.values_mut() {
            let mut seen = HashSet::new();
            keys.retain(|k| seen.insert(k.clone()));
        }
        Ok(event)
    }

    pub(crate) fn validate(&self) -> FeedResult<()> {
        if self.key.is_empty() {
            return Err(FeedError::invalid("event key must not be empty"));
        }
        if self.token < 0 {
            return Err(FeedError::invalid(format!(
                "event token must be non-negative, got {}",
                self.token
            )));
        }
        Ok(())
    }
}

/// The client-facing view of an event, with objects and subevents resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydratedEvent {
    pub key: String,
    pub token: Token,
    #[serde(default)]
    pub data: Attributes,
    #[serde(default)]
    pub timelines: Vec<String>,
    #[serde(default)]
    pub objects: HydratedObjects,
    #[serde(default)]
    pub subevents: Vec<HydratedEvent>,
}

impl HydratedEvent {
    /// Build a client view from a flat attribute mapping (e.g. a JSON result
    /// read back from the command surface).
    pub fn from_attributes(attributes: Attributes) -> FeedResult<Self> {
        serde_json::from_value(Value::Object(attributes))
            .map_err(|e| FeedError::invalid(format!("not a hydrated event: {e}")))
    }

    /// Look up a resolved object by role and key.
    pub fn object(&self, role: &str, key: &str) -> Option<&Attributes> {
        self.objects.get(role)?.get(key)?.as_ref()
    }
}

/// A hydrated event can be written back with `update`; objects collapse to
/// their keys and subevents are dropped.
impl Publishable for HydratedEvent {
    fn key(&self) -> &str {
        &self.key
    }

    fn to_transport(&self) -> Transport {
        let refs: ObjectRefs = self
            .objects
            .iter()
            .map(|(role, resolved)| (role.clone(), resolved.keys().cloned().collect()))
            .collect();

        let mut columns = Transport::new();
        columns.insert("key".to_string(), Value::String(self.key.clone()));
        columns.insert("token".to_string(), Value::from(self.token));
        columns.insert("data".to_string(), Value::Object(self.data.clone()));
        columns.insert("timelines".to_string(), serde_json::json!(self.timelines));
        columns.insert("objects".to_string(), serde_json::json!(refs));
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transport_carries_contract_fields() {
        let event = Event::new("ev-1")
            .with_token(42)
            .with_attr("kind", "checkin")
            .with_timeline("user_1")
            .with_objects("user", ["user_1"]);

        let columns = event.to_transport();
        for field in ["key", "token", "data", "timelines", "objects"] {
            assert!(columns.contains_key(field), "missing {field}");
        }

        let stored = StoredEvent::from_columns(columns).unwrap();
        assert_eq!(stored.key, "ev-1");
        assert_eq!(stored.token, 42);
        assert_eq!(stored.objects["user"], vec!["user_1".to_string()]);
    }

    #[test]
    fn test_missing_column_is_invalid() {
        let mut columns = Event::new("ev-1").to_transport();
        columns.remove("timelines");
        let err = StoredEvent::from_columns(columns).unwrap_err();
        assert!(matches!(err, FeedError::InvalidArgument(_)));
    }

    #[test]
    fn test_wrong_shape_is_invalid() {
        let mut columns = Event::new("ev-1").to_transport();
        columns.insert("data".to_string(), json!("not a mapping"));
        assert!(StoredEvent::from_columns(columns).is_err());
    }

    #[test]
    fn test_negative_token_is_invalid() {
        let columns = Event::new("ev-1").with_token(-5).to_transport();
        assert!(StoredEvent::from_columns(columns).is_err());
    }

    #[test]
    fn test_new_event_is_time_stamped() {
        let before = now_token();
        let event = Event::new("ev-1");
        assert!(event.token >= before);
    }

    #[test]
    fn test_with_objects_appends() {
        let event = Event::new("ev-1")
            .with_objects("spot", ["a"])
            .with_objects("spot", ["b"]);
        assert_eq!(event.objects["spot"], vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_repeated_refs_collapse_in_order() {
        let columns = Event::new("ev-1")
            .with_token(1)
            .with_objects("spot", ["z", "a", "z", "m", "a"])
            .to_transport();
        let stored = StoredEvent::from_columns(columns).unwrap();
        assert_eq!(stored.objects["spot"], vec!["z", "a", "m"]);
    }

    #[test]
    fn test_hydrated_projection_keeps_reference_order() {
        let view = HydratedEvent::from_attributes(
            json!({
                "key": "ev-1",
                "token": 7,
                "objects": { "spot": { "z": null, "a": { "name": "Cafe" }, "m": null } }
            })
            .as_object()
            .cloned()
            .unwrap(),
        )
        .unwrap();

        let stored = StoredEvent::from_columns(view.to_transport()).unwrap();
        assert_eq!(stored.objects["spot"], vec!["z", "a", "m"]);
    }

    #[test]
    fn test_hydrated_projection_drops_resolved_data() {
        let view = HydratedEvent::from_attributes(
            json!({
                "key": "ev-1",
                "token": 7,
                "objects": { "user": { "user_1": { "name": "Ada" }, "user_2": null } },
                "subevents": [{ "key": "child", "token": 8 }]
            })
            .as_object()
            .cloned()
            .unwrap(),
        )
        .unwrap();

        assert_eq!(view.object("user", "user_1").unwrap()["name"], "Ada");
        assert!(view.object("user", "user_2").is_none());

        let stored = StoredEvent::from_columns(view.to_transport()).unwrap();
        assert_eq!(
            stored.objects["user"],
            vec!["user_1".to_string(), "user_2".to_string()]
        );
    }
}
