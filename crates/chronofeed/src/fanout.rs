//! Fanout-on-write: filing a published event into its timelines.

use crate::event::StoredEvent;
use crate::store::TimelineIndex;
use crate::subscriptions::SubscriptionRegistry;

/// Write `event` into every declared timeline and into each timeline
/// registered under a declared timeline's key.
///
/// Exactly one level of indirection: a subscriber of a subscriber is reached
/// only if its own key is itself declared on the event. Returns the timelines
/// written, in write order.
pub fn fanout(
    event: &StoredEvent,
    subscriptions: &SubscriptionRegistry,
    index: &mut TimelineIndex,
) -> Vec<String> {
    let mut written = Vec::new();

    for timeline in &event.timelines {
        index.insert(timeline, event.token, &event.key);
        written.push(timeline.clone());

        for target in subscriptions.subscribers_of(timeline) {
            index.insert(target, event.token, &event.key);
            written.push(target.to_string());
        }
    }

    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Attributes;

    fn event(key: &str, token: i64, timelines: &[&str]) -> StoredEvent {
        StoredEvent {
            key: key.to_string(),
            token,
            data: Attributes::new(),
            timelines: timelines.iter().map(|t| t.to_string()).collect(),
            objects: Default::default(),
        }
    }

    #[test]
    fn test_declared_timelines_only() {
        let registry = SubscriptionRegistry::new();
        let mut index = TimelineIndex::new();

        let written = fanout(&event("e1", 1, &["a", "b"]), &registry, &mut index);
        assert_eq!(written, vec!["a", "b"]);
        assert_eq!(index.get("a", 1), Some("e1"));
        assert_eq!(index.get("b", 1), Some("e1"));
    }

    #[test]
    fn test_subscriber_timelines_receive_copy() {
        let mut registry = SubscriptionRegistry::new();
        registry.subscribe("user_1", "user_2_home", Some("user_1"));
        registry.subscribe("user_1", "user_3_home", None);
        let mut index = TimelineIndex::new();

        let written = fanout(&event("e1", 7, &["user_1"]), &registry, &mut index);
        assert_eq!(written, vec!["user_1", "user_2_home", "user_3_home"]);
        assert_eq!(index.get("user_2_home", 7), Some("e1"));
        assert_eq!(index.get("user_3_home", 7), Some("e1"));
    }

    #[test]
    fn test_single_level_of_indirection() {
        let mut registry = SubscriptionRegistry::new();
        registry.subscribe("a", "b", None);
        registry.subscribe("b", "c", None);
        let mut index = TimelineIndex::new();

        fanout(&event("e1", 1, &["a"]), &registry, &mut index);
        assert_eq!(index.get("b", 1), Some("e1"));
        assert_eq!(index.count("c"), 0);
    }

    #[test]
    fn test_no_timelines_writes_nothing() {
        let registry = SubscriptionRegistry::new();
        let mut index = TimelineIndex::new();
        assert!(fanout(&event("e1", 1, &[]), &registry, &mut index).is_empty());
        assert!(index.timeline_keys().is_empty());
    }
}
