//! Read-side expansion of stored events into client views.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::config::SUBEVENT_DEPTH_CEILING;
use crate::event::{HydratedEvent, StoredEvent};
use crate::objects::ObjectStore;
use crate::store::{EventStore, TimelineIndex};
use crate::types::HydratedObjects;

/// Borrowed view over the stores needed to hydrate events.
///
/// Hydration never writes back: every view is built from a copy of the
/// stored record. Recursion stops at `max_depth` levels of subevents, and
/// never goes past [`SUBEVENT_DEPTH_CEILING`].
pub struct Hydrator<'a> {
    events: &'a EventStore,
    index: &'a TimelineIndex,
    objects: &'a ObjectStore,
    max_depth: usize,
}

impl<'a> Hydrator<'a> {
    pub fn new(
        events: &'a EventStore,
        index: &'a TimelineIndex,
        objects: &'a ObjectStore,
        max_depth: usize,
    ) -> Self {
        Self {
            events,
            index,
            objects,
            max_depth: max_depth.min(SUBEVENT_DEPTH_CEILING),
        }
    }

    /// Fetch and fully hydrate an event, or `None` if it is not stored.
    pub fn fetch(&self, key: &str) -> Option<HydratedEvent> {
        let mut ancestors = HashSet::new();
        self.fetch_guarded(key, &mut ancestors, 0)
    }

    fn fetch_guarded(
        &self,
        key: &str,
        ancestors: &mut HashSet<String>,
        depth: usize,
    ) -> Option<HydratedEvent> {
        let stored = self.events.get(key)?;

        ancestors.insert(stored.key.clone());
        let subevents = self.populate_subevents_for(stored, ancestors, depth);
        ancestors.remove(&stored.key);

        Some(HydratedEvent {
            key: stored.key.clone(),
            token: stored.token,
            data: stored.data.clone(),
            timelines: stored.timelines.clone(),
            objects: self.populate_objects_for(stored),
            subevents,
        })
    }

    /// Resolve every referenced object key, keeping the published order.
    /// Unknown keys map to `None`.
    pub fn populate_objects_for(&self, event: &StoredEvent) -> HydratedObjects {
        event
            .objects
            .iter()
            .map(|(role, keys)| {
                let resolved: IndexMap<_, _> = keys
                    .iter()
                    .map(|k| (k.clone(), self.objects.get(k).cloned()))
                    .collect();
                (role.clone(), resolved)
            })
            .collect()
    }

    /// Children are the events filed in the timeline named after the event's
    /// own key, in ascending token order.
    fn populate_subevents_for(
        &self,
        event: &StoredEvent,
        ancestors: &mut HashSet<String>,
        depth: usize,
    ) -> Vec<HydratedEvent> {
        if depth >= self.max_depth {
            return Vec::new();
        }

        let mut subevents = Vec::new();
        for (_, child) in self.index.entries(&event.key) {
            if ancestors.contains(&child) {
                tracing::debug!("Skipping subevent {child} of {}: cycle", event.key);
                continue;
            }
            match self.fetch_guarded(&child, ancestors, depth + 1) {
                Some(sub) => subevents.push(sub),
                None => tracing::debug!("Skipping stale subevent {child} of {}", event.key),
            }
        }
        subevents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_SUBEVENT_DEPTH;
    use crate::types::{Attributes, ObjectRefs};
    use serde_json::json;

    struct Fixture {
        events: EventStore,
        index: TimelineIndex,
        objects: ObjectStore,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                events: EventStore::new(),
                index: TimelineIndex::new(),
                objects: ObjectStore::new(),
            }
        }

        fn event(&mut self, key: &str, token: i64, parent: Option<&str>) {
            self.events.put(StoredEvent {
                key: key.to_string(),
                token,
                data: Attributes::new(),
                timelines: parent.into_iter().map(str::to_string).collect(),
                objects: ObjectRefs::new(),
            });
            if let Some(parent) = parent {
                self.index.insert(parent, token, key);
            }
        }

        fn hydrator(&self, max_depth: usize) -> Hydrator<'_> {
            Hydrator::new(&self.events, &self.index, &self.objects, max_depth)
        }

        fn default_hydrator(&self) -> Hydrator<'_> {
            self.hydrator(DEFAULT_MAX_SUBEVENT_DEPTH)
        }
    }

    #[test]
    fn test_missing_event() {
        let fx = Fixture::new();
        assert!(fx.default_hydrator().fetch("nope").is_none());
    }

    #[test]
    fn test_leaf_has_no_subevents() {
        let mut fx = Fixture::new();
        fx.event("leaf", 1, None);
        let view = fx.default_hydrator().fetch("leaf").unwrap();
        assert!(view.subevents.is_empty());
    }

    #[test]
    fn test_nested_subevents() {
        let mut fx = Fixture::new();
        fx.event("root", 1, None);
        fx.event("child_b", 3, Some("root"));
        fx.event("child_a", 2, Some("root"));
        fx.event("grandchild", 4, Some("child_a"));

        let view = fx.default_hydrator().fetch("root").unwrap();
        let keys: Vec<&str> = view.subevents.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["child_a", "child_b"]);
        assert_eq!(view.subevents[0].subevents[0].key, "grandchild");
    }

    #[test]
    fn test_self_cycle_is_cut() {
        let mut fx = Fixture::new();
        fx.event("loop", 1, None);
        fx.index.insert("loop", 1, "loop");

        let view = fx.default_hydrator().fetch("loop").unwrap();
        assert!(view.subevents.is_empty());
    }

    #[test]
    fn test_longer_cycle_is_cut() {
        let mut fx = Fixture::new();
        fx.event("a", 1, None);
        fx.event("b", 2, Some("a"));
        fx.index.insert("b", 3, "a");

        let view = fx.default_hydrator().fetch("a").unwrap();
        assert_eq!(view.subevents.len(), 1);
        assert_eq!(view.subevents[0].key, "b");
        assert!(view.subevents[0].subevents.is_empty());
    }

    #[test]
    fn test_shared_child_is_not_a_cycle() {
        let mut fx = Fixture::new();
        fx.event("root", 1, None);
        fx.event("x", 2, Some("root"));
        fx.event("y", 3, Some("root"));
        fx.event("shared", 4, Some("x"));
        fx.index.insert("y", 5, "shared");

        let view = fx.default_hydrator().fetch("root").unwrap();
        assert_eq!(view.subevents[0].subevents[0].key, "shared");
        assert_eq!(view.subevents[1].subevents[0].key, "shared");
    }

    #[test]
    fn test_stale_child_skipped() {
        let mut fx = Fixture::new();
        fx.event("root", 1, None);
        fx.index.insert("root", 2, "gone");
        let view = fx.default_hydrator().fetch("root").unwrap();
        assert!(view.subevents.is_empty());
    }

    #[test]
    fn test_depth_limit() {
        let mut fx = Fixture::new();
        fx.event("root", 1, None);
        fx.event("child", 2, Some("root"));
        fx.event("grandchild", 3, Some("child"));

        let view = fx.hydrator(1).fetch("root").unwrap();
        assert_eq!(view.subevents.len(), 1);
        assert!(view.subevents[0].subevents.is_empty());

        let flat = fx.hydrator(0).fetch("root").unwrap();
        assert!(flat.subevents.is_empty());
    }

    #[test]
    fn test_objects_resolved_and_missing_is_none() {
        let mut fx = Fixture::new();
        fx.objects.record("user_1", json!({"name": "Ada"})).unwrap();

        let mut objects = ObjectRefs::new();
        objects.insert(
            "user".to_string(),
            vec!["user_1".to_string(), "ghost".to_string()],
        );
        let stored = StoredEvent {
            key: "e".to_string(),
            token: 1,
            data: Attributes::new(),
            timelines: Vec::new(),
            objects,
        };

        let resolved = fx.default_hydrator().populate_objects_for(&stored);
        assert_eq!(resolved["user"]["user_1"].as_ref().unwrap()["name"], "Ada");
        assert!(resolved["user"]["ghost"].is_none());
    }

    #[test]
    fn test_objects_keep_published_order() {
        let fx = Fixture::new();
        let mut objects = ObjectRefs::new();
        objects.insert(
            "spot".to_string(),
            vec!["z".to_string(), "a".to_string(), "m".to_string()],
        );
        let stored = StoredEvent {
            key: "e".to_string(),
            token: 1,
            data: Attributes::new(),
            timelines: Vec::new(),
            objects,
        };

        let resolved = fx.default_hydrator().populate_objects_for(&stored);
        let keys: Vec<&str> = resolved["spot"].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_deep_chain_stops_at_limit() {
        let mut fx = Fixture::new();
        fx.event("n0", 0, None);
        for i in 1..5_000i64 {
            let parent = format!("n{}", i - 1);
            fx.event(&format!("n{i}"), i, Some(parent.as_str()));
        }

        let view = fx.default_hydrator().fetch("n0").unwrap();
        let mut depth = 0;
        let mut node = &view;
        while let Some(child) = node.subevents.first() {
            depth += 1;
            node = child;
        }
        assert_eq!(depth, DEFAULT_MAX_SUBEVENT_DEPTH);
        assert_eq!(node.key, format!("n{DEFAULT_MAX_SUBEVENT_DEPTH}"));
    }

    #[test]
    fn test_oversized_limit_is_clamped() {
        let mut fx = Fixture::new();
        fx.event("n0", 0, None);
        for i in 1..2_000i64 {
            let parent = format!("n{}", i - 1);
            fx.event(&format!("n{i}"), i, Some(parent.as_str()));
        }

        let view = fx.hydrator(usize::MAX).fetch("n0").unwrap();
        let mut depth = 0;
        let mut node = &view;
        while let Some(child) = node.subevents.first() {
            depth += 1;
            node = child;
        }
        assert_eq!(depth, SUBEVENT_DEPTH_CEILING);
    }
}
