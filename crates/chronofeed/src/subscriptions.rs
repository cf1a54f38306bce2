//! Subscription registry: subscriber key → (timeline key → backlink).

use std::collections::{BTreeMap, HashMap};

/// Per-subscriber subscription entries.
///
/// At most one entry exists per `(subscriber, timeline)` pair. Reads never
/// create entries.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionRegistry {
    entries: HashMap<String, BTreeMap<String, Option<String>>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or overwrite the entry for `(subscriber, timeline)`.
    ///
    /// Returns the backlink previously stored for the pair, if the pair existed.
    pub fn subscribe(
        &mut self,
        subscriber: &str,
        timeline: &str,
        backlink: Option<&str>,
    ) -> Option<Option<String>> {
        self.entries
            .entry(subscriber.to_string())
            .or_default()
            .insert(timeline.to_string(), backlink.map(str::to_string))
    }

    /// Remove the entry for `(subscriber, timeline)`. Returns whether it existed.
    pub fn unsubscribe(&mut self, subscriber: &str, timeline: &str) -> bool {
        let Some(timelines) = self.entries.get_mut(subscriber) else {
            return false;
        };
        let removed = timelines.remove(timeline).is_some();
        if timelines.is_empty() {
            self.entries.remove(subscriber);
        }
        removed
    }

    /// Whether any entry of `subscriber` carries exactly `backlink`.
    pub fn connected(&self, subscriber: &str, backlink: Option<&str>) -> bool {
        self.entries
            .get(subscriber)
            .is_some_and(|timelines| timelines.values().any(|b| b.as_deref() == backlink))
    }

    /// The `(timeline, backlink)` entries held by `subscriber`, in timeline order.
    pub fn subscriptions(&self, subscriber: &str) -> Vec<(String, Option<String>)> {
        self.entries
            .get(subscriber)
            .map(|timelines| {
                timelines
                    .iter()
                    .map(|(t, b)| (t.clone(), b.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Timelines registered under the subscriber key `key`.
    ///
    /// These are the extra fanout targets for an event declared on timeline `key`.
    pub fn subscribers_of<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .get(key)
            .into_iter()
            .flat_map(|timelines| timelines.keys().map(String::as_str))
    }

    /// Total number of entries across all subscribers.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
