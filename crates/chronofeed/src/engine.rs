//! The timeline engine: one instance owns every store.

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;

use crate::config::FeedConfig;
use crate::event::{HydratedEvent, Publishable, StoredEvent};
use crate::fanout::fanout;
use crate::hydrate::Hydrator;
use crate::objects::ObjectStore;
use crate::paginate::{select_page, PageRequest, TimelinePage, FIRST_PAGE};
use crate::propagation::{DeferredPropagation, Propagation, PropagationContext};
use crate::store::{EventStore, TimelineIndex};
use crate::subscriptions::SubscriptionRegistry;
use crate::types::{Attributes, FeedResult, Token};

/// Fanout-on-write timeline engine.
///
/// Each store sits behind its own lock. When more than one is needed they
/// are taken in the order subscriptions → events → index; objects are only
/// ever read alongside the others.
pub struct Chronofeed {
    config: FeedConfig,
    objects: RwLock<ObjectStore>,
    subscriptions: RwLock<SubscriptionRegistry>,
    events: RwLock<EventStore>,
    index: RwLock<TimelineIndex>,
    propagation: Box<dyn Propagation>,
}

/// Store sizes, for status output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedStats {
    pub objects: usize,
    pub events: usize,
    pub subscriptions: usize,
    pub timelines: usize,
}

impl Default for Chronofeed {
    fn default() -> Self {
        Self::new(FeedConfig::default())
    }
}

impl Chronofeed {
    pub fn new(config: FeedConfig) -> Self {
        Self {
            config,
            objects: RwLock::new(ObjectStore::new()),
            subscriptions: RwLock::new(SubscriptionRegistry::new()),
            events: RwLock::new(EventStore::new()),
            index: RwLock::new(TimelineIndex::new()),
            propagation: Box::new(DeferredPropagation),
        }
    }

    /// Replace the propagation hooks.
    pub fn with_propagation(mut self, propagation: impl Propagation + 'static) -> Self {
        self.propagation = Box::new(propagation);
        self
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// First-page request using the configured page size.
    pub fn first_page(&self) -> PageRequest {
        PageRequest {
            per_page: self.config.default_per_page,
            page: FIRST_PAGE,
        }
    }

    // ── objects ──────────────────────────────────────────────

    /// Store object data. Fails with `InvalidArgument` unless `data` is a mapping.
    pub fn record(&self, key: &str, data: Value) -> FeedResult<()> {
        self.objects.write().record(key, data).inspect_err(|e| {
            tracing::warn!("Rejected record of {key}: {e}");
        })
    }

    pub fn unrecord(&self, key: &str) {
        if self.objects.write().unrecord(key) {
            tracing::debug!("Unrecorded object {key}");
        }
    }

    pub fn object(&self, key: &str) -> Option<Attributes> {
        self.objects.read().get(key).cloned()
    }

    // ── subscriptions ────────────────────────────────────────

    /// Register `timeline` under `subscriber`, overwriting any earlier backlink.
    pub fn subscribe(
        &self,
        subscriber: &str,
        timeline: &str,
        backlink: Option<&str>,
        backfill: bool,
    ) {
        let mut subscriptions = self.subscriptions.write();
        subscriptions.subscribe(subscriber, timeline, backlink);
        tracing::info!("Subscribed {subscriber} -> {timeline}");

        if backfill {
            let mut index = self.index.write();
            self.propagation.backfill(
                subscriber,
                timeline,
                PropagationContext {
                    index: &mut index,
                    subscriptions: &subscriptions,
                },
            );
        }
    }

    /// Drop the `(subscriber, timeline)` entry. Entries already fanned out stay.
    pub fn unsubscribe(&self, subscriber: &str, timeline: &str) {
        let mut subscriptions = self.subscriptions.write();
        if !subscriptions.unsubscribe(subscriber, timeline) {
            return;
        }
        tracing::info!("Unsubscribed {subscriber} -> {timeline}");

        let mut index = self.index.write();
        self.propagation.unfill(
            subscriber,
            timeline,
            PropagationContext {
                index: &mut index,
                subscriptions: &subscriptions,
            },
        );
    }

    pub fn connected(&self, subscriber: &str, backlink: Option<&str>) -> bool {
        self.subscriptions.read().connected(subscriber, backlink)
    }

    pub fn subscriptions(&self, subscriber: &str) -> Vec<(String, Option<String>)> {
        self.subscriptions.read().subscriptions(subscriber)
    }

    // ── events ───────────────────────────────────────────────

    /// Store an event and fan it out. Returns the event key.
    ///
    /// The event is validated through its transport projection before
    /// anything is written.
    pub fn publish<E: Publishable + ?Sized>(&self, event: &E) -> FeedResult<String> {
        let stored = self.validate(event)?;
        let key = stored.key.clone();

        let subscriptions = self.subscriptions.read();
        let mut events = self.events.write();
        let mut index = self.index.write();

        let written = fanout(&stored, &subscriptions, &mut index);
        events.put(stored);

        tracing::info!("Published {key} into {} timeline(s)", written.len());
        Ok(key)
    }

    /// Remove an event from the store. Index entries are left to the
    /// propagation hooks.
    pub fn unpublish(&self, key: &str) {
        let subscriptions = self.subscriptions.read();
        let Some(removed) = self.events.write().remove(key) else {
            return;
        };
        tracing::info!("Unpublished {key}");

        let mut index = self.index.write();
        self.propagation.unfanout(
            &removed,
            PropagationContext {
                index: &mut index,
                subscriptions: &subscriptions,
            },
        );
    }

    /// Fetch an event with objects and subevents hydrated.
    pub fn fetch(&self, key: &str) -> Option<HydratedEvent> {
        let events = self.events.read();
        let index = self.index.read();
        let objects = self.objects.read();
        Hydrator::new(&events, &index, &objects, self.config.max_subevent_depth).fetch(key)
    }

    /// Overwrite the stored record for `event.key()`.
    ///
    /// The timeline index is only touched through the reindex hook, and only
    /// when `update_timelines` is set.
    pub fn update<E: Publishable + ?Sized>(
        &self,
        event: &E,
        update_timelines: bool,
    ) -> FeedResult<()> {
        let stored = self.validate(event)?;

        let subscriptions = self.subscriptions.read();
        let mut events = self.events.write();
        let previous = events.put(stored.clone());
        tracing::debug!("Updated {}", stored.key);

        if update_timelines {
            let mut index = self.index.write();
            self.propagation.reindex(
                previous.as_ref(),
                &stored,
                PropagationContext {
                    index: &mut index,
                    subscriptions: &subscriptions,
                },
            );
        }
        Ok(())
    }

    // ── timelines ────────────────────────────────────────────

    /// Read one page of a timeline.
    ///
    /// Index entries whose event has been unpublished are dropped from
    /// `items` but still counted.
    pub fn timeline(&self, key: &str, request: PageRequest) -> TimelinePage {
        let events = self.events.read();
        let index = self.index.read();
        let objects = self.objects.read();

        let slice = select_page(&index.entries(key), request);
        let hydrator = Hydrator::new(&events, &index, &objects, self.config.max_subevent_depth);
        let items = slice
            .event_keys
            .iter()
            .filter_map(|k| hydrator.fetch(k))
            .collect();

        TimelinePage {
            items,
            count: slice.count,
            next_page: slice.next_page,
        }
    }

    /// Raw `(token, event key)` entries of a timeline, oldest first.
    pub fn timeline_entries(&self, key: &str) -> Vec<(Token, String)> {
        self.index.read().entries(key)
    }

    pub fn stats(&self) -> FeedStats {
        let subscriptions = self.subscriptions.read();
        let events = self.events.read();
        let index = self.index.read();
        let objects = self.objects.read();
        FeedStats {
            objects: objects.len(),
            events: events.len(),
            subscriptions: subscriptions.len(),
            timelines: index.timeline_keys().len(),
        }
    }

    fn validate<E: Publishable + ?Sized>(&self, event: &E) -> FeedResult<StoredEvent> {
        let mut stored = StoredEvent::from_columns(event.to_transport()).inspect_err(|e| {
            tracing::warn!("Rejected event {}: {e}", event.key());
        })?;
        stored.key = event.key().to_string();
        stored.validate()?;
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::types::FeedError;
    use serde_json::json;

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Chronofeed>();
    }

    #[test]
    fn test_publish_validates_before_writing() {
        let feed = Chronofeed::default();
        let err = feed
            .publish(&Event::new("bad").with_token(-1).with_timeline("t"))
            .unwrap_err();
        assert!(matches!(err, FeedError::InvalidArgument(_)));
        assert_eq!(feed.stats().events, 0);
        assert!(feed.timeline_entries("t").is_empty());
    }

    #[test]
    fn test_empty_key_rejected() {
        let feed = Chronofeed::default();
        assert!(feed.publish(&Event::new("").with_token(1)).is_err());
    }

    #[test]
    fn test_first_page_uses_config() {
        let feed = Chronofeed::new(FeedConfig {
            default_per_page: 3,
            max_subevent_depth: 8,
        });
        assert_eq!(feed.first_page(), PageRequest::new(3));
    }

    #[test]
    fn test_stats() {
        let feed = Chronofeed::default();
        feed.record("o", json!({})).unwrap();
        feed.subscribe("s", "t", None, false);
        feed.publish(&Event::new("e").with_token(1).with_timeline("t"))
            .unwrap();
        assert_eq!(
            feed.stats(),
            FeedStats {
                objects: 1,
                events: 1,
                subscriptions: 1,
                timelines: 1,
            }
        );
    }
}
