//! Hooks for index maintenance the engine does not perform itself.
//!
//! Subscribing does not backfill, unsubscribing does not unfill, unpublishing
//! does not retract fanned-out entries, and updating does not reindex. Each
//! of those steps is routed through a [`Propagation`] hook. The default,
//! [`DeferredPropagation`], leaves the index untouched, so stale entries are
//! expected and readers skip index entries whose event no longer exists.

use crate::event::StoredEvent;
use crate::store::TimelineIndex;
use crate::subscriptions::SubscriptionRegistry;

/// Mutable view handed to propagation hooks while the engine holds its locks.
pub struct PropagationContext<'a> {
    pub index: &'a mut TimelineIndex,
    pub subscriptions: &'a SubscriptionRegistry,
}

/// Pluggable index maintenance. Every method defaults to a no-op.
///
/// Hooks run while the engine holds its write locks. An implementation must
/// only work through the [`PropagationContext`] it is given; calling back
/// into the owning [`crate::Chronofeed`] deadlocks.
pub trait Propagation: Send + Sync {
    /// Called after `subscriber` subscribes to `timeline` with backfill requested.
    fn backfill(&self, subscriber: &str, timeline: &str, _ctx: PropagationContext<'_>) {
        tracing::debug!("Backfill of {subscriber} from {timeline} deferred");
    }

    /// Called after `subscriber` unsubscribes from `timeline`.
    fn unfill(&self, subscriber: &str, timeline: &str, _ctx: PropagationContext<'_>) {
        tracing::debug!("Unfill of {subscriber} from {timeline} deferred");
    }

    /// Called after `event` was removed from the event store.
    fn unfanout(&self, event: &StoredEvent, _ctx: PropagationContext<'_>) {
        tracing::debug!(
            "Unfanout of {} from {} declared timeline(s) deferred",
            event.key,
            event.timelines.len()
        );
    }

    /// Called after `event` replaced `previous` with timeline updates requested.
    fn reindex(
        &self,
        _previous: Option<&StoredEvent>,
        event: &StoredEvent,
        _ctx: PropagationContext<'_>,
    ) {
        tracing::debug!("Timeline reindex for {} deferred", event.key);
    }
}

/// Leaves every propagation step undone.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeferredPropagation;

impl Propagation for DeferredPropagation {}
