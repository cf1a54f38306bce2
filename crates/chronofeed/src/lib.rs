//! Chronofeed — fanout-on-write activity timelines with subscriptions, hydration, and cursor paging.

pub mod config;
pub mod engine;
pub mod event;
pub mod fanout;
pub mod hydrate;
pub mod objects;
pub mod paginate;
pub mod propagation;
pub mod store;
pub mod subscriptions;
pub mod types;

pub use config::{
    FeedConfig, DEFAULT_MAX_SUBEVENT_DEPTH, DEFAULT_PER_PAGE, SUBEVENT_DEPTH_CEILING,
};
pub use engine::{Chronofeed, FeedStats};
pub use event::{now_token, Event, HydratedEvent, Publishable, StoredEvent, Transport};
pub use paginate::{PageRequest, TimelinePage, FIRST_PAGE};
pub use propagation::{DeferredPropagation, Propagation, PropagationContext};
pub use types::*;
