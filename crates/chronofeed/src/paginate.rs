//! Cursor paging over a timeline's ordered index.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_PER_PAGE;
use crate::event::HydratedEvent;
use crate::types::Token;

/// Cursor value that admits every entry. Tokens are never negative.
pub const FIRST_PAGE: Token = -1;

/// Which slice of a timeline to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    pub per_page: usize,
    /// Only entries with `token >= page` are considered.
    pub page: Token,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            page: FIRST_PAGE,
        }
    }
}

impl PageRequest {
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page,
            page: FIRST_PAGE,
        }
    }

    /// Resume from a `next_page` cursor.
    pub fn from_cursor(mut self, page: Token) -> Self {
        self.page = page;
        self
    }
}

/// Event keys selected for one page, before hydration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSlice {
    pub event_keys: Vec<String>,
    /// Size of the whole timeline, ignoring the cursor.
    pub count: usize,
    pub next_page: Token,
}

/// A hydrated page of a timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePage {
    pub items: Vec<HydratedEvent>,
    pub count: usize,
    pub next_page: Token,
}

/// Select one page from `entries` (any order).
///
/// The cursor and the items come from opposite ends of the filtered range:
/// `next_page` is the oldest token among the newest `per_page` entries, while
/// the items are the oldest `per_page` entries. Callers that page forward
/// should be aware that the two do not line up.
///
/// When nothing survives the cursor filter, or `per_page` is zero, the page is
/// empty and `next_page` echoes the request cursor.
pub fn select_page(entries: &[(Token, String)], request: PageRequest) -> PageSlice {
    let mut ranked: Vec<&(Token, String)> = entries
        .iter()
        .filter(|(token, _)| *token >= request.page)
        .collect();
    ranked.sort_by_key(|(token, _)| *token);
    ranked.reverse();

    let next_page = ranked
        .iter()
        .take(request.per_page)
        .last()
        .map_or(request.page, |(token, _)| *token);

    let event_keys = ranked
        .iter()
        .rev()
        .take(request.per_page)
        .map(|(_, key)| key.clone())
        .collect();

    PageSlice {
        event_keys,
        count: entries.len(),
        next_page,
    }
}
