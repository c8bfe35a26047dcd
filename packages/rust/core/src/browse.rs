//! Paginated list browsing with a stale-response guard.
//!
//! Rapid page/filter changes can complete out of order on the wire. Every
//! issued request captures a generation token; a response is applied only
//! while its token is still the latest, so an older response can never
//! overwrite newer state.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use quotelane_client::PostQuery;
use quotelane_shared::{Paginated, PostSummary};

use crate::pagination::Pagination;

// ---------------------------------------------------------------------------
// RequestGuard
// ---------------------------------------------------------------------------

/// Monotonic generation counter for in-flight list requests.
#[derive(Debug, Default)]
pub struct RequestGuard {
    generation: AtomicU64,
}

impl RequestGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request; invalidates every earlier token.
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// True while no newer request has been started.
    pub fn is_current(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == token
    }
}

// ---------------------------------------------------------------------------
// ListBrowser
// ---------------------------------------------------------------------------

/// View-local state for the paginated, filterable post list.
#[derive(Debug, Default)]
pub struct ListBrowser {
    /// Current pagination state.
    pub pagination: Pagination,
    /// Active category-name filter.
    pub category: Option<String>,
    /// Active search term.
    pub search: Option<String>,
    guard: RequestGuard,
    results: Vec<PostSummary>,
}

impl ListBrowser {
    pub fn new(page_size: usize) -> Self {
        Self {
            pagination: Pagination::new(page_size),
            ..Self::default()
        }
    }

    /// Request a (clamped) page. Returns the token to pass to [`Self::apply`]
    /// and the query to send.
    pub fn request_page(&mut self, requested: usize) -> (u64, PostQuery) {
        self.pagination.set_page(requested);
        (self.guard.begin(), self.build_query())
    }

    /// Change the category filter; resets to page 1.
    pub fn set_category(&mut self, category: Option<String>) -> (u64, PostQuery) {
        self.category = category;
        self.pagination.reset();
        (self.guard.begin(), self.build_query())
    }

    /// Change the search term; resets to page 1.
    pub fn set_search(&mut self, search: Option<String>) -> (u64, PostQuery) {
        self.search = search.filter(|s| !s.trim().is_empty());
        self.pagination.reset();
        (self.guard.begin(), self.build_query())
    }

    /// Apply a response if its token is still current.
    ///
    /// Returns `false` (and changes nothing) for stale responses.
    pub fn apply(&mut self, token: u64, page: Paginated<PostSummary>) -> bool {
        if !self.guard.is_current(token) {
            debug!(token, "dropping stale list response");
            return false;
        }
        self.pagination.set_total_count(page.count);
        self.results = page.results;
        true
    }

    /// The most recently applied page of results.
    pub fn results(&self) -> &[PostSummary] {
        &self.results
    }

    fn build_query(&self) -> PostQuery {
        PostQuery {
            limit: Some(self.pagination.page_size as u32),
            offset: Some(self.pagination.offset() as u32),
            category: None,
            category_name: self.category.clone(),
            search: self.search.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Search filtering
// ---------------------------------------------------------------------------

/// Case-insensitive substring filter over title and summary, for narrowing
/// an already-fetched page of results without another round trip.
pub fn filter_by_term<'a>(posts: &'a [PostSummary], term: &str) -> Vec<&'a PostSummary> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return posts.iter().collect();
    }
    posts
        .iter()
        .filter(|p| {
            p.title.to_lowercase().contains(&term) || p.summary.to_lowercase().contains(&term)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
