//! CustomerFeed - drives [`FeedState`] with real fetches.
//!
//! The state sits behind a mutex that is only held to begin or resolve a
//! fetch, never across the network call. The loading guard inside the state
//! is what keeps load-more single-flight. Nothing is cancelled: a fetch
//! applies its result whenever it resolves.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::api::CustomersApi;
use super::state::{FeedState, FetchTicket};

/// What happened to a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The fetch ran and its result (success or failure) was applied.
    Applied,
    /// The guard refused to start a fetch.
    Skipped,
}

/// Client-side incremental loader for the customer listing.
pub struct CustomerFeed<A> {
    api: A,
    state: Mutex<FeedState>,
}

impl<A: CustomersApi> CustomerFeed<A> {
    pub fn new(api: A, page_size: u32) -> Self {
        Self {
            api,
            state: Mutex::new(FeedState::new(page_size)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> FeedState {
        self.lock().clone()
    }

    pub fn set_search(&self, term: &str) {
        self.lock().set_search(term);
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    /// Mount or search change: fetch the first page and replace the list.
    pub async fn fetch_initial(&self, search_term: &str) -> FetchOutcome {
        let ticket = self.lock().begin_initial(search_term);
        self.run(ticket).await
    }

    /// Explicit "load more" action.
    pub async fn fetch_more(&self) -> FetchOutcome {
        let ticket = self.lock().begin_more();
        let Some(ticket) = ticket else {
            return FetchOutcome::Skipped;
        };
        self.run(ticket).await
    }

    /// The end-of-list sentinel scrolled into view.
    pub async fn sentinel_visible(&self) -> FetchOutcome {
        debug!("end-of-list sentinel visible");
        self.fetch_more().await
    }

    async fn run(&self, ticket: FetchTicket) -> FetchOutcome {
        debug!(kind = ?ticket.kind, cursor = ?ticket.params.cursor, "fetching customers");
        let outcome = self
            .api
            .get_customers(&ticket.params)
            .await
            .map_err(|e| e.to_string());

        self.lock().resolve(&ticket, outcome);
        FetchOutcome::Applied
    }
}
