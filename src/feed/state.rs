//! FeedState - the pure accumulation state machine behind the client.
//!
//! States run `Idle → Loading → {Succeeded, Failed}`; from `Succeeded` or
//! `Failed` any new fetch re-enters `Loading`. Beginning a fetch hands out a
//! [`FetchTicket`]; the caller performs the request and feeds the outcome
//! back through [`FeedState::resolve`].

use crate::customer::Customer;
use crate::query::{CustomersPage, DEFAULT_PAGE_SIZE};

/// Lifecycle of the most recent fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Which trigger started a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Mount or search change: replaces the list.
    Initial,
    /// Load-more: appends to the list.
    More,
}

/// Parameters of one `GET /customers` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchParams {
    pub page_size: u32,
    pub cursor: Option<String>,
    pub search_term: String,
}

/// Handle for a started fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub kind: FetchKind,
    pub params: FetchParams,
}

/// Accumulated client-side listing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedState {
    items: Vec<Customer>,
    page_size: u32,
    has_next: bool,
    cursor: Option<String>,
    search_term: String,
    status: FetchStatus,
    error: Option<String>,
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl FeedState {
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            page_size,
            has_next: false,
            cursor: None,
            search_term: String::new(),
            status: FetchStatus::Idle,
            error: None,
        }
    }

    pub fn items(&self) -> &[Customer] {
        &self.items
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    /// Whether a load-more may start right now.
    pub fn can_load_more(&self) -> bool {
        self.has_next && !self.is_loading()
    }

    /// Record the search term without fetching.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Drop accumulated results and return to `Idle`.
    pub fn reset(&mut self) {
        self.items.clear();
        self.cursor = None;
        self.has_next = false;
        self.status = FetchStatus::Idle;
        self.error = None;
    }

    /// Start an initial fetch for `search_term`. Always allowed.
    pub fn begin_initial(&mut self, search_term: impl Into<String>) -> FetchTicket {
        self.search_term = search_term.into();
        self.status = FetchStatus::Loading;
        self.error = None;
        FetchTicket {
            kind: FetchKind::Initial,
            params: FetchParams {
                page_size: self.page_size,
                cursor: None,
                search_term: self.search_term.clone(),
            },
        }
    }

    /// Start a load-more fetch. `None` when there is nothing more to load
    /// or a fetch is already outstanding; the state is left unchanged.
    pub fn begin_more(&mut self) -> Option<FetchTicket> {
        if !self.can_load_more() {
            return None;
        }
        self.status = FetchStatus::Loading;
        self.error = None;
        Some(FetchTicket {
            kind: FetchKind::More,
            params: FetchParams {
                page_size: self.page_size,
                cursor: self.cursor.clone(),
                search_term: self.search_term.clone(),
            },
        })
    }

    /// Apply the outcome of a fetch.
    ///
    /// Every outcome is applied whenever it resolves, even if the state has
    /// moved on since the ticket was issued. Failures leave the items alone.
    pub fn resolve(&mut self, ticket: &FetchTicket, outcome: Result<CustomersPage, String>) {
        match outcome {
            Ok(page) => {
                match ticket.kind {
                    FetchKind::Initial => self.items = page.data,
                    FetchKind::More => self.items.extend(page.data),
                }
                self.page_size = page.page_size;
                self.has_next = page.has_next;
                self.cursor = page.cursor;
                self.status = FetchStatus::Succeeded;
            }
            Err(message) => {
                self.status = FetchStatus::Failed;
                self.error = Some(message);
            }
        }
    }
}
