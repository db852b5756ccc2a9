//! Feed - the client-side incremental fetch state machine.
//!
//! Two triggers feed the same machine and are kept apart:
//!
//! - **initial** (mount, search change): always starts, replaces the list;
//! - **more** (button click or end-of-list sentinel): only when more pages
//!   exist and nothing is loading, appends to the list.
//!
//! A failed load-more never loses what was already loaded.
//!
//! ## Example
//!
//! ```ignore
//! use customer_explorer::feed::{CustomerFeed, HttpCustomersApi};
//!
//! let feed = CustomerFeed::new(HttpCustomersApi::new("http://localhost:3000"), 25);
//! feed.fetch_initial("").await;
//! while feed.snapshot().has_next() {
//!     feed.sentinel_visible().await;
//! }
//! ```

mod api;
mod controller;
mod state;

pub use api::{query_pairs, CustomersApi, FetchError};
#[cfg(feature = "client")]
pub use api::HttpCustomersApi;
pub use controller::{CustomerFeed, FetchOutcome};
pub use state::{FeedState, FetchKind, FetchParams, FetchStatus, FetchTicket};
