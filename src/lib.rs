pub mod config;
pub mod cursor;
pub mod customer;
pub mod feed;
pub mod query;
pub mod store;

// HTTP transport (requires "http" feature)
#[cfg(feature = "http")]
pub mod http;

pub use config::{ConfigError, IndexTarget, StoreConfig};
pub use cursor::{ContinuationKey, CursorError};
pub use customer::{Customer, DataIntegrityError, StoredItem};
pub use feed::{CustomerFeed, CustomersApi, FeedState, FetchError, FetchOutcome, FetchStatus};
pub use query::{
    normalize_search_term, parse_page_size, CustomerQueryService, CustomersPage,
    ListCustomersParams, PageRequest, PlannedPage, QueryError, ValidationError,
};
pub use store::{CustomerIndex, InMemoryCustomerIndex, IndexPage, IndexQuery, SearchFilter, StoreError};

#[cfg(feature = "client")]
pub use feed::HttpCustomersApi;
#[cfg(feature = "dynamodb")]
pub use store::DynamoCustomerIndex;
