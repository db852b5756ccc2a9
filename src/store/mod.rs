//! Index store - the range-query seam over the customers' secondary index.
//!
//! The index is keyed by a fixed partition discriminator and sorted on the
//! registration timestamp. A query carries a limit, an exclusive start key,
//! and an optional post-filter. The limit counts records *evaluated*, not
//! records returned: the filter runs after the limit, so a page may come
//! back short (or empty) while a continuation key still points further
//! into the index.
//!
//! ## Example
//!
//! ```ignore
//! use customer_explorer::store::{CustomerIndex, InMemoryCustomerIndex, IndexQuery};
//!
//! let index = InMemoryCustomerIndex::new();
//! index.put(customer.to_item())?;
//! let page = index.query(&IndexQuery::new("customers", "by_registration", 25)).await?;
//! ```

mod in_memory;

#[cfg(feature = "dynamodb")]
mod dynamodb;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::cursor::ContinuationKey;
use crate::customer::{StoredItem, EMAIL_ATTR, ENTITY_TYPE, FULL_NAME_ATTR};

pub use in_memory::InMemoryCustomerIndex;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoCustomerIndex;

/// Error raised by the store while serving a range query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Storage-level failure (transport, throttling, service error).
    #[error("store error: {0}")]
    Storage(String),
    /// The store returned something that cannot be represented.
    #[error("store returned an unreadable item: {0}")]
    Unreadable(String),
    /// An internal lock was poisoned.
    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

/// Substring post-filter: `contains(full_name, term) OR contains(email, term)`.
///
/// Matching is case-sensitive and exact-substring; attributes that are not
/// strings never match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    pub term: String,
}

impl SearchFilter {
    pub fn new(term: impl Into<String>) -> Self {
        Self { term: term.into() }
    }

    pub fn matches(&self, item: &StoredItem) -> bool {
        [FULL_NAME_ATTR, EMAIL_ATTR].iter().any(|attr| {
            matches!(item.get(*attr), Some(Value::String(s)) if s.contains(self.term.as_str()))
        })
    }
}

/// One range query against the secondary index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexQuery {
    pub table_name: String,
    pub index_name: String,
    /// Partition discriminator value (`entity_type = :entity_type`).
    pub partition: String,
    /// Maximum number of records to evaluate before the filter runs.
    pub limit: u32,
    /// `false` walks the sort key in descending order.
    pub scan_forward: bool,
    pub exclusive_start_key: Option<ContinuationKey>,
    pub filter: Option<SearchFilter>,
}

impl IndexQuery {
    /// Descending query over the customer partition with no start key or filter.
    pub fn new(table_name: impl Into<String>, index_name: impl Into<String>, limit: u32) -> Self {
        Self {
            table_name: table_name.into(),
            index_name: index_name.into(),
            partition: ENTITY_TYPE.to_string(),
            limit,
            scan_forward: false,
            exclusive_start_key: None,
            filter: None,
        }
    }

    pub fn start_after(mut self, key: Option<ContinuationKey>) -> Self {
        self.exclusive_start_key = key;
        self
    }

    pub fn with_filter(mut self, filter: Option<SearchFilter>) -> Self {
        self.filter = filter;
        self
    }
}

/// Result of one range query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexPage {
    pub items: Vec<StoredItem>,
    /// Present when more records may exist past the last evaluated one.
    pub last_evaluated_key: Option<ContinuationKey>,
}

/// Range-query access to the customer index.
///
/// Implementations are long-lived handles shared across requests; they
/// must be safe for concurrent use.
#[async_trait]
pub trait CustomerIndex: Send + Sync {
    async fn query(&self, query: &IndexQuery) -> Result<IndexPage, StoreError>;
}

#[async_trait]
impl<T: CustomerIndex + ?Sized> CustomerIndex for std::sync::Arc<T> {
    async fn query(&self, query: &IndexQuery) -> Result<IndexPage, StoreError> {
        (**self).query(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(full_name: Value, email: Value) -> StoredItem {
        json!({ "full_name": full_name, "email": email })
            .as_object()
            .cloned()
            .unwrap()
    }

    #[test]
    fn filter_matches_name_or_email() {
        let filter = SearchFilter::new("Ada");
        assert!(filter.matches(&item(json!("Ada Lovelace"), json!("x@example.com"))));
        assert!(filter.matches(&item(json!("Someone"), json!("Ada@example.com"))));
        assert!(!filter.matches(&item(json!("Grace"), json!("grace@example.com"))));
    }

    #[test]
    fn filter_is_case_sensitive_substring() {
        let filter = SearchFilter::new("ada");
        assert!(!filter.matches(&item(json!("Ada Lovelace"), json!("lovelace@example.com"))));
        assert!(filter.matches(&item(json!("Nevada Smith"), json!("n@example.com"))));
    }

    #[test]
    fn filter_ignores_non_string_attributes() {
        let filter = SearchFilter::new("1");
        assert!(!filter.matches(&item(json!(1), json!(null))));
    }

    #[test]
    fn new_query_is_descending_customer_partition() {
        let query = IndexQuery::new("customers", "by_date", 10);
        assert_eq!(query.partition, "CUSTOMER");
        assert!(!query.scan_forward);
        assert_eq!(query.limit, 10);
        assert!(query.filter.is_none());
        assert!(query.exclusive_start_key.is_none());
    }
}
