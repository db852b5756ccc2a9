//! CustomerQueryService - turns a page request into range queries.
//!
//! Without a search term one query is enough. With a search term the
//! store's filter runs after its limit, so a single query can come back
//! short while matches remain further along the index. The planner keeps
//! querying for the remainder, advancing the start key each time, until the
//! page is full, the index is exhausted, or `MAX_SEARCH_QUERIES` calls have
//! been made. When the cap is hit the continuation key of the last call is
//! still returned, so the client can keep paging.

use tracing::debug;

use super::{CustomersPage, ListCustomersParams, PageRequest, QueryError, MAX_SEARCH_QUERIES};
use crate::config::{IndexTarget, StoreConfig};
use crate::cursor::{self, ContinuationKey};
use crate::customer::Customer;
use crate::store::{CustomerIndex, IndexQuery, SearchFilter};

/// Result of planning and running one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPage {
    pub items: Vec<Customer>,
    pub next_key: Option<ContinuationKey>,
    /// Store round-trips issued for this page.
    pub queries_issued: usize,
    /// The search loop stopped on the query cap with the page still short
    /// and more of the index left to read.
    pub search_capped: bool,
}

/// Read-only query service over a customer index.
///
/// Generic over `S`, the index implementation. The index is a long-lived
/// handle injected at construction and shared by every request.
pub struct CustomerQueryService<S> {
    index: S,
    config: StoreConfig,
}

impl<S: CustomerIndex> CustomerQueryService<S> {
    pub fn new(index: S, config: StoreConfig) -> Self {
        Self { index, config }
    }

    pub fn index(&self) -> &S {
        &self.index
    }

    /// Serve `GET /customers`: resolve configuration, validate parameters,
    /// run the page, and build the response body.
    pub async fn list(&self, params: &ListCustomersParams) -> Result<CustomersPage, QueryError> {
        let target = self.config.target()?;
        let request = PageRequest::parse(params)?;
        let page = self.fetch_page(&target, &request).await?;

        Ok(CustomersPage {
            data: page.items,
            page_size: request.page_size,
            has_next: page.next_key.is_some(),
            cursor: cursor::encode(page.next_key.as_ref()),
        })
    }

    /// Run a validated page request against the index.
    pub async fn fetch_page(
        &self,
        target: &IndexTarget,
        request: &PageRequest,
    ) -> Result<PlannedPage, QueryError> {
        let base = IndexQuery::new(&target.table_name, &target.index_name, request.page_size);

        let Some(term) = request.search_term.as_deref() else {
            let query = base.start_after(request.start_key.clone());
            debug!(
                limit = query.limit,
                resumed = query.exclusive_start_key.is_some(),
                "querying customer index"
            );
            let page = self.index.query(&query).await?;
            let items = page
                .items
                .iter()
                .map(Customer::from_item)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(PlannedPage {
                items,
                next_key: page.last_evaluated_key,
                queries_issued: 1,
                search_capped: false,
            });
        };

        let page_size = request.page_size as usize;
        let filter = SearchFilter::new(term);
        let mut collected: Vec<Customer> = Vec::with_capacity(page_size);
        let mut next_key = request.start_key.clone();
        let mut queries_issued = 0;

        while queries_issued < MAX_SEARCH_QUERIES && collected.len() < page_size {
            let mut query = base
                .clone()
                .start_after(next_key.take())
                .with_filter(Some(filter.clone()));
            query.limit = (page_size - collected.len()) as u32;
            queries_issued += 1;
            debug!(
                attempt = queries_issued,
                limit = query.limit,
                resumed = query.exclusive_start_key.is_some(),
                "searching customer index"
            );

            let page = self.index.query(&query).await?;
            for item in &page.items {
                collected.push(Customer::from_item(item)?);
            }
            next_key = page.last_evaluated_key;

            if next_key.is_none() {
                break;
            }
        }

        let search_capped = next_key.is_some() && collected.len() < page_size;
        if search_capped {
            debug!(
                collected = collected.len(),
                page_size, "search stopped at query cap with a short page"
            );
        }

        Ok(PlannedPage {
            items: collected,
            next_key,
            queries_issued,
            search_capped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::StoredItem;
    use crate::store::InMemoryCustomerIndex;
    use serde_json::json;

    fn customer(id: &str, name: &str, day: u32) -> StoredItem {
        json!({
            "id": id,
            "entity_type": "CUSTOMER",
            "full_name": name,
            "email": format!("{id}@example.com"),
            "registration_date": format!("2024-01-{day:02}T00:00:00.000Z"),
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    fn service(items: Vec<StoredItem>) -> CustomerQueryService<InMemoryCustomerIndex> {
        CustomerQueryService::new(
            InMemoryCustomerIndex::with_items(items).unwrap(),
            StoreConfig::new("customers", "registration_date_idx"),
        )
    }

    fn params(page_size: &str, q: Option<&str>, cursor: Option<String>) -> ListCustomersParams {
        ListCustomersParams {
            page_size: Some(page_size.into()),
            q: q.map(str::to_string),
            cursor,
        }
    }

    fn ids(items: &[Customer]) -> Vec<&str> {
        items.iter().map(|c| c.id.as_str()).collect()
    }

    #[tokio::test]
    async fn pages_through_everything_newest_first() {
        let svc = service((1..=5).map(|d| customer(&format!("c_{d}"), "Someone", d)).collect());

        let first = svc.list(&params("2", None, None)).await.unwrap();
        assert_eq!(ids(&first.data), ["c_5", "c_4"]);
        assert!(first.has_next);

        let second = svc.list(&params("2", None, first.cursor)).await.unwrap();
        assert_eq!(ids(&second.data), ["c_3", "c_2"]);

        let third = svc.list(&params("2", None, second.cursor)).await.unwrap();
        assert_eq!(ids(&third.data), ["c_1"]);
        assert!(!third.has_next);
        assert_eq!(third.cursor, None);
    }

    #[tokio::test]
    async fn search_fills_page_across_sparse_matches() {
        let mut items: Vec<StoredItem> = (1..=20)
            .map(|d| customer(&format!("c_{d}"), "Filler Person", d))
            .collect();
        items.push(customer("ada_1", "Ada Lovelace", 25));
        items.push(customer("ada_2", "Ada Byron", 18));

        let svc = service(items);
        let target = StoreConfig::new("customers", "registration_date_idx")
            .target()
            .unwrap();
        let request = PageRequest::parse(&params("2", Some(" Ada "), None)).unwrap();
        let page = svc.fetch_page(&target, &request).await.unwrap();

        assert_eq!(ids(&page.items), ["ada_1", "ada_2"]);
        assert_eq!(page.queries_issued, 4);
        assert!(page.next_key.is_some());
        assert!(!page.search_capped);
    }

    #[tokio::test]
    async fn search_stops_at_query_cap() {
        let mut items: Vec<StoredItem> = (1..=28)
            .map(|d| customer(&format!("c_{d:02}"), "Filler Person", d))
            .collect();
        items.push(customer("ada_1", "Ada Lovelace", 29));

        let svc = service(items);
        let target = StoreConfig::new("customers", "registration_date_idx")
            .target()
            .unwrap();
        let request = PageRequest::parse(&params("3", Some("Ada"), None)).unwrap();
        let page = svc.fetch_page(&target, &request).await.unwrap();

        assert_eq!(page.queries_issued, MAX_SEARCH_QUERIES);
        assert_eq!(ids(&page.items), ["ada_1"]);
        assert!(page.next_key.is_some());
        assert!(page.search_capped);
    }

    #[tokio::test]
    async fn missing_config_fails_before_validation() {
        let svc = CustomerQueryService::new(InMemoryCustomerIndex::new(), StoreConfig::default());
        let err = svc.list(&params("0", None, None)).await.unwrap_err();
        assert!(matches!(err, QueryError::Configuration(_)));
    }

    #[tokio::test]
    async fn corrupt_record_is_a_data_integrity_error() {
        let mut broken = customer("c_1", "Ada", 1);
        broken.insert("email".into(), json!(""));
        let svc = service(vec![broken]);

        let err = svc.list(&params("5", None, None)).await.unwrap_err();
        match err {
            QueryError::DataIntegrity(e) => assert_eq!(e.field, "email"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
