//! CustomersApi - the client's view of `GET /customers`.

use async_trait::async_trait;
use thiserror::Error;

use super::state::FetchParams;
use crate::query::CustomersPage;

/// A fetch failed. The display string is what the feed records as its error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The endpoint answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The request never produced a usable response.
    #[error("{0}")]
    Transport(String),
}

/// Source of customer pages for the feed.
#[async_trait]
pub trait CustomersApi: Send + Sync {
    async fn get_customers(&self, params: &FetchParams) -> Result<CustomersPage, FetchError>;
}

#[async_trait]
impl<T: CustomersApi + ?Sized> CustomersApi for std::sync::Arc<T> {
    async fn get_customers(&self, params: &FetchParams) -> Result<CustomersPage, FetchError> {
        (**self).get_customers(params).await
    }
}

/// Build the query-string pairs for a fetch.
///
/// `q` is always sent, even when empty; the server treats an empty term as
/// no search.
pub fn query_pairs(params: &FetchParams) -> Vec<(&'static str, String)> {
    let mut pairs = vec![("pageSize", params.page_size.to_string())];
    if let Some(cursor) = params.cursor.as_ref().filter(|c| !c.is_empty()) {
        pairs.push(("cursor", cursor.clone()));
    }
    pairs.push(("q", params.search_term.clone()));
    pairs
}

#[cfg(feature = "client")]
pub use http_api::HttpCustomersApi;

#[cfg(feature = "client")]
mod http_api {
    use async_trait::async_trait;

    use super::{query_pairs, CustomersApi, FetchError};
    use crate::feed::state::FetchParams;
    use crate::query::CustomersPage;

    /// `CustomersApi` over HTTP (requires the `client` feature).
    #[derive(Clone)]
    pub struct HttpCustomersApi {
        client: reqwest::Client,
        base_url: String,
    }

    impl HttpCustomersApi {
        /// `base_url` is the API root, e.g. `https://api.example.com/prod`.
        pub fn new(base_url: impl Into<String>) -> Self {
            Self::with_client(reqwest::Client::new(), base_url)
        }

        pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
            let base_url = base_url.into().trim_end_matches('/').to_string();
            Self { client, base_url }
        }
    }

    #[async_trait]
    impl CustomersApi for HttpCustomersApi {
        async fn get_customers(&self, params: &FetchParams) -> Result<CustomersPage, FetchError> {
            let resp = self
                .client
                .get(format!("{}/customers", self.base_url))
                .query(&query_pairs(params))
                .send()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    body,
                });
            }
            resp.json::<CustomersPage>()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_always_include_q() {
        let pairs = query_pairs(&FetchParams {
            page_size: 25,
            cursor: None,
            search_term: String::new(),
        });
        assert_eq!(pairs, vec![("pageSize", "25".to_string()), ("q", String::new())]);
    }

    #[test]
    fn query_pairs_carry_cursor() {
        let pairs = query_pairs(&FetchParams {
            page_size: 10,
            cursor: Some("abc".into()),
            search_term: "Ada".into(),
        });
        assert_eq!(
            pairs,
            vec![
                ("pageSize", "10".to_string()),
                ("cursor", "abc".to_string()),
                ("q", "Ada".to_string()),
            ]
        );
    }

    #[test]
    fn status_error_message_includes_body() {
        let err = FetchError::Status {
            status: 500,
            body: "{\"error\":{}}".into(),
        };
        assert_eq!(err.to_string(), "HTTP 500: {\"error\":{}}");
    }
}
