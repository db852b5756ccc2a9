//! Customer listing queries - request parsing, the query planner, and the
//! response contract shared with the client.
//!
//! ## Example
//!
//! ```ignore
//! use customer_explorer::{CustomerQueryService, InMemoryCustomerIndex, ListCustomersParams, StoreConfig};
//!
//! let service = CustomerQueryService::new(
//!     InMemoryCustomerIndex::new(),
//!     StoreConfig::new("customers", "registration_date_idx"),
//! );
//! let page = service.list(&ListCustomersParams::default()).await?;
//! assert!(page.data.len() <= 25);
//! ```

mod error;
mod planner;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cursor::{self, ContinuationKey};
use crate::customer::Customer;

pub use error::{QueryError, ValidationError, GENERIC_ERROR_MESSAGE};
pub use planner::{CustomerQueryService, PlannedPage};

pub const DEFAULT_PAGE_SIZE: u32 = 25;
pub const MIN_PAGE_SIZE: u32 = 1;
pub const MAX_PAGE_SIZE: u32 = 100;
/// Upper bound on store round-trips for a single search page.
pub const MAX_SEARCH_QUERIES: usize = 10;

/// Raw query-string parameters of `GET /customers`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCustomersParams {
    #[serde(rename = "pageSize", default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// A validated page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page_size: u32,
    pub search_term: Option<String>,
    pub start_key: Option<ContinuationKey>,
}

impl PageRequest {
    /// Validate raw parameters. Runs before any store access.
    pub fn parse(params: &ListCustomersParams) -> Result<Self, ValidationError> {
        let page_size = parse_page_size(params.page_size.as_deref())?;
        let start_key = cursor::decode(params.cursor.as_deref()).map_err(|e| {
            warn!(reason = %e.reason, "failed to decode cursor");
            ValidationError::from(e)
        })?;
        Ok(Self {
            page_size,
            search_term: normalize_search_term(params.q.as_deref()),
            start_key,
        })
    }
}

/// Response body of `GET /customers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomersPage {
    pub data: Vec<Customer>,
    pub page_size: u32,
    pub has_next: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// Parse the `pageSize` parameter.
///
/// Absent → 25. Any numeric spelling with an integral value is accepted
/// (`"10"`, `"10.0"`, `"1e1"`); an empty string reads as zero.
pub fn parse_page_size(value: Option<&str>) -> Result<u32, ValidationError> {
    let Some(raw) = value else {
        return Ok(DEFAULT_PAGE_SIZE);
    };
    let trimmed = raw.trim();
    let parsed: f64 = if trimmed.is_empty() {
        0.0
    } else {
        trimmed
            .parse()
            .map_err(|_| ValidationError::PageSizeNotInteger)?
    };
    if !parsed.is_finite() || parsed.fract() != 0.0 {
        return Err(ValidationError::PageSizeNotInteger);
    }
    if parsed < f64::from(MIN_PAGE_SIZE) || parsed > f64::from(MAX_PAGE_SIZE) {
        return Err(ValidationError::PageSizeOutOfBounds);
    }
    Ok(parsed as u32)
}

/// Trim the search term; absent, empty, and whitespace-only become `None`.
pub fn normalize_search_term(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
