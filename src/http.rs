//! HTTP transport - maps `GET /customers` onto the query service.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /customers?pageSize&q&cursor`: one page of customers, newest first.
//! - `GET /health`: health check returning `{ "ok": true }`.
//!
//! Unknown paths answer 404 and other methods on known paths answer 405,
//! in the same error shape.
//!
//! Every response is JSON and carries `Access-Control-Allow-Origin: *`.
//! Validation failures answer 400 with their message; anything else is
//! logged in full and answered with a generic 500.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use customer_explorer::{http, CustomerQueryService, InMemoryCustomerIndex, StoreConfig};
//!
//! let service = Arc::new(CustomerQueryService::new(
//!     InMemoryCustomerIndex::new(),
//!     StoreConfig::from_env(),
//! ));
//!
//! // Compose with other axum routes
//! let app = http::router(service.clone());
//!
//! // Or serve directly
//! http::serve(service, "0.0.0.0:3000").await?;
//! ```

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::query::{CustomerQueryService, ListCustomersParams, QueryError, GENERIC_ERROR_MESSAGE};
use crate::store::CustomerIndex;

/// Build an axum `Router` serving the customer listing.
pub fn router<S: CustomerIndex + 'static>(service: Arc<CustomerQueryService<S>>) -> Router {
    Router::new()
        .route("/health", get(health_handler).fallback(method_not_allowed_handler))
        .route(
            "/customers",
            get(list_customers_handler::<S>).fallback(method_not_allowed_handler),
        )
        .fallback(not_found_handler)
        .with_state(service)
}

/// Serve the listing over HTTP at the given address (e.g. `"0.0.0.0:3000"`).
pub async fn serve<S: CustomerIndex + 'static>(
    service: Arc<CustomerQueryService<S>>,
    addr: &str,
) -> Result<(), std::io::Error> {
    let app = router(service);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "customer listing listening");
    axum::serve(listener, app).await
}

/// JSON response with the permissive CORS header.
fn respond(status: StatusCode, body: Value) -> Response {
    (
        status,
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(body),
    )
        .into_response()
}

fn error_body(code: &str, message: &str) -> Value {
    json!({ "error": { "code": code, "message": message } })
}

/// `GET /health`: returns `{ "ok": true }`.
async fn health_handler() -> Response {
    respond(StatusCode::OK, json!({ "ok": true }))
}

async fn not_found_handler() -> Response {
    respond(StatusCode::NOT_FOUND, error_body("NOT_FOUND", "Not found"))
}

async fn method_not_allowed_handler() -> Response {
    respond(
        StatusCode::METHOD_NOT_ALLOWED,
        error_body("METHOD_NOT_ALLOWED", "Method not allowed"),
    )
}

/// `GET /customers`: one page of customers.
async fn list_customers_handler<S: CustomerIndex + 'static>(
    State(service): State<Arc<CustomerQueryService<S>>>,
    params: Result<Query<ListCustomersParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => {
            warn!(error = %rejection, "rejected query string");
            return respond(
                StatusCode::BAD_REQUEST,
                error_body("VALIDATION_ERROR", &rejection.body_text()),
            );
        }
    };

    match service.list(&params).await {
        Ok(page) => match serde_json::to_value(&page) {
            Ok(body) => respond(StatusCode::OK, body),
            Err(e) => {
                error!(error = %e, "failed to serialize customers page");
                respond(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_body("INTERNAL_ERROR", GENERIC_ERROR_MESSAGE),
                )
            }
        },
        Err(e) => {
            match &e {
                QueryError::Validation(v) => warn!(error = %v, "invalid customers request"),
                other => error!(error = ?other, "unhandled error while fetching customers"),
            }
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            respond(status, error_body(e.code(), &e.public_message()))
        }
    }
}
