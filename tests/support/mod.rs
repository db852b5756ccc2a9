//! Shared test doubles for the integration tests.

#![allow(dead_code)]

pub mod scripted_api;
pub mod scripted_index;

use serde_json::json;

use customer_explorer::{ContinuationKey, StoredItem};

/// A well-formed stored customer item.
pub fn customer_item(id: &str, full_name: &str, registration_date: &str) -> StoredItem {
    json!({
        "id": id,
        "entity_type": "CUSTOMER",
        "full_name": full_name,
        "email": format!("{id}@example.com"),
        "registration_date": registration_date,
    })
    .as_object()
    .cloned()
    .expect("object literal")
}

/// Continuation key pointing at the given record.
pub fn key_for(id: &str, registration_date: &str) -> ContinuationKey {
    ContinuationKey::from([
        ("id".to_string(), id.to_string()),
        ("entity_type".to_string(), "CUSTOMER".to_string()),
        ("registration_date".to_string(), registration_date.to_string()),
    ])
}
