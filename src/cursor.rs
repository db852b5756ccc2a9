//! Cursor codec - opaque page tokens over store continuation keys.
//!
//! A continuation key is serialized as a compact JSON object and wrapped in
//! URL-safe base64 without padding so it can travel as a query-string
//! parameter untouched. Keys are held in a `BTreeMap`, so every token the
//! encoder produces decodes and re-encodes to the same bytes.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use thiserror::Error;

/// The store's native pagination key: attribute name → string value of the
/// last evaluated record.
pub type ContinuationKey = BTreeMap<String, String>;

/// A cursor token could not be turned back into a continuation key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cursor is malformed")]
pub struct CursorError {
    /// Underlying reason; logged, never returned to callers.
    pub reason: String,
}

impl CursorError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Encode a continuation key as a cursor token. `None` stays `None`.
pub fn encode(key: Option<&ContinuationKey>) -> Option<String> {
    let key = key?;
    // A map of strings always serializes.
    let json = serde_json::to_vec(key).unwrap_or_default();
    Some(URL_SAFE_NO_PAD.encode(json))
}

/// Decode a cursor token. An absent or empty token is `Ok(None)`.
pub fn decode(token: Option<&str>) -> Result<Option<ContinuationKey>, CursorError> {
    let token = match token {
        Some(t) if !t.is_empty() => t,
        _ => return Ok(None),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|e| CursorError::new(format!("invalid base64: {e}")))?;
    let value: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| CursorError::new(format!("invalid json: {e}")))?;

    let object = value
        .as_object()
        .ok_or_else(|| CursorError::new("payload is not an object"))?;

    let mut key = ContinuationKey::new();
    for (name, v) in object {
        let s = v
            .as_str()
            .ok_or_else(|| CursorError::new(format!("attribute {name} is not a string")))?;
        key.insert(name.clone(), s.to_string());
    }
    Ok(Some(key))
}
