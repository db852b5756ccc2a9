//! Error types for customer listing queries.

use thiserror::Error;

use crate::config::ConfigError;
use crate::cursor::CursorError;
use crate::customer::DataIntegrityError;
use crate::store::StoreError;

/// Public message for every non-validation failure.
pub const GENERIC_ERROR_MESSAGE: &str = "Unexpected error";

/// Caller error detected before any store access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("pageSize must be an integer")]
    PageSizeNotInteger,
    #[error("pageSize must be between {} and {}", super::MIN_PAGE_SIZE, super::MAX_PAGE_SIZE)]
    PageSizeOutOfBounds,
    #[error(transparent)]
    MalformedCursor(#[from] CursorError),
}

/// Any failure while serving a listing request.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    DataIntegrity(#[from] DataIntegrityError),
}

impl QueryError {
    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            QueryError::Validation(_) => 400,
            QueryError::Configuration(_) | QueryError::Store(_) | QueryError::DataIntegrity(_) => {
                500
            }
        }
    }

    /// Wire error code.
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::Validation(_) => "VALIDATION_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }

    /// Message safe to return to the caller. Internal detail never leaks.
    pub fn public_message(&self) -> String {
        match self {
            QueryError::Validation(e) => e.to_string(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}
