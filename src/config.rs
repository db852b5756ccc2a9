//! Store configuration.
//!
//! Table and index names come from the process environment
//! (`CUSTOMERS_TABLE_NAME`, `REGISTRATION_DATE_INDEX`). They are held as
//! optional and resolved per request, so a misconfigured deployment still
//! answers with the generic server error instead of refusing to start.

use thiserror::Error;

pub const TABLE_NAME_ENV: &str = "CUSTOMERS_TABLE_NAME";
pub const INDEX_NAME_ENV: &str = "REGISTRATION_DATE_INDEX";

/// Required store configuration is missing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing store configuration: {0}")]
pub struct ConfigError(pub &'static str);

/// Raw store configuration as supplied by the environment or CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    pub table_name: Option<String>,
    pub index_name: Option<String>,
}

/// Resolved table and index identifiers for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTarget {
    pub table_name: String,
    pub index_name: String,
}

impl StoreConfig {
    pub fn new(table_name: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            table_name: Some(table_name.into()),
            index_name: Some(index_name.into()),
        }
    }

    /// Read `CUSTOMERS_TABLE_NAME` and `REGISTRATION_DATE_INDEX`.
    pub fn from_env() -> Self {
        Self {
            table_name: std::env::var(TABLE_NAME_ENV).ok(),
            index_name: std::env::var(INDEX_NAME_ENV).ok(),
        }
    }

    /// Resolve the target, treating absent or empty names as missing.
    pub fn target(&self) -> Result<IndexTarget, ConfigError> {
        let table_name = non_empty(&self.table_name).ok_or(ConfigError(TABLE_NAME_ENV))?;
        let index_name = non_empty(&self.index_name).ok_or(ConfigError(INDEX_NAME_ENV))?;
        Ok(IndexTarget {
            table_name,
            index_name,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_complete_config() {
        let target = StoreConfig::new("customers", "registration_date_idx")
            .target()
            .unwrap();
        assert_eq!(target.table_name, "customers");
        assert_eq!(target.index_name, "registration_date_idx");
    }

    #[test]
    fn missing_or_empty_names_fail() {
        let err = StoreConfig::default().target().unwrap_err();
        assert_eq!(err, ConfigError(TABLE_NAME_ENV));

        let config = StoreConfig {
            table_name: Some("customers".into()),
            index_name: Some(String::new()),
        };
        assert_eq!(config.target().unwrap_err(), ConfigError(INDEX_NAME_ENV));
    }
}
