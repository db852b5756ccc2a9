//! Customer records and coercion from raw stored items.
//!
//! The store hands back untyped attribute maps. Every item must carry the
//! four customer attributes as non-empty strings; anything else is treated
//! as upstream data corruption, not a caller error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Raw attribute map as returned by the store (attribute name → value).
pub type StoredItem = Map<String, Value>;

/// Attribute holding the partition discriminator on the secondary index.
pub const ENTITY_TYPE_ATTR: &str = "entity_type";
/// Partition discriminator value for customer records.
pub const ENTITY_TYPE: &str = "CUSTOMER";

pub const ID_ATTR: &str = "id";
pub const FULL_NAME_ATTR: &str = "full_name";
pub const EMAIL_ATTR: &str = "email";
pub const REGISTRATION_DATE_ATTR: &str = "registration_date";

/// A customer as exposed over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub full_name: String,
    pub email: String,
    /// ISO-8601 timestamp; the index sort key.
    pub registration_date: String,
}

/// A stored record is missing a required attribute or has it empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid customer field: {field}")]
pub struct DataIntegrityError {
    pub field: &'static str,
}

impl Customer {
    /// Coerce a raw stored item into a `Customer`.
    ///
    /// Attributes are checked in the order `id`, `full_name`, `email`,
    /// `registration_date`; the first offending one is reported.
    pub fn from_item(item: &StoredItem) -> Result<Self, DataIntegrityError> {
        Ok(Customer {
            id: coerce_string(item, ID_ATTR)?,
            full_name: coerce_string(item, FULL_NAME_ATTR)?,
            email: coerce_string(item, EMAIL_ATTR)?,
            registration_date: coerce_string(item, REGISTRATION_DATE_ATTR)?,
        })
    }

    /// Build the stored representation of this customer, including the
    /// partition discriminator. Used for seeding the in-memory index.
    pub fn to_item(&self) -> StoredItem {
        let mut item = Map::new();
        item.insert(ID_ATTR.into(), Value::String(self.id.clone()));
        item.insert(ENTITY_TYPE_ATTR.into(), Value::String(ENTITY_TYPE.into()));
        item.insert(FULL_NAME_ATTR.into(), Value::String(self.full_name.clone()));
        item.insert(EMAIL_ATTR.into(), Value::String(self.email.clone()));
        item.insert(
            REGISTRATION_DATE_ATTR.into(),
            Value::String(self.registration_date.clone()),
        );
        item
    }
}

fn coerce_string(item: &StoredItem, field: &'static str) -> Result<String, DataIntegrityError> {
    match item.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        _ => Err(DataIntegrityError { field }),
    }
}
