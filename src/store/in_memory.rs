//! InMemoryCustomerIndex - HashMap-backed index for testing and development.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use super::{CustomerIndex, IndexPage, IndexQuery, StoreError};
use crate::cursor::ContinuationKey;
use crate::customer::{StoredItem, ENTITY_TYPE_ATTR, ID_ATTR, REGISTRATION_DATE_ATTR};

/// In-memory customer table with a registration-date secondary index.
///
/// Items are stored by `id`. The index is sparse: an item appears in it
/// only when it carries string `entity_type` and `registration_date`
/// attributes. Ties on the sort key are broken by `id` so paging is
/// deterministic. Clone-friendly via Arc.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCustomerIndex {
    storage: Arc<RwLock<HashMap<String, StoredItem>>>,
}

impl InMemoryCustomerIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index holding the given items.
    pub fn with_items(items: impl IntoIterator<Item = StoredItem>) -> Result<Self, StoreError> {
        let index = Self::new();
        for item in items {
            index.put(item)?;
        }
        Ok(index)
    }

    /// Insert or replace an item by its `id` attribute.
    pub fn put(&self, item: StoredItem) -> Result<(), StoreError> {
        let id = match item.get(ID_ATTR) {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            _ => return Err(StoreError::Unreadable("item has no string id".into())),
        };
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::LockPoisoned("put"))?;
        storage.insert(id, item);
        Ok(())
    }

    /// Number of stored items, indexed or not. Still answers after a
    /// writer panicked.
    pub fn len(&self) -> usize {
        self.storage
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Position of an item on the index: (sort key, table key).
fn index_position(item: &StoredItem) -> Option<(&str, &str)> {
    let sort = item.get(REGISTRATION_DATE_ATTR)?.as_str()?;
    let id = item.get(ID_ATTR)?.as_str()?;
    Some((sort, id))
}

fn key_position(key: &ContinuationKey) -> Result<(&str, &str), StoreError> {
    let sort = key.get(REGISTRATION_DATE_ATTR).ok_or_else(|| {
        StoreError::Storage("exclusive start key is missing the index sort key".into())
    })?;
    let id = key
        .get(ID_ATTR)
        .ok_or_else(|| StoreError::Storage("exclusive start key is missing the table key".into()))?;
    Ok((sort.as_str(), id.as_str()))
}

fn continuation_key(item: &StoredItem, partition: &str) -> Option<ContinuationKey> {
    let (sort, id) = index_position(item)?;
    Some(ContinuationKey::from([
        (ID_ATTR.to_string(), id.to_string()),
        (ENTITY_TYPE_ATTR.to_string(), partition.to_string()),
        (REGISTRATION_DATE_ATTR.to_string(), sort.to_string()),
    ]))
}

#[async_trait]
impl CustomerIndex for InMemoryCustomerIndex {
    async fn query(&self, query: &IndexQuery) -> Result<IndexPage, StoreError> {
        if query.limit == 0 {
            return Err(StoreError::Storage("limit must be at least 1".into()));
        }
        let start = query
            .exclusive_start_key
            .as_ref()
            .map(key_position)
            .transpose()?;

        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::LockPoisoned("query"))?;

        let mut partition: Vec<(&str, &str, &StoredItem)> = storage
            .values()
            .filter(|item| {
                matches!(item.get(ENTITY_TYPE_ATTR), Some(Value::String(p)) if *p == query.partition)
            })
            .filter_map(|item| index_position(item).map(|(sort, id)| (sort, id, item)))
            .collect();

        partition.sort_by(|a, b| {
            let ord = (a.0, a.1).cmp(&(b.0, b.1));
            if query.scan_forward {
                ord
            } else {
                ord.reverse()
            }
        });

        let remaining: Vec<&StoredItem> = partition
            .into_iter()
            .filter(|(sort, id, _)| match start {
                None => true,
                Some(start) => {
                    let ord = (*sort, *id).cmp(&start);
                    if query.scan_forward {
                        ord == Ordering::Greater
                    } else {
                        ord == Ordering::Less
                    }
                }
            })
            .map(|(_, _, item)| item)
            .collect();

        let limit = query.limit as usize;
        let evaluated = &remaining[..remaining.len().min(limit)];

        let items = evaluated
            .iter()
            .filter(|item| query.filter.as_ref().map_or(true, |f| f.matches(item)))
            .map(|item| (*item).clone())
            .collect();

        let last_evaluated_key = if remaining.len() > limit {
            evaluated
                .last()
                .and_then(|item| continuation_key(item, &query.partition))
        } else {
            None
        };

        Ok(IndexPage {
            items,
            last_evaluated_key,
        })
    }
}
