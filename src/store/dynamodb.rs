//! DynamoDB-backed customer index (requires the `dynamodb` feature).
//!
//! Issues `Query` calls against a global secondary index partitioned on
//! `entity_type` and sorted on `registration_date`. The search predicate is
//! pushed down as a `FilterExpression`, which DynamoDB evaluates after the
//! `Limit` has been applied.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde_json::Value;

use super::{CustomerIndex, IndexPage, IndexQuery, StoreError};
use crate::cursor::ContinuationKey;
use crate::customer::{StoredItem, EMAIL_ATTR, ENTITY_TYPE_ATTR, FULL_NAME_ATTR};

const KEY_CONDITION: &str = "#entity_type = :entity_type";
const SEARCH_FILTER: &str = "contains(#full_name, :search) OR contains(#email, :search)";

/// Customer index served by a DynamoDB table.
///
/// The SDK client is a cheap, shareable handle; build one per process.
#[derive(Clone)]
pub struct DynamoCustomerIndex {
    client: Client,
}

impl DynamoCustomerIndex {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the ambient AWS configuration (env, profile, IMDS).
    pub async fn from_env() -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl CustomerIndex for DynamoCustomerIndex {
    async fn query(&self, query: &IndexQuery) -> Result<IndexPage, StoreError> {
        let start_key = query.exclusive_start_key.as_ref().map(|key| {
            key.iter()
                .map(|(k, v)| (k.clone(), AttributeValue::S(v.clone())))
                .collect::<HashMap<_, _>>()
        });

        let mut request = self
            .client
            .query()
            .table_name(&query.table_name)
            .index_name(&query.index_name)
            .key_condition_expression(KEY_CONDITION)
            .expression_attribute_names("#entity_type", ENTITY_TYPE_ATTR)
            .expression_attribute_values(":entity_type", AttributeValue::S(query.partition.clone()))
            .limit(i32::try_from(query.limit).unwrap_or(i32::MAX))
            .scan_index_forward(query.scan_forward)
            .set_exclusive_start_key(start_key);

        if let Some(filter) = &query.filter {
            request = request
                .expression_attribute_names("#full_name", FULL_NAME_ATTR)
                .expression_attribute_names("#email", EMAIL_ATTR)
                .expression_attribute_values(":search", AttributeValue::S(filter.term.clone()))
                .filter_expression(SEARCH_FILTER);
        }

        let output = request
            .send()
            .await
            .map_err(|e| StoreError::Storage(DisplayErrorContext(&e).to_string()))?;

        let items = output.items().iter().map(to_item).collect();
        let last_evaluated_key = output
            .last_evaluated_key()
            .map(to_continuation_key)
            .transpose()?;

        Ok(IndexPage {
            items,
            last_evaluated_key,
        })
    }
}

fn to_item(raw: &HashMap<String, AttributeValue>) -> StoredItem {
    raw.iter()
        .map(|(name, value)| (name.clone(), to_json(value)))
        .collect()
}

fn to_json(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => serde_json::from_str(n).unwrap_or_else(|_| Value::String(n.clone())),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Ss(set) => Value::Array(set.iter().cloned().map(Value::String).collect()),
        AttributeValue::L(list) => Value::Array(list.iter().map(to_json).collect()),
        AttributeValue::M(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect(),
        ),
        _ => Value::Null,
    }
}

fn to_continuation_key(
    raw: &HashMap<String, AttributeValue>,
) -> Result<ContinuationKey, StoreError> {
    raw.iter()
        .map(|(name, value)| match value {
            AttributeValue::S(s) => Ok((name.clone(), s.clone())),
            _ => Err(StoreError::Unreadable(format!(
                "continuation key attribute {name} is not a string"
            ))),
        })
        .collect()
}
