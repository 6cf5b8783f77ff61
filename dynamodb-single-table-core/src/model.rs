/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Wire-level request and response shapes.
//!
//! Field names serialize to the store's JSON protocol (`TableName`, `Key`,
//! `ConditionExpression`, ...). Optional fields are omitted when absent.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::attribute_value::{AttributeValue, Item};

/// Input of a `GetItem` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetItemInput {
    /// The table to read from.
    pub table_name: String,
    /// The primary key of the item.
    pub key: Item,
    /// Whether to use a strongly consistent read.
    pub consistent_read: bool,
    /// Comma separated attributes to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection_expression: Option<String>,
}

/// Output of a `GetItem` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetItemOutput {
    /// The item, if it exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
}

/// Input of a `PutItem` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutItemInput {
    /// The table to write to.
    pub table_name: String,
    /// The full item, key attributes included.
    pub item: Item,
    /// Guard evaluated against the existing item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,
}

/// Output of a `PutItem` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PutItemOutput {}

/// What an attribute update does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeAction {
    /// Set the attribute.
    #[serde(rename = "PUT")]
    Put,
    /// Remove the attribute.
    #[serde(rename = "DELETE")]
    Delete,
}

/// A single entry of `AttributeUpdates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeValueUpdate {
    /// The action to apply.
    pub action: AttributeAction,
    /// The new value, for `PUT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<AttributeValue>,
}

impl AttributeValueUpdate {
    /// A `PUT` of the given value.
    pub fn put(value: AttributeValue) -> Self {
        Self {
            action: AttributeAction::Put,
            value: Some(value),
        }
    }
}

/// Input of an `UpdateItem` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateItemInput {
    /// The table to write to.
    pub table_name: String,
    /// The primary key of the item.
    pub key: Item,
    /// Per-attribute updates.
    pub attribute_updates: HashMap<String, AttributeValueUpdate>,
}

/// Output of an `UpdateItem` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateItemOutput {}

/// Input of a `DeleteItem` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteItemInput {
    /// The table to delete from.
    pub table_name: String,
    /// The primary key of the item.
    pub key: Item,
    /// Guard evaluated against the existing item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,
}

/// Output of a `DeleteItem` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteItemOutput {}

/// Which attributes a query returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Select {
    /// All attributes of the item.
    #[serde(rename = "ALL_ATTRIBUTES")]
    AllAttributes,
    /// Only those named in `ProjectionExpression`.
    #[default]
    #[serde(rename = "SPECIFIC_ATTRIBUTES")]
    SpecificAttributes,
}

/// Input of a `Query` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryInput {
    /// The table to query.
    pub table_name: String,
    /// The secondary index to query, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    /// Which attributes to return.
    pub select: Select,
    /// Key condition with `#n`/`:v` placeholders.
    pub key_condition_expression: String,
    /// Placeholder to attribute name.
    pub expression_attribute_names: HashMap<String, String>,
    /// Placeholder to value.
    pub expression_attribute_values: HashMap<String, AttributeValue>,
    /// Comma separated attributes to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection_expression: Option<String>,
    /// Whether to use a strongly consistent read.
    pub consistent_read: bool,
    /// Maximum number of items to evaluate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Output of a `Query` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryOutput {
    /// The matching items.
    #[serde(default)]
    pub items: Vec<Item>,
    /// Number of items returned.
    #[serde(default)]
    pub count: u32,
    /// Set when more results are available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_evaluated_key: Option<Item>,
}

/// Keys to read from one table in a `BatchGetItem` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeysAndAttributes {
    /// The primary keys to read.
    pub keys: Vec<Item>,
    /// Comma separated attributes to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection_expression: Option<String>,
    /// Whether to use strongly consistent reads.
    #[serde(default)]
    pub consistent_read: bool,
}

/// Input of a `BatchGetItem` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchGetItemInput {
    /// Keys to read, per table name.
    pub request_items: HashMap<String, KeysAndAttributes>,
}

/// Output of a `BatchGetItem` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchGetItemOutput {
    /// Items read, per table name.
    #[serde(default)]
    pub responses: HashMap<String, Vec<Item>>,
    /// Keys the store did not get to, per table name.
    #[serde(default)]
    pub unprocessed_keys: HashMap<String, KeysAndAttributes>,
}

/// One write of a `TransactWriteItems` call, e.g. `{"Put": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransactWriteItem {
    /// Put an item.
    Put(PutItemInput),
    /// Update an item.
    Update(UpdateItemInput),
    /// Delete an item.
    Delete(DeleteItemInput),
}

impl TransactWriteItem {
    /// The table this write targets.
    pub fn table_name(&self) -> &str {
        match self {
            TransactWriteItem::Put(input) => &input.table_name,
            TransactWriteItem::Update(input) => &input.table_name,
            TransactWriteItem::Delete(input) => &input.table_name,
        }
    }
}

/// Input of a `TransactWriteItems` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactWriteItemsInput {
    /// The writes, applied all-or-nothing.
    pub transact_items: Vec<TransactWriteItem>,
}

/// Output of a `TransactWriteItems` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactWriteItemsOutput {}
