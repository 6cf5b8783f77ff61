/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Operation arguments and their wire request parameters.
//!
//! Each argument type describes one logical operation and renders itself into
//! the request the store expects, given the table name and its primary index.
//! Writes stamp the item with the current UTC time at render time: `CreatedAt`
//! for puts and `UpdatedAt` for updates, e.g. `2020-02-15T19:09:38`.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use dynamodb_single_table_core::model::{
    AttributeValueUpdate, DeleteItemInput, GetItemInput, PutItemInput, QueryInput, Select,
    TransactWriteItem, UpdateItemInput,
};
use dynamodb_single_table_core::{
    serialize_item, serialize_value, Attributes, GlobalIndex, GlobalSecondaryIndex, Item,
    PartitionKey, PrimaryKey, SortKey, Value,
};
use dynamodb_single_table_expressions::KeyCondition;

use crate::error::Error;

/// Attribute set on every put.
pub const CREATED_AT: &str = "CreatedAt";
/// Attribute set on every update.
pub const UPDATED_AT: &str = "UpdatedAt";
/// Default and maximum query limit.
pub const MAX_QUERY_LIMIT: u32 = 1000;

/// Current UTC time as ISO-8601 without fractional seconds or offset.
pub(crate) fn iso_now() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn condition_not_exists(index: &dyn GlobalIndex) -> String {
    format!("attribute_not_exists({})", index.partition_key())
}

fn condition_exists(index: &dyn GlobalIndex) -> String {
    format!("attribute_exists({})", index.partition_key())
}

fn projection<'a>(attributes: impl IntoIterator<Item = &'a String>) -> Option<String> {
    let joined = attributes
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// A logical operation that renders into a wire request.
pub trait OpArg {
    /// The wire request this argument renders into.
    type Input;

    /// The operation name, as used in `TransactItems` entries (e.g. `Put`).
    fn op_name(&self) -> &'static str;

    /// Renders the wire request for `table_name`, resolving key attributes
    /// through `primary_index`.
    fn to_input(&self, table_name: &str, primary_index: &dyn GlobalIndex)
        -> Result<Self::Input, Error>;
}

/// Reads a single item.
#[derive(Debug, Clone, PartialEq)]
pub struct GetArg {
    key: PrimaryKey,
    attributes: Vec<String>,
    consistent: bool,
}

impl GetArg {
    /// Reads all attributes of the item, eventually consistent.
    pub fn new(pk: PartitionKey, sk: SortKey) -> Self {
        Self {
            key: PrimaryKey::new(pk, sk),
            attributes: Vec::new(),
            consistent: false,
        }
    }

    /// Only returns the named attributes.
    pub fn attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Uses a strongly consistent read.
    pub fn consistent(mut self, consistent: bool) -> Self {
        self.consistent = consistent;
        self
    }

    /// The key of the item.
    pub fn key(&self) -> &PrimaryKey {
        &self.key
    }
}

impl OpArg for GetArg {
    type Input = GetItemInput;

    fn op_name(&self) -> &'static str {
        "Get"
    }

    fn to_input(
        &self,
        table_name: &str,
        primary_index: &dyn GlobalIndex,
    ) -> Result<GetItemInput, Error> {
        Ok(GetItemInput {
            table_name: table_name.to_string(),
            key: self.key.serialize(primary_index),
            consistent_read: self.consistent,
            projection_expression: projection(&self.attributes),
        })
    }
}

/// Creates or replaces an item.
#[derive(Debug, Clone, PartialEq)]
pub struct PutArg {
    key: PrimaryKey,
    attributes: Attributes,
    allow_overwrite: bool,
}

impl PutArg {
    /// Puts an item with only its key and `CreatedAt`, replacing any existing item.
    pub fn new(pk: PartitionKey, sk: SortKey) -> Self {
        Self {
            key: PrimaryKey::new(pk, sk),
            attributes: Attributes::new(),
            allow_overwrite: true,
        }
    }

    /// Additional attributes of the item.
    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Sets a single additional attribute.
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Whether an existing item with the same key may be replaced.
    pub fn allow_overwrite(mut self, allow_overwrite: bool) -> Self {
        self.allow_overwrite = allow_overwrite;
        self
    }

    /// The key of the item.
    pub fn key(&self) -> &PrimaryKey {
        &self.key
    }

    fn render(
        &self,
        table_name: &str,
        primary_index: &dyn GlobalIndex,
        now: String,
    ) -> Result<PutItemInput, Error> {
        let mut attributes = self.attributes.clone();
        attributes.insert(CREATED_AT.to_string(), Value::String(now));
        let mut item = serialize_item(&attributes)?;
        item.extend(self.key.serialize(primary_index));
        Ok(PutItemInput {
            table_name: table_name.to_string(),
            item,
            condition_expression: if self.allow_overwrite {
                None
            } else {
                Some(condition_not_exists(primary_index))
            },
        })
    }
}

impl OpArg for PutArg {
    type Input = PutItemInput;

    fn op_name(&self) -> &'static str {
        "Put"
    }

    fn to_input(
        &self,
        table_name: &str,
        primary_index: &dyn GlobalIndex,
    ) -> Result<PutItemInput, Error> {
        self.render(table_name, primary_index, iso_now())
    }
}

/// Creates an item, failing if one with the same key exists.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertArg(PutArg);

impl InsertArg {
    /// Inserts an item with only its key and `CreatedAt`.
    pub fn new(pk: PartitionKey, sk: SortKey) -> Self {
        InsertArg(PutArg::new(pk, sk).allow_overwrite(false))
    }

    /// Additional attributes of the item.
    pub fn attributes(self, attributes: Attributes) -> Self {
        InsertArg(self.0.attributes(attributes))
    }

    /// Sets a single additional attribute.
    pub fn attribute(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        InsertArg(self.0.attribute(name, value))
    }

    /// The key of the item.
    pub fn key(&self) -> &PrimaryKey {
        self.0.key()
    }
}

impl From<InsertArg> for PutArg {
    fn from(insert: InsertArg) -> Self {
        insert.0
    }
}

impl OpArg for InsertArg {
    type Input = PutItemInput;

    fn op_name(&self) -> &'static str {
        self.0.op_name()
    }

    fn to_input(
        &self,
        table_name: &str,
        primary_index: &dyn GlobalIndex,
    ) -> Result<PutItemInput, Error> {
        self.0.to_input(table_name, primary_index)
    }
}

/// Sets attributes of an item, creating the item if it does not exist.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateArg {
    key: PrimaryKey,
    attributes: Attributes,
}

impl UpdateArg {
    /// Updates only `UpdatedAt`.
    pub fn new(pk: PartitionKey, sk: SortKey) -> Self {
        Self {
            key: PrimaryKey::new(pk, sk),
            attributes: Attributes::new(),
        }
    }

    /// Attributes to overwrite or create.
    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Sets a single attribute.
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// The key of the item.
    pub fn key(&self) -> &PrimaryKey {
        &self.key
    }

    fn render(
        &self,
        table_name: &str,
        primary_index: &dyn GlobalIndex,
        now: String,
    ) -> Result<UpdateItemInput, Error> {
        let mut attributes = self.attributes.clone();
        attributes.insert(UPDATED_AT.to_string(), Value::String(now));
        let attribute_updates = attributes
            .iter()
            .map(|(name, value)| match serialize_value(value) {
                Ok(av) => Ok((name.clone(), AttributeValueUpdate::put(av))),
                Err(e) => Err(e.with_field(name.as_str())),
            })
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(UpdateItemInput {
            table_name: table_name.to_string(),
            key: self.key.serialize(primary_index),
            attribute_updates,
        })
    }
}

impl OpArg for UpdateArg {
    type Input = UpdateItemInput;

    fn op_name(&self) -> &'static str {
        "Update"
    }

    fn to_input(
        &self,
        table_name: &str,
        primary_index: &dyn GlobalIndex,
    ) -> Result<UpdateItemInput, Error> {
        self.render(table_name, primary_index, iso_now())
    }
}

/// Deletes an item.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteArg {
    key: PrimaryKey,
    idempotent: bool,
}

impl DeleteArg {
    /// Deletes the item, succeeding whether or not it exists.
    pub fn new(pk: PartitionKey, sk: SortKey) -> Self {
        Self {
            key: PrimaryKey::new(pk, sk),
            idempotent: true,
        }
    }

    /// When false, the delete fails if the item does not exist.
    pub fn idempotent(mut self, idempotent: bool) -> Self {
        self.idempotent = idempotent;
        self
    }

    /// The key of the item.
    pub fn key(&self) -> &PrimaryKey {
        &self.key
    }
}

impl OpArg for DeleteArg {
    type Input = DeleteItemInput;

    fn op_name(&self) -> &'static str {
        "Delete"
    }

    fn to_input(
        &self,
        table_name: &str,
        primary_index: &dyn GlobalIndex,
    ) -> Result<DeleteItemInput, Error> {
        Ok(DeleteItemInput {
            table_name: table_name.to_string(),
            key: self.key.serialize(primary_index),
            condition_expression: if self.idempotent {
                None
            } else {
                Some(condition_exists(primary_index))
            },
        })
    }
}

/// Options shared by [`QueryArg`] and `Table::query_prefix`.
#[derive(Clone, Default)]
pub struct QueryOptions {
    index: Option<Arc<dyn GlobalSecondaryIndex>>,
    attributes: Vec<String>,
    consistent: bool,
    limit: Option<u32>,
}

impl QueryOptions {
    /// Queries the primary index, returns the sort key only, at most 1000 items.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queries a secondary index instead of the primary index.
    pub fn index(mut self, index: impl GlobalSecondaryIndex + 'static) -> Self {
        self.index = Some(Arc::new(index));
        self
    }

    /// Only returns the named attributes.
    pub fn attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Uses a strongly consistent read.
    pub fn consistent(mut self, consistent: bool) -> Self {
        self.consistent = consistent;
        self
    }

    /// Maximum number of items to fetch, at most 1000.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn secondary_index(&self) -> Option<&dyn GlobalSecondaryIndex> {
        self.index.as_deref()
    }

    pub(crate) fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }
}

impl fmt::Debug for QueryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions")
            .field("index", &self.index.as_ref().map(|i| i.name().to_string()))
            .field("attributes", &self.attributes)
            .field("consistent", &self.consistent)
            .field("limit", &self.limit)
            .finish()
    }
}

/// Reads the items matching a key condition. Cannot be part of a transaction.
#[derive(Debug, Clone)]
pub struct QueryArg {
    condition: KeyCondition,
    options: QueryOptions,
    limit: u32,
}

impl QueryArg {
    /// Builds a query, failing if the limit is above 1000.
    pub fn new(condition: impl Into<KeyCondition>, options: QueryOptions) -> Result<Self, Error> {
        let limit = match options.limit {
            Some(limit) if limit > MAX_QUERY_LIMIT => {
                return Err(Error::invalid_argument(format!(
                    "limit {} is greater than max {}",
                    limit, MAX_QUERY_LIMIT
                )))
            }
            Some(limit) => limit,
            None => MAX_QUERY_LIMIT,
        };
        Ok(Self {
            condition: condition.into(),
            options,
            limit,
        })
    }

    /// The effective item limit.
    pub fn limit(&self) -> u32 {
        self.limit
    }
}

impl OpArg for QueryArg {
    type Input = QueryInput;

    fn op_name(&self) -> &'static str {
        "Query"
    }

    fn to_input(
        &self,
        table_name: &str,
        primary_index: &dyn GlobalIndex,
    ) -> Result<QueryInput, Error> {
        let built = self.condition.build()?;
        let index = self.options.secondary_index();
        let projection_expression = if self.options.has_attributes() {
            projection(&self.options.attributes)
        } else {
            let sort_key = match index {
                Some(index) => index.sort_key(),
                None => primary_index.sort_key(),
            };
            Some(sort_key.to_string())
        };
        Ok(QueryInput {
            table_name: table_name.to_string(),
            index_name: index.map(|i| i.name().to_string()),
            select: Select::SpecificAttributes,
            key_condition_expression: built.expression,
            expression_attribute_names: built.names,
            expression_attribute_values: built.values,
            projection_expression,
            consistent_read: self.options.consistent,
            limit: Some(self.limit),
        })
    }
}

/// A write that can take part in a transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Create or replace an item.
    Put(PutArg),
    /// Create an item that must not exist.
    Insert(InsertArg),
    /// Set attributes of an item.
    Update(UpdateArg),
    /// Delete an item.
    Delete(DeleteArg),
}

impl WriteOp {
    /// The operation name, as used in `TransactItems` entries.
    pub fn op_name(&self) -> &'static str {
        match self {
            WriteOp::Put(arg) => arg.op_name(),
            WriteOp::Insert(arg) => arg.op_name(),
            WriteOp::Update(arg) => arg.op_name(),
            WriteOp::Delete(arg) => arg.op_name(),
        }
    }

    /// The key of the item this write targets.
    pub fn key(&self) -> &PrimaryKey {
        match self {
            WriteOp::Put(arg) => arg.key(),
            WriteOp::Insert(arg) => arg.key(),
            WriteOp::Update(arg) => arg.key(),
            WriteOp::Delete(arg) => arg.key(),
        }
    }

    /// Renders the `{"<OpName>": params}` entry of a `TransactWriteItems` request.
    pub fn to_transact_item(
        &self,
        table_name: &str,
        primary_index: &dyn GlobalIndex,
    ) -> Result<TransactWriteItem, Error> {
        Ok(match self {
            WriteOp::Put(arg) => TransactWriteItem::Put(arg.to_input(table_name, primary_index)?),
            WriteOp::Insert(arg) => {
                TransactWriteItem::Put(arg.to_input(table_name, primary_index)?)
            }
            WriteOp::Update(arg) => {
                TransactWriteItem::Update(arg.to_input(table_name, primary_index)?)
            }
            WriteOp::Delete(arg) => {
                TransactWriteItem::Delete(arg.to_input(table_name, primary_index)?)
            }
        })
    }
}

macro_rules! write_op_from {
    ($($variant:ident($arg:ty)),*) => {
        $(
            impl From<$arg> for WriteOp {
                fn from(arg: $arg) -> Self {
                    WriteOp::$variant(arg)
                }
            }
        )*
    };
}

write_op_from!(Put(PutArg), Insert(InsertArg), Update(UpdateArg), Delete(DeleteArg));

/// Projection for batch reads: the requested attributes plus both key attributes.
pub(crate) fn batch_projection(attributes: &[String], primary_index: &dyn GlobalIndex) -> String {
    let mut names: BTreeSet<&str> = attributes.iter().map(String::as_str).collect();
    names.insert(primary_index.partition_key());
    names.insert(primary_index.sort_key());
    names.into_iter().collect::<Vec<_>>().join(",")
}

/// Serializes several keys for a batch read.
pub(crate) fn serialize_keys<'a>(
    keys: impl IntoIterator<Item = &'a PrimaryKey>,
    primary_index: &dyn GlobalIndex,
) -> Vec<Item> {
    keys.into_iter()
        .map(|key| key.serialize(primary_index))
        .collect()
}
