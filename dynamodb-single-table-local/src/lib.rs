/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! An in-memory store implementing [`DynamoDbClient`].
//!
//! `LocalDynamoDb` understands the requests the single-table access layer
//! sends: existence conditions, key conditions with placeholders, projection
//! expressions, `AttributeUpdates`, batch reads and atomic write
//! transactions. It answers with the same error codes and messages as the
//! real service so that error classification can be tested offline.
//!
//! ```
//! use dynamodb_single_table_core::model::GetItemInput;
//! use dynamodb_single_table_core::DynamoDbClient;
//! use dynamodb_single_table_local::LocalDynamoDb;
//!
//! let store = LocalDynamoDb::with_single_table("App");
//! let err = store.get_item(GetItemInput {
//!     table_name: "Missing".into(),
//!     ..Default::default()
//! }).unwrap_err();
//! assert_eq!(err.code, "ResourceNotFoundException");
//! ```

#![warn(missing_docs)]

use std::collections::{HashMap, HashSet, VecDeque};

use parking_lot::Mutex;
use tracing::debug;

use dynamodb_single_table_core::model::{
    AttributeAction, BatchGetItemInput, BatchGetItemOutput, DeleteItemInput, DeleteItemOutput,
    GetItemInput, GetItemOutput, KeysAndAttributes, PutItemInput, PutItemOutput, QueryInput,
    QueryOutput, TransactWriteItem, TransactWriteItemsInput, TransactWriteItemsOutput,
    UpdateItemInput, UpdateItemOutput,
};
use dynamodb_single_table_core::{
    AttributeValue, DynamoDbClient, GlobalIndex, GlobalSecondaryIndex, InversePrimaryIndex, Item,
    KeySchema, PrimaryGlobalIndex, ServiceError,
};

mod expression;
mod table;

use crate::expression::{condition_holds, parse_key_condition, project};
use crate::table::{StorageKey, TableState};

/// Most keys a single `BatchGetItem` call may request.
pub const MAX_BATCH_GET_KEYS: usize = 100;
/// Most operations a single `TransactWriteItems` call may hold.
pub const MAX_TRANSACT_ITEMS: usize = 100;

mod code {
    pub(super) const CONDITIONAL_CHECK_FAILED: &str = "ConditionalCheckFailedException";
    pub(super) const RESOURCE_NOT_FOUND: &str = "ResourceNotFoundException";
    pub(super) const TRANSACTION_CANCELED: &str = "TransactionCanceledException";
    pub(super) const VALIDATION: &str = "ValidationException";
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<String, TableState>,
    failures: VecDeque<ServiceError>,
    batch_get_limit: Option<usize>,
}

impl State {
    fn take_failure(&mut self, operation: &str) -> Result<(), ServiceError> {
        match self.failures.pop_front() {
            Some(mut err) => {
                debug!(operation, code = %err.code, "returning injected failure");
                err.operation_name = operation.to_string();
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn table(&self, operation: &str, name: &str) -> Result<&TableState, ServiceError> {
        self.tables
            .get(name)
            .ok_or_else(|| resource_not_found(operation))
    }

    fn table_mut(&mut self, operation: &str, name: &str) -> Result<&mut TableState, ServiceError> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| resource_not_found(operation))
    }
}

fn resource_not_found(operation: &str) -> ServiceError {
    ServiceError::new(
        code::RESOURCE_NOT_FOUND,
        "Requested resource not found",
        operation,
    )
}

fn validation(operation: &str, message: impl Into<String>) -> ServiceError {
    ServiceError::new(code::VALIDATION, message, operation)
}

fn conditional_check_failed(operation: &str) -> ServiceError {
    ServiceError::new(
        code::CONDITIONAL_CHECK_FAILED,
        "The conditional request failed",
        operation,
    )
}

/// An in-memory DynamoDB store.
///
/// The store is internally synchronized and can be shared between threads
/// behind an `Arc`.
#[derive(Debug, Default)]
pub struct LocalDynamoDb {
    state: Mutex<State>,
}

impl LocalDynamoDb {
    /// Creates a store without tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with one single-table design table: `PK`/`SK` and the
    /// inverse index `GSI_1`.
    pub fn with_single_table(name: impl Into<String>) -> Self {
        let store = Self::new();
        let name = name.into();
        store.create_table(name.clone(), &PrimaryGlobalIndex);
        if let Some(table) = store.state.lock().tables.get_mut(&name) {
            add_index(table, &InversePrimaryIndex);
        }
        store
    }

    /// Creates an empty table, replacing any table with the same name.
    pub fn create_table(&self, name: impl Into<String>, primary_index: &dyn GlobalIndex) {
        self.state
            .lock()
            .tables
            .insert(name.into(), TableState::new(KeySchema::of(primary_index)));
    }

    /// Adds a global secondary index to an existing table.
    pub fn create_index(
        &self,
        table: &str,
        index: &dyn GlobalSecondaryIndex,
    ) -> Result<(), ServiceError> {
        let mut state = self.state.lock();
        add_index(state.table_mut("UpdateTable", table)?, index);
        Ok(())
    }

    /// Limits how many keys a `BatchGetItem` call processes. The rest are
    /// returned as unprocessed keys.
    pub fn set_batch_get_limit(&self, limit: Option<usize>) {
        self.state.lock().batch_get_limit = limit;
    }

    /// Makes the next request fail with `error`, without touching any table.
    ///
    /// Failures queue up and are returned in order. The operation name is set
    /// to that of the failing request.
    pub fn fail_next(&self, error: ServiceError) {
        self.state.lock().failures.push_back(error);
    }

    /// Returns a stored item by the raw values of its key attributes.
    pub fn item(&self, table: &str, partition_key: &str, sort_key: &str) -> Option<Item> {
        let state = self.state.lock();
        let key = (partition_key.to_string(), sort_key.to_string());
        state.tables.get(table)?.items.get(&key).cloned()
    }

    /// Number of items in a table, zero if the table does not exist.
    pub fn item_count(&self, table: &str) -> usize {
        self.state
            .lock()
            .tables
            .get(table)
            .map_or(0, |t| t.items.len())
    }
}

fn add_index(table: &mut TableState, index: &dyn GlobalSecondaryIndex) {
    table
        .indices
        .insert(index.name().to_string(), KeySchema::of(index));
}

/// A single write, validated and ready to apply.
enum Write {
    Put(StorageKey, Item),
    Update(StorageKey, Vec<(String, Option<AttributeValue>)>),
    Delete(StorageKey),
}

fn prepare_put(
    operation: &str,
    table: &TableState,
    input: &PutItemInput,
) -> Result<(Write, Option<String>), ServiceError> {
    let key = table
        .storage_key(&input.item)
        .map_err(|m| validation(operation, m))?;
    Ok((
        Write::Put(key, input.item.clone()),
        input.condition_expression.clone(),
    ))
}

fn prepare_update(
    operation: &str,
    table: &TableState,
    input: &UpdateItemInput,
) -> Result<Write, ServiceError> {
    let key = table
        .key_of(&input.key)
        .map_err(|m| validation(operation, m))?;
    let mut updates = Vec::with_capacity(input.attribute_updates.len());
    for (name, update) in &input.attribute_updates {
        if table.is_key_attribute(name) {
            return Err(validation(
                operation,
                format!(
                    "One or more parameter values were invalid: Cannot update attribute {}. \
                     This attribute is part of the key",
                    name
                ),
            ));
        }
        match (update.action, &update.value) {
            (AttributeAction::Put, Some(value)) => {
                updates.push((name.clone(), Some(value.clone())))
            }
            (AttributeAction::Put, None) => {
                return Err(validation(
                    operation,
                    format!(
                        "One or more parameter values were invalid: \
                         Only DELETE action is allowed when no attribute value is specified: {}",
                        name
                    ),
                ))
            }
            (AttributeAction::Delete, _) => updates.push((name.clone(), None)),
        }
    }
    Ok(Write::Update(key, updates))
}

fn prepare_delete(
    operation: &str,
    table: &TableState,
    input: &DeleteItemInput,
) -> Result<(Write, Option<String>), ServiceError> {
    let key = table
        .key_of(&input.key)
        .map_err(|m| validation(operation, m))?;
    Ok((Write::Delete(key), input.condition_expression.clone()))
}

impl Write {
    fn key(&self) -> &StorageKey {
        match self {
            Write::Put(key, _) | Write::Update(key, _) | Write::Delete(key) => key,
        }
    }

    fn apply(self, table: &mut TableState) {
        match self {
            Write::Put(key, item) => {
                table.items.insert(key, item);
            }
            Write::Update(key, updates) => {
                let key_item = table.key_item(&key);
                let item = table.items.entry(key).or_insert(key_item);
                for (name, value) in updates {
                    match value {
                        Some(value) => {
                            item.insert(name, value);
                        }
                        None => {
                            item.remove(&name);
                        }
                    }
                }
            }
            Write::Delete(key) => {
                table.items.remove(&key);
            }
        }
    }
}

fn check_condition(
    operation: &str,
    table: &TableState,
    key: &StorageKey,
    condition: Option<&str>,
) -> Result<bool, ServiceError> {
    condition_holds(condition, table.items.get(key)).map_err(|m| validation(operation, m))
}

impl DynamoDbClient for LocalDynamoDb {
    fn get_item(&self, input: GetItemInput) -> Result<GetItemOutput, ServiceError> {
        const OP: &str = "GetItem";
        let mut state = self.state.lock();
        state.take_failure(OP)?;
        let table = state.table(OP, &input.table_name)?;
        let key = table.key_of(&input.key).map_err(|m| validation(OP, m))?;
        let item = match table.items.get(&key) {
            Some(item) => Some(
                project(item, input.projection_expression.as_deref(), &HashMap::new())
                    .map_err(|m| validation(OP, m))?,
            ),
            None => None,
        };
        Ok(GetItemOutput { item })
    }

    fn put_item(&self, input: PutItemInput) -> Result<PutItemOutput, ServiceError> {
        const OP: &str = "PutItem";
        let mut state = self.state.lock();
        state.take_failure(OP)?;
        let table = state.table_mut(OP, &input.table_name)?;
        let (write, condition) = prepare_put(OP, table, &input)?;
        if !check_condition(OP, table, write.key(), condition.as_deref())? {
            return Err(conditional_check_failed(OP));
        }
        write.apply(table);
        Ok(PutItemOutput::default())
    }

    fn update_item(&self, input: UpdateItemInput) -> Result<UpdateItemOutput, ServiceError> {
        const OP: &str = "UpdateItem";
        let mut state = self.state.lock();
        state.take_failure(OP)?;
        let table = state.table_mut(OP, &input.table_name)?;
        prepare_update(OP, table, &input)?.apply(table);
        Ok(UpdateItemOutput::default())
    }

    fn delete_item(&self, input: DeleteItemInput) -> Result<DeleteItemOutput, ServiceError> {
        const OP: &str = "DeleteItem";
        let mut state = self.state.lock();
        state.take_failure(OP)?;
        let table = state.table_mut(OP, &input.table_name)?;
        let (write, condition) = prepare_delete(OP, table, &input)?;
        if !check_condition(OP, table, write.key(), condition.as_deref())? {
            return Err(conditional_check_failed(OP));
        }
        write.apply(table);
        Ok(DeleteItemOutput::default())
    }

    fn query(&self, input: QueryInput) -> Result<QueryOutput, ServiceError> {
        const OP: &str = "Query";
        let mut state = self.state.lock();
        state.take_failure(OP)?;
        let table = state.table(OP, &input.table_name)?;
        let schema = table
            .index(input.index_name.as_deref())
            .map_err(|m| validation(OP, m))?;
        let clauses = parse_key_condition(
            &input.key_condition_expression,
            &input.expression_attribute_names,
            &input.expression_attribute_values,
        )
        .map_err(|m| validation(OP, m))?;
        let matched = table.query(schema, &clauses).map_err(|m| validation(OP, m))?;

        let limit = input.limit.map_or(usize::MAX, |l| l as usize);
        if limit == 0 {
            return Err(validation(
                OP,
                "1 validation error detected: Value '0' at 'limit' failed to satisfy constraint",
            ));
        }
        let truncated = matched.len() > limit;
        let page = &matched[..matched.len().min(limit)];
        let last_evaluated_key = match page.last() {
            Some(last) if truncated => {
                let mut key = table
                    .key_item(&table.storage_key(last).map_err(|m| validation(OP, m))?);
                for name in [schema.partition_key(), schema.sort_key()] {
                    if let Some(value) = last.get(name) {
                        key.insert(name.to_string(), value.clone());
                    }
                }
                Some(key)
            }
            _ => None,
        };
        let items = page
            .iter()
            .map(|item| {
                project(
                    item,
                    input.projection_expression.as_deref(),
                    &input.expression_attribute_names,
                )
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|m| validation(OP, m))?;
        Ok(QueryOutput {
            count: items.len() as u32,
            items,
            last_evaluated_key,
        })
    }

    fn batch_get_item(&self, input: BatchGetItemInput) -> Result<BatchGetItemOutput, ServiceError> {
        const OP: &str = "BatchGetItem";
        let mut state = self.state.lock();
        state.take_failure(OP)?;
        let requested: usize = input.request_items.values().map(|r| r.keys.len()).sum();
        if requested > MAX_BATCH_GET_KEYS {
            return Err(validation(
                OP,
                format!(
                    "Too many items requested for the BatchGetItem call: {} > {}",
                    requested, MAX_BATCH_GET_KEYS
                ),
            ));
        }

        let mut budget = state.batch_get_limit.unwrap_or(usize::MAX);
        let mut output = BatchGetItemOutput::default();
        for (table_name, request) in &input.request_items {
            let table = state.table(OP, table_name)?;
            let mut seen = HashSet::new();
            let mut unprocessed = Vec::new();
            for key in &request.keys {
                let storage_key = table.key_of(key).map_err(|m| validation(OP, m))?;
                if !seen.insert(storage_key.clone()) {
                    return Err(validation(OP, "Provided list of item keys contains duplicates"));
                }
                if budget == 0 {
                    unprocessed.push(key.clone());
                    continue;
                }
                budget -= 1;
                if let Some(item) = table.items.get(&storage_key) {
                    let projection = request.projection_expression.as_deref();
                    let item = project(item, projection, &HashMap::new())
                        .map_err(|m| validation(OP, m))?;
                    output
                        .responses
                        .entry(table_name.clone())
                        .or_default()
                        .push(item);
                }
            }
            if !unprocessed.is_empty() {
                debug!(table = %table_name, count = unprocessed.len(), "leaving keys unprocessed");
                output.unprocessed_keys.insert(
                    table_name.clone(),
                    KeysAndAttributes {
                        keys: unprocessed,
                        projection_expression: request.projection_expression.clone(),
                        consistent_read: request.consistent_read,
                    },
                );
            }
        }
        Ok(output)
    }

    fn transact_write_items(
        &self,
        input: TransactWriteItemsInput,
    ) -> Result<TransactWriteItemsOutput, ServiceError> {
        const OP: &str = "TransactWriteItems";
        let mut state = self.state.lock();
        state.take_failure(OP)?;
        if input.transact_items.is_empty() || input.transact_items.len() > MAX_TRANSACT_ITEMS {
            return Err(validation(
                OP,
                format!(
                    "Member must have length between 1 and {}",
                    MAX_TRANSACT_ITEMS
                ),
            ));
        }

        let mut writes = Vec::with_capacity(input.transact_items.len());
        let mut seen = HashSet::new();
        for entry in &input.transact_items {
            let table_name = entry.table_name();
            let table = state.table(OP, table_name)?;
            let (write, condition) = match entry {
                TransactWriteItem::Put(put) => prepare_put(OP, table, put)?,
                TransactWriteItem::Update(update) => (prepare_update(OP, table, update)?, None),
                TransactWriteItem::Delete(delete) => prepare_delete(OP, table, delete)?,
            };
            if !seen.insert((table_name.to_string(), write.key().clone())) {
                return Err(validation(
                    OP,
                    "Transaction request cannot include multiple operations on one item",
                ));
            }
            let passed = check_condition(OP, table, write.key(), condition.as_deref())?;
            writes.push((table_name.to_string(), write, passed));
        }

        if writes.iter().any(|(_, _, passed)| !passed) {
            let reasons = writes
                .iter()
                .map(|(_, _, passed)| if *passed { "None" } else { "ConditionalCheckFailed" })
                .collect::<Vec<_>>()
                .join(", ");
            debug!(reasons = %reasons, "canceling transaction");
            return Err(ServiceError::new(
                code::TRANSACTION_CANCELED,
                format!(
                    "Transaction cancelled, please refer cancellation reasons for specific \
                     reasons [{}]",
                    reasons
                ),
                OP,
            ));
        }
        for (table_name, write, _) in writes {
            // Every table was looked up above under the same lock.
            if let Some(table) = state.tables.get_mut(&table_name) {
                write.apply(table);
            }
        }
        Ok(TransactWriteItemsOutput::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynamodb_single_table_core::model::AttributeValueUpdate;
    use dynamodb_single_table_expressions::{Key, KeyCondition};
    use pretty_assertions::assert_eq;

    const TABLE: &str = "App";

    fn item(pairs: &[(&str, &str)]) -> Item {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), AttributeValue::S(v.to_string())))
            .collect()
    }

    fn put(store: &LocalDynamoDb, pairs: &[(&str, &str)]) {
        store
            .put_item(PutItemInput {
                table_name: TABLE.into(),
                item: item(pairs),
                condition_expression: None,
            })
            .unwrap();
    }

    fn query(
        store: &LocalDynamoDb,
        condition: KeyCondition,
        index: Option<&str>,
        limit: Option<u32>,
    ) -> QueryOutput {
        let built = condition.build().unwrap();
        store
            .query(QueryInput {
                table_name: TABLE.into(),
                index_name: index.map(str::to_string),
                key_condition_expression: built.expression,
                expression_attribute_names: built.names,
                expression_attribute_values: built.values,
                limit,
                ..Default::default()
            })
            .unwrap()
    }

    #[test]
    fn insert_guard() {
        let store = LocalDynamoDb::with_single_table(TABLE);
        let insert = || PutItemInput {
            table_name: TABLE.into(),
            item: item(&[("PK", "USER#a"), ("SK", "USER#a")]),
            condition_expression: Some("attribute_not_exists(PK)".into()),
        };
        store.put_item(insert()).unwrap();
        let err = store.put_item(insert()).unwrap_err();
        assert_eq!(err.code, "ConditionalCheckFailedException");
        assert_eq!(err.operation_name, "PutItem");
        assert_eq!(store.item_count(TABLE), 1);
    }

    #[test]
    fn unknown_table() {
        let store = LocalDynamoDb::new();
        let err = store
            .delete_item(DeleteItemInput {
                table_name: TABLE.into(),
                key: item(&[("PK", "a"), ("SK", "b")]),
                condition_expression: None,
            })
            .unwrap_err();
        assert_eq!(err.code, "ResourceNotFoundException");
    }

    #[test]
    fn strict_delete_requires_item() {
        let store = LocalDynamoDb::with_single_table(TABLE);
        let delete = || DeleteItemInput {
            table_name: TABLE.into(),
            key: item(&[("PK", "a"), ("SK", "b")]),
            condition_expression: Some("attribute_exists(PK)".into()),
        };
        assert_eq!(
            store.delete_item(delete()).unwrap_err().code,
            "ConditionalCheckFailedException"
        );
        put(&store, &[("PK", "a"), ("SK", "b")]);
        store.delete_item(delete()).unwrap();
        assert_eq!(store.item(TABLE, "a", "b"), None);
    }

    #[test]
    fn update_creates_and_removes_attributes() {
        let store = LocalDynamoDb::with_single_table(TABLE);
        let mut updates = HashMap::new();
        updates.insert(
            "Name".to_string(),
            AttributeValueUpdate::put(AttributeValue::S("Bob".into())),
        );
        store
            .update_item(UpdateItemInput {
                table_name: TABLE.into(),
                key: item(&[("PK", "a"), ("SK", "b")]),
                attribute_updates: updates,
            })
            .unwrap();
        assert_eq!(
            store.item(TABLE, "a", "b"),
            Some(item(&[("PK", "a"), ("SK", "b"), ("Name", "Bob")]))
        );

        let mut updates = HashMap::new();
        updates.insert(
            "Name".to_string(),
            AttributeValueUpdate {
                action: AttributeAction::Delete,
                value: None,
            },
        );
        store
            .update_item(UpdateItemInput {
                table_name: TABLE.into(),
                key: item(&[("PK", "a"), ("SK", "b")]),
                attribute_updates: updates,
            })
            .unwrap();
        assert_eq!(store.item(TABLE, "a", "b"), Some(item(&[("PK", "a"), ("SK", "b")])));
    }

    #[test]
    fn update_rejects_key_attributes() {
        let store = LocalDynamoDb::with_single_table(TABLE);
        let mut updates = HashMap::new();
        updates.insert(
            "SK".to_string(),
            AttributeValueUpdate::put(AttributeValue::S("x".into())),
        );
        let err = store
            .update_item(UpdateItemInput {
                table_name: TABLE.into(),
                key: item(&[("PK", "a"), ("SK", "b")]),
                attribute_updates: updates,
            })
            .unwrap_err();
        assert_eq!(err.code, "ValidationException");
    }

    #[test]
    fn query_orders_and_limits() {
        let store = LocalDynamoDb::with_single_table(TABLE);
        for sk in ["ORDER#3", "ORDER#1", "ORDER#2", "PROFILE#a"] {
            put(&store, &[("PK", "USER#a"), ("SK", sk)]);
        }
        put(&store, &[("PK", "USER#b"), ("SK", "ORDER#9")]);

        let all = query(
            &store,
            Key::new("PK").eq("USER#a") & Key::new("SK").begins_with("ORDER#"),
            None,
            None,
        );
        let sort_keys: Vec<_> = all.items.iter().map(|i| i["SK"].as_s().unwrap()).collect();
        assert_eq!(sort_keys, ["ORDER#1", "ORDER#2", "ORDER#3"]);
        assert_eq!(all.count, 3);
        assert_eq!(all.last_evaluated_key, None);

        let page = query(&store, Key::new("PK").eq("USER#a").into(), None, Some(2));
        assert_eq!(page.count, 2);
        assert_eq!(
            page.last_evaluated_key,
            Some(item(&[("PK", "USER#a"), ("SK", "ORDER#2")]))
        );
    }

    #[test]
    fn query_inverse_index() {
        let store = LocalDynamoDb::with_single_table(TABLE);
        put(&store, &[("PK", "USER#a"), ("SK", "ORDER#1")]);
        put(&store, &[("PK", "USER#b"), ("SK", "ORDER#1")]);
        put(&store, &[("PK", "USER#b"), ("SK", "ORDER#2")]);
        let out = query(&store, Key::new("SK").eq("ORDER#1").into(), Some("GSI_1"), None);
        let owners: Vec<_> = out.items.iter().map(|i| i["PK"].as_s().unwrap()).collect();
        assert_eq!(owners, ["USER#a", "USER#b"]);

        let built = KeyCondition::from(Key::new("SK").eq("ORDER#1")).build().unwrap();
        let err = store
            .query(QueryInput {
                table_name: TABLE.into(),
                index_name: Some("GSI_9".into()),
                key_condition_expression: built.expression,
                expression_attribute_names: built.names,
                expression_attribute_values: built.values,
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.code, "ValidationException");
    }

    #[test]
    fn query_needs_partition_equality() {
        let store = LocalDynamoDb::with_single_table(TABLE);
        let mut values = HashMap::new();
        values.insert(":v0".to_string(), AttributeValue::S("ORDER#".into()));
        let err = store
            .query(QueryInput {
                table_name: TABLE.into(),
                key_condition_expression: "begins_with(SK, :v0)".into(),
                expression_attribute_values: values,
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.message, "Query condition missed key schema element");
    }

    #[test]
    fn batch_get_respects_limit() {
        let store = LocalDynamoDb::with_single_table(TABLE);
        put(&store, &[("PK", "a"), ("SK", "1"), ("Name", "x")]);
        put(&store, &[("PK", "a"), ("SK", "2")]);
        store.set_batch_get_limit(Some(1));

        let mut request_items = HashMap::new();
        request_items.insert(
            TABLE.to_string(),
            KeysAndAttributes {
                keys: vec![item(&[("PK", "a"), ("SK", "1")]), item(&[("PK", "a"), ("SK", "2")])],
                projection_expression: Some("PK,SK".into()),
                consistent_read: true,
            },
        );
        let out = store.batch_get_item(BatchGetItemInput { request_items }).unwrap();
        assert_eq!(out.responses[TABLE], vec![item(&[("PK", "a"), ("SK", "1")])]);
        let unprocessed = &out.unprocessed_keys[TABLE];
        assert_eq!(unprocessed.keys, vec![item(&[("PK", "a"), ("SK", "2")])]);
        assert!(unprocessed.consistent_read);
    }

    #[test]
    fn transactions_are_atomic() {
        let store = LocalDynamoDb::with_single_table(TABLE);
        put(&store, &[("PK", "a"), ("SK", "a")]);
        let input = TransactWriteItemsInput {
            transact_items: vec![
                TransactWriteItem::Put(PutItemInput {
                    table_name: TABLE.into(),
                    item: item(&[("PK", "a"), ("SK", "a")]),
                    condition_expression: Some("attribute_not_exists(PK)".into()),
                }),
                TransactWriteItem::Put(PutItemInput {
                    table_name: TABLE.into(),
                    item: item(&[("PK", "b"), ("SK", "b")]),
                    condition_expression: None,
                }),
            ],
        };
        let err = store.transact_write_items(input).unwrap_err();
        assert_eq!(err.code, "TransactionCanceledException");
        assert_eq!(
            err.message,
            "Transaction cancelled, please refer cancellation reasons for specific reasons \
             [ConditionalCheckFailed, None]"
        );
        assert_eq!(store.item(TABLE, "b", "b"), None);
    }

    #[test]
    fn transactions_reject_duplicate_items() {
        let store = LocalDynamoDb::with_single_table(TABLE);
        let delete = || {
            TransactWriteItem::Delete(DeleteItemInput {
                table_name: TABLE.into(),
                key: item(&[("PK", "a"), ("SK", "a")]),
                condition_expression: None,
            })
        };
        let err = store
            .transact_write_items(TransactWriteItemsInput {
                transact_items: vec![delete(), delete()],
            })
            .unwrap_err();
        assert_eq!(err.code, "ValidationException");
    }

    #[test]
    fn injected_failures_come_first() {
        let store = LocalDynamoDb::with_single_table(TABLE);
        store.fail_next(ServiceError::new("ThrottlingException", "slow down", ""));
        let err = store
            .get_item(GetItemInput {
                table_name: TABLE.into(),
                key: item(&[("PK", "a"), ("SK", "a")]),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.code, "ThrottlingException");
        assert_eq!(err.operation_name, "GetItem");
        let out = store
            .get_item(GetItemInput {
                table_name: TABLE.into(),
                key: item(&[("PK", "a"), ("SK", "a")]),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(out.item, None);
    }
}
