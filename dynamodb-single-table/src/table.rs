/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The table facade.

use std::collections::HashMap;
use std::fmt;

use once_cell::unsync::Lazy;
use tracing::{debug, debug_span};

use dynamodb_single_table_core::model::{
    BatchGetItemInput, KeysAndAttributes, TransactWriteItemsInput,
};
use dynamodb_single_table_core::{
    DynamoDbClient, GlobalIndex, PartitionKey, PrefixSortKey, PrimaryKey, ServiceError,
};
use dynamodb_single_table_expressions::Key;

use crate::config::TableConfig;
use crate::error::{DatabaseError, Error, ErrorKind};
use crate::item::ItemResult;
use crate::op_args::{
    batch_projection, serialize_keys, DeleteArg, GetArg, InsertArg, OpArg, PutArg, QueryArg,
    QueryOptions, UpdateArg, WriteOp,
};
use crate::transaction::TransactionCanceled;

const TRANSACTION_CANCELED: &str = "TransactionCanceledException";

/// Result of [`Table::batch_get`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchGetResult {
    /// The items that were read, in no particular order.
    pub items: Vec<ItemResult>,
    /// Requested keys the store did not process. They are not retried.
    pub unprocessed_keys: Vec<PrimaryKey>,
}

type Connector<C> = Box<dyn FnOnce() -> C>;

/// A single-table design on top of a [`DynamoDbClient`].
///
/// The client is created on first use. A `Table` is not `Sync`; create one
/// per thread of execution.
pub struct Table<C> {
    config: TableConfig,
    client: Lazy<C, Connector<C>>,
}

impl<C> fmt::Debug for Table<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("config", &self.config)
            .field("connected", &Lazy::get(&self.client).is_some())
            .finish()
    }
}

impl<C: DynamoDbClient + 'static> Table<C> {
    /// Creates a table using an existing client.
    pub fn new(config: TableConfig, client: C) -> Self {
        Self::with_connector(config, move || client)
    }

    /// Creates a table whose client is built on the first request.
    pub fn with_connector(config: TableConfig, connect: impl FnOnce() -> C + 'static) -> Self {
        Self {
            config,
            client: Lazy::new(Box::new(connect)),
        }
    }
}

impl<C: DynamoDbClient> Table<C> {
    /// The table name.
    pub fn table_name(&self) -> &str {
        self.config.table_name()
    }

    /// The primary index of the table.
    pub fn primary_index(&self) -> &dyn GlobalIndex {
        self.config.primary_index()
    }

    /// The client, connecting it if needed.
    pub fn client(&self) -> &C {
        Lazy::force(&self.client)
    }

    fn dispatch<T>(
        &self,
        operation: &'static str,
        call: impl FnOnce(&C) -> Result<T, ServiceError>,
    ) -> Result<T, Error> {
        let span = debug_span!("dynamodb", operation, table = self.table_name());
        let _guard = span.enter();
        call(self.client()).map_err(|err| {
            debug!(code = %err.code, message = %err.message, "request failed");
            Error::Database(DatabaseError::new(err))
        })
    }

    /// Reads an item by key. Returns `None` if it does not exist.
    pub fn get(&self, arg: GetArg) -> Result<Option<ItemResult>, Error> {
        let input = arg.to_input(self.table_name(), self.primary_index())?;
        let output = self.dispatch("GetItem", |c| c.get_item(input))?;
        match output.item {
            Some(item) if !item.is_empty() => ItemResult::from_wire(item).map(Some),
            _ => Ok(None),
        }
    }

    /// Creates or replaces an item.
    pub fn put(&self, arg: PutArg) -> Result<(), Error> {
        let input = arg.to_input(self.table_name(), self.primary_index())?;
        self.dispatch("PutItem", |c| c.put_item(input))?;
        Ok(())
    }

    /// Creates an item. Fails with [`ErrorKind::ConditionalCheckFailed`] if
    /// an item with the same key exists.
    pub fn insert(&self, arg: InsertArg) -> Result<(), Error> {
        let input = arg.to_input(self.table_name(), self.primary_index())?;
        self.dispatch("PutItem", |c| c.put_item(input))?;
        Ok(())
    }

    /// Overwrites or creates the given attributes, creating the item if needed.
    pub fn update_attributes(&self, arg: UpdateArg) -> Result<(), Error> {
        let input = arg.to_input(self.table_name(), self.primary_index())?;
        self.dispatch("UpdateItem", |c| c.update_item(input))?;
        Ok(())
    }

    /// Deletes an item.
    pub fn delete(&self, arg: DeleteArg) -> Result<(), Error> {
        let input = arg.to_input(self.table_name(), self.primary_index())?;
        self.dispatch("DeleteItem", |c| c.delete_item(input))?;
        Ok(())
    }

    /// Reads the items matching a key condition. Only the first page is returned.
    pub fn query(&self, arg: QueryArg) -> Result<Vec<ItemResult>, Error> {
        let input = arg.to_input(self.table_name(), self.primary_index())?;
        let output = self.dispatch("Query", |c| c.query(input))?;
        output.items.into_iter().map(ItemResult::from_wire).collect()
    }

    /// Reads the items in a partition whose sort key starts with `sk`.
    ///
    /// Without explicit attributes, only the sort key of the queried index is returned.
    pub fn query_prefix(
        &self,
        pk: &PartitionKey,
        sk: &PrefixSortKey,
        options: QueryOptions,
    ) -> Result<Vec<ItemResult>, Error> {
        let (pk_name, sk_name) = match options.secondary_index() {
            Some(index) => (index.partition_key().to_string(), index.sort_key().to_string()),
            None => (
                self.primary_index().partition_key().to_string(),
                self.primary_index().sort_key().to_string(),
            ),
        };
        let options = if options.has_attributes() {
            options
        } else {
            options.attributes([sk_name.clone()])
        };
        let condition = Key::new(pk_name).eq(pk) & Key::new(sk_name).begins_with(sk);
        self.query(QueryArg::new(condition, options)?)
    }

    /// Reads several items by key in one request.
    ///
    /// The key attributes are always returned so that items can be matched to
    /// keys. Keys the store did not process are reported, not retried.
    pub fn batch_get<'a, I>(
        &self,
        keys: I,
        attributes: &[String],
        consistent: bool,
    ) -> Result<BatchGetResult, Error>
    where
        I: IntoIterator<Item = &'a PrimaryKey>,
    {
        let keys: Vec<&PrimaryKey> = keys.into_iter().collect();
        if keys.is_empty() {
            return Ok(BatchGetResult::default());
        }
        let index = self.primary_index();
        let by_string: HashMap<(String, String), &PrimaryKey> =
            keys.iter().map(|k| (k.to_string_pair(), *k)).collect();

        let mut request_items = HashMap::new();
        request_items.insert(
            self.table_name().to_string(),
            KeysAndAttributes {
                keys: serialize_keys(keys.iter().copied(), index),
                projection_expression: Some(batch_projection(attributes, index)),
                consistent_read: consistent,
            },
        );
        let mut output = self.dispatch("BatchGetItem", |c| {
            c.batch_get_item(BatchGetItemInput { request_items })
        })?;

        let items = output
            .responses
            .remove(self.table_name())
            .unwrap_or_default()
            .into_iter()
            .map(ItemResult::from_wire)
            .collect::<Result<Vec<_>, _>>()?;

        let unprocessed = output
            .unprocessed_keys
            .remove(self.table_name())
            .map(|k| k.keys)
            .unwrap_or_default();
        if !unprocessed.is_empty() {
            debug!(count = unprocessed.len(), "batch get left keys unprocessed");
        }
        let unprocessed_keys = unprocessed
            .iter()
            .map(|wire| {
                let pair = PrimaryKey::deserialize(wire, index)
                    .map_err(|e| Error::unexpected_response(format!("unprocessed key: {}", e)))?
                    .to_string_pair();
                by_string
                    .get(&pair)
                    .map(|key| (*key).clone())
                    .ok_or_else(|| {
                        Error::unexpected_response(format!(
                            "unprocessed key ({}, {}) was not requested",
                            pair.0, pair.1
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BatchGetResult {
            items,
            unprocessed_keys,
        })
    }

    /// Applies several writes atomically.
    ///
    /// If the store cancels the transaction, the error is
    /// [`Error::TransactionCanceled`], which can report the reason for each write.
    pub fn transact_write_items(&self, op_args: Vec<WriteOp>) -> Result<(), Error> {
        let transact_items = op_args
            .iter()
            .map(|op| op.to_transact_item(self.table_name(), self.primary_index()))
            .collect::<Result<Vec<_>, _>>()?;
        let input = TransactWriteItemsInput { transact_items };
        match self.dispatch("TransactWriteItems", |c| c.transact_write_items(input)) {
            Ok(_) => Ok(()),
            Err(Error::Database(err)) if err.code() == TRANSACTION_CANCELED => {
                let err = DatabaseError::with_kind(
                    ErrorKind::TransactionCanceled,
                    err.service_error().clone(),
                );
                Err(Error::TransactionCanceled(TransactionCanceled::new(
                    err, op_args,
                )))
            }
            Err(err) => Err(err),
        }
    }
}
