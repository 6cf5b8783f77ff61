/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The remote store client seam.

use std::fmt;
use std::sync::Arc;

use crate::model::{
    BatchGetItemInput, BatchGetItemOutput, DeleteItemInput, DeleteItemOutput, GetItemInput,
    GetItemOutput, PutItemInput, PutItemOutput, QueryInput, QueryOutput, TransactWriteItemsInput,
    TransactWriteItemsOutput, UpdateItemInput, UpdateItemOutput,
};

/// An error returned by the store, as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// Machine readable error code, e.g. `ConditionalCheckFailedException`.
    pub code: String,
    /// Human readable message.
    pub message: String,
    /// The operation that failed, e.g. `PutItem`.
    pub operation_name: String,
}

impl ServiceError {
    /// Creates a service error.
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        operation_name: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            operation_name: operation_name.into(),
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed with {}", self.operation_name, self.code)?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ServiceError {}

/// Synchronous access to the store's item operations.
pub trait DynamoDbClient {
    /// Reads a single item.
    fn get_item(&self, input: GetItemInput) -> Result<GetItemOutput, ServiceError>;

    /// Creates or replaces an item.
    fn put_item(&self, input: PutItemInput) -> Result<PutItemOutput, ServiceError>;

    /// Updates attributes of an item, creating it if needed.
    fn update_item(&self, input: UpdateItemInput) -> Result<UpdateItemOutput, ServiceError>;

    /// Deletes an item.
    fn delete_item(&self, input: DeleteItemInput) -> Result<DeleteItemOutput, ServiceError>;

    /// Reads the items matching a key condition.
    fn query(&self, input: QueryInput) -> Result<QueryOutput, ServiceError>;

    /// Reads several items by primary key.
    fn batch_get_item(&self, input: BatchGetItemInput)
        -> Result<BatchGetItemOutput, ServiceError>;

    /// Applies several writes atomically.
    fn transact_write_items(
        &self,
        input: TransactWriteItemsInput,
    ) -> Result<TransactWriteItemsOutput, ServiceError>;
}

macro_rules! forward_client {
    ($($ty:ty),*) => {
        $(
            impl<T: DynamoDbClient + ?Sized> DynamoDbClient for $ty {
                fn get_item(&self, input: GetItemInput) -> Result<GetItemOutput, ServiceError> {
                    (**self).get_item(input)
                }

                fn put_item(&self, input: PutItemInput) -> Result<PutItemOutput, ServiceError> {
                    (**self).put_item(input)
                }

                fn update_item(
                    &self,
                    input: UpdateItemInput,
                ) -> Result<UpdateItemOutput, ServiceError> {
                    (**self).update_item(input)
                }

                fn delete_item(
                    &self,
                    input: DeleteItemInput,
                ) -> Result<DeleteItemOutput, ServiceError> {
                    (**self).delete_item(input)
                }

                fn query(&self, input: QueryInput) -> Result<QueryOutput, ServiceError> {
                    (**self).query(input)
                }

                fn batch_get_item(
                    &self,
                    input: BatchGetItemInput,
                ) -> Result<BatchGetItemOutput, ServiceError> {
                    (**self).batch_get_item(input)
                }

                fn transact_write_items(
                    &self,
                    input: TransactWriteItemsInput,
                ) -> Result<TransactWriteItemsOutput, ServiceError> {
                    (**self).transact_write_items(input)
                }
            }
        )*
    };
}

forward_client!(&T, Box<T>, Arc<T>);
