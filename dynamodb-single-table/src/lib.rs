/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Typed single-table access layer for DynamoDB.
//!
//! Every item lives in one table whose keys carry an entity prefix, e.g.
//! `USER#alice`. Entity kinds are marker types implementing [`EntityName`],
//! usually through the derive macro. Operations are described by argument
//! builders ([`GetArg`], [`PutArg`], [`InsertArg`], [`UpdateArg`],
//! [`DeleteArg`], [`QueryArg`]) and executed through a [`Table`], which strips
//! entity prefixes from the items it returns.
//!
//! # Example
//!
//! ```ignore
//! use dynamodb_single_table::{
//!     EntityName, GetArg, InsertArg, PartitionKey, SortKey, Table, TableConfig,
//! };
//!
//! #[derive(EntityName)]
//! struct User;
//!
//! let table = Table::new(TableConfig::from_env()?, client);
//! let pk = PartitionKey::new::<User>("alice");
//! let sk = SortKey::new::<User>("alice");
//! table.insert(InsertArg::new(pk.clone(), sk.clone()).attribute("Email", "alice@example.com"))?;
//!
//! let user = table.get(GetArg::new(pk, sk))?.expect("just inserted");
//! assert_eq!(user.get_str("PK"), Some("alice"));
//! ```

#![warn(missing_docs)]

extern crate self as dynamodb_single_table;

pub mod config;
pub mod error;
mod item;
pub mod op_args;
mod table;
mod transaction;

pub use dynamodb_single_table_core::*;
pub use dynamodb_single_table_macros::EntityName;

/// Key-condition expression builders.
pub mod expressions {
    pub use dynamodb_single_table_expressions::*;
}

pub use config::{ConfigError, TableConfig};
pub use error::{DatabaseError, Error, ErrorKind};
pub use item::{remove_entity_prefix, strip_prefixes, ItemResult};
pub use op_args::{
    DeleteArg, GetArg, InsertArg, OpArg, PutArg, QueryArg, QueryOptions, UpdateArg, WriteOp,
    CREATED_AT, MAX_QUERY_LIMIT, UPDATED_AT,
};
pub use table::{BatchGetResult, Table};
pub use transaction::{CancellationReasons, ReasonsMismatch, TransactionCanceled};
