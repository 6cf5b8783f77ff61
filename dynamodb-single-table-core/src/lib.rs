/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Core types for single-table DynamoDB access.
//!
//! This crate provides the building blocks used by `dynamodb-single-table`:
//!
//! - [`Value`] and [`AttributeValue`] - generic values and their tagged wire form
//! - [`AttributeValueConvert`] - convert Rust values to/from wire attribute values
//! - [`PartitionKey`], [`SortKey`], [`PrefixSortKey`], [`PrimaryKey`] - entity-prefixed keys
//! - [`GlobalIndex`] and [`GlobalSecondaryIndex`] - index descriptors
//! - [`DynamoDbClient`] - the remote store seam, with the wire request/response [`model`]
//!
//! # Example
//!
//! ```
//! use dynamodb_single_table_core::{
//!     EntityName, PartitionKey, PrimaryGlobalIndex, PrimaryKey, SortKey,
//! };
//!
//! struct User;
//! impl EntityName for User {
//!     const NAME: &'static str = "User";
//! }
//!
//! let key = PrimaryKey::new(PartitionKey::new::<User>("alice"), SortKey::new::<User>("alice"));
//! let wire = key.serialize(&PrimaryGlobalIndex);
//! assert_eq!(wire["PK"].as_s(), Some("USER#alice"));
//! ```

#![warn(missing_docs)]

mod attribute_value;
pub mod client;
pub mod codec;
mod convert;
pub mod error;
pub mod index;
pub mod key;
pub mod model;
mod value;

pub use attribute_value::{AttributeValue, Item};
pub use client::{DynamoDbClient, ServiceError};
pub use codec::{deserialize_item, deserialize_value, serialize_item, serialize_value};
pub use convert::AttributeValueConvert;
pub use error::{ConversionError, ConversionErrorKind, KeyError};
pub use index::{
    GlobalIndex, GlobalSecondaryIndex, InversePrimaryIndex, KeySchema, PrimaryGlobalIndex,
};
pub use key::{EntityName, EntityPrefix, PartitionKey, PrefixSortKey, PrimaryKey, SortKey};
pub use value::{Attributes, Number, Value};
