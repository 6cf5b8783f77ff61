/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Type-safe key-condition expression builders.
//!
//! Conditions are assembled from [`Key`] clauses joined with `&`, then
//! rendered with generated `#n`/`:v` placeholders so that attribute names and
//! values travel in separate maps.
//!
//! ```
//! use dynamodb_single_table_expressions::Key;
//!
//! let built = (Key::new("PK").eq("USER#a") & Key::new("SK").begins_with("ORDER#"))
//!     .build()
//!     .unwrap();
//! assert_eq!(built.expression, "(#n0 = :v0 AND begins_with(#n1, :v1))");
//! ```

#![warn(missing_docs)]

mod error;
mod key_condition;

pub use error::{ExpressionError, ExpressionErrorKind};
pub use key_condition::{BuiltKeyCondition, Comparison, Key, KeyCondition};
