/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Derive macros for the DynamoDB single-table access layer.
//!
//! This crate provides the `EntityName` derive macro, which turns a marker
//! type into an entity kind whose keys carry the `NAME#` prefix.

#![warn(missing_docs)]

use proc_macro::TokenStream;

mod entity_name;

/// Derives `EntityName` for a marker type.
///
/// The entity name defaults to the type name. Override it with
/// `#[entity(name = "...")]`. Names must be non-empty ASCII letters, digits
/// or `_`; anything else is rejected at compile time.
///
/// ```ignore
/// #[derive(EntityName)]
/// struct User;
///
/// #[derive(EntityName)]
/// #[entity(name = "ORDER_LINE")]
/// struct Line;
/// ```
#[proc_macro_derive(EntityName, attributes(entity))]
pub fn derive_entity_name(input: TokenStream) -> TokenStream {
    entity_name::derive(input.into()).into()
}
