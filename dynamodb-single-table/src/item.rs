/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Items returned by read operations, with entity prefixes removed.

use std::ops::Index;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

use dynamodb_single_table_core::{deserialize_item, Attributes, ConversionError, Item, Value};

use crate::error::Error;

// Entity names are uppercased marker type names.
static ENTITY_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9_]+#(.+)$").unwrap());

/// Removes a leading `ENTITY#` prefix, leaving other strings untouched.
///
/// ```
/// use dynamodb_single_table::remove_entity_prefix;
///
/// assert_eq!(remove_entity_prefix("USER#alice"), "alice");
/// assert_eq!(remove_entity_prefix("alice"), "alice");
/// assert_eq!(remove_entity_prefix("USER#"), "USER#");
/// ```
pub fn remove_entity_prefix(value: &str) -> &str {
    match ENTITY_PREFIX.captures(value).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => value,
    }
}

/// Strips entity prefixes from every top-level string attribute.
pub fn strip_prefixes(mut attributes: Attributes) -> Attributes {
    for value in attributes.values_mut() {
        if let Value::String(s) = value {
            // The stripped value is always a suffix of the input.
            let prefix_len = s.len() - remove_entity_prefix(s).len();
            if prefix_len > 0 {
                s.drain(..prefix_len);
            }
        }
    }
    attributes
}

/// An item read from the table, with entity prefixes stripped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemResult {
    attributes: Attributes,
}

impl ItemResult {
    pub(crate) fn from_wire(item: Item) -> Result<Self, Error> {
        Ok(Self {
            attributes: strip_prefixes(deserialize_item(item)?),
        })
    }

    /// Returns an attribute.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Returns a string attribute.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// The attributes of the item.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Consumes the item, returning its attributes.
    pub fn into_attributes(self) -> Attributes {
        self.attributes
    }

    /// Deserializes the item into a struct through its JSON view.
    ///
    /// Numbers become JSON numbers and string sets become arrays, see [`Value::to_json`].
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let json = Value::Map(self.attributes.clone()).to_json();
        serde_json::from_value(json)
            .map_err(|e| Error::Conversion(ConversionError::invalid_value(e.to_string())))
    }
}

impl Index<&str> for ItemResult {
    type Output = Value;

    fn index(&self, name: &str) -> &Value {
        &self.attributes[name]
    }
}

impl From<Attributes> for ItemResult {
    fn from(attributes: Attributes) -> Self {
        Self { attributes }
    }
}
