/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use dynamodb_single_table_core::{AttributeValue, GlobalIndex, Item, KeySchema};

use crate::expression::{compare, Clause};

/// Storage key of an item: the string values of its primary key attributes.
pub(crate) type StorageKey = (String, String);

/// Items of one table, ordered by primary key.
#[derive(Debug, Clone)]
pub(crate) struct TableState {
    pub(crate) primary: KeySchema,
    pub(crate) indices: HashMap<String, KeySchema>,
    pub(crate) items: BTreeMap<StorageKey, Item>,
}

fn string_attribute(item: &Item, name: &str) -> Result<String, String> {
    match item.get(name) {
        Some(AttributeValue::S(s)) if !s.is_empty() => Ok(s.clone()),
        Some(AttributeValue::S(_)) => Err(format!(
            "One or more parameter values are not valid. The AttributeValue for a key attribute \
             cannot contain an empty string value. Key: {}",
            name
        )),
        Some(other) => Err(format!(
            "One or more parameter values were invalid: Type mismatch for key {} \
             expected: S actual: {}",
            name,
            other.type_name()
        )),
        None => Err(format!(
            "One or more parameter values were invalid: Missing the key {} in the item",
            name
        )),
    }
}

impl TableState {
    pub(crate) fn new(primary: KeySchema) -> Self {
        Self {
            primary,
            indices: HashMap::new(),
            items: BTreeMap::new(),
        }
    }

    /// The storage key of a full item.
    pub(crate) fn storage_key(&self, item: &Item) -> Result<StorageKey, String> {
        Ok((
            string_attribute(item, self.primary.partition_key())?,
            string_attribute(item, self.primary.sort_key())?,
        ))
    }

    /// The storage key of a `Key` parameter, which must hold exactly the key attributes.
    pub(crate) fn key_of(&self, key: &Item) -> Result<StorageKey, String> {
        if key.len() != 2 {
            return Err("The provided key element does not match the schema".to_string());
        }
        self.storage_key(key)
    }

    pub(crate) fn key_item(&self, key: &StorageKey) -> Item {
        let mut item = Item::new();
        item.insert(
            self.primary.partition_key().to_string(),
            AttributeValue::S(key.0.clone()),
        );
        item.insert(
            self.primary.sort_key().to_string(),
            AttributeValue::S(key.1.clone()),
        );
        item
    }

    pub(crate) fn is_key_attribute(&self, name: &str) -> bool {
        name == self.primary.partition_key() || name == self.primary.sort_key()
    }

    pub(crate) fn index(&self, name: Option<&str>) -> Result<&KeySchema, String> {
        match name {
            None => Ok(&self.primary),
            Some(name) => self
                .indices
                .get(name)
                .ok_or_else(|| "The table does not have the specified index".to_string()),
        }
    }

    /// Items of `schema` whose keys satisfy the clauses, in sort key order.
    pub(crate) fn query<'a>(
        &'a self,
        schema: &KeySchema,
        clauses: &[Clause],
    ) -> Result<Vec<&'a Item>, String> {
        let (partition, sort): (Vec<&Clause>, Vec<&Clause>) = clauses
            .iter()
            .partition(|c| c.name == schema.partition_key());
        if partition.len() != 1 || !partition[0].is_equality() {
            return Err("Query condition missed key schema element".to_string());
        }
        if let Some(clause) = sort.iter().find(|c| c.name != schema.sort_key()) {
            return Err(format!(
                "Query key condition not supported: {} is not a key attribute",
                clause.name
            ));
        }

        let mut matched: Vec<&Item> = self
            .items
            .values()
            .filter(|item| {
                match (item.get(schema.partition_key()), item.get(schema.sort_key())) {
                    (Some(pk), Some(sk)) => {
                        partition[0].matches(pk) && sort.iter().all(|c| c.matches(sk))
                    }
                    // Items without both attributes are not in the index.
                    _ => false,
                }
            })
            .collect();
        matched.sort_by(|a, b| {
            compare(&a[schema.sort_key()], &b[schema.sort_key()]).unwrap_or(Ordering::Equal)
        });
        Ok(matched)
    }
}
