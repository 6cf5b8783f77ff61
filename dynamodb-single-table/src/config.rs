/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Table configuration.

use dynamodb_single_table_core::{GlobalIndex, KeySchema};

mod env {
    pub(super) const TABLE_NAME: &str = "DYNAMODB_TABLE_NAME";
    pub(super) const PARTITION_KEY: &str = "DYNAMODB_PARTITION_KEY";
    pub(super) const SORT_KEY: &str = "DYNAMODB_SORT_KEY";
}

/// Invalid or missing table configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// No table name was provided.
    #[error("a table name is required (set {} or call `table_name`)", env::TABLE_NAME)]
    MissingTableName,
    /// A key attribute name was empty.
    #[error("the {which} key attribute name must not be empty")]
    EmptyKeyAttribute {
        /// `partition` or `sort`.
        which: &'static str,
    },
}

/// Which table to talk to and how its primary index is named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    table_name: String,
    primary_index: KeySchema,
}

impl TableConfig {
    /// A table using the default `PK`/`SK` primary index.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            primary_index: KeySchema::default(),
        }
    }

    /// Returns a builder for `TableConfig`.
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Loads the configuration from the process environment.
    ///
    /// Reads `DYNAMODB_TABLE_NAME` (required), and `DYNAMODB_PARTITION_KEY` and
    /// `DYNAMODB_SORT_KEY`, which default to `PK` and `SK`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    /// Loads the configuration through a custom variable lookup.
    pub fn from_env_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Builder::default();
        builder.set_table_name(lookup(env::TABLE_NAME));
        builder.set_partition_key(lookup(env::PARTITION_KEY));
        builder.set_sort_key(lookup(env::SORT_KEY));
        let config = builder.build()?;
        tracing::debug!(
            table = %config.table_name,
            partition_key = config.primary_index.partition_key(),
            sort_key = config.primary_index.sort_key(),
            "loaded table configuration from environment"
        );
        Ok(config)
    }

    /// The table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// The primary index attribute names.
    pub fn primary_index(&self) -> &KeySchema {
        &self.primary_index
    }
}

/// Builder for [`TableConfig`].
#[derive(Debug, Clone, Default)]
pub struct Builder {
    table_name: Option<String>,
    partition_key: Option<String>,
    sort_key: Option<String>,
}

impl Builder {
    /// Sets the table name.
    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.set_table_name(Some(table_name.into()));
        self
    }

    /// Sets the table name.
    pub fn set_table_name(&mut self, table_name: Option<String>) -> &mut Self {
        self.table_name = table_name;
        self
    }

    /// Sets the primary index attribute names from an index descriptor.
    pub fn primary_index(mut self, index: &dyn GlobalIndex) -> Self {
        self.set_partition_key(Some(index.partition_key().to_string()));
        self.set_sort_key(Some(index.sort_key().to_string()));
        self
    }

    /// Sets the partition key attribute name. Defaults to `PK`.
    pub fn set_partition_key(&mut self, name: Option<String>) -> &mut Self {
        self.partition_key = name;
        self
    }

    /// Sets the sort key attribute name. Defaults to `SK`.
    pub fn set_sort_key(&mut self, name: Option<String>) -> &mut Self {
        self.sort_key = name;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> Result<TableConfig, ConfigError> {
        let table_name = self
            .table_name
            .filter(|name| !name.is_empty())
            .ok_or(ConfigError::MissingTableName)?;
        let defaults = KeySchema::default();
        let partition_key = self
            .partition_key
            .unwrap_or_else(|| defaults.partition_key().to_string());
        let sort_key = self
            .sort_key
            .unwrap_or_else(|| defaults.sort_key().to_string());
        if partition_key.is_empty() {
            return Err(ConfigError::EmptyKeyAttribute { which: "partition" });
        }
        if sort_key.is_empty() {
            return Err(ConfigError::EmptyKeyAttribute { which: "sort" });
        }
        Ok(TableConfig {
            table_name,
            primary_index: KeySchema::new(partition_key, sort_key),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynamodb_single_table_core::InversePrimaryIndex;
    use std::collections::HashMap;
    use tracing_test::traced_test;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_to_pk_sk() {
        let config = TableConfig::new("Table");
        assert_eq!(config.primary_index().partition_key(), "PK");
        assert_eq!(config.primary_index().sort_key(), "SK");
    }

    #[test]
    #[traced_test]
    fn loads_from_env() {
        let config = TableConfig::from_env_with(lookup(&[
            ("DYNAMODB_TABLE_NAME", "App"),
            ("DYNAMODB_PARTITION_KEY", "Id"),
        ]))
        .unwrap();
        assert_eq!(config.table_name(), "App");
        assert_eq!(config.primary_index(), &KeySchema::new("Id", "SK"));
        assert!(logs_contain("loaded table configuration from environment"));
    }

    #[test]
    fn missing_table_name() {
        assert_eq!(
            TableConfig::from_env_with(lookup(&[])),
            Err(ConfigError::MissingTableName)
        );
        assert_eq!(
            TableConfig::from_env_with(lookup(&[("DYNAMODB_TABLE_NAME", "")])),
            Err(ConfigError::MissingTableName)
        );
    }

    #[test]
    fn empty_key_attribute() {
        let err = TableConfig::from_env_with(lookup(&[
            ("DYNAMODB_TABLE_NAME", "App"),
            ("DYNAMODB_SORT_KEY", ""),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::EmptyKeyAttribute { which: "sort" });
    }

    #[test]
    fn builder_takes_index_descriptor() {
        let config = TableConfig::builder()
            .table_name("App")
            .primary_index(&InversePrimaryIndex)
            .build()
            .unwrap();
        assert_eq!(config.primary_index().partition_key(), "SK");
    }
}
