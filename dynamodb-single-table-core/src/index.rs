/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Index descriptors: which attributes hold the partition and sort keys.

use std::fmt::Debug;

/// Attribute names of an index's partition and sort keys.
pub trait GlobalIndex: Debug + Send + Sync {
    /// The partition key attribute name.
    fn partition_key(&self) -> &str;

    /// The sort key attribute name.
    fn sort_key(&self) -> &str;
}

/// A global secondary index, addressed by name in queries.
pub trait GlobalSecondaryIndex: GlobalIndex {
    /// The index name.
    fn name(&self) -> &str;
}

/// The table's primary index: `PK` / `SK`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrimaryGlobalIndex;

impl GlobalIndex for PrimaryGlobalIndex {
    fn partition_key(&self) -> &str {
        "PK"
    }

    fn sort_key(&self) -> &str {
        "SK"
    }
}

/// The inverse index `GSI_1`, with the primary key attributes swapped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InversePrimaryIndex;

impl GlobalIndex for InversePrimaryIndex {
    fn partition_key(&self) -> &str {
        "SK"
    }

    fn sort_key(&self) -> &str {
        "PK"
    }
}

impl GlobalSecondaryIndex for InversePrimaryIndex {
    fn name(&self) -> &str {
        "GSI_1"
    }
}

/// A primary index with custom attribute names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    partition_key: String,
    sort_key: String,
}

impl KeySchema {
    /// Creates a key schema from the partition and sort attribute names.
    pub fn new(partition_key: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: sort_key.into(),
        }
    }

    /// Copies the attribute names of any index.
    pub fn of<I: GlobalIndex + ?Sized>(index: &I) -> Self {
        Self::new(index.partition_key(), index.sort_key())
    }
}

impl Default for KeySchema {
    fn default() -> Self {
        Self::of(&PrimaryGlobalIndex)
    }
}

impl GlobalIndex for KeySchema {
    fn partition_key(&self) -> &str {
        &self.partition_key
    }

    fn sort_key(&self) -> &str {
        &self.sort_key
    }
}
