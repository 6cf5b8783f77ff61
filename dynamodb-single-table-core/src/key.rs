/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Entity-prefixed keys for single-table designs.
//!
//! Every key is stored as `PREFIX#value`, where the prefix names the entity
//! kind the key belongs to. Keys of different kinds (partition, sort,
//! prefix-only sort) compare equal when their string forms match, but only
//! [`PartitionKey`] and [`SortKey`] can form a [`PrimaryKey`].

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::attribute_value::{AttributeValue, Item};
use crate::convert::AttributeValueConvert;
use crate::error::{ConversionError, KeyError};
use crate::index::GlobalIndex;
use crate::value::Value;

/// Separator between the entity prefix and the key value.
pub const PREFIX_SEPARATOR: char = '#';

/// A logical entity kind stored in the table.
///
/// Implement this on a zero-sized marker type, usually with
/// `#[derive(EntityName)]`, which checks the name when the derive expands.
/// Hand-written impls are checked when a key is first built for them:
///
/// ```ignore
/// #[derive(EntityName)]
/// struct User;
///
/// assert_eq!(User::to_prefix(), "USER#");
/// ```
///
/// A name that cannot form a prefix fails to compile:
///
/// ```compile_fail
/// use dynamodb_single_table_core::{EntityName, PartitionKey};
///
/// struct Bad;
/// impl EntityName for Bad {
///     const NAME: &'static str = "bad name";
/// }
///
/// let _ = PartitionKey::new::<Bad>("x");
/// ```
pub trait EntityName {
    /// The entity name. Must be non-empty and consist of ASCII letters, digits or `_`.
    const NAME: &'static str;

    #[doc(hidden)]
    const VALID_NAME: () = assert!(
        is_valid_entity_name(Self::NAME),
        "entity names must be non-empty and only contain ASCII letters, digits and '_'"
    );

    /// The key prefix for this entity, e.g. `USER#`.
    fn to_prefix() -> String
    where
        Self: Sized,
    {
        EntityPrefix::of::<Self>().0
    }
}

const fn is_valid_entity_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    if bytes.is_empty() {
        return false;
    }
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if !(b.is_ascii_alphanumeric() || b == b'_') {
            return false;
        }
        i += 1;
    }
    true
}

/// A validated entity prefix such as `USER#`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityPrefix(String);

impl EntityPrefix {
    /// The prefix of a statically known entity.
    pub fn of<E: EntityName>() -> Self {
        // Fails to compile for names `EntityPrefix::new` would reject.
        let _: () = E::VALID_NAME;
        EntityPrefix(format!(
            "{}{}",
            E::NAME.to_ascii_uppercase(),
            PREFIX_SEPARATOR
        ))
    }

    /// Builds a prefix from an entity name only known at runtime.
    pub fn new(name: &str) -> Result<Self, KeyError> {
        validate_entity_name(name)?;
        Ok(EntityPrefix(format!(
            "{}{}",
            name.to_ascii_uppercase(),
            PREFIX_SEPARATOR
        )))
    }

    /// The prefix including the trailing separator.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The entity name without the separator.
    pub fn name(&self) -> &str {
        &self.0[..self.0.len() - 1]
    }
}

impl fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_entity_name(name: &str) -> Result<(), KeyError> {
    if name.is_empty() {
        return Err(KeyError::invalid_entity(name, "entity name is empty"));
    }
    if !is_valid_entity_name(name) {
        return Err(KeyError::invalid_entity(
            name,
            "entity names may only contain ASCII letters, digits and '_'",
        ));
    }
    Ok(())
}

// Splits `USER#abc` into its prefix and value.
fn parse_key(s: &str) -> Result<(EntityPrefix, &str), KeyError> {
    let pos = s
        .find(PREFIX_SEPARATOR)
        .ok_or_else(|| KeyError::invalid_entity(s, "key has no entity prefix"))?;
    let name = &s[..pos];
    let prefix = EntityPrefix::new(name).map_err(|_| {
        KeyError::invalid_entity(s, "key prefix is not a valid entity name")
    })?;
    if prefix.name() != name {
        return Err(KeyError::invalid_entity(s, "key prefix must be uppercase"));
    }
    Ok((prefix, &s[pos + 1..]))
}

macro_rules! entity_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            repr: String,
            prefix_len: usize,
        }

        impl $name {
            /// Builds a key from a runtime entity prefix and a value.
            pub fn with_prefix(prefix: &EntityPrefix, value: impl AsRef<str>) -> Self {
                let value = value.as_ref();
                let mut repr = String::with_capacity(prefix.as_str().len() + value.len());
                repr.push_str(prefix.as_str());
                repr.push_str(value);
                Self {
                    repr,
                    prefix_len: prefix.as_str().len(),
                }
            }

            /// The entity prefix, including the separator.
            pub fn prefix(&self) -> &str {
                &self.repr[..self.prefix_len]
            }

            /// The value after the prefix.
            pub fn value(&self) -> &str {
                &self.repr[self.prefix_len..]
            }

            /// The full string form, `prefix + value`.
            pub fn as_str(&self) -> &str {
                &self.repr
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.repr).finish()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.repr)
            }
        }

        impl FromStr for $name {
            type Err = KeyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let (prefix, value) = parse_key(s)?;
                Ok(Self::with_prefix(&prefix, value))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.repr
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.repr
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.repr.hash(state)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.repr == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.repr == *other
            }
        }

        impl PartialEq<String> for $name {
            fn eq(&self, other: &String) -> bool {
                &self.repr == other
            }
        }

        impl From<$name> for Value {
            fn from(key: $name) -> Self {
                Value::String(key.repr)
            }
        }

        impl From<&$name> for Value {
            fn from(key: &$name) -> Self {
                Value::String(key.repr.clone())
            }
        }

        impl AttributeValueConvert for $name {
            fn to_attribute_value(&self) -> Result<AttributeValue, ConversionError> {
                Ok(AttributeValue::S(self.repr.clone()))
            }

            fn from_attribute_value(value: AttributeValue) -> Result<Self, ConversionError> {
                let s = String::from_attribute_value(value)?;
                s.parse()
                    .map_err(|e: KeyError| ConversionError::invalid_value(e.to_string()))
            }
        }
    };
}

macro_rules! cross_key_eq {
    ($($a:ident == $b:ident),* $(,)?) => {
        $(
            impl PartialEq<$b> for $a {
                fn eq(&self, other: &$b) -> bool {
                    self.repr == other.repr
                }
            }
        )*
    };
}

entity_key!(
    /// The partition part of a primary key.
    PartitionKey
);

entity_key!(
    /// The sort part of a primary key.
    SortKey
);

entity_key!(
    /// A sort key that may hold only a prefix, used for `begins_with` queries.
    ///
    /// Cannot be used where a full [`SortKey`] is required.
    PrefixSortKey
);

cross_key_eq!(
    PartitionKey == PartitionKey,
    PartitionKey == SortKey,
    PartitionKey == PrefixSortKey,
    SortKey == SortKey,
    SortKey == PartitionKey,
    SortKey == PrefixSortKey,
    PrefixSortKey == PrefixSortKey,
    PrefixSortKey == PartitionKey,
    PrefixSortKey == SortKey,
);

impl PartitionKey {
    /// Builds `E::to_prefix() + value`.
    pub fn new<E: EntityName>(value: impl AsRef<str>) -> Self {
        Self::with_prefix(&EntityPrefix::of::<E>(), value)
    }
}

impl SortKey {
    /// Builds `E::to_prefix() + value`.
    pub fn new<E: EntityName>(value: impl AsRef<str>) -> Self {
        Self::with_prefix(&EntityPrefix::of::<E>(), value)
    }
}

impl PrefixSortKey {
    /// A prefix-only key, equal to `E::to_prefix()`.
    pub fn new<E: EntityName>() -> Self {
        Self::with_prefix(&EntityPrefix::of::<E>(), "")
    }

    /// A prefix key with a partial value, e.g. `ORDER#2020-`.
    pub fn with_value<E: EntityName>(value: impl AsRef<str>) -> Self {
        Self::with_prefix(&EntityPrefix::of::<E>(), value)
    }
}

/// A full primary key: partition key plus sort key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrimaryKey {
    partition_key: PartitionKey,
    sort_key: SortKey,
}

impl PrimaryKey {
    /// Creates a primary key.
    pub fn new(partition_key: PartitionKey, sort_key: SortKey) -> Self {
        Self {
            partition_key,
            sort_key,
        }
    }

    /// The partition key.
    pub fn partition_key(&self) -> &PartitionKey {
        &self.partition_key
    }

    /// The sort key.
    pub fn sort_key(&self) -> &SortKey {
        &self.sort_key
    }

    /// Reads a key back from a wire key map written with the index's attribute names.
    pub fn deserialize<I: GlobalIndex + ?Sized>(
        item: &Item,
        index: &I,
    ) -> Result<Self, ConversionError> {
        Ok(Self::new(
            key_attribute(item, index.partition_key())?,
            key_attribute(item, index.sort_key())?,
        ))
    }

    /// The key as a pair of string forms.
    pub fn to_string_pair(&self) -> (String, String) {
        (
            self.partition_key.as_str().to_string(),
            self.sort_key.as_str().to_string(),
        )
    }

    /// Serializes the key into a wire key map using the index's attribute names.
    pub fn serialize<I: GlobalIndex + ?Sized>(&self, index: &I) -> Item {
        let mut map = Item::with_capacity(2);
        map.insert(
            index.partition_key().to_string(),
            AttributeValue::S(self.partition_key.repr.clone()),
        );
        map.insert(
            index.sort_key().to_string(),
            AttributeValue::S(self.sort_key.repr.clone()),
        );
        map
    }
}

fn key_attribute<K: AttributeValueConvert>(item: &Item, name: &str) -> Result<K, ConversionError> {
    let value = item
        .get(name)
        .cloned()
        .ok_or_else(|| ConversionError::missing_attribute(name))?;
    K::from_attribute_value(value).map_err(|e| e.with_field(name))
}

impl PartialEq<(String, String)> for PrimaryKey {
    fn eq(&self, other: &(String, String)) -> bool {
        self.partition_key.repr == other.0 && self.sort_key.repr == other.1
    }
}

impl<'a> PartialEq<(&'a str, &'a str)> for PrimaryKey {
    fn eq(&self, other: &(&'a str, &'a str)) -> bool {
        self.partition_key.repr == other.0 && self.sort_key.repr == other.1
    }
}

impl fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.partition_key, self.sort_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConversionErrorKind;
    use crate::index::{InversePrimaryIndex, PrimaryGlobalIndex};
    use proptest::prelude::*;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;

    struct User;
    impl EntityName for User {
        const NAME: &'static str = "User";
    }

    struct Order;
    impl EntityName for Order {
        const NAME: &'static str = "Order";
    }

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn prefix_is_uppercase_name() {
        assert_eq!(User::to_prefix(), "USER#");
        assert_eq!(EntityPrefix::of::<Order>().as_str(), "ORDER#");
        assert_eq!(EntityPrefix::of::<Order>().name(), "ORDER");
    }

    #[test]
    fn static_and_runtime_name_checks_agree() {
        for name in ["User", "ORDER_LINE", "v2", "", "bad name", "a#b", "caf\u{e9}"] {
            assert_eq!(
                is_valid_entity_name(name),
                EntityPrefix::new(name).is_ok(),
                "{:?}",
                name
            );
        }
    }

    #[test]
    fn key_string_form() {
        let pk = PartitionKey::new::<User>("alice");
        assert_eq!(pk.to_string(), "USER#alice");
        assert_eq!(pk.prefix(), "USER#");
        assert_eq!(pk.value(), "alice");
    }

    #[test]
    fn cross_variant_equality() {
        let pk = PartitionKey::new::<User>("alice");
        let sk = SortKey::new::<User>("alice");
        assert_eq!(pk, sk);
        assert_eq!(hash_of(&pk), hash_of(&sk));
        assert_ne!(pk, PartitionKey::new::<Order>("alice"));
    }

    #[test]
    fn prefix_sort_key_without_value() {
        let key = PrefixSortKey::new::<Order>();
        assert_eq!(key, "ORDER#");
        assert_eq!(key.value(), "");
        assert_eq!(PrefixSortKey::with_value::<Order>("2020-").as_str(), "ORDER#2020-");
    }

    #[test]
    fn runtime_prefix_validation() {
        assert_eq!(EntityPrefix::new("invoice").unwrap().as_str(), "INVOICE#");
        assert!(EntityPrefix::new("").is_err());
        assert!(EntityPrefix::new("bad name").is_err());
        assert!(EntityPrefix::new("A#B").is_err());
    }

    #[test]
    fn parse_from_string_form() {
        let pk: PartitionKey = "USER#alice".parse().unwrap();
        assert_eq!(pk, PartitionKey::new::<User>("alice"));
        let sk: SortKey = "ORDER#a#b".parse().unwrap();
        assert_eq!(sk.value(), "a#b");
        assert!("alice".parse::<PartitionKey>().is_err());
        assert!("user#alice".parse::<PartitionKey>().is_err());
        assert!("#alice".parse::<PartitionKey>().is_err());
    }

    #[test]
    fn primary_key_serializes_for_index() {
        let key = PrimaryKey::new(
            PartitionKey::new::<User>("alice"),
            SortKey::new::<Order>("1"),
        );
        let primary = key.serialize(&PrimaryGlobalIndex);
        assert_eq!(primary.get("PK"), Some(&AttributeValue::S("USER#alice".into())));
        assert_eq!(primary.get("SK"), Some(&AttributeValue::S("ORDER#1".into())));

        let inverse = key.serialize(&InversePrimaryIndex);
        assert_eq!(inverse.get("SK"), Some(&AttributeValue::S("USER#alice".into())));
        assert_eq!(inverse.get("PK"), Some(&AttributeValue::S("ORDER#1".into())));
    }

    #[test]
    fn primary_key_deserializes_for_index() {
        let key = PrimaryKey::new(
            PartitionKey::new::<User>("alice"),
            SortKey::new::<Order>("1"),
        );
        let wire = key.serialize(&InversePrimaryIndex);
        assert_eq!(PrimaryKey::deserialize(&wire, &InversePrimaryIndex).unwrap(), key);

        let mut partial = wire.clone();
        partial.remove("PK");
        let err = PrimaryKey::deserialize(&partial, &InversePrimaryIndex).unwrap_err();
        assert_eq!(err.kind(), &ConversionErrorKind::MissingAttribute);
        assert_eq!(err.field(), Some("PK"));
        assert_eq!(err.to_string(), "missing required attribute (attribute 'PK')");

        let mut numeric = wire;
        numeric.insert("SK".into(), AttributeValue::N("1".into()));
        let err = PrimaryKey::deserialize(&numeric, &InversePrimaryIndex).unwrap_err();
        assert_eq!(err.field(), Some("SK"));
    }

    #[test]
    fn primary_key_equals_string_pair() {
        let key = PrimaryKey::new(PartitionKey::new::<User>("a"), SortKey::new::<User>("a"));
        assert_eq!(key, ("USER#a", "USER#a"));
        assert_eq!(key, ("USER#a".to_string(), "USER#a".to_string()));
        assert_eq!(key.to_string_pair(), ("USER#a".to_string(), "USER#a".to_string()));

        let mut set = HashSet::new();
        set.insert(key.clone());
        assert!(set.contains(&PrimaryKey::new(
            "USER#a".parse().unwrap(),
            "USER#a".parse().unwrap()
        )));
    }

    proptest! {
        #[test]
        fn string_form_is_prefix_plus_value(value in ".*") {
            let pk = PartitionKey::new::<User>(&value);
            prop_assert_eq!(pk.to_string(), format!("{}{}", User::to_prefix(), value));
            prop_assert_eq!(pk, SortKey::new::<User>(&value));
        }

        #[test]
        fn parse_inverts_display(value in ".*") {
            let pk = PartitionKey::new::<Order>(&value);
            let parsed: PartitionKey = pk.to_string().parse().unwrap();
            prop_assert_eq!(parsed.value(), value.as_str());
        }
    }
}
