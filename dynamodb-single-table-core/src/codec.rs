/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Serialization between generic values and wire attribute values.

use crate::attribute_value::{AttributeValue, Item};
use crate::convert::AttributeValueConvert;
use crate::error::ConversionError;
use crate::value::{Attributes, Value};

/// Serializes any convertible value into its wire form.
pub fn serialize_value<T: AttributeValueConvert + ?Sized>(
    value: &T,
) -> Result<AttributeValue, ConversionError> {
    value.to_attribute_value()
}

/// Deserializes a wire attribute value into a generic [`Value`].
pub fn deserialize_value(value: AttributeValue) -> Result<Value, ConversionError> {
    Value::from_attribute_value(value)
}

/// Serializes every attribute of a map, keeping the attribute names.
pub fn serialize_item<'a, I, T>(attributes: I) -> Result<Item, ConversionError>
where
    I: IntoIterator<Item = (&'a String, &'a T)>,
    T: AttributeValueConvert + 'a,
{
    attributes
        .into_iter()
        .map(|(name, value)| match value.to_attribute_value() {
            Ok(av) => Ok((name.clone(), av)),
            Err(e) => Err(e.with_field(name.as_str())),
        })
        .collect()
}

/// Deserializes every attribute of a wire item, keeping the attribute names.
pub fn deserialize_item(item: Item) -> Result<Attributes, ConversionError> {
    item.into_iter()
        .map(|(name, value)| match deserialize_value(value) {
            Ok(v) => Ok((name, v)),
            Err(e) => Err(e.with_field(name)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::collections::{BTreeSet, HashMap};

    #[test]
    fn item_keeps_names() {
        let mut attrs = Attributes::new();
        attrs.insert("Name".into(), Value::from("alice"));
        attrs.insert("Age".into(), Value::from(30));
        let item = serialize_item(&attrs).unwrap();
        assert_eq!(item.get("Name"), Some(&AttributeValue::S("alice".into())));
        assert_eq!(item.get("Age"), Some(&AttributeValue::N("30".into())));
        assert_eq!(deserialize_item(item).unwrap(), attrs);
    }

    #[test]
    fn failing_attribute_is_named() {
        let mut item = Item::new();
        item.insert("Scores".into(), AttributeValue::Ns(vec!["1".into()]));
        let err = deserialize_item(item).unwrap_err();
        assert_eq!(err.field(), Some("Scores"));
    }

    #[test]
    fn malformed_number_is_rejected() {
        assert!(deserialize_value(AttributeValue::N("12abc".into())).is_err());
    }

    #[test]
    fn plain_rust_maps_serialize() {
        let mut attrs: HashMap<String, i64> = HashMap::new();
        attrs.insert("Count".into(), 3);
        let item = serialize_item(&attrs).unwrap();
        assert_eq!(item.get("Count"), Some(&AttributeValue::N("3".into())));
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            ".*".prop_map(Value::String),
            any::<i64>().prop_map(Value::from),
            (any::<i32>(), 0u32..1_000_000u32).prop_map(|(i, f)| {
                Value::Number(format!("{}.{}", i, f).parse::<Number>().unwrap())
            }),
            prop::collection::vec(any::<u8>(), 0..16).prop_map(Value::Binary),
            any::<bool>().prop_map(Value::Bool),
            Just(Value::Null),
            prop::collection::btree_set("[a-z]{0,6}", 0..4)
                .prop_map(|set: BTreeSet<String>| Value::StringSet(set)),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
                prop::collection::hash_map("[A-Za-z]{1,6}", inner, 0..4).prop_map(Value::Map),
            ]
        })
    }

    proptest! {
        #[test]
        fn value_round_trips(v in arb_value()) {
            let wire = serialize_value(&v).unwrap();
            prop_assert_eq!(deserialize_value(wire).unwrap(), v);
        }

        #[test]
        fn wire_json_round_trips(v in arb_value()) {
            let wire = serialize_value(&v).unwrap();
            let json = serde_json::to_string(&wire).unwrap();
            let back: AttributeValue = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(deserialize_value(back).unwrap(), v);
        }
    }
}
