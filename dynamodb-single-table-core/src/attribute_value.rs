/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Tagged attribute values as they appear on the wire.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A wire-level item: attribute names mapped to tagged values.
pub type Item = HashMap<String, AttributeValue>;

/// A single tagged attribute value.
///
/// Serializes to the store's JSON protocol shape, e.g. `{"S": "USER#abc"}` or
/// `{"N": "42"}`. Binary payloads are base64 encoded in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// String.
    #[serde(rename = "S")]
    S(String),
    /// Number, carried as its decimal string form.
    #[serde(rename = "N")]
    N(String),
    /// Binary.
    #[serde(rename = "B")]
    B(#[serde(with = "blob")] Vec<u8>),
    /// Boolean.
    #[serde(rename = "BOOL")]
    Bool(bool),
    /// Null. The store only ever sends `true`.
    #[serde(rename = "NULL")]
    Null(bool),
    /// String set.
    #[serde(rename = "SS")]
    Ss(Vec<String>),
    /// Number set.
    #[serde(rename = "NS")]
    Ns(Vec<String>),
    /// Binary set.
    #[serde(rename = "BS")]
    Bs(#[serde(with = "blob_list")] Vec<Vec<u8>>),
    /// List.
    #[serde(rename = "L")]
    L(Vec<AttributeValue>),
    /// Map.
    #[serde(rename = "M")]
    M(HashMap<String, AttributeValue>),
}

impl AttributeValue {
    /// The wire tag of this value, e.g. `"SS"`.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::S(_) => "S",
            AttributeValue::N(_) => "N",
            AttributeValue::B(_) => "B",
            AttributeValue::Bool(_) => "BOOL",
            AttributeValue::Null(_) => "NULL",
            AttributeValue::Ss(_) => "SS",
            AttributeValue::Ns(_) => "NS",
            AttributeValue::Bs(_) => "BS",
            AttributeValue::L(_) => "L",
            AttributeValue::M(_) => "M",
        }
    }

    /// Returns the string payload if this is an `S` value.
    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttributeValue::S(s) => Some(s),
            _ => None,
        }
    }
}

mod blob {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::decode(encoded).map_err(serde::de::Error::custom)
    }
}

mod blob_list {
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        blobs: &[Vec<u8>],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(blobs.len()))?;
        for blob in blobs {
            seq.serialize_element(&base64::encode(blob))?;
        }
        seq.end()
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<u8>>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .into_iter()
            .map(|encoded| base64::decode(encoded).map_err(serde::de::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn scalar_tags() {
        assert_eq!(
            serde_json::to_value(AttributeValue::S("USER#a".into())).unwrap(),
            json!({"S": "USER#a"})
        );
        assert_eq!(
            serde_json::to_value(AttributeValue::N("1.5".into())).unwrap(),
            json!({"N": "1.5"})
        );
        assert_eq!(
            serde_json::to_value(AttributeValue::Bool(false)).unwrap(),
            json!({"BOOL": false})
        );
        assert_eq!(
            serde_json::to_value(AttributeValue::Null(true)).unwrap(),
            json!({"NULL": true})
        );
    }

    #[test]
    fn binary_is_base64() {
        let value = AttributeValue::B(b"hello".to_vec());
        let encoded = serde_json::to_value(&value).unwrap();
        assert_eq!(encoded, json!({"B": "aGVsbG8="}));
        let decoded: AttributeValue = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, value);

        let set: AttributeValue = serde_json::from_value(json!({"BS": ["AQI="]})).unwrap();
        assert_eq!(set, AttributeValue::Bs(vec![vec![1, 2]]));
    }

    #[test]
    fn nested_documents() {
        let wire = json!({
            "M": {
                "tags": {"SS": ["a", "b"]},
                "history": {"L": [{"N": "1"}, {"NULL": true}]}
            }
        });
        let value: AttributeValue = serde_json::from_value(wire.clone()).unwrap();
        match &value {
            AttributeValue::M(map) => {
                assert_eq!(
                    map.get("tags"),
                    Some(&AttributeValue::Ss(vec!["a".into(), "b".into()]))
                );
            }
            other => panic!("expected a map, got {:?}", other),
        }
        assert_eq!(serde_json::to_value(&value).unwrap(), wire);
    }

    #[test]
    fn rejects_invalid_base64() {
        let result = serde_json::from_value::<AttributeValue>(json!({"B": "not base64!"}));
        assert!(result.is_err());
    }
}
