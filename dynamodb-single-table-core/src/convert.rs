/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! AttributeValueConvert implementations for standard Rust types and [`Value`].

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::attribute_value::AttributeValue;
use crate::error::ConversionError;
use crate::value::{Number, Value};

/// Converts individual Rust values to/from wire attribute values.
pub trait AttributeValueConvert {
    /// Converts this value to a wire attribute value.
    fn to_attribute_value(&self) -> Result<AttributeValue, ConversionError>;

    /// Constructs a value from a wire attribute value.
    fn from_attribute_value(value: AttributeValue) -> Result<Self, ConversionError>
    where
        Self: Sized;
}

// ============================================================================
// Generic values
// ============================================================================

impl AttributeValueConvert for Value {
    fn to_attribute_value(&self) -> Result<AttributeValue, ConversionError> {
        Ok(match self {
            Value::String(s) => AttributeValue::S(s.clone()),
            Value::Number(n) => AttributeValue::N(n.as_str().to_string()),
            Value::Binary(b) => AttributeValue::B(b.clone()),
            Value::Bool(b) => AttributeValue::Bool(*b),
            Value::Null => AttributeValue::Null(true),
            Value::List(values) => AttributeValue::L(
                values
                    .iter()
                    .map(Value::to_attribute_value)
                    .collect::<Result<_, _>>()?,
            ),
            Value::StringSet(set) => AttributeValue::Ss(set.iter().cloned().collect()),
            Value::Map(map) => AttributeValue::M(
                map.iter()
                    .map(|(k, v)| match v.to_attribute_value() {
                        Ok(v) => Ok((k.clone(), v)),
                        Err(e) => Err(e.with_field(k)),
                    })
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    fn from_attribute_value(value: AttributeValue) -> Result<Self, ConversionError> {
        Ok(match value {
            AttributeValue::S(s) => Value::String(s),
            AttributeValue::N(n) => Value::Number(n.parse()?),
            AttributeValue::B(b) => Value::Binary(b),
            AttributeValue::Bool(b) => Value::Bool(b),
            AttributeValue::Null(true) => Value::Null,
            AttributeValue::Null(false) => {
                return Err(ConversionError::invalid_value("NULL attribute must be true"))
            }
            AttributeValue::Ss(set) => Value::StringSet(set.into_iter().collect()),
            AttributeValue::Ns(_) => return Err(ConversionError::unsupported("NS")),
            AttributeValue::Bs(_) => return Err(ConversionError::unsupported("BS")),
            AttributeValue::L(list) => Value::List(
                list.into_iter()
                    .map(Value::from_attribute_value)
                    .collect::<Result<_, _>>()?,
            ),
            AttributeValue::M(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| match Value::from_attribute_value(v) {
                        Ok(v) => Ok((k, v)),
                        Err(e) => Err(e.with_field(k)),
                    })
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

// ============================================================================
// Primitive types
// ============================================================================

impl AttributeValueConvert for String {
    fn to_attribute_value(&self) -> Result<AttributeValue, ConversionError> {
        Ok(AttributeValue::S(self.clone()))
    }

    fn from_attribute_value(value: AttributeValue) -> Result<Self, ConversionError> {
        match value {
            AttributeValue::S(s) => Ok(s),
            other => Err(ConversionError::type_mismatch("S", other.type_name())),
        }
    }
}

// Serialize only; decoding needs an owned `String`.
impl AttributeValueConvert for &str {
    fn to_attribute_value(&self) -> Result<AttributeValue, ConversionError> {
        Ok(AttributeValue::S((*self).to_string()))
    }

    fn from_attribute_value(_value: AttributeValue) -> Result<Self, ConversionError> {
        Err(ConversionError::unsupported("&str"))
    }
}

impl AttributeValueConvert for i64 {
    fn to_attribute_value(&self) -> Result<AttributeValue, ConversionError> {
        Ok(AttributeValue::N(self.to_string()))
    }

    fn from_attribute_value(value: AttributeValue) -> Result<Self, ConversionError> {
        match value {
            AttributeValue::N(n) => n.parse().map_err(|_| {
                ConversionError::invalid_value(format!("cannot parse '{}' as i64", n))
            }),
            other => Err(ConversionError::type_mismatch("N", other.type_name())),
        }
    }
}

impl AttributeValueConvert for u64 {
    fn to_attribute_value(&self) -> Result<AttributeValue, ConversionError> {
        Ok(AttributeValue::N(self.to_string()))
    }

    fn from_attribute_value(value: AttributeValue) -> Result<Self, ConversionError> {
        match value {
            AttributeValue::N(n) => n.parse().map_err(|_| {
                ConversionError::invalid_value(format!("cannot parse '{}' as u64", n))
            }),
            other => Err(ConversionError::type_mismatch("N", other.type_name())),
        }
    }
}

impl AttributeValueConvert for f64 {
    fn to_attribute_value(&self) -> Result<AttributeValue, ConversionError> {
        let number = Number::try_from(*self)?;
        Ok(AttributeValue::N(number.as_str().to_string()))
    }

    fn from_attribute_value(value: AttributeValue) -> Result<Self, ConversionError> {
        match value {
            AttributeValue::N(n) => n.parse().map_err(|_| {
                ConversionError::invalid_value(format!("cannot parse '{}' as f64", n))
            }),
            other => Err(ConversionError::type_mismatch("N", other.type_name())),
        }
    }
}

impl AttributeValueConvert for bool {
    fn to_attribute_value(&self) -> Result<AttributeValue, ConversionError> {
        Ok(AttributeValue::Bool(*self))
    }

    fn from_attribute_value(value: AttributeValue) -> Result<Self, ConversionError> {
        match value {
            AttributeValue::Bool(b) => Ok(b),
            other => Err(ConversionError::type_mismatch("BOOL", other.type_name())),
        }
    }
}

impl AttributeValueConvert for Vec<u8> {
    fn to_attribute_value(&self) -> Result<AttributeValue, ConversionError> {
        Ok(AttributeValue::B(self.clone()))
    }

    fn from_attribute_value(value: AttributeValue) -> Result<Self, ConversionError> {
        match value {
            AttributeValue::B(b) => Ok(b),
            other => Err(ConversionError::type_mismatch("B", other.type_name())),
        }
    }
}

// ============================================================================
// Collection types
// ============================================================================

impl<T: AttributeValueConvert> AttributeValueConvert for Option<T> {
    fn to_attribute_value(&self) -> Result<AttributeValue, ConversionError> {
        match self {
            Some(v) => v.to_attribute_value(),
            None => Ok(AttributeValue::Null(true)),
        }
    }

    fn from_attribute_value(value: AttributeValue) -> Result<Self, ConversionError> {
        match value {
            AttributeValue::Null(true) => Ok(None),
            other => T::from_attribute_value(other).map(Some),
        }
    }
}

impl<T: AttributeValueConvert> AttributeValueConvert for Vec<T> {
    fn to_attribute_value(&self) -> Result<AttributeValue, ConversionError> {
        let items: Result<Vec<_>, _> = self.iter().map(|v| v.to_attribute_value()).collect();
        Ok(AttributeValue::L(items?))
    }

    fn from_attribute_value(value: AttributeValue) -> Result<Self, ConversionError> {
        match value {
            AttributeValue::L(list) => list.into_iter().map(T::from_attribute_value).collect(),
            other => Err(ConversionError::type_mismatch("L", other.type_name())),
        }
    }
}

impl<V: AttributeValueConvert> AttributeValueConvert for HashMap<String, V> {
    fn to_attribute_value(&self) -> Result<AttributeValue, ConversionError> {
        let mut map = HashMap::with_capacity(self.len());
        for (k, v) in self {
            map.insert(k.clone(), v.to_attribute_value().map_err(|e| e.with_field(k))?);
        }
        Ok(AttributeValue::M(map))
    }

    fn from_attribute_value(value: AttributeValue) -> Result<Self, ConversionError> {
        match value {
            AttributeValue::M(m) => {
                let mut result = HashMap::with_capacity(m.len());
                for (k, v) in m {
                    let v = V::from_attribute_value(v).map_err(|e| e.with_field(&k))?;
                    result.insert(k, v);
                }
                Ok(result)
            }
            other => Err(ConversionError::type_mismatch("M", other.type_name())),
        }
    }
}

impl AttributeValueConvert for BTreeSet<String> {
    fn to_attribute_value(&self) -> Result<AttributeValue, ConversionError> {
        Ok(AttributeValue::Ss(self.iter().cloned().collect()))
    }

    fn from_attribute_value(value: AttributeValue) -> Result<Self, ConversionError> {
        match value {
            AttributeValue::Ss(set) => Ok(set.into_iter().collect()),
            other => Err(ConversionError::type_mismatch("SS", other.type_name())),
        }
    }
}

impl AttributeValueConvert for HashSet<String> {
    fn to_attribute_value(&self) -> Result<AttributeValue, ConversionError> {
        let mut sorted: Vec<String> = self.iter().cloned().collect();
        sorted.sort();
        Ok(AttributeValue::Ss(sorted))
    }

    fn from_attribute_value(value: AttributeValue) -> Result<Self, ConversionError> {
        match value {
            AttributeValue::Ss(set) => Ok(set.into_iter().collect()),
            other => Err(ConversionError::type_mismatch("SS", other.type_name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_roundtrip() {
        let original = "hello".to_string();
        let av = original.to_attribute_value().unwrap();
        let recovered = String::from_attribute_value(av).unwrap();
        assert_eq!(original, recovered);
    }

    #[test]
    fn test_str_serializes_only() {
        assert_eq!(
            "hello".to_attribute_value().unwrap(),
            AttributeValue::S("hello".into())
        );
        assert!(<&str>::from_attribute_value(AttributeValue::S("hello".into())).is_err());
    }

    #[test]
    fn test_i64_roundtrip() {
        let original: i64 = -42;
        let av = original.to_attribute_value().unwrap();
        assert_eq!(av, AttributeValue::N("-42".into()));
        assert_eq!(i64::from_attribute_value(av).unwrap(), original);
    }

    #[test]
    fn test_f64_nan_is_unsupported() {
        let err = f64::NAN.to_attribute_value().unwrap_err();
        assert!(err.to_string().contains("unsupported type"));
    }

    #[test]
    fn test_option_none_is_null() {
        let original: Option<String> = None;
        let av = original.to_attribute_value().unwrap();
        assert_eq!(av, AttributeValue::Null(true));
        assert_eq!(Option::<String>::from_attribute_value(av).unwrap(), None);
    }

    #[test]
    fn test_string_set_is_ss() {
        let set: HashSet<String> = ["b", "a"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            set.to_attribute_value().unwrap(),
            AttributeValue::Ss(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_map_error_names_the_field() {
        let mut map = HashMap::new();
        map.insert("score".to_string(), f64::INFINITY);
        let err = map.to_attribute_value().unwrap_err();
        assert_eq!(err.field(), Some("score"));
    }

    #[test]
    fn test_number_sets_are_unsupported_in_values() {
        let err = Value::from_attribute_value(AttributeValue::Ns(vec!["1".into()])).unwrap_err();
        assert!(matches!(
            err.kind(),
            crate::error::ConversionErrorKind::UnsupportedType { type_name: "NS" }
        ));
    }

    #[test]
    fn test_type_mismatch_error() {
        let av = AttributeValue::N("42".to_string());
        let err = String::from_attribute_value(av).unwrap_err();
        assert!(err.to_string().contains("expected S"));
    }
}
