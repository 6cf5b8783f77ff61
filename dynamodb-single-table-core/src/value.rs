/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Generic in-memory values.

use crate::error::ConversionError;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Plain attribute map returned to and accepted from callers.
pub type Attributes = HashMap<String, Value>;

/// A generic attribute value, independent of the wire tagging.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// UTF-8 string.
    String(String),
    /// Decimal number.
    Number(Number),
    /// Binary blob.
    Binary(Vec<u8>),
    /// Boolean.
    Bool(bool),
    /// Null.
    Null,
    /// List of values.
    List(Vec<Value>),
    /// Set of strings.
    StringSet(BTreeSet<String>),
    /// Mapping from string to value.
    Map(HashMap<String, Value>),
}

impl Value {
    /// Returns the string payload if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number if this is a number value.
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the boolean if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns true if this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Converts into a JSON document.
    ///
    /// Numbers become JSON numbers when they fit an `i64`, `u64` or `f64`,
    /// binary becomes an array of bytes and string sets become arrays.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Number(n) => n.to_json(),
            Value::Binary(bytes) => bytes.iter().copied().collect(),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Null => serde_json::Value::Null,
            Value::List(values) => values.iter().map(Value::to_json).collect(),
            Value::StringSet(set) => set.iter().cloned().collect(),
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

/// A number kept in its decimal string form so that no precision is lost.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Number(String);

impl Number {
    /// The decimal string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the number as an `i64`, if it is an integer in range.
    pub fn as_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    /// Parses the number as an `f64`. May lose precision.
    pub fn as_f64(&self) -> Option<f64> {
        self.0.parse().ok()
    }

    fn to_json(&self) -> serde_json::Value {
        if let Ok(i) = self.0.parse::<i64>() {
            return i.into();
        }
        if let Ok(u) = self.0.parse::<u64>() {
            return u.into();
        }
        self.as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(self.0.clone()))
    }
}

// Accepts `-?digits(.digits)?([eE][+-]?digits)?`, also `.5` and `5.`.
fn is_decimal(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(pos) => (&s[..pos], Some(&s[pos + 1..])),
        None => (s, None),
    };
    let (int, frac) = match mantissa.split_once('.') {
        Some((int, frac)) => (int, frac),
        None => (mantissa, ""),
    };
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if int.is_empty() && frac.is_empty() {
        return false;
    }
    if !all_digits(int) || !all_digits(frac) {
        return false;
    }
    match exponent {
        None => true,
        Some(exp) => {
            let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !exp.is_empty() && all_digits(exp)
        }
    }
}

impl FromStr for Number {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_decimal(s) {
            Ok(Number(s.to_string()))
        } else {
            Err(ConversionError::invalid_value(format!(
                "'{}' is not a decimal number",
                s
            )))
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! number_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number(value.to_string())
                }
            }

            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(Number::from(value))
                }
            }
        )*
    };
}

number_from_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, isize, usize);

impl TryFrom<f64> for Number {
    type Error = ConversionError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value.is_finite() {
            // `Display` for f64 is the shortest round-tripping form without an exponent.
            Ok(Number(value.to_string()))
        } else {
            Err(ConversionError::unsupported("non-finite f64"))
        }
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Binary(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::List(values)
    }
}

impl From<BTreeSet<String>> for Value {
    fn from(values: BTreeSet<String>) -> Self {
        Value::StringSet(values)
    }
}

impl From<HashSet<String>> for Value {
    fn from(values: HashSet<String>) -> Self {
        Value::StringSet(values.into_iter().collect())
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(values: HashMap<String, Value>) -> Self {
        Value::Map(values)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decimal_validation() {
        let long = "123456789012345678901234567890";
        for ok in ["0", "-1", "3.14", "1e10", "1.5E-3", ".5", "5.", long] {
            assert!(ok.parse::<Number>().is_ok(), "{} should parse", ok);
        }
        for bad in ["", "-", ".", "1.2.3", "abc", "1e", "1e+", "NaN", "inf", " 1"] {
            assert!(bad.parse::<Number>().is_err(), "{} should not parse", bad);
        }
    }

    #[test]
    fn big_numbers_keep_their_digits() {
        let n: Number = "12345678901234567890.000000000001".parse().unwrap();
        assert_eq!(n.as_str(), "12345678901234567890.000000000001");
    }

    #[test]
    fn non_finite_floats_are_unsupported() {
        assert!(Number::try_from(f64::NAN).is_err());
        assert!(Number::try_from(f64::INFINITY).is_err());
        assert_eq!(Number::try_from(0.1).unwrap().as_str(), "0.1");
    }

    #[test]
    fn option_maps_to_null() {
        assert_eq!(Value::from(None::<String>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::String("a".into()));
    }

    #[test]
    fn json_view() {
        let mut map = HashMap::new();
        map.insert("n".to_string(), Value::from(7));
        map.insert("big".to_string(), Value::from(u64::MAX));
        map.insert("f".to_string(), Value::Number("2.5".parse().unwrap()));
        map.insert("tags".to_string(), Value::from(BTreeSet::from(["x".to_string()])));
        assert_eq!(
            Value::Map(map).to_json(),
            json!({"n": 7, "big": u64::MAX, "f": 2.5, "tags": ["x"]})
        );
    }
}
