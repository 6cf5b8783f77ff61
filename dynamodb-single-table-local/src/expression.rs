/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Evaluation of the expression subset the access layer sends.

use std::cmp::Ordering;
use std::collections::HashMap;

use dynamodb_single_table_core::{AttributeValue, Item};
use once_cell::sync::Lazy;
use regex::Regex;

static CONDITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(attribute_exists|attribute_not_exists)\(\s*(#?[A-Za-z0-9_]+)\s*\)$").unwrap()
});
static COMPARISON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#?[A-Za-z0-9_]+)\s*(=|<=|<|>=|>)\s*(:[A-Za-z0-9_]+)$").unwrap());
static BETWEEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(#?[A-Za-z0-9_]+) BETWEEN (:[A-Za-z0-9_]+) AND (:[A-Za-z0-9_]+)$").unwrap()
});
static BEGINS_WITH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^begins_with\(\s*(#?[A-Za-z0-9_]+)\s*,\s*(:[A-Za-z0-9_]+)\s*\)$").unwrap()
});

/// A condition expression on the existence of an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Condition {
    Exists(String),
    NotExists(String),
}

impl Condition {
    pub(crate) fn parse(expression: &str) -> Result<Self, String> {
        let captures = CONDITION
            .captures(expression.trim())
            .ok_or_else(|| format!("Invalid ConditionExpression: {}", expression))?;
        let name = captures[2].to_string();
        Ok(match &captures[1] {
            "attribute_exists" => Condition::Exists(name),
            _ => Condition::NotExists(name),
        })
    }

    pub(crate) fn check(&self, item: Option<&Item>) -> bool {
        match self {
            Condition::Exists(name) => item.map_or(false, |i| i.contains_key(name)),
            Condition::NotExists(name) => !item.map_or(false, |i| i.contains_key(name)),
        }
    }
}

/// Checks an optional condition expression against the current item.
pub(crate) fn condition_holds(
    expression: Option<&str>,
    item: Option<&Item>,
) -> Result<bool, String> {
    match expression {
        Some(expression) => Ok(Condition::parse(expression)?.check(item)),
        None => Ok(true),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Operator {
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Le => ordering != Ordering::Greater,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Ge => ordering != Ordering::Less,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Compare(Operator, AttributeValue),
    Between(AttributeValue, AttributeValue),
    BeginsWith(AttributeValue),
}

/// One clause of a key condition, with placeholders resolved.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Clause {
    pub(crate) name: String,
    predicate: Predicate,
}

impl Clause {
    pub(crate) fn is_equality(&self) -> bool {
        matches!(self.predicate, Predicate::Compare(Operator::Eq, _))
    }

    pub(crate) fn matches(&self, value: &AttributeValue) -> bool {
        match &self.predicate {
            Predicate::Compare(op, rhs) => compare(value, rhs).map_or(false, |o| op.accepts(o)),
            Predicate::Between(low, high) => {
                compare(value, low).map_or(false, |o| o != Ordering::Less)
                    && compare(value, high).map_or(false, |o| o != Ordering::Greater)
            }
            Predicate::BeginsWith(prefix) => match (value, prefix) {
                (AttributeValue::S(v), AttributeValue::S(p)) => v.starts_with(p.as_str()),
                (AttributeValue::B(v), AttributeValue::B(p)) => v.starts_with(p),
                _ => false,
            },
        }
    }
}

/// Orders two scalar key values of the same type.
pub(crate) fn compare(a: &AttributeValue, b: &AttributeValue) -> Option<Ordering> {
    match (a, b) {
        (AttributeValue::S(a), AttributeValue::S(b)) => Some(a.cmp(b)),
        (AttributeValue::B(a), AttributeValue::B(b)) => Some(a.cmp(b)),
        (AttributeValue::N(a), AttributeValue::N(b)) => {
            let (a, b) = (a.parse::<f64>().ok()?, b.parse::<f64>().ok()?);
            a.partial_cmp(&b)
        }
        _ => None,
    }
}

fn resolve_name(token: &str, names: &HashMap<String, String>) -> Result<String, String> {
    if token.starts_with('#') {
        names.get(token).cloned().ok_or_else(|| {
            format!(
                "An expression attribute name used in the document path is not defined; \
                 attribute name: {}",
                token
            )
        })
    } else {
        Ok(token.to_string())
    }
}

fn resolve_value(
    token: &str,
    values: &HashMap<String, AttributeValue>,
) -> Result<AttributeValue, String> {
    values.get(token).cloned().ok_or_else(|| {
        format!(
            "An expression attribute value used in expression is not defined; attribute value: {}",
            token
        )
    })
}

fn parse_clause(
    clause: &str,
    names: &HashMap<String, String>,
    values: &HashMap<String, AttributeValue>,
) -> Result<Option<Clause>, String> {
    let clause = clause.trim();
    let (name, predicate) = if let Some(c) = BETWEEN.captures(clause) {
        let predicate = Predicate::Between(
            resolve_value(&c[2], values)?,
            resolve_value(&c[3], values)?,
        );
        (resolve_name(&c[1], names)?, predicate)
    } else if let Some(c) = BEGINS_WITH.captures(clause) {
        let predicate = Predicate::BeginsWith(resolve_value(&c[2], values)?);
        (resolve_name(&c[1], names)?, predicate)
    } else if let Some(c) = COMPARISON.captures(clause) {
        let op = match &c[2] {
            "=" => Operator::Eq,
            "<" => Operator::Lt,
            "<=" => Operator::Le,
            ">" => Operator::Gt,
            _ => Operator::Ge,
        };
        let predicate = Predicate::Compare(op, resolve_value(&c[3], values)?);
        (resolve_name(&c[1], names)?, predicate)
    } else {
        return Ok(None);
    };
    Ok(Some(Clause { name, predicate }))
}

/// Parses a key condition of one clause, or two clauses joined with `AND`.
pub(crate) fn parse_key_condition(
    expression: &str,
    names: &HashMap<String, String>,
    values: &HashMap<String, AttributeValue>,
) -> Result<Vec<Clause>, String> {
    let expression = expression.trim();
    if let Some(clause) = parse_clause(expression, names, values)? {
        return Ok(vec![clause]);
    }
    let inner = expression
        .strip_prefix('(')
        .and_then(|e| e.strip_suffix(')'))
        .unwrap_or(expression);
    // BETWEEN also contains " AND ", so try every split point.
    for (at, sep) in inner.match_indices(" AND ") {
        let (left, right) = (&inner[..at], &inner[at + sep.len()..]);
        if let (Some(left), Some(right)) = (
            parse_clause(left, names, values)?,
            parse_clause(right, names, values)?,
        ) {
            return Ok(vec![left, right]);
        }
    }
    Err(format!("Invalid KeyConditionExpression: {}", expression))
}

/// Keeps only the attributes named in a projection expression.
pub(crate) fn project(
    item: &Item,
    projection: Option<&str>,
    names: &HashMap<String, String>,
) -> Result<Item, String> {
    let projection = match projection {
        Some(p) => p,
        None => return Ok(item.clone()),
    };
    let mut projected = Item::new();
    for token in projection.split(',').map(str::trim) {
        if token.is_empty() {
            return Err(format!("Invalid ProjectionExpression: {}", projection));
        }
        let name = resolve_name(token, names)?;
        if let Some(value) = item.get(&name) {
            projected.insert(name, value.clone());
        }
    }
    Ok(projected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynamodb_single_table_expressions::Key;
    use pretty_assertions::assert_eq;

    fn s(v: &str) -> AttributeValue {
        AttributeValue::S(v.to_string())
    }

    fn item(pairs: &[(&str, &str)]) -> Item {
        pairs.iter().map(|(k, v)| (k.to_string(), s(v))).collect()
    }

    #[test]
    fn existence_conditions() {
        let existing = item(&[("PK", "USER#a")]);
        assert!(condition_holds(Some("attribute_exists(PK)"), Some(&existing)).unwrap());
        assert!(!condition_holds(Some("attribute_exists(PK)"), None).unwrap());
        assert!(!condition_holds(Some("attribute_not_exists(PK)"), Some(&existing)).unwrap());
        assert!(condition_holds(Some("attribute_not_exists(PK)"), None).unwrap());
        assert!(condition_holds(None, None).unwrap());
        assert!(condition_holds(Some("size(PK) > 3"), None).is_err());
    }

    #[test]
    fn built_conditions_round_trip() {
        let built = (Key::new("PK").eq("USER#a") & Key::new("SK").between("ORDER#1", "ORDER#5"))
            .build()
            .unwrap();
        let clauses =
            parse_key_condition(&built.expression, &built.names, &built.values).unwrap();
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].name, "PK");
        assert!(clauses[0].is_equality());
        assert_eq!(clauses[1].name, "SK");
        assert!(clauses[1].matches(&s("ORDER#3")));
        assert!(clauses[1].matches(&s("ORDER#5")));
        assert!(!clauses[1].matches(&s("ORDER#6")));
    }

    #[test]
    fn begins_with_and_comparisons() {
        let built = (Key::new("PK").eq("USER#a") & Key::new("SK").begins_with("ORDER#"))
            .build()
            .unwrap();
        let clauses =
            parse_key_condition(&built.expression, &built.names, &built.values).unwrap();
        assert!(clauses[1].matches(&s("ORDER#1")));
        assert!(!clauses[1].matches(&s("USER#a")));

        let built = (Key::new("PK").eq("p") & Key::new("Rank").gt(10)).build().unwrap();
        let clauses =
            parse_key_condition(&built.expression, &built.names, &built.values).unwrap();
        assert!(clauses[1].matches(&AttributeValue::N("11".into())));
        assert!(!clauses[1].matches(&AttributeValue::N("9.5".into())));
        assert!(!clauses[1].matches(&s("11")));
    }

    #[test]
    fn undefined_placeholders_are_errors() {
        let err = parse_key_condition("#n0 = :v0", &HashMap::new(), &HashMap::new()).unwrap_err();
        assert!(err.contains("#n0"), "{}", err);
        assert!(parse_key_condition("PK == x", &HashMap::new(), &HashMap::new()).is_err());
    }

    #[test]
    fn projection_keeps_named_attributes() {
        let full = item(&[("PK", "a"), ("SK", "b"), ("Name", "c")]);
        let mut names = HashMap::new();
        names.insert("#name".to_string(), "Name".to_string());
        let projected = project(&full, Some("SK, #name, Missing"), &names).unwrap();
        assert_eq!(projected, item(&[("SK", "b"), ("Name", "c")]));
        assert_eq!(project(&full, None, &names).unwrap(), full);
        assert!(project(&full, Some("SK,,PK"), &names).is_err());
    }
}
