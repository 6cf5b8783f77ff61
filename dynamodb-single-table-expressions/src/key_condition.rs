/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::collections::HashMap;
use std::ops::BitAnd;

use dynamodb_single_table_core::{AttributeValue, AttributeValueConvert, Value};

use crate::error::{ExpressionError, ExpressionErrorKind};

/// A key attribute to build conditions on.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    name: String,
}

impl Key {
    /// Names the key attribute, e.g. `PK`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn compare(self, operator: Operator, operands: Vec<Value>) -> Comparison {
        Comparison {
            name: self.name,
            operator,
            operands,
        }
    }

    /// `name = value`
    pub fn eq(self, value: impl Into<Value>) -> Comparison {
        self.compare(Operator::Equals, vec![value.into()])
    }

    /// `name < value`
    pub fn lt(self, value: impl Into<Value>) -> Comparison {
        self.compare(Operator::LessThan, vec![value.into()])
    }

    /// `name <= value`
    pub fn lte(self, value: impl Into<Value>) -> Comparison {
        self.compare(Operator::LessThanOrEqual, vec![value.into()])
    }

    /// `name > value`
    pub fn gt(self, value: impl Into<Value>) -> Comparison {
        self.compare(Operator::GreaterThan, vec![value.into()])
    }

    /// `name >= value`
    pub fn gte(self, value: impl Into<Value>) -> Comparison {
        self.compare(Operator::GreaterThanOrEqual, vec![value.into()])
    }

    /// `name BETWEEN low AND high`
    pub fn between(self, low: impl Into<Value>, high: impl Into<Value>) -> Comparison {
        self.compare(Operator::Between, vec![low.into(), high.into()])
    }

    /// `begins_with(name, prefix)`
    pub fn begins_with(self, prefix: impl Into<Value>) -> Comparison {
        self.compare(Operator::BeginsWith, vec![prefix.into()])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Equals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Between,
    BeginsWith,
}

/// A single clause on one key attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    name: String,
    operator: Operator,
    operands: Vec<Value>,
}

impl Comparison {
    /// The attribute this clause constrains.
    pub fn attribute_name(&self) -> &str {
        &self.name
    }

    /// Whether this clause is an equality.
    pub fn is_equality(&self) -> bool {
        self.operator == Operator::Equals
    }
}

/// A key condition: one clause, or clauses joined by `AND`.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyCondition {
    /// A single clause.
    Comparison(Comparison),
    /// Two conditions joined by `AND`.
    And(Box<KeyCondition>, Box<KeyCondition>),
}

impl KeyCondition {
    /// Joins two conditions with `AND`.
    pub fn and(self, other: impl Into<KeyCondition>) -> KeyCondition {
        KeyCondition::And(Box::new(self), Box::new(other.into()))
    }

    /// Renders the condition with fresh `#n`/`:v` placeholders.
    ///
    /// The store accepts either a single equality on the partition key, or that
    /// equality joined with one clause on the sort key.
    pub fn build(&self) -> Result<BuiltKeyCondition, ExpressionError> {
        self.validate()?;
        let mut builder = Builder::default();
        builder.render(self)?;
        Ok(BuiltKeyCondition {
            expression: builder.expression,
            names: builder.names,
            values: builder.values,
        })
    }

    fn validate(&self) -> Result<(), ExpressionError> {
        match self {
            KeyCondition::Comparison(c) if c.is_equality() => Ok(()),
            KeyCondition::Comparison(_) => {
                Err(ExpressionError::new(ExpressionErrorKind::MissingEquality))
            }
            KeyCondition::And(left, right) => match (left.as_ref(), right.as_ref()) {
                (KeyCondition::Comparison(l), KeyCondition::Comparison(r)) => {
                    if l.name == r.name {
                        Err(ExpressionError::new(ExpressionErrorKind::DuplicateAttribute {
                            name: l.name.clone(),
                        }))
                    } else if !l.is_equality() && !r.is_equality() {
                        Err(ExpressionError::new(ExpressionErrorKind::MissingEquality))
                    } else {
                        Ok(())
                    }
                }
                _ => Err(ExpressionError::new(ExpressionErrorKind::NestedCondition)),
            },
        }
    }
}

impl From<Comparison> for KeyCondition {
    fn from(comparison: Comparison) -> Self {
        KeyCondition::Comparison(comparison)
    }
}

impl<R: Into<KeyCondition>> BitAnd<R> for Comparison {
    type Output = KeyCondition;

    fn bitand(self, rhs: R) -> KeyCondition {
        KeyCondition::from(self).and(rhs)
    }
}

impl<R: Into<KeyCondition>> BitAnd<R> for KeyCondition {
    type Output = KeyCondition;

    fn bitand(self, rhs: R) -> KeyCondition {
        self.and(rhs)
    }
}

/// A rendered key condition, ready for a `Query` request.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltKeyCondition {
    /// The expression, e.g. `(#n0 = :v0 AND begins_with(#n1, :v1))`.
    pub expression: String,
    /// `ExpressionAttributeNames`.
    pub names: HashMap<String, String>,
    /// `ExpressionAttributeValues`.
    pub values: HashMap<String, AttributeValue>,
}

#[derive(Default)]
struct Builder {
    expression: String,
    names: HashMap<String, String>,
    values: HashMap<String, AttributeValue>,
}

impl Builder {
    fn name_placeholder(&mut self, name: &str) -> String {
        let placeholder = format!("#n{}", self.names.len());
        self.names.insert(placeholder.clone(), name.to_string());
        placeholder
    }

    fn value_placeholder(&mut self, value: &Value) -> Result<String, ExpressionError> {
        let placeholder = format!(":v{}", self.values.len());
        self.values
            .insert(placeholder.clone(), value.to_attribute_value()?);
        Ok(placeholder)
    }

    fn render(&mut self, condition: &KeyCondition) -> Result<(), ExpressionError> {
        match condition {
            KeyCondition::Comparison(c) => self.render_comparison(c),
            KeyCondition::And(left, right) => {
                self.expression.push('(');
                self.render(left)?;
                self.expression.push_str(" AND ");
                self.render(right)?;
                self.expression.push(')');
                Ok(())
            }
        }
    }

    fn render_comparison(&mut self, c: &Comparison) -> Result<(), ExpressionError> {
        let name = self.name_placeholder(&c.name);
        let values = c
            .operands
            .iter()
            .map(|v| self.value_placeholder(v))
            .collect::<Result<Vec<_>, _>>()?;
        let rendered = match c.operator {
            Operator::Equals => format!("{} = {}", name, values[0]),
            Operator::LessThan => format!("{} < {}", name, values[0]),
            Operator::LessThanOrEqual => format!("{} <= {}", name, values[0]),
            Operator::GreaterThan => format!("{} > {}", name, values[0]),
            Operator::GreaterThanOrEqual => format!("{} >= {}", name, values[0]),
            Operator::Between => format!("{} BETWEEN {} AND {}", name, values[0], values[1]),
            Operator::BeginsWith => format!("begins_with({}, {})", name, values[0]),
        };
        self.expression.push_str(&rendered);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partition_equality() {
        let built = KeyCondition::from(Key::new("PK").eq("USER#a")).build().unwrap();
        assert_eq!(built.expression, "#n0 = :v0");
        assert_eq!(built.names["#n0"], "PK");
        assert_eq!(built.values[":v0"], AttributeValue::S("USER#a".into()));
    }

    #[test]
    fn partition_and_prefix() {
        let condition = Key::new("PK").eq("USER#a") & Key::new("SK").begins_with("ORDER#");
        let built = condition.build().unwrap();
        assert_eq!(built.expression, "(#n0 = :v0 AND begins_with(#n1, :v1))");
        assert_eq!(built.names["#n1"], "SK");
        assert_eq!(built.values[":v1"], AttributeValue::S("ORDER#".into()));
    }

    #[test]
    fn between_uses_two_values() {
        let condition = Key::new("PK").eq("USER#a") & Key::new("SK").between("A", "M");
        let built = condition.build().unwrap();
        assert_eq!(built.expression, "(#n0 = :v0 AND #n1 BETWEEN :v1 AND :v2)");
        assert_eq!(built.values.len(), 3);
    }

    #[test]
    fn comparison_operators() {
        for (condition, op) in [
            (Key::new("SK").lt(5), "<"),
            (Key::new("SK").lte(5), "<="),
            (Key::new("SK").gt(5), ">"),
            (Key::new("SK").gte(5), ">="),
        ] {
            let built = (Key::new("PK").eq("X#1") & condition).build().unwrap();
            assert_eq!(built.expression, format!("(#n0 = :v0 AND #n1 {} :v1)", op));
            assert_eq!(built.values[":v1"], AttributeValue::N("5".into()));
        }
    }

    #[test]
    fn placeholders_restart_per_build() {
        let condition = Key::new("PK").eq("USER#a") & Key::new("SK").eq("USER#a");
        assert_eq!(condition.build().unwrap(), condition.build().unwrap());
    }

    #[test]
    fn rejects_nested_and() {
        let condition =
            Key::new("PK").eq("a") & Key::new("SK").eq("b") & Key::new("GSI").eq("c");
        let err = condition.build().unwrap_err();
        assert_eq!(err.kind(), &ExpressionErrorKind::NestedCondition);
    }

    #[test]
    fn rejects_missing_equality() {
        let err = KeyCondition::from(Key::new("SK").begins_with("A"))
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), &ExpressionErrorKind::MissingEquality);
        let err = (Key::new("PK").gt(1) & Key::new("SK").lt(2)).build().unwrap_err();
        assert_eq!(err.kind(), &ExpressionErrorKind::MissingEquality);
    }

    #[test]
    fn rejects_repeated_attribute() {
        let err = (Key::new("PK").eq("a") & Key::new("PK").eq("b"))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("'PK'"));
    }
}
