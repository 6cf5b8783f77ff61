/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use dynamodb_single_table_core::ConversionError;
use std::fmt;

/// Error raised when a key condition cannot be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionError {
    kind: ExpressionErrorKind,
}

/// The kind of expression error that occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExpressionErrorKind {
    /// An `AND` was nested inside another `AND`.
    NestedCondition,
    /// No clause is an equality on the partition key.
    MissingEquality,
    /// Both clauses of an `AND` name the same attribute.
    DuplicateAttribute {
        /// The repeated attribute name.
        name: String,
    },
    /// An operand could not be converted to a wire value.
    Conversion(ConversionError),
}

impl ExpressionError {
    pub(crate) fn new(kind: ExpressionErrorKind) -> Self {
        Self { kind }
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> &ExpressionErrorKind {
        &self.kind
    }
}

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExpressionErrorKind::NestedCondition => {
                write!(f, "key conditions support at most two clauses joined by AND")
            }
            ExpressionErrorKind::MissingEquality => {
                write!(f, "key condition needs an equality on the partition key")
            }
            ExpressionErrorKind::DuplicateAttribute { name } => {
                write!(f, "key condition names attribute '{}' twice", name)
            }
            ExpressionErrorKind::Conversion(err) => write!(f, "invalid operand: {}", err),
        }
    }
}

impl std::error::Error for ExpressionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ExpressionErrorKind::Conversion(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConversionError> for ExpressionError {
    fn from(err: ConversionError) -> Self {
        Self::new(ExpressionErrorKind::Conversion(err))
    }
}
