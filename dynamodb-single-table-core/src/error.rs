/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Error types for value conversion and key construction.

use std::fmt;

/// Error that occurs when converting between in-memory values and wire attribute values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionError {
    kind: ConversionErrorKind,
    field: Option<String>,
}

/// The kind of conversion error that occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConversionErrorKind {
    /// A required attribute was missing from the item.
    MissingAttribute,
    /// The attribute value had an unexpected type.
    InvalidType {
        /// The expected wire type.
        expected: &'static str,
        /// The actual wire type found.
        actual: &'static str,
    },
    /// The value could not be parsed or was invalid.
    InvalidValue {
        /// Description of why the value was invalid.
        message: String,
    },
    /// The value is of a kind the codec cannot represent.
    UnsupportedType {
        /// Name of the unsupported kind.
        type_name: &'static str,
    },
}

impl ConversionError {
    /// Creates an error for a missing attribute.
    pub fn missing_attribute(field: impl Into<String>) -> Self {
        Self {
            kind: ConversionErrorKind::MissingAttribute,
            field: Some(field.into()),
        }
    }

    /// Creates an error for an invalid value.
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self {
            kind: ConversionErrorKind::InvalidValue {
                message: message.into(),
            },
            field: None,
        }
    }

    /// Creates a type error without a field name.
    pub fn type_mismatch(expected: &'static str, actual: &'static str) -> Self {
        Self {
            kind: ConversionErrorKind::InvalidType { expected, actual },
            field: None,
        }
    }

    /// Creates an error for a value kind the codec does not support.
    pub fn unsupported(type_name: &'static str) -> Self {
        Self {
            kind: ConversionErrorKind::UnsupportedType { type_name },
            field: None,
        }
    }

    /// Attaches the attribute name the error occurred on, unless one is already set.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        if self.field.is_none() {
            self.field = Some(field.into());
        }
        self
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> &ConversionErrorKind {
        &self.kind
    }

    /// Returns the field name if available.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ConversionErrorKind::MissingAttribute => write!(f, "missing required attribute")?,
            ConversionErrorKind::InvalidType { expected, actual } => {
                write!(f, "invalid type: expected {}, got {}", expected, actual)?
            }
            ConversionErrorKind::InvalidValue { message } => {
                write!(f, "invalid value: {}", message)?
            }
            ConversionErrorKind::UnsupportedType { type_name } => {
                write!(f, "unsupported type: {}", type_name)?
            }
        }
        if let Some(field) = &self.field {
            write!(f, " (attribute '{}')", field)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConversionError {}

/// Error raised when an entity name cannot form a key prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyError {
    name: String,
    reason: &'static str,
}

impl KeyError {
    pub(crate) fn invalid_entity(name: impl Into<String>, reason: &'static str) -> Self {
        Self {
            name: name.into(),
            reason,
        }
    }

    /// The offending entity name or key string.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid entity '{}': {}", self.name, self.reason)
    }
}

impl std::error::Error for KeyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_is_reported_once() {
        let err = ConversionError::unsupported("f64::NAN")
            .with_field("score")
            .with_field("outer");
        assert_eq!(err.field(), Some("score"));
        assert_eq!(
            err.to_string(),
            "unsupported type: f64::NAN (attribute 'score')"
        );
    }

    #[test]
    fn type_mismatch_display() {
        let err = ConversionError::type_mismatch("S", "N");
        assert_eq!(err.to_string(), "invalid type: expected S, got N");
    }
}
