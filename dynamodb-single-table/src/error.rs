/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Error taxonomy for table operations.

use std::fmt;

use dynamodb_single_table_core::{ConversionError, KeyError, ServiceError};
use dynamodb_single_table_expressions::ExpressionError;

use crate::transaction::TransactionCanceled;

/// Classification of a failure reported by the store.
///
/// Kinds are derived from the service error code through a fixed table, see
/// [`ErrorKind::from_code`]. Codes that are not in the table map to
/// [`ErrorKind::Unhandled`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Provisioned throughput or the account request limit was exceeded.
    Capacity,
    /// A condition expression evaluated to false.
    ConditionalCheckFailed,
    /// An item collection grew past the size limit.
    ItemCollectionSizeLimitExceeded,
    /// The request was throttled.
    Throttling,
    /// The request was rejected as invalid.
    Validation,
    /// A transaction could not be completed.
    Transaction,
    /// Another transaction touched the same items.
    TransactionConflict,
    /// A `TransactWriteItems` call was canceled.
    TransactionCanceled,
    /// Any other store error.
    Unhandled,
}

const ERROR_CODES: &[(&str, ErrorKind)] = &[
    ("ProvisionedThroughputExceededException", ErrorKind::Capacity),
    ("RequestLimitExceeded", ErrorKind::Capacity),
    ("ConditionalCheckFailedException", ErrorKind::ConditionalCheckFailed),
    (
        "ItemCollectionSizeLimitExceededException",
        ErrorKind::ItemCollectionSizeLimitExceeded,
    ),
    ("ThrottlingException", ErrorKind::Throttling),
    ("ValidationException", ErrorKind::Validation),
    ("TransactionConflictException", ErrorKind::TransactionConflict),
    ("TransactionInProgressException", ErrorKind::Transaction),
    ("TransactionCanceledException", ErrorKind::Transaction),
];

// Tokens used in the cancellation reasons of a canceled transaction.
const REASON_CODES: &[(&str, ErrorKind)] = &[
    ("ConditionalCheckFailed", ErrorKind::ConditionalCheckFailed),
    (
        "ItemCollectionSizeLimitExceeded",
        ErrorKind::ItemCollectionSizeLimitExceeded,
    ),
    ("TransactionConflict", ErrorKind::TransactionConflict),
    ("ProvisionedThroughputExceeded", ErrorKind::Capacity),
    ("ThrottlingError", ErrorKind::Throttling),
    ("ValidationError", ErrorKind::Validation),
];

impl ErrorKind {
    /// Classifies a service error code.
    pub fn from_code(code: &str) -> ErrorKind {
        ERROR_CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, kind)| *kind)
            .unwrap_or(ErrorKind::Unhandled)
    }

    /// Classifies a cancellation reason token. `None` means the item did not fail.
    pub(crate) fn from_reason(token: &str) -> Option<ErrorKind> {
        if token == "None" {
            return None;
        }
        Some(
            REASON_CODES
                .iter()
                .find(|(c, _)| *c == token)
                .map(|(_, kind)| *kind)
                .unwrap_or(ErrorKind::Unhandled),
        )
    }

    /// Whether this kind belongs to the transaction family.
    pub fn is_transaction_error(self) -> bool {
        matches!(
            self,
            ErrorKind::Transaction | ErrorKind::TransactionConflict | ErrorKind::TransactionCanceled
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorKind::Capacity => "capacity exceeded",
            ErrorKind::ConditionalCheckFailed => "conditional check failed",
            ErrorKind::ItemCollectionSizeLimitExceeded => "item collection size limit exceeded",
            ErrorKind::Throttling => "throttled",
            ErrorKind::Validation => "validation error",
            ErrorKind::Transaction => "transaction error",
            ErrorKind::TransactionConflict => "transaction conflict",
            ErrorKind::TransactionCanceled => "transaction canceled",
            ErrorKind::Unhandled => "database error",
        };
        f.write_str(text)
    }
}

/// A failure reported by the store, classified by its error code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {source}")]
pub struct DatabaseError {
    kind: ErrorKind,
    source: ServiceError,
}

impl DatabaseError {
    /// Classifies a service error by its code.
    pub fn new(source: ServiceError) -> Self {
        Self {
            kind: ErrorKind::from_code(&source.code),
            source,
        }
    }

    pub(crate) fn with_kind(kind: ErrorKind, source: ServiceError) -> Self {
        Self { kind, source }
    }

    /// The classified kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The service error code.
    pub fn code(&self) -> &str {
        &self.source.code
    }

    /// The service error message.
    pub fn message(&self) -> &str {
        &self.source.message
    }

    /// The operation that failed.
    pub fn operation_name(&self) -> &str {
        &self.source.operation_name
    }

    /// The underlying service error.
    pub fn service_error(&self) -> &ServiceError {
        &self.source
    }
}

/// Errors returned by table operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A value could not be converted to or from its wire form.
    #[error("type conversion failed: {0}")]
    Conversion(#[from] ConversionError),
    /// An entity name or key string was invalid.
    #[error(transparent)]
    Key(#[from] KeyError),
    /// A key condition could not be rendered.
    #[error(transparent)]
    Expression(#[from] ExpressionError),
    /// An operation argument was out of range.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong.
        message: String,
    },
    /// The store reported a failure.
    #[error(transparent)]
    Database(#[from] DatabaseError),
    /// A transaction was canceled.
    #[error(transparent)]
    TransactionCanceled(#[from] TransactionCanceled),
    /// The store returned data that does not match the request.
    #[error("unexpected response: {message}")]
    UnexpectedResponse {
        /// What did not match.
        message: String,
    },
}

impl Error {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn unexpected_response(message: impl Into<String>) -> Self {
        Error::UnexpectedResponse {
            message: message.into(),
        }
    }

    /// The store error kind, if this error came from the store.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.database_error().map(DatabaseError::kind)
    }

    /// The store error, if this error came from the store.
    pub fn database_error(&self) -> Option<&DatabaseError> {
        match self {
            Error::Database(err) => Some(err),
            Error::TransactionCanceled(err) => Some(err.database_error()),
            _ => None,
        }
    }

    /// Whether the store rejected a condition expression.
    pub fn is_conditional_check_failed(&self) -> bool {
        self.kind() == Some(ErrorKind::ConditionalCheckFailed)
    }
}
