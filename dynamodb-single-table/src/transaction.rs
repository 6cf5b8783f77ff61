/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Canceled transactions and their per-item cancellation reasons.

use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;

use crate::error::{DatabaseError, ErrorKind};
use crate::op_args::WriteOp;

// Example match: "reasons [ConditionalCheckFailed, None]"
static REASONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"reasons\W+\[([A-Za-z0-9, ]+)]").unwrap());

/// Per-item cancellation reasons, in the order of the transaction's operations.
///
/// `None` means the item at that position did not cause the cancellation.
pub type CancellationReasons = Vec<Option<ErrorKind>>;

/// The cancellation reasons in an error message do not line up with the
/// operations of the transaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "transaction cancellation reasons don't match transaction arguments \
     ({found} reasons for {expected} operations) in error: {message}"
)]
pub struct ReasonsMismatch {
    expected: usize,
    found: usize,
    message: String,
}

/// A `TransactWriteItems` call that the store canceled.
#[derive(Debug, thiserror::Error)]
#[error("transaction of {} operations canceled", .op_args.len())]
pub struct TransactionCanceled {
    #[source]
    error: DatabaseError,
    op_args: Vec<WriteOp>,
    reasons: OnceCell<CancellationReasons>,
}

impl TransactionCanceled {
    pub(crate) fn new(error: DatabaseError, op_args: Vec<WriteOp>) -> Self {
        Self {
            error,
            op_args,
            reasons: OnceCell::new(),
        }
    }

    /// The operations that formed the transaction.
    pub fn op_args(&self) -> &[WriteOp] {
        &self.op_args
    }

    /// The store error that canceled the transaction.
    pub fn database_error(&self) -> &DatabaseError {
        &self.error
    }

    /// The cancellation reason of each operation, parsed from the error message.
    ///
    /// Fails if the message lists a different number of reasons than there
    /// were operations.
    pub fn reasons(&self) -> Result<&[Option<ErrorKind>], ReasonsMismatch> {
        self.reasons
            .get_or_try_init(|| parse_reasons(self.error.message(), self.op_args.len()))
            .map(Vec::as_slice)
    }

    /// Whether any operation failed with the given kind.
    pub fn has_error(&self, kind: ErrorKind) -> Result<bool, ReasonsMismatch> {
        Ok(self.reasons()?.iter().any(|r| *r == Some(kind)))
    }
}

fn extract_reasons(message: &str) -> Vec<&str> {
    let reasons = match REASONS.captures(message).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => return Vec::new(),
    };
    let split: Vec<&str> = reasons.split(", ").collect();
    if split[0] == reasons {
        reasons.split(',').collect()
    } else {
        split
    }
}

pub(crate) fn parse_reasons(
    message: &str,
    expected: usize,
) -> Result<CancellationReasons, ReasonsMismatch> {
    let reasons: CancellationReasons = extract_reasons(message)
        .into_iter()
        .map(ErrorKind::from_reason)
        .collect();
    if reasons.len() != expected {
        return Err(ReasonsMismatch {
            expected,
            found: reasons.len(),
            message: message.to_string(),
        });
    }
    Ok(reasons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op_args::DeleteArg;
    use dynamodb_single_table_core::{EntityName, PartitionKey, ServiceError, SortKey};
    use pretty_assertions::assert_eq;

    const PREFIX: &str =
        "Transaction cancelled, please refer cancellation reasons for specific reasons ";

    struct User;
    impl EntityName for User {
        const NAME: &'static str = "User";
    }

    fn canceled(message: &str, ops: usize) -> TransactionCanceled {
        let op_args = (0..ops)
            .map(|i| {
                let id = i.to_string();
                DeleteArg::new(PartitionKey::new::<User>(&id), SortKey::new::<User>(&id)).into()
            })
            .collect();
        let error = DatabaseError::with_kind(
            ErrorKind::TransactionCanceled,
            ServiceError::new("TransactionCanceledException", message, "TransactWriteItems"),
        );
        TransactionCanceled::new(error, op_args)
    }

    #[test]
    fn empty_message_without_ops() {
        assert_eq!(canceled("", 0).reasons().unwrap(), &[] as &[Option<ErrorKind>]);
    }

    #[test]
    fn mismatch_is_an_error() {
        let err = canceled("", 1).reasons().unwrap_err();
        assert_eq!(err.expected, 1);
        assert_eq!(err.found, 0);
    }

    #[test]
    fn one_reason() {
        let msg = format!("{}[ConditionalCheckFailed]", PREFIX);
        assert_eq!(
            canceled(&msg, 1).reasons().unwrap(),
            &[Some(ErrorKind::ConditionalCheckFailed)]
        );
    }

    #[test]
    fn two_reasons() {
        let msg = format!("{}[ConditionalCheckFailed, None]", PREFIX);
        assert_eq!(
            canceled(&msg, 2).reasons().unwrap(),
            &[Some(ErrorKind::ConditionalCheckFailed), None]
        );
    }

    #[test]
    fn reasons_without_spaces() {
        let msg = format!("{}[ConditionalCheckFailed,None]", PREFIX);
        assert_eq!(
            canceled(&msg, 2).reasons().unwrap(),
            &[Some(ErrorKind::ConditionalCheckFailed), None]
        );
    }

    #[test]
    fn all_known_tokens() {
        let msg = format!(
            "{}[ItemCollectionSizeLimitExceeded, TransactionConflict, \
             ProvisionedThroughputExceeded, ThrottlingError, ValidationError, Mystery]",
            PREFIX
        );
        assert_eq!(
            canceled(&msg, 6).reasons().unwrap(),
            &[
                Some(ErrorKind::ItemCollectionSizeLimitExceeded),
                Some(ErrorKind::TransactionConflict),
                Some(ErrorKind::Capacity),
                Some(ErrorKind::Throttling),
                Some(ErrorKind::Validation),
                Some(ErrorKind::Unhandled),
            ]
        );
    }

    #[test]
    fn has_error() {
        let msg = format!("{}[ConditionalCheckFailed, None]", PREFIX);
        let err = canceled(&msg, 2);
        assert!(err.has_error(ErrorKind::ConditionalCheckFailed).unwrap());
        assert!(!err.has_error(ErrorKind::Validation).unwrap());
    }

    #[test]
    fn reasons_are_parsed_once() {
        let msg = format!("{}[None]", PREFIX);
        let err = canceled(&msg, 1);
        let first = err.reasons().unwrap().as_ptr();
        assert_eq!(err.reasons().unwrap().as_ptr(), first);
    }
}
