//! Core error types for the analysis engine.
//!
//! Absent data (an untouched bucket, transaction or attribute) is never an
//! error: queries return `None`. Reconciliation mismatches are diagnostics
//! carried by the analysis, not errors either. The variants below are the
//! precondition violations and upstream failures that do abort an operation.

use chrono::NaiveDate;
use thiserror::Error;

use crate::values::{Attribute, AttributeKind, ValueLayout};

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the analysis engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Attribute {attribute} is declared as {expected}, requested as {found}")]
    InvalidAttribute {
        attribute: Attribute,
        expected: AttributeKind,
        found: AttributeKind,
    },

    #[error("Attribute {attribute} is not part of the {layout} value layout")]
    UnsupportedAttribute {
        attribute: Attribute,
        layout: ValueLayout,
    },

    #[error("History operation failed: {0}")]
    History(#[from] HistoryError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Errors raised while appending to a bucket history.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HistoryError {
    #[error("Transaction {transaction_id} dated {date} precedes the last registered date {last_date}")]
    OutOfOrder {
        transaction_id: String,
        date: NaiveDate,
        last_date: NaiveDate,
    },

    #[error("Transaction {0} is already registered in this history")]
    DuplicateTransaction(String),

    #[error("Values with layout {found} cannot be registered in a {expected} history")]
    LayoutMismatch {
        expected: ValueLayout,
        found: ValueLayout,
    },
}

/// Validation errors for the transaction feed, master data and settings.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Transaction feed is not sorted by date: {transaction_id} ({date}) follows {previous}")]
    UnsortedFeed {
        transaction_id: String,
        date: NaiveDate,
        previous: NaiveDate,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::Json(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
