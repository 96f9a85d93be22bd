//! Error types for datespan operations.

use std::num::ParseIntError;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatespanError {
    #[error("Malformed duration string: '{0}'")]
    MalformedDuration(String),

    #[error("Invalid {field} value '{value}' in duration: {source}")]
    NumericOverflow {
        field: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Not a recognized timestamp: '{0}'")]
    UnrecognizedTimestamp(String),

    #[error("Timestamp out of range: {0}")]
    OutOfRange(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),
}

pub type Result<T> = std::result::Result<T, DatespanError>;
