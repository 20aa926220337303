//! # Validation Errors
//!
//! Construction-time failures for the domain primitives in this crate.
//! Each variant carries the rejected input so that operators can diagnose
//! a bad request without guesswork.

use thiserror::Error;

/// Validation errors for domain primitive newtypes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Identifier is empty or whitespace.
    #[error("invalid {kind}: must be non-empty")]
    EmptyIdentifier {
        /// Which identifier kind was rejected ("account", "asset").
        kind: &'static str,
    },

    /// Identifier exceeds the maximum length.
    #[error("invalid {kind}: {len} characters exceeds maximum of {max}")]
    IdentifierTooLong {
        /// Which identifier kind was rejected.
        kind: &'static str,
        /// Actual length.
        len: usize,
        /// Maximum permitted length.
        max: usize,
    },

    /// Identifier contains a character outside `[A-Za-z0-9._:@-]`.
    #[error("invalid {kind}: \"{value}\" contains unsupported characters")]
    InvalidIdentifier {
        /// Which identifier kind was rejected.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// Amount string could not be parsed.
    #[error("invalid amount \"{value}\": {reason}")]
    InvalidAmount {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Order identifier string could not be parsed.
    #[error("invalid order id \"{0}\"")]
    InvalidOrderId(String),

    /// Timestamp string is not valid UTC RFC 3339, or is out of range.
    #[error("invalid timestamp: \"{value}\" ({reason})")]
    InvalidTimestamp {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}
