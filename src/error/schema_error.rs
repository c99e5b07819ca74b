//! Schema construction and cleaning failure types.
//!
//! [`SchemaError`] reports a malformed builder combination and is only ever
//! returned by `build()`. [`CleanError`] is what a running cleaner returns:
//! either an expected [`ValidationError`] or a failure that aborts the whole
//! clean.

use super::validation_error::ValidationError;

/// A builder combination that cannot produce a cleaner.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// A default value was given but the schema was explicitly required.
    #[error("'default' requires 'required' to be false")]
    DefaultRequiresOptional,

    /// A `null` default was given but the schema explicitly rejects null.
    #[error("a null 'default' requires 'null' to be true")]
    NullDefaultRequiresNullable,

    /// `blank_as_null()` was combined with `null(false)`.
    #[error("'blank_as_null' requires 'null' to be true")]
    BlankNullRequiresNullable,

    /// Blank date strings were allowed without the raw output format.
    #[error("'blank' can only be enabled with the raw date format")]
    BlankDateRequiresRawFormat,

    /// A pattern failed to compile.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl SchemaError {
    pub(crate) fn invalid_pattern(pattern: &str, err: regex::Error) -> Self {
        SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: err.to_string(),
        }
    }
}

/// The failure returned by a cleaner.
///
/// Only [`CleanError::Invalid`] takes part in error aggregation. Every other
/// variant stops the clean immediately and reaches the caller unchanged.
#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    /// Bad input. Parents collect and reshape these.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// A nested cleaner reported field errors while the enclosing object
    /// cleaner has grouping disabled.
    #[error("field '{field}' returned grouped errors while error grouping is disabled")]
    UngroupedNesting { field: String },

    /// Any other failure raised by a user-supplied step.
    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl CleanError {
    /// Wraps an arbitrary error raised by a user step.
    pub fn custom<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        CleanError::Custom(err.into())
    }

    /// Returns the validation error, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            CleanError::Invalid(err) => Some(err),
            _ => None,
        }
    }

    /// Consumes self, returning the validation error if this is one.
    pub fn into_validation(self) -> Option<ValidationError> {
        match self {
            CleanError::Invalid(err) => Some(err),
            _ => None,
        }
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<CleanError>();
    assert_sync::<CleanError>();
};
