//! Error types for cleaning failures.
//!
//! This module provides the validation error model produced for bad input,
//! the schema errors reported by `build()`, and the [`CleanError`] wrapper
//! every cleaner returns.

mod schema_error;
mod validation_error;

pub use schema_error::{CleanError, SchemaError};
pub use validation_error::{ErrorDetail, ErrorShapeError, FieldErrors, Label, Messages, ValidationError};
