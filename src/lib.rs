//! # Cleanse
//!
//! A data-cleaning library: cleaners validate and coerce untrusted input and
//! report every problem they find, not just the first one.
//!
//! ## Overview
//!
//! A cleaner takes an optional [`serde_json::Value`] (absent, null or
//! present) and returns either a cleaned value or a [`ValidationError`].
//! Object cleaners run every field and collect all failures, either grouped
//! by field path (`{"job.position": ["Value required."]}`) or flattened into
//! labelled messages (`["Position: Value required."]`).
//!
//! ## Core Types
//!
//! - [`Schema`]: Entry point for creating schema builders
//! - [`Cleaner`]: Trait implemented by every built cleaner; [`CleanerExt`] chains steps
//! - [`Cleaned`]: Output of a clean: `Undefined`, `Null` or a value
//! - [`ValidationError`]: Flat messages or field-keyed messages, with an optional label
//! - [`SchemaError`]: Invalid builder option combinations, reported by `build()`
//! - [`Context`]: Message overrides and per-call state threaded through a clean
//!
//! ## Example
//!
//! ```rust
//! use cleanse::{Cleaner, Context, Schema};
//! use serde_json::json;
//!
//! # futures::executor::block_on(async {
//! let cleaner = Schema::object()
//!     .field("name", Schema::string().build().unwrap())
//!     .field("age", Schema::integer().cast(true).min(0).build().unwrap())
//!     .build()
//!     .unwrap();
//!
//! let cleaned = cleaner
//!     .clean(Some(&json!({"name": "Ann", "age": "42"})), &Context::new())
//!     .await
//!     .unwrap();
//! assert_eq!(cleaned.into_json(), Some(json!({"name": "Ann", "age": 42})));
//!
//! let err = cleaner
//!     .clean(Some(&json!({"age": -1})), &Context::new())
//!     .await
//!     .unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     r#"{"name":["Value required."],"age":["Value too low."]}"#
//! );
//! # });
//! ```

pub mod context;
pub mod error;
pub mod path;
pub mod request;
pub mod schema;

pub use context::{Context, DataStore, MessageKey};
pub use error::{
    CleanError, ErrorDetail, ErrorShapeError, FieldErrors, Label, Messages, SchemaError,
    ValidationError,
};
pub use path::KeyPath;
pub use schema::{
    AnyCleaner, AnySchema, ArrayCleaner, ArraySchema, BooleanCleaner, BooleanSchema, BoxCleaner,
    Cleaned, Cleaner, CleanerExt, DateCleaner, DateFormat, DateOutput, DateSchema, EmailCleaner,
    EmailSchema, FloatCleaner, FloatSchema, IntegerCleaner, IntegerSchema, IntoValue,
    ObjectCleaner, ObjectSchema, Schema, StringCleaner, StringSchema, UuidCleaner, UuidSchema,
    ValueCleaner,
};

/// Result of a clean.
pub type CleanResult<T> = Result<Cleaned<T>, CleanError>;
