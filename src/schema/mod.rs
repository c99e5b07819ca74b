//! Schema builders and the cleaners they build.
//!
//! Every schema type is a plain builder. `build()` checks the option
//! combination and returns an immutable cleaner implementing [`Cleaner`].
//! Cleaners compose: arrays take an element cleaner, objects take field
//! cleaners, and [`CleanerExt`] chains further steps onto any cleaner.
//!
//! # Example
//!
//! ```rust
//! use cleanse::{Cleaner, Context, Schema};
//! use serde_json::json;
//!
//! # futures::executor::block_on(async {
//! let cleaner = Schema::object()
//!     .field("email", Schema::email().build().unwrap())
//!     .field(
//!         "tags",
//!         Schema::array().element(Schema::string().build().unwrap()).build().unwrap(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let cleaned = cleaner
//!     .clean(Some(&json!({"email": "a@example.com", "tags": ["x", 1]})), &Context::new())
//!     .await
//!     .unwrap();
//! assert_eq!(
//!     cleaned.into_json(),
//!     Some(json!({"email": "a@example.com", "tags": ["x", "1"]}))
//! );
//! # });
//! ```

mod array;
mod base;
mod boolean;
mod chain;
mod date;
mod email;
mod numeric;
mod object;
mod string;
mod traits;
mod uuid;

pub use array::{ArrayCleaner, ArraySchema};
pub use base::{AnyCleaner, AnySchema, BaseRules};
pub use boolean::{BooleanCleaner, BooleanSchema};
pub use chain::{CleanerExt, Mapped, Pipe, Then, TryMapped};
pub use date::{DateCleaner, DateFormat, DateOutput, DateSchema};
pub use email::{is_valid_email, EmailCleaner, EmailSchema};
pub use numeric::{
    FloatCleaner, FloatSchema, IntegerCleaner, IntegerSchema, NumberCleaner, NumberSchema, Numeric,
};
pub use object::{ObjectCleaner, ObjectSchema};
pub use string::{StringCleaner, StringSchema};
pub use traits::{BoxCleaner, Cleaned, Cleaner, IntoValue, ValueCleaner};
pub use uuid::{UuidCleaner, UuidSchema};

/// Entry point for creating schemas.
///
/// Each factory returns a builder with default options: values are required,
/// null is rejected, and no default is set.
pub struct Schema;

impl Schema {
    /// Creates a schema accepting any value.
    pub fn any() -> AnySchema {
        AnySchema::new()
    }

    /// Creates a string schema.
    pub fn string() -> StringSchema {
        StringSchema::new()
    }

    /// Creates an integer schema. Fractions are truncated.
    pub fn integer() -> IntegerSchema {
        NumberSchema::new()
    }

    /// Creates a float schema.
    pub fn float() -> FloatSchema {
        NumberSchema::new()
    }

    /// Creates a boolean schema.
    pub fn boolean() -> BooleanSchema {
        BooleanSchema::new()
    }

    /// Creates a date schema.
    pub fn date() -> DateSchema {
        DateSchema::new()
    }

    /// Creates an e-mail schema.
    pub fn email() -> EmailSchema {
        EmailSchema::new()
    }

    /// Creates a UUID schema.
    pub fn uuid() -> UuidSchema {
        UuidSchema::new()
    }

    /// Creates an array schema.
    pub fn array() -> ArraySchema {
        ArraySchema::new()
    }

    /// Creates an object schema.
    ///
    /// ```rust
    /// use cleanse::{Cleaner, Context, Schema};
    /// use serde_json::json;
    ///
    /// # futures::executor::block_on(async {
    /// let cleaner = Schema::object()
    ///     .field("first_name", Schema::string().build().unwrap())
    ///     .group_errors(false)
    ///     .build()
    ///     .unwrap();
    ///
    /// let err = cleaner.clean(Some(&json!({})), &Context::new()).await.unwrap_err();
    /// assert_eq!(err.to_string(), "First Name: Value required.");
    /// # });
    /// ```
    pub fn object() -> ObjectSchema {
        ObjectSchema::new()
    }
}
