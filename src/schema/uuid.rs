//! UUID cleaning.

use async_trait::async_trait;
use serde_json::Value;

use super::base::{base_builder, BaseSchema};
use super::string::{Blank, StringRules, StringSchema};
use super::traits::{Cleaned, Cleaner};
use crate::context::Context;
use crate::error::{CleanError, Label, SchemaError};

const UUID_PATTERN: &str = r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$";

/// A schema for cleaning lowercase hyphenated UUIDs.
///
/// Behaves like a string schema whose pattern is fixed to the 8-4-4-4-12 hex
/// layout. Uppercase digits are rejected.
///
/// # Example
///
/// ```rust
/// use cleanse::{Cleaner, Context, Schema};
/// use serde_json::json;
///
/// # futures::executor::block_on(async {
/// let cleaner = Schema::uuid().build().unwrap();
/// let ctx = Context::new();
///
/// assert!(cleaner
///     .clean(Some(&json!("123e4567-e89b-12d3-a456-426614174000")), &ctx)
///     .await
///     .is_ok());
/// assert!(cleaner
///     .clean(Some(&json!("123E4567-E89B-12D3-A456-426614174000")), &ctx)
///     .await
///     .is_err());
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct UuidSchema {
    base: BaseSchema,
    blank: Blank,
    cast: bool,
}

impl UuidSchema {
    /// Creates a new UUID schema with default options.
    pub fn new() -> Self {
        Self {
            base: BaseSchema::default(),
            blank: Blank::Reject,
            cast: false,
        }
    }

    base_builder!();

    /// Sets whether empty strings are accepted (default `false`).
    pub fn blank(mut self, allow: bool) -> Self {
        self.blank = if allow { Blank::Allow } else { Blank::Reject };
        self
    }

    /// Converts empty strings to null. Implies `null(true)`.
    pub fn blank_as_null(mut self) -> Self {
        self.blank = Blank::AsNull;
        self
    }

    /// Accepts objects and arrays by converting them to JSON text.
    pub fn cast(mut self, cast: bool) -> Self {
        self.cast = cast;
        self
    }

    /// Validates the option combination and builds the cleaner.
    pub fn build(&self) -> Result<UuidCleaner, SchemaError> {
        let string = StringSchema {
            base: self.base.clone(),
            blank: self.blank,
            cast: self.cast,
            pattern: Some(UUID_PATTERN.to_string()),
        };
        Ok(UuidCleaner {
            rules: string.rules("uuid")?,
        })
    }
}

impl Default for UuidSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// Cleaner built from a [`UuidSchema`].
#[derive(Debug, Clone)]
pub struct UuidCleaner {
    rules: StringRules,
}

#[async_trait]
impl Cleaner for UuidCleaner {
    type Output = String;

    async fn clean(
        &self,
        value: Option<&Value>,
        ctx: &Context,
    ) -> Result<Cleaned<String>, CleanError> {
        Ok(self.rules.clean_str(value, ctx)?)
    }

    fn label(&self) -> Option<&Label> {
        self.rules.label()
    }
}
