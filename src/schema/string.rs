//! String cleaning.
//!
//! This module provides [`StringSchema`] for cleaning string values, with
//! options for blank handling, casting and pattern matching. The e-mail,
//! UUID and date cleaners are built on the same rules.

use async_trait::async_trait;
use regex::Regex;
use serde_json::{Number, Value};

use super::base::{base_builder, reject, rejected, Admitted, BaseRules, BaseSchema};
use super::traits::{Cleaned, Cleaner};
use crate::context::{Context, MessageKey};
use crate::error::{CleanError, Label, SchemaError, ValidationError};

/// How an empty string is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Blank {
    #[default]
    Reject,
    Allow,
    AsNull,
}

/// A schema for cleaning string values.
///
/// Strings pass through, numbers and booleans are converted to text, and
/// objects and arrays are rejected unless casting is enabled. An empty string
/// is rejected as missing unless blank values are allowed.
///
/// # Example
///
/// ```rust
/// use cleanse::{Cleaned, Cleaner, Context, Schema};
/// use serde_json::json;
///
/// # futures::executor::block_on(async {
/// let cleaner = Schema::string().pattern(r"^[a-z]+$").build().unwrap();
///
/// let cleaned = cleaner.clean(Some(&json!("hello")), &Context::new()).await.unwrap();
/// assert_eq!(cleaned, Cleaned::Value("hello".to_string()));
///
/// let err = cleaner.clean(Some(&json!("Hello")), &Context::new()).await.unwrap_err();
/// assert_eq!(err.to_string(), "Invalid value.");
///
/// let err = cleaner.clean(Some(&json!("")), &Context::new()).await.unwrap_err();
/// assert_eq!(err.to_string(), "Value required.");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct StringSchema {
    pub(crate) base: BaseSchema,
    pub(crate) blank: Blank,
    pub(crate) cast: bool,
    pub(crate) pattern: Option<String>,
}

impl StringSchema {
    /// Creates a new string schema with default options.
    pub fn new() -> Self {
        Self {
            base: BaseSchema::default(),
            blank: Blank::Reject,
            cast: false,
            pattern: None,
        }
    }

    base_builder!();

    /// Sets whether empty strings are accepted (default `false`).
    pub fn blank(mut self, allow: bool) -> Self {
        self.blank = if allow { Blank::Allow } else { Blank::Reject };
        self
    }

    /// Converts empty strings to null.
    ///
    /// Implies `null(true)`; combining it with `null(false)` fails at build
    /// time.
    ///
    /// ```rust
    /// use cleanse::{Cleaned, Cleaner, Context, Schema};
    /// use serde_json::json;
    ///
    /// # futures::executor::block_on(async {
    /// let cleaner = Schema::string().blank_as_null().build().unwrap();
    /// let cleaned = cleaner.clean(Some(&json!("")), &Context::new()).await.unwrap();
    /// assert_eq!(cleaned, Cleaned::Null);
    ///
    /// assert!(Schema::string().blank_as_null().null(false).build().is_err());
    /// # });
    /// ```
    pub fn blank_as_null(mut self) -> Self {
        self.blank = Blank::AsNull;
        self
    }

    /// Accepts objects and arrays by converting them to JSON text.
    pub fn cast(mut self, cast: bool) -> Self {
        self.cast = cast;
        self
    }

    /// Requires non-empty strings to match a regular expression.
    ///
    /// The pattern is searched for anywhere in the string; anchor it with `^`
    /// and `$` to match the whole value. An invalid pattern fails at build
    /// time.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Validates the option combination and builds the cleaner.
    pub fn build(&self) -> Result<StringCleaner, SchemaError> {
        Ok(StringCleaner {
            rules: self.rules("string")?,
        })
    }

    pub(crate) fn rules(&self, schema: &'static str) -> Result<StringRules, SchemaError> {
        let mut base = self.base.clone();
        if self.blank == Blank::AsNull {
            match base.null {
                None => base.null = Some(true),
                Some(false) => {
                    return Err(rejected(schema, SchemaError::BlankNullRequiresNullable))
                }
                Some(true) => {}
            }
        }
        let base = base.normalize().map_err(|e| rejected(schema, e))?;

        let pattern = match &self.pattern {
            Some(pattern) => Some(
                Regex::new(pattern)
                    .map_err(|e| rejected(schema, SchemaError::invalid_pattern(pattern, e)))?,
            ),
            None => None,
        };

        Ok(StringRules {
            base,
            blank: self.blank,
            cast: self.cast,
            pattern,
        })
    }
}

impl Default for StringSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// Built string rules, shared by every string-based cleaner.
#[derive(Debug, Clone)]
pub(crate) struct StringRules {
    base: BaseRules,
    blank: Blank,
    cast: bool,
    pattern: Option<Regex>,
}

impl StringRules {
    pub(crate) fn label(&self) -> Option<&Label> {
        self.base.label()
    }

    pub(crate) fn clean_str(
        &self,
        value: Option<&Value>,
        ctx: &Context,
    ) -> Result<Cleaned<String>, ValidationError> {
        let value = match self.base.admit(value, ctx)? {
            Admitted::Undefined => return Ok(Cleaned::Undefined),
            Admitted::Null => return Ok(Cleaned::Null),
            Admitted::Present(value) => value,
        };

        let text = match value {
            Value::String(s) => s.clone(),
            Value::Object(_) | Value::Array(_) if !self.cast => {
                return Err(reject(ctx, MessageKey::Invalid))
            }
            other => to_text(other),
        };

        if text.is_empty() {
            return match self.blank {
                Blank::AsNull => Ok(Cleaned::Null),
                Blank::Reject => Err(reject(ctx, MessageKey::Required)),
                Blank::Allow => Ok(Cleaned::Value(text)),
            };
        }

        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(&text) {
                return Err(reject(ctx, MessageKey::Invalid));
            }
        }

        Ok(Cleaned::Value(text))
    }
}

/// Cleaner built from a [`StringSchema`].
#[derive(Debug, Clone)]
pub struct StringCleaner {
    rules: StringRules,
}

#[async_trait]
impl Cleaner for StringCleaner {
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

/// Converts a non-null value to text. Whole floats lose their fraction
/// (`1.0` becomes `"1"`) and containers become JSON.
pub(crate) fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => number_text(n),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn number_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}
