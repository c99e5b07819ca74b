//! E-mail address cleaning.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::base::{base_builder, reject, BaseSchema};
use super::string::{Blank, StringRules, StringSchema};
use super::traits::{Cleaned, Cleaner};
use crate::context::{Context, MessageKey};
use crate::error::{CleanError, Label, SchemaError};

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[-!#$%&'*+/0-9=?A-Z^_a-z`{|}~](\.?[-!#$%&'*+/0-9=?A-Z^_a-z`{|}~])*@[a-zA-Z0-9](-*\.?[a-zA-Z0-9])*\.[a-zA-Z](-?[a-zA-Z0-9])+$",
    )
    .expect("e-mail pattern compiles")
});

const MAX_ADDRESS_LEN: usize = 254;
const MAX_LOCAL_LEN: usize = 64;
const MAX_DOMAIN_LEN: usize = 255;
const MAX_LABEL_LEN: usize = 63;

/// A schema for cleaning e-mail addresses.
///
/// Accepts every string option, then checks the syntax of non-blank results.
///
/// # Example
///
/// ```rust
/// use cleanse::{Cleaned, Cleaner, Context, Schema};
/// use serde_json::json;
///
/// # futures::executor::block_on(async {
/// let cleaner = Schema::email().build().unwrap();
/// let ctx = Context::new();
///
/// let cleaned = cleaner.clean(Some(&json!("foo@example.com")), &ctx).await.unwrap();
/// assert_eq!(cleaned, Cleaned::Value("foo@example.com".to_string()));
///
/// let err = cleaner.clean(Some(&json!("foo@")), &ctx).await.unwrap_err();
/// assert_eq!(err.to_string(), "Invalid e-mail address.");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct EmailSchema {
    base: BaseSchema,
    blank: Blank,
    cast: bool,
    pattern: Option<String>,
}

impl EmailSchema {
    /// Creates a new e-mail schema with default options.
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

    /// Additionally requires non-empty strings to match a regular expression.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Validates the option combination and builds the cleaner.
    pub fn build(&self) -> Result<EmailCleaner, SchemaError> {
        let string = StringSchema {
            base: self.base.clone(),
            blank: self.blank,
            cast: self.cast,
            pattern: self.pattern.clone(),
        };
        Ok(EmailCleaner {
            rules: string.rules("email")?,
        })
    }
}

impl Default for EmailSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// Cleaner built from an [`EmailSchema`].
#[derive(Debug, Clone)]
pub struct EmailCleaner {
    rules: StringRules,
}

#[async_trait]
impl Cleaner for EmailCleaner {
    type Output = String;

    async fn clean(
        &self,
        value: Option<&Value>,
        ctx: &Context,
    ) -> Result<Cleaned<String>, CleanError> {
        let cleaned = self.rules.clean_str(value, ctx)?;
        if let Cleaned::Value(address) = &cleaned {
            if !address.is_empty() && !is_valid_email(address) {
                return Err(reject(ctx, MessageKey::InvalidEmail).into());
            }
        }
        Ok(cleaned)
    }

    fn label(&self) -> Option<&Label> {
        self.rules.label()
    }
}

/// Checks e-mail syntax and RFC length limits.
pub fn is_valid_email(address: &str) -> bool {
    if address.len() > MAX_ADDRESS_LEN || !EMAIL.is_match(address) {
        return false;
    }
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    local.len() <= MAX_LOCAL_LEN
        && domain.len() <= MAX_DOMAIN_LEN
        && domain.split('.').all(|label| label.len() <= MAX_LABEL_LEN)
}
