//! Boolean cleaning.

use async_trait::async_trait;
use serde_json::Value;

use super::base::{base_builder, reject, rejected, Admitted, BaseRules, BaseSchema};
use super::traits::{Cleaned, Cleaner};
use crate::context::{Context, MessageKey};
use crate::error::{CleanError, Label, SchemaError};

/// A schema for cleaning booleans.
///
/// Only JSON booleans are accepted unless casting is enabled, in which case
/// any value is converted by truthiness: `false`, `0`, `""` are false and
/// everything else, including `"false"` and `{}`, is true.
///
/// # Example
///
/// ```rust
/// use cleanse::{Cleaned, Cleaner, Context, Schema};
/// use serde_json::json;
///
/// # futures::executor::block_on(async {
/// let cleaner = Schema::boolean().cast(true).omit(true).build().unwrap();
/// let ctx = Context::new();
///
/// assert_eq!(cleaner.clean(Some(&json!("yes")), &ctx).await.unwrap(), Cleaned::Value(true));
/// assert_eq!(cleaner.clean(Some(&json!(0)), &ctx).await.unwrap(), Cleaned::Undefined);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct BooleanSchema {
    base: BaseSchema,
    cast: bool,
    omit: bool,
}

impl BooleanSchema {
    /// Creates a new boolean schema with default options.
    pub fn new() -> Self {
        Self {
            base: BaseSchema::default(),
            cast: false,
            omit: false,
        }
    }

    base_builder!();

    /// Converts non-boolean values by truthiness.
    pub fn cast(mut self, cast: bool) -> Self {
        self.cast = cast;
        self
    }

    /// Cleans `false` to `Undefined`, so an object cleaner leaves the field
    /// out.
    pub fn omit(mut self, omit: bool) -> Self {
        self.omit = omit;
        self
    }

    /// Validates the option combination and builds the cleaner.
    pub fn build(&self) -> Result<BooleanCleaner, SchemaError> {
        let rules = self.base.normalize().map_err(|e| rejected("boolean", e))?;
        Ok(BooleanCleaner {
            rules,
            cast: self.cast,
            omit: self.omit,
        })
    }
}

impl Default for BooleanSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// Cleaner built from a [`BooleanSchema`].
#[derive(Debug, Clone)]
pub struct BooleanCleaner {
    rules: BaseRules,
    cast: bool,
    omit: bool,
}

#[async_trait]
impl Cleaner for BooleanCleaner {
    type Output = bool;

    async fn clean(
        &self,
        value: Option<&Value>,
        ctx: &Context,
    ) -> Result<Cleaned<bool>, CleanError> {
        let value = match self.rules.admit(value, ctx)? {
            Admitted::Undefined => return Ok(Cleaned::Undefined),
            Admitted::Null => return Ok(Cleaned::Null),
            Admitted::Present(value) => value,
        };

        let flag = match value {
            Value::Bool(b) => *b,
            other if self.cast => truthy(other),
            _ => return Err(reject(ctx, MessageKey::Invalid).into()),
        };

        if !flag && self.omit {
            Ok(Cleaned::Undefined)
        } else {
            Ok(Cleaned::Value(flag))
        }
    }

    fn label(&self) -> Option<&Label> {
        self.rules.label()
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
