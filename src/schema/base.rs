//! The base cleaning protocol shared by every cleaner.
//!
//! Every schema carries the same four options: `required`, `null`,
//! `default` and `label`. At build time they are normalized into
//! [`BaseRules`], which decide what happens to absent and null input before
//! any type-specific logic runs.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use super::traits::{Cleaned, Cleaner};
use crate::context::{Context, MessageKey};
use crate::error::{CleanError, Label, SchemaError, ValidationError};

/// Builder methods for the shared options, expanded into every schema type.
macro_rules! base_builder {
    () => {
        /// Sets whether an absent value is rejected (default `true`).
        pub fn required(mut self, required: bool) -> Self {
            self.base.required = Some(required);
            self
        }

        /// Sets whether an explicit null is accepted (default `false`).
        pub fn null(mut self, null: bool) -> Self {
            self.base.null = Some(null);
            self
        }

        /// Substitutes `value` for an absent input.
        ///
        /// Implies `required(false)`. A null default also implies `null(true)`.
        pub fn default(mut self, value: serde_json::Value) -> Self {
            self.base.default = Some(value);
            self
        }

        /// Sets the label a parent object cleaner uses when flattening this
        /// cleaner's errors.
        pub fn label(mut self, label: impl Into<$crate::error::Label>) -> Self {
            self.base.label = Some(label.into());
            self
        }

        /// Flattens this cleaner's errors without any label prefix.
        pub fn hide_label(mut self) -> Self {
            self.base.label = Some($crate::error::Label::Hidden);
            self
        }
    };
}

pub(crate) use base_builder;

/// Unnormalized shared options, as set on a builder.
#[derive(Debug, Clone, Default)]
pub(crate) struct BaseSchema {
    pub(crate) required: Option<bool>,
    pub(crate) null: Option<bool>,
    pub(crate) default: Option<Value>,
    pub(crate) label: Option<Label>,
}

impl BaseSchema {
    /// Derives normalized rules without touching the builder.
    pub(crate) fn normalize(&self) -> Result<BaseRules, SchemaError> {
        let mut required = self.required;
        let mut null = self.null;

        if let Some(default) = &self.default {
            match required {
                None => required = Some(false),
                Some(true) => return Err(SchemaError::DefaultRequiresOptional),
                Some(false) => {}
            }
            if default.is_null() {
                match null {
                    None => null = Some(true),
                    Some(false) => return Err(SchemaError::NullDefaultRequiresNullable),
                    Some(true) => {}
                }
            }
        }

        Ok(BaseRules {
            required: required.unwrap_or(true),
            null: null.unwrap_or(false),
            default: self.default.clone(),
            label: self.label.clone(),
        })
    }
}

/// Normalized shared options of a built cleaner.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseRules {
    required: bool,
    null: bool,
    default: Option<Value>,
    label: Option<Label>,
}

/// What the base protocol decided for one input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Admitted<'a> {
    Undefined,
    Null,
    Present(&'a Value),
}

impl BaseRules {
    /// Returns true if an absent value is rejected.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns true if an explicit null is accepted.
    pub fn is_nullable(&self) -> bool {
        self.null
    }

    /// Returns the value substituted for absent input.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Returns the flattening label.
    pub fn label(&self) -> Option<&Label> {
        self.label.as_ref()
    }

    /// Applies the absent/null/default rules.
    ///
    /// A substituted default goes through the same null check as real input
    /// and is otherwise handed on as a present value.
    pub(crate) fn admit<'a>(
        &'a self,
        value: Option<&'a Value>,
        ctx: &Context,
    ) -> Result<Admitted<'a>, ValidationError> {
        let value = match value {
            Some(value) => value,
            None if self.required => return Err(reject(ctx, MessageKey::Required)),
            None => match &self.default {
                Some(default) => default,
                None => return Ok(Admitted::Undefined),
            },
        };

        if value.is_null() {
            if self.null {
                Ok(Admitted::Null)
            } else {
                Err(reject(ctx, MessageKey::Required))
            }
        } else {
            Ok(Admitted::Present(value))
        }
    }
}

/// Builds a single-message validation error from the context catalog.
pub(crate) fn reject(ctx: &Context, key: MessageKey) -> ValidationError {
    ValidationError::message(ctx.message(key))
}

/// Logs a schema rejected at build time and hands the error back.
pub(crate) fn rejected(schema: &'static str, err: SchemaError) -> SchemaError {
    tracing::debug!(schema, error = %err, "schema build rejected");
    err
}

type ValueStep =
    Arc<dyn Fn(Value, Context) -> BoxFuture<'static, Result<Value, CleanError>> + Send + Sync>;

/// A schema accepting any value.
///
/// Only the shared options apply: present values pass through unchanged, or
/// through the step attached with [`AnySchema::clean_with`].
///
/// # Example
///
/// ```rust
/// use cleanse::{Cleaned, Cleaner, Context, Schema};
/// use serde_json::json;
///
/// # futures::executor::block_on(async {
/// let cleaner = Schema::any().default(json!("fallback")).build().unwrap();
///
/// let cleaned = cleaner.clean(None, &Context::new()).await.unwrap();
/// assert_eq!(cleaned, Cleaned::Value(json!("fallback")));
///
/// let cleaned = cleaner.clean(Some(&json!({"a": 1})), &Context::new()).await.unwrap();
/// assert_eq!(cleaned, Cleaned::Value(json!({"a": 1})));
/// # });
/// ```
#[derive(Clone)]
pub struct AnySchema {
    base: BaseSchema,
    step: Option<ValueStep>,
}

impl AnySchema {
    /// Creates a schema with default options.
    pub fn new() -> Self {
        Self {
            base: BaseSchema::default(),
            step: None,
        }
    }

    base_builder!();

    /// Attaches an async step that post-processes present values.
    ///
    /// The step never sees absent or null input.
    ///
    /// ```rust
    /// use cleanse::{Cleaned, Cleaner, Context, Schema};
    /// use serde_json::json;
    ///
    /// # futures::executor::block_on(async {
    /// let cleaner = Schema::any()
    ///     .clean_with(|value, _ctx| async move { Ok(json!([value])) })
    ///     .build()
    ///     .unwrap();
    ///
    /// let cleaned = cleaner.clean(Some(&json!(1)), &Context::new()).await.unwrap();
    /// assert_eq!(cleaned, Cleaned::Value(json!([1])));
    /// # });
    /// ```
    pub fn clean_with<F, Fut>(mut self, step: F) -> Self
    where
        F: Fn(Value, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, CleanError>> + Send + 'static,
    {
        self.step = Some(Arc::new(move |value, ctx| Box::pin(step(value, ctx))));
        self
    }

    /// Validates the option combination and builds the cleaner.
    pub fn build(&self) -> Result<AnyCleaner, SchemaError> {
        let rules = self.base.normalize().map_err(|e| rejected("any", e))?;
        Ok(AnyCleaner {
            rules,
            step: self.step.clone(),
        })
    }
}

impl Default for AnySchema {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AnySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnySchema")
            .field("base", &self.base)
            .field("step", &self.step.is_some())
            .finish()
    }
}

/// Cleaner built from an [`AnySchema`].
#[derive(Clone)]
pub struct AnyCleaner {
    rules: BaseRules,
    step: Option<ValueStep>,
}

impl fmt::Debug for AnyCleaner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyCleaner")
            .field("rules", &self.rules)
            .field("step", &self.step.is_some())
            .finish()
    }
}

impl AnyCleaner {
    /// Returns the normalized shared options.
    pub fn rules(&self) -> &BaseRules {
        &self.rules
    }
}

#[async_trait]
impl Cleaner for AnyCleaner {
    type Output = Value;

    async fn clean(
        &self,
        value: Option<&Value>,
        ctx: &Context,
    ) -> Result<Cleaned<Value>, CleanError> {
        match self.rules.admit(value, ctx)? {
            Admitted::Undefined => Ok(Cleaned::Undefined),
            Admitted::Null => Ok(Cleaned::Null),
            Admitted::Present(value) => match &self.step {
                Some(step) => Ok(Cleaned::Value(step(value.clone(), ctx.clone()).await?)),
                None => Ok(Cleaned::Value(value.clone())),
            },
        }
    }

    fn label(&self) -> Option<&Label> {
        self.rules.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base(required: Option<bool>, null: Option<bool>, default: Option<Value>) -> BaseSchema {
        BaseSchema {
            required,
            null,
            default,
            label: None,
        }
    }

    #[test]
    fn test_default_implies_optional() {
        let rules = base(None, None, Some(json!(1))).normalize().unwrap();
        assert!(!rules.is_required());
        assert!(!rules.is_nullable());
    }

    #[test]
    fn test_null_default_implies_nullable() {
        let rules = base(None, None, Some(Value::Null)).normalize().unwrap();
        assert!(!rules.is_required());
        assert!(rules.is_nullable());
    }

    #[test]
    fn test_required_default_is_rejected() {
        assert_eq!(
            base(Some(true), None, Some(json!(1))).normalize(),
            Err(SchemaError::DefaultRequiresOptional)
        );
    }

    #[test]
    fn test_non_nullable_null_default_is_rejected() {
        assert_eq!(
            base(None, Some(false), Some(Value::Null)).normalize(),
            Err(SchemaError::NullDefaultRequiresNullable)
        );
    }

    #[test]
    fn test_normalize_leaves_builder_untouched() {
        let schema = base(None, None, Some(Value::Null));
        schema.normalize().unwrap();
        assert_eq!(schema.required, None);
        assert_eq!(schema.null, None);
    }

    #[test]
    fn test_admit() {
        let ctx = Context::new();
        let rules = base(Some(false), Some(true), None).normalize().unwrap();
        assert_eq!(rules.admit(None, &ctx), Ok(Admitted::Undefined));
        assert_eq!(rules.admit(Some(&Value::Null), &ctx), Ok(Admitted::Null));
        let value = json!("x");
        assert_eq!(rules.admit(Some(&value), &ctx), Ok(Admitted::Present(&value)));

        let strict = base(None, None, None).normalize().unwrap();
        assert_eq!(
            strict.admit(None, &ctx),
            Err(ValidationError::message("Value required."))
        );
        assert_eq!(
            strict.admit(Some(&Value::Null), &ctx),
            Err(ValidationError::message("Value required."))
        );
    }

    #[test]
    fn test_admit_substitutes_default() {
        let ctx = Context::new();
        let rules = base(None, None, Some(json!(5))).normalize().unwrap();
        assert_eq!(rules.admit(None, &ctx), Ok(Admitted::Present(&json!(5))));

        let rules = base(None, None, Some(Value::Null)).normalize().unwrap();
        assert_eq!(rules.admit(None, &ctx), Ok(Admitted::Null));
    }
}
