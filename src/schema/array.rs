//! Array cleaning.
//!
//! This module provides [`ArraySchema`] for cleaning arrays with an optional
//! element cleaner and length bounds. Element failures are flattened into a
//! single message list in element order.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use stillwater::prelude::*;

use super::base::{base_builder, reject, rejected, Admitted, BaseRules, BaseSchema};
use super::traits::{Cleaned, Cleaner, ValueCleaner};
use crate::context::{Context, MessageKey};
use crate::error::{CleanError, ErrorDetail, Label, SchemaError, ValidationError};

/// A schema for cleaning arrays.
///
/// # Example
///
/// ```rust
/// use cleanse::{Cleaned, Cleaner, Context, Schema};
/// use serde_json::json;
///
/// # futures::executor::block_on(async {
/// let cleaner = Schema::array()
///     .element(Schema::integer().cast(true).build().unwrap())
///     .max(3)
///     .build()
///     .unwrap();
/// let ctx = Context::new();
///
/// let cleaned = cleaner.clean(Some(&json!(["1", 2])), &ctx).await.unwrap();
/// assert_eq!(cleaned, Cleaned::Value(vec![json!(1), json!(2)]));
///
/// let err = cleaner.clean(Some(&json!(["x", 2, "y"])), &ctx).await.unwrap_err();
/// assert_eq!(err.to_string(), r#"["Invalid value.","Invalid value."]"#);
///
/// let err = cleaner.clean(Some(&json!([1, 2, 3, 4])), &ctx).await.unwrap_err();
/// assert_eq!(err.to_string(), "Too many values.");
/// # });
/// ```
#[derive(Clone)]
pub struct ArraySchema {
    base: BaseSchema,
    element: Option<Arc<dyn ValueCleaner>>,
    min: Option<usize>,
    max: Option<usize>,
    concurrent: bool,
}

impl ArraySchema {
    /// Creates a new array schema with default options.
    pub fn new() -> Self {
        Self {
            base: BaseSchema::default(),
            element: None,
            min: None,
            max: None,
            concurrent: false,
        }
    }

    base_builder!();

    /// Cleans every element with `cleaner`.
    ///
    /// Elements that clean to `Undefined` become null in the result.
    pub fn element<C>(mut self, cleaner: C) -> Self
    where
        C: Cleaner + 'static,
    {
        self.element = Some(Arc::new(cleaner));
        self
    }

    /// Sets the inclusive minimum length.
    pub fn min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    /// Sets the inclusive maximum length.
    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    /// Cleans all elements at once instead of one after another.
    ///
    /// Result and error order still follow the input order.
    pub fn concurrent(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// Validates the option combination and builds the cleaner.
    pub fn build(&self) -> Result<ArrayCleaner, SchemaError> {
        let rules = self.base.normalize().map_err(|e| rejected("array", e))?;
        Ok(ArrayCleaner {
            rules,
            element: self.element.clone(),
            min: self.min,
            max: self.max,
            concurrent: self.concurrent,
        })
    }
}

impl Default for ArraySchema {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ArraySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArraySchema")
            .field("base", &self.base)
            .field("element", &self.element.is_some())
            .field("min", &self.min)
            .field("max", &self.max)
            .field("concurrent", &self.concurrent)
            .finish()
    }
}

/// Cleaner built from an [`ArraySchema`].
#[derive(Clone)]
pub struct ArrayCleaner {
    rules: BaseRules,
    element: Option<Arc<dyn ValueCleaner>>,
    min: Option<usize>,
    max: Option<usize>,
    concurrent: bool,
}

impl ArrayCleaner {
    async fn clean_elements(
        &self,
        element: &dyn ValueCleaner,
        items: &[Value],
        ctx: &Context,
    ) -> Result<Vec<Value>, CleanError> {
        let mut collected = Collected::with_capacity(items.len());

        if self.concurrent {
            let results = join_all(items.iter().map(|item| element.clean_value(Some(item), ctx))).await;
            for result in results {
                collected.push(result)?;
            }
        } else {
            for item in items {
                collected.push(element.clean_value(Some(item), ctx).await)?;
            }
        }

        tracing::trace!(
            elements = items.len(),
            failures = collected.failed,
            messages = collected.messages.len(),
            "array cleaned"
        );

        match NonEmptyVec::from_vec(collected.messages) {
            Some(messages) => Err(ValidationError::from_messages(messages).into()),
            None => Ok(collected.values),
        }
    }
}

#[async_trait]
impl Cleaner for ArrayCleaner {
    type Output = Vec<Value>;

    async fn clean(
        &self,
        value: Option<&Value>,
        ctx: &Context,
    ) -> Result<Cleaned<Vec<Value>>, CleanError> {
        let value = match self.rules.admit(value, ctx)? {
            Admitted::Undefined => return Ok(Cleaned::Undefined),
            Admitted::Null => return Ok(Cleaned::Null),
            Admitted::Present(value) => value,
        };

        let Value::Array(items) = value else {
            return Err(reject(ctx, MessageKey::Invalid).into());
        };
        if matches!(self.min, Some(min) if items.len() < min) {
            return Err(reject(ctx, MessageKey::ArrayMin).into());
        }
        if matches!(self.max, Some(max) if items.len() > max) {
            return Err(reject(ctx, MessageKey::ArrayMax).into());
        }

        match &self.element {
            Some(element) => Ok(Cleaned::Value(
                self.clean_elements(element.as_ref(), items, ctx).await?,
            )),
            None => Ok(Cleaned::Value(items.clone())),
        }
    }

    fn label(&self) -> Option<&Label> {
        self.rules.label()
    }
}

/// Element results gathered in input order.
struct Collected {
    values: Vec<Value>,
    messages: Vec<String>,
    failed: usize,
}

impl Collected {
    fn with_capacity(len: usize) -> Self {
        Self {
            values: Vec::with_capacity(len),
            messages: Vec::new(),
            failed: 0,
        }
    }

    /// Records one element result. Anything but a validation error aborts.
    fn push(&mut self, result: Result<Cleaned<Value>, CleanError>) -> Result<(), CleanError> {
        match result {
            Ok(cleaned) => self.values.push(cleaned.into_json().unwrap_or(Value::Null)),
            Err(CleanError::Invalid(err)) => {
                self.failed += 1;
                self.messages.extend(flatten(err));
            }
            Err(other) => return Err(other),
        }
        Ok(())
    }
}

/// Turns an element error into plain messages; field errors become
/// `"<field>: <message>"`.
fn flatten(err: ValidationError) -> Vec<String> {
    match err.into_detail() {
        ErrorDetail::Messages(messages) => messages.into_vec(),
        ErrorDetail::Fields(errors) => errors
            .into_iter()
            .flat_map(|(field, messages)| {
                messages
                    .into_vec()
                    .into_iter()
                    .map(move |message| format!("{}: {}", field, message))
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_plain_messages() {
        let err = ValidationError::messages(["a", "b"]);
        assert_eq!(flatten(err), vec!["a", "b"]);
    }

    #[test]
    fn test_flatten_field_errors() {
        let err = ValidationError::fields([("foo", vec!["bang", "boom"]), ("bar", vec!["oops"])]);
        assert_eq!(flatten(err), vec!["foo: bang", "foo: boom", "bar: oops"]);
    }

    #[test]
    fn test_collected_aborts_on_custom_error() {
        let mut collected = Collected::with_capacity(2);
        collected.push(Ok(Cleaned::Undefined)).unwrap();
        assert_eq!(collected.values, vec![Value::Null]);

        let result = collected.push(Err(CleanError::custom("boom")));
        assert!(matches!(result, Err(CleanError::Custom(_))));
    }

    #[test]
    fn test_collected_counts_failed_elements() {
        let mut collected = Collected::with_capacity(3);
        let nested = ValidationError::fields([("a", vec!["x"]), ("b", vec!["y"]), ("c", vec!["z"])]);
        collected.push(Err(nested.into())).unwrap();
        collected.push(Ok(Cleaned::Value(json!(1)))).unwrap();
        collected.push(Err(ValidationError::message("bad").into())).unwrap();

        assert_eq!(collected.failed, 2);
        assert_eq!(collected.messages, vec!["a: x", "b: y", "c: z", "bad"]);
    }
}
