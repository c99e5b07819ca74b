//! Traits for cleaner polymorphism.
//!
//! This module provides the [`Cleaner`] trait implemented by every built
//! cleaner, its type-erased counterpart [`ValueCleaner`], the three-state
//! [`Cleaned`] output, and [`IntoValue`] for projecting outputs back to JSON.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::context::Context;
use crate::error::{CleanError, Label};

/// The outcome of a successful clean.
///
/// `Undefined` means "no value" (an absent optional field), which is distinct
/// from an explicit `Null`.
#[derive(Debug, Clone, PartialEq)]
pub enum Cleaned<T> {
    /// No value was produced.
    Undefined,
    /// An explicit null.
    Null,
    /// A cleaned value.
    Value(T),
}

impl<T> Cleaned<T> {
    /// Returns true for `Undefined`.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Cleaned::Undefined)
    }

    /// Returns true for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Cleaned::Null)
    }

    /// Returns the cleaned value, if any.
    pub fn value(self) -> Option<T> {
        match self {
            Cleaned::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Returns a reference to the cleaned value, if any.
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Cleaned::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Maps a present value, leaving `Undefined` and `Null` untouched.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Cleaned<U> {
        match self {
            Cleaned::Undefined => Cleaned::Undefined,
            Cleaned::Null => Cleaned::Null,
            Cleaned::Value(v) => Cleaned::Value(f(v)),
        }
    }
}

impl<T: IntoValue> Cleaned<T> {
    /// Projects the outcome to JSON. `Undefined` has no projection.
    pub fn into_json(self) -> Option<Value> {
        match self {
            Cleaned::Undefined => None,
            Cleaned::Null => Some(Value::Null),
            Cleaned::Value(v) => Some(v.into_value()),
        }
    }
}

/// Conversion of a cleaner output into a JSON value.
pub trait IntoValue {
    /// Converts self into a `serde_json::Value`.
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::from(self)
    }
}

// Non-finite floats have no JSON form and become null.
impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::from(self)
    }
}

impl IntoValue for Vec<Value> {
    fn into_value(self) -> Value {
        Value::Array(self)
    }
}

impl IntoValue for Map<String, Value> {
    fn into_value(self) -> Value {
        Value::Object(self)
    }
}

/// A built cleaner: validates and coerces one input value.
///
/// Input is `None` for an absent value and `Some(&Value::Null)` for an
/// explicit null. Cleaners hold no per-call state, so a single instance can
/// serve any number of concurrent calls.
///
/// # Example
///
/// ```rust
/// use cleanse::{Cleaned, Cleaner, Context, Schema};
/// use serde_json::json;
///
/// # futures::executor::block_on(async {
/// let cleaner = Schema::integer().cast(true).build().unwrap();
///
/// let cleaned = cleaner.clean(Some(&json!("42")), &Context::new()).await.unwrap();
/// assert_eq!(cleaned, Cleaned::Value(42));
/// # });
/// ```
#[async_trait]
pub trait Cleaner: Send + Sync {
    /// The output type produced by a successful clean.
    type Output: IntoValue + Send + 'static;

    /// Cleans a value.
    async fn clean(
        &self,
        value: Option<&Value>,
        ctx: &Context,
    ) -> Result<Cleaned<Self::Output>, CleanError>;

    /// Returns the label a parent object cleaner should use when flattening
    /// this cleaner's errors.
    fn label(&self) -> Option<&Label> {
        None
    }
}

/// A type-erased cleaner producing JSON values.
///
/// Every [`Cleaner`] is a `ValueCleaner`, which lets cleaners with different
/// output types sit side by side as object fields or array elements.
///
/// ```rust
/// use cleanse::{Schema, ValueCleaner};
///
/// let cleaners: Vec<Box<dyn ValueCleaner>> = vec![
///     Box::new(Schema::string().build().unwrap()),
///     Box::new(Schema::integer().build().unwrap()),
/// ];
/// assert_eq!(cleaners.len(), 2);
/// ```
#[async_trait]
pub trait ValueCleaner: Send + Sync {
    /// Cleans a value and projects the output to JSON.
    async fn clean_value(
        &self,
        value: Option<&Value>,
        ctx: &Context,
    ) -> Result<Cleaned<Value>, CleanError>;

    /// Returns the cleaner's flattening label.
    fn value_label(&self) -> Option<&Label>;
}

#[async_trait]
impl<C: Cleaner> ValueCleaner for C {
    async fn clean_value(
        &self,
        value: Option<&Value>,
        ctx: &Context,
    ) -> Result<Cleaned<Value>, CleanError> {
        Ok(self.clean(value, ctx).await?.map(IntoValue::into_value))
    }

    fn value_label(&self) -> Option<&Label> {
        self.label()
    }
}

/// A boxed, type-erased cleaner.
pub type BoxCleaner = Box<dyn ValueCleaner>;

#[async_trait]
impl Cleaner for BoxCleaner {
    type Output = Value;

    async fn clean(
        &self,
        value: Option<&Value>,
        ctx: &Context,
    ) -> Result<Cleaned<Value>, CleanError> {
        self.as_ref().clean_value(value, ctx).await
    }

    fn label(&self) -> Option<&Label> {
        self.as_ref().value_label()
    }
}
