//! Numeric cleaning.
//!
//! This module provides [`NumberSchema`], generic over the [`Numeric`] output
//! type. [`IntegerSchema`] truncates to `i64`; [`FloatSchema`] keeps `f64`
//! precision.

use std::fmt::Debug;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};

use super::base::{base_builder, reject, rejected, Admitted, BaseRules, BaseSchema};
use super::traits::{Cleaned, Cleaner, IntoValue};
use crate::context::{Context, MessageKey};
use crate::error::{CleanError, Label, SchemaError};

static INTEGER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?[0-9]+").expect("integer prefix pattern compiles"));

static FLOAT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?")
        .expect("float prefix pattern compiles")
});

/// A number type a [`NumberSchema`] can produce.
pub trait Numeric: Copy + PartialOrd + Debug + IntoValue + Send + Sync + 'static {
    /// Converts a JSON number.
    fn from_number(number: &Number) -> Option<Self>;

    /// Parses the longest numeric prefix of `text`, ignoring leading
    /// whitespace. Returns `None` when there is no numeric prefix.
    fn parse_prefix(text: &str) -> Option<Self>;
}

impl Numeric for i64 {
    fn from_number(number: &Number) -> Option<Self> {
        if let Some(n) = number.as_i64() {
            return Some(n);
        }
        number.as_f64().and_then(truncate)
    }

    fn parse_prefix(text: &str) -> Option<Self> {
        let text = text.trim_start();
        INTEGER_PREFIX
            .find(text)
            .and_then(|m| m.as_str().trim_start_matches('+').parse().ok())
    }
}

impl Numeric for f64 {
    fn from_number(number: &Number) -> Option<Self> {
        number.as_f64()
    }

    fn parse_prefix(text: &str) -> Option<Self> {
        let text = text.trim_start();
        FLOAT_PREFIX
            .find(text)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|f| f.is_finite())
    }
}

fn truncate(f: f64) -> Option<i64> {
    let t = f.trunc();
    if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
        Some(t as i64)
    } else {
        None
    }
}

/// A schema for cleaning numbers.
///
/// Only JSON numbers are accepted unless casting is enabled, in which case
/// strings are parsed by their leading numeric prefix (`"12px"` is `12`).
/// `min` and `max` are inclusive.
///
/// # Example
///
/// ```rust
/// use cleanse::{Cleaned, Cleaner, Context, Schema};
/// use serde_json::json;
///
/// # futures::executor::block_on(async {
/// let cleaner = Schema::integer().cast(true).min(1).max(10).build().unwrap();
/// let ctx = Context::new();
///
/// assert_eq!(cleaner.clean(Some(&json!("7.9")), &ctx).await.unwrap(), Cleaned::Value(7));
///
/// let err = cleaner.clean(Some(&json!(0)), &ctx).await.unwrap_err();
/// assert_eq!(err.to_string(), "Value too low.");
///
/// let err = cleaner.clean(Some(&json!("abc")), &ctx).await.unwrap_err();
/// assert_eq!(err.to_string(), "Invalid value.");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct NumberSchema<N: Numeric> {
    base: BaseSchema,
    cast: bool,
    min: Option<N>,
    max: Option<N>,
}

/// Integer schema: truncating `i64` parse.
pub type IntegerSchema = NumberSchema<i64>;

/// Float schema: `f64` parse.
pub type FloatSchema = NumberSchema<f64>;

impl<N: Numeric> NumberSchema<N> {
    /// Creates a new number schema with default options.
    pub fn new() -> Self {
        Self {
            base: BaseSchema::default(),
            cast: false,
            min: None,
            max: None,
        }
    }

    base_builder!();

    /// Accepts numeric strings.
    ///
    /// With casting, an empty string cleans to null when the schema accepts
    /// null.
    pub fn cast(mut self, cast: bool) -> Self {
        self.cast = cast;
        self
    }

    /// Sets the inclusive minimum.
    pub fn min(mut self, min: N) -> Self {
        self.min = Some(min);
        self
    }

    /// Sets the inclusive maximum.
    pub fn max(mut self, max: N) -> Self {
        self.max = Some(max);
        self
    }

    /// Validates the option combination and builds the cleaner.
    pub fn build(&self) -> Result<NumberCleaner<N>, SchemaError> {
        let rules = self.base.normalize().map_err(|e| rejected("number", e))?;
        Ok(NumberCleaner {
            rules,
            cast: self.cast,
            min: self.min,
            max: self.max,
        })
    }
}

impl<N: Numeric> Default for NumberSchema<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cleaner built from a [`NumberSchema`].
#[derive(Debug, Clone)]
pub struct NumberCleaner<N: Numeric> {
    rules: BaseRules,
    cast: bool,
    min: Option<N>,
    max: Option<N>,
}

/// Integer cleaner.
pub type IntegerCleaner = NumberCleaner<i64>;

/// Float cleaner.
pub type FloatCleaner = NumberCleaner<f64>;

impl<N: Numeric> NumberCleaner<N> {
    fn parse(&self, value: &Value, ctx: &Context) -> Result<Cleaned<N>, CleanError> {
        let parsed = match value {
            Value::Number(number) => N::from_number(number),
            Value::String(text) if self.cast => {
                if text.is_empty() && self.rules.is_nullable() {
                    return Ok(Cleaned::Null);
                }
                N::parse_prefix(text)
            }
            _ => None,
        };
        parsed
            .map(Cleaned::Value)
            .ok_or_else(|| reject(ctx, MessageKey::Invalid).into())
    }
}

#[async_trait]
impl<N: Numeric> Cleaner for NumberCleaner<N> {
    type Output = N;

    async fn clean(&self, value: Option<&Value>, ctx: &Context) -> Result<Cleaned<N>, CleanError> {
        let value = match self.rules.admit(value, ctx)? {
            Admitted::Undefined => return Ok(Cleaned::Undefined),
            Admitted::Null => return Ok(Cleaned::Null),
            Admitted::Present(value) => value,
        };

        let number = match self.parse(value, ctx)? {
            Cleaned::Value(number) => number,
            other => return Ok(other),
        };

        if matches!(self.min, Some(min) if number < min) {
            return Err(reject(ctx, MessageKey::TooLow).into());
        }
        if matches!(self.max, Some(max) if number > max) {
            return Err(reject(ctx, MessageKey::TooHigh).into());
        }
        Ok(Cleaned::Value(number))
    }

    fn label(&self) -> Option<&Label> {
        self.rules.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_prefix_parse() {
        assert_eq!(i64::parse_prefix("42"), Some(42));
        assert_eq!(i64::parse_prefix("  -7abc"), Some(-7));
        assert_eq!(i64::parse_prefix("+3"), Some(3));
        assert_eq!(i64::parse_prefix("12.9"), Some(12));
        assert_eq!(i64::parse_prefix("1e5"), Some(1));
        assert_eq!(i64::parse_prefix("12٣"), Some(12));
        assert_eq!(i64::parse_prefix("٣"), None);
        assert_eq!(i64::parse_prefix("abc"), None);
        assert_eq!(i64::parse_prefix(""), None);
        assert_eq!(i64::parse_prefix("99999999999999999999"), None);
    }

    #[test]
    fn test_float_prefix_parse() {
        assert_eq!(f64::parse_prefix("1.5"), Some(1.5));
        assert_eq!(f64::parse_prefix(" .5kg"), Some(0.5));
        assert_eq!(f64::parse_prefix("-2e3x"), Some(-2000.0));
        assert_eq!(f64::parse_prefix("3."), Some(3.0));
        assert_eq!(f64::parse_prefix("1e"), Some(1.0));
        assert_eq!(f64::parse_prefix("1.5٣"), Some(1.5));
        assert_eq!(f64::parse_prefix("e1"), None);
        assert_eq!(f64::parse_prefix("."), None);
    }

    #[test]
    fn test_integer_from_number_truncates() {
        assert_eq!(i64::from_number(&Number::from_f64(1.9).unwrap()), Some(1));
        assert_eq!(i64::from_number(&Number::from_f64(-1.9).unwrap()), Some(-1));
        assert_eq!(i64::from_number(&Number::from(5)), Some(5));
        assert_eq!(i64::from_number(&Number::from_f64(1e300).unwrap()), None);
    }
}
