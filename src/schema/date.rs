//! Date cleaning.
//!
//! This module provides [`DateSchema`]. Input goes through the string rules
//! (always casting, never a pattern) and is then parsed as a date or
//! date-time. Naive date-times and plain dates are read as UTC.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

use super::base::{base_builder, reject, rejected, BaseSchema};
use super::string::{Blank, StringRules, StringSchema};
use super::traits::{Cleaned, Cleaner, IntoValue};
use crate::context::{Context, MessageKey};
use crate::error::{CleanError, Label, SchemaError};

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Output representation of a cleaned date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFormat {
    /// A `DateTime<Utc>` value.
    #[default]
    Native,
    /// The input string, unchanged, once it is known to parse.
    Raw,
    /// An ISO 8601 string in UTC with millisecond precision
    /// (`2021-02-03T04:05:06.000Z`).
    Iso,
}

/// A cleaned date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateOutput {
    /// Produced by [`DateFormat::Native`].
    DateTime(DateTime<Utc>),
    /// Produced by [`DateFormat::Raw`] and [`DateFormat::Iso`].
    String(String),
}

impl DateOutput {
    /// Returns the date-time, if this is a native output.
    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            DateOutput::DateTime(dt) => Some(dt),
            DateOutput::String(_) => None,
        }
    }

    /// Returns the string, if this is a raw or ISO output.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DateOutput::DateTime(_) => None,
            DateOutput::String(s) => Some(s),
        }
    }
}

impl IntoValue for DateOutput {
    fn into_value(self) -> Value {
        match self {
            DateOutput::DateTime(dt) => Value::String(iso_string(&dt)),
            DateOutput::String(s) => Value::String(s),
        }
    }
}

/// A schema for cleaning dates.
///
/// # Example
///
/// ```rust
/// use cleanse::{Cleaned, Cleaner, Context, DateFormat, DateOutput, Schema};
/// use serde_json::json;
///
/// # futures::executor::block_on(async {
/// let cleaner = Schema::date().format(DateFormat::Iso).build().unwrap();
///
/// let cleaned = cleaner
///     .clean(Some(&json!("2021-02-03T04:05:06+02:00")), &Context::new())
///     .await
///     .unwrap();
/// assert_eq!(
///     cleaned,
///     Cleaned::Value(DateOutput::String("2021-02-03T02:05:06.000Z".to_string()))
/// );
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct DateSchema {
    base: BaseSchema,
    blank: Blank,
    format: DateFormat,
}

impl DateSchema {
    /// Creates a new date schema with default options.
    pub fn new() -> Self {
        Self {
            base: BaseSchema::default(),
            blank: Blank::Reject,
            format: DateFormat::Native,
        }
    }

    base_builder!();

    /// Sets whether empty strings are accepted (default `false`).
    ///
    /// Only allowed with [`DateFormat::Raw`]; a blank string is then returned
    /// unchanged.
    pub fn blank(mut self, allow: bool) -> Self {
        self.blank = if allow { Blank::Allow } else { Blank::Reject };
        self
    }

    /// Converts empty strings to null. Implies `null(true)`.
    pub fn blank_as_null(mut self) -> Self {
        self.blank = Blank::AsNull;
        self
    }

    /// Sets the output representation.
    pub fn format(mut self, format: DateFormat) -> Self {
        self.format = format;
        self
    }

    /// Validates the option combination and builds the cleaner.
    pub fn build(&self) -> Result<DateCleaner, SchemaError> {
        if self.blank == Blank::Allow && self.format != DateFormat::Raw {
            return Err(rejected("date", SchemaError::BlankDateRequiresRawFormat));
        }
        let string = StringSchema {
            base: self.base.clone(),
            blank: self.blank,
            cast: true,
            pattern: None,
        };
        Ok(DateCleaner {
            rules: string.rules("date")?,
            format: self.format,
        })
    }
}

impl Default for DateSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// Cleaner built from a [`DateSchema`].
#[derive(Debug, Clone)]
pub struct DateCleaner {
    rules: StringRules,
    format: DateFormat,
}

#[async_trait]
impl Cleaner for DateCleaner {
    type Output = DateOutput;

    async fn clean(
        &self,
        value: Option<&Value>,
        ctx: &Context,
    ) -> Result<Cleaned<DateOutput>, CleanError> {
        let text = match self.rules.clean_str(value, ctx)? {
            Cleaned::Value(text) => text,
            Cleaned::Null => return Ok(Cleaned::Null),
            Cleaned::Undefined => return Ok(Cleaned::Undefined),
        };

        // Only reachable with the raw format.
        if text.is_empty() {
            return Ok(Cleaned::Value(DateOutput::String(text)));
        }

        let parsed = parse_datetime(&text).ok_or_else(|| reject(ctx, MessageKey::Invalid))?;
        let output = match self.format {
            DateFormat::Native => DateOutput::DateTime(parsed),
            DateFormat::Raw => DateOutput::String(text),
            DateFormat::Iso => DateOutput::String(iso_string(&parsed)),
        };
        Ok(Cleaned::Value(output))
    }

    fn label(&self) -> Option<&Label> {
        self.rules.label()
    }
}

fn iso_string(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses RFC 3339, RFC 2822, naive date-times and plain dates.
pub(crate) fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
