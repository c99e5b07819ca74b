//! Validation error types.
//!
//! This module provides [`ValidationError`], the failure value every cleaner
//! produces for bad input. A validation error holds exactly one of two shapes:
//! a flat list of messages, or a map from field path to messages
//! ([`FieldErrors`]).

use std::fmt::{self, Display};

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use stillwater::prelude::*;

use crate::path::KeyPath;

/// A non-empty, ordered list of human-readable messages.
pub type Messages = NonEmptyVec<String>;

/// Display label used when field errors are flattened into plain messages.
///
/// `Text` prefixes each message with `"<label>: "`. `Hidden` suppresses the
/// prefix entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    /// Prefix flattened messages with this text.
    Text(String),
    /// Emit flattened messages without a prefix.
    Hidden,
}

impl Label {
    /// Creates a text label.
    pub fn text(text: impl Into<String>) -> Self {
        Label::Text(text.into())
    }

    /// Returns the label text, or `None` for a hidden label.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Label::Text(text) => Some(text),
            Label::Hidden => None,
        }
    }
}

impl From<&str> for Label {
    fn from(text: &str) -> Self {
        Label::Text(text.to_string())
    }
}

impl From<String> for Label {
    fn from(text: String) -> Self {
        Label::Text(text)
    }
}

/// Field-aware errors: an insertion-ordered map from field path to messages.
///
/// Field paths use dot notation for nesting (`"job.position"`). The map is
/// guaranteed to hold at least one field, and every field at least one
/// message.
///
/// # Combining Errors
///
/// `FieldErrors` implements `Semigroup`: combining two maps keeps the first
/// map's field order and appends messages for fields present in both.
///
/// ```rust
/// use cleanse::FieldErrors;
/// use stillwater::prelude::*;
///
/// let a = FieldErrors::single("name", NonEmptyVec::singleton("Value required.".to_string()));
/// let b = FieldErrors::single("name", NonEmptyVec::singleton("Invalid value.".to_string()));
///
/// let combined = a.combine(b);
/// assert_eq!(combined.len(), 1);
/// assert_eq!(combined.get("name").map(|m| m.len()), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldErrors(IndexMap<String, Messages>);

impl FieldErrors {
    /// Creates field errors holding a single field.
    pub fn single(field: impl Into<String>, messages: Messages) -> Self {
        let mut map = IndexMap::new();
        map.insert(field.into(), messages);
        Self(map)
    }

    /// Creates field errors from a map, or `None` if the map is empty.
    pub fn from_map(map: IndexMap<String, Messages>) -> Option<Self> {
        if map.is_empty() {
            None
        } else {
            Some(Self(map))
        }
    }

    /// Returns the messages recorded for a field path.
    pub fn get(&self, field: &str) -> Option<&Messages> {
        self.0.get(field)
    }

    /// Returns the number of field paths.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: field errors hold at least one field.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates over `(field path, messages)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Messages)> {
        self.0.iter().map(|(field, messages)| (field.as_str(), messages))
    }

    /// Iterates over field paths in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns a copy with every field path prefixed by `prefix.`.
    ///
    /// ```rust
    /// use cleanse::ValidationError;
    ///
    /// let err = ValidationError::field("position", "Value required.");
    /// let nested = err.errors().unwrap().clone().prefixed("job");
    /// assert!(nested.get("job.position").is_some());
    /// ```
    pub fn prefixed(self, prefix: &str) -> Self {
        Self(
            self.0
                .into_iter()
                .map(|(field, messages)| {
                    (KeyPath::from_field(prefix).push_field(field).to_string(), messages)
                })
                .collect(),
        )
    }

    /// Renders the errors as a JSON object of message arrays.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .0
            .iter()
            .map(|(field, messages)| (field.clone(), messages_to_json(messages)))
            .collect();
        Value::Object(map)
    }
}

impl Semigroup for FieldErrors {
    fn combine(mut self, other: Self) -> Self {
        for (field, messages) in other.0 {
            match self.0.entry(field) {
                Entry::Occupied(mut entry) => {
                    let merged = entry.get().clone().combine(messages);
                    entry.insert(merged);
                }
                Entry::Vacant(entry) => {
                    entry.insert(messages);
                }
            }
        }
        self
    }
}

impl IntoIterator for FieldErrors {
    type Item = (String, Messages);
    type IntoIter = indexmap::map::IntoIter<String, Messages>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// The two shapes a validation error can take.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorDetail {
    /// Field-unaware messages.
    Messages(Messages),
    /// Messages keyed by field path.
    Fields(FieldErrors),
}

/// An expected, data-dependent validation failure.
///
/// The error carries either flat messages or field-keyed messages, never
/// both. It can additionally carry a [`Label`] that a parent object cleaner
/// uses when flattening field errors into plain messages.
///
/// # Example
///
/// ```rust
/// use cleanse::ValidationError;
///
/// let err = ValidationError::message("Value required.");
/// assert_eq!(err.to_string(), "Value required.");
///
/// let err = ValidationError::fields([("name", vec!["Value required."])]);
/// assert_eq!(err.to_string(), r#"{"name":["Value required."]}"#);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    detail: ErrorDetail,
    label: Option<Label>,
}

impl ValidationError {
    /// Creates an error holding a single message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::from_messages(NonEmptyVec::singleton(message.into()))
    }

    /// Creates an error from a non-empty message list.
    pub fn from_messages(messages: Messages) -> Self {
        Self {
            detail: ErrorDetail::Messages(messages),
            label: None,
        }
    }

    /// Creates an error from a list of messages.
    ///
    /// # Panics
    ///
    /// Panics if the list is empty. An empty error is a programming mistake,
    /// not a validation outcome; use [`ValidationError::try_messages`] to
    /// check instead.
    pub fn messages<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::try_messages(messages).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Creates an error from a list of messages, rejecting an empty list.
    pub fn try_messages<I, S>(messages: I) -> Result<Self, ErrorShapeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let messages: Vec<String> = messages.into_iter().map(Into::into).collect();
        NonEmptyVec::from_vec(messages)
            .map(Self::from_messages)
            .ok_or(ErrorShapeError::EmptyMessages)
    }

    /// Creates a field-aware error for one field with one message.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::from_fields(FieldErrors::single(
            field,
            NonEmptyVec::singleton(message.into()),
        ))
    }

    /// Creates a field-aware error from validated field errors.
    pub fn from_fields(errors: FieldErrors) -> Self {
        Self {
            detail: ErrorDetail::Fields(errors),
            label: None,
        }
    }

    /// Creates a field-aware error from `(field, messages)` pairs.
    ///
    /// # Panics
    ///
    /// Panics if there are no fields or a field has no messages; use
    /// [`ValidationError::try_fields`] to check instead.
    pub fn fields<I, K, M, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, M)>,
        K: Into<String>,
        M: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::try_fields(fields).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Creates a field-aware error from `(field, messages)` pairs, rejecting
    /// an empty map or a field without messages.
    pub fn try_fields<I, K, M, S>(fields: I) -> Result<Self, ErrorShapeError>
    where
        I: IntoIterator<Item = (K, M)>,
        K: Into<String>,
        M: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map: IndexMap<String, Messages> = IndexMap::new();
        for (field, messages) in fields {
            let field = field.into();
            let messages: Vec<String> = messages.into_iter().map(Into::into).collect();
            let messages = NonEmptyVec::from_vec(messages).ok_or_else(|| {
                ErrorShapeError::EmptyFieldMessages {
                    field: field.clone(),
                }
            })?;
            map.insert(field, messages);
        }
        FieldErrors::from_map(map)
            .map(Self::from_fields)
            .ok_or(ErrorShapeError::EmptyFields)
    }

    /// Builds an error from a dynamic JSON description.
    ///
    /// Accepts a string, a non-empty array of strings, or a non-empty object
    /// whose values are strings or non-empty arrays of strings. Anything else
    /// is reported as an [`ErrorShapeError`].
    ///
    /// ```rust
    /// use cleanse::ValidationError;
    /// use serde_json::json;
    ///
    /// let err = ValidationError::from_json(&json!({"s1": "bang", "s2": ["boom", "oops"]})).unwrap();
    /// assert_eq!(err.errors().unwrap().get("s2").unwrap().len(), 2);
    ///
    /// assert!(ValidationError::from_json(&json!(["bang", null])).is_err());
    /// ```
    pub fn from_json(value: &Value) -> Result<Self, ErrorShapeError> {
        match value {
            Value::String(message) => Ok(Self::message(message.clone())),
            Value::Array(items) => {
                let messages = strings_from_json(items).map_err(|index| {
                    ErrorShapeError::NonStringMessage { index }
                })?;
                Self::try_messages(messages)
            }
            Value::Object(map) => {
                let mut fields: IndexMap<String, Messages> = IndexMap::new();
                for (field, entry) in map {
                    let messages = match entry {
                        Value::String(message) => NonEmptyVec::singleton(message.clone()),
                        Value::Array(items) => {
                            let messages = strings_from_json(items).map_err(|index| {
                                ErrorShapeError::NonStringFieldMessage {
                                    field: field.clone(),
                                    index,
                                }
                            })?;
                            NonEmptyVec::from_vec(messages).ok_or_else(|| {
                                ErrorShapeError::EmptyFieldMessages {
                                    field: field.clone(),
                                }
                            })?
                        }
                        _ => {
                            return Err(ErrorShapeError::InvalidFieldValue {
                                field: field.clone(),
                            })
                        }
                    };
                    fields.insert(field.clone(), messages);
                }
                FieldErrors::from_map(fields)
                    .map(Self::from_fields)
                    .ok_or(ErrorShapeError::EmptyFields)
            }
            _ => Err(ErrorShapeError::InvalidShape),
        }
    }

    /// Attaches a flattening label and returns self for chaining.
    pub fn with_label(mut self, label: impl Into<Label>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns the explicit flattening label, if any.
    pub fn label(&self) -> Option<&Label> {
        self.label.as_ref()
    }

    /// Returns the error shape.
    pub fn detail(&self) -> &ErrorDetail {
        &self.detail
    }

    /// Consumes the error, returning its shape.
    pub fn into_detail(self) -> ErrorDetail {
        self.detail
    }

    /// Returns the flat messages, or `None` for a field-aware error.
    pub fn messages_list(&self) -> Option<&Messages> {
        match &self.detail {
            ErrorDetail::Messages(messages) => Some(messages),
            ErrorDetail::Fields(_) => None,
        }
    }

    /// Returns the field errors, or `None` for a plain error.
    pub fn errors(&self) -> Option<&FieldErrors> {
        match &self.detail {
            ErrorDetail::Messages(_) => None,
            ErrorDetail::Fields(errors) => Some(errors),
        }
    }

    /// Returns true if the error is keyed by field.
    pub fn is_grouped(&self) -> bool {
        matches!(self.detail, ErrorDetail::Fields(_))
    }

    /// Renders the error as JSON: an array of messages or an object of
    /// message arrays.
    pub fn to_json(&self) -> Value {
        match &self.detail {
            ErrorDetail::Messages(messages) => messages_to_json(messages),
            ErrorDetail::Fields(errors) => errors.to_json(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            ErrorDetail::Messages(messages) if messages.len() == 1 => {
                write!(f, "{}", messages.head())
            }
            _ => write!(f, "{}", self.to_json()),
        }
    }
}

impl std::error::Error for ValidationError {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationError>();
    assert_sync::<ValidationError>();
};

/// A malformed validation error description.
///
/// These are programming mistakes (an empty message list, a non-string
/// message), never validation outcomes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorShapeError {
    #[error("validation error message list can't be empty")]
    EmptyMessages,

    #[error("validation error message {index} must be a string")]
    NonStringMessage { index: usize },

    #[error("validation error field map can't be empty")]
    EmptyFields,

    #[error("validation error field '{field}' can't have an empty message list")]
    EmptyFieldMessages { field: String },

    #[error("validation error field '{field}' message {index} must be a string")]
    NonStringFieldMessage { field: String, index: usize },

    #[error("validation error field '{field}' must be a string or array")]
    InvalidFieldValue { field: String },

    #[error("validation error must be a string, array or object")]
    InvalidShape,
}

fn messages_to_json(messages: &Messages) -> Value {
    Value::Array(messages.iter().cloned().map(Value::String).collect())
}

/// Collects strings from a JSON array, returning the index of the first
/// non-string element on failure.
fn strings_from_json(items: &[Value]) -> Result<Vec<String>, usize> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| item.as_str().map(str::to_string).ok_or(index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_is_single_element_list() {
        let err = ValidationError::message("bang");
        assert_eq!(err.messages_list().unwrap().len(), 1);
        assert_eq!(err.messages_list().unwrap().head(), "bang");
        assert!(err.errors().is_none());
        assert!(!err.is_grouped());
    }

    #[test]
    fn test_messages_keep_order() {
        let err = ValidationError::messages(["bang", "boom"]);
        let messages: Vec<_> = err.messages_list().unwrap().iter().cloned().collect();
        assert_eq!(messages, vec!["bang", "boom"]);
    }

    #[test]
    fn test_try_messages_rejects_empty() {
        let result = ValidationError::try_messages(Vec::<String>::new());
        assert_eq!(result, Err(ErrorShapeError::EmptyMessages));
    }

    #[test]
    #[should_panic(expected = "can't be empty")]
    fn test_messages_panics_on_empty() {
        ValidationError::messages(Vec::<String>::new());
    }

    #[test]
    fn test_fields_accept_multiple_messages() {
        let err = ValidationError::fields([("s1", vec!["bang"]), ("s2", vec!["boom", "oops"])]);
        let errors = err.errors().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("s2").unwrap().len(), 2);
        assert!(err.messages_list().is_none());
    }

    #[test]
    fn test_try_fields_rejects_empty_map() {
        let result = ValidationError::try_fields(Vec::<(String, Vec<String>)>::new());
        assert_eq!(result, Err(ErrorShapeError::EmptyFields));
    }

    #[test]
    fn test_try_fields_rejects_empty_messages() {
        let result = ValidationError::try_fields([("s1", Vec::<String>::new())]);
        assert_eq!(
            result,
            Err(ErrorShapeError::EmptyFieldMessages {
                field: "s1".to_string()
            })
        );
    }

    #[test]
    fn test_from_json_shapes() {
        assert_eq!(
            ValidationError::from_json(&json!("bang")).unwrap(),
            ValidationError::message("bang")
        );
        assert_eq!(
            ValidationError::from_json(&json!(["bang", "boom"])).unwrap(),
            ValidationError::messages(["bang", "boom"])
        );
        assert_eq!(
            ValidationError::from_json(&json!({"s1": "bang", "s2": ["boom", "oops"]})).unwrap(),
            ValidationError::fields([("s1", vec!["bang"]), ("s2", vec!["boom", "oops"])])
        );
    }

    #[test]
    fn test_from_json_rejects_junk() {
        assert_eq!(
            ValidationError::from_json(&json!([])),
            Err(ErrorShapeError::EmptyMessages)
        );
        assert_eq!(
            ValidationError::from_json(&json!(["bang", null])),
            Err(ErrorShapeError::NonStringMessage { index: 1 })
        );
        assert_eq!(
            ValidationError::from_json(&json!({})),
            Err(ErrorShapeError::EmptyFields)
        );
        assert_eq!(
            ValidationError::from_json(&json!({"s1": "bang", "s2": null})),
            Err(ErrorShapeError::InvalidFieldValue {
                field: "s2".to_string()
            })
        );
        assert_eq!(
            ValidationError::from_json(&json!({"s1": "bang", "s2": [null]})),
            Err(ErrorShapeError::NonStringFieldMessage {
                field: "s2".to_string(),
                index: 0
            })
        );
        assert_eq!(
            ValidationError::from_json(&json!(42)),
            Err(ErrorShapeError::InvalidShape)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ValidationError::message("bang").to_string(), "bang");
        assert_eq!(
            ValidationError::messages(["bang", "boom"]).to_string(),
            r#"["bang","boom"]"#
        );
        assert_eq!(
            ValidationError::field("a", "bang").to_string(),
            r#"{"a":["bang"]}"#
        );
    }

    #[test]
    fn test_label() {
        let err = ValidationError::message("bang").with_label("Name");
        assert_eq!(err.label(), Some(&Label::text("Name")));

        let err = ValidationError::message("bang").with_label(Label::Hidden);
        assert_eq!(err.label().and_then(Label::as_text), None);
    }

    #[test]
    fn test_field_errors_combine_appends_messages() {
        let a = ValidationError::fields([("a", vec!["1"]), ("b", vec!["2"])]);
        let b = ValidationError::fields([("b", vec!["3"]), ("c", vec!["4"])]);

        let combined = a.errors().unwrap().clone().combine(b.errors().unwrap().clone());
        let fields: Vec<_> = combined.fields().collect();
        assert_eq!(fields, vec!["a", "b", "c"]);
        let b_messages: Vec<_> = combined.get("b").unwrap().iter().cloned().collect();
        assert_eq!(b_messages, vec!["2", "3"]);
    }

    #[test]
    fn test_field_errors_prefixed() {
        let err = ValidationError::fields([("foo", vec!["bang"])]);
        let prefixed = err.errors().unwrap().clone().prefixed("obj");
        assert!(prefixed.get("obj.foo").is_some());
        assert!(prefixed.get("foo").is_none());
    }

    #[test]
    fn test_to_json() {
        assert_eq!(
            ValidationError::messages(["a", "b"]).to_json(),
            json!(["a", "b"])
        );
        assert_eq!(
            ValidationError::fields([("x", vec!["a"])]).to_json(),
            json!({"x": ["a"]})
        );
    }
}
