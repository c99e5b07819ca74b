//! Per-call cleaning context.
//!
//! A [`Context`] is threaded through every cleaner of a call tree. It carries
//! message overrides, caller-supplied values, and the two values an object
//! cleaner injects for its fields: a shared [`DataStore`] and an
//! error-grouping override.

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};

/// Names of the built-in messages that a [`Context`] can override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// Missing, null or blank value.
    Required,
    /// Wrong type or failed parse.
    Invalid,
    /// Malformed e-mail address.
    InvalidEmail,
    /// Array shorter than its minimum.
    ArrayMin,
    /// Array longer than its maximum.
    ArrayMax,
    /// Number below its minimum.
    TooLow,
    /// Number above its maximum.
    TooHigh,
}

impl MessageKey {
    /// Returns the key name used for overrides.
    pub fn name(self) -> &'static str {
        match self {
            MessageKey::Required => "required",
            MessageKey::Invalid => "invalid",
            MessageKey::InvalidEmail => "invalid_email",
            MessageKey::ArrayMin => "array_min",
            MessageKey::ArrayMax => "array_max",
            MessageKey::TooLow => "too_low",
            MessageKey::TooHigh => "too_high",
        }
    }

    /// Returns the built-in message text.
    pub fn default_text(self) -> &'static str {
        match self {
            MessageKey::Required => "Value required.",
            MessageKey::Invalid => "Invalid value.",
            MessageKey::InvalidEmail => "Invalid e-mail address.",
            MessageKey::ArrayMin => "Not enough values.",
            MessageKey::ArrayMax => "Too many values.",
            MessageKey::TooLow => "Value too low.",
            MessageKey::TooHigh => "Value too high.",
        }
    }
}

impl Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key/value store shared by all field cleaners of one object-cleaner call.
///
/// Entries written here are merged into that object's cleaned result after
/// the declared fields, so they may add keys or override field values. The
/// lock is never held across an await point.
#[derive(Debug, Clone, Default)]
pub struct DataStore(Arc<Mutex<Map<String, Value>>>);

impl DataStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value under `key`, replacing any previous value.
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.0.lock().insert(key.into(), value);
    }

    /// Returns a copy of the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.lock().get(key).cloned()
    }

    /// Returns true if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Returns a copy of every entry.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.0.lock().clone()
    }

    /// Copies every entry into `target`, overwriting existing keys.
    pub fn merge_into(&self, target: &mut Map<String, Value>) {
        let entries = self.0.lock();
        for (key, value) in entries.iter() {
            target.insert(key.clone(), value.clone());
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Shared {
    messages: HashMap<String, String>,
    values: HashMap<String, Value>,
}

/// Context passed to every cleaner of a call tree.
///
/// Cloning is cheap. Builder methods return a modified copy and never affect
/// contexts already handed to running cleaners.
///
/// # Example
///
/// ```rust
/// use cleanse::{Context, MessageKey};
/// use serde_json::json;
///
/// let ctx = Context::new()
///     .with_message(MessageKey::Required, "Pflichtfeld.")
///     .with_value("tenant", json!("acme"));
///
/// assert_eq!(ctx.message(MessageKey::Required), "Pflichtfeld.");
/// assert_eq!(ctx.message(MessageKey::Invalid), "Invalid value.");
/// assert_eq!(ctx.value("tenant"), Some(&json!("acme")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    shared: Arc<Shared>,
    data: Option<DataStore>,
    group_errors: Option<bool>,
}

impl Context {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the text of a built-in message.
    pub fn with_message(mut self, key: MessageKey, text: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.shared)
            .messages
            .insert(key.name().to_string(), text.into());
        self
    }

    /// Attaches a caller-supplied value readable by custom steps.
    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        Arc::make_mut(&mut self.shared)
            .values
            .insert(key.into(), value);
        self
    }

    /// Forces error grouping on or off for every object cleaner below.
    pub fn with_group_errors(mut self, group: bool) -> Self {
        self.group_errors = Some(group);
        self
    }

    /// Returns the message text for `key`, honouring overrides.
    pub fn message(&self, key: MessageKey) -> String {
        self.shared
            .messages
            .get(key.name())
            .cloned()
            .unwrap_or_else(|| key.default_text().to_string())
    }

    /// Returns a caller-supplied value.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.shared.values.get(key)
    }

    /// Returns the data store of the enclosing object cleaner call.
    pub fn data(&self) -> Option<&DataStore> {
        self.data.as_ref()
    }

    /// Returns the error-grouping override, if any.
    pub fn group_errors(&self) -> Option<bool> {
        self.group_errors
    }

    /// Derives the context an object cleaner hands to its fields.
    pub(crate) fn for_fields(&self, data: DataStore, group_errors: Option<bool>) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            data: Some(data),
            group_errors,
        }
    }
}
