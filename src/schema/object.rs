//! Object cleaning.
//!
//! This module provides [`ObjectSchema`] for cleaning JSON objects field by
//! field. A clean runs in five stages:
//!
//! 1. optional key parsing, expanding `"job.position"` into nested objects;
//! 2. every declared field is cleaned with a context carrying this call's
//!    [`DataStore`] and the grouping override for nested objects;
//! 3. field failures are either grouped by field path or flattened into
//!    labelled messages;
//! 4. the custom step runs when every field succeeded;
//! 5. plain errors are optionally moved under a non-field-errors key.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{join_all, BoxFuture};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use stillwater::prelude::*;

use super::base::{base_builder, reject, rejected, Admitted, BaseRules, BaseSchema};
use super::traits::{Cleaned, Cleaner, ValueCleaner};
use crate::context::{Context, DataStore, MessageKey};
use crate::error::{CleanError, ErrorDetail, FieldErrors, Label, SchemaError, ValidationError};
use crate::path::KeyPath;

type KeySplitter = Arc<dyn Fn(&str) -> Option<Vec<String>> + Send + Sync>;

type ObjectStep = Arc<
    dyn Fn(Map<String, Value>, Context) -> BoxFuture<'static, Result<Map<String, Value>, CleanError>>
        + Send
        + Sync,
>;

/// How flat input keys are turned into nested paths.
#[derive(Clone)]
enum KeyParser {
    Dotted,
    Custom(KeySplitter),
}

impl KeyParser {
    fn path(&self, key: &str) -> Option<KeyPath> {
        match self {
            KeyParser::Dotted => Some(KeyPath::parse_dotted(key)),
            KeyParser::Custom(split) => split(key).and_then(KeyPath::from_segments),
        }
    }

    /// Writes every input entry at its parsed path. Keys without a path, or
    /// whose path runs through a non-object value, are dropped.
    fn expand(&self, input: &Map<String, Value>) -> Map<String, Value> {
        let mut expanded = Map::new();
        for (key, value) in input {
            if let Some(path) = self.path(key) {
                path.insert_into(&mut expanded, value.clone());
            }
        }
        expanded
    }
}

/// A schema for cleaning JSON objects.
///
/// Only declared fields reach the result; undeclared input keys are ignored.
/// Fields that clean to `Undefined` are left out and `Null` is kept.
///
/// # Example
///
/// ```rust
/// use cleanse::{Cleaner, Context, Schema};
/// use serde_json::json;
///
/// # futures::executor::block_on(async {
/// let cleaner = Schema::object()
///     .field("name", Schema::string().build().unwrap())
///     .field("age", Schema::integer().required(false).build().unwrap())
///     .build()
///     .unwrap();
/// let ctx = Context::new();
///
/// let cleaned = cleaner.clean(Some(&json!({"name": "Ann", "x": 1})), &ctx).await.unwrap();
/// assert_eq!(cleaned.into_json(), Some(json!({"name": "Ann"})));
///
/// let err = cleaner.clean(Some(&json!({"age": "old"})), &ctx).await.unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     r#"{"name":["Value required."],"age":["Invalid value."]}"#
/// );
/// # });
/// ```
#[derive(Clone)]
pub struct ObjectSchema {
    base: BaseSchema,
    fields: IndexMap<String, Arc<dyn ValueCleaner>>,
    labels: IndexMap<String, Label>,
    parse_keys: Option<KeyParser>,
    group_errors: bool,
    non_field_errors_key: Option<String>,
    concurrent: bool,
    step: Option<ObjectStep>,
}

impl ObjectSchema {
    /// Creates a new object schema with no fields.
    pub fn new() -> Self {
        Self {
            base: BaseSchema::default(),
            fields: IndexMap::new(),
            labels: IndexMap::new(),
            parse_keys: None,
            group_errors: true,
            non_field_errors_key: None,
            concurrent: false,
            step: None,
        }
    }

    base_builder!();

    /// Declares a field. Fields are cleaned in declaration order.
    pub fn field<C>(mut self, name: impl Into<String>, cleaner: C) -> Self
    where
        C: Cleaner + 'static,
    {
        self.fields.insert(name.into(), Arc::new(cleaner));
        self
    }

    /// Expands dotted input keys into nested objects before cleaning.
    ///
    /// ```rust
    /// use cleanse::{Cleaner, Context, Schema};
    /// use serde_json::json;
    ///
    /// # futures::executor::block_on(async {
    /// let job = Schema::object()
    ///     .field("position", Schema::string().build().unwrap())
    ///     .build()
    ///     .unwrap();
    /// let cleaner = Schema::object().parse_keys().field("job", job).build().unwrap();
    ///
    /// let cleaned = cleaner
    ///     .clean(Some(&json!({"job.position": "Engineer"})), &Context::new())
    ///     .await
    ///     .unwrap();
    /// assert_eq!(cleaned.into_json(), Some(json!({"job": {"position": "Engineer"}})));
    /// # });
    /// ```
    pub fn parse_keys(mut self) -> Self {
        self.parse_keys = Some(KeyParser::Dotted);
        self
    }

    /// Expands input keys into nested objects using a custom splitter.
    ///
    /// Keys for which the splitter returns `None` or an empty path are
    /// dropped.
    pub fn parse_keys_with<F>(mut self, split: F) -> Self
    where
        F: Fn(&str) -> Option<Vec<String>> + Send + Sync + 'static,
    {
        self.parse_keys = Some(KeyParser::Custom(Arc::new(split)));
        self
    }

    /// Sets whether field errors are grouped by field path (default `true`).
    ///
    /// When disabled, every field message is flattened into
    /// `"<label>: <message>"` and nested objects are told to do the same. A
    /// grouping override on the context wins over this setting.
    pub fn group_errors(mut self, group: bool) -> Self {
        self.group_errors = group;
        self
    }

    /// Sets the label used for a field when errors are flattened.
    ///
    /// Pass [`Label::Hidden`] to flatten the field's messages without prefix.
    pub fn label_for(mut self, field: impl Into<String>, label: impl Into<Label>) -> Self {
        self.labels.insert(field.into(), label.into());
        self
    }

    /// Moves every plain error leaving this cleaner under `key`, so callers
    /// always receive field-keyed errors.
    pub fn non_field_errors_key(mut self, key: impl Into<String>) -> Self {
        self.non_field_errors_key = Some(key.into());
        self
    }

    /// Cleans all fields at once instead of one after another.
    ///
    /// Each field then writes to its own data store, so a field cannot see
    /// what a sibling wrote during the same call. The stores are merged in
    /// declaration order once every field is done.
    pub fn concurrent(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// Attaches an async step that runs on the cleaned object when no field
    /// failed.
    ///
    /// Errors from the step surface unchanged: a plain error as a top-level
    /// message, a field error keyed by its own fields.
    ///
    /// ```rust
    /// use cleanse::{Cleaner, Context, Schema, ValidationError};
    /// use serde_json::json;
    ///
    /// # futures::executor::block_on(async {
    /// let cleaner = Schema::object()
    ///     .field("password", Schema::string().build().unwrap())
    ///     .field("repeat", Schema::string().build().unwrap())
    ///     .clean_with(|obj, _ctx| async move {
    ///         if obj.get("password") != obj.get("repeat") {
    ///             return Err(ValidationError::field("repeat", "Passwords differ.").into());
    ///         }
    ///         Ok(obj)
    ///     })
    ///     .build()
    ///     .unwrap();
    ///
    /// let err = cleaner
    ///     .clean(Some(&json!({"password": "a", "repeat": "b"})), &Context::new())
    ///     .await
    ///     .unwrap_err();
    /// assert_eq!(err.to_string(), r#"{"repeat":["Passwords differ."]}"#);
    /// # });
    /// ```
    pub fn clean_with<F, Fut>(mut self, step: F) -> Self
    where
        F: Fn(Map<String, Value>, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Map<String, Value>, CleanError>> + Send + 'static,
    {
        self.step = Some(Arc::new(move |obj, ctx| Box::pin(step(obj, ctx))));
        self
    }

    /// Validates the option combination and builds the cleaner.
    pub fn build(&self) -> Result<ObjectCleaner, SchemaError> {
        let rules = self.base.normalize().map_err(|e| rejected("object", e))?;
        Ok(ObjectCleaner {
            rules,
            fields: self.fields.clone(),
            labels: self.labels.clone(),
            parse_keys: self.parse_keys.clone(),
            group_errors: self.group_errors,
            non_field_errors_key: self.non_field_errors_key.clone(),
            concurrent: self.concurrent,
            step: self.step.clone(),
        })
    }
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObjectSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSchema")
            .field("base", &self.base)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("labels", &self.labels)
            .field("parse_keys", &self.parse_keys.is_some())
            .field("group_errors", &self.group_errors)
            .field("non_field_errors_key", &self.non_field_errors_key)
            .field("concurrent", &self.concurrent)
            .finish()
    }
}

/// Cleaner built from an [`ObjectSchema`].
#[derive(Clone)]
pub struct ObjectCleaner {
    rules: BaseRules,
    fields: IndexMap<String, Arc<dyn ValueCleaner>>,
    labels: IndexMap<String, Label>,
    parse_keys: Option<KeyParser>,
    group_errors: bool,
    non_field_errors_key: Option<String>,
    concurrent: bool,
    step: Option<ObjectStep>,
}

impl ObjectCleaner {
    /// Returns the declared field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    async fn clean_object(
        &self,
        value: Option<&Value>,
        ctx: &Context,
    ) -> Result<Cleaned<Map<String, Value>>, CleanError> {
        let value = match self.rules.admit(value, ctx)? {
            Admitted::Undefined => return Ok(Cleaned::Undefined),
            Admitted::Null => return Ok(Cleaned::Null),
            Admitted::Present(value) => value,
        };
        let Value::Object(input) = value else {
            return Err(reject(ctx, MessageKey::Invalid).into());
        };

        let expanded;
        let input = match &self.parse_keys {
            Some(parser) => {
                expanded = parser.expand(input);
                &expanded
            }
            None => input,
        };

        let group = ctx.group_errors().unwrap_or(self.group_errors);
        let nested_group = if group { None } else { Some(false) };
        let mut outcome = FieldOutcome::new(self, group);

        if self.concurrent {
            let stores: Vec<DataStore> = self.fields.iter().map(|_| DataStore::new()).collect();
            let pending = self.fields.iter().zip(&stores).map(|((name, cleaner), store)| {
                let field_ctx = ctx.for_fields(store.clone(), nested_group);
                async move { cleaner.clean_value(input.get(name.as_str()), &field_ctx).await }
            });
            let results = join_all(pending).await;
            for ((name, cleaner), result) in self.fields.iter().zip(results) {
                outcome.record(name, cleaner.as_ref(), result)?;
            }
            for store in &stores {
                store.merge_into(&mut outcome.values);
            }
        } else {
            let store = DataStore::new();
            let field_ctx = ctx.for_fields(store.clone(), nested_group);
            for (name, cleaner) in &self.fields {
                let result = cleaner.clean_value(input.get(name.as_str()), &field_ctx).await;
                outcome.record(name, cleaner.as_ref(), result)?;
            }
            store.merge_into(&mut outcome.values);
        }

        let cleaned = outcome.finish()?;
        match &self.step {
            Some(step) => Ok(Cleaned::Value(step(cleaned, ctx.clone()).await?)),
            None => Ok(Cleaned::Value(cleaned)),
        }
    }

    /// Resolves the prefix used when flattening a field's messages.
    fn flatten_label(
        &self,
        field: &str,
        err: &ValidationError,
        cleaner: &dyn ValueCleaner,
    ) -> Option<String> {
        let label = err
            .label()
            .or_else(|| self.labels.get(field))
            .or_else(|| cleaner.value_label());
        match label {
            Some(Label::Text(text)) if !text.is_empty() => Some(text.clone()),
            Some(_) => None,
            None => Some(humanize(field)),
        }
    }

    fn remap(&self, err: ValidationError) -> ValidationError {
        let Some(key) = &self.non_field_errors_key else {
            return err;
        };
        if err.is_grouped() {
            return err;
        }
        let label = err.label().cloned();
        let remapped = match err.into_detail() {
            ErrorDetail::Messages(messages) => {
                ValidationError::from_fields(FieldErrors::single(key.clone(), messages))
            }
            ErrorDetail::Fields(errors) => ValidationError::from_fields(errors),
        };
        match label {
            Some(label) => remapped.with_label(label),
            None => remapped,
        }
    }
}

#[async_trait]
impl Cleaner for ObjectCleaner {
    type Output = Map<String, Value>;

    async fn clean(
        &self,
        value: Option<&Value>,
        ctx: &Context,
    ) -> Result<Cleaned<Map<String, Value>>, CleanError> {
        match self.clean_object(value, ctx).await {
            Err(CleanError::Invalid(err)) => Err(self.remap(err).into()),
            other => other,
        }
    }

    fn label(&self) -> Option<&Label> {
        self.rules.label()
    }
}

/// Field results of one object clean, gathered in declaration order.
struct FieldOutcome<'a> {
    cleaner: &'a ObjectCleaner,
    group: bool,
    values: Map<String, Value>,
    grouped: Option<FieldErrors>,
    flattened: Vec<String>,
    failed: usize,
}

impl<'a> FieldOutcome<'a> {
    fn new(cleaner: &'a ObjectCleaner, group: bool) -> Self {
        Self {
            cleaner,
            group,
            values: Map::new(),
            grouped: None,
            flattened: Vec::new(),
            failed: 0,
        }
    }

    fn record(
        &mut self,
        field: &str,
        field_cleaner: &dyn ValueCleaner,
        result: Result<Cleaned<Value>, CleanError>,
    ) -> Result<(), CleanError> {
        let err = match result {
            Ok(cleaned) => {
                if let Some(value) = cleaned.into_json() {
                    self.values.insert(field.to_string(), value);
                }
                return Ok(());
            }
            Err(CleanError::Invalid(err)) => err,
            Err(other) => return Err(other),
        };
        self.failed += 1;

        if self.group {
            let errors = match err.into_detail() {
                ErrorDetail::Messages(messages) => FieldErrors::single(field, messages),
                ErrorDetail::Fields(errors) => errors.prefixed(field),
            };
            self.grouped = Some(match self.grouped.take() {
                Some(existing) => existing.combine(errors),
                None => errors,
            });
            return Ok(());
        }

        let label = self.cleaner.flatten_label(field, &err, field_cleaner);
        match err.into_detail() {
            ErrorDetail::Messages(messages) => {
                self.flattened.extend(messages.into_vec().into_iter().map(|message| {
                    match &label {
                        Some(label) => format!("{}: {}", label, message),
                        None => message,
                    }
                }));
                Ok(())
            }
            ErrorDetail::Fields(_) => {
                tracing::error!(
                    field,
                    "nested cleaner returned grouped errors while error grouping is disabled"
                );
                Err(CleanError::UngroupedNesting {
                    field: field.to_string(),
                })
            }
        }
    }

    fn finish(self) -> Result<Map<String, Value>, ValidationError> {
        tracing::trace!(
            fields = self.cleaner.fields.len(),
            failures = self.failed,
            grouped = self.group,
            "object cleaned"
        );
        if let Some(errors) = self.grouped {
            return Err(ValidationError::from_fields(errors));
        }
        match NonEmptyVec::from_vec(self.flattened) {
            Some(messages) => Err(ValidationError::from_messages(messages)),
            None => Ok(self.values),
        }
    }
}

/// Turns a field name into a display label: `first_name` and `firstName`
/// both become `First Name`.
fn humanize(field: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    for chunk in field.split(|c: char| !c.is_alphanumeric()) {
        let chars: Vec<char> = chunk.chars().collect();
        let mut word = String::new();
        for (i, &c) in chars.iter().enumerate() {
            if i > 0 && c.is_uppercase() {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
                let boundary = prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next_is_lower);
                if boundary && !word.is_empty() {
                    words.push(std::mem::take(&mut word));
                }
            }
            word.push(c);
        }
        if !word.is_empty() {
            words.push(word);
        }
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
