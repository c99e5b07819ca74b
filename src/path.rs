//! Dotted key paths for nested object fields.
//!
//! This module provides [`KeyPath`], used both to name nested field errors
//! (`job.position`) and to expand flat keys into nested objects when an object
//! cleaner parses keys.

use std::fmt::{self, Display};

use serde_json::{Map, Value};

/// A path of object keys.
///
/// Paths display with dot notation and are built without mutating the
/// original.
///
/// # Example
///
/// ```rust
/// use cleanse::KeyPath;
///
/// let path = KeyPath::from_field("job").push_field("position");
/// assert_eq!(path.to_string(), "job.position");
///
/// let parsed = KeyPath::parse_dotted("job.position");
/// assert_eq!(parsed, path);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Creates a path from a single key.
    pub fn from_field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    /// Creates a path from keys, or `None` if there are none.
    pub fn from_segments<I, S>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            None
        } else {
            Some(Self { segments })
        }
    }

    /// Splits a key on every dot.
    ///
    /// Empty segments are kept: `"a..b"` has three segments.
    pub fn parse_dotted(key: &str) -> Self {
        Self {
            segments: key.split('.').map(str::to_string).collect(),
        }
    }

    /// Returns a new path with a key appended.
    pub fn push_field(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    /// Returns an iterator over the keys.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Writes `value` at this path inside `target`, creating intermediate
    /// objects for missing keys.
    ///
    /// Returns false, leaving `target` untouched, when the path is empty or an
    /// intermediate key already holds a non-object value.
    ///
    /// ```rust
    /// use cleanse::KeyPath;
    /// use serde_json::{json, Map};
    ///
    /// let mut target = Map::new();
    /// assert!(KeyPath::parse_dotted("job.position").insert_into(&mut target, json!("dev")));
    /// assert_eq!(json!(target), json!({"job": {"position": "dev"}}));
    ///
    /// target.insert("age".to_string(), json!(42));
    /// assert!(!KeyPath::parse_dotted("age.years").insert_into(&mut target, json!(1)));
    /// ```
    pub fn insert_into(&self, target: &mut Map<String, Value>, value: Value) -> bool {
        let Some((leaf, parents)) = self.segments.split_last() else {
            return false;
        };

        let mut current = target;
        for key in parents {
            let slot = current
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            match slot {
                Value::Object(map) => current = map,
                _ => return false,
            }
        }
        current.insert(leaf.clone(), value);
        true
    }
}

impl Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}
