//! Style and behavior attribute tables.
//!
//! Every element kind has a default attribute table (its schema): the fixed
//! set of keys an element of that kind may carry, each with a default value.
//! Callers customize an element by passing overrides, which are merged onto a
//! private copy of the defaults with [`Attributes::merged`].
//!
//! # Example
//!
//! ```
//! # use scrawl_core::attributes::Attributes;
//! # use scrawl_core::element::ElementKind;
//! let defaults = Attributes::new()
//!     .with("strokeColor", "#1e1e1e")
//!     .with("roughness", 1);
//!
//! let resolved = defaults
//!     .merged(ElementKind::Rectangle, &Attributes::new().with("roughness", 2))
//!     .unwrap();
//! assert_eq!(resolved.get("roughness"), Some(&2.into()));
//! assert_eq!(defaults.get("roughness"), Some(&1.into()));
//!
//! let err = defaults
//!     .merged(ElementKind::Rectangle, &Attributes::new().with("someKey", "value"))
//!     .unwrap_err();
//! assert_eq!(err.to_string(), "Unexpected key for shape rectangle: someKey");
//! ```

use indexmap::IndexMap;
use log::trace;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{element::ElementKind, error::ElementError};

/// An insertion-ordered map of attribute key to JSON value.
///
/// Attribute keys use the drawing-file spelling (`strokeColor`,
/// `boundElements`, ...), since they are exported verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(IndexMap<String, Value>);

impl Attributes {
    /// Creates an empty attribute table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the table with `key` set to `value`, for chained construction.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Sets `key` to `value`, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolves `overrides` against this table used as the schema for `kind`.
    ///
    /// The result is an independent copy of `self` with each override applied
    /// by key, so later edits to the returned table never reach the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::UnrecognizedAttribute`] for the first override
    /// key that `self` does not contain.
    pub fn merged(&self, kind: ElementKind, overrides: &Attributes) -> Result<Attributes, ElementError> {
        let mut resolved = self.clone();
        for (key, value) in overrides.iter() {
            let Some(slot) = resolved.get_mut(key) else {
                return Err(ElementError::UnrecognizedAttribute {
                    kind,
                    key: key.to_string(),
                });
            };
            *slot = value.clone();
        }
        trace!(kind:%, attributes:? = resolved; "Resolved attributes");
        Ok(resolved)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
