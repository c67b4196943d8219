//! Option sets
//!
//! An option set maps constraint names (`greater_than`, `min_size`, ...) and
//! meta-options (`required`, `default`, `doc`, ...) to their argument. Every
//! schema kind has its own defaults; caller-supplied entries always win over
//! them.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{DefinitionError, DefinitionResult};
use crate::document::Document;

/// Whether the property must be present in its parent object
pub const REQUIRED: &str = "required";
/// Value inserted when the property is absent
pub const DEFAULT: &str = "default";
/// Documentation text, or `false` to hide the node from dumpers
pub const DOC: &str = "doc";
/// Accept `null` in place of the expected value
pub const ALLOW_NIL: &str = "allow_nil";
/// Reject object keys matched by nothing
pub const STRICT: &str = "strict";
/// Named format for string schemas
pub const FORMAT: &str = "format";

/// Mapping from option name to argument.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(BTreeMap<String, Document>);

impl Options {
    /// Create an empty option set
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Document>) -> Self {
        self.insert(key, value);
        self
    }

    /// Loads an option set from a JSON object.
    pub fn from_json(value: Value) -> DefinitionResult<Self> {
        match Document::from(value) {
            Document::Object(map) => Ok(Self(map)),
            other => Err(DefinitionError::InvalidOptions(format!(
                "expected an object, got {}",
                other.type_name()
            ))),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Document>) -> Option<Document> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Document> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Document> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Document> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `defaults` overlaid with every entry of `self`.
    pub fn merged_over(&self, defaults: &Options) -> Options {
        let mut merged = defaults.clone();
        for (key, value) in &self.0 {
            merged.0.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Returns the entries that are absent from, or differ from, `defaults`.
    pub fn non_default(&self, defaults: &Options) -> Options {
        Options(
            self.0
                .iter()
                .filter(|(key, value)| defaults.get(key) != Some(*value))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    /// `required` meta-option (defaults to true)
    pub fn required(&self) -> bool {
        self.flag(REQUIRED, true)
    }

    /// `default` meta-option
    pub fn default_value(&self) -> Option<&Document> {
        self.get(DEFAULT)
    }

    /// `doc` meta-option when it holds text
    pub fn doc(&self) -> Option<&str> {
        self.get(DOC).and_then(Document::as_str)
    }

    /// True when `doc: false` hides the node from dumpers
    pub fn is_nodoc(&self) -> bool {
        self.get(DOC) == Some(&Document::Bool(false))
    }

    /// `allow_nil` meta-option (defaults to false)
    pub fn allow_nil(&self) -> bool {
        self.flag(ALLOW_NIL, false)
    }

    /// `strict` meta-option (defaults to false)
    pub fn strict(&self) -> bool {
        self.flag(STRICT, false)
    }

    /// `format` meta-option
    pub fn format(&self) -> Option<&str> {
        self.get(FORMAT).and_then(Document::as_str)
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(Document::as_bool).unwrap_or(default)
    }
}

impl<'a> IntoIterator for &'a Options {
    type Item = (&'a String, &'a Document);
    type IntoIter = btree_map::Iter<'a, String, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Document>> FromIterator<(K, V)> for Options {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Options(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
