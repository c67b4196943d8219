//! Object schemas
//!
//! Every document key is resolved, in order, against:
//! 1. the named properties (exact key match)
//! 2. the pattern properties (first regex that matches)
//! 3. the named then pattern properties of the extra schema
//!
//! A key matched by nothing is rejected in strict mode and copied through
//! unchanged otherwise. Named properties absent from the document get their
//! `default`, sanitized by the property's schema, when they have one and
//! are otherwise reported missing when required. Pattern and extra
//! properties are never required.

use regex::Regex;

use super::builder::SchemaDef;
use super::constraints;
use super::errors::{DefinitionError, DefinitionResult, ValidationError, ValidationResult};
use super::leaf::LeafKind;
use super::options::{Options, REQUIRED, STRICT};
use super::types::Schema;
use super::validator::SchemaNode;
use super::array::{ArrayDef, ArraySchema};
use crate::document::{Document, Map};

/// How a property is matched against document keys.
#[derive(Debug, Clone)]
pub enum PropertyKey {
    /// Exact key
    Name(String),
    /// Regular expression searched in the key
    Pattern(Regex),
}

impl From<&str> for PropertyKey {
    fn from(name: &str) -> Self {
        PropertyKey::Name(name.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(name: String) -> Self {
        PropertyKey::Name(name)
    }
}

impl From<Regex> for PropertyKey {
    fn from(pattern: Regex) -> Self {
        PropertyKey::Pattern(pattern)
    }
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Named(usize),
    Pattern(usize),
}

/// Schema for a string-keyed map.
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    options: Options,
    /// Named properties in definition order
    properties: Vec<(String, Schema)>,
    pattern_properties: Vec<(Regex, Schema)>,
    extra: Option<Box<ObjectSchema>>,
    sanitized: Option<Document>,
}

impl ObjectSchema {
    /// Create an empty object schema; `options` are merged over the object
    /// defaults.
    pub fn new(options: Options) -> Self {
        Self {
            options: options.merged_over(&Self::defaults()),
            properties: Vec::new(),
            pattern_properties: Vec::new(),
            extra: None,
            sanitized: None,
        }
    }

    /// Builds an object schema from a definition block.
    pub fn define<F>(options: Options, f: F) -> DefinitionResult<ObjectSchema>
    where
        F: FnOnce(&mut ObjectDef) -> DefinitionResult<()>,
    {
        let mut def = ObjectDef {
            schema: ObjectSchema::new(options),
        };
        f(&mut def)?;
        Ok(def.schema)
    }

    pub fn defaults() -> Options {
        Options::new().with(REQUIRED, true).with(STRICT, false)
    }

    pub fn is_strict(&self) -> bool {
        self.options.strict()
    }

    /// Named properties in definition order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.properties.iter().map(|(name, schema)| (name.as_str(), schema))
    }

    /// Named property by exact key
    pub fn property(&self, name: &str) -> Option<&Schema> {
        self.properties
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, schema)| schema)
    }

    /// Pattern properties in definition order
    pub fn pattern_properties(&self) -> impl Iterator<Item = (&Regex, &Schema)> {
        self.pattern_properties.iter().map(|(regex, schema)| (regex, schema))
    }

    /// Schema describing additional, never required, keys
    pub fn extra(&self) -> Option<&ObjectSchema> {
        self.extra.as_deref()
    }

    /// Records a property.
    pub fn add_property(&mut self, key: PropertyKey, schema: Schema) -> DefinitionResult<&mut Schema> {
        match key {
            PropertyKey::Name(name) => {
                if self.property(&name).is_some() {
                    return Err(DefinitionError::DuplicateProperty(name));
                }
                let index = self.properties.len();
                self.properties.push((name, schema));
                Ok(&mut self.properties[index].1)
            }
            PropertyKey::Pattern(regex) => {
                let index = self.pattern_properties.len();
                self.pattern_properties.push((regex, schema));
                Ok(&mut self.pattern_properties[index].1)
            }
        }
    }

    /// Mutable access to the options, for further configuration.
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    pub fn reset(&mut self) {
        self.sanitized = None;
        self.properties.iter_mut().for_each(|(_, schema)| schema.reset());
        self.pattern_properties.iter_mut().for_each(|(_, schema)| schema.reset());
        if let Some(extra) = self.extra.as_deref_mut() {
            extra.reset();
        }
    }

    fn find(&self, key: &str) -> Option<Slot> {
        if let Some(index) = self.properties.iter().position(|(name, _)| name == key) {
            return Some(Slot::Named(index));
        }
        self.pattern_properties
            .iter()
            .position(|(regex, _)| regex.is_match(key))
            .map(Slot::Pattern)
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Schema {
        match slot {
            Slot::Named(index) => &mut self.properties[index].1,
            Slot::Pattern(index) => &mut self.pattern_properties[index].1,
        }
    }

    /// Schema matching `key`, looking at the extra schema last.
    fn resolve_mut(&mut self, key: &str) -> Option<&mut Schema> {
        if let Some(slot) = self.find(key) {
            return Some(self.slot_mut(slot));
        }
        let extra = self.extra.as_deref_mut()?;
        let slot = extra.find(key)?;
        Some(extra.slot_mut(slot))
    }
}

impl SchemaNode for ObjectSchema {
    fn options(&self) -> &Options {
        &self.options
    }

    fn default_options(&self) -> Options {
        Self::defaults()
    }

    fn validate_format(&mut self, doc: &Document) -> ValidationResult<Document> {
        let map = doc
            .as_object()
            .ok_or_else(|| ValidationError::type_mismatch("object", doc))?;
        tracing::trace!(keys = map.len(), strict = self.is_strict(), "validating object");

        let strict = self.is_strict();
        let mut sanitized = Map::new();
        for (key, value) in map {
            match self.resolve_mut(key) {
                Some(schema) => {
                    let value = schema.validate(value).map_err(|e| e.at_key(key.as_str()))?;
                    sanitized.insert(key.clone(), value.clone());
                }
                None if strict => return Err(ValidationError::unknown_key(key.as_str())),
                None => {
                    sanitized.insert(key.clone(), value.clone());
                }
            }
        }

        for (name, schema) in &mut self.properties {
            if map.contains_key(name.as_str()) {
                continue;
            }
            if let Some(default) = schema.options().default_value().cloned() {
                let value = schema.validate(&default).map_err(|e| e.at_key(name.as_str()))?;
                sanitized.insert(name.clone(), value.clone());
            } else if schema.options().required() {
                return Err(ValidationError::missing_key(name.as_str()));
            }
        }

        Ok(Document::Object(sanitized))
    }

    fn validate_constraints(&self, value: &Document) -> ValidationResult<()> {
        constraints::validate_constraints(&self.options, value)
    }

    fn sanitized_slot(&self) -> &Option<Document> {
        &self.sanitized
    }

    fn sanitized_slot_mut(&mut self) -> &mut Option<Document> {
        &mut self.sanitized
    }
}

/// Builder bound inside an object definition block.
#[derive(Debug)]
pub struct ObjectDef {
    schema: ObjectSchema,
}

impl ObjectDef {
    /// Records a property matched by exact name or by `Regex`.
    pub fn property(
        &mut self,
        key: impl Into<PropertyKey>,
        schema: impl Into<Schema>,
    ) -> DefinitionResult<&mut Schema> {
        self.schema.add_property(key.into(), schema.into())
    }

    /// Records a pattern property from regular expression source.
    pub fn pattern(&mut self, pattern: &str, schema: impl Into<Schema>) -> DefinitionResult<&mut Schema> {
        let regex = Regex::new(pattern).map_err(|e| DefinitionError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        self.property(regex, schema)
    }

    pub fn leaf(
        &mut self,
        key: impl Into<PropertyKey>,
        kind: LeafKind,
        options: Options,
    ) -> DefinitionResult<&mut Schema> {
        self.property(key, Schema::leaf(kind, options))
    }

    pub fn integer(&mut self, key: impl Into<PropertyKey>, options: Options) -> DefinitionResult<&mut Schema> {
        self.leaf(key, LeafKind::Integer, options)
    }

    pub fn float(&mut self, key: impl Into<PropertyKey>, options: Options) -> DefinitionResult<&mut Schema> {
        self.leaf(key, LeafKind::Float, options)
    }

    pub fn numeric(&mut self, key: impl Into<PropertyKey>, options: Options) -> DefinitionResult<&mut Schema> {
        self.leaf(key, LeafKind::Numeric, options)
    }

    pub fn string(&mut self, key: impl Into<PropertyKey>, options: Options) -> DefinitionResult<&mut Schema> {
        self.leaf(key, LeafKind::String, options)
    }

    pub fn boolean(&mut self, key: impl Into<PropertyKey>, options: Options) -> DefinitionResult<&mut Schema> {
        self.leaf(key, LeafKind::Boolean, options)
    }

    /// Nested array property built from its own block.
    pub fn array<F>(&mut self, key: impl Into<PropertyKey>, options: Options, f: F) -> DefinitionResult<&mut Schema>
    where
        F: FnOnce(&mut ArrayDef) -> DefinitionResult<()>,
    {
        let schema = ArraySchema::define(options, f)?;
        self.property(key, schema)
    }

    /// Nested object property built from its own block.
    pub fn object<F>(&mut self, key: impl Into<PropertyKey>, options: Options, f: F) -> DefinitionResult<&mut Schema>
    where
        F: FnOnce(&mut ObjectDef) -> DefinitionResult<()>,
    {
        let schema = ObjectSchema::define(options, f)?;
        self.property(key, schema)
    }

    /// Property of any kind built by a root definition block.
    pub fn schema<F>(&mut self, key: impl Into<PropertyKey>, f: F) -> DefinitionResult<&mut Schema>
    where
        F: FnOnce(&mut SchemaDef) -> DefinitionResult<()>,
    {
        let schema = Schema::define(f)?;
        self.property(key, schema)
    }

    /// Describes additional keys. Repeated blocks extend the same extra
    /// schema.
    pub fn extra<F>(&mut self, f: F) -> DefinitionResult<()>
    where
        F: FnOnce(&mut ObjectDef) -> DefinitionResult<()>,
    {
        let schema = match self.schema.extra.take() {
            Some(extra) => *extra,
            None => ObjectSchema::new(Options::new()),
        };
        let mut def = ObjectDef { schema };
        f(&mut def)?;
        self.schema.extra = Some(Box::new(def.schema));
        Ok(())
    }
}
