//! Composite schemas
//!
//! A composite is a named schema template built once from primitives and
//! registered in a `CompositeRegistry`. Every use site gets its own deep copy,
//! so two use sites never share sanitized state. The use-site options
//! (`required`, `default`, `doc`, constraints) apply to the composite node,
//! the template keeps its own.

use std::collections::BTreeMap;

use super::builder::SchemaDef;
use super::constraints;
use super::errors::{DefinitionError, DefinitionResult, ValidationResult};
use super::options::{Options, REQUIRED};
use super::types::Schema;
use super::validator::SchemaNode;
use crate::document::Document;

/// Turns the sanitized value of a composite's inner schema into the
/// composite's canonical value.
pub type Sanitizer = fn(Document) -> ValidationResult<Document>;

/// A use-site instance of a registered composite.
#[derive(Debug, Clone)]
pub struct CompositeSchema {
    name: String,
    options: Options,
    schema: Box<Schema>,
    sanitizer: Option<Sanitizer>,
    sanitized: Option<Document>,
}

impl CompositeSchema {
    pub fn new(name: impl Into<String>, schema: Schema, options: Options) -> Self {
        Self {
            name: name.into(),
            options: options.merged_over(&Self::defaults()),
            schema: Box::new(schema),
            sanitizer: None,
            sanitized: None,
        }
    }

    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = Some(sanitizer);
        self
    }

    pub fn defaults() -> Options {
        Options::new().with(REQUIRED, true)
    }

    /// Registered name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// This instance's copy of the template
    pub fn inner(&self) -> &Schema {
        &self.schema
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    pub fn reset(&mut self) {
        self.sanitized = None;
        self.schema.reset();
    }
}

impl SchemaNode for CompositeSchema {
    fn options(&self) -> &Options {
        &self.options
    }

    fn default_options(&self) -> Options {
        Self::defaults()
    }

    fn validate_format(&mut self, doc: &Document) -> ValidationResult<Document> {
        tracing::trace!(composite = %self.name, "validating composite");
        let value = self.schema.validate(doc)?.clone();
        match self.sanitizer {
            Some(sanitize) => sanitize(value),
            None => Ok(value),
        }
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

#[derive(Debug, Clone)]
struct Template {
    schema: Schema,
    sanitizer: Option<Sanitizer>,
}

/// Named composite templates.
///
/// Templates are immutable once registered; a name can only be registered
/// once.
#[derive(Debug, Default)]
pub struct CompositeRegistry {
    templates: BTreeMap<String, Template>,
}

impl CompositeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a template from a root definition block and registers it.
    pub fn define<F>(&mut self, name: impl Into<String>, f: F) -> DefinitionResult<()>
    where
        F: FnOnce(&mut SchemaDef) -> DefinitionResult<()>,
    {
        let schema = Schema::define(f)?;
        self.register(name, schema)
    }

    /// Registers a template.
    pub fn register(&mut self, name: impl Into<String>, schema: impl Into<Schema>) -> DefinitionResult<()> {
        self.insert(name.into(), schema.into(), None)
    }

    /// Registers a template whose sanitized value is post-processed by
    /// `sanitizer`.
    pub fn register_with_sanitizer(
        &mut self,
        name: impl Into<String>,
        schema: impl Into<Schema>,
        sanitizer: Sanitizer,
    ) -> DefinitionResult<()> {
        self.insert(name.into(), schema.into(), Some(sanitizer))
    }

    fn insert(&mut self, name: String, mut schema: Schema, sanitizer: Option<Sanitizer>) -> DefinitionResult<()> {
        if self.templates.contains_key(&name) {
            return Err(DefinitionError::CompositeAlreadyRegistered(name));
        }
        // Templates are copied, never validated directly.
        schema.reset();
        tracing::debug!(composite = %name, kind = schema.kind_tag(), "registered composite");
        self.templates.insert(name, Template { schema, sanitizer });
        Ok(())
    }

    /// Creates an independent use-site instance of `name`.
    pub fn instantiate(&self, name: &str, options: Options) -> DefinitionResult<Schema> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| DefinitionError::UnknownComposite(name.to_string()))?;
        let mut composite = CompositeSchema::new(name, template.schema.clone(), options);
        composite.sanitizer = template.sanitizer;
        Ok(Schema::Composite(composite))
    }

    /// Template registered under `name`
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.templates.get(name).map(|template| &template.schema)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Registered names in lexicographic order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
