//! Array schemas
//!
//! An array schema matches a document sequence in one of three mutually
//! exclusive modes, fixed at definition time:
//! - homogeneous: a single item schema validates every element
//! - positional: `items` schemas validate the first positions, which are all
//!   required, then `extra_items` schemas validate the following positions
//!   when present; positions past both lists pass through unchanged
//! - unconstrained: no item schema at all, every element passes through
//!
//! Node-level constraints (`min_size`, `max_size`, `uniq`) then run on the
//! sanitized sequence.

use super::builder::{ItemsDef, PositionalDef};
use super::constraints;
use super::errors::{DefinitionError, DefinitionResult, ValidationError, ValidationResult};
use super::options::{Options, REQUIRED};
use super::types::Schema;
use super::validator::SchemaNode;
use crate::document::Document;

/// Matching strategy of an array schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayMode {
    /// One schema for every element
    Homogeneous,
    /// Positional `items` followed by optional `extra_items`
    Positional,
    /// No per-element validation
    Unconstrained,
}

/// Schema for an ordered sequence.
#[derive(Debug, Clone)]
pub struct ArraySchema {
    options: Options,
    item: Option<Box<Schema>>,
    items: Vec<Schema>,
    extra_items: Vec<Schema>,
    sanitized: Option<Document>,
}

impl ArraySchema {
    /// Create an array schema with no item schema; `options` are merged over
    /// the array defaults.
    pub fn new(options: Options) -> Self {
        Self {
            options: options.merged_over(&Self::defaults()),
            item: None,
            items: Vec::new(),
            extra_items: Vec::new(),
            sanitized: None,
        }
    }

    /// Builds an array schema from a definition block.
    pub fn define<F>(options: Options, f: F) -> DefinitionResult<ArraySchema>
    where
        F: FnOnce(&mut ArrayDef) -> DefinitionResult<()>,
    {
        let mut def = ArrayDef {
            schema: ArraySchema::new(options),
        };
        f(&mut def)?;
        Ok(def.schema)
    }

    pub fn defaults() -> Options {
        Options::new().with(REQUIRED, true).with("uniq", false)
    }

    pub fn mode(&self) -> ArrayMode {
        if self.item.is_some() {
            ArrayMode::Homogeneous
        } else if !self.items.is_empty() || !self.extra_items.is_empty() {
            ArrayMode::Positional
        } else {
            ArrayMode::Unconstrained
        }
    }

    /// Homogeneous item schema
    pub fn item(&self) -> Option<&Schema> {
        self.item.as_deref()
    }

    /// Positional required schemas
    pub fn items(&self) -> &[Schema] {
        &self.items
    }

    /// Positional optional schemas following `items`
    pub fn extra_items(&self) -> &[Schema] {
        &self.extra_items
    }

    /// Sets the homogeneous item schema.
    pub fn set_item(&mut self, schema: Schema) -> DefinitionResult<&mut Schema> {
        if !self.items.is_empty() || !self.extra_items.is_empty() {
            return Err(DefinitionError::MixedItemModes);
        }
        if self.item.is_some() {
            return Err(DefinitionError::DuplicateItem);
        }
        let item = self.item.insert(Box::new(schema));
        Ok(&mut **item)
    }

    /// Appends positional required schemas.
    pub fn push_items(&mut self, schemas: Vec<Schema>) -> DefinitionResult<()> {
        self.check_positional()?;
        self.items.extend(schemas);
        Ok(())
    }

    /// Appends positional optional schemas.
    pub fn push_extra_items(&mut self, schemas: Vec<Schema>) -> DefinitionResult<()> {
        self.check_positional()?;
        self.extra_items.extend(schemas);
        Ok(())
    }

    fn check_positional(&self) -> DefinitionResult<()> {
        if self.item.is_some() {
            Err(DefinitionError::MixedItemModes)
        } else {
            Ok(())
        }
    }

    /// Mutable access to the options, for further configuration.
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    pub fn reset(&mut self) {
        self.sanitized = None;
        if let Some(item) = self.item.as_deref_mut() {
            item.reset();
        }
        self.items.iter_mut().for_each(Schema::reset);
        self.extra_items.iter_mut().for_each(Schema::reset);
    }

    fn validate_homogeneous(item: &mut Schema, elements: &[Document]) -> ValidationResult<Vec<Document>> {
        elements
            .iter()
            .enumerate()
            .map(|(index, element)| {
                item.validate(element)
                    .cloned()
                    .map_err(|e| e.at_index(index))
            })
            .collect()
    }

    fn validate_positional(&mut self, elements: &[Document]) -> ValidationResult<Vec<Document>> {
        if elements.len() < self.items.len() {
            return Err(ValidationError::size_mismatch(self.items.len(), elements.len()));
        }

        let mut sanitized = Vec::with_capacity(elements.len());
        let positional = self.items.iter_mut().chain(self.extra_items.iter_mut());
        for (index, (schema, element)) in positional.zip(elements).enumerate() {
            let value = schema.validate(element).map_err(|e| e.at_index(index))?;
            sanitized.push(value.clone());
        }

        // Out of the schema's authority: copied through as is.
        sanitized.extend_from_slice(&elements[sanitized.len()..]);
        Ok(sanitized)
    }
}

impl SchemaNode for ArraySchema {
    fn options(&self) -> &Options {
        &self.options
    }

    fn default_options(&self) -> Options {
        Self::defaults()
    }

    fn validate_format(&mut self, doc: &Document) -> ValidationResult<Document> {
        let elements = doc
            .as_array()
            .ok_or_else(|| ValidationError::type_mismatch("array", doc))?;

        let mode = self.mode();
        tracing::trace!(?mode, len = elements.len(), "validating array");

        let sanitized = if let Some(item) = self.item.as_deref_mut() {
            Self::validate_homogeneous(item, elements)?
        } else if mode == ArrayMode::Positional {
            self.validate_positional(elements)?
        } else {
            elements.clone()
        };
        Ok(Document::Array(sanitized))
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

/// Builder bound inside an array definition block.
///
/// Positional statements (`item`, `integer`, `array`, ...) set the
/// homogeneous item schema; `items` and `extra_items` open positional lists.
#[derive(Debug)]
pub struct ArrayDef {
    schema: ArraySchema,
}

impl ArrayDef {
    /// Declares the positional required items.
    pub fn items<F>(&mut self, f: F) -> DefinitionResult<()>
    where
        F: FnOnce(&mut ItemsDef) -> DefinitionResult<()>,
    {
        self.schema.check_positional()?;
        let mut def = ItemsDef::default();
        f(&mut def)?;
        self.schema.push_items(def.finish())
    }

    /// Declares the positional optional items following `items`.
    pub fn extra_items<F>(&mut self, f: F) -> DefinitionResult<()>
    where
        F: FnOnce(&mut ItemsDef) -> DefinitionResult<()>,
    {
        self.schema.check_positional()?;
        let mut def = ItemsDef::default();
        f(&mut def)?;
        self.schema.push_extra_items(def.finish())
    }
}

impl PositionalDef for ArrayDef {
    fn push_schema(&mut self, schema: Schema) -> DefinitionResult<&mut Schema> {
        self.schema.set_item(schema)
    }
}
