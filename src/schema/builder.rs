//! Definition builders
//!
//! A definition block is a closure receiving a builder. Each statement
//! creates a child schema, records it in the enclosing composite and returns
//! it for further configuration. Structural misuse (mixing array modes,
//! duplicate names, several root statements, ...) fails immediately with a
//! `DefinitionError`.

use super::array::{ArrayDef, ArraySchema};
use super::errors::{DefinitionError, DefinitionResult};
use super::leaf::LeafKind;
use super::object::{ObjectDef, ObjectSchema};
use super::options::Options;
use super::types::Schema;

/// Statements shared by builders that record schemas positionally, without
/// a name: array items, items lists and root definitions.
pub trait PositionalDef {
    /// Records a schema in the enclosing definition.
    fn push_schema(&mut self, schema: Schema) -> DefinitionResult<&mut Schema>;

    fn item(&mut self, schema: impl Into<Schema>) -> DefinitionResult<&mut Schema>
    where
        Self: Sized,
    {
        self.push_schema(schema.into())
    }

    fn leaf(&mut self, kind: LeafKind, options: Options) -> DefinitionResult<&mut Schema>
    where
        Self: Sized,
    {
        self.push_schema(Schema::leaf(kind, options))
    }

    fn integer(&mut self, options: Options) -> DefinitionResult<&mut Schema>
    where
        Self: Sized,
    {
        self.leaf(LeafKind::Integer, options)
    }

    fn float(&mut self, options: Options) -> DefinitionResult<&mut Schema>
    where
        Self: Sized,
    {
        self.leaf(LeafKind::Float, options)
    }

    fn numeric(&mut self, options: Options) -> DefinitionResult<&mut Schema>
    where
        Self: Sized,
    {
        self.leaf(LeafKind::Numeric, options)
    }

    fn string(&mut self, options: Options) -> DefinitionResult<&mut Schema>
    where
        Self: Sized,
    {
        self.leaf(LeafKind::String, options)
    }

    fn boolean(&mut self, options: Options) -> DefinitionResult<&mut Schema>
    where
        Self: Sized,
    {
        self.leaf(LeafKind::Boolean, options)
    }

    /// Nested array schema built from its own block.
    fn array<F>(&mut self, options: Options, f: F) -> DefinitionResult<&mut Schema>
    where
        Self: Sized,
        F: FnOnce(&mut ArrayDef) -> DefinitionResult<()>,
    {
        let schema = ArraySchema::define(options, f)?;
        self.push_schema(schema.into())
    }

    /// Nested object schema built from its own block.
    fn object<F>(&mut self, options: Options, f: F) -> DefinitionResult<&mut Schema>
    where
        Self: Sized,
        F: FnOnce(&mut ObjectDef) -> DefinitionResult<()>,
    {
        let schema = ObjectSchema::define(options, f)?;
        self.push_schema(schema.into())
    }
}

/// Builder for a root schema of any kind.
///
/// Accepts exactly one schema statement.
#[derive(Debug, Default)]
pub struct SchemaDef {
    schema: Option<Schema>,
    doc: Option<String>,
}

impl SchemaDef {
    /// Documents the root schema.
    pub fn doc(&mut self, text: impl Into<String>) -> &mut Self {
        self.doc = Some(text.into());
        self
    }

    pub(crate) fn finish(self) -> (Option<Schema>, Option<String>) {
        (self.schema, self.doc)
    }
}

impl PositionalDef for SchemaDef {
    fn push_schema(&mut self, schema: Schema) -> DefinitionResult<&mut Schema> {
        if self.schema.is_some() {
            return Err(DefinitionError::MultipleRoots);
        }
        Ok(self.schema.insert(schema))
    }
}

/// Builder for a positional list of schemas (`items` / `extra_items`).
#[derive(Debug, Default)]
pub struct ItemsDef {
    items: Vec<Schema>,
}

impl ItemsDef {
    pub(crate) fn finish(self) -> Vec<Schema> {
        self.items
    }
}

impl PositionalDef for ItemsDef {
    fn push_schema(&mut self, schema: Schema) -> DefinitionResult<&mut Schema> {
        let index = self.items.len();
        self.items.push(schema);
        Ok(&mut self.items[index])
    }
}
