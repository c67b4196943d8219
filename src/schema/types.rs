//! Schema tree definitions
//!
//! A schema tree is made of four node kinds:
//! - leaf: a scalar value (integer, string, date-time, ...)
//! - array: an ordered sequence, matched homogeneously or positionally
//! - object: a string-keyed map with named, pattern and extra properties
//! - composite: a named reusable schema instantiated by value

use super::array::ArraySchema;
use super::builder::SchemaDef;
use super::composite::CompositeSchema;
use super::errors::{DefinitionError, DefinitionResult, ValidationResult};
use super::leaf::{LeafKind, LeafSchema};
use super::object::ObjectSchema;
use super::options::{Options, DOC};
use super::validator::SchemaNode;
use crate::document::Document;

macro_rules! each_node {
    ($schema:expr, $node:ident => $body:expr) => {
        match $schema {
            Schema::Leaf($node) => $body,
            Schema::Array($node) => $body,
            Schema::Object($node) => $body,
            Schema::Composite($node) => $body,
        }
    };
}

/// Any node of a schema tree.
#[derive(Debug, Clone)]
pub enum Schema {
    Leaf(LeafSchema),
    Array(ArraySchema),
    Object(ObjectSchema),
    Composite(CompositeSchema),
}

impl Schema {
    /// Builds a root schema of any kind from a definition block.
    ///
    /// The block must issue exactly one schema statement and may attach
    /// documentation with `doc`.
    pub fn define<F>(f: F) -> DefinitionResult<Schema>
    where
        F: FnOnce(&mut SchemaDef) -> DefinitionResult<()>,
    {
        let mut def = SchemaDef::default();
        f(&mut def)?;
        let (schema, doc) = def.finish();
        let mut schema = schema.ok_or(DefinitionError::EmptyDefinition)?;
        if let Some(doc) = doc {
            schema.options_mut().insert(DOC, doc);
        }
        Ok(schema)
    }

    /// Create a leaf schema of the given kind
    pub fn leaf(kind: LeafKind, options: Options) -> Schema {
        Schema::Leaf(LeafSchema::new(kind, options))
    }

    pub fn any(options: Options) -> Schema {
        Schema::leaf(LeafKind::Any, options)
    }

    pub fn null(options: Options) -> Schema {
        Schema::leaf(LeafKind::Null, options)
    }

    pub fn boolean(options: Options) -> Schema {
        Schema::leaf(LeafKind::Boolean, options)
    }

    pub fn integer(options: Options) -> Schema {
        Schema::leaf(LeafKind::Integer, options)
    }

    pub fn float(options: Options) -> Schema {
        Schema::leaf(LeafKind::Float, options)
    }

    pub fn numeric(options: Options) -> Schema {
        Schema::leaf(LeafKind::Numeric, options)
    }

    pub fn string(options: Options) -> Schema {
        Schema::leaf(LeafKind::String, options)
    }

    pub fn datetime(options: Options) -> Schema {
        Schema::leaf(LeafKind::Datetime, options)
    }

    pub fn ip_addr(options: Options) -> Schema {
        Schema::leaf(LeafKind::IpAddr, options)
    }

    pub fn ipv4_addr(options: Options) -> Schema {
        Schema::leaf(LeafKind::Ipv4Addr, options)
    }

    pub fn ipv6_addr(options: Options) -> Schema {
        Schema::leaf(LeafKind::Ipv6Addr, options)
    }

    pub fn uri(options: Options) -> Schema {
        Schema::leaf(LeafKind::Uri, options)
    }

    pub fn email(options: Options) -> Schema {
        Schema::leaf(LeafKind::Email, options)
    }

    pub fn hostname(options: Options) -> Schema {
        Schema::leaf(LeafKind::Hostname, options)
    }

    pub fn phone_number(options: Options) -> Schema {
        Schema::leaf(LeafKind::PhoneNumber, options)
    }

    pub fn regexp(options: Options) -> Schema {
        Schema::leaf(LeafKind::Regexp, options)
    }

    /// Returns the kind tag (`array`, `object`, `composite` or the leaf type)
    pub fn kind_tag(&self) -> &'static str {
        match self {
            Schema::Leaf(leaf) => leaf.kind().type_name(),
            Schema::Array(_) => "array",
            Schema::Object(_) => "object",
            Schema::Composite(_) => "composite",
        }
    }

    /// Parsed `doc` option
    pub fn documentation(&self) -> Option<Documentation> {
        self.options().doc().map(Documentation::parse)
    }

    /// Mutable access to the options, for further configuration.
    pub fn options_mut(&mut self) -> &mut Options {
        each_node!(self, node => node.options_mut())
    }

    /// Clears the sanitized result of this node and all its descendants.
    pub fn reset(&mut self) {
        each_node!(self, node => node.reset())
    }

    pub fn as_leaf(&self) -> Option<&LeafSchema> {
        match self {
            Schema::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArraySchema> {
        match self {
            Schema::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match self {
            Schema::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeSchema> {
        match self {
            Schema::Composite(composite) => Some(composite),
            _ => None,
        }
    }
}

impl SchemaNode for Schema {
    fn options(&self) -> &Options {
        each_node!(self, node => node.options())
    }

    fn default_options(&self) -> Options {
        each_node!(self, node => node.default_options())
    }

    fn validate_format(&mut self, doc: &Document) -> ValidationResult<Document> {
        each_node!(self, node => node.validate_format(doc))
    }

    fn validate_constraints(&self, value: &Document) -> ValidationResult<()> {
        each_node!(self, node => node.validate_constraints(value))
    }

    fn sanitized_slot(&self) -> &Option<Document> {
        each_node!(self, node => node.sanitized_slot())
    }

    fn sanitized_slot_mut(&mut self) -> &mut Option<Document> {
        each_node!(self, node => node.sanitized_slot_mut())
    }
}

impl From<LeafSchema> for Schema {
    fn from(schema: LeafSchema) -> Self {
        Schema::Leaf(schema)
    }
}

impl From<ArraySchema> for Schema {
    fn from(schema: ArraySchema) -> Self {
        Schema::Array(schema)
    }
}

impl From<ObjectSchema> for Schema {
    fn from(schema: ObjectSchema) -> Self {
        Schema::Object(schema)
    }
}

impl From<CompositeSchema> for Schema {
    fn from(schema: CompositeSchema) -> Self {
        Schema::Composite(schema)
    }
}

/// Title and description extracted from a `doc` option.
///
/// Text before the first blank line is the title and text after it the
/// description. A single line is a title; several lines without a blank
/// line are a description.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Documentation {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl Documentation {
    pub fn parse(text: &str) -> Self {
        if let Some((title, description)) = text.split_once("\n\n") {
            return Self {
                title: non_empty(title.trim()),
                description: non_empty(description.trim()),
            };
        }
        if text.contains('\n') {
            Self {
                title: None,
                description: non_empty(text),
            }
        } else {
            Self {
                title: non_empty(text.trim()),
                description: None,
            }
        }
    }
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
