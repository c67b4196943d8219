//! docschema - declarative schema definition, document validation and
//! sanitization
//!
//! Schemas are built from definition blocks, validate arbitrary nested
//! documents and produce a sanitized copy holding canonical values.
//!
//! ```
//! use docschema::prelude::*;
//! use serde_json::json;
//!
//! let mut schema = ArraySchema::define(Options::new(), |s| {
//!     s.integer(Options::new().with("greater_than", 0))?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! let sanitized = schema.validate(&json!(["42", 51]).into()).unwrap();
//! assert_eq!(sanitized, &Document::from(json!([42, 51])));
//! ```

pub mod document;
pub mod dump;
pub mod schema;

pub use document::Document;
pub use dump::Org3Dumper;
pub use schema::{DefinitionError, Error, Schema, SchemaNode, ValidationError};

/// Names needed to define schemas and validate documents
pub mod prelude {
    pub use crate::document::Document;
    pub use crate::schema::{
        ArrayDef, ArraySchema, CompositeRegistry, DefinitionError, DefinitionResult, ItemsDef,
        LeafKind, ObjectDef, ObjectSchema, Options, PositionalDef, Schema, SchemaDef, SchemaNode,
        ValidationError, ValidationResult,
    };
}
