//! Schema definition and document validation
//!
//! A schema is a tree of nodes built once through definition blocks and then
//! used to validate documents. Validation checks conformance and produces a
//! sanitized mirror of the document in which every validated position holds
//! its canonical value.
//!
//! # Design Principles
//!
//! - Two phases per node: format (shape + sanitization), then constraints on
//!   the sanitized value
//! - Fail fast: the first error aborts the whole call
//! - Errors carry the key/index path of the offending position
//! - The input document is never mutated, except by `validate_in_place`
//! - Positions outside the schema's authority are copied through unchanged

mod array;
mod builder;
pub mod constraints;
mod composite;
mod errors;
pub mod formats;
mod leaf;
mod object;
pub mod options;
mod types;
mod validator;

pub use array::{ArrayDef, ArrayMode, ArraySchema};
pub use builder::{ItemsDef, PositionalDef, SchemaDef};
pub use composite::{CompositeRegistry, CompositeSchema, Sanitizer};
pub use constraints::ConstraintValidator;
pub use errors::{
    DefinitionError, DefinitionResult, Error, PathSegment, ValidationError, ValidationErrorKind,
    ValidationResult,
};
pub use formats::{FormatValidator, PatternFormat};
pub use leaf::{LeafKind, LeafSchema};
pub use object::{ObjectDef, ObjectSchema, PropertyKey};
pub use options::Options;
pub use types::{Documentation, Schema};
pub use validator::SchemaNode;
