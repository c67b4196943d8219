//! Schema error types
//!
//! Two families of failures exist:
//! - `DefinitionError`: a schema was built in a structurally illegal way.
//!   Raised while the schema tree is constructed, never during validation.
//! - `ValidationError`: a document does not conform. Carries the kind of
//!   failure and the path (keys and indexes) from the root to the offending
//!   position, accumulated while the error unwinds.
//!
//! Error codes:
//! - SCHEMA_TYPE_MISMATCH
//! - SCHEMA_FORMAT_ERROR
//! - SCHEMA_CONSTRAINT_VIOLATION
//! - SCHEMA_SIZE_MISMATCH
//! - SCHEMA_MISSING_KEY
//! - SCHEMA_UNKNOWN_KEY

use std::fmt;

use thiserror::Error;

use crate::document::Document;

/// One step of the path from the document root to a failing position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object key
    Key(String),
    /// Array index
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, ".{}", key),
            PathSegment::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// What went wrong while validating a document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationErrorKind {
    /// Runtime shape differs from the schema kind
    #[error("expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Right shape, but the value does not parse into its canonical form
    #[error("invalid {format}: {reason}")]
    Format { format: String, reason: String },

    /// Canonical value fails a registered constraint
    #[error("constraint '{constraint}' violated: {message}")]
    ConstraintViolation { constraint: String, message: String },

    /// Array shorter than its positional items
    #[error("expected at least {expected} items, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Required named property absent
    #[error("missing required key '{0}'")]
    MissingKey(String),

    /// Key matched by nothing under strict mode
    #[error("unexpected key '{0}'")]
    UnknownKey(String),
}

impl ValidationErrorKind {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationErrorKind::TypeMismatch { .. } => "SCHEMA_TYPE_MISMATCH",
            ValidationErrorKind::Format { .. } => "SCHEMA_FORMAT_ERROR",
            ValidationErrorKind::ConstraintViolation { .. } => "SCHEMA_CONSTRAINT_VIOLATION",
            ValidationErrorKind::SizeMismatch { .. } => "SCHEMA_SIZE_MISMATCH",
            ValidationErrorKind::MissingKey(_) => "SCHEMA_MISSING_KEY",
            ValidationErrorKind::UnknownKey(_) => "SCHEMA_UNKNOWN_KEY",
        }
    }
}

/// Validation failure with its location in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    kind: ValidationErrorKind,
    /// Root-first path to the failing position
    path: Vec<PathSegment>,
}

impl ValidationError {
    /// Create an error located at the current position
    pub fn new(kind: ValidationErrorKind) -> Self {
        Self {
            kind,
            path: Vec::new(),
        }
    }

    /// Create a type mismatch error for the given document
    pub fn type_mismatch(expected: impl Into<String>, actual: &Document) -> Self {
        Self::new(ValidationErrorKind::TypeMismatch {
            expected: expected.into(),
            actual: actual.type_name().to_string(),
        })
    }

    /// Create a format error
    pub fn format(format: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::Format {
            format: format.into(),
            reason: reason.into(),
        })
    }

    /// Create a constraint violation error
    pub fn constraint(constraint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::ConstraintViolation {
            constraint: constraint.into(),
            message: message.into(),
        })
    }

    /// Create a size mismatch error
    pub fn size_mismatch(expected: usize, actual: usize) -> Self {
        Self::new(ValidationErrorKind::SizeMismatch { expected, actual })
    }

    /// Create a missing key error
    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::MissingKey(key.into()))
    }

    /// Create an unknown key error
    pub fn unknown_key(key: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::UnknownKey(key.into()))
    }

    /// Prefixes the path with an object key.
    pub fn at_key(mut self, key: impl Into<String>) -> Self {
        self.path.insert(0, PathSegment::Key(key.into()));
        self
    }

    /// Prefixes the path with an array index.
    pub fn at_index(mut self, index: usize) -> Self {
        self.path.insert(0, PathSegment::Index(index));
        self
    }

    /// Returns the failure kind
    pub fn kind(&self) -> &ValidationErrorKind {
        &self.kind
    }

    /// Returns the error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Returns the path segments, root first
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// Renders the path, e.g. `root.items[2].price`
    pub fn path_string(&self) -> String {
        let mut out = String::from("root");
        for segment in &self.path {
            out.push_str(&segment.to_string());
        }
        out
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.path_string(), self.kind, self.kind.code())
    }
}

impl std::error::Error for ValidationError {}

/// Schema built in a structurally illegal way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("cannot mix a homogeneous item schema with items/extra_items")]
    MixedItemModes,

    #[error("homogeneous item schema already defined")]
    DuplicateItem,

    #[error("property '{0}' already defined")]
    DuplicateProperty(String),

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("definition block produced no schema")]
    EmptyDefinition,

    #[error("definition block accepts exactly one schema statement")]
    MultipleRoots,

    #[error("unknown composite schema '{0}'")]
    UnknownComposite(String),

    #[error("composite schema '{0}' is already registered")]
    CompositeAlreadyRegistered(String),
}

/// Any error raised by the schema engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("schema definition error: {0}")]
    Definition(#[from] DefinitionError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type for validation
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for schema construction
pub type DefinitionResult<T> = Result<T, DefinitionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ValidationError::missing_key("a").code(),
            "SCHEMA_MISSING_KEY"
        );
        assert_eq!(
            ValidationError::unknown_key("a").code(),
            "SCHEMA_UNKNOWN_KEY"
        );
        assert_eq!(
            ValidationError::size_mismatch(2, 1).code(),
            "SCHEMA_SIZE_MISMATCH"
        );
        assert_eq!(
            ValidationError::type_mismatch("array", &Document::Null).code(),
            "SCHEMA_TYPE_MISMATCH"
        );
    }

    #[test]
    fn test_path_accumulates_while_unwinding() {
        let err = ValidationError::constraint("greater_than", "0 is not greater than 0")
            .at_key("price")
            .at_index(2)
            .at_key("items");

        assert_eq!(err.path_string(), "root.items[2].price");
        let display = format!("{}", err);
        assert!(display.starts_with("root.items[2].price: "));
        assert!(display.contains("greater_than"));
    }

    #[test]
    fn test_root_path() {
        let err = ValidationError::type_mismatch("object", &Document::Integer(1));
        assert_eq!(err.path_string(), "root");
        assert!(err.path().is_empty());
        assert!(format!("{}", err).contains("expected object, got integer"));
    }

    #[test]
    fn test_umbrella_error_wraps_both_families() {
        let err: Error = DefinitionError::MixedItemModes.into();
        assert!(matches!(err, Error::Definition(DefinitionError::MixedItemModes)));

        let err: Error = ValidationError::missing_key("id").into();
        assert!(format!("{}", err).contains("missing required key 'id'"));
    }
}
