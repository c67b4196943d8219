//! Validation protocol shared by every schema node
//!
//! Validation runs in two phases:
//! 1. Format: shape check, recursive descent into children and
//!    construction of the sanitized value.
//! 2. Constraints: registered constraints run on the *sanitized* value.
//!
//! The sanitized value is published in the node's slot only when both
//! phases succeed. The slot is cleared at the start of every call, so a
//! failed validation never exposes a value from a previous one.
//!
//! Validation never mutates the input document, except through
//! `validate_in_place`, which overwrites it only once the whole validation
//! succeeded.

use super::errors::ValidationResult;
use super::options::Options;
use crate::document::Document;

/// A unit of the schema tree able to validate and sanitize one position of
/// a document.
///
/// Validation takes `&mut self` because it writes the sanitized slot:
/// concurrent validations must use independent schema instances.
pub trait SchemaNode {
    /// Effective options (caller-supplied merged over kind defaults)
    fn options(&self) -> &Options;

    /// Defaults of this schema kind
    fn default_options(&self) -> Options;

    /// Checks the document shape and builds the sanitized value.
    fn validate_format(&mut self, doc: &Document) -> ValidationResult<Document>;

    /// Runs the node's constraints on an already sanitized value.
    fn validate_constraints(&self, value: &Document) -> ValidationResult<()>;

    fn sanitized_slot(&self) -> &Option<Document>;

    fn sanitized_slot_mut(&mut self) -> &mut Option<Document>;

    /// Validates `doc` and returns the sanitized value.
    fn validate(&mut self, doc: &Document) -> ValidationResult<&Document> {
        *self.sanitized_slot_mut() = None;
        let sanitized = self.validate_format(doc)?;
        self.validate_constraints(&sanitized)?;
        Ok(self.sanitized_slot_mut().insert(sanitized))
    }

    /// Non-raising form of `validate`.
    fn is_valid(&mut self, doc: &Document) -> bool {
        match self.validate(doc) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(path = %e.path_string(), error = %e.kind(), "document rejected");
                false
            }
        }
    }

    /// Validates `doc`, then replaces its content with the sanitized value.
    ///
    /// On failure `doc` is left untouched.
    fn validate_in_place(&mut self, doc: &mut Document) -> ValidationResult<()> {
        let sanitized = self.validate(doc)?.clone();
        *doc = sanitized;
        Ok(())
    }

    /// Sanitized value of the last successful validation
    fn sanitized_doc(&self) -> Option<&Document> {
        self.sanitized_slot().as_ref()
    }

    /// Options that differ from this kind's defaults
    fn non_default_options(&self) -> Options {
        self.options().non_default(&self.default_options())
    }
}
