//! Schema dumpers
//!
//! Dumpers are read-only visitors rendering a finished schema tree into a
//! third-party interchange format. They only use the traversal surface of
//! `Schema` (kind tag, non-default options, documentation, children).

mod org3;

pub use org3::Org3Dumper;
