//! Quill document parser with frontmatter and delta validation.
//!
//! This crate splits `.quill` source files into YAML frontmatter and a Quill
//! delta body, validating that the body is a well-formed document delta.

pub mod delta;
pub mod document;
pub mod frontmatter;

pub use delta::{Delta, DeltaError, Insert, Op};
pub use document::{parse_document, parse_document_bytes, ParseError, ParsedDocument};
pub use frontmatter::{split_frontmatter, FrontmatterError, Metadata};
