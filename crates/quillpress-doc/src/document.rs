//! Quill document parser.

use crate::delta::{Delta, DeltaError};
use crate::frontmatter::{split_frontmatter, FrontmatterError, Metadata};

/// A parsed `.quill` document: frontmatter metadata plus its delta body.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    /// Frontmatter metadata (empty if the file had none)
    pub metadata: Metadata,

    /// Validated delta body
    pub delta: Delta,
}

/// Errors that can occur when parsing a document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),

    #[error("Delta error: {0}")]
    Delta(#[from] DeltaError),
}

/// Parse a document.
///
/// Splits off the frontmatter, then validates the remaining body as a delta.
pub fn parse_document(source: &str) -> Result<ParsedDocument, ParseError> {
    let (metadata, body) = split_frontmatter(source)?;
    let delta = Delta::parse(body)?;

    Ok(ParsedDocument { metadata, delta })
}

/// Parse a document straight from the bytes read off disk.
pub fn parse_document_bytes(source: &[u8]) -> Result<ParsedDocument, ParseError> {
    parse_document(std::str::from_utf8(source)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_complete_document() {
        let source = r#"---
title: A
order: 2
---
[{"insert": "hi\n"}]
"#;

        let doc = parse_document(source).unwrap();

        assert_eq!(doc.metadata.title(), "A");
        assert_eq!(doc.metadata.order(), 2.0);
        assert_eq!(doc.delta.plain_text(), "hi\n");
    }

    #[test]
    fn parses_document_without_frontmatter() {
        let doc = parse_document(r#"{"ops": [{"insert": "yo\n"}]}"#).unwrap();

        assert!(doc.metadata.is_empty());
        assert_eq!(doc.delta.len(), 1);
    }

    #[test]
    fn reports_body_errors() {
        let result = parse_document("---\ntitle: Broken\n---\n{not json");

        assert!(matches!(result, Err(ParseError::Delta(DeltaError::InvalidJson(_)))));
    }

    #[test]
    fn reports_frontmatter_errors() {
        let result = parse_document("---\ntitle: Broken\n[]");

        assert!(matches!(
            result,
            Err(ParseError::Frontmatter(FrontmatterError::Unclosed))
        ));
    }

    #[test]
    fn empty_body_is_an_error() {
        assert!(parse_document("---\ntitle: Empty\n---\n").is_err());
    }

    #[test]
    fn rejects_invalid_utf8() {
        let result = parse_document_bytes(b"---\ntitle: \xff\n---\n[]");

        assert!(matches!(result, Err(ParseError::Encoding(_))));
    }

    #[test]
    fn parses_utf8_bytes() {
        let doc = parse_document_bytes("---\ntitle: Été\n---\n[]".as_bytes()).unwrap();

        assert_eq!(doc.metadata.title(), "Été");
        assert!(doc.delta.is_empty());
    }
}
