//! Frontmatter extraction and parsing.

use serde_yaml::{Mapping, Value};

/// Open metadata mapping parsed from a document's frontmatter.
///
/// Any keys are accepted. The pipeline only interprets `title` and `order`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    fields: Mapping,
}

impl Metadata {
    /// Wrap an already-parsed YAML mapping.
    pub fn new(fields: Mapping) -> Self {
        Self { fields }
    }

    /// Look up a raw metadata value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Page title, or an empty string when absent.
    ///
    /// Scalar non-string values are stringified; sequences and mappings are ignored.
    pub fn title(&self) -> String {
        match self.get("title") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }

    /// Sort key for the index page (lower = first).
    ///
    /// Numbers are taken as-is, numeric strings are parsed, booleans count as
    /// 1 and 0. Missing or non-numeric values coerce to 0.
    pub fn order(&self) -> f64 {
        let order = match self.get("order") {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
            Some(Value::Bool(true)) => 1.0,
            _ => 0.0,
        };

        if order.is_nan() {
            0.0
        } else {
            order
        }
    }

    /// Number of metadata keys.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the document carried no metadata at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Split a document into its frontmatter metadata and the remaining body.
///
/// A document without a leading `---` block has empty metadata and the whole
/// text as its body.
pub fn split_frontmatter(source: &str) -> Result<(Metadata, &str), FrontmatterError> {
    let trimmed = source.trim_start();

    if !trimmed.starts_with("---") {
        return Ok((Metadata::default(), source));
    }

    // Find the closing ---
    let after_open = &trimmed[3..];
    let Some(close_pos) = after_open.find("\n---") else {
        return Err(FrontmatterError::Unclosed);
    };

    let yaml_content = after_open[..close_pos].trim();
    let remaining = &after_open[close_pos + 4..];

    let fields = if yaml_content.is_empty() {
        Mapping::new()
    } else {
        let value: Value = serde_yaml::from_str(yaml_content)
            .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

        match value {
            Value::Mapping(mapping) => mapping,
            Value::Null => Mapping::new(),
            _ => return Err(FrontmatterError::NotMapping),
        }
    };

    Ok((Metadata::new(fields), remaining.trim_start()))
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),

    #[error("Frontmatter must be a key/value mapping")]
    NotMapping,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_valid_frontmatter() {
        let source = r#"---
title: Statute of Roads
order: 3
author: clerk
---

[{"insert": "hi\n"}]
"#;

        let (meta, body) = split_frontmatter(source).unwrap();

        assert_eq!(meta.title(), "Statute of Roads");
        assert_eq!(meta.order(), 3.0);
        assert_eq!(meta.len(), 3);
        assert!(meta.get("author").is_some());
        assert!(body.starts_with("[{\"insert\""));
    }

    #[test]
    fn handles_no_frontmatter() {
        let source = "[{\"insert\": \"plain\\n\"}]";

        let (meta, body) = split_frontmatter(source).unwrap();

        assert!(meta.is_empty());
        assert_eq!(body, source);
    }

    #[test]
    fn handles_empty_block() {
        let (meta, body) = split_frontmatter("---\n---\n[]").unwrap();

        assert!(meta.is_empty());
        assert_eq!(body, "[]");
    }

    #[test]
    fn defaults_missing_title_and_order() {
        let (meta, _) = split_frontmatter("---\nauthor: someone\n---\n[]").unwrap();

        assert_eq!(meta.title(), "");
        assert_eq!(meta.order(), 0.0);
    }

    #[test]
    fn coerces_order_values() {
        let cases = [
            ("order: 2", 2.0),
            ("order: -1.5", -1.5),
            ("order: \"7\"", 7.0),
            ("order: \" 4 \"", 4.0),
            ("order: \"\"", 0.0),
            ("order: seven", 0.0),
            ("order: true", 1.0),
            ("order: false", 0.0),
            ("order: ~", 0.0),
            ("order: [1, 2]", 0.0),
            ("order: .nan", 0.0),
        ];

        for (yaml, expected) in cases {
            let source = format!("---\n{yaml}\n---\n[]");
            let (meta, _) = split_frontmatter(&source).unwrap();
            assert_eq!(meta.order(), expected, "for `{yaml}`");
        }
    }

    #[test]
    fn stringifies_scalar_titles() {
        let (meta, _) = split_frontmatter("---\ntitle: 1984\n---\n[]").unwrap();
        assert_eq!(meta.title(), "1984");

        let (meta, _) = split_frontmatter("---\ntitle: [a, b]\n---\n[]").unwrap();
        assert_eq!(meta.title(), "");
    }

    #[test]
    fn errors_on_unclosed_frontmatter() {
        let source = "---\ntitle: Test\n[]";

        let result = split_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::Unclosed)));
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let source = "---\ntitle: [invalid yaml\n---\n";

        let result = split_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::InvalidYaml(_))));
    }

    #[test]
    fn errors_on_non_mapping_yaml() {
        let result = split_frontmatter("---\n- just\n- a list\n---\n[]");

        assert!(matches!(result, Err(FrontmatterError::NotMapping)));
    }
}
