//! Quill delta model.
//!
//! A document body is an ordered list of insert operations. Formatting is
//! carried in each op's attribute map and is interpreted by the rendering
//! engine, never here.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Content payload of an insert operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Insert {
    /// A run of text, newlines included.
    Text(String),
    /// An embedded object such as `{"image": "..."}`.
    Embed(Map<String, Value>),
}

/// A single insert operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Op {
    pub insert: Insert,

    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_sorted"
    )]
    pub attributes: Option<Map<String, Value>>,
}

impl Op {
    /// Plain text insert with no formatting.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            insert: Insert::Text(text.into()),
            attributes: None,
        }
    }
}

/// A validated document delta.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Delta {
    pub ops: Vec<Op>,
}

/// Errors produced while validating a delta body.
#[derive(Debug, thiserror::Error)]
pub enum DeltaError {
    #[error("Body is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Body must be an array of operations or an object with an `ops` array")]
    InvalidShape,

    #[error("Operation {index}: {message}")]
    InvalidOp { index: usize, message: String },
}

impl Delta {
    /// Build a delta from already-validated operations.
    pub fn from_ops(ops: Vec<Op>) -> Self {
        Self { ops }
    }

    /// Parse and validate a delta body.
    ///
    /// Accepts both `[{"insert": ...}]` and `{"ops": [...]}`. Document deltas
    /// may only contain inserts.
    pub fn parse(body: &str) -> Result<Self, DeltaError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| DeltaError::InvalidJson(e.to_string()))?;

        let raw_ops = match value {
            Value::Array(ops) => ops,
            Value::Object(mut obj) => match obj.remove("ops") {
                Some(Value::Array(ops)) => ops,
                _ => return Err(DeltaError::InvalidShape),
            },
            _ => return Err(DeltaError::InvalidShape),
        };

        let ops = raw_ops
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                parse_op(raw).map_err(|message| DeltaError::InvalidOp { index, message })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { ops })
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the delta has no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Concatenated text of all text inserts. Embeds are skipped.
    pub fn plain_text(&self) -> String {
        self.ops
            .iter()
            .filter_map(|op| match &op.insert {
                Insert::Text(text) => Some(text.as_str()),
                Insert::Embed(_) => None,
            })
            .collect()
    }

    /// Canonical JSON form (bare op array) handed to the rendering engine.
    ///
    /// Attribute keys serialize in sorted order, so equal deltas produce equal strings.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.ops).unwrap_or_else(|_| "[]".to_string())
    }
}

fn serialize_sorted<S: Serializer>(
    attributes: &Option<Map<String, Value>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match attributes {
        Some(attrs) => attrs.iter().collect::<BTreeMap<_, _>>().serialize(serializer),
        None => serializer.serialize_none(),
    }
}

fn parse_op(raw: Value) -> Result<Op, String> {
    let Value::Object(mut obj) = raw else {
        return Err("expected an object".to_string());
    };

    for key in ["retain", "delete"] {
        if obj.contains_key(key) {
            return Err(format!("`{key}` is not allowed in a document delta"));
        }
    }

    let insert = match obj.remove("insert") {
        Some(Value::String(text)) => Insert::Text(text),
        Some(Value::Object(embed)) if embed.len() == 1 => Insert::Embed(embed),
        Some(Value::Object(_)) => return Err("embed must have exactly one key".to_string()),
        Some(_) => return Err("`insert` must be a string or an embed object".to_string()),
        None => return Err("missing `insert`".to_string()),
    };

    let attributes = match obj.remove("attributes") {
        None | Some(Value::Null) => None,
        Some(Value::Object(attrs)) => Some(attrs),
        Some(_) => return Err("`attributes` must be an object".to_string()),
    };

    if let Some(key) = obj.keys().next() {
        return Err(format!("unknown field `{key}`"));
    }

    Ok(Op { insert, attributes })
}
