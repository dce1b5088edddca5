//! Trait definitions for rendering engines.

use std::time::Duration;

use async_trait::async_trait;
use quillpress_doc::Delta;

/// Runtime files an engine loads into every rendering context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineAssets {
    /// Quill runtime (`quill.min.js`)
    pub script: String,

    /// Quill theme stylesheet (`quill.snow.css`)
    pub stylesheet: String,
}

/// Errors that can occur while rendering a delta.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("Rendering engine unavailable: {0}")]
    Unavailable(String),

    #[error("Engine rejected the delta: {0}")]
    Rejected(String),

    #[error("Rendered output has no editor container")]
    NoContainer,

    #[error("Render timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to release rendering context: {0}")]
    Release(String),
}

/// Wrap extracted editor markup in the Quill container classes the stylesheet targets.
pub fn wrap_editor_markup(inner_html: &str) -> String {
    format!(r#"<div class="ql-container ql-snow"><div class="ql-editor">{inner_html}</div></div>"#)
}

/// Capability interface over an external rich-text rendering host.
///
/// Every document gets its own context: `acquire`, `prepare` once, `render`,
/// then `release`. `release` takes the context by value so it cannot run twice.
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// One isolated rendering context (a browser tab, a session, ...).
    type Context: Send + Sync;

    /// Engine identifier for logs (e.g., "chrome")
    fn name(&self) -> &'static str;

    /// Create a fresh, isolated rendering context.
    async fn acquire(&self) -> Result<Self::Context, EngineError>;

    /// Load the editor runtime and stylesheet and create a read-only editor.
    ///
    /// Calling this again on an already prepared context does nothing.
    async fn prepare(&self, context: &mut Self::Context) -> Result<(), EngineError>;

    /// Import `delta` into the context's editor and return the rendered markup.
    async fn render(&self, context: &Self::Context, delta: &Delta) -> Result<String, EngineError>;

    /// Tear the context down.
    async fn release(&self, context: Self::Context) -> Result<(), EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_markup_in_quill_container() {
        assert_eq!(
            wrap_editor_markup("<p>hi</p>"),
            r#"<div class="ql-container ql-snow"><div class="ql-editor"><p>hi</p></div></div>"#
        );
    }
}
