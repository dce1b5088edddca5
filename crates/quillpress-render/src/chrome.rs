//! Headless Chrome rendering engine.
//!
//! One browser process serves a whole build; every document gets its own tab.
//! The Quill runtime is evaluated inside the tab and a read-only editor renders
//! the delta, whose DOM is then read back as HTML.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use quillpress_doc::Delta;
use serde::Deserialize;

use crate::engine::{wrap_editor_markup, EngineAssets, EngineError, RenderEngine};

/// Options for launching the browser.
#[derive(Debug, Clone)]
pub struct ChromeOptions {
    /// Run Chrome with its sandbox (disable inside containers)
    pub sandbox: bool,

    /// How long an idle browser connection is kept alive
    pub idle_timeout: Duration,

    /// Default timeout for individual DevTools calls within a tab
    pub call_timeout: Duration,
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self {
            sandbox: false,
            idle_timeout: Duration::from_secs(300),
            call_timeout: Duration::from_secs(30),
        }
    }
}

/// A browser tab holding one Quill editor.
pub struct ChromeContext {
    tab: Arc<Tab>,
    prepared: bool,
}

/// Rendering engine backed by headless Chrome.
pub struct ChromeEngine {
    browser: Arc<Browser>,
    assets: Arc<EngineAssets>,
    options: ChromeOptions,
}

impl ChromeEngine {
    /// Launch a browser process.
    ///
    /// Failure here means no document can be rendered, so callers treat it as fatal.
    pub async fn launch(options: ChromeOptions, assets: EngineAssets) -> Result<Self, EngineError> {
        let launch = options.clone();
        let browser = blocking(move || {
            Browser::new(LaunchOptions {
                sandbox: launch.sandbox,
                idle_browser_timeout: launch.idle_timeout,
                ..Default::default()
            })
            .map_err(|e| EngineError::Unavailable(format!("failed to launch Chrome: {e}")))
        })
        .await?;

        tracing::debug!("Launched headless Chrome");

        Ok(Self {
            browser: Arc::new(browser),
            assets: Arc::new(assets),
            options,
        })
    }
}

#[async_trait]
impl RenderEngine for ChromeEngine {
    type Context = ChromeContext;

    fn name(&self) -> &'static str {
        "chrome"
    }

    async fn acquire(&self) -> Result<ChromeContext, EngineError> {
        let browser = Arc::clone(&self.browser);
        let call_timeout = self.options.call_timeout;

        let tab = blocking(move || {
            let tab = browser
                .new_tab()
                .map_err(|e| EngineError::Unavailable(format!("failed to open tab: {e}")))?;
            tab.set_default_timeout(call_timeout);
            Ok(tab)
        })
        .await?;

        Ok(ChromeContext {
            tab,
            prepared: false,
        })
    }

    async fn prepare(&self, context: &mut ChromeContext) -> Result<(), EngineError> {
        if context.prepared {
            return Ok(());
        }

        let tab = Arc::clone(&context.tab);
        let assets = Arc::clone(&self.assets);

        blocking(move || {
            tab.evaluate(&assets.script, false).map_err(|e| {
                EngineError::Unavailable(format!("failed to load Quill runtime: {e}"))
            })?;

            let result = tab
                .evaluate(&setup_expression(&assets.stylesheet), false)
                .map_err(|e| EngineError::Unavailable(format!("failed to create editor: {e}")))?;

            match read_outcome(result.value)? {
                Outcome { error: Some(message), .. } => Err(EngineError::Unavailable(message)),
                _ => Ok(()),
            }
        })
        .await?;

        context.prepared = true;
        Ok(())
    }

    async fn render(&self, context: &ChromeContext, delta: &Delta) -> Result<String, EngineError> {
        if !context.prepared {
            return Err(EngineError::Unavailable(
                "rendering context was not prepared".to_string(),
            ));
        }

        let tab = Arc::clone(&context.tab);
        let expression = render_expression(delta);

        let value = blocking(move || {
            tab.evaluate(&expression, false)
                .map(|result| result.value)
                .map_err(|e| EngineError::Rejected(e.to_string()))
        })
        .await?;

        match read_outcome(value)? {
            Outcome {
                error: Some(message),
                ..
            } => Err(EngineError::Rejected(message)),
            Outcome {
                html: Some(html), ..
            } => Ok(wrap_editor_markup(&html)),
            _ => Err(EngineError::NoContainer),
        }
    }

    async fn release(&self, context: ChromeContext) -> Result<(), EngineError> {
        let tab = context.tab;

        blocking(move || {
            tab.close(true)
                .map(|_| ())
                .map_err(|e| EngineError::Release(e.to_string()))
        })
        .await
    }
}

/// Result object every in-page script reports back as a JSON string.
#[derive(Debug, Default, Deserialize, PartialEq)]
struct Outcome {
    #[serde(default)]
    html: Option<String>,

    #[serde(default)]
    error: Option<String>,
}

fn read_outcome(value: Option<serde_json::Value>) -> Result<Outcome, EngineError> {
    match value {
        Some(serde_json::Value::String(json)) => serde_json::from_str(&json)
            .map_err(|e| EngineError::Rejected(format!("unreadable engine response: {e}"))),
        _ => Err(EngineError::Rejected(
            "engine returned no response".to_string(),
        )),
    }
}

/// Script that injects the stylesheet and mounts a read-only snow editor on `#editor`.
fn setup_expression(stylesheet: &str) -> String {
    let css = serde_json::to_string(stylesheet).unwrap_or_else(|_| "\"\"".to_string());

    format!(
        r#"(function () {{
    try {{
        if (typeof Quill === "undefined") {{
            return JSON.stringify({{ error: "Quill runtime did not load" }});
        }}
        const style = document.createElement("style");
        style.textContent = {css};
        document.head.appendChild(style);

        const container = document.createElement("div");
        container.id = "editor";
        document.body.appendChild(container);

        window.quillEditor = new Quill(container, {{ readOnly: true, theme: "snow" }});
        return JSON.stringify({{}});
    }} catch (e) {{
        return JSON.stringify({{ error: String(e) }});
    }}
}})()"#
    )
}

/// Script that imports `delta` and returns the editor root's inner HTML.
fn render_expression(delta: &Delta) -> String {
    format!(
        r#"(function () {{
    try {{
        window.quillEditor.setContents({ops});
        const root = window.quillEditor.container.children[0];
        return JSON.stringify(root ? {{ html: root.innerHTML }} : {{}});
    }} catch (e) {{
        return JSON.stringify({{ error: String(e) }});
    }}
}})()"#,
        ops = delta.to_json()
    )
}

async fn blocking<T, F>(task: F) -> Result<T, EngineError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, EngineError> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| EngineError::Unavailable(format!("engine task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use quillpress_doc::Op;
    use serde_json::Value;

    #[test]
    fn render_expression_embeds_canonical_delta() {
        let delta = Delta::from_ops(vec![Op::text("hi\n")]);

        let script = render_expression(&delta);

        assert!(script.contains(r#"setContents([{"insert":"hi\n"}])"#));
        assert!(script.contains("container.children[0]"));
    }

    #[test]
    fn setup_expression_escapes_stylesheet() {
        let script = setup_expression(".ql-editor { content: \"</style>\"; }\n");

        assert!(script.contains(r#"style.textContent = ".ql-editor { content: \"</style>\"; }\n";"#));
        assert!(script.contains(r#"readOnly: true, theme: "snow""#));
    }

    #[test]
    fn reads_successful_outcome() {
        let value = Some(Value::String(r#"{"html":"<p>hi</p>"}"#.to_string()));

        let outcome = read_outcome(value).unwrap();

        assert_eq!(outcome.html.as_deref(), Some("<p>hi</p>"));
        assert_eq!(outcome.error, None);
    }

    #[test]
    fn reads_error_outcome() {
        let value = Some(Value::String(r#"{"error":"TypeError: bad op"}"#.to_string()));

        let outcome = read_outcome(value).unwrap();

        assert_eq!(outcome.error.as_deref(), Some("TypeError: bad op"));
    }

    #[test]
    fn rejects_missing_response() {
        assert!(matches!(read_outcome(None), Err(EngineError::Rejected(_))));
        assert!(matches!(
            read_outcome(Some(Value::Null)),
            Err(EngineError::Rejected(_))
        ));
        assert!(matches!(
            read_outcome(Some(Value::String("not json".into()))),
            Err(EngineError::Rejected(_))
        ));
    }
}
