//! Headless Chrome engine tests against a stub Quill runtime.
//!
//! These launch a real browser, so they are ignored by default.
//!
//! Run with: `cargo test -p quillpress-render --test chrome_engine -- --ignored`

use std::sync::Arc;
use std::time::Duration;

use quillpress_doc::Delta;
use quillpress_render::{
    ChromeEngine, ChromeOptions, EngineAssets, EngineError, RenderEngine, RenderJob,
    RenderOrchestrator,
};

/// Minimal stand-in for Quill: one `<p>` per line, `bold` becomes `<strong>`.
const STUB_QUILL: &str = r#"
window.Quill = class {
    constructor(container, options) {
        this.container = container;
        this.options = options;
        const root = document.createElement("div");
        root.className = "ql-editor";
        container.appendChild(root);
    }
    setContents(delta) {
        const ops = Array.isArray(delta) ? delta : delta.ops;
        const root = this.container.children[0];
        root.innerHTML = "";
        let line = document.createElement("p");
        for (const op of ops) {
            if (typeof op.insert !== "string") {
                throw new Error("embeds are not supported");
            }
            const parts = op.insert.split("\n");
            parts.forEach((part, i) => {
                if (i > 0) {
                    root.appendChild(line);
                    line = document.createElement("p");
                }
                if (part.length === 0) return;
                const text = document.createTextNode(part);
                if (op.attributes && op.attributes.bold) {
                    const strong = document.createElement("strong");
                    strong.appendChild(text);
                    line.appendChild(strong);
                } else {
                    line.appendChild(text);
                }
            });
        }
    }
};
"#;

async fn engine() -> ChromeEngine {
    ChromeEngine::launch(
        ChromeOptions::default(),
        EngineAssets {
            script: STUB_QUILL.to_string(),
            stylesheet: ".ql-editor { padding: 0; }".to_string(),
        },
    )
    .await
    .expect("failed to launch Chrome")
}

#[tokio::test]
#[ignore]
async fn renders_delta_through_browser() {
    let engine = engine().await;
    let delta =
        Delta::parse(r#"[{"insert": "Hello "}, {"insert": "world", "attributes": {"bold": true}}, {"insert": "\n"}]"#)
            .unwrap();

    let mut context = engine.acquire().await.unwrap();
    engine.prepare(&mut context).await.unwrap();
    // Second prepare must not mount a second editor.
    engine.prepare(&mut context).await.unwrap();
    let html = engine.render(&context, &delta).await.unwrap();
    engine.release(context).await.unwrap();

    assert_eq!(
        html,
        r#"<div class="ql-container ql-snow"><div class="ql-editor"><p>Hello <strong>world</strong></p></div></div>"#
    );
}

#[tokio::test]
#[ignore]
async fn engine_errors_are_rejections() {
    let engine = engine().await;
    let delta = Delta::parse(r#"[{"insert": {"image": "seal.png"}}]"#).unwrap();

    let mut context = engine.acquire().await.unwrap();
    engine.prepare(&mut context).await.unwrap();
    let result = engine.render(&context, &delta).await;
    engine.release(context).await.unwrap();

    assert!(matches!(result, Err(EngineError::Rejected(message)) if message.contains("embeds")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[ignore]
async fn contexts_are_isolated() {
    let engine = Arc::new(engine().await);
    let orchestrator = RenderOrchestrator::new(engine)
        .with_concurrency(2)
        .with_timeout(Some(Duration::from_secs(30)));

    let outcomes = orchestrator
        .render_all(vec![
            RenderJob {
                id: "a".into(),
                delta: Delta::parse(r#"[{"insert": "first\n"}]"#).unwrap(),
            },
            RenderJob {
                id: "b".into(),
                delta: Delta::parse(r#"[{"insert": "second\n"}]"#).unwrap(),
            },
        ])
        .await;

    let a = outcomes[0].result.as_ref().unwrap();
    let b = outcomes[1].result.as_ref().unwrap();
    assert!(a.contains("first") && !a.contains("second"));
    assert!(b.contains("second") && !b.contains("first"));
}
