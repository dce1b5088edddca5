//! Render engine adapter and orchestrator for Quill deltas.
//!
//! This crate turns validated deltas into editor markup by driving an external
//! rendering host (headless Chrome running Quill) one isolated context per
//! document, with bounded concurrency and per-document failure isolation.

pub mod chrome;
pub mod engine;
pub mod orchestrator;

pub use chrome::{ChromeContext, ChromeEngine, ChromeOptions};
pub use engine::{wrap_editor_markup, EngineAssets, EngineError, RenderEngine};
pub use orchestrator::{RenderJob, RenderOrchestrator, RenderOutcome};
