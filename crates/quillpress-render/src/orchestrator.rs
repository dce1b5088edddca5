//! Render orchestration across a batch of documents.
//!
//! Each job runs acquire → prepare → render → release against its own
//! context. Failures stay with their job; the batch always runs to the end.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use quillpress_doc::Delta;
use tokio::sync::Semaphore;

use crate::engine::{EngineError, RenderEngine};

/// A delta to render, tagged with the document it belongs to.
#[derive(Debug, Clone)]
pub struct RenderJob {
    /// Document identifier used in logs (its source path)
    pub id: String,

    /// Delta to import
    pub delta: Delta,
}

/// Result of rendering one job.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    /// Identifier of the job this outcome belongs to
    pub id: String,

    /// Rendered markup, or why rendering failed
    pub result: Result<String, EngineError>,
}

/// Drives a [`RenderEngine`] over many documents.
pub struct RenderOrchestrator<E> {
    engine: Arc<E>,
    concurrency: usize,
    timeout: Option<Duration>,
}

impl<E> RenderOrchestrator<E>
where
    E: RenderEngine + 'static,
{
    /// Create a sequential orchestrator with no render timeout.
    pub fn new(engine: Arc<E>) -> Self {
        Self {
            engine,
            concurrency: 1,
            timeout: None,
        }
    }

    /// Cap the number of simultaneously open rendering contexts (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Fail any render whose prepare + render steps exceed `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Render every job, returning outcomes in input order.
    pub async fn render_all(&self, jobs: Vec<RenderJob>) -> Vec<RenderOutcome> {
        tracing::info!(
            engine = self.engine.name(),
            jobs = jobs.len(),
            concurrency = self.concurrency,
            "Rendering documents"
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(jobs.len());

        for job in jobs {
            // The semaphore is never closed while this method holds it.
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    handles.push((job.id, Err(EngineError::Unavailable(e.to_string()))));
                    continue;
                }
            };

            let engine = Arc::clone(&self.engine);
            let timeout = self.timeout;
            let id = job.id.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                render_one(engine.as_ref(), &job, timeout).await
            });

            handles.push((id, Ok(handle)));
        }

        let mut outcomes = Vec::with_capacity(handles.len());

        for (id, handle) in handles {
            let result = match handle {
                Ok(handle) => handle.await.unwrap_or_else(|e| {
                    Err(EngineError::Rejected(format!("render task failed: {e}")))
                }),
                Err(e) => Err(e),
            };

            outcomes.push(RenderOutcome { id, result });
        }

        outcomes
    }
}

/// Render a single job, releasing its context on every path.
async fn render_one<E: RenderEngine>(
    engine: &E,
    job: &RenderJob,
    timeout: Option<Duration>,
) -> Result<String, EngineError> {
    let mut context = engine.acquire().await.map_err(|e| {
        tracing::warn!("Could not acquire rendering context for {}: {}", job.id, e);
        e
    })?;

    // A panicking engine must not skip the release below.
    let work =
        AssertUnwindSafe(prepare_and_render(engine, &mut context, &job.delta)).catch_unwind();
    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, work)
            .await
            .unwrap_or(Ok(Err(EngineError::Timeout(limit)))),
        None => work.await,
    }
    .unwrap_or_else(|panic| {
        Err(EngineError::Rejected(format!(
            "engine panicked: {}",
            panic_message(&*panic)
        )))
    });

    if let Err(e) = engine.release(context).await {
        tracing::warn!("{}", e);
    }

    match &result {
        Ok(markup) => tracing::debug!("Rendered {} ({} bytes)", job.id, markup.len()),
        Err(e) => tracing::warn!("Failed to render {}: {}", job.id, e),
    }

    result
}

async fn prepare_and_render<E: RenderEngine>(
    engine: &E,
    context: &mut E::Context,
    delta: &Delta,
) -> Result<String, EngineError> {
    engine.prepare(context).await?;
    engine.render(context, delta).await
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
