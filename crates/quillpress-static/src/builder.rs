//! Static site builder.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use walkdir::WalkDir;

use quillpress_doc::{parse_document_bytes, Delta, Metadata, ParseError};
use quillpress_render::{EngineError, RenderEngine, RenderJob, RenderOrchestrator};

use crate::assets::STYLESHEET_FILE;
use crate::index::{index_links, IndexEntry};
use crate::templates::{PageContext, TemplateEngine};

/// Name of the generated index page.
pub const INDEX_FILE: &str = "index.html";

/// Name of the static hosting domain marker.
pub const DOMAIN_FILE: &str = "CNAME";

/// Domain written to the marker when none is configured.
pub const DEFAULT_DOMAIN: &str = "localhost";

/// Configuration for building a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source documents directory
    pub input_dir: PathBuf,

    /// Output directory (emptied at the start of every build)
    pub output_dir: PathBuf,

    /// Extension of document files, without the dot
    pub extension: String,

    /// Title of the index page
    pub title: String,

    /// Base URL the site is served under
    pub base_url: String,

    /// Domain written to the hosting marker file
    pub domain: String,

    /// Maximum number of simultaneously open rendering contexts
    pub concurrency: usize,

    /// Per-document render timeout
    pub render_timeout: Option<Duration>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("documents"),
            output_dir: PathBuf::from("_site"),
            extension: "quill".to_string(),
            title: "Documents".to_string(),
            base_url: "/".to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            concurrency: 1,
            render_timeout: None,
        }
    }
}

/// Errors that abort a build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read documents directory: {0}")]
    Discovery(String),

    #[error("Failed to prepare output directory: {0}")]
    OutputDir(String),
}

/// Errors confined to a single document or artifact.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Failed to read document: {0}")]
    Read(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Output path {0} is already taken by another artifact")]
    OutputCollision(String),

    #[error(transparent)]
    Render(#[from] EngineError),

    #[error("Failed to render template: {0}")]
    Template(String),

    #[error("Failed to write output: {0}")]
    Write(String),
}

/// Pipeline stage a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Discover,
    Parse,
    Render,
    Template,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Discover => "discover",
            Self::Parse => "parse",
            Self::Render => "render",
            Self::Template => "template",
            Self::Write => "write",
        };
        f.write_str(name)
    }
}

/// A document or artifact that did not make it into the site.
#[derive(Debug)]
pub struct Failure {
    /// Source path relative to the input dir, or artifact path relative to the output dir
    pub location: PathBuf,

    /// Stage that failed
    pub stage: Stage,

    /// What went wrong
    pub error: DocumentError,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.location.display(), self.stage, self.error)
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildReport {
    /// Number of document pages written
    pub pages: usize,

    /// Every document or artifact failure, in pipeline order
    pub failures: Vec<Failure>,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

impl BuildReport {
    /// Whether every document and artifact was produced.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A document file found during discovery.
#[derive(Debug)]
struct SourceFile {
    /// Absolute or input-rooted path
    path: PathBuf,

    /// Relative path from the input dir
    relative_path: PathBuf,
}

/// A parsed document with its output location assigned.
#[derive(Debug)]
struct Document {
    relative_path: PathBuf,
    output_path: PathBuf,
    metadata: Metadata,
    delta: Delta,
}

/// A document whose delta has been rendered.
#[derive(Debug)]
struct RenderedDocument {
    relative_path: PathBuf,
    output_path: PathBuf,
    metadata: Metadata,
    markup: String,
}

/// Static site builder.
pub struct SiteBuilder<E> {
    config: BuildConfig,
    engine: Arc<E>,
    stylesheet: String,
    templates: TemplateEngine,
}

impl<E> SiteBuilder<E>
where
    E: RenderEngine + 'static,
{
    /// Create a new site builder.
    ///
    /// `stylesheet` is written verbatim to the output root.
    pub fn new(config: BuildConfig, engine: Arc<E>, stylesheet: impl Into<String>) -> Self {
        Self {
            config,
            engine,
            stylesheet: stylesheet.into(),
            templates: TemplateEngine::new(),
        }
    }

    /// Build the static site.
    ///
    /// Only fatal problems return `Err`; per-document failures are collected
    /// in the report after every document has been attempted.
    pub async fn build(&self) -> Result<BuildReport, BuildError> {
        let start = Instant::now();
        let mut failures = Vec::new();

        self.prepare_output_dir()?;

        let sources = self.discover_sources(&mut failures)?;
        tracing::info!(
            "Found {} documents in {}",
            sources.len(),
            self.config.input_dir.display()
        );

        let documents = self.parse_documents(sources, &mut failures);
        let rendered = self.render_documents(documents, &mut failures).await;
        let entries = self.write_pages(&rendered, &mut failures);
        let pages = entries.len();

        self.write_site_files(entries, &mut failures);

        Ok(BuildReport {
            pages,
            failures,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Empty the output directory, creating it if needed.
    fn prepare_output_dir(&self) -> Result<(), BuildError> {
        let output = &self.config.output_dir;

        if let (Ok(out), Ok(input)) = (output.canonicalize(), self.config.input_dir.canonicalize())
        {
            if input.starts_with(&out) {
                return Err(BuildError::OutputDir(format!(
                    "{} contains the documents directory and cannot be cleared",
                    output.display()
                )));
            }
        }

        if output.exists() {
            fs::remove_dir_all(output)
                .map_err(|e| BuildError::OutputDir(format!("{}: {}", output.display(), e)))?;
        }

        fs::create_dir_all(output)
            .map_err(|e| BuildError::OutputDir(format!("{}: {}", output.display(), e)))
    }

    /// Find all document files, in sorted path order.
    ///
    /// Entries below the root that cannot be read are recorded as discover failures.
    fn discover_sources(
        &self,
        failures: &mut Vec<Failure>,
    ) -> Result<Vec<SourceFile>, BuildError> {
        let input = &self.config.input_dir;

        if !input.is_dir() {
            return Err(BuildError::Discovery(format!(
                "Documents directory not found: {}",
                input.display()
            )));
        }

        let mut sources = Vec::new();

        for entry in WalkDir::new(input).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(BuildError::Discovery(format!("{}: {}", input.display(), e)));
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    let location = e
                        .path()
                        .map(|p| p.strip_prefix(input).unwrap_or(p).to_path_buf())
                        .unwrap_or_default();
                    failures.push(Failure {
                        location,
                        stage: Stage::Discover,
                        error: DocumentError::Read(e.to_string()),
                    });
                    continue;
                }
            };

            let path = entry.path();

            if !entry.file_type().is_file() {
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if ext != self.config.extension {
                continue;
            }

            let relative_path = path.strip_prefix(input).unwrap_or(path).to_path_buf();

            sources.push(SourceFile {
                path: path.to_path_buf(),
                relative_path,
            });
        }

        Ok(sources)
    }

    /// Read and parse every source, assigning output locations.
    fn parse_documents(
        &self,
        sources: Vec<SourceFile>,
        failures: &mut Vec<Failure>,
    ) -> Vec<Document> {
        let mut claimed: HashSet<PathBuf> = HashSet::from([PathBuf::from(INDEX_FILE)]);
        let mut documents = Vec::with_capacity(sources.len());

        for source in sources {
            let output_path = source.relative_path.with_extension("html");

            if !claimed.insert(output_path.clone()) {
                failures.push(Failure {
                    location: source.relative_path,
                    stage: Stage::Discover,
                    error: DocumentError::OutputCollision(output_path.display().to_string()),
                });
                continue;
            }

            let parsed = fs::read(&source.path)
                .map_err(|e| (Stage::Discover, DocumentError::Read(e.to_string())))
                .and_then(|content| {
                    parse_document_bytes(&content)
                        .map_err(|e| (Stage::Parse, DocumentError::Parse(e)))
                });

            match parsed {
                Ok(doc) => documents.push(Document {
                    relative_path: source.relative_path,
                    output_path,
                    metadata: doc.metadata,
                    delta: doc.delta,
                }),
                Err((stage, error)) => {
                    tracing::warn!("Skipping {}: {}", source.relative_path.display(), error);
                    failures.push(Failure {
                        location: source.relative_path,
                        stage,
                        error,
                    });
                }
            }
        }

        documents
    }

    /// Render all documents through the engine.
    async fn render_documents(
        &self,
        documents: Vec<Document>,
        failures: &mut Vec<Failure>,
    ) -> Vec<RenderedDocument> {
        let orchestrator = RenderOrchestrator::new(Arc::clone(&self.engine))
            .with_concurrency(self.config.concurrency)
            .with_timeout(self.config.render_timeout);

        let jobs = documents
            .iter()
            .map(|doc| RenderJob {
                id: doc.relative_path.display().to_string(),
                delta: doc.delta.clone(),
            })
            .collect();

        let outcomes = orchestrator.render_all(jobs).await;
        let mut rendered = Vec::with_capacity(documents.len());

        for (doc, outcome) in documents.into_iter().zip(outcomes) {
            match outcome.result {
                Ok(markup) => rendered.push(RenderedDocument {
                    relative_path: doc.relative_path,
                    output_path: doc.output_path,
                    metadata: doc.metadata,
                    markup,
                }),
                Err(e) => failures.push(Failure {
                    location: doc.relative_path,
                    stage: Stage::Render,
                    error: e.into(),
                }),
            }
        }

        rendered
    }

    /// Template and write every rendered document in parallel.
    ///
    /// Returns index entries for the pages that were written, in input order.
    fn write_pages(
        &self,
        rendered: &[RenderedDocument],
        failures: &mut Vec<Failure>,
    ) -> Vec<IndexEntry> {
        let results: Vec<Result<IndexEntry, Failure>> =
            rendered.par_iter().map(|doc| self.write_page(doc)).collect();

        let mut entries = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(entry) => entries.push(entry),
                Err(failure) => failures.push(failure),
            }
        }

        entries
    }

    fn write_page(&self, doc: &RenderedDocument) -> Result<IndexEntry, Failure> {
        let failure = |stage: Stage, error: DocumentError| Failure {
            location: doc.relative_path.clone(),
            stage,
            error,
        };

        let title = doc.metadata.title();
        let html = self
            .templates
            .render_page(&PageContext {
                title: title.clone(),
                content: doc.markup.clone(),
                base_url: self.config.base_url.clone(),
            })
            .map_err(|e| failure(Stage::Template, DocumentError::Template(e.to_string())))?;

        write_file(&self.config.output_dir.join(&doc.output_path), &html)
            .map_err(|e| failure(Stage::Write, e))?;

        Ok(IndexEntry::new(title, doc.metadata.order(), &doc.output_path))
    }

    /// Write the index page, stylesheet and domain marker.
    fn write_site_files(&self, entries: Vec<IndexEntry>, failures: &mut Vec<Failure>) {
        let out = &self.config.output_dir;
        let links = index_links(entries);

        match self.templates.render_index(&self.config.title, &links) {
            Ok(html) => {
                if let Err(e) = write_file(&out.join(INDEX_FILE), &html) {
                    failures.push(artifact_failure(INDEX_FILE, Stage::Write, e));
                }
            }
            Err(e) => failures.push(artifact_failure(
                INDEX_FILE,
                Stage::Template,
                DocumentError::Template(e.to_string()),
            )),
        }

        if let Err(e) = write_file(&out.join(STYLESHEET_FILE), &self.stylesheet) {
            failures.push(artifact_failure(STYLESHEET_FILE, Stage::Write, e));
        }

        if let Err(e) = write_file(&out.join(DOMAIN_FILE), &self.config.domain) {
            failures.push(artifact_failure(DOMAIN_FILE, Stage::Write, e));
        }
    }
}

fn artifact_failure(name: &str, stage: Stage, error: DocumentError) -> Failure {
    tracing::warn!("Failed to produce {}: {}", name, error);
    Failure {
        location: PathBuf::from(name),
        stage,
        error,
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), DocumentError> {
    let write_error = |e: std::io::Error| DocumentError::Write(format!("{}: {}", path.display(), e));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_error)?;
    }

    fs::write(path, contents).map_err(write_error)
}
