//! Static site build command.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use quillpress_render::{ChromeEngine, ChromeOptions};
use quillpress_static::{AssetFetcher, BuildConfig, SiteBuilder, DEFAULT_DOMAIN};

use crate::config::{load_config, ConfigFile};

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub output: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub timeout_secs: Option<u64>,
}

fn build_config(file_config: &ConfigFile, overrides: Overrides) -> BuildConfig {
    let site = &file_config.site;
    let timeout_secs = overrides
        .timeout_secs
        .unwrap_or(file_config.engine.timeout_secs);

    BuildConfig {
        input_dir: PathBuf::from(&site.input),
        output_dir: overrides
            .output
            .unwrap_or_else(|| PathBuf::from(&site.output)),
        extension: site.extension.trim_start_matches('.').to_string(),
        title: site.title.clone(),
        base_url: site.base_url.clone(),
        domain: match site.domain.trim() {
            "" => DEFAULT_DOMAIN.to_string(),
            domain => domain.to_string(),
        },
        concurrency: overrides
            .concurrency
            .unwrap_or(file_config.engine.concurrency),
        render_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
    }
}

/// Run the build command.
///
/// Returns `false` when any document or artifact failed.
pub async fn run(config_path: &Path, overrides: Overrides) -> Result<bool> {
    tracing::info!("Building static site...");

    let file_config = load_config(config_path)?;
    let config = build_config(&file_config, overrides);

    let fetcher = AssetFetcher::new(
        &file_config.engine.cdn_base,
        &file_config.engine.quill_version,
    );
    let assets = fetcher
        .fetch()
        .await
        .context("Failed to fetch Quill assets")?;
    let stylesheet = assets.stylesheet.clone();

    let options = ChromeOptions {
        sandbox: file_config.engine.sandbox,
        ..Default::default()
    };
    let engine = ChromeEngine::launch(options, assets)
        .await
        .context("Failed to start the rendering engine")?;

    let report = SiteBuilder::new(config, Arc::new(engine), stylesheet)
        .build()
        .await?;

    tracing::info!(
        "Built {} pages in {}ms",
        report.pages,
        report.duration_ms
    );

    tracing::info!("Output: {}", report.output_dir.display());

    if report.is_success() {
        return Ok(true);
    }

    for failure in &report.failures {
        tracing::error!("{}", failure);
    }
    tracing::error!("{} document(s) or artifact(s) failed", report.failures.len());

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_values_are_used() {
        let mut file_config = ConfigFile::default();
        file_config.site.input = "statutes".to_string();
        file_config.site.extension = ".quill".to_string();
        file_config.site.domain = "laws.example.org".to_string();
        file_config.engine.concurrency = 3;

        let config = build_config(&file_config, Overrides::default());

        assert_eq!(config.input_dir, PathBuf::from("statutes"));
        assert_eq!(config.output_dir, PathBuf::from("_site"));
        assert_eq!(config.extension, "quill");
        assert_eq!(config.domain, "laws.example.org");
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.render_timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn overrides_take_precedence() {
        let overrides = Overrides {
            output: Some(PathBuf::from("public")),
            concurrency: Some(8),
            timeout_secs: Some(0),
        };

        let config = build_config(&ConfigFile::default(), overrides);

        assert_eq!(config.output_dir, PathBuf::from("public"));
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.render_timeout, None);
    }

    #[test]
    fn blank_domain_falls_back_to_default() {
        let mut file_config = ConfigFile::default();
        file_config.site.domain = "  ".to_string();

        let config = build_config(&file_config, Overrides::default());

        assert_eq!(config.domain, DEFAULT_DOMAIN);
    }
}
