//! Configuration file (quillpress.toml).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use quillpress_static::DEFAULT_DOMAIN;
use serde::Deserialize;

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_input")]
    pub input: String,
    #[serde(default = "default_output")]
    pub output: String,
    /// Document file extension, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Domain written to the CNAME file
    #[serde(default = "default_domain")]
    pub domain: String,
}

#[derive(Debug, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_quill_version")]
    pub quill_version: String,
    #[serde(default = "default_cdn_base")]
    pub cdn_base: String,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-document render timeout; 0 disables it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Run Chrome with its sandbox enabled
    #[serde(default)]
    pub sandbox: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            extension: default_extension(),
            title: default_title(),
            base_url: default_base_url(),
            domain: default_domain(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quill_version: default_quill_version(),
            cdn_base: default_cdn_base(),
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
            sandbox: false,
        }
    }
}

fn default_input() -> String {
    "documents".to_string()
}
fn default_output() -> String {
    "_site".to_string()
}
fn default_extension() -> String {
    "quill".to_string()
}
fn default_title() -> String {
    "Documents".to_string()
}
fn default_base_url() -> String {
    "/".to_string()
}
fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}
fn default_quill_version() -> String {
    "1.3.6".to_string()
}
fn default_cdn_base() -> String {
    "https://cdn.quilljs.com".to_string()
}
fn default_concurrency() -> usize {
    1
}
fn default_timeout_secs() -> u64 {
    60
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    Ok(ConfigFile::default())
}
