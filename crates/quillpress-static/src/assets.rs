//! Quill runtime and stylesheet fetching.

use quillpress_render::EngineAssets;

/// File name the stylesheet is written under in the output root.
pub const STYLESHEET_FILE: &str = "quill.snow.css";

/// Errors that can occur while fetching assets.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Failed to fetch {url}: {message}")]
    Request { url: String, message: String },

    #[error("Failed to fetch {url}: HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Downloads a pinned Quill release from a CDN.
pub struct AssetFetcher {
    client: reqwest::Client,
    cdn_base: String,
    version: String,
}

impl AssetFetcher {
    /// Create a fetcher for `version` served under `cdn_base`.
    pub fn new(cdn_base: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            cdn_base: cdn_base.into(),
            version: version.into(),
        }
    }

    /// URL of the Quill runtime script.
    pub fn script_url(&self) -> String {
        self.url("quill.min.js")
    }

    /// URL of the snow theme stylesheet.
    pub fn stylesheet_url(&self) -> String {
        self.url(STYLESHEET_FILE)
    }

    fn url(&self, file: &str) -> String {
        format!(
            "{}/{}/{}",
            self.cdn_base.trim_end_matches('/'),
            self.version,
            file
        )
    }

    /// Fetch both runtime files.
    pub async fn fetch(&self) -> Result<EngineAssets, AssetError> {
        let script = self.fetch_text(&self.script_url()).await?;
        let stylesheet = self.fetch_text(&self.stylesheet_url()).await?;

        tracing::info!(
            "Fetched Quill {} ({} bytes of script, {} bytes of CSS)",
            self.version,
            script.len(),
            stylesheet.len()
        );

        Ok(EngineAssets { script, stylesheet })
    }

    async fn fetch_text(&self, url: &str) -> Result<String, AssetError> {
        tracing::debug!("Fetching {}", url);

        let request_error = |e: reqwest::Error| AssetError::Request {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(request_error)
    }
}
