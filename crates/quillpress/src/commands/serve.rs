//! Preview server command.
//!
//! Pages link their stylesheet through the configured base URL, so the built
//! site is mounted under that prefix to preview it as it will be deployed.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::Router;
use quillpress_static::INDEX_FILE;
use tower_http::services::ServeDir;

use crate::config::load_config;

/// Run the serve command.
pub async fn run(config_path: &Path, port: u16, dir: Option<PathBuf>) -> Result<()> {
    let site = load_config(config_path)?.site;
    let dir = dir.unwrap_or_else(|| PathBuf::from(&site.output));

    if !dir.join(INDEX_FILE).is_file() {
        anyhow::bail!(
            "No built site in {}. Run 'quillpress build' first.",
            dir.display()
        );
    }

    let addr: SocketAddr = format!("127.0.0.1:{}", port)
        .parse()
        .context("Invalid address")?;

    let prefix = mount_prefix(&site.base_url);
    let app = site_router(&dir, prefix.as_deref());
    let url = format!("http://{}{}/", addr, prefix.as_deref().unwrap_or(""));

    tracing::info!("Serving {} at {}", dir.display(), url);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let _ = open::that(&url);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Path prefix the site is mounted under, or `None` for the root.
///
/// Absolute base URLs contribute only their path.
fn mount_prefix(base_url: &str) -> Option<String> {
    let path = match base_url.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |i| &rest[i..]),
        None => base_url,
    };

    let trimmed = path.trim_matches('/');
    (!trimmed.is_empty()).then(|| format!("/{trimmed}"))
}

fn site_router(dir: &Path, prefix: Option<&str>) -> Router {
    let files = ServeDir::new(dir);

    match prefix {
        Some(prefix) => Router::new().nest_service(prefix, files),
        None => Router::new().fallback_service(files),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_base_url_mounts_at_root() {
        assert_eq!(mount_prefix("/"), None);
        assert_eq!(mount_prefix(""), None);
        assert_eq!(mount_prefix("https://laws.example.org/"), None);
        assert_eq!(mount_prefix("https://laws.example.org"), None);
    }

    #[test]
    fn sub_path_base_url_becomes_prefix() {
        assert_eq!(mount_prefix("/statutes/"), Some("/statutes".to_string()));
        assert_eq!(mount_prefix("statutes"), Some("/statutes".to_string()));
        assert_eq!(
            mount_prefix("https://example.org/laws/current/"),
            Some("/laws/current".to_string())
        );
    }

    #[tokio::test]
    async fn refuses_unbuilt_directory() {
        let temp = tempfile::tempdir().unwrap();
        let config_path = temp.path().join("quillpress.toml");

        let err = run(&config_path, 0, Some(temp.path().to_path_buf()))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("quillpress build"));
    }
}
