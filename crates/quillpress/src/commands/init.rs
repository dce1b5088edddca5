//! Scaffold a new quillpress project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing quillpress...");

    let root = config_path.parent().unwrap_or(Path::new(""));
    scaffold(root, config_path, yes)?;

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'quillpress build' to render the site.");

    Ok(())
}

fn scaffold(root: &Path, config_path: &Path, yes: bool) -> Result<()> {
    let docs_dir = root.join("documents");

    if docs_dir.exists() {
        if !yes {
            tracing::warn!("documents/ directory already exists. Use --yes to overwrite.");
            return Ok(());
        }
    } else {
        fs::create_dir_all(&docs_dir).context("Failed to create documents directory")?;
    }

    if !config_path.exists() || yes {
        fs::write(config_path, DEFAULT_CONFIG)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        tracing::info!("Created {}", config_path.display());
    }

    let welcome_path = docs_dir.join("welcome.quill");
    if !welcome_path.exists() || yes {
        fs::write(&welcome_path, DEFAULT_WELCOME).context("Failed to write welcome.quill")?;
        tracing::info!("Created documents/welcome.quill");
    }

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Quillpress Configuration

[site]
# Directory containing .quill documents
input = "documents"

# Output directory (emptied on every build)
output = "_site"

# Document file extension
extension = "quill"

# Title of the index page
title = "Documents"

# Base URL (for deployment)
base_url = "/"

# Domain written to CNAME
domain = "localhost"

[engine]
# Quill release used for rendering and the published stylesheet
quill_version = "1.3.6"
cdn_base = "https://cdn.quilljs.com"

# Documents rendered at once
concurrency = 1

# Seconds before a stuck render fails (0 disables)
timeout_secs = 60
"#;

const DEFAULT_WELCOME: &str = r#"---
title: Welcome
order: 1
---
{"ops": [
  {"insert": "Welcome"},
  {"insert": "\n", "attributes": {"header": 1}},
  {"insert": "Documents are Quill deltas with YAML frontmatter. Text can be "},
  {"insert": "bold", "attributes": {"bold": true}},
  {"insert": ", "},
  {"insert": "italic", "attributes": {"italic": true}},
  {"insert": " or "},
  {"insert": "linked", "attributes": {"link": "https://quilljs.com"}},
  {"insert": ".\n"},
  {"insert": "Set "},
  {"insert": "order", "attributes": {"code": true}},
  {"insert": " in the frontmatter to sort the index page"},
  {"insert": "\n", "attributes": {"list": "bullet"}}
]}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn scaffolds_parseable_files() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("quillpress.toml");

        scaffold(temp.path(), &config_path, false).unwrap();

        let config = crate::config::load_config(&config_path).unwrap();
        assert_eq!(config.site.input, "documents");

        let welcome = fs::read_to_string(temp.path().join("documents/welcome.quill")).unwrap();
        let doc = quillpress_doc::parse_document(&welcome).unwrap();
        assert_eq!(doc.metadata.title(), "Welcome");
        assert!(doc.delta.plain_text().contains("bold"));
    }

    #[test]
    fn keeps_existing_documents_without_yes() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("quillpress.toml");
        fs::create_dir_all(temp.path().join("documents")).unwrap();

        scaffold(temp.path(), &config_path, false).unwrap();

        assert!(!config_path.exists());
        assert!(!temp.path().join("documents/welcome.quill").exists());
    }
}
