//! Index page ordering.

use std::cmp::Ordering;
use std::path::Path;

use crate::templates::IndexLink;

/// A written document as seen by the index page.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    /// `title` from the document's metadata
    pub title: String,
    /// Coerced `order` from the document's metadata
    pub order: f64,
    /// Output path relative to the site root
    pub href: String,
}

impl IndexEntry {
    /// Build an entry from a relative output path.
    pub fn new(title: String, order: f64, output: &Path) -> Self {
        Self {
            title,
            order,
            href: url_path(output),
        }
    }

    fn link(&self) -> IndexLink {
        let label = if self.title.is_empty() {
            self.href.clone()
        } else {
            self.title.clone()
        };

        IndexLink {
            label,
            href: self.href.clone(),
        }
    }
}

/// Order entries for the index page.
///
/// Ascending by `order`; entries with equal order keep their discovery order.
pub fn index_links(mut entries: Vec<IndexEntry>) -> Vec<IndexLink> {
    entries.sort_by(|a, b| a.order.partial_cmp(&b.order).unwrap_or(Ordering::Equal));
    entries.iter().map(IndexEntry::link).collect()
}

/// Convert a relative path to a `/`-separated URL path.
pub fn url_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
