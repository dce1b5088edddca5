//! Static site generator for Quill documents.
//!
//! Discovers `.quill` files, renders their deltas through a [`RenderEngine`],
//! wraps each in a page template and writes the site with an ordered index.
//!
//! [`RenderEngine`]: quillpress_render::RenderEngine

pub mod assets;
pub mod builder;
pub mod index;
pub mod templates;

pub use assets::{AssetError, AssetFetcher, STYLESHEET_FILE};
pub use builder::{
    BuildConfig, BuildError, BuildReport, DocumentError, Failure, SiteBuilder, Stage,
    DEFAULT_DOMAIN, DOMAIN_FILE, INDEX_FILE,
};
