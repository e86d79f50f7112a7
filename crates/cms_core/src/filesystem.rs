//! Site filesystem access.

use std::path::{Path, PathBuf};

/// Directory holding site-level template overrides, relative to the site root.
pub const SITE_TEMPLATES_DIR: &str = "templates/";

/// Resolves paths under the site root.
pub trait SiteFileSystem: Send + Sync {
    /// Resolve `relative` against the site root.
    fn resolve(&self, relative: &str) -> PathBuf;
}

/// A site filesystem backed by a plain directory.
#[derive(Debug, Clone)]
pub struct DirectoryFileSystem {
    root: PathBuf,
}

impl DirectoryFileSystem {
    /// Create a filesystem rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The site root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SiteFileSystem for DirectoryFileSystem {
    fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}
