//! Theme descriptors.

use std::path::{Path, PathBuf};

/// Directory inside a theme that holds its templates.
pub const THEME_TEMPLATES_DIR: &str = "templates";

/// An installed theme.
///
/// A theme is either empty (the site runs without one) or rooted at a
/// directory. A theme may inherit from a single parent theme.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Theme {
    name: String,
    root: Option<PathBuf>,
    parent: Option<Box<Theme>>,
}

impl Theme {
    /// The absent theme.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A theme rooted at `root`.
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: Some(root.into()),
            parent: None,
        }
    }

    /// Set the parent theme. An empty parent is ignored.
    pub fn with_parent(mut self, parent: Theme) -> Self {
        self.parent = if parent.is_empty() {
            None
        } else {
            Some(Box::new(parent))
        };
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Directory holding this theme's templates.
    pub fn templates_path(&self) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join(THEME_TEMPLATES_DIR))
    }

    pub fn parent(&self) -> Option<&Theme> {
        self.parent.as_deref()
    }
}
