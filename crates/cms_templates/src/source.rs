//! Template sources.
//!
//! A source answers one question: can it supply the template stored under a
//! given identifier? Sources are composed into a [`SourceChain`] that tries
//! them in priority order.
//!
//! [`SourceChain`]: crate::resolver::SourceChain

use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{TemplateError, TemplateResult};

/// The tier a template was supplied from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceTier {
    /// Site-level overrides under the site's `templates/` directory.
    Site,
    /// The active theme.
    Theme,
    /// The parent of the active theme.
    ParentTheme,
    /// Template text passed in directly.
    Inline,
}

impl fmt::Display for SourceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Site => "site",
            Self::Theme => "theme",
            Self::ParentTheme => "parent-theme",
            Self::Inline => "inline",
        };
        f.write_str(label)
    }
}

/// A template body together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTemplate {
    pub name: String,
    pub content: String,
    pub tier: SourceTier,
}

/// A template visible through a source, attributed to the tier that supplies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateEntry {
    pub name: String,
    pub tier: SourceTier,
}

/// A provider of template bodies keyed by identifier.
pub trait TemplateSource: Send + Sync + fmt::Debug {
    /// Load `identifier`, returning `Ok(None)` when this source does not have it.
    fn load(&self, identifier: &str) -> TemplateResult<Option<LoadedTemplate>>;

    /// Load `identifier` or fail with [`TemplateError::NotFound`].
    fn resolve(&self, identifier: &str) -> TemplateResult<LoadedTemplate> {
        self.load(identifier)?
            .ok_or_else(|| TemplateError::NotFound(self.display_name(identifier)))
    }

    /// The tier this source occupies, when it is a single tier.
    fn tier(&self) -> Option<SourceTier> {
        None
    }

    /// Every template this source can enumerate.
    fn entries(&self) -> TemplateResult<Vec<TemplateEntry>> {
        Ok(Vec::new())
    }

    /// How `identifier` is named in logs and errors.
    fn display_name(&self, identifier: &str) -> String {
        identifier.to_string()
    }
}

/// Templates stored as files below a root directory.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
    tier: SourceTier,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>, tier: SourceTier) -> Self {
        Self {
            root: root.into(),
            tier,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an identifier to a file below the root.
    ///
    /// Absolute identifiers and identifiers climbing out of the root map to nothing.
    fn path_for(&self, identifier: &str) -> Option<PathBuf> {
        if identifier.is_empty() {
            return None;
        }
        let relative = Path::new(identifier);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        contained.then(|| self.root.join(relative))
    }
}

impl TemplateSource for FileSource {
    fn load(&self, identifier: &str) -> TemplateResult<Option<LoadedTemplate>> {
        let Some(path) = self.path_for(identifier) else {
            debug!("Rejected template identifier {:?} for {} source", identifier, self.tier);
            return Ok(None);
        };

        if !path.is_file() {
            return Ok(None);
        }

        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(LoadedTemplate {
                name: identifier.to_string(),
                content,
                tier: self.tier,
            })),
            // Removed between the check and the read.
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn tier(&self) -> Option<SourceTier> {
        Some(self.tier)
    }

    fn entries(&self) -> TemplateResult<Vec<TemplateEntry>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&self.root) {
                let name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                entries.push(TemplateEntry {
                    name,
                    tier: self.tier,
                });
            }
        }
        Ok(entries)
    }
}

/// Treats the identifier itself as the template text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringSource;

impl TemplateSource for StringSource {
    fn load(&self, identifier: &str) -> TemplateResult<Option<LoadedTemplate>> {
        Ok(Some(LoadedTemplate {
            name: identifier.to_string(),
            content: identifier.to_string(),
            tier: SourceTier::Inline,
        }))
    }

    fn tier(&self) -> Option<SourceTier> {
        Some(SourceTier::Inline)
    }

    fn display_name(&self, _identifier: &str) -> String {
        "<inline template>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_source_load() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("partials")).unwrap();
        fs::write(temp.path().join("partials/header.html"), "<h1>{{ title }}</h1>").unwrap();

        let source = FileSource::new(temp.path(), SourceTier::Theme);
        let loaded = source.load("partials/header.html").unwrap().unwrap();

        assert_eq!(loaded.name, "partials/header.html");
        assert_eq!(loaded.content, "<h1>{{ title }}</h1>");
        assert_eq!(loaded.tier, SourceTier::Theme);
    }

    #[test]
    fn test_file_source_miss() {
        let temp = tempdir().unwrap();
        let source = FileSource::new(temp.path(), SourceTier::Site);

        assert!(source.load("missing.html").unwrap().is_none());
        assert!(source.resolve("missing.html").unwrap_err().is_not_found());
    }

    #[test]
    fn test_file_source_directory_is_a_miss() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("layouts")).unwrap();
        let source = FileSource::new(temp.path(), SourceTier::Site);

        assert!(source.load("layouts").unwrap().is_none());
    }

    #[test]
    fn test_file_source_rejects_escaping_identifiers() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("templates");
        fs::create_dir_all(&root).unwrap();
        fs::write(temp.path().join("secret.txt"), "secret").unwrap();

        let source = FileSource::new(&root, SourceTier::Site);
        assert!(source.load("../secret.txt").unwrap().is_none());
        assert!(source.load("").unwrap().is_none());
        let absolute = temp.path().join("secret.txt");
        assert!(source.load(&absolute.to_string_lossy()).unwrap().is_none());
    }

    #[test]
    fn test_file_source_entries() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("partials")).unwrap();
        fs::write(temp.path().join("index.html"), "index").unwrap();
        fs::write(temp.path().join("partials/footer.html"), "footer").unwrap();

        let source = FileSource::new(temp.path(), SourceTier::ParentTheme);
        let mut names: Vec<_> = source.entries().unwrap().into_iter().map(|e| e.name).collect();
        names.sort();

        assert_eq!(names, vec!["index.html", "partials/footer.html"]);
    }

    #[test]
    fn test_file_source_entries_missing_root() {
        let temp = tempdir().unwrap();
        let source = FileSource::new(temp.path().join("absent"), SourceTier::Theme);
        assert!(source.entries().unwrap().is_empty());
    }

    #[test]
    fn test_string_source_echoes_identifier() {
        let loaded = StringSource.resolve("Hello {{ name }}").unwrap();
        assert_eq!(loaded.content, "Hello {{ name }}");
        assert_eq!(loaded.tier, SourceTier::Inline);
        assert_eq!(StringSource.display_name("Hello"), "<inline template>");
    }
}
