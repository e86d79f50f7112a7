//! Source resolution across the site, the active theme and its parent.
//!
//! The chain is ordered and fixed at construction:
//! 1. site templates (`<site>/templates/`)
//! 2. the active theme's templates, unless the theme is empty
//! 3. the parent theme's templates, if the theme has a parent
//!
//! The first source that supplies an identifier wins.

use std::collections::BTreeMap;
use std::sync::Arc;

use cms_core::{SiteFileSystem, Theme, SITE_TEMPLATES_DIR};
use tracing::debug;

use crate::error::TemplateResult;
use crate::source::{FileSource, LoadedTemplate, SourceTier, TemplateEntry, TemplateSource};

/// An ordered, delegating list of template sources.
#[derive(Debug, Clone, Default)]
pub struct SourceChain {
    sources: Vec<Arc<dyn TemplateSource>>,
}

impl SourceChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the chain for `theme` on top of the site's template directory.
    pub fn for_theme(site_fs: &dyn SiteFileSystem, theme: &Theme) -> Self {
        let mut chain = Self::new().with_source(Arc::new(FileSource::new(
            site_fs.resolve(SITE_TEMPLATES_DIR),
            SourceTier::Site,
        )));

        if !theme.is_empty() {
            if let Some(path) = theme.templates_path() {
                chain.push(Arc::new(FileSource::new(path, SourceTier::Theme)));
            }

            if let Some(path) = theme.parent().and_then(Theme::templates_path) {
                chain.push(Arc::new(FileSource::new(path, SourceTier::ParentTheme)));
            }
        }

        debug!(
            "Built source chain for theme {:?}: {:?}",
            theme.name(),
            chain.tiers()
        );
        chain
    }

    pub fn with_source(mut self, source: Arc<dyn TemplateSource>) -> Self {
        self.push(source);
        self
    }

    pub fn push(&mut self, source: Arc<dyn TemplateSource>) {
        self.sources.push(source);
    }

    /// The tiers in lookup order.
    pub fn tiers(&self) -> Vec<SourceTier> {
        self.sources.iter().filter_map(|s| s.tier()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Every template visible through the chain, attributed to the tier that wins it.
    pub fn list_templates(&self) -> TemplateResult<Vec<TemplateEntry>> {
        self.entries()
    }
}

impl TemplateSource for SourceChain {
    fn load(&self, identifier: &str) -> TemplateResult<Option<LoadedTemplate>> {
        for source in &self.sources {
            if let Some(found) = source.load(identifier)? {
                debug!("Resolved template {} from {} source", identifier, found.tier);
                return Ok(Some(found));
            }
        }
        debug!("Template {} not found in any source", identifier);
        Ok(None)
    }

    fn entries(&self) -> TemplateResult<Vec<TemplateEntry>> {
        let mut visible = BTreeMap::new();
        for source in &self.sources {
            for entry in source.entries()? {
                visible.entry(entry.name.clone()).or_insert(entry);
            }
        }
        Ok(visible.into_values().collect())
    }
}
