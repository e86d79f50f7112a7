//! Engine lifecycle.
//!
//! [`TemplateEngineManager`] owns the two render engines the server uses:
//!
//! - the named-template engine, reading through the site → theme → parent chain
//! - the string engine, treating the template text as its own identifier
//!
//! Both are built from the same cache configuration and replaced together
//! when the theme changes.
//!
//! Renders take a snapshot of the current engine pair when they start. A
//! render already running when the theme changes finishes against the old
//! chain; every render started after the swap sees the new one.

use std::fmt;
use std::sync::Arc;

use cms_core::{Model, ServerProperties, SiteFileSystem, TemplateEngine, Theme};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, info};

use crate::engine::{EngineStats, RenderEngine};
use crate::error::{TemplateError, TemplateResult};
use crate::policy::CachePolicy;
use crate::resolver::SourceChain;
use crate::source::{SourceTier, StringSource, TemplateEntry, TemplateSource};

/// Engines built for one theme.
struct EngineSet {
    theme: Theme,
    chain: Arc<SourceChain>,
    named: RenderEngine,
    inline: RenderEngine,
}

/// Statistics for both engines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ManagerStats {
    pub named: EngineStats,
    pub inline: EngineStats,
}

/// Builds and swaps the render engines for the active theme.
pub struct TemplateEngineManager {
    site_fs: Arc<dyn SiteFileSystem>,
    policy: CachePolicy,
    engines: RwLock<Arc<EngineSet>>,
    /// Serializes theme updates.
    admin: Mutex<()>,
}

impl TemplateEngineManager {
    /// Build both engines for `theme`.
    pub fn new(site_fs: Arc<dyn SiteFileSystem>, properties: &ServerProperties, theme: Theme) -> Self {
        let policy = CachePolicy::from_properties(properties);
        let engines = build_engines(site_fs.as_ref(), policy, theme);

        info!(
            "Template engines ready (mode: {:?}, theme: {:?})",
            policy,
            engines.theme.name()
        );

        Self {
            site_fs,
            policy,
            engines: RwLock::new(Arc::new(engines)),
            admin: Mutex::new(()),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn is_development(&self) -> bool {
        self.policy.is_development()
    }

    /// The theme the current engines were built for.
    pub fn theme(&self) -> Theme {
        self.snapshot().theme.clone()
    }

    /// Lookup order of the current named-template chain.
    pub fn source_tiers(&self) -> Vec<SourceTier> {
        self.snapshot().chain.tiers()
    }

    /// Every named template visible through the current chain.
    pub fn list_templates(&self) -> TemplateResult<Vec<TemplateEntry>> {
        self.snapshot().chain.entries()
    }

    pub fn stats(&self) -> ManagerStats {
        let engines = self.snapshot();
        ManagerStats {
            named: engines.named.stats(),
            inline: engines.inline.stats(),
        }
    }

    fn snapshot(&self) -> Arc<EngineSet> {
        Arc::clone(&self.engines.read())
    }
}

impl TemplateEngine for TemplateEngineManager {
    type Error = TemplateError;

    fn render(&self, template: &str, model: &Model) -> TemplateResult<String> {
        self.snapshot().named.render(template, model)
    }

    fn render_from_string(&self, template: &str, model: &Model) -> TemplateResult<String> {
        self.snapshot().inline.render(template, model)
    }

    fn invalidate_cache(&self) {
        let engines = self.snapshot();
        if engines.named.is_caching() {
            info!("Invalidating named template cache");
            engines.named.invalidate();
        } else {
            debug!("Template caching disabled, nothing to invalidate");
        }
    }

    fn update_theme(&self, theme: Theme) {
        let _admin = self.admin.lock();
        info!("Rebuilding template engines for theme {:?}", theme.name());

        let engines = Arc::new(build_engines(self.site_fs.as_ref(), self.policy, theme));
        *self.engines.write() = engines;
    }
}

impl fmt::Debug for TemplateEngineManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let engines = self.snapshot();
        f.debug_struct("TemplateEngineManager")
            .field("policy", &self.policy)
            .field("theme", &engines.theme.name())
            .field("tiers", &engines.chain.tiers())
            .finish()
    }
}

/// Chain → policy → named engine → string engine with the same configuration.
fn build_engines(site_fs: &dyn SiteFileSystem, policy: CachePolicy, theme: Theme) -> EngineSet {
    let chain = Arc::new(SourceChain::for_theme(site_fs, &theme));

    let builder = RenderEngine::builder(Arc::clone(&chain) as Arc<dyn TemplateSource>)
        .cache_config(policy.cache_config());
    let named = builder.build();
    let inline = builder.source(Arc::new(StringSource)).build();

    EngineSet {
        theme,
        chain,
        named,
        inline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cms_core::SITE_TEMPLATES_DIR;
    use mockall::mock;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    mock! {
        pub SiteFs {}

        impl SiteFileSystem for SiteFs {
            fn resolve(&self, relative: &str) -> PathBuf;
        }
    }

    fn site_fs(site_templates: &Path, expected_builds: usize) -> Arc<dyn SiteFileSystem> {
        let site_templates = site_templates.to_path_buf();
        let mut fs = MockSiteFs::new();
        fs.expect_resolve()
            .withf(|relative| relative == SITE_TEMPLATES_DIR)
            .times(expected_builds)
            .returning(move |_| site_templates.clone());
        Arc::new(fs)
    }

    #[test]
    fn test_builds_chain_from_site_filesystem() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("page.txt"), "site page").unwrap();

        let manager = TemplateEngineManager::new(
            site_fs(temp.path(), 1),
            &ServerProperties::production(),
            Theme::empty(),
        );

        assert_eq!(manager.source_tiers(), vec![SourceTier::Site]);
        assert_eq!(manager.render("page.txt", &Model::new()).unwrap(), "site page");
        assert!(!manager.is_development());
    }

    #[test]
    fn test_update_theme_rebuilds_from_site_filesystem() {
        let temp = tempdir().unwrap();
        let theme_root = temp.path().join("theme");
        fs::create_dir_all(theme_root.join("templates")).unwrap();

        let manager = TemplateEngineManager::new(
            site_fs(&temp.path().join("site"), 2),
            &ServerProperties::development(),
            Theme::empty(),
        );
        manager.update_theme(Theme::new("fresh", &theme_root));

        assert_eq!(manager.theme().name(), "fresh");
        assert_eq!(manager.source_tiers(), vec![SourceTier::Site, SourceTier::Theme]);
    }

    #[test]
    fn test_invalidate_leaves_string_engine_alone() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("page.txt"), "page").unwrap();

        let manager = TemplateEngineManager::new(
            site_fs(temp.path(), 1),
            &ServerProperties::production(),
            Theme::empty(),
        );
        manager.render("page.txt", &Model::new()).unwrap();
        manager.render_from_string("inline", &Model::new()).unwrap();

        manager.invalidate_cache();
        manager.render("page.txt", &Model::new()).unwrap();
        manager.render_from_string("inline", &Model::new()).unwrap();

        let stats = manager.stats();
        assert_eq!(stats.named.compilations, 2);
        assert_eq!(stats.inline.compilations, 1);
        assert_eq!(stats.inline.cache_hits, 1);
    }

    #[test]
    fn test_invalidate_is_noop_in_development() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("page.txt"), "page").unwrap();

        let manager = TemplateEngineManager::new(
            site_fs(temp.path(), 1),
            &ServerProperties::development(),
            Theme::empty(),
        );
        manager.render("page.txt", &Model::new()).unwrap();
        manager.invalidate_cache();

        assert_eq!(manager.stats().named.cached_templates, 0);
        assert_eq!(manager.render("page.txt", &Model::new()).unwrap(), "page");
    }
}
