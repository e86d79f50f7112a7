//! Render engines.
//!
//! A [`RenderEngine`] couples a template source with a cache configuration.
//! Engines compile templates on demand, keep compiled templates in a
//! write-expiring cache when the configuration enables one, and evaluate
//! them against a [`Model`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cms_core::Model;
use minijinja::{Environment, ErrorKind, State, UndefinedBehavior, Value};
use moka::sync::Cache;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{TemplateError, TemplateResult};
use crate::policy::CacheConfig;
use crate::source::{SourceTier, TemplateSource};

/// Template function memoising a rendered fragment in the tag cache:
/// `{{ cache("sidebar", "partials/sidebar.html") }}`.
pub const CACHE_FUNCTION: &str = "cache";

/// A template parsed and ready for evaluation.
pub struct CompiledTemplate {
    name: String,
    tier: SourceTier,
    env: Environment<'static>,
}

impl CompiledTemplate {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The tier the template body came from.
    pub fn tier(&self) -> SourceTier {
        self.tier
    }

    fn evaluate(&self, model: &Model) -> Result<String, minijinja::Error> {
        self.env.get_template(&self.name)?.render(model)
    }
}

impl fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledTemplate")
            .field("name", &self.name)
            .field("tier", &self.tier)
            .finish()
    }
}

/// Counters describing an engine's cache behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    /// Successful compilations since the engine was built.
    pub compilations: u64,
    /// Lookups answered from the template cache.
    pub cache_hits: u64,
    /// Compiled templates currently cached.
    pub cached_templates: u64,
}

/// Builds [`RenderEngine`]s from a source and a cache configuration.
///
/// `build` borrows the builder, so one configuration can produce several
/// engines over different sources.
#[derive(Debug, Clone)]
pub struct RenderEngineBuilder {
    source: Arc<dyn TemplateSource>,
    config: CacheConfig,
}

impl RenderEngineBuilder {
    pub fn source(mut self, source: Arc<dyn TemplateSource>) -> Self {
        self.source = source;
        self
    }

    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(&self) -> RenderEngine {
        RenderEngine {
            source: Arc::clone(&self.source),
            templates: self.config.template_cache.map(|settings| settings.build()),
            tags: self.config.tag_cache.map(|settings| settings.build()),
            config: self.config.clone(),
            compilations: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
        }
    }
}

/// Compiles, caches and evaluates templates from one source.
pub struct RenderEngine {
    source: Arc<dyn TemplateSource>,
    config: CacheConfig,
    templates: Option<Cache<String, Arc<CompiledTemplate>>>,
    tags: Option<Cache<String, String>>,
    compilations: AtomicU64,
    cache_hits: AtomicU64,
}

impl RenderEngine {
    /// Start building an engine over `source` with caching disabled.
    pub fn builder(source: Arc<dyn TemplateSource>) -> RenderEngineBuilder {
        RenderEngineBuilder {
            source,
            config: CacheConfig::default(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn source(&self) -> &Arc<dyn TemplateSource> {
        &self.source
    }

    pub fn is_caching(&self) -> bool {
        self.templates.is_some()
    }

    /// Render `identifier` against `model`.
    pub fn render(&self, identifier: &str, model: &Model) -> TemplateResult<String> {
        let template = self.template(identifier)?;
        template.evaluate(model).map_err(|err| {
            let shown = self.source.display_name(identifier);
            debug!("Rendering {} failed: {}", shown, err);
            TemplateError::from_engine(&shown, err, self.config.strict_variables)
        })
    }

    /// Fetch the compiled form of `identifier`, compiling it on a cache miss.
    ///
    /// Concurrent misses on the same key may both compile; the last insert wins.
    pub fn template(&self, identifier: &str) -> TemplateResult<Arc<CompiledTemplate>> {
        let Some(cache) = &self.templates else {
            return self.compile(identifier);
        };

        if let Some(hit) = cache.get(identifier) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit);
        }

        let compiled = self.compile(identifier)?;
        cache.insert(identifier.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }

    /// Drop every cached template and fragment.
    pub fn invalidate(&self) {
        if let Some(cache) = &self.templates {
            cache.invalidate_all();
        }
        if let Some(cache) = &self.tags {
            cache.invalidate_all();
        }
    }

    pub fn stats(&self) -> EngineStats {
        let cached_templates = self
            .templates
            .as_ref()
            .map(|cache| {
                cache.run_pending_tasks();
                cache.entry_count()
            })
            .unwrap_or(0);

        EngineStats {
            compilations: self.compilations.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cached_templates,
        }
    }

    fn compile(&self, identifier: &str) -> TemplateResult<Arc<CompiledTemplate>> {
        let loaded = self.source.resolve(identifier)?;
        let shown = self.source.display_name(identifier);

        let mut env = self.environment();
        if let Err(err) = env.add_template_owned(identifier.to_string(), loaded.content) {
            warn!("Failed to compile template {}: {}", shown, err);
            return Err(TemplateError::Compile {
                template: shown,
                message: format!("{:#}", err),
            });
        }

        self.compilations.fetch_add(1, Ordering::Relaxed);
        debug!("Compiled template {} from {} source", shown, loaded.tier);

        Ok(Arc::new(CompiledTemplate {
            name: identifier.to_string(),
            tier: loaded.tier,
            env,
        }))
    }

    /// A fresh environment wired to this engine's source and tag cache.
    fn environment(&self) -> Environment<'static> {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_undefined_behavior(if self.config.strict_variables {
            UndefinedBehavior::Strict
        } else {
            UndefinedBehavior::Lenient
        });

        // Includes, imports and parents resolve through the same source.
        let source = Arc::clone(&self.source);
        env.set_loader(move |name: &str| -> Result<Option<String>, minijinja::Error> {
            match source.load(name) {
                Ok(found) => Ok(found.map(|template| template.content)),
                Err(err) => Err(minijinja::Error::new(
                    ErrorKind::InvalidOperation,
                    format!("failed to load template {}: {}", name, err),
                )),
            }
        });

        let tags = self.tags.clone();
        env.add_function(
            CACHE_FUNCTION,
            move |state: &State, key: String, template: String| -> Result<String, minijinja::Error> {
                if let Some(hit) = tags.as_ref().and_then(|cache| cache.get(&key)) {
                    return Ok(hit);
                }
                let rendered = state
                    .env()
                    .get_template(&template)?
                    .render(caller_context(state))?;
                if let Some(cache) = &tags {
                    cache.insert(key, rendered.clone());
                }
                Ok(rendered)
            },
        );

        env
    }
}

/// The variables visible at the call site, so fragments see the page model.
fn caller_context(state: &State) -> BTreeMap<String, Value> {
    state
        .known_variables()
        .into_iter()
        .filter_map(|name| {
            let value = state.lookup(&name)?;
            Some((name.into_owned(), value))
        })
        .collect()
}

impl fmt::Debug for RenderEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderEngine")
            .field("source", &self.source)
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
