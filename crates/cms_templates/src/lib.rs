//! # cms_templates
//!
//! Theme-aware template resolution and rendering for cms-server.
//!
//! Named templates are looked up in a fixed order, first hit wins:
//!
//! 1. the site's own `templates/` directory
//! 2. the active theme's templates (skipped for the empty theme)
//! 3. the parent theme's templates (when the theme has a parent)
//!
//! Compiled templates are cached for one minute after they are written in
//! production. Development mode disables caching and turns undefined
//! variables into errors.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cms_core::{DirectoryFileSystem, Model, ServerProperties, TemplateEngine, Theme};
//! use cms_templates::TemplateEngineManager;
//!
//! let properties = ServerProperties::load("server.yaml").unwrap();
//! let theme = Theme::new("blog", "themes/blog").with_parent(Theme::new("base", "themes/base"));
//! let manager = TemplateEngineManager::new(
//!     Arc::new(DirectoryFileSystem::new("site")),
//!     &properties,
//!     theme,
//! );
//!
//! let model = Model::new().with("title", "Hello");
//! let page = manager.render("index.html", &model).unwrap();
//! let snippet = manager.render_from_string("<h1>{{ title }}</h1>", &model).unwrap();
//! ```

pub mod engine;
pub mod error;
pub mod manager;
pub mod mock;
pub mod policy;
pub mod resolver;
pub mod source;

pub use engine::{CompiledTemplate, EngineStats, RenderEngine, RenderEngineBuilder, CACHE_FUNCTION};
pub use error::{TemplateError, TemplateResult};
pub use manager::{ManagerStats, TemplateEngineManager};
pub use policy::{CacheConfig, CachePolicy, CacheSettings, DEFAULT_MAX_CAPACITY, DEFAULT_TIME_TO_LIVE};
pub use resolver::SourceChain;
pub use source::{FileSource, LoadedTemplate, SourceTier, StringSource, TemplateEntry, TemplateSource};
