//! # cms_core
//!
//! Contracts shared between the cms-server and its template layer.
//!
//! The template layer consumes these collaborators rather than owning them:
//!
//! - **Theme**: the active theme, optionally inheriting from a parent theme
//! - **SiteFileSystem**: resolves directories under the site root
//! - **ServerProperties**: server configuration, notably the development flag
//! - **Model**: the data handed to a template at render time
//! - **TemplateEngine**: the rendering contract exposed back to the server
//!
//! # Example
//!
//! ```rust
//! use cms_core::{Model, ServerProperties, Theme};
//!
//! let properties = ServerProperties::from_yaml_str("dev: true").unwrap();
//! assert!(properties.dev());
//!
//! let theme = Theme::new("blog", "themes/blog").with_parent(Theme::new("base", "themes/base"));
//! assert_eq!(theme.parent().map(Theme::name), Some("base"));
//!
//! let model = Model::new().with("title", "Hello");
//! assert_eq!(model.len(), 1);
//! ```

pub mod engine;
pub mod error;
pub mod filesystem;
pub mod model;
pub mod properties;
pub mod theme;

pub use engine::TemplateEngine;
pub use error::{CoreError, CoreResult};
pub use filesystem::{DirectoryFileSystem, SiteFileSystem, SITE_TEMPLATES_DIR};
pub use model::Model;
pub use properties::{ServerProperties, DEV_ENV_VAR};
pub use theme::{Theme, THEME_TEMPLATES_DIR};
