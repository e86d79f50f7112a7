//! The rendering contract the server calls into.

use crate::model::Model;
use crate::theme::Theme;

/// Template rendering as seen by the rest of the server.
///
/// Implementations are shared between request handlers, so every method
/// takes `&self`; theme updates and cache invalidation are expected to be
/// rare administrative calls.
pub trait TemplateEngine: Send + Sync {
    /// Error returned when a template cannot be resolved or rendered.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Render the template stored under `template` (a path relative to the
    /// template directories).
    fn render(&self, template: &str, model: &Model) -> Result<String, Self::Error>;

    /// Render `template` as literal template text.
    fn render_from_string(&self, template: &str, model: &Model) -> Result<String, Self::Error>;

    /// Drop every compiled template cached for named templates.
    fn invalidate_cache(&self);

    /// Switch to a new active theme.
    fn update_theme(&self, theme: Theme);
}
