//! Error types for templates.

use minijinja::ErrorKind;
use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while resolving or rendering a template.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template {template} failed to compile: {message}")]
    Compile { template: String, message: String },

    #[error("Undefined variable in template {template}: {message}")]
    StrictVariable { template: String, message: String },

    #[error("Template rendering failed for {template}: {message}")]
    Render { template: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Core error: {0}")]
    Core(#[from] cms_core::CoreError),
}

impl TemplateError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Classify a failure reported by the rendering engine for `template`.
    ///
    /// Undefined values are only a `StrictVariable` error under strict
    /// variables; lenient engines report them as plain render failures.
    pub(crate) fn from_engine(template: &str, err: minijinja::Error, strict: bool) -> Self {
        let message = format!("{:#}", err);
        match err.kind() {
            ErrorKind::TemplateNotFound => Self::NotFound(message),
            ErrorKind::SyntaxError => Self::Compile {
                template: template.to_string(),
                message,
            },
            ErrorKind::UndefinedError if strict => Self::StrictVariable {
                template: template.to_string(),
                message,
            },
            _ => Self::Render {
                template: template.to_string(),
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_engine_errors() {
        let err = TemplateError::from_engine(
            "page.html",
            minijinja::Error::new(ErrorKind::UndefinedError, "title is undefined"),
            true,
        );
        assert!(matches!(err, TemplateError::StrictVariable { ref template, .. } if template == "page.html"));

        let err = TemplateError::from_engine(
            "page.html",
            minijinja::Error::new(ErrorKind::UndefinedError, "title is undefined"),
            false,
        );
        assert!(matches!(err, TemplateError::Render { ref template, .. } if template == "page.html"));

        let err = TemplateError::from_engine(
            "page.html",
            minijinja::Error::new(ErrorKind::SyntaxError, "unexpected end of input"),
            true,
        );
        assert!(matches!(err, TemplateError::Compile { .. }));

        let err = TemplateError::from_engine(
            "page.html",
            minijinja::Error::new(ErrorKind::TemplateNotFound, "partial.html"),
            false,
        );
        assert!(err.is_not_found());

        let err = TemplateError::from_engine(
            "page.html",
            minijinja::Error::new(ErrorKind::InvalidOperation, "cannot add"),
            true,
        );
        assert!(matches!(err, TemplateError::Render { .. }));
    }
}
