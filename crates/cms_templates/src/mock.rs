//! In-memory template source for testing.
//!
//! Records every lookup so tests can verify resolution order and observe
//! when an engine goes back to its source instead of its cache.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{TemplateError, TemplateResult};
use crate::source::{LoadedTemplate, SourceTier, TemplateEntry, TemplateSource};

/// Recording in-memory source.
///
/// Clones share state, so a test can keep one handle while an engine owns another.
#[derive(Debug, Clone)]
pub struct RecordingSource {
    tier: SourceTier,
    templates: Arc<RwLock<HashMap<String, String>>>,
    lookups: Arc<RwLock<Vec<String>>>,
    simulate_failure: Arc<RwLock<Option<String>>>,
}

impl RecordingSource {
    pub fn new(tier: SourceTier) -> Self {
        Self {
            tier,
            templates: Arc::new(RwLock::new(HashMap::new())),
            lookups: Arc::new(RwLock::new(Vec::new())),
            simulate_failure: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_template(self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.set_template(name, content);
        self
    }

    /// Add or replace a template.
    pub fn set_template(&self, name: impl Into<String>, content: impl Into<String>) {
        self.templates.write().insert(name.into(), content.into());
    }

    pub fn remove_template(&self, name: &str) {
        self.templates.write().remove(name);
    }

    /// Fail every lookup with an IO error carrying `message`.
    pub fn simulate_failure(&self, message: impl Into<String>) {
        *self.simulate_failure.write() = Some(message.into());
    }

    /// Identifiers looked up so far, in order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.read().clone()
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.read().len()
    }

    pub fn clear_lookups(&self) {
        self.lookups.write().clear();
    }
}

impl TemplateSource for RecordingSource {
    fn load(&self, identifier: &str) -> TemplateResult<Option<LoadedTemplate>> {
        self.lookups.write().push(identifier.to_string());

        if let Some(message) = self.simulate_failure.read().clone() {
            return Err(TemplateError::Io(io::Error::new(io::ErrorKind::Other, message)));
        }

        Ok(self
            .templates
            .read()
            .get(identifier)
            .map(|content| LoadedTemplate {
                name: identifier.to_string(),
                content: content.clone(),
                tier: self.tier,
            }))
    }

    fn tier(&self) -> Option<SourceTier> {
        Some(self.tier)
    }

    fn entries(&self) -> TemplateResult<Vec<TemplateEntry>> {
        Ok(self
            .templates
            .read()
            .keys()
            .map(|name| TemplateEntry {
                name: name.clone(),
                tier: self.tier,
            })
            .collect())
    }
}
