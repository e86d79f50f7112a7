//! Render-time data model.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Values handed to a template when it is rendered.
///
/// The template layer only borrows the model; it is never copied or
/// rewritten before evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Model {
    pub values: HashMap<String, Value>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<HashMap<String, Value>> for Model {
    fn from(values: HashMap<String, Value>) -> Self {
        Self { values }
    }
}
