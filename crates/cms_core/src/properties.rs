//! Server configuration consumed by the template layer.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult};

/// Environment variable overriding the `dev` flag.
pub const DEV_ENV_VAR: &str = "CMS_DEV";

/// Server properties.
///
/// ```yaml
/// dev: true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerProperties {
    /// Development mode: templates are never cached and undefined variables fail.
    pub dev: bool,
}

impl ServerProperties {
    /// Properties for a development server.
    pub fn development() -> Self {
        Self { dev: true }
    }

    /// Properties for a production server.
    pub fn production() -> Self {
        Self { dev: false }
    }

    /// Whether the server runs in development mode.
    pub fn dev(&self) -> bool {
        self.dev
    }

    /// Parse properties from YAML text.
    pub fn from_yaml_str(content: &str) -> CoreResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load properties from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        debug!("Loading server properties from {:?}", path);
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Apply `CMS_DEV` from the process environment, if set.
    pub fn with_env_overrides(self) -> CoreResult<Self> {
        match std::env::var(DEV_ENV_VAR) {
            Ok(value) => self.with_dev_override(&value),
            Err(_) => Ok(self),
        }
    }

    /// Override the development flag from its textual form.
    pub fn with_dev_override(mut self, value: &str) -> CoreResult<Self> {
        self.dev = parse_flag(DEV_ENV_VAR, value)?;
        Ok(self)
    }
}

fn parse_flag(key: &str, value: &str) -> CoreResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(CoreError::InvalidConfig {
            key: key.to_string(),
            message: format!("expected a boolean, got '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_to_production() {
        let properties = ServerProperties::from_yaml_str("{}").unwrap();
        assert!(!properties.dev());
        assert_eq!(properties, ServerProperties::production());
    }

    #[test]
    fn test_parse_dev_flag() {
        let properties = ServerProperties::from_yaml_str("dev: true").unwrap();
        assert!(properties.dev());
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("server.yaml");
        fs::write(&path, "dev: true\n").unwrap();

        let properties = ServerProperties::load(&path).unwrap();
        assert_eq!(properties, ServerProperties::development());
    }

    #[test]
    fn test_load_missing_file() {
        let temp = tempdir().unwrap();
        let result = ServerProperties::load(temp.path().join("missing.yaml"));
        assert!(matches!(result, Err(CoreError::Io(_))));
    }

    #[test]
    fn test_dev_override() {
        let properties = ServerProperties::production().with_dev_override("TRUE").unwrap();
        assert!(properties.dev());

        let properties = properties.with_dev_override("0").unwrap();
        assert!(!properties.dev());
    }

    #[test]
    fn test_dev_override_rejects_garbage() {
        let result = ServerProperties::production().with_dev_override("maybe");
        assert!(matches!(result, Err(CoreError::InvalidConfig { .. })));
    }
}
