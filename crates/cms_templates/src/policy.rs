//! Cache policy.
//!
//! The policy is a total function of the server's development flag:
//!
//! | mode        | template cache | tag cache | strict variables |
//! |-------------|----------------|-----------|------------------|
//! | development | off            | off       | on               |
//! | production  | 1 min (write)  | 1 min     | off              |

use std::time::Duration;

use cms_core::ServerProperties;
use moka::sync::Cache;

/// Expiry applied to cached entries, measured from the last write.
pub const DEFAULT_TIME_TO_LIVE: Duration = Duration::from_secs(60);

/// Upper bound on entries held by a single cache.
pub const DEFAULT_MAX_CAPACITY: u64 = 10_000;

/// Caching behaviour selected by the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    Development,
    Production,
}

impl CachePolicy {
    pub fn for_dev_mode(dev: bool) -> Self {
        if dev {
            Self::Development
        } else {
            Self::Production
        }
    }

    pub fn from_properties(properties: &ServerProperties) -> Self {
        Self::for_dev_mode(properties.dev())
    }

    pub fn is_development(self) -> bool {
        self == Self::Development
    }

    /// The engine configuration this policy prescribes.
    pub fn cache_config(self) -> CacheConfig {
        match self {
            Self::Development => CacheConfig::development(),
            Self::Production => CacheConfig::production(),
        }
    }
}

/// Settings for one write-expiring cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub time_to_live: Duration,
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            time_to_live: DEFAULT_TIME_TO_LIVE,
            max_capacity: DEFAULT_MAX_CAPACITY,
        }
    }
}

impl CacheSettings {
    pub fn with_time_to_live(mut self, time_to_live: Duration) -> Self {
        self.time_to_live = time_to_live;
        self
    }

    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    pub(crate) fn build<V>(&self) -> Cache<String, V>
    where
        V: Clone + Send + Sync + 'static,
    {
        Cache::builder()
            .max_capacity(self.max_capacity)
            .time_to_live(self.time_to_live)
            .build()
    }
}

/// Cache and evaluation settings handed to a render engine.
///
/// `None` disables the corresponding cache entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheConfig {
    pub template_cache: Option<CacheSettings>,
    pub tag_cache: Option<CacheSettings>,
    pub strict_variables: bool,
}

impl CacheConfig {
    /// No caching; undefined variables are errors.
    pub fn development() -> Self {
        Self {
            template_cache: None,
            tag_cache: None,
            strict_variables: true,
        }
    }

    /// Write-expiring template and tag caches; undefined variables render empty.
    pub fn production() -> Self {
        Self {
            template_cache: Some(CacheSettings::default()),
            tag_cache: Some(CacheSettings::default()),
            strict_variables: false,
        }
    }

    /// Replace the expiry of every enabled cache.
    pub fn with_time_to_live(mut self, time_to_live: Duration) -> Self {
        self.template_cache = self
            .template_cache
            .map(|settings| settings.with_time_to_live(time_to_live));
        self.tag_cache = self
            .tag_cache
            .map(|settings| settings.with_time_to_live(time_to_live));
        self
    }

    pub fn is_caching(&self) -> bool {
        self.template_cache.is_some() || self.tag_cache.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_policy() {
        let config = CachePolicy::from_properties(&ServerProperties::development()).cache_config();

        assert!(config.template_cache.is_none());
        assert!(config.tag_cache.is_none());
        assert!(config.strict_variables);
        assert!(!config.is_caching());
    }

    #[test]
    fn test_production_policy() {
        let config = CachePolicy::from_properties(&ServerProperties::production()).cache_config();

        let templates = config.template_cache.unwrap();
        let tags = config.tag_cache.unwrap();
        assert_eq!(templates.time_to_live, Duration::from_secs(60));
        assert_eq!(tags.time_to_live, Duration::from_secs(60));
        assert!(!config.strict_variables);
        assert!(config.is_caching());
    }

    #[test]
    fn test_with_time_to_live_leaves_disabled_caches_off() {
        let config = CacheConfig::development().with_time_to_live(Duration::from_millis(10));
        assert!(!config.is_caching());

        let config = CacheConfig::production().with_time_to_live(Duration::from_millis(10));
        assert_eq!(
            config.template_cache.map(|s| s.time_to_live),
            Some(Duration::from_millis(10))
        );
        assert_eq!(
            config.tag_cache.map(|s| s.time_to_live),
            Some(Duration::from_millis(10))
        );
    }

    #[test]
    fn test_max_capacity_bounds_cache() {
        let settings = CacheSettings::default().with_max_capacity(2);
        assert_eq!(settings.time_to_live, DEFAULT_TIME_TO_LIVE);

        let cache = settings.build::<String>();
        for n in 0..10 {
            cache.insert(format!("key-{}", n), n.to_string());
        }
        cache.run_pending_tasks();
        assert!(cache.entry_count() <= 2);
    }

    #[test]
    fn test_policy_for_dev_mode() {
        assert!(CachePolicy::for_dev_mode(true).is_development());
        assert_eq!(CachePolicy::for_dev_mode(false), CachePolicy::Production);
    }
}
