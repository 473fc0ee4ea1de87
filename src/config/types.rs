use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Where the listing catalogue comes from and how it is fetched.
///
/// `source` is either a filesystem path or an `http(s)://` URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

impl CatalogConfig {
    pub fn is_remote(&self) -> bool {
        self.source.starts_with("http://") || self.source.starts_with("https://")
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    #[serde(default = "default_catalog_ttl")]
    pub catalog_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            catalog_ttl_secs: default_catalog_ttl(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Capacity thresholds offered by the guest selector, ascending.
    #[serde(default = "default_guest_buckets")]
    pub guest_buckets: Vec<u32>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            guest_buckets: default_guest_buckets(),
        }
    }
}

fn default_source() -> String {
    "data/homestays.json".into()
}

fn default_user_agent() -> String {
    concat!("homestay-finder/", env!("CARGO_PKG_VERSION")).into()
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    2
}

fn default_max_entries() -> usize {
    16
}

fn default_catalog_ttl() -> u64 {
    3600
}

fn default_guest_buckets() -> Vec<u32> {
    vec![2, 4, 6, 8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = Config::default();
        assert_eq!(config.catalog.source, "data/homestays.json");
        assert_eq!(config.catalog.request_timeout_secs, 30);
        assert_eq!(config.catalog.max_retries, 2);
        assert!(config.catalog.user_agent.starts_with("homestay-finder/"));
        assert!(!config.catalog.is_remote());
    }

    #[test]
    fn cache_config_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.max_entries, 16);
        assert_eq!(config.catalog_ttl_secs, 3600);
    }

    #[test]
    fn search_config_defaults() {
        assert_eq!(SearchConfig::default().guest_buckets, vec![2, 4, 6, 8]);
    }

    #[test]
    fn remote_source_detection() {
        let config = CatalogConfig {
            source: "https://cdn.example.com/homestays.json".into(),
            ..Default::default()
        };
        assert!(config.is_remote());
    }

    #[test]
    fn config_serde_roundtrip() {
        let original = Config::default();
        let yaml = serde_yml::to_string(&original).unwrap();
        let restored: Config = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(restored.catalog.source, original.catalog.source);
        assert_eq!(restored.cache.max_entries, original.cache.max_entries);
        assert_eq!(restored.search.guest_buckets, original.search.guest_buckets);
    }

    #[test]
    fn config_deserialize_with_overrides() {
        let yaml = "catalog:\n  max_retries: 5";
        let config: Config = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.catalog.max_retries, 5);
        // Other fields get defaults
        assert_eq!(config.catalog.request_timeout_secs, 30);
        assert_eq!(config.cache.catalog_ttl_secs, 3600);
    }
}
