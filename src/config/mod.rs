pub mod types;

use std::path::Path;

use crate::error::{HomestayError, Result};
use types::Config;

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        HomestayError::Config(format!(
            "failed to read config file {}: {e}",
            path.display()
        ))
    })?;
    let config: Config = serde_yml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.catalog.source.trim().is_empty() {
        return Err(HomestayError::Config("catalog.source must not be empty".into()));
    }
    let buckets = &config.search.guest_buckets;
    if buckets.is_empty() || buckets.contains(&0) {
        return Err(HomestayError::Config(
            "search.guest_buckets must list positive capacities".into(),
        ));
    }
    if buckets.windows(2).any(|w| w[0] >= w[1]) {
        return Err(HomestayError::Config(
            "search.guest_buckets must be strictly ascending".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn load_config_missing_file_returns_defaults() {
        let result = load_config(Path::new("/tmp/nonexistent_homestay_config_12345.yaml"));
        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.catalog.source, "data/homestays.json");
    }

    #[test]
    fn load_config_valid_yaml() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            "catalog:\n  source: https://example.com/h.json\n  max_retries: 5\ncache:\n  catalog_ttl_secs: 60"
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.catalog.source, "https://example.com/h.json");
        assert_eq!(config.catalog.max_retries, 5);
        assert_eq!(config.cache.catalog_ttl_secs, 60);
    }

    #[test]
    fn load_config_partial_yaml() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "search:\n  guest_buckets: [1, 3, 5]").unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.search.guest_buckets, vec![1, 3, 5]);
        // catalog and cache should get defaults
        assert_eq!(config.catalog.request_timeout_secs, 30);
        assert_eq!(config.cache.max_entries, 16);
    }

    #[test]
    fn load_config_empty_yaml() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp).unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.catalog.max_retries, 2);
        assert_eq!(config.search.guest_buckets, vec![2, 4, 6, 8]);
    }

    #[test]
    fn load_config_rejects_unsorted_buckets() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "search:\n  guest_buckets: [4, 2]").unwrap();
        let err = load_config(tmp.path()).unwrap_err();
        assert!(matches!(err, HomestayError::Config(_)));
    }

    #[test]
    fn load_config_rejects_zero_bucket() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "search:\n  guest_buckets: [0, 2]").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn load_config_invalid_yaml() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "{{{{invalid yaml: [[[").unwrap();
        let result = load_config(tmp.path());
        assert!(result.is_err());
    }
}
