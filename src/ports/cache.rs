use std::time::Duration;

/// String-keyed store for serialized catalogue payloads.
pub trait CatalogCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str, ttl: Duration);
    fn invalidate(&self, key: &str);
}
