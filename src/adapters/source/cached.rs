use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::listing::Listing;
use crate::error::Result;
use crate::ports::cache::CatalogCache;
use crate::ports::listing_source::ListingSource;

/// Serves the catalogue from cache, going to the wrapped source at most once per TTL.
pub struct CachedSource {
    inner: Box<dyn ListingSource>,
    cache: Arc<dyn CatalogCache>,
    ttl: Duration,
}

impl CachedSource {
    pub fn new(inner: Box<dyn ListingSource>, cache: Arc<dyn CatalogCache>, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    fn cache_key(&self) -> String {
        format!("catalog:{}", self.inner.describe())
    }
}

#[async_trait]
impl ListingSource for CachedSource {
    async fn load_listings(&self) -> Result<Vec<Listing>> {
        let key = self.cache_key();
        if let Some(cached) = self.cache.get(&key) {
            match serde_json::from_str::<Vec<Listing>>(&cached) {
                Ok(listings) => {
                    debug!(source = %self.inner.describe(), "Cache hit for listing catalogue");
                    return Ok(listings);
                }
                Err(e) => {
                    warn!(error = %e, key = %key, "Dropping unreadable cached catalogue");
                    self.cache.invalidate(&key);
                }
            }
        }

        let listings = self.inner.load_listings().await?;
        tracing::info!(
            source = %self.inner.describe(),
            count = listings.len(),
            "Loaded listing catalogue"
        );
        if let Ok(json) = serde_json::to_string(&listings) {
            self.cache.set(&key, &json, self.ttl);
        }
        Ok(listings)
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }
}
