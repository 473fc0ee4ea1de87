pub mod cached;
pub mod catalog;
pub mod file;
pub mod http;

use std::sync::Arc;
use std::time::Duration;

use crate::config::types::{CacheConfig, CatalogConfig};
use crate::error::Result;
use crate::ports::cache::CatalogCache;
use crate::ports::listing_source::ListingSource;

/// Builds the source named by `catalog.source`, wrapped in the catalogue cache.
pub fn build_source(
    catalog: &CatalogConfig,
    cache_config: &CacheConfig,
    cache: Arc<dyn CatalogCache>,
) -> Result<Arc<dyn ListingSource>> {
    let inner: Box<dyn ListingSource> = if catalog.is_remote() {
        tracing::info!(url = %catalog.source, "Using remote listing catalogue");
        Box::new(http::HttpSource::new(catalog)?)
    } else {
        tracing::info!(path = %catalog.source, "Using local listing catalogue");
        Box::new(file::FileSource::new(&catalog.source))
    };
    Ok(Arc::new(cached::CachedSource::new(
        inner,
        cache,
        Duration::from_secs(cache_config.catalog_ttl_secs),
    )))
}
