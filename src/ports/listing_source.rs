use async_trait::async_trait;

use crate::domain::listing::Listing;
use crate::error::Result;

/// Supplies the full listing catalogue, already decoded.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn load_listings(&self) -> Result<Vec<Listing>>;

    /// Human-readable origin, used in logs and cache keys.
    fn describe(&self) -> String;
}
