use std::collections::HashSet;

use serde::Deserialize;

use crate::domain::listing::Listing;
use crate::error::{HomestayError, Result};

#[derive(Deserialize)]
struct WrappedCatalog {
    #[serde(alias = "listings")]
    homestays: Vec<Listing>,
}

/// Decodes a catalogue document: either a bare JSON array of listings or an
/// object holding the array under `homestays` (or `listings`).
///
/// Errors carry the serde message with line and column of the offending field.
pub fn parse_catalog(json: &str) -> Result<Vec<Listing>> {
    let listings = if json.trim_start().starts_with('[') {
        serde_json::from_str::<Vec<Listing>>(json).map_err(|e| HomestayError::Parse {
            reason: format!("invalid listing array: {e}"),
        })?
    } else {
        serde_json::from_str::<WrappedCatalog>(json)
            .map_err(|e| HomestayError::Parse {
                reason: format!("expected a listing array or {{\"homestays\": [...]}}: {e}"),
            })?
            .homestays
    };

    warn_on_duplicate_ids(&listings);
    tracing::debug!(count = listings.len(), "Decoded listing catalogue");
    Ok(listings)
}

fn warn_on_duplicate_ids(listings: &[Listing]) {
    let mut seen = HashSet::new();
    for listing in listings {
        if !seen.insert(listing.id.as_str()) {
            tracing::warn!(id = %listing.id, "Duplicate listing id in catalogue");
        }
    }
}
