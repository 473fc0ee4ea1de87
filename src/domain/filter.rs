//! The listing filter/sort engine.
//!
//! Everything here is a pure function of its inputs: no I/O, no logging, no
//! interior state. The result for identical inputs is always identical,
//! including the order of ties.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::criteria::{FilterCriteria, PriceRange, SortMode};
use super::listing::Listing;

/// Filter `listings` by `criteria` and return the survivors in display order.
///
/// Stages run in a fixed order (text, price, guests, amenities, instant) and
/// the sort is stable, so listings with equal keys keep their input order.
/// The input slice is left untouched.
pub fn evaluate(listings: &[Listing], criteria: &FilterCriteria) -> Vec<Listing> {
    let mut results: Vec<&Listing> = match criteria.normalized_query() {
        Some(query) => match_text(listings, &query),
        None => listings.iter().collect(),
    };

    results.retain(|l| criteria.price_range.contains(l.price));

    if let Some(min_guests) = criteria.min_guest_capacity {
        results.retain(|l| l.max_guests().is_some_and(|g| g >= min_guests));
    }

    if !criteria.required_amenities.is_empty() {
        results.retain(|l| {
            criteria
                .required_amenities
                .iter()
                .all(|amenity| l.has_amenity(amenity))
        });
    }

    if criteria.instant_only {
        results.retain(|l| l.instant_bookable);
    }

    sort_listings(&mut results, criteria.sort_mode);
    results.into_iter().cloned().collect()
}

/// Two-phase text match over an already case-folded, non-empty query.
///
/// An exact location match wins outright; the substring search over title,
/// location and description only runs when no location equals the query.
fn match_text<'a>(listings: &'a [Listing], query: &str) -> Vec<&'a Listing> {
    let exact: Vec<&Listing> = listings
        .iter()
        .filter(|l| l.location.to_lowercase() == query)
        .collect();
    if !exact.is_empty() {
        return exact;
    }

    listings
        .iter()
        .filter(|l| {
            l.title.to_lowercase().contains(query)
                || l.location.to_lowercase().contains(query)
                || l.description.to_lowercase().contains(query)
        })
        .collect()
}

fn sort_listings(results: &mut [&Listing], mode: SortMode) {
    // slice::sort_by is stable
    match mode {
        SortMode::PriceAscending => results.sort_by(|a, b| ascending(a.price, b.price)),
        SortMode::PriceDescending => results.sort_by(|a, b| descending(a.price, b.price)),
        SortMode::RatingDescending => {
            results.sort_by(|a, b| descending(a.rating.unwrap_or(0.0), b.rating.unwrap_or(0.0)));
        }
        SortMode::Recommended => {
            results.sort_by(|a, b| descending(a.recommended_score(), b.recommended_score()));
        }
    }
}

// Adding 0.0 folds -0.0 into 0.0 so the two tie under total_cmp.
fn ascending(a: f64, b: f64) -> Ordering {
    (a + 0.0).total_cmp(&(b + 0.0))
}

fn descending(a: f64, b: f64) -> Ordering {
    ascending(b, a)
}

/// Union of every amenity tag in the collection, for populating filter chips.
pub fn collect_amenity_vocabulary(listings: &[Listing]) -> BTreeSet<String> {
    listings
        .iter()
        .flat_map(|l| l.amenities.iter().cloned())
        .collect()
}

/// Lowest and highest nightly price in the collection.
pub fn price_bounds(listings: &[Listing]) -> Option<PriceRange> {
    let mut prices = listings.iter().map(|l| l.price);
    let first = prices.next()?;
    let (min, max) = prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
    Some(PriceRange::new(min, max))
}
