use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HomestayError;

/// Closed price interval, inclusive on both ends.
///
/// `min > max` is allowed and simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub const ANY: Self = Self {
        min: f64::NEG_INFINITY,
        max: f64::INFINITY,
    };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }

    pub fn is_unbounded(&self) -> bool {
        *self == Self::ANY
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::ANY
    }
}

impl std::fmt::Display for PriceRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use super::listing::CURRENCY_SYMBOL;
        match (self.min.is_finite(), self.max.is_finite()) {
            (true, true) => {
                write!(f, "{CURRENCY_SYMBOL}{} - {CURRENCY_SYMBOL}{}", self.min, self.max)
            }
            (true, false) => write!(f, "{CURRENCY_SYMBOL}{}+", self.min),
            (false, true) => write!(f, "up to {CURRENCY_SYMBOL}{}", self.max),
            (false, false) => f.write_str("any price"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    #[default]
    Recommended,
    #[serde(alias = "price-low")]
    PriceAscending,
    #[serde(alias = "price-high")]
    PriceDescending,
    #[serde(alias = "rating")]
    RatingDescending,
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recommended => "recommended",
            Self::PriceAscending => "price-ascending",
            Self::PriceDescending => "price-descending",
            Self::RatingDescending => "rating-descending",
        }
    }
}

impl FromStr for SortMode {
    type Err = HomestayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "recommended" => Ok(Self::Recommended),
            "price-ascending" | "price-low" => Ok(Self::PriceAscending),
            "price-descending" | "price-high" => Ok(Self::PriceDescending),
            "rating-descending" | "rating" => Ok(Self::RatingDescending),
            other => Err(HomestayError::InvalidParams {
                reason: format!(
                    "unknown sort mode '{other}', expected one of recommended, price-ascending, price-descending, rating-descending"
                ),
            }),
        }
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter and sort configuration for one evaluation of the listing engine.
///
/// Treated as an immutable value: the `with_*` methods consume and return a
/// new criteria instead of mutating shared state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterCriteria {
    pub text_query: String,
    pub price_range: PriceRange,
    pub required_amenities: BTreeSet<String>,
    pub instant_only: bool,
    pub min_guest_capacity: Option<u32>,
    pub sort_mode: SortMode,
}

impl FilterCriteria {
    #[must_use]
    pub fn with_text_query(mut self, query: impl Into<String>) -> Self {
        self.text_query = query.into();
        self
    }

    #[must_use]
    pub fn with_price_range(mut self, min: f64, max: f64) -> Self {
        self.price_range = PriceRange::new(min, max);
        self
    }

    #[must_use]
    pub fn with_amenities<I, S>(mut self, amenities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_amenities = amenities.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_instant_only(mut self, instant_only: bool) -> Self {
        self.instant_only = instant_only;
        self
    }

    #[must_use]
    pub fn with_min_guests(mut self, guests: Option<u32>) -> Self {
        self.min_guest_capacity = guests;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort_mode: SortMode) -> Self {
        self.sort_mode = sort_mode;
        self
    }

    /// The case-folded, trimmed query; `None` when the text stage is inactive.
    pub fn normalized_query(&self) -> Option<String> {
        let query = self.text_query.trim().to_lowercase();
        (!query.is_empty()).then_some(query)
    }

    /// True when anything differs from the default criteria.
    pub fn has_active_filters(&self) -> bool {
        self.normalized_query().is_some()
            || !self.price_range.is_unbounded()
            || !self.required_amenities.is_empty()
            || self.instant_only
            || self.min_guest_capacity.is_some()
            || self.sort_mode != SortMode::Recommended
    }
}

impl std::fmt::Display for FilterCriteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if let Some(query) = self.normalized_query() {
            parts.push(format!("query \"{query}\""));
        }
        if !self.price_range.is_unbounded() {
            parts.push(format!("price {}", self.price_range));
        }
        if let Some(guests) = self.min_guest_capacity {
            parts.push(format!("{guests}+ guests"));
        }
        if !self.required_amenities.is_empty() {
            let amenities: Vec<&str> = self.required_amenities.iter().map(String::as_str).collect();
            parts.push(format!("amenities [{}]", amenities.join(", ")));
        }
        if self.instant_only {
            parts.push("instant booking only".into());
        }
        parts.push(format!("sorted by {}", self.sort_mode));
        f.write_str(&parts.join(", "))
    }
}
