use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::criteria::FilterCriteria;
use crate::error::{HomestayError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCount {
    pub adults: u32,
    pub children: u32,
}

impl GuestCount {
    pub fn total(self) -> u32 {
        self.adults.saturating_add(self.children)
    }

    /// Parses the `adults,children` form; missing parts count as zero.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = raw.split(',').map(str::trim);
        let adults = parse_count(parts.next(), raw)?;
        let children = parse_count(parts.next(), raw)?;
        if parts.next().is_some() {
            return Err(HomestayError::InvalidParams {
                reason: format!("invalid guests '{raw}', expected 'adults,children'"),
            });
        }
        Ok(Self { adults, children })
    }
}

fn parse_count(part: Option<&str>, raw: &str) -> Result<u32> {
    match part {
        None | Some("") => Ok(0),
        Some(n) => n.parse().map_err(|_| HomestayError::InvalidParams {
            reason: format!("invalid guests '{raw}', expected 'adults,children'"),
        }),
    }
}

impl std::fmt::Display for GuestCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.adults, self.children)
    }
}

/// The query string the listing page is opened with, e.g.
/// `?q=Goa&checkIn=2025-06-01&checkOut=2025-06-05&guests=2,1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub destination: String,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: Option<GuestCount>,
}

impl SearchQuery {
    /// Unknown keys are ignored; when a key repeats, the first value wins.
    pub fn parse(query_string: &str) -> Result<Self> {
        let raw = query_string.trim().trim_start_matches('?');
        let mut destination = None;
        let mut check_in = None;
        let mut check_out = None;
        let mut guests = None;

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "q" if destination.is_none() => destination = Some(value.into_owned()),
                "checkIn" if check_in.is_none() => check_in = parse_date(&value, "checkIn")?,
                "checkOut" if check_out.is_none() => check_out = parse_date(&value, "checkOut")?,
                "guests" if guests.is_none() && !value.trim().is_empty() => {
                    guests = Some(GuestCount::parse(&value)?);
                }
                _ => {}
            }
        }

        Ok(Self {
            destination: destination.unwrap_or_default(),
            check_in,
            check_out,
            guests,
        })
    }

    /// Builds a query from already-separated fields, e.g. tool parameters.
    pub fn from_parts(
        destination: Option<&str>,
        check_in: Option<&str>,
        check_out: Option<&str>,
        guests: Option<GuestCount>,
    ) -> Result<Self> {
        Ok(Self {
            destination: destination.unwrap_or_default().to_string(),
            check_in: check_in.map_or(Ok(None), |d| parse_date(d, "checkIn"))?,
            check_out: check_out.map_or(Ok(None), |d| parse_date(d, "checkOut"))?,
            guests,
        })
    }

    pub fn validate(&self) -> Result<()> {
        match (self.check_in, self.check_out) {
            (Some(check_in), Some(check_out)) if check_out <= check_in => {
                Err(HomestayError::InvalidParams {
                    reason: "checkOut date must be after checkIn date".into(),
                })
            }
            (Some(_), None) | (None, Some(_)) => Err(HomestayError::InvalidParams {
                reason: "both checkIn and checkOut must be provided together".into(),
            }),
            _ => Ok(()),
        }
    }

    pub fn nights(&self) -> Option<i64> {
        match (self.check_in, self.check_out) {
            (Some(check_in), Some(check_out)) if check_out > check_in => {
                Some((check_out - check_in).num_days())
            }
            _ => None,
        }
    }

    /// Seeds default criteria with the destination and the rounded guest bucket.
    pub fn to_criteria(&self, guest_buckets: &[u32]) -> FilterCriteria {
        let min_guests = self
            .guests
            .and_then(|g| guest_bucket(g.total(), guest_buckets));
        FilterCriteria::default()
            .with_text_query(self.destination.clone())
            .with_min_guests(min_guests)
    }

    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        if !self.destination.is_empty() {
            serializer.append_pair("q", &self.destination);
        }
        if let Some(check_in) = self.check_in {
            serializer.append_pair("checkIn", &check_in.format(DATE_FORMAT).to_string());
        }
        if let Some(check_out) = self.check_out {
            serializer.append_pair("checkOut", &check_out.format(DATE_FORMAT).to_string());
        }
        if let Some(guests) = self.guests.filter(|g| g.total() > 0) {
            serializer.append_pair("guests", &guests.to_string());
        }
        serializer.finish()
    }
}

fn parse_date(value: &str, key: &str) -> Result<Option<NaiveDate>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(Some)
        .map_err(|_| HomestayError::InvalidParams {
            reason: format!("invalid {key} date format '{value}', expected YYYY-MM-DD"),
        })
}

/// Rounds a guest total up to the nearest capacity bucket.
///
/// Totals beyond the largest bucket clamp to it; a zero total means no
/// capacity filter at all.
pub fn guest_bucket(total: u32, buckets: &[u32]) -> Option<u32> {
    if total == 0 {
        return None;
    }
    buckets
        .iter()
        .copied()
        .find(|&b| b >= total)
        .or_else(|| buckets.last().copied())
}
