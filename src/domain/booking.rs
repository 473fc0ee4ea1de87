use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::listing::{CURRENCY_SYMBOL, Listing};
use super::search_query::{GuestCount, SearchQuery};
use crate::error::{HomestayError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: u64,
    pub listing_id: String,
    pub title: String,
    pub location: String,
    pub price_per_night: f64,
    pub booked_at: DateTime<Utc>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: Option<GuestCount>,
}

impl Booking {
    pub fn nights(&self) -> Option<i64> {
        match (self.check_in, self.check_out) {
            (Some(check_in), Some(check_out)) if check_out > check_in => {
                Some((check_out - check_in).num_days())
            }
            _ => None,
        }
    }

    #[allow(clippy::cast_precision_loss)] // stays are a handful of nights
    pub fn total_price(&self) -> Option<f64> {
        self.nights().map(|n| self.price_per_night * n as f64)
    }
}

impl std::fmt::Display for Booking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} {} - {} ({CURRENCY_SYMBOL}{}/night",
            self.id, self.title, self.location, self.price_per_night
        )?;
        if let (Some(check_in), Some(check_out)) = (self.check_in, self.check_out) {
            write!(f, ", {check_in} to {check_out}")?;
        }
        if let Some(total) = self.total_price() {
            write!(f, ", total {CURRENCY_SYMBOL}{total:.0}")?;
        }
        if let Some(guests) = self.guests {
            write!(
                f,
                ", {} adults, {} children",
                guests.adults, guests.children
            )?;
        }
        write!(f, ") booked {}", self.booked_at.format("%Y-%m-%d"))
    }
}

#[derive(Debug)]
struct LedgerState {
    next_id: u64,
    bookings: Vec<Booking>,
}

/// In-memory booking list held for the lifetime of the session.
///
/// Ids start at 1 and are never reused, even after a cancellation.
#[derive(Debug)]
pub struct BookingLedger {
    state: RwLock<LedgerState>,
}

impl Default for BookingLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingLedger {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LedgerState {
                next_id: 1,
                bookings: Vec::new(),
            }),
        }
    }

    pub fn book(&self, listing: &Listing, stay: &SearchQuery) -> Result<Booking> {
        stay.validate()?;
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let booking = Booking {
            id: state.next_id,
            listing_id: listing.id.clone(),
            title: listing.title.clone(),
            location: listing.location.clone(),
            price_per_night: listing.price,
            booked_at: Utc::now(),
            check_in: stay.check_in,
            check_out: stay.check_out,
            guests: stay.guests,
        };
        state.next_id += 1;
        state.bookings.push(booking.clone());
        Ok(booking)
    }

    pub fn cancel(&self, id: u64) -> Result<Booking> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let pos = state
            .bookings
            .iter()
            .position(|b| b.id == id)
            .ok_or(HomestayError::BookingNotFound { id })?;
        Ok(state.bookings.remove(pos))
    }

    pub fn list(&self) -> Vec<Booking> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .bookings
            .clone()
    }

    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .bookings
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::make_listing;

    fn stay(query: &str) -> SearchQuery {
        SearchQuery::parse(query).unwrap()
    }

    #[test]
    fn book_assigns_increasing_ids() {
        let ledger = BookingLedger::new();
        let a = ledger.book(&make_listing("h1", 2000.0), &SearchQuery::default()).unwrap();
        let b = ledger.book(&make_listing("h2", 3000.0), &SearchQuery::default()).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn booking_copies_listing_and_stay() {
        let ledger = BookingLedger::new();
        let booking = ledger
            .book(
                &make_listing("h1", 2000.0),
                &stay("checkIn=2025-06-01&checkOut=2025-06-04&guests=2,1"),
            )
            .unwrap();
        assert_eq!(booking.listing_id, "h1");
        assert_eq!(booking.nights(), Some(3));
        assert_eq!(booking.total_price(), Some(6000.0));
        assert_eq!(booking.guests.map(GuestCount::total), Some(3));
    }

    #[test]
    fn booking_without_dates_has_no_total() {
        let ledger = BookingLedger::new();
        let booking = ledger.book(&make_listing("h1", 2000.0), &SearchQuery::default()).unwrap();
        assert_eq!(booking.nights(), None);
        assert_eq!(booking.total_price(), None);
    }

    #[test]
    fn invalid_stay_is_rejected() {
        let ledger = BookingLedger::new();
        let result = ledger.book(&make_listing("h1", 2000.0), &stay("checkIn=2025-06-04"));
        assert!(matches!(result, Err(HomestayError::InvalidParams { .. })));
        assert!(ledger.is_empty());
    }

    #[test]
    fn cancel_removes_booking() {
        let ledger = BookingLedger::new();
        let a = ledger.book(&make_listing("h1", 2000.0), &SearchQuery::default()).unwrap();
        let b = ledger.book(&make_listing("h2", 3000.0), &SearchQuery::default()).unwrap();
        let cancelled = ledger.cancel(a.id).unwrap();
        assert_eq!(cancelled.listing_id, "h1");
        let remaining = ledger.list();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, b.id);
    }

    #[test]
    fn cancel_unknown_id_fails() {
        let ledger = BookingLedger::new();
        let err = ledger.cancel(42).unwrap_err();
        assert!(matches!(err, HomestayError::BookingNotFound { id: 42 }));
    }

    #[test]
    fn ids_not_reused_after_cancel() {
        let ledger = BookingLedger::new();
        let a = ledger.book(&make_listing("h1", 2000.0), &SearchQuery::default()).unwrap();
        ledger.cancel(a.id).unwrap();
        let b = ledger.book(&make_listing("h1", 2000.0), &SearchQuery::default()).unwrap();
        assert_eq!(b.id, 2);
    }

    #[test]
    fn booking_display() {
        let ledger = BookingLedger::new();
        let booking = ledger
            .book(
                &make_listing("h1", 2000.0),
                &stay("checkIn=2025-06-01&checkOut=2025-06-03&guests=2,0"),
            )
            .unwrap();
        let s = booking.to_string();
        assert!(s.starts_with("#1 "));
        assert!(s.contains("2025-06-01 to 2025-06-03"));
        assert!(s.contains("total ₹4000"));
        assert!(s.contains("2 adults, 0 children"));
    }

    #[test]
    fn concurrent_bookings_get_unique_ids() {
        use std::sync::Arc;
        let ledger = Arc::new(BookingLedger::new());
        let mut handles = Vec::new();
        for i in 0..10 {
            let l = Arc::clone(&ledger);
            handles.push(std::thread::spawn(move || {
                l.book(&make_listing(&format!("h{i}"), 1000.0), &SearchQuery::default())
                    .unwrap()
                    .id
            }));
        }
        let mut ids: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    }
}
