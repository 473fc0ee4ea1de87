pub mod booking;
pub mod criteria;
pub mod destination;
pub mod filter;
pub mod listing;
pub mod search_query;
