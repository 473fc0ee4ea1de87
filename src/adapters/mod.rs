pub mod cache;
pub mod source;
