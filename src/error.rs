use thiserror::Error;

#[derive(Error, Debug)]
pub enum HomestayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse listing catalogue: {reason}")]
    Parse { reason: String },

    #[error("Listing catalogue not found: {source_name}")]
    CatalogNotFound { source_name: String },

    #[error("Listing not found: {id}")]
    ListingNotFound { id: String },

    #[error("Booking not found: {id}")]
    BookingNotFound { id: u64 },

    #[error("Invalid search parameters: {reason}")]
    InvalidParams { reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, HomestayError>;
