use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use super::catalog::parse_catalog;
use crate::domain::listing::Listing;
use crate::error::{HomestayError, Result};
use crate::ports::listing_source::ListingSource;

/// Reads the catalogue from a JSON file on disk.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ListingSource for FileSource {
    async fn load_listings(&self) -> Result<Vec<Listing>> {
        debug!(path = %self.path.display(), "Reading listing catalogue");
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => HomestayError::CatalogNotFound {
                    source_name: self.describe(),
                },
                _ => HomestayError::Io(e),
            })?;
        parse_catalog(&json)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[tokio::test]
    async fn loads_catalogue_from_disk() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(
            tmp,
            r#"[{{"id": 1, "title": "Casa Azul", "location": "Goa", "price": 2500}}]"#
        )
        .unwrap();
        let source = FileSource::new(tmp.path());
        let listings = source.load_listings().await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].title, "Casa Azul");
    }

    #[tokio::test]
    async fn missing_file_is_catalog_not_found() {
        let source = FileSource::new("/tmp/nonexistent_homestays_98765.json");
        let err = source.load_listings().await.unwrap_err();
        assert!(matches!(err, HomestayError::CatalogNotFound { .. }));
        assert!(err.to_string().contains("nonexistent_homestays_98765"));
    }

    #[tokio::test]
    async fn invalid_json_is_parse_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "not json").unwrap();
        let err = FileSource::new(tmp.path()).load_listings().await.unwrap_err();
        assert!(matches!(err, HomestayError::Parse { .. }));
    }
}
