use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use super::catalog::parse_catalog;
use crate::config::types::CatalogConfig;
use crate::domain::listing::Listing;
use crate::error::{HomestayError, Result};
use crate::ports::listing_source::ListingSource;

/// Fetches the catalogue JSON over HTTP, retrying transient failures.
pub struct HttpSource {
    http: Client,
    url: Url,
    max_retries: u32,
    retry_backoff: Duration,
}

impl HttpSource {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let url = Url::parse(&config.source)?;
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            url,
            max_retries: config.max_retries,
            retry_backoff: Duration::from_secs(2),
        })
    }

    /// Base delay between attempts; attempt `n` waits `n * backoff`.
    #[must_use]
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    async fn fetch_json(&self) -> Result<String> {
        let mut last_error = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.retry_backoff * attempt;
                debug!(attempt, delay_ms = delay.as_millis(), "Retrying catalogue request");
                tokio::time::sleep(delay).await;
            }

            match self.http.get(self.url.clone()).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.text().await.map_err(HomestayError::Http);
                    }
                    if status == StatusCode::NOT_FOUND {
                        return Err(HomestayError::CatalogNotFound {
                            source_name: self.url.to_string(),
                        });
                    }
                    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                        warn!(%status, attempt, "Catalogue request failed, will retry");
                        last_error = Some(HomestayError::Parse {
                            reason: format!("HTTP {status} for {}", self.url),
                        });
                        continue;
                    }
                    return Err(HomestayError::Parse {
                        reason: format!("HTTP {status} for {}", self.url),
                    });
                }
                Err(e) => {
                    warn!(error = %e, attempt, "Catalogue request failed");
                    last_error = Some(HomestayError::Http(e));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| HomestayError::Parse {
            reason: "all retries exhausted".into(),
        }))
    }
}

#[async_trait]
impl ListingSource for HttpSource {
    async fn load_listings(&self) -> Result<Vec<Listing>> {
        debug!(url = %self.url, "Fetching listing catalogue");
        let json = self.fetch_json().await?;
        parse_catalog(&json)
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}
