use crate::config::HttpConfig;
use crate::error::{Result, ScraperError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use std::time::Duration;
use tracing::{debug, instrument};

/// Source of rendered page HTML.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Plain HTTP GET with browser-like headers.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(&config.user_agent)?);
        headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { client })
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ScraperError::Config(format!("invalid header value '{value}': {e}")))
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<String> {
        if !is_valid_url(url) {
            return Err(ScraperError::InvalidUrl(url.to_string()));
        }
        let response = self.client.get(url.trim()).send().await?.error_for_status()?;
        let body = response.text().await?;
        debug!("Fetched {} bytes", body.len());
        Ok(body)
    }
}

/// Non-empty and starting with http:// or https://.
pub fn is_valid_url(url: &str) -> bool {
    let url = url.trim();
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_validation() {
        assert!(is_valid_url("https://fbref.com/en/players/x"));
        assert!(is_valid_url("  http://example.com "));
        assert!(!is_valid_url(""));
        assert!(!is_valid_url("fbref.com/en"));
        assert!(!is_valid_url("ftp://example.com"));
    }

    #[test]
    fn builds_client_from_defaults() {
        assert!(HttpFetcher::new(&HttpConfig::default()).is_ok());
    }

    #[test]
    fn rejects_header_with_newline() {
        let config = HttpConfig {
            user_agent: "bad\nagent".into(),
            ..HttpConfig::default()
        };
        assert!(matches!(HttpFetcher::new(&config), Err(ScraperError::Config(_))));
    }

    #[tokio::test]
    async fn invalid_url_is_not_requested() {
        let fetcher = HttpFetcher::new(&HttpConfig::default()).unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, ScraperError::InvalidUrl(_)));
    }
}
