use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::metrics::UPSTREAM_ERRORS;
use crate::models::ImagePayload;

// Everything that can go wrong talking to upstream. None of these escape the
// gateway as panics; JSON callers only ever observe absence.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned {0}")]
    UpstreamStatus(StatusCode),

    #[error("image source not allowed: {0}")]
    InvalidSource(String),

    #[error("malformed response body")]
    MalformedResponse,
}

// Outbound HTTP client for the Jikan API. One attempt per call, no retries;
// the upstream is a best-effort public API and a miss is cheap to repeat.
pub struct Fetcher {
    client: reqwest::Client,
    base_url: String,
    image_origin: String,
}

impl Fetcher {
    pub fn new(base_url: String, image_origin: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build http client");
        Self {
            client,
            base_url,
            image_origin,
        }
    }

    // Fetch a JSON endpoint. Any failure is logged and collapsed to None;
    // the caller must already have escaped user-supplied query terms.
    pub async fn fetch_json(&self, endpoint: &str) -> Option<Value> {
        let url = format!("{}{}", self.base_url, endpoint);
        match self.fetch_json_inner(&url).await {
            Ok(data) => Some(data),
            Err(e) => {
                UPSTREAM_ERRORS.inc();
                warn!(endpoint, error = %e, "jikan fetch failed");
                None
            }
        }
    }

    async fn fetch_json_inner(&self, url: &str) -> Result<Value, FetchError> {
        let res = self.client.get(url).send().await?;
        if !res.status().is_success() {
            return Err(FetchError::UpstreamStatus(res.status()));
        }
        res.json::<Value>()
            .await
            .map_err(|_| FetchError::MalformedResponse)
    }

    // Check an image URL against the allowed CDN origin prefix. Pure, no
    // network; runs before any cache lookup or request.
    pub fn validate_source(&self, url: &str) -> Result<(), FetchError> {
        if url.starts_with(&self.image_origin) {
            Ok(())
        } else {
            Err(FetchError::InvalidSource(url.to_string()))
        }
    }

    // Fetch raw image bytes plus the upstream content type. Same timeout and
    // no-retry contract as fetch_json, but failures stay typed so the relay
    // handler can distinguish a bad source from a transient fetch error.
    pub async fn fetch_image(&self, url: &str) -> Result<ImagePayload, FetchError> {
        self.validate_source(url)?;

        let res = self.client.get(url).send().await.map_err(|e| {
            UPSTREAM_ERRORS.inc();
            warn!(url, error = %e, "image fetch failed");
            FetchError::Transport(e)
        })?;
        if !res.status().is_success() {
            UPSTREAM_ERRORS.inc();
            warn!(url, status = %res.status(), "image fetch rejected upstream");
            return Err(FetchError::UpstreamStatus(res.status()));
        }

        let content_type = res
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = res.bytes().await.map_err(|_| FetchError::MalformedResponse)?;

        debug!(url, size = bytes.len(), "image fetched");
        Ok(ImagePayload {
            bytes,
            content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> Fetcher {
        Fetcher::new(
            "https://api.jikan.moe/v4".to_string(),
            "https://cdn.myanimelist.net/".to_string(),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn validate_source_accepts_cdn_urls() {
        assert!(
            fetcher()
                .validate_source("https://cdn.myanimelist.net/images/anime/1/1.jpg")
                .is_ok()
        );
    }

    #[test]
    fn validate_source_rejects_other_origins() {
        let err = fetcher()
            .validate_source("https://evil.example/x.jpg")
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidSource(_)));
    }

    #[test]
    fn validate_source_rejects_scheme_tricks() {
        // prefix match is on the full origin, so these must all fail
        for url in [
            "http://cdn.myanimelist.net/images/x.jpg",
            "https://cdn.myanimelist.net.evil.example/x.jpg",
            "//cdn.myanimelist.net/images/x.jpg",
        ] {
            assert!(fetcher().validate_source(url).is_err(), "{url}");
        }
    }
}
