use std::time::Duration;

use serde_json::Value;

use crate::cache::{Cache, CachedValue, image_key};
use crate::config::Args;
use crate::fetcher::{FetchError, Fetcher};
use crate::models::ImagePayload;

// App's shared state: the upstream client and the response cache, plus the
// per-class TTLs. Constructed once at startup and handed to every handler.
pub struct AppState {
    pub fetcher: Fetcher,
    pub cache: Cache,
    pub json_ttl: Duration,
    pub image_ttl: Duration,
}

impl AppState {
    pub fn new(fetcher: Fetcher, json_ttl: Duration, image_ttl: Duration) -> Self {
        Self {
            fetcher,
            cache: Cache::new(),
            json_ttl,
            image_ttl,
        }
    }

    pub fn from_args(args: &Args) -> Self {
        let fetcher = Fetcher::new(
            args.jikan_url.clone(),
            args.image_origin.clone(),
            Duration::from_secs(args.timeout),
        );
        Self::new(
            fetcher,
            Duration::from_secs(args.cache_ttl),
            Duration::from_secs(args.image_ttl),
        )
    }

    // Cached JSON endpoint fetch. The endpoint string (path plus query, query
    // terms already escaped) doubles as the cache key.
    pub async fn cached_json_get(&self, endpoint: &str) -> Option<Value> {
        let fetcher = &self.fetcher;
        self.cache
            .get_or_fetch(endpoint, self.json_ttl, move || async move {
                fetcher.fetch_json(endpoint).await.map(CachedValue::Json)
            })
            .await?
            .into_json()
    }

    // Cached image relay. The origin allowlist is enforced before any cache
    // lookup or network call; fetch failures keep their type so the handler
    // can tell a bad source from a transient upstream error.
    pub async fn cached_image_get(&self, url: &str) -> Result<ImagePayload, FetchError> {
        self.fetcher.validate_source(url)?;

        let key = image_key(url);
        let mut fetch_err = None;
        let err_slot = &mut fetch_err;
        let fetcher = &self.fetcher;
        let got = self
            .cache
            .get_or_fetch(&key, self.image_ttl, move || async move {
                match fetcher.fetch_image(url).await {
                    Ok(img) => Some(CachedValue::Image(img)),
                    Err(e) => {
                        *err_slot = Some(e);
                        None
                    }
                }
            })
            .await;

        match got.and_then(CachedValue::into_image) {
            Some(img) => Ok(img),
            None => Err(fetch_err.unwrap_or(FetchError::MalformedResponse)),
        }
    }
}
