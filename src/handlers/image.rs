use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::fetcher::FetchError;
use crate::metrics::REQUEST_TOTAL;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ImageProxyParams {
    pub url: Option<String>,
}

// GET /api/image-proxy?url=...
// Relays MAL CDN cover art so the frontend stays same-origin. Only URLs
// under the configured CDN prefix are accepted.
pub async fn image_proxy_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ImageProxyParams>,
) -> Response {
    REQUEST_TOTAL.inc();

    let url = params.url.unwrap_or_default();
    if url.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Image url is required"})),
        )
            .into_response();
    }

    match state.cached_image_get(&url).await {
        Ok(img) => (
            [
                (header::CONTENT_TYPE, img.content_type),
                (
                    header::CACHE_CONTROL,
                    "public, max-age=1800".to_string(),
                ),
            ],
            img.bytes,
        )
            .into_response(),
        Err(FetchError::InvalidSource(_)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid image source"})),
        )
            .into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Failed to fetch image"})),
        )
            .into_response(),
    }
}
