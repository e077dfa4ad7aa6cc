use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::metrics::{REQUEST_LATENCY, REQUEST_TOTAL};
use crate::models::{HeroImage, NewsItem};
use crate::state::AppState;

type ApiError = (StatusCode, Json<Value>);

fn error_500(message: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
}

// Fetch one upstream endpoint through the cache and map absence to the
// uniform 500 error body
async fn fetch_endpoint(
    state: &AppState,
    endpoint: &str,
    error_message: &str,
) -> Result<Json<Value>, ApiError> {
    REQUEST_TOTAL.inc();
    let start = Instant::now();
    let data = state.cached_json_get(endpoint).await;
    REQUEST_LATENCY.observe(start.elapsed().as_secs_f64());

    data.map(Json).ok_or_else(|| error_500(error_message))
}

// GET /api/current-season
pub async fn current_season_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    fetch_endpoint(&state, "/seasons/now", "Failed to fetch current season anime").await
}

#[derive(Deserialize)]
pub struct TopAnimeParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

// GET /api/top-anime?type=tv
pub async fn top_anime_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TopAnimeParams>,
) -> Result<Json<Value>, ApiError> {
    let kind = params.kind.unwrap_or_else(|| "tv".to_string());
    let endpoint = format!("/top/anime?type={}&limit=25", urlencoding::encode(&kind));
    fetch_endpoint(&state, &endpoint, "Failed to fetch top anime").await
}

// GET /api/upcoming-anime
pub async fn upcoming_anime_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    fetch_endpoint(&state, "/seasons/upcoming", "Failed to fetch upcoming anime").await
}

// GET /api/anime/{anime_id}
pub async fn anime_detail_handler(
    State(state): State<Arc<AppState>>,
    Path(anime_id): Path<u32>,
) -> Result<Json<Value>, ApiError> {
    let endpoint = format!("/anime/{anime_id}/full");
    fetch_endpoint(&state, &endpoint, "Failed to fetch anime details").await
}

// GET /api/anime/{anime_id}/characters
pub async fn anime_characters_handler(
    State(state): State<Arc<AppState>>,
    Path(anime_id): Path<u32>,
) -> Result<Json<Value>, ApiError> {
    let endpoint = format!("/anime/{anime_id}/characters");
    fetch_endpoint(&state, &endpoint, "Failed to fetch anime characters").await
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

// GET /api/search?q=...
// An absent or empty query is a 400 before the cache is ever consulted.
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, ApiError> {
    let query = params.q.unwrap_or_default();
    if query.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Search query is required"})),
        ));
    }

    let endpoint = format!("/anime?q={}&limit=20", urlencoding::encode(&query));
    fetch_endpoint(&state, &endpoint, "Failed to search anime").await
}

// GET /api/news
// Jikan has no news feed, so the top-anime listing is reshaped into one.
pub async fn news_handler(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let data = fetch_endpoint(&state, "/top/anime?limit=10", "Failed to fetch anime news").await?;

    let news: Vec<NewsItem> = data
        .0["data"]
        .as_array()
        .map(|list| list.iter().take(10).map(NewsItem::from_anime).collect())
        .unwrap_or_default();
    Ok(Json(json!({ "data": news })))
}

// GET /api/hero-slideshow-images
// Cover art for the frontend hero slideshow, drawn from the current season.
pub async fn hero_images_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let data = fetch_endpoint(&state, "/seasons/now", "Failed to fetch slideshow images").await?;

    let images: Vec<HeroImage> = data
        .0["data"]
        .as_array()
        .map(|list| {
            list.iter()
                .take(10)
                .filter_map(HeroImage::from_anime)
                .collect()
        })
        .unwrap_or_default();

    Ok((
        [(header::CACHE_CONTROL, "public, max-age=300")],
        Json(json!({ "images": images })),
    ))
}
