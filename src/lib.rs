pub mod cache;
pub mod config;
pub mod fetcher;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod state;

use std::sync::Arc;

use axum::{Router, routing::get};

use crate::state::AppState;

// Build the router with all gateway routes
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/current-season", get(handlers::current_season_handler))
        .route("/api/top-anime", get(handlers::top_anime_handler))
        .route("/api/upcoming-anime", get(handlers::upcoming_anime_handler))
        .route("/api/anime/{anime_id}", get(handlers::anime_detail_handler))
        .route(
            "/api/anime/{anime_id}/characters",
            get(handlers::anime_characters_handler),
        )
        .route("/api/search", get(handlers::search_handler))
        .route("/api/news", get(handlers::news_handler))
        .route(
            "/api/hero-slideshow-images",
            get(handlers::hero_images_handler),
        )
        .route("/api/image-proxy", get(handlers::image_proxy_handler))
        .with_state(state)
}
