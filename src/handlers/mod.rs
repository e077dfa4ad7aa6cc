mod api;
mod health;
mod image;
mod metrics;

pub use api::{
    SearchParams, TopAnimeParams, anime_characters_handler, anime_detail_handler,
    current_season_handler, hero_images_handler, news_handler, search_handler, top_anime_handler,
    upcoming_anime_handler,
};
pub use health::health_handler;
pub use image::image_proxy_handler;
pub use metrics::metrics_handler;
