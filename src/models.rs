use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

// Proxied image - raw bytes plus the upstream content type
#[derive(Clone, Debug)]
pub struct ImagePayload {
    pub bytes: Bytes,
    pub content_type: String,
}

// News item synthesized from the top-anime listing
#[derive(Serialize, Clone)]
pub struct NewsItem {
    pub title: String,
    pub excerpt: String,
    pub url: String,
    pub date: String,
    pub author_username: String,
}

impl NewsItem {
    // Build a news item from one anime object of a /top/anime response
    pub fn from_anime(anime: &Value) -> Self {
        let title = anime["title"].as_str().unwrap_or("Unknown");
        let excerpt = match anime["synopsis"].as_str() {
            Some(s) => {
                let cut: String = s.chars().take(200).collect();
                format!("{}...", cut)
            }
            None => "No description available.".to_string(),
        };
        Self {
            title: format!("Top Anime: {}", title),
            excerpt,
            url: anime["url"].as_str().unwrap_or("#").to_string(),
            date: anime["aired"]["from"]
                .as_str()
                .unwrap_or("2025-01-01")
                .to_string(),
            author_username: "MyAnimeList".to_string(),
        }
    }
}

// Hero slideshow entry pulled from the current season listing
#[derive(Serialize, Clone)]
pub struct HeroImage {
    pub title: String,
    pub image_url: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl HeroImage {
    // Returns None when the anime object carries no large cover image
    pub fn from_anime(anime: &Value) -> Option<Self> {
        let image_url = anime["images"]["jpg"]["large_image_url"].as_str()?;
        Some(Self {
            title: anime["title"].as_str().unwrap_or("").to_string(),
            image_url: image_url.to_string(),
            kind: "current".to_string(),
        })
    }
}
