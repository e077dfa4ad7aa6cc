use clap::Parser;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "anihour-gateway")]
#[command(about = "Caching proxy for the Jikan anime metadata API")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 5000)]
    pub port: u16,

    // Upstream Jikan API base URL
    #[arg(short, long, default_value = "https://api.jikan.moe/v4")]
    pub jikan_url: String,

    // Upstream request timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,

    // JSON response TTL in seconds
    #[arg(long, default_value_t = 300)]
    pub cache_ttl: u64,

    // Proxied image TTL in seconds
    #[arg(long, default_value_t = 1800)]
    pub image_ttl: u64,

    // Only image URLs under this prefix may be proxied
    #[arg(long, default_value = "https://cdn.myanimelist.net/")]
    pub image_origin: String,
}
