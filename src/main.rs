use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use anihour_gateway::{app, config::Args, state::AppState};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let state = Arc::new(AppState::from_args(&args));
    let router = app(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    tracing::info!(port = args.port, upstream = %args.jikan_url, "gateway listening");
    tracing::info!(
        json_ttl = args.cache_ttl,
        image_ttl = args.image_ttl,
        timeout = args.timeout,
        "cache configured"
    );
    axum::serve(listener, router).await.unwrap();
}
