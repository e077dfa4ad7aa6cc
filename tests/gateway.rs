//! Integration tests driving the gateway core against a wiremock upstream.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use anihour_gateway::fetcher::{FetchError, Fetcher};
use anihour_gateway::handlers::{current_season_handler, news_handler, search_handler};
use anihour_gateway::state::AppState;

fn test_state(upstream: &MockServer, image_origin: &str) -> AppState {
    let fetcher = Fetcher::new(
        upstream.uri(),
        image_origin.to_string(),
        Duration::from_secs(2),
    );
    AppState::new(
        fetcher,
        Duration::from_secs(300),
        Duration::from_secs(1800),
    )
}

#[tokio::test]
async fn repeated_json_get_hits_upstream_once() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/seasons/now"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": [{"title": "Example"}]})),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let state = test_state(&upstream, "https://cdn.myanimelist.net/");

    let first = state.cached_json_get("/seasons/now").await.unwrap();
    let second = state.cached_json_get("/seasons/now").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first["data"][0]["title"], "Example");
}

#[tokio::test]
async fn upstream_error_yields_absence_and_is_not_cached() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/seasons/now"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&upstream)
        .await;

    let state = test_state(&upstream, "https://cdn.myanimelist.net/");

    // both calls reach upstream; the failure is never stored
    assert!(state.cached_json_get("/seasons/now").await.is_none());
    assert!(state.cached_json_get("/seasons/now").await.is_none());
    assert!(state.cache.is_empty());
}

#[tokio::test]
async fn malformed_body_yields_absence() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/seasons/now"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&upstream)
        .await;

    let state = test_state(&upstream, "https://cdn.myanimelist.net/");
    assert!(state.cached_json_get("/seasons/now").await.is_none());
}

#[tokio::test]
async fn upstream_timeout_yields_absence() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/seasons/now"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": []}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&upstream)
        .await;

    let fetcher = Fetcher::new(
        upstream.uri(),
        "https://cdn.myanimelist.net/".to_string(),
        Duration::from_millis(200),
    );
    let state = AppState::new(
        fetcher,
        Duration::from_secs(300),
        Duration::from_secs(1800),
    );
    assert!(state.cached_json_get("/seasons/now").await.is_none());
}

#[tokio::test]
async fn image_relay_rejects_foreign_origins_without_network() {
    let upstream = MockServer::start().await;
    let state = test_state(&upstream, "https://cdn.myanimelist.net/");

    let err = state
        .cached_image_get("https://evil.example/x.jpg")
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::InvalidSource(_)));
    assert!(state.cache.is_empty());
    // no request ever left the gateway
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn image_relay_caches_bytes_and_content_type() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/images/anime/1/1.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"\x89PNG-fake".to_vec())
                .insert_header("content-type", "image/png"),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let origin = format!("{}/", upstream.uri());
    let state = test_state(&upstream, &origin);
    let url = format!("{}/images/anime/1/1.jpg", upstream.uri());

    let first = state.cached_image_get(&url).await.unwrap();
    let second = state.cached_image_get(&url).await.unwrap();
    assert_eq!(first.bytes, second.bytes);
    assert_eq!(first.content_type, "image/png");
    assert_eq!(state.cache.len(), 1);
}

#[tokio::test]
async fn image_fetch_failure_is_not_cached() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/images/anime/1/1.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&upstream)
        .await;

    let origin = format!("{}/", upstream.uri());
    let state = test_state(&upstream, &origin);
    let url = format!("{}/images/anime/1/1.jpg", upstream.uri());

    for _ in 0..2 {
        let err = state.cached_image_get(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::UpstreamStatus(_)));
    }
    assert!(state.cache.is_empty());
}

#[tokio::test]
async fn search_without_query_is_rejected_before_the_core() {
    let upstream = MockServer::start().await;
    let state = Arc::new(test_state(&upstream, "https://cdn.myanimelist.net/"));

    for q in [None, Some(String::new())] {
        let err = search_handler(
            State(state.clone()),
            Query(anihour_gateway::handlers::SearchParams { q }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert_eq!(err.1.0["error"], "Search query is required");
    }
    // the core was never consulted
    assert!(state.cache.is_empty());
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn search_escapes_the_query_term() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/anime"))
        .and(query_param("q", "fullmetal alchemist"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&upstream)
        .await;

    let state = Arc::new(test_state(&upstream, "https://cdn.myanimelist.net/"));
    let result = search_handler(
        State(state),
        Query(anihour_gateway::handlers::SearchParams {
            q: Some("fullmetal alchemist".to_string()),
        }),
    )
    .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn news_listing_is_synthesized_from_top_anime() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/top/anime"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "title": "Example",
                "synopsis": "A story.",
                "url": "https://myanimelist.net/anime/1",
                "aired": {"from": "2020-04-01T00:00:00+00:00"}
            }]
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let state = Arc::new(test_state(&upstream, "https://cdn.myanimelist.net/"));
    let news = news_handler(State(state)).await.unwrap();
    assert_eq!(news.0["data"][0]["title"], "Top Anime: Example");
    assert_eq!(news.0["data"][0]["author_username"], "MyAnimeList");
    assert_eq!(news.0["data"][0]["date"], "2020-04-01T00:00:00+00:00");
}

#[tokio::test]
async fn handler_maps_absence_to_500_error_body() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/seasons/now"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&upstream)
        .await;

    let state = Arc::new(test_state(&upstream, "https://cdn.myanimelist.net/"));
    let err = current_season_handler(State(state)).await.unwrap_err();
    assert_eq!(err.0, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.1.0["error"], "Failed to fetch current season anime");
}
