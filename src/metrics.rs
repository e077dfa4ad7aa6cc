use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("anihour_requests_total", "Total number of requests").unwrap();
    pub static ref CACHE_HITS: Counter =
        register_counter!("anihour_cache_hits_total", "Total cache hits").unwrap();
    pub static ref CACHE_MISSES: Counter =
        register_counter!("anihour_cache_misses_total", "Total cache misses").unwrap();
    pub static ref CACHE_EVICTIONS: Counter =
        register_counter!("anihour_cache_evictions_total", "Expired entries removed by cleanup").unwrap();
    pub static ref UPSTREAM_ERRORS: Counter =
        register_counter!("anihour_upstream_errors_total", "Failed upstream fetches").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "anihour_request_latency_seconds",
        "Request latency in seconds"
    )
    .unwrap();
    pub static ref CACHE_SIZE: Gauge =
        register_gauge!("anihour_cache_size", "Current number of items in cache").unwrap();
}
