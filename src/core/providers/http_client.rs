use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub fn build_http_client() -> Client {
    build_http_client_with_timeout(DEFAULT_TIMEOUT_SECS)
}

/// Shared client settings. `timeout_secs` bounds each read rather than the
/// whole request so long streamed replies are not cut off.
pub fn build_http_client_with_timeout(timeout_secs: u64) -> Client {
    Client::builder()
        .read_timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}
