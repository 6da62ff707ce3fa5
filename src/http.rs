// src/http.rs
// HTTP client construction for health probes and the AI Service

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::warn;

/// Connect timeout shared by every client
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for local probes: no default request timeout, callers set their own
pub fn create_probe_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// JSON client with an optional bearer token
pub fn create_service_client(timeout: Duration, auth_token: Option<&str>) -> reqwest::Client {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(token) = auth_token {
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("AI_SERVICE_AUTH_TOKEN contains invalid header characters, ignoring"),
        }
    }

    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT)
        .default_headers(headers)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_clients() {
        drop(create_probe_client());
        drop(create_service_client(Duration::from_secs(1), Some("token")));
        // Newlines are not valid header bytes
        drop(create_service_client(Duration::from_secs(1), Some("bad\ntoken")));
    }
}
