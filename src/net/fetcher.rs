//! Blocking HTTP client for the public IP echo endpoint.

use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;
use tracing::debug;

/// Public echo service returning the caller's external address as plain text.
pub const DEFAULT_ENDPOINT: &str = "https://api.ipify.org";

/// Per-request timeout. A stalled request has to give up well before the
/// poll worker is asked to fetch again, otherwise polling stays parked on
/// a dead connection.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors from building the client or from a single fetch attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    BuildClient(#[source] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Endpoint returned HTTP {0}")]
    Status(u16),

    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Blocking client for the echo endpoint.
///
/// Owns a single [`Client`] so the connection is reused across polling
/// cycles instead of re-handshaking TLS every ten seconds.
pub struct IpFetcher {
    client: Client,
    endpoint: String,
}

impl IpFetcher {
    /// Build a fetcher against [`DEFAULT_ENDPOINT`].
    pub fn new() -> Result<Self, FetchError> {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Build a fetcher against a specific endpoint URL. Tests point this
    /// at a local listener.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(FetchError::BuildClient)?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Fetch the current external address.
    ///
    /// Returns the response body with surrounding whitespace trimmed.
    /// Non-success statuses are reported as [`FetchError::Status`].
    pub fn fetch(&self) -> Result<String, FetchError> {
        debug!("Fetching external IP...");
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .map_err(classify)?
            .error_for_status()
            .map_err(classify)?;
        let body = response.text().map_err(classify)?;
        Ok(body.trim().to_string())
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else if let Some(status) = err.status() {
        FetchError::Status(status.as_u16())
    } else {
        FetchError::Transport(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::test_http::{closed_endpoint, serve_once};

    #[test]
    fn fetch_returns_trimmed_body() {
        let endpoint = serve_once("200 OK", "93.184.216.34\n");
        let fetcher = IpFetcher::with_endpoint(endpoint).unwrap();
        assert_eq!(fetcher.fetch().unwrap(), "93.184.216.34");
    }

    #[test]
    fn error_status_is_classified() {
        let endpoint = serve_once("503 Service Unavailable", "");
        let fetcher = IpFetcher::with_endpoint(endpoint).unwrap();
        match fetcher.fetch() {
            Err(FetchError::Status(503)) => {}
            other => panic!("expected Status(503), got {other:?}"),
        }
    }

    #[test]
    fn unreachable_endpoint_is_a_transport_error() {
        let fetcher = IpFetcher::with_endpoint(closed_endpoint()).unwrap();
        match fetcher.fetch() {
            Err(FetchError::Transport(_)) => {}
            other => panic!("expected Transport, got {other:?}"),
        }
    }
}
