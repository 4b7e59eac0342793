//! HTTP client for the opportunities API.

use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use url::Url;

use crate::{query::Query, Error};

/// Header carrying the static API key.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Status, headers and body of one upstream response, uninterpreted.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// The body clipped to a loggable length.
    pub fn body_snippet(&self) -> String {
        truncate_body(&self.body)
    }
}

/// Thin authenticated GET client.
///
/// Sends the API key in the [`API_KEY_HEADER`] header and returns every
/// response, whatever its status, as a [`RawResponse`]. Retry, throttling
/// and fallback policy live one layer up.
pub struct Client {
    http: reqwest::Client,
    api_key: String,
}

impl Client {
    /// Creates a client with the given key and per-request timeout.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("samgov-client/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::Transport(e.to_string())
            })?;
        Ok(Self {
            http,
            api_key: api_key.into(),
        })
    }

    /// True when a non-empty API key was supplied.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    fn get_url(&self, url: &str, query: Option<&impl Query>) -> Result<Url, Error> {
        let url = Url::parse(url).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::InvalidUrl(format!("{}: {}", url, e))
        })?;
        Ok(match query {
            Some(query) => query.add_to_url(&url),
            None => url,
        })
    }

    /// Issues one GET against `url` with the query's parameters appended.
    pub async fn get<Q: Query>(&self, url: &str, query: Option<&Q>) -> Result<RawResponse, Error> {
        let url = self.get_url(url, query)?;
        tracing::debug!(url = %url, "GET");
        let resp = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Failed to get resource: {}", e);
                Error::from(e)
            })?;

        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body = resp.text().await.map_err(|e| {
            tracing::warn!("Failed to read response body: {}", e);
            Error::Body(e.to_string())
        })?;

        if !(200..300).contains(&status) {
            tracing::debug!("Upstream returned status {}: {}", status, truncate_body(&body));
        }

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}
