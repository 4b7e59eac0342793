//! Error types for the API client.

/// Transport-level failures.
///
/// HTTP error statuses are not errors at this layer; they come back inside
/// [`RawResponse`](crate::RawResponse) so callers can apply their own policy.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// The connection could not be established (refused, reset, DNS failure).
    #[error("Connection failed: {0}")]
    Connect(String),
    /// The transport-level request timeout elapsed.
    #[error("Request timed out")]
    Timeout,
    /// Any other failure while sending the request.
    #[error("Request failed: {0}")]
    Transport(String),
    /// The response body could not be read.
    #[error("Failed to read response body: {0}")]
    Body(String),
}

impl Error {
    /// True for failures that happened on the wire rather than in request construction.
    pub fn is_network(&self) -> bool {
        !matches!(self, Error::InvalidUrl(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout
        } else if e.is_connect() {
            Error::Connect(e.to_string())
        } else if e.is_body() || e.is_decode() {
            Error::Body(e.to_string())
        } else {
            Error::Transport(e.to_string())
        }
    }
}
