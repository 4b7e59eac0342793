//! Error types for the library layer.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::record::OpportunityRecord;

/// Errors returned by [`OpportunityClient`](crate::OpportunityClient).
///
/// "Nothing matched" is never an error: searches and lookups return an
/// empty list for that.
#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    /// No API key could be resolved.
    #[error("No API key configured")]
    MissingCredential,
    /// The upstream rejected the credential (HTTP 401/403). Never retried.
    #[error("Authentication failed (HTTP {status})")]
    Authentication { status: u16 },
    /// The upstream quota is exhausted, either signalled by a 429 or
    /// predicted locally from an earlier one.
    ///
    /// `partial` holds records fetched before the throttle interrupted a
    /// paginated search; it is empty when the call was rejected locally.
    #[error(
        "API quota exceeded{}",
        .resume_at.map(|t| format!("; resume after {}", t.to_rfc3339())).unwrap_or_default()
    )]
    QuotaExceeded {
        resume_at: Option<DateTime<Utc>>,
        partial: Vec<OpportunityRecord>,
    },
    /// 5xx responses persisted past the retry budget.
    #[error("Upstream server error (HTTP {status}) after {attempts} attempts")]
    Server { status: u16, attempts: u32 },
    /// Connection-level failure after the one allowed endpoint-family switch.
    #[error("Network error: {0}")]
    Network(String),
    /// The caller's deadline for the whole call elapsed.
    #[error("Call exceeded its deadline of {0:?}")]
    Timeout(Duration),
    /// A status this client has no policy for (e.g. 400, 404).
    #[error("Unexpected response status {status}")]
    UnexpectedStatus { status: u16, body: String },
    /// The upstream body was not the JSON we expected.
    #[error("Failed to parse response: {0}")]
    Parse(String),
    /// A cache write failed.
    #[error("Cache error: {0}")]
    Cache(String),
    /// Caller input failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SearchError {
    pub(crate) fn quota(resume_at: Option<DateTime<Utc>>) -> Self {
        SearchError::QuotaExceeded {
            resume_at,
            partial: Vec::new(),
        }
    }

    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            SearchError::QuotaExceeded {
                resume_at: Some(t), ..
            } => format!(
                "The SAM.gov API quota has been exceeded. Try again after {}.",
                t.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            SearchError::QuotaExceeded { resume_at: None, .. } => {
                "The SAM.gov API quota has been exceeded. Try again later.".to_string()
            }
            SearchError::Authentication { status } => format!(
                "SAM.gov rejected the API key (HTTP {}). Check that SAM_API_KEY holds a valid, active key.",
                status
            ),
            SearchError::MissingCredential => {
                "No SAM.gov API key found. Set SAM_API_KEY in the environment or a .env file."
                    .to_string()
            }
            SearchError::InvalidInput(msg) => msg.clone(),
            SearchError::Config(msg) => format!("Configuration problem: {}", msg),
            _ => "The opportunity search service is unavailable right now. Please try again later."
                .to_string(),
        }
    }

    /// True when the same call may succeed if the caller tries again later.
    pub fn is_retryable_by_caller(&self) -> bool {
        matches!(
            self,
            SearchError::QuotaExceeded { .. }
                | SearchError::Server { .. }
                | SearchError::Network(_)
                | SearchError::Timeout(_)
        )
    }

    /// Records salvaged before the error, if any.
    pub fn partial_results(&self) -> &[OpportunityRecord] {
        match self {
            SearchError::QuotaExceeded { partial, .. } => partial,
            _ => &[],
        }
    }
}

impl From<samgov_api::Error> for SearchError {
    fn from(e: samgov_api::Error) -> Self {
        match e {
            samgov_api::Error::InvalidUrl(msg) => SearchError::Config(msg),
            other => SearchError::Network(other.to_string()),
        }
    }
}
