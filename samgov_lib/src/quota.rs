//! Upstream quota tracking and request spacing.
//!
//! [`QuotaGuard`] is a two-state machine. While `Open`, callers are spaced
//! at least `min_interval` apart. A 429 moves it to `Throttled` until a
//! resume time taken from the server's hint; calls made before then fail
//! locally without touching the network.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use samgov_api::HeaderMap;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::error::SearchError;

/// Longest throttle the guard will honor from a single 429.
pub const MAX_QUOTA_WAIT: Duration = Duration::from_secs(3600);

/// Observable quota state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QuotaState {
    pub exceeded: bool,
    pub resume_at: Option<DateTime<Utc>>,
}

struct GuardInner {
    state: QuotaState,
    last_request: Option<Instant>,
}

/// Shared quota state plus minimum-interval spacing.
///
/// Cloning is cheap and clones share state, so several clients in one
/// process can coordinate through one guard.
#[derive(Clone)]
pub struct QuotaGuard {
    inner: Arc<Mutex<GuardInner>>,
    min_interval: Duration,
    default_wait: Duration,
}

impl QuotaGuard {
    /// `default_wait` is the throttle applied when a 429 carries no usable hint.
    pub fn new(min_interval: Duration, default_wait: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(GuardInner {
                state: QuotaState::default(),
                last_request: None,
            })),
            min_interval,
            default_wait: default_wait.min(MAX_QUOTA_WAIT),
        }
    }

    /// Gate for every outbound request.
    ///
    /// Fails with [`SearchError::QuotaExceeded`] while throttled. Otherwise
    /// sleeps until `min_interval` has passed since the previous request
    /// and records this one. The lock is held across the sleep so
    /// concurrent callers are serialized.
    pub async fn before_request(&self) -> Result<(), SearchError> {
        let mut inner = self.inner.lock().await;

        if inner.state.exceeded {
            match inner.state.resume_at {
                Some(resume_at) if Utc::now() < resume_at => {
                    tracing::debug!("Rejecting request locally until {}", resume_at);
                    return Err(SearchError::quota(Some(resume_at)));
                }
                _ => {
                    tracing::info!("Quota window passed, resuming requests");
                    inner.state = QuotaState::default();
                }
            }
        }

        if let Some(last) = inner.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        inner.last_request = Some(Instant::now());
        Ok(())
    }

    /// Feeds a response back into the guard. On 429 the guard becomes
    /// throttled and the resume time is returned.
    pub async fn on_response(
        &self,
        status: u16,
        headers: &HeaderMap,
        body: &str,
    ) -> Option<DateTime<Utc>> {
        if status != 429 {
            return None;
        }
        let now = Utc::now();
        let wait = throttle_wait(headers, body, now)
            .unwrap_or(self.default_wait)
            .min(MAX_QUOTA_WAIT);
        let resume_at = now
            + chrono::Duration::from_std(wait).unwrap_or_else(|_| chrono::Duration::hours(1));
        self.throttle_until(resume_at).await;
        Some(resume_at)
    }

    /// Forces the throttled state until `resume_at`.
    pub async fn throttle_until(&self, resume_at: DateTime<Utc>) {
        let mut inner = self.inner.lock().await;
        tracing::warn!("Upstream quota exceeded, pausing until {}", resume_at);
        inner.state = QuotaState {
            exceeded: true,
            resume_at: Some(resume_at),
        };
    }

    /// Clears any throttle.
    pub async fn reset(&self) {
        self.inner.lock().await.state = QuotaState::default();
    }

    pub async fn snapshot(&self) -> QuotaState {
        self.inner.lock().await.state
    }
}

/// How long the server asked us to wait, from `Retry-After` first and the
/// body second.
pub fn throttle_wait(headers: &HeaderMap, body: &str, now: DateTime<Utc>) -> Option<Duration> {
    retry_after_wait(headers, now).or_else(|| body_resume_at(body).map(|t| until(t, now)))
}

fn retry_after_wait(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Duration> {
    let value = headers.get("retry-after")?.to_str().ok()?.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|t| until(t.with_timezone(&Utc), now))
}

fn until(t: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (t - now).to_std().unwrap_or(Duration::ZERO)
}

/// Resume time named in a 429 body: a `nextAccessTime` field, or an
/// "access API after <time>" phrase in `description`/`message`.
pub fn body_resume_at(body: &str) -> Option<DateTime<Utc>> {
    let json: Value = serde_json::from_str(body).ok()?;
    let scopes: Vec<&Value> = std::iter::once(&json).chain(json.get("error")).collect();

    for scope in &scopes {
        let field = scope
            .get("nextAccessTime")
            .and_then(Value::as_str)
            .and_then(parse_upstream_timestamp);
        if field.is_some() {
            return field;
        }
    }

    let re = resume_phrase()?;
    for scope in &scopes {
        for key in ["description", "message"] {
            let Some(text) = scope.get(key).and_then(Value::as_str) else {
                continue;
            };
            if let Some(t) = re
                .captures(text)
                .and_then(|caps| caps.get(1))
                .and_then(|m| parse_upstream_timestamp(m.as_str()))
            {
                return Some(t);
            }
        }
    }
    None
}

fn resume_phrase() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)access\s+(?:the\s+)?API\s+after\s+(.+?)\s*\.?\s*$").ok())
        .as_ref()
}

/// Parses RFC 3339, the upstream's `2024-Mar-08 00:00:00+0000 UTC`, or an HTTP-date.
pub fn parse_upstream_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s)
        .ok()
        .or_else(|| {
            DateTime::parse_from_str(s.trim_end_matches("UTC").trim(), "%Y-%b-%d %H:%M:%S%z").ok()
        })
        .or_else(|| DateTime::parse_from_rfc2822(s).ok())
        .map(|t| t.with_timezone(&Utc))
}
