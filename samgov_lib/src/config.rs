//! Client configuration: defaults, optional TOML file, `SAMGOV_*` environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::Rng;
use serde::Deserialize;

use crate::error::SearchError;

/// Upper bound for any single 5xx back-off delay.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Deployment settings for an [`OpportunityClient`](crate::OpportunityClient).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Host for the primary endpoint family.
    pub primary_base_url: String,
    /// Host for the secondary endpoint family.
    pub secondary_base_url: String,
    /// Host used to build human-facing view links.
    pub view_base_url: String,
    /// Directory shared by all clients for cached result sets.
    pub cache_dir: PathBuf,
    /// Cache entry lifetime. Zero disables caching.
    pub cache_ttl_secs: u64,
    /// Minimum spacing between any two outbound requests.
    pub min_interval_ms: u64,
    /// Pause between pagination requests.
    pub page_delay_ms: u64,
    /// Total attempts per request when the upstream answers 5xx.
    pub retry_max_attempts: u32,
    pub retry_base_ms: u64,
    pub retry_max_ms: u64,
    /// Transport-level timeout for one request.
    pub request_timeout_secs: u64,
    /// Throttle duration assumed when a 429 carries no resume hint.
    pub default_quota_wait_secs: u64,
    /// NAICS code searched when the caller supplies none. Empty means no default.
    pub default_naics: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            primary_base_url: samgov_api::DEFAULT_BASE_URL.to_string(),
            secondary_base_url: samgov_api::DEFAULT_BASE_URL.to_string(),
            view_base_url: "https://sam.gov".to_string(),
            cache_dir: std::env::temp_dir().join("samgov-cache"),
            cache_ttl_secs: 3600,
            min_interval_ms: 1000,
            page_delay_ms: 500,
            retry_max_attempts: 4,
            retry_base_ms: 1000,
            retry_max_ms: 60_000,
            request_timeout_secs: 30,
            default_quota_wait_secs: 60,
            default_naics: "541511".to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Parses a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, SearchError> {
        toml::from_str(content).map_err(|e| SearchError::Config(e.to_string()))
    }

    /// Loads a TOML file, then applies environment overrides.
    pub fn from_file(path: &Path) -> Result<Self, SearchError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SearchError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_toml_str(&content)?.apply_env())
    }

    /// Overrides fields from `SAMGOV_*` variables that are set and parse.
    pub fn apply_env(mut self) -> Self {
        if let Some(v) = env_string("SAMGOV_PRIMARY_BASE_URL") {
            self.primary_base_url = v;
        }
        if let Some(v) = env_string("SAMGOV_SECONDARY_BASE_URL") {
            self.secondary_base_url = v;
        }
        if let Some(v) = env_string("SAMGOV_VIEW_BASE_URL") {
            self.view_base_url = v;
        }
        if let Some(v) = env_string("SAMGOV_CACHE_DIR") {
            self.cache_dir = PathBuf::from(v);
        }
        self.cache_ttl_secs = env_u64("SAMGOV_CACHE_TTL_SECS", self.cache_ttl_secs);
        self.min_interval_ms = env_u64("SAMGOV_MIN_INTERVAL_MS", self.min_interval_ms);
        self.page_delay_ms = env_u64("SAMGOV_PAGE_DELAY_MS", self.page_delay_ms);
        self.retry_max_attempts = env_u32("SAMGOV_RETRY_MAX", self.retry_max_attempts);
        self.retry_base_ms = env_u64("SAMGOV_RETRY_BASE_MS", self.retry_base_ms);
        self.retry_max_ms = env_u64("SAMGOV_RETRY_MAX_MS", self.retry_max_ms);
        self.request_timeout_secs =
            env_u64("SAMGOV_REQUEST_TIMEOUT_SECS", self.request_timeout_secs);
        self.default_quota_wait_secs =
            env_u64("SAMGOV_DEFAULT_QUOTA_WAIT_SECS", self.default_quota_wait_secs);
        if let Ok(v) = std::env::var("SAMGOV_DEFAULT_NAICS") {
            self.default_naics = v.trim().to_string();
        }
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn default_quota_wait(&self) -> Duration {
        Duration::from_secs(self.default_quota_wait_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_max_attempts.max(1),
            base_delay_ms: self.retry_base_ms,
            max_delay_ms: self.retry_max_ms.min(MAX_RETRY_DELAY.as_millis() as u64),
        }
    }
}

/// Bounded exponential back-off for 5xx responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based): base doubled per
    /// attempt with ±20% jitter, never above `max_delay_ms`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(30);
        let exp = 1u64 << shift;
        let base = self.base_delay_ms.saturating_mul(exp).min(self.max_delay_ms);
        let jitter = rand::thread_rng().gen_range(0.8..1.2);
        let millis = ((base as f64 * jitter) as u64).min(self.max_delay_ms);
        Duration::from_millis(millis)
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<u32>().ok())
        .unwrap_or(default)
}
