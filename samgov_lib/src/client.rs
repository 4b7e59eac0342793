//! The resilient opportunity client.
//!
//! Every outbound request goes through [`OpportunityClient::send`], which
//! applies the shared quota guard and the bounded 5xx back-off, and maps
//! statuses to [`SearchError`]. Search, lookup and attachment operations
//! live in their own modules as further `impl OpportunityClient` blocks.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use samgov_api::{ApiVersion, EndpointSet, Query, RawResponse};
use serde_json::Value;

use crate::cache::{credential_fingerprint, ResponseCache};
use crate::config::{ClientConfig, RetryPolicy};
use crate::credentials::CredentialResolver;
use crate::error::SearchError;
use crate::parser::OpportunityParser;
use crate::quota::QuotaGuard;
use crate::record::OpportunityRecord;
use crate::router::EndpointRouter;

/// Client for SAM.gov opportunity search, lookup and attachment discovery.
///
/// Cheap to share behind an `Arc`. Clients that should respect the same
/// upstream quota must share one [`QuotaGuard`] via
/// [`with_quota_guard`](Self::with_quota_guard).
pub struct OpportunityClient {
    pub(crate) api: samgov_api::Client,
    pub(crate) fingerprint: String,
    router: Mutex<EndpointRouter>,
    pub(crate) quota: QuotaGuard,
    pub(crate) cache: ResponseCache,
    pub(crate) parser: OpportunityParser,
    pub(crate) config: ClientConfig,
    retry: RetryPolicy,
}

impl OpportunityClient {
    /// Builds a client whose API key comes from `credentials`.
    ///
    /// A missing key is not an error here; operations that need the
    /// network fail with [`SearchError::MissingCredential`] instead, while
    /// cache hits still succeed.
    pub fn new(config: ClientConfig, credentials: &CredentialResolver) -> Result<Self, SearchError> {
        Self::with_api_key(&credentials.resolve_api_key(), config)
    }

    pub fn with_api_key(api_key: &str, config: ClientConfig) -> Result<Self, SearchError> {
        let api = samgov_api::Client::new(api_key.trim(), config.request_timeout())?;
        let router = EndpointRouter::new(&config.primary_base_url, &config.secondary_base_url);
        Ok(Self {
            api,
            fingerprint: credential_fingerprint(api_key.trim()),
            router: Mutex::new(router),
            quota: QuotaGuard::new(config.min_interval(), config.default_quota_wait()),
            cache: ResponseCache::new(config.cache_dir.clone(), config.cache_ttl()),
            parser: OpportunityParser::new(&config.view_base_url),
            retry: config.retry_policy(),
            config,
        })
    }

    /// Replaces this client's quota guard with a shared one.
    pub fn with_quota_guard(mut self, guard: QuotaGuard) -> Self {
        self.quota = guard;
        self
    }

    pub fn quota_guard(&self) -> &QuotaGuard {
        &self.quota
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn active_version(&self) -> ApiVersion {
        self.router.lock().unwrap_or_else(|e| e.into_inner()).version()
    }

    pub(crate) fn endpoints(&self) -> EndpointSet {
        self.router
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .active()
            .clone()
    }

    /// One-way move to the secondary family. `false` if already switched.
    pub(crate) fn switch_version(&self) -> bool {
        self.router
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .switch_version()
    }

    pub(crate) fn ensure_credential(&self) -> Result<(), SearchError> {
        if self.api.has_api_key() {
            Ok(())
        } else {
            Err(SearchError::MissingCredential)
        }
    }

    /// Parses raw records, dropping those without a usable identifier.
    pub(crate) fn parse_all(&self, raw: &[Value], endpoints: &EndpointSet) -> Vec<OpportunityRecord> {
        let parsed: Vec<OpportunityRecord> = raw
            .iter()
            .filter_map(|item| self.parser.parse(item, endpoints))
            .collect();
        if parsed.len() < raw.len() {
            tracing::debug!(
                dropped = raw.len() - parsed.len(),
                "Dropped records without an opportunity ID"
            );
        }
        parsed
    }

    /// Sends one GET through the quota guard, retrying 5xx responses.
    ///
    /// Connection failures come back as [`SearchError::Network`] without
    /// retry so the caller can decide whether to switch endpoint family.
    pub(crate) async fn send<Q: Query>(
        &self,
        url: &str,
        query: Option<&Q>,
    ) -> Result<RawResponse, SearchError> {
        let mut attempt = 0u32;
        loop {
            self.quota.before_request().await?;
            attempt += 1;
            let resp = self.api.get(url, query).await?;
            let resume_at = self
                .quota
                .on_response(resp.status, &resp.headers, &resp.body)
                .await;

            match resp.status {
                200..=299 => return Ok(resp),
                401 | 403 => {
                    tracing::error!("Credential rejected by upstream (HTTP {})", resp.status);
                    return Err(SearchError::Authentication {
                        status: resp.status,
                    });
                }
                429 => return Err(SearchError::quota(resume_at)),
                500..=599 => {
                    if attempt >= self.retry.max_attempts {
                        tracing::error!(
                            "Upstream error {} persisted after {} attempts",
                            resp.status,
                            attempt
                        );
                        return Err(SearchError::Server {
                            status: resp.status,
                            attempts: attempt,
                        });
                    }
                    let delay = self.retry.delay_for_attempt(attempt);
                    tracing::warn!(
                        "Upstream error {} (attempt {}/{}), retrying in {:.1}s",
                        resp.status,
                        attempt,
                        self.retry.max_attempts,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                }
                status => {
                    return Err(SearchError::UnexpectedStatus {
                        status,
                        body: resp.body_snippet(),
                    })
                }
            }
        }
    }
}

/// Runs `call` under an optional caller deadline. Expiry drops the call and
/// is reported as [`SearchError::Timeout`].
pub(crate) async fn within_deadline<T>(
    deadline: Option<Duration>,
    call: impl Future<Output = Result<T, SearchError>>,
) -> Result<T, SearchError> {
    match deadline {
        Some(deadline) => tokio::time::timeout(deadline, call).await.map_err(|_| {
            tracing::warn!("Call exceeded its deadline of {:?}", deadline);
            SearchError::Timeout(deadline)
        })?,
        None => call.await,
    }
}
