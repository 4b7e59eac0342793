//! Filtered keyword / NAICS search with pagination.

use chrono::NaiveDate;
use samgov_api::types::SearchEnvelope;
use samgov_api::{DateRange, EndpointSet, SearchParams};
use serde_json::Value;

use crate::cache::search_key;
use crate::client::{within_deadline, OpportunityClient};
use crate::error::SearchError;
use crate::query::OpportunitySearchQuery;
use crate::record::OpportunityRecord;
use crate::validation::{validate_keywords, validate_naics};

impl OpportunityClient {
    /// Runs a search, or a direct lookup when the query carries an ID.
    ///
    /// Nothing matching is `Ok(vec![])`. When a 429 interrupts pagination
    /// the error is [`SearchError::QuotaExceeded`] carrying the records
    /// fetched so far; those are never cached.
    pub async fn search(
        &self,
        query: &OpportunitySearchQuery,
    ) -> Result<Vec<OpportunityRecord>, SearchError> {
        within_deadline(query.deadline(), self.search_inner(query)).await
    }

    async fn search_inner(
        &self,
        query: &OpportunitySearchQuery,
    ) -> Result<Vec<OpportunityRecord>, SearchError> {
        if let Some(id) = query.direct_id() {
            return self.lookup(&id, query.limit()).await;
        }

        let query = match query.keywords().map(validate_keywords).transpose()? {
            Some(keywords) => query.clone().with_keywords(&keywords),
            None => query.clone(),
        };
        for code in query.naics_codes() {
            validate_naics(code)?;
        }

        let key = search_key(&query, &self.fingerprint);
        if let Some(entry) = self.cache.get_entry(&key) {
            if entry.covers(query.limit()) {
                let mut cached = entry.results;
                cached.truncate(query.limit() as usize);
                return Ok(cached);
            }
            tracing::debug!(
                cached_limit = ?entry.truncated_at,
                limit = query.limit(),
                "Cached result set is smaller than the requested limit"
            );
        }

        self.ensure_credential()?;

        let fetched = loop {
            let endpoints = self.endpoints();
            match self.fetch_all_pages(&query, &endpoints).await {
                Err(SearchError::Network(msg)) => {
                    if !self.switch_version() {
                        return Err(SearchError::Network(msg));
                    }
                    tracing::warn!("Network failure on {}: {}; retrying search", endpoints.version, msg);
                }
                other => break other?,
            }
        };

        let truncated_at = (!fetched.complete).then(|| query.limit());
        if let Err(e) = self.cache.put_limited(&key, &fetched.records, truncated_at) {
            tracing::warn!("Failed to cache search results: {}", e);
        }
        Ok(fetched.records)
    }

    /// Walks the result pages for `query` against one endpoint family.
    async fn fetch_all_pages(
        &self,
        query: &OpportunitySearchQuery,
        endpoints: &EndpointSet,
    ) -> Result<FetchedPages, SearchError> {
        let base = build_search_params(
            query,
            &self.config.default_naics,
            chrono::Utc::now().date_naive(),
        );
        let limit = query.limit() as usize;
        let page_size = query.page_size();
        let mut raw: Vec<Value> = Vec::new();
        let mut offset = 0u32;

        let exhausted = loop {
            let params = base.clone().with_limit(page_size).with_offset(offset);
            let resp = match self.send(&endpoints.search_url, Some(&params)).await {
                Ok(resp) => resp,
                Err(SearchError::QuotaExceeded { resume_at, .. }) => {
                    raw.truncate(limit);
                    let partial = self.parse_all(&raw, endpoints);
                    tracing::warn!(
                        "Quota exceeded after {} records, returning partial results",
                        partial.len()
                    );
                    return Err(SearchError::QuotaExceeded { resume_at, partial });
                }
                Err(e) => return Err(e),
            };

            let envelope: SearchEnvelope = resp
                .json()
                .map_err(|e| SearchError::Parse(format!("search page at offset {}: {}", offset, e)))?;
            let total = envelope.total_records;
            let page = envelope.into_records();
            let returned = page.len();
            raw.extend(page);
            tracing::debug!(offset, returned, total = ?total, "Fetched search page");

            let reached_total = total.is_some_and(|t| raw.len() as u64 >= t);
            let exhausted = returned < page_size as usize || reached_total;
            if exhausted || raw.len() >= limit {
                break exhausted;
            }

            offset = offset.saturating_add(page_size);
            tokio::time::sleep(self.config.page_delay()).await;
        };

        let complete = exhausted && raw.len() <= limit;
        raw.truncate(limit);
        Ok(FetchedPages {
            records: self.parse_all(&raw, endpoints),
            complete,
        })
    }
}

/// Result of walking the pages of one search.
struct FetchedPages {
    records: Vec<OpportunityRecord>,
    /// False when the walk stopped at the caller's limit with upstream
    /// records left over.
    complete: bool,
}

/// Upstream parameters for a filtered search, without pagination.
///
/// The posted-date window is always present. Keywords only ever go to the
/// title filter and NAICS codes only to `ncode`; `default_naics` is used
/// when the query has no codes.
pub(crate) fn build_search_params(
    query: &OpportunitySearchQuery,
    default_naics: &str,
    today: NaiveDate,
) -> SearchParams {
    let mut params = SearchParams::default()
        .with_posted_range(DateRange::ending_on(today, query.days_back() as i64));

    if query.naics_codes().is_empty() {
        if !default_naics.trim().is_empty() {
            params = params.with_naics_code(default_naics.trim());
        }
    } else {
        params = params.with_naics_codes(query.naics_codes());
    }

    if let Some(keywords) = query.keywords() {
        params = params.with_title(keywords);
    }
    params
}
