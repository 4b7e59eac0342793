//! Direct lookup by notice ID, opportunity ID or view URL.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use samgov_api::types::SearchEnvelope;
use samgov_api::{DateRange, DetailParams, EndpointSet, SearchParams};
use serde_json::{Map, Value};

use crate::cache::lookup_key;
use crate::client::{within_deadline, OpportunityClient};
use crate::error::SearchError;
use crate::query::LookupId;
use crate::record::{is_opportunity_id, OpportunityRecord};
use crate::validation::validate_id;

/// Posted-date window for lookups; the widest the upstream accepts.
const LOOKUP_DAYS_BACK: i64 = 365;
/// Result cap for lookups made outside a search query.
const LOOKUP_LIMIT: u32 = 100;

impl OpportunityClient {
    /// Records whose notice ID matches `id`. Not found is `Ok(vec![])`.
    pub async fn by_notice_id(&self, id: &str) -> Result<Vec<OpportunityRecord>, SearchError> {
        self.lookup(&LookupId::Notice(id.to_string()), LOOKUP_LIMIT)
            .await
    }

    /// Records whose opportunity ID matches `id`. Not found is `Ok(vec![])`.
    pub async fn by_opportunity_id(
        &self,
        id: &str,
    ) -> Result<Vec<OpportunityRecord>, SearchError> {
        self.lookup(&LookupId::Opportunity(id.to_string()), LOOKUP_LIMIT)
            .await
    }

    /// Looks up a raw identifier of unknown kind. See [`classify_id`].
    pub async fn by_any_id(&self, raw: &str) -> Result<Vec<OpportunityRecord>, SearchError> {
        let id = classify_id(&validate_id(raw)?);
        self.lookup(&id, LOOKUP_LIMIT).await
    }

    /// [`OpportunityClient::by_notice_id`] bounded by `deadline`; expiry is
    /// [`SearchError::Timeout`].
    pub async fn by_notice_id_with_deadline(
        &self,
        id: &str,
        deadline: Duration,
    ) -> Result<Vec<OpportunityRecord>, SearchError> {
        within_deadline(Some(deadline), self.by_notice_id(id)).await
    }

    pub async fn by_opportunity_id_with_deadline(
        &self,
        id: &str,
        deadline: Duration,
    ) -> Result<Vec<OpportunityRecord>, SearchError> {
        within_deadline(Some(deadline), self.by_opportunity_id(id)).await
    }

    pub async fn by_any_id_with_deadline(
        &self,
        raw: &str,
        deadline: Duration,
    ) -> Result<Vec<OpportunityRecord>, SearchError> {
        within_deadline(Some(deadline), self.by_any_id(raw)).await
    }

    pub(crate) async fn lookup(
        &self,
        id: &LookupId,
        limit: u32,
    ) -> Result<Vec<OpportunityRecord>, SearchError> {
        let (kind, raw) = match id {
            LookupId::Notice(raw) => ("notice", raw),
            LookupId::Opportunity(raw) => ("opportunity", raw),
        };
        let value = validate_id(raw)?;
        let id = match id {
            LookupId::Notice(_) => LookupId::Notice(value.clone()),
            LookupId::Opportunity(_) => LookupId::Opportunity(value.clone()),
        };

        let key = lookup_key(kind, &value, &self.fingerprint);
        if let Some(entry) = self.cache.get_entry(&key) {
            if entry.covers(limit) {
                let mut cached = entry.results;
                cached.truncate(limit as usize);
                return Ok(cached);
            }
        }

        self.ensure_credential()?;

        let results = loop {
            let endpoints = self.endpoints();
            match self.lookup_uncached(&id, limit, &endpoints).await {
                Err(SearchError::Network(msg)) => {
                    if !self.switch_version() {
                        return Err(SearchError::Network(msg));
                    }
                    tracing::warn!("Network failure on {}: {}; retrying lookup", endpoints.version, msg);
                }
                other => break other?,
            }
        };

        if results.is_empty() {
            tracing::info!("No opportunity found for {} ID {}", kind, value);
        } else if let Err(e) = self.cache.put_limited(
            &key,
            &results,
            (results.len() >= limit as usize).then_some(limit),
        ) {
            tracing::warn!("Failed to cache lookup results: {}", e);
        }
        Ok(results)
    }

    async fn lookup_uncached(
        &self,
        id: &LookupId,
        limit: u32,
        endpoints: &EndpointSet,
    ) -> Result<Vec<OpportunityRecord>, SearchError> {
        let value = match id {
            LookupId::Notice(v) | LookupId::Opportunity(v) => v.as_str(),
        };
        let params = SearchParams::default()
            .with_posted_range(DateRange::ending_today(LOOKUP_DAYS_BACK))
            .with_notice_id(value)
            .with_limit(limit);
        let resp = self.send(&endpoints.search_url, Some(&params)).await?;
        let envelope: SearchEnvelope = resp
            .json()
            .map_err(|e| SearchError::Parse(format!("lookup of {}: {}", value, e)))?;
        let parsed = self.parse_all(&envelope.into_records(), endpoints);

        let mut matches = select_matches(parsed, value);
        if !matches.is_empty() {
            matches.truncate(limit as usize);
            return Ok(matches);
        }

        tracing::debug!(id = value, "No search match, trying the description endpoint");
        Ok(self.detail_record(id, endpoints).await?.into_iter().collect())
    }

    /// Synthesizes a record from the description endpoint.
    async fn detail_record(
        &self,
        id: &LookupId,
        endpoints: &EndpointSet,
    ) -> Result<Option<OpportunityRecord>, SearchError> {
        let value = match id {
            LookupId::Notice(v) | LookupId::Opportunity(v) => v.as_str(),
        };
        let params = DetailParams::new(value);
        let resp = match self.send(&endpoints.detail_url, Some(&params)).await {
            Ok(resp) => resp,
            Err(SearchError::UnexpectedStatus { status: 404, .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        let body: Value = resp
            .json()
            .map_err(|e| SearchError::Parse(format!("description of {}: {}", value, e)))?;

        let Some(raw) = detail_payload(&body, id) else {
            return Ok(None);
        };
        let Some(mut record) = self.parser.parse(&Value::Object(raw), endpoints) else {
            return Ok(None);
        };
        if record.attachments.is_empty() {
            record.attachments = self.metadata_attachments(&record, endpoints).await?;
        }
        Ok(Some(record))
    }
}

/// Classifies a raw identifier: a 32-hex opportunity ID, a link containing
/// one, or otherwise a notice ID.
pub fn classify_id(raw: &str) -> LookupId {
    let trimmed = raw.trim();
    if is_opportunity_id(trimmed) {
        return LookupId::Opportunity(trimmed.to_string());
    }
    if trimmed.contains("://") || trimmed.contains('/') {
        if let Some(m) = embedded_opportunity_id().and_then(|re| re.captures(trimmed)) {
            return LookupId::Opportunity(m[1].to_string());
        }
    }
    LookupId::Notice(trimmed.to_string())
}

fn embedded_opportunity_id() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:^|[/=])([0-9a-fA-F]{32})(?:$|[/?#&])").ok())
        .as_ref()
}

/// Keeps records whose notice or opportunity ID matches `id`,
/// case-insensitively. Exact matches win over substring matches.
pub(crate) fn select_matches(records: Vec<OpportunityRecord>, id: &str) -> Vec<OpportunityRecord> {
    let needle = id.to_lowercase();
    let ids = |r: &OpportunityRecord| -> Vec<String> {
        let mut ids = vec![r.opportunity_id.to_lowercase()];
        if let Some(n) = &r.notice_id {
            ids.push(n.to_lowercase());
        }
        ids
    };

    let (exact, rest): (Vec<_>, Vec<_>) = records
        .into_iter()
        .partition(|r| ids(r).iter().any(|candidate| *candidate == needle));
    if !exact.is_empty() {
        return exact;
    }
    rest.into_iter()
        .filter(|r| ids(r).iter().any(|candidate| candidate.contains(&needle)))
        .collect()
}

/// The record object inside a description response, with the looked-up ID
/// filled in where the body omits it.
fn detail_payload(body: &Value, id: &LookupId) -> Option<Map<String, Value>> {
    let candidate = body
        .get("opportunitiesData")
        .and_then(|data| data.get(0))
        .unwrap_or(body);
    let mut map = candidate.as_object()?.clone();
    let has_content = ["description", "title", "opportunityId", "noticeId"]
        .iter()
        .any(|key| map.get(*key).is_some_and(|v| !v.is_null()));
    if !has_content {
        return None;
    }

    let (key, value) = match id {
        LookupId::Notice(v) => ("noticeId", v),
        LookupId::Opportunity(v) => ("opportunityId", v),
    };
    map.entry(key.to_string())
        .or_insert_with(|| Value::String(value.clone()));
    map.entry("opportunityId".to_string())
        .or_insert_with(|| Value::String(value.clone()));
    Some(map)
}
