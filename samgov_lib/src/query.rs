//! Caller-facing search query.

use std::time::Duration;

/// Allowed range for [`OpportunitySearchQuery::days_back`].
pub const DAYS_BACK_RANGE: (u32, u32) = (1, 365);
/// Allowed range for [`OpportunitySearchQuery::limit`].
pub const LIMIT_RANGE: (u32, u32) = (1, 10_000);
/// Allowed range for [`OpportunitySearchQuery::page_size`].
pub const PAGE_SIZE_RANGE: (u32, u32) = (1, 1_000);

/// Identifier for a direct lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupId {
    Notice(String),
    Opportunity(String),
}

/// Filters for one search.
///
/// Numeric fields are clamped by their builders, so an instance always
/// holds in-range values. When a notice or opportunity ID is set the query
/// is a direct lookup and every other filter is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpportunitySearchQuery {
    keywords: Option<String>,
    naics_codes: Vec<String>,
    days_back: u32,
    limit: u32,
    page_size: u32,
    notice_id: Option<String>,
    opportunity_id: Option<String>,
    deadline: Option<Duration>,
}

impl Default for OpportunitySearchQuery {
    fn default() -> Self {
        Self {
            keywords: None,
            naics_codes: Vec::new(),
            days_back: 30,
            limit: 100,
            page_size: 100,
            notice_id: None,
            opportunity_id: None,
            deadline: None,
        }
    }
}

impl OpportunitySearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Free-text keyword filter. Blank input clears it.
    pub fn with_keywords(mut self, keywords: &str) -> Self {
        let trimmed = keywords.trim();
        self.keywords = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn with_naics_code(mut self, code: &str) -> Self {
        let code = code.trim();
        if !code.is_empty() {
            self.naics_codes.push(code.to_string());
        }
        self
    }

    pub fn with_naics_codes<I, S>(self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        codes
            .into_iter()
            .fold(self, |q, code| q.with_naics_code(code.as_ref()))
    }

    pub fn with_days_back(mut self, days_back: i64) -> Self {
        self.days_back = clamp(days_back, DAYS_BACK_RANGE);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = clamp(limit, LIMIT_RANGE);
        self
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = clamp(page_size, PAGE_SIZE_RANGE);
        self
    }

    pub fn with_notice_id(mut self, notice_id: &str) -> Self {
        let trimmed = notice_id.trim();
        self.notice_id = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn with_opportunity_id(mut self, opportunity_id: &str) -> Self {
        let trimmed = opportunity_id.trim();
        self.opportunity_id = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Bounds the whole call, including sleeps and retries.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn keywords(&self) -> Option<&str> {
        self.keywords.as_deref()
    }

    pub fn naics_codes(&self) -> &[String] {
        &self.naics_codes
    }

    pub fn days_back(&self) -> u32 {
        self.days_back
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// The direct-lookup ID, if this query is one. An opportunity ID takes
    /// precedence over a notice ID.
    pub fn direct_id(&self) -> Option<LookupId> {
        match (&self.opportunity_id, &self.notice_id) {
            (Some(id), _) => Some(LookupId::Opportunity(id.clone())),
            (None, Some(id)) => Some(LookupId::Notice(id.clone())),
            (None, None) => None,
        }
    }
}

fn clamp(value: i64, (lo, hi): (u32, u32)) -> u32 {
    value.clamp(lo as i64, hi as i64) as u32
}
