//! Parameter builders for the search and description endpoints.

use url::Url;

use super::common::{DateRange, Query};

/// Parameters for one search-endpoint request.
///
/// Only the filters that were set are emitted. NAICS codes go to `ncode`
/// and keywords to `title`; the two are never mixed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub posted_range: Option<DateRange>,
    pub naics_codes: Vec<String>,
    pub title: Option<String>,
    pub notice_id: Option<String>,
    pub solicitation_number: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl SearchParams {
    pub fn with_posted_range(mut self, range: DateRange) -> Self {
        self.posted_range = Some(range);
        self
    }

    pub fn with_naics_code(mut self, code: &str) -> Self {
        self.naics_codes.push(code.to_string());
        self
    }

    pub fn with_naics_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.naics_codes
            .extend(codes.into_iter().map(|c| c.as_ref().to_string()));
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_notice_id(mut self, notice_id: &str) -> Self {
        self.notice_id = Some(notice_id.to_string());
        self
    }

    pub fn with_solicitation_number(mut self, solicitation_number: &str) -> Self {
        self.solicitation_number = Some(solicitation_number.to_string());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Build query parameter pairs (excluding unset values).
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(range) = self.posted_range {
            params.extend(range.to_query_pairs());
        }
        if !self.naics_codes.is_empty() {
            params.push(("ncode".to_string(), self.naics_codes.join(",")));
        }
        if let Some(ref title) = self.title {
            params.push(("title".to_string(), title.clone()));
        }
        if let Some(ref notice_id) = self.notice_id {
            params.push(("noticeid".to_string(), notice_id.clone()));
        }
        if let Some(ref solnum) = self.solicitation_number {
            params.push(("solnum".to_string(), solnum.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            params.push(("offset".to_string(), offset.to_string()));
        }

        params
    }
}

impl Query for SearchParams {
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        url.query_pairs_mut().extend_pairs(self.to_query_pairs());
        url
    }
}

/// Parameters for the description (detail) endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailParams {
    pub notice_id: String,
}

impl DetailParams {
    pub fn new(notice_id: &str) -> Self {
        Self {
            notice_id: notice_id.to_string(),
        }
    }
}

impl Query for DetailParams {
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        url.query_pairs_mut()
            .append_pair("noticeid", &self.notice_id);
        url
    }
}
