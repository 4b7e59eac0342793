//! Shared query infrastructure: the [`Query`] trait and the posted-date [`DateRange`].

use chrono::{Duration, NaiveDate};
use url::Url;

/// Date format the upstream expects for `postedFrom` / `postedTo`.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Longest posted-date window the upstream accepts, in days.
pub const MAX_RANGE_DAYS: i64 = 365;

/// Trait implemented by all parameter builders.
pub trait Query {
    /// Appends this query's parameters to the given URL, returning the modified URL.
    fn add_to_url(&self, url: &Url) -> Url;
}

/// Inclusive posted-date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Window of `days_back` days ending on `to`. `days_back` is clamped into
    /// `[1, 365]`.
    pub fn ending_on(to: NaiveDate, days_back: i64) -> Self {
        let days = days_back.clamp(1, MAX_RANGE_DAYS);
        Self {
            from: to - Duration::days(days),
            to,
        }
    }

    /// Window of `days_back` days ending today (UTC).
    pub fn ending_today(days_back: i64) -> Self {
        Self::ending_on(chrono::Utc::now().date_naive(), days_back)
    }

    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        vec![
            (
                "postedFrom".to_string(),
                self.from.format(DATE_FORMAT).to_string(),
            ),
            ("postedTo".to_string(), self.to.format(DATE_FORMAT).to_string()),
        ]
    }
}
