#![allow(dead_code)]

use std::path::Path;

use samgov_lib::ClientConfig;
use serde_json::{json, Value};

pub const PRIMARY_SEARCH: &str = "/opportunities/v2/search";
pub const SECONDARY_SEARCH: &str = "/prod/opportunities/v1/search";
pub const DETAIL: &str = "/prod/opportunities/v1/noticedesc";
pub const CLOSED_PORT: &str = "http://127.0.0.1:1";

/// Config pointing both endpoint families at `base`, with no pacing delays.
pub fn config(base: &str, cache_dir: &Path) -> ClientConfig {
    ClientConfig {
        primary_base_url: base.to_string(),
        secondary_base_url: base.to_string(),
        view_base_url: "https://sam.gov".to_string(),
        cache_dir: cache_dir.to_path_buf(),
        cache_ttl_secs: 3600,
        min_interval_ms: 0,
        page_delay_ms: 0,
        retry_max_attempts: 3,
        retry_base_ms: 1,
        retry_max_ms: 5,
        request_timeout_secs: 5,
        default_quota_wait_secs: 60,
        default_naics: "541511".to_string(),
    }
}

pub fn hex_id(n: usize) -> String {
    format!("{:032x}", n)
}

pub fn opportunity(n: usize) -> Value {
    json!({
        "opportunityId": hex_id(n),
        "noticeId": format!("N-{}", n),
        "title": format!("Opportunity {}", n),
        "postedDate": "2024-06-01",
        "naicsCode": "541511"
    })
}

pub fn page(records: Vec<Value>, total: usize) -> Value {
    json!({
        "totalRecords": total,
        "limit": records.len(),
        "offset": 0,
        "opportunitiesData": records
    })
}

pub fn page_of(range: std::ops::Range<usize>, total: usize) -> Value {
    page(range.map(opportunity).collect(), total)
}

pub fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}
