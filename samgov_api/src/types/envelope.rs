use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pagination envelope returned by both search endpoint families.
///
/// Records are kept as raw JSON; normalization happens in the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEnvelope {
    #[serde(default)]
    pub total_records: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub opportunities_data: Option<Vec<Value>>,
}

impl SearchEnvelope {
    /// The page's records; a missing or `null` list is an empty page.
    pub fn into_records(self) -> Vec<Value> {
        self.opportunities_data.unwrap_or_default()
    }
}
