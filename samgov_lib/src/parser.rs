//! Normalization of raw upstream records into [`OpportunityRecord`]s.

use samgov_api::EndpointSet;
use serde_json::{Map, Value};

use crate::attachments::inline_attachments;
use crate::record::{is_opportunity_id, OpportunityRecord};

/// Converts raw search/detail records into canonical records.
///
/// Records that cannot be addressed later (no opportunity ID and no 32-hex
/// notice ID) are dropped: every downstream detail or attachment lookup
/// would fail for them.
#[derive(Debug, Clone)]
pub struct OpportunityParser {
    view_base_url: String,
}

impl OpportunityParser {
    pub fn new(view_base_url: &str) -> Self {
        Self {
            view_base_url: view_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Parses one raw record. `endpoints` is used to build download URLs for
    /// attachments listed only by resource ID.
    pub fn parse(&self, raw: &Value, endpoints: &EndpointSet) -> Option<OpportunityRecord> {
        let map = raw.as_object()?;
        let notice_id = string_field(map, &["noticeId", "notice_id"]);
        let solicitation_number = string_field(map, &["solicitationNumber", "solnum"]);

        let (opportunity_id, id_degraded) =
            match string_field(map, &["opportunityId", "opportunity_id"]) {
                Some(id) => (id, false),
                None => match notice_id.as_deref() {
                    Some(notice) if is_opportunity_id(notice) => (notice.to_string(), true),
                    _ => {
                        tracing::debug!(
                            notice_id = notice_id.as_deref().unwrap_or(""),
                            "Dropping record without an addressable ID"
                        );
                        return None;
                    }
                },
            };

        let sam_link = self.sam_link(&opportunity_id, notice_id.as_deref());
        let attachments = inline_attachments(map, &opportunity_id, endpoints);

        Some(OpportunityRecord {
            opportunity_id,
            id_degraded,
            notice_id,
            solicitation_number,
            title: string_field(map, &["title"]),
            organization: string_field(
                map,
                &[
                    "fullParentPathName",
                    "organizationName",
                    "organization",
                    "department",
                ],
            ),
            posted_date: string_field(map, &["postedDate"]),
            response_deadline: string_field(map, &["responseDeadLine", "responseDeadline"]),
            naics_code: string_field(map, &["naicsCode", "naics"]),
            description: string_field(map, &["description"]),
            sam_link,
            attachments,
            raw_payload: map.clone(),
        })
    }

    /// Direct view URL for a well-formed opportunity ID, otherwise a search
    /// URL keyed on the notice ID.
    pub fn sam_link(&self, opportunity_id: &str, notice_id: Option<&str>) -> String {
        if is_opportunity_id(opportunity_id) {
            format!("{}/opp/{}/view", self.view_base_url, opportunity_id)
        } else {
            let keywords: String = url::form_urlencoded::byte_serialize(
                notice_id.unwrap_or(opportunity_id).as_bytes(),
            )
            .collect();
            format!(
                "{}/search?index=opp&keywords={}",
                self.view_base_url, keywords
            )
        }
    }
}

/// First non-empty string (or number, rendered) among `keys`.
pub(crate) fn string_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match map.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
