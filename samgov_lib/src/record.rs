//! Canonical opportunity and attachment types handed to downstream consumers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Length of an upstream opportunity ID in hex characters.
pub const OPPORTUNITY_ID_LEN: usize = 32;

/// True when `id` is exactly 32 ASCII hex digits.
pub fn is_opportunity_id(id: &str) -> bool {
    id.len() == OPPORTUNITY_ID_LEN && id.bytes().all(|b| b.is_ascii_hexdigit())
}

/// One normalized contracting opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityRecord {
    pub opportunity_id: String,
    /// Set when `opportunity_id` was taken from the notice-ID field.
    #[serde(default)]
    pub id_degraded: bool,
    pub notice_id: Option<String>,
    pub solicitation_number: Option<String>,
    pub title: Option<String>,
    pub organization: Option<String>,
    pub posted_date: Option<String>,
    pub response_deadline: Option<String>,
    pub naics_code: Option<String>,
    pub description: Option<String>,
    pub sam_link: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentReference>,
    /// The upstream record exactly as received.
    #[serde(default)]
    pub raw_payload: Map<String, Value>,
}

impl OpportunityRecord {
    /// ID to address attachment and detail lookups with: the opportunity ID
    /// when it is well-formed, otherwise the notice ID if there is one.
    pub fn lookup_id(&self) -> &str {
        if is_opportunity_id(&self.opportunity_id) {
            &self.opportunity_id
        } else {
            self.notice_id.as_deref().unwrap_or(&self.opportunity_id)
        }
    }
}

/// Where an attachment reference came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttachmentSource {
    /// Listed on the record itself.
    #[default]
    Inline,
    /// Returned by the attachment-metadata endpoint.
    Metadata,
    /// Synthesized from the record's own title and description.
    Description,
}

/// A downloadable (or synthesized) document belonging to an opportunity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentReference {
    pub title: String,
    pub url: String,
    pub mime_type_hint: Option<String>,
    #[serde(default)]
    pub source: AttachmentSource,
    /// Inline text for synthesized attachments; `None` means fetch `url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}
