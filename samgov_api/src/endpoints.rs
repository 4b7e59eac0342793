//! The two upstream endpoint families.
//!
//! The opportunities API exposes a current major version and an older one
//! with differently shaped paths. Both are described here as plain URL
//! templates; nothing in this module performs I/O.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Production host for both endpoint families.
pub const DEFAULT_BASE_URL: &str = "https://api.sam.gov";

const OPPORTUNITY_ID_PLACEHOLDER: &str = "{opportunity_id}";
const RESOURCE_ID_PLACEHOLDER: &str = "{resource_id}";

/// Which endpoint family a client is talking to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    /// The current (v2 search) family.
    Primary,
    /// The older (v1 search) family, used as a fallback.
    Secondary,
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiVersion::Primary => write!(f, "primary"),
            ApiVersion::Secondary => write!(f, "secondary"),
        }
    }
}

/// The four URLs of one endpoint family.
///
/// `attachment_url` and `attachment_metadata_url` are templates containing
/// `{opportunity_id}` (and `{resource_id}` for downloads); use the helper
/// methods to fill them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSet {
    pub version: ApiVersion,
    pub search_url: String,
    pub detail_url: String,
    pub attachment_url: String,
    pub attachment_metadata_url: String,
}

impl EndpointSet {
    /// Builds the endpoint set for `version` rooted at `base_url`.
    pub fn for_version(version: ApiVersion, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        match version {
            ApiVersion::Primary => Self {
                version,
                search_url: format!("{}/opportunities/v2/search", base),
                detail_url: format!("{}/prod/opportunities/v1/noticedesc", base),
                attachment_url: format!(
                    "{}/prod/opportunities/v3/opportunities/{}/resources/files/{}/download",
                    base, OPPORTUNITY_ID_PLACEHOLDER, RESOURCE_ID_PLACEHOLDER
                ),
                attachment_metadata_url: format!(
                    "{}/prod/opportunities/v3/opportunities/{}/resources",
                    base, OPPORTUNITY_ID_PLACEHOLDER
                ),
            },
            ApiVersion::Secondary => Self {
                version,
                search_url: format!("{}/prod/opportunities/v1/search", base),
                detail_url: format!("{}/prod/opportunities/v1/noticedesc", base),
                attachment_url: format!(
                    "{}/prod/opportunities/v1/{}/resources/files/{}/download",
                    base, OPPORTUNITY_ID_PLACEHOLDER, RESOURCE_ID_PLACEHOLDER
                ),
                attachment_metadata_url: format!(
                    "{}/prod/opportunities/v1/{}/resources",
                    base, OPPORTUNITY_ID_PLACEHOLDER
                ),
            },
        }
    }

    /// Download URL for one resource owned by `owner_id`.
    pub fn attachment_download_url(&self, owner_id: &str, resource_id: &str) -> String {
        self.attachment_url
            .replace(OPPORTUNITY_ID_PLACEHOLDER, &encode_segment(owner_id))
            .replace(RESOURCE_ID_PLACEHOLDER, &encode_segment(resource_id))
    }

    /// Attachment-metadata URL for `owner_id`.
    pub fn attachment_metadata_url_for(&self, owner_id: &str) -> String {
        self.attachment_metadata_url
            .replace(OPPORTUNITY_ID_PLACEHOLDER, &encode_segment(owner_id))
    }
}

fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
