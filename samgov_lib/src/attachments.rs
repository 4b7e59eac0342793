//! Attachment discovery for resolved opportunities.
//!
//! Three tiers, first non-empty wins: attachments listed on the record
//! itself, the attachment-metadata endpoint, and finally a synthesized
//! text attachment built from the record's title and description so a
//! document pipeline always has something to work on.

use samgov_api::types::ResourceEnvelope;
use samgov_api::{EndpointSet, SearchParams};
use serde_json::{Map, Value};

use crate::client::OpportunityClient;
use crate::error::SearchError;
use crate::parser::string_field;
use crate::record::{AttachmentReference, AttachmentSource, OpportunityRecord};

/// Record keys that may carry inline attachments.
pub const INLINE_ATTACHMENT_KEYS: [&str; 3] = ["resourceLinks", "attachments", "documents"];

impl OpportunityClient {
    /// Resolves the attachments of `record` through the three tiers.
    ///
    /// Attachments already carried on `record` are returned as-is. The
    /// description tier is only used when the metadata endpoint answers
    /// with nothing usable (404, an empty list or an unreadable body);
    /// outages, authentication and quota failures are returned as errors.
    pub async fn resolve_attachments(
        &self,
        record: &OpportunityRecord,
    ) -> Result<Vec<AttachmentReference>, SearchError> {
        if !record.attachments.is_empty() {
            return Ok(record.attachments.clone());
        }

        let endpoints = self.endpoints();
        let inline = inline_attachments(&record.raw_payload, &record.opportunity_id, &endpoints);
        if !inline.is_empty() {
            tracing::debug!(id = %record.opportunity_id, count = inline.len(), "Inline attachments");
            return Ok(inline);
        }

        let fetched = loop {
            let endpoints = self.endpoints();
            match self.metadata_attachments(record, &endpoints).await {
                Err(SearchError::Network(msg)) => {
                    if !self.switch_version() {
                        return Err(SearchError::Network(msg));
                    }
                    tracing::warn!(
                        "Network failure on {}: {}; retrying attachment metadata",
                        endpoints.version,
                        msg
                    );
                }
                other => break other?,
            }
        };
        if !fetched.is_empty() {
            return Ok(fetched);
        }

        tracing::info!(
            id = %record.opportunity_id,
            "No attachments found, using description as document"
        );
        Ok(vec![description_attachment(record)])
    }

    /// Queries the attachment-metadata endpoint for `record`.
    pub(crate) async fn metadata_attachments(
        &self,
        record: &OpportunityRecord,
        endpoints: &EndpointSet,
    ) -> Result<Vec<AttachmentReference>, SearchError> {
        self.ensure_credential()?;
        let owner = record.lookup_id();
        if record.id_degraded {
            tracing::debug!(id = owner, "Resolving attachments with a degraded opportunity ID");
        }
        let url = endpoints.attachment_metadata_url_for(owner);

        let resp = match self.send(&url, None::<&SearchParams>).await {
            Ok(resp) => resp,
            Err(SearchError::UnexpectedStatus { status, .. }) => {
                tracing::info!("No attachment metadata for {} (status {})", owner, status);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        match ResourceEnvelope::items_from_body(&resp.body) {
            Ok(items) => Ok(dedupe(
                items
                    .iter()
                    .filter_map(|item| {
                        normalize_attachment(item, owner, endpoints, AttachmentSource::Metadata)
                    })
                    .collect(),
            )),
            Err(e) => {
                tracing::warn!(
                    "Unreadable attachment metadata for {}: {} | body: {}",
                    owner,
                    e,
                    resp.body_snippet()
                );
                Ok(Vec::new())
            }
        }
    }
}

/// Attachments listed on a raw record under any of [`INLINE_ATTACHMENT_KEYS`].
pub fn inline_attachments(
    raw: &Map<String, Value>,
    owner_id: &str,
    endpoints: &EndpointSet,
) -> Vec<AttachmentReference> {
    let found = INLINE_ATTACHMENT_KEYS
        .iter()
        .filter_map(|key| raw.get(*key).and_then(Value::as_array))
        .flatten()
        .filter_map(|item| normalize_attachment(item, owner_id, endpoints, AttachmentSource::Inline))
        .collect();
    dedupe(found)
}

/// Normalizes one upstream attachment item.
///
/// Accepts a bare URL string, an object with `url`/`link`/`downloadUrl`/`href`,
/// or a resource ID (bare string or `resourceId`/`attachmentId`/`id` field),
/// for which a download URL is synthesized against `owner_id`.
pub fn normalize_attachment(
    item: &Value,
    owner_id: &str,
    endpoints: &EndpointSet,
    source: AttachmentSource,
) -> Option<AttachmentReference> {
    match item {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            let url = if looks_like_url(s) {
                s.to_string()
            } else {
                endpoints.attachment_download_url(owner_id, s)
            };
            let title = title_from_url(&url);
            Some(AttachmentReference {
                mime_type_hint: guess_mime(&url),
                title,
                url,
                source,
                content: None,
            })
        }
        Value::Object(obj) => {
            let url = string_field(obj, &["url", "link", "downloadUrl", "href"])
                .filter(|u| looks_like_url(u))
                .or_else(|| {
                    string_field(obj, &["resourceId", "attachmentId", "id"])
                        .map(|rid| endpoints.attachment_download_url(owner_id, &rid))
                })?;
            let title = string_field(obj, &["name", "title", "fileName", "filename"])
                .unwrap_or_else(|| title_from_url(&url));
            let mime_type_hint = string_field(obj, &["mimeType", "contentType", "type"])
                .and_then(|m| normalize_mime(&m))
                .or_else(|| guess_mime(&title))
                .or_else(|| guess_mime(&url));
            Some(AttachmentReference {
                title,
                url,
                mime_type_hint,
                source,
                content: None,
            })
        }
        _ => None,
    }
}

/// Pseudo-attachment carrying the record's own title and description.
pub fn description_attachment(record: &OpportunityRecord) -> AttachmentReference {
    let title = record
        .title
        .clone()
        .unwrap_or_else(|| record.opportunity_id.clone());
    let content = match record.description.as_deref() {
        Some(desc) => format!("{}\n\n{}", title, desc),
        None => title.clone(),
    };
    AttachmentReference {
        title: format!("{} (description)", title),
        url: record.sam_link.clone(),
        mime_type_hint: Some("text/plain".to_string()),
        source: AttachmentSource::Description,
        content: Some(content),
    }
}

/// MIME type guessed from a file name or URL extension.
pub fn guess_mime(name: &str) -> Option<String> {
    let path = name.split(['?', '#']).next().unwrap_or(name);
    let last = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = last.rsplit_once('.')?;
    mime_for_extension(ext)
}

fn mime_for_extension(ext: &str) -> Option<String> {
    let mime = match ext.to_ascii_lowercase().as_str() {
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "doc" => "application/msword",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xls" => "application/vnd.ms-excel",
        "txt" => "text/plain",
        "zip" => "application/zip",
        "html" | "htm" => "text/html",
        _ => return None,
    };
    Some(mime.to_string())
}

// Upstream sometimes reports a bare extension (".pdf") instead of a MIME type.
fn normalize_mime(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Some(ext) = raw.strip_prefix('.') {
        mime_for_extension(ext)
    } else if raw.contains('/') {
        Some(raw.to_ascii_lowercase())
    } else {
        mime_for_extension(raw)
    }
}

fn looks_like_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

fn title_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty() && !s.contains(':'))
        .unwrap_or("attachment")
        .to_string()
}

fn dedupe(refs: Vec<AttachmentReference>) -> Vec<AttachmentReference> {
    let mut seen = std::collections::HashSet::new();
    refs.into_iter()
        .filter(|r| seen.insert(r.url.clone()))
        .collect()
}
