use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of the attachment-metadata endpoint.
///
/// Seen in three shapes: a HAL-style `_embedded.opportunityAttachmentList`,
/// flat `attachments` / `resources` arrays, or a bare array of items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEnvelope {
    #[serde(rename = "_embedded", default)]
    pub embedded: Option<Embedded>,
    #[serde(default)]
    pub attachments: Option<Vec<Value>>,
    #[serde(default)]
    pub resources: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Embedded {
    #[serde(default)]
    pub opportunity_attachment_list: Vec<AttachmentGroup>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttachmentGroup {
    #[serde(default)]
    pub attachments: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ResourceBody {
    List(Vec<Value>),
    Envelope(ResourceEnvelope),
}

impl ResourceEnvelope {
    /// Flattens every attachment item, in upstream order.
    pub fn into_items(self) -> Vec<Value> {
        let mut items = Vec::new();
        if let Some(embedded) = self.embedded {
            for group in embedded.opportunity_attachment_list {
                items.extend(group.attachments);
            }
        }
        items.extend(self.attachments.unwrap_or_default());
        items.extend(self.resources.unwrap_or_default());
        items
    }

    /// Parses any of the known body shapes into a flat item list.
    pub fn items_from_body(body: &str) -> Result<Vec<Value>, serde_json::Error> {
        match serde_json::from_str::<ResourceBody>(body)? {
            ResourceBody::List(items) => Ok(items),
            ResourceBody::Envelope(envelope) => Ok(envelope.into_items()),
        }
    }
}
