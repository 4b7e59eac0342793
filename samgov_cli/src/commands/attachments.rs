use anyhow::Result;
use clap::Args;
use samgov_lib::OpportunityClient;

use crate::output::{print_attachments, OutputFormat};

#[derive(Args)]
pub struct AttachmentsArgs {
    /// Notice ID, 32-character opportunity ID, or a SAM.gov view link
    pub id: String,
}

pub async fn run(
    args: &AttachmentsArgs,
    client: &OpportunityClient,
    format: &OutputFormat,
) -> Result<()> {
    let records = client.by_any_id(&args.id).await?;
    if records.is_empty() {
        eprintln!("No opportunity found for '{}'.", args.id.trim());
        return Ok(());
    }

    let mut resolved = Vec::with_capacity(records.len());
    for record in &records {
        let attachments = client.resolve_attachments(record).await?;
        resolved.push((record.clone(), attachments));
    }
    print_attachments(&resolved, format)
}
