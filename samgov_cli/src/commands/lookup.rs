use anyhow::Result;
use clap::Args;
use samgov_lib::OpportunityClient;

use crate::output::{print_opportunities, OutputFormat};

#[derive(Args)]
pub struct LookupArgs {
    /// Notice ID, 32-character opportunity ID, or a SAM.gov view link
    pub id: String,
}

pub async fn run(args: &LookupArgs, client: &OpportunityClient, format: &OutputFormat) -> Result<()> {
    let records = client.by_any_id(&args.id).await?;
    if records.is_empty() {
        eprintln!("No opportunity found for '{}'.", args.id.trim());
        return Ok(());
    }
    print_opportunities(&records, format)
}
