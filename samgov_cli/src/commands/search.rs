use std::time::Duration;

use anyhow::Result;
use clap::Args;
use samgov_lib::validation;
use samgov_lib::{OpportunityClient, OpportunitySearchQuery, SearchError};

use crate::output::{print_opportunities, OutputFormat};

#[derive(Args)]
pub struct SearchArgs {
    /// Free-text keywords matched against opportunity titles
    #[arg(long)]
    pub keywords: Option<String>,

    /// NAICS code filter (repeatable, e.g. --naics 541511 --naics 541512)
    #[arg(long)]
    pub naics: Vec<String>,

    /// Only opportunities posted within this many days (1-365)
    #[arg(long, default_value = "30")]
    pub days_back: i64,

    /// Maximum number of results
    #[arg(long, default_value = "100")]
    pub limit: i64,

    /// Records requested per upstream page
    #[arg(long, default_value = "100")]
    pub page_size: i64,

    /// Give up after this many seconds
    #[arg(long)]
    pub deadline_secs: Option<u64>,
}

pub async fn run(args: &SearchArgs, client: &OpportunityClient, format: &OutputFormat) -> Result<()> {
    let mut query = OpportunitySearchQuery::new()
        .with_days_back(args.days_back)
        .with_limit(args.limit)
        .with_page_size(args.page_size);

    if let Some(keywords) = &args.keywords {
        query = query.with_keywords(&validation::validate_keywords(keywords)?);
    }
    for code in &args.naics {
        query = query.with_naics_code(&validation::validate_naics(code)?);
    }
    if let Some(secs) = args.deadline_secs {
        query = query.with_deadline(Duration::from_secs(secs));
    }

    match client.search(&query).await {
        Ok(records) => {
            if records.is_empty() {
                eprintln!("No opportunities matched.");
            }
            print_opportunities(&records, format)
        }
        Err(err @ SearchError::QuotaExceeded { .. }) if !err.partial_results().is_empty() => {
            eprintln!(
                "Quota exceeded mid-search; showing {} partial results.",
                err.partial_results().len()
            );
            print_opportunities(err.partial_results(), format)?;
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}
