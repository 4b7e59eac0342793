mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use samgov_lib::{ClientConfig, CredentialResolver, DotenvSecrets, OpportunityClient, SearchError};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "samgov")]
#[command(about = "Search SAM.gov contracting opportunities")]
struct Cli {
    /// Output format: table, json, csv, markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// TOML file with client settings (SAMGOV_* variables still override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// .env-format file consulted for SAM_API_KEY when the environment lacks it
    #[arg(long, global = true)]
    secrets_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search opportunities by keywords and/or NAICS codes
    Search(commands::search::SearchArgs),
    /// Look up opportunities by notice ID, opportunity ID or SAM.gov link
    Lookup(commands::lookup::LookupArgs),
    /// List the documents attached to an opportunity
    Attachments(commands::attachments::AttachmentsArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "samgov=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<SearchError>() {
                Some(search_err) => eprintln!("Error: {}", search_err.user_message()),
                None => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        "csv" => OutputFormat::Csv,
        "markdown" | "md" => OutputFormat::Markdown,
        _ => OutputFormat::Table,
    };

    let config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::from_env(),
    };
    let mut credentials = CredentialResolver::new();
    if let Some(path) = &cli.secrets_file {
        credentials = credentials.with_secrets(DotenvSecrets::new(path));
    }
    let client = OpportunityClient::new(config, &credentials)?;

    match &cli.command {
        Commands::Search(args) => commands::search::run(args, &client, &format).await?,
        Commands::Lookup(args) => commands::lookup::run(args, &client, &format).await?,
        Commands::Attachments(args) => commands::attachments::run(args, &client, &format).await?,
    }

    Ok(())
}
