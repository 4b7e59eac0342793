use anyhow::Result;
use samgov_lib::{AttachmentReference, AttachmentSource, OpportunityRecord};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

const TITLE_WIDTH: usize = 60;

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

#[derive(Tabled, Serialize)]
struct OpportunityRow {
    #[tabled(rename = "Notice ID")]
    #[serde(rename = "Notice ID")]
    notice_id: String,
    #[tabled(rename = "Title")]
    #[serde(rename = "Title")]
    title: String,
    #[tabled(rename = "Agency")]
    #[serde(rename = "Agency")]
    agency: String,
    #[tabled(rename = "Posted")]
    #[serde(rename = "Posted")]
    posted: String,
    #[tabled(rename = "Response Due")]
    #[serde(rename = "Response Due")]
    deadline: String,
    #[tabled(rename = "NAICS")]
    #[serde(rename = "NAICS")]
    naics: String,
    #[tabled(rename = "Link")]
    #[serde(rename = "Link")]
    link: String,
}

#[derive(Tabled, Serialize)]
struct AttachmentRow {
    #[tabled(rename = "Opportunity")]
    #[serde(rename = "Opportunity")]
    opportunity_id: String,
    #[tabled(rename = "Title")]
    #[serde(rename = "Title")]
    title: String,
    #[tabled(rename = "Type")]
    #[serde(rename = "Type")]
    mime_type: String,
    #[tabled(rename = "Source")]
    #[serde(rename = "Source")]
    source: String,
    #[tabled(rename = "URL")]
    #[serde(rename = "URL")]
    url: String,
}

#[derive(Serialize)]
struct OpportunityAttachments<'a> {
    opportunity: &'a OpportunityRecord,
    attachments: &'a [AttachmentReference],
}

// -- Row builders --

fn build_opportunity_rows(records: &[OpportunityRecord]) -> Vec<OpportunityRow> {
    records
        .iter()
        .map(|r| OpportunityRow {
            notice_id: r.notice_id.clone().unwrap_or_default(),
            title: truncate(r.title.as_deref().unwrap_or(""), TITLE_WIDTH),
            agency: r
                .organization
                .as_deref()
                .map(short_agency)
                .unwrap_or_default(),
            posted: r.posted_date.clone().unwrap_or_default(),
            deadline: r.response_deadline.clone().unwrap_or_default(),
            naics: r.naics_code.clone().unwrap_or_default(),
            link: r.sam_link.clone(),
        })
        .collect()
}

fn build_attachment_rows(
    resolved: &[(OpportunityRecord, Vec<AttachmentReference>)],
) -> Vec<AttachmentRow> {
    resolved
        .iter()
        .flat_map(|(record, attachments)| {
            attachments.iter().map(move |a| AttachmentRow {
                opportunity_id: record.opportunity_id.clone(),
                title: truncate(&a.title, TITLE_WIDTH),
                mime_type: a.mime_type_hint.clone().unwrap_or_else(|| "unknown".to_string()),
                source: source_label(a.source).to_string(),
                url: a.url.clone(),
            })
        })
        .collect()
}

// -- Printers --

pub fn print_opportunities(records: &[OpportunityRecord], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&records),
        OutputFormat::Table => print_table(build_opportunity_rows(records)),
        OutputFormat::Markdown => print_markdown(build_opportunity_rows(records)),
        OutputFormat::Csv => print_csv(build_opportunity_rows(records))?,
    }
    Ok(())
}

pub fn print_attachments(
    resolved: &[(OpportunityRecord, Vec<AttachmentReference>)],
    format: &OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let doc: Vec<OpportunityAttachments> = resolved
                .iter()
                .map(|(opportunity, attachments)| OpportunityAttachments {
                    opportunity,
                    attachments,
                })
                .collect();
            print_json(&doc);
        }
        OutputFormat::Table => print_table(build_attachment_rows(resolved)),
        OutputFormat::Markdown => print_markdown(build_attachment_rows(resolved)),
        OutputFormat::Csv => print_csv(build_attachment_rows(resolved))?,
    }
    Ok(())
}

fn print_table<R: Tabled>(rows: Vec<R>) {
    println!("{}", Table::new(rows));
}

fn print_markdown<R: Tabled>(rows: Vec<R>) {
    let mut table = Table::new(rows);
    table.with(Style::markdown());
    println!("{}", table);
}

fn print_csv<R: Serialize>(rows: Vec<R>) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_json<T: Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}

/// Last segment of a dotted parent path ("DEPT OF DEFENSE.DEPT OF THE ARMY").
fn short_agency(path: &str) -> String {
    path.rsplit('.')
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(path)
        .to_string()
}

fn source_label(source: AttachmentSource) -> &'static str {
    match source {
        AttachmentSource::Inline => "inline",
        AttachmentSource::Metadata => "metadata",
        AttachmentSource::Description => "description",
    }
}
