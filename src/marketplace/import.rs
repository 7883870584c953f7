// src/marketplace/import.rs
//! Job import from spreadsheet exports.
//!
//! Column layout: `id, client_id, title, description, skills, budget, status, created_at`,
//! with skills comma separated inside their cell. The first row is a header.

use super::models::{clean_skills, new_id, Job, JobStatus};
use super::service::MarketplaceService;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::StringRecord;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImportSummary {
    pub imported: usize,
    pub replaced: usize,
    pub skipped: Vec<String>,
}

fn cell(record: &StringRecord, index: usize) -> &str {
    record.get(index).map(str::trim).unwrap_or_default()
}

pub fn parse_job_record(record: &StringRecord) -> Result<Job> {
    let title = cell(record, 2);
    let client_id = cell(record, 1);
    if title.is_empty() {
        anyhow::bail!("missing title");
    }
    if client_id.is_empty() {
        anyhow::bail!("missing client_id");
    }

    let budget_cell = cell(record, 5);
    let budget: f64 = budget_cell
        .parse()
        .with_context(|| format!("invalid budget '{}'", budget_cell))?;

    let status = match cell(record, 6) {
        "" => JobStatus::Open,
        other => other.parse()?,
    };

    let created_at = match cell(record, 7) {
        "" => Utc::now(),
        raw => DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("invalid created_at '{}'", raw))?
            .with_timezone(&Utc),
    };

    let skills: Vec<String> = cell(record, 4).split(',').map(str::to_string).collect();

    let id = match cell(record, 0) {
        "" => new_id("job"),
        id => id.to_string(),
    };

    let job = Job {
        id,
        client_id: client_id.to_string(),
        title: title.to_string(),
        description: cell(record, 3).to_string(),
        skills: clean_skills(&skills),
        budget,
        status,
        created_at,
    };
    job.validate()?;
    Ok(job)
}

/// Parse every data row. Failures carry the 1-based line number.
pub fn parse_jobs(content: &str) -> Vec<Result<Job, String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    reader
        .records()
        .enumerate()
        .map(|(index, record)| {
            let line = index + 2;
            record
                .map_err(|e| format!("line {}: {}", line, e))
                .and_then(|r| parse_job_record(&r).map_err(|e| format!("line {}: {:#}", line, e)))
        })
        .collect()
}

pub async fn import_jobs(service: &MarketplaceService<'_>, csv_file: &Path) -> Result<ImportSummary> {
    let content = tokio::fs::read_to_string(csv_file)
        .await
        .with_context(|| format!("Failed to read CSV file: {}", csv_file.display()))?;

    let mut summary = ImportSummary::default();

    for parsed in parse_jobs(&content) {
        let job = match parsed {
            Ok(job) => job,
            Err(reason) => {
                warn!("Skipping job row, {}", reason);
                summary.skipped.push(reason);
                continue;
            }
        };

        if service
            .import_job(&job)
            .await
            .with_context(|| format!("Failed to store job {}", job.id))?
        {
            summary.replaced += 1;
        } else {
            summary.imported += 1;
        }
    }

    info!(
        "Imported {} jobs from {} ({} replaced, {} skipped)",
        summary.imported,
        csv_file.display(),
        summary.replaced,
        summary.skipped.len()
    );
    Ok(summary)
}
