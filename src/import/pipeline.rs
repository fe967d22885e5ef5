//! Orchestrates one import run, in the order the business process requires
//!
//! Build the record forest, resolve models, write the skipped-record report,
//! then upload line items. The report is written and flushed before any
//! upload starts so the audit trail survives a transport failure mid-run.

use std::path::Path;

use anyhow::Result;

use super::report;
use super::resolver::resolve_models;
use super::rows::{FailedRow, IgnoreSet, RawRow, build_forest};
use super::uploader::upload_line_items;
use crate::api::CatalogApi;
use crate::config::Targets;

/// Counters and per-row failures for one run, surfaced via logging and the
/// CLI summary.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub rows_processed: usize,
    pub records_created: usize,
    pub catalog_lines: usize,
    pub disposition_lines: usize,
    pub ignored: usize,
    pub failed: Vec<FailedRow>,
}

/// Run the full pipeline against one row stream.
pub async fn run_import(
    client: &impl CatalogApi,
    rows: &[RawRow],
    ignore: &IgnoreSet,
    targets: Targets,
    report_path: &Path,
) -> Result<RunSummary> {
    log::info!("Classifying {} rows", rows.len());
    let outcome = build_forest(rows, ignore);

    log::info!("Resolving {} unique models", outcome.worklist.len());
    let index = resolve_models(client, &outcome.worklist).await?;

    // Partition top-level records only; children ride with their parent.
    let (skipped, eligible): (Vec<&_>, Vec<&_>) = outcome
        .forest
        .iter()
        .partition(|record| ignore.matches(&record.serial));

    let ignored = report::write_skipped(report_path, &skipped)?;
    if ignored > 0 {
        log::info!(
            "Ignored {} records, reported to {}",
            ignored,
            report_path.display()
        );
    }

    log::info!("Uploading line items for {} records", eligible.len());
    let counts = upload_line_items(client, &eligible, &index, targets).await?;

    let summary = RunSummary {
        rows_processed: outcome.rows_processed,
        records_created: outcome.records_created,
        catalog_lines: counts.catalog_lines,
        disposition_lines: counts.disposition_lines,
        ignored,
        failed: outcome.failed,
    };

    log::info!(
        "Run complete: {} rows, {} records, {} catalog lines, {} disposition lines, {} ignored, {} failed rows",
        summary.rows_processed,
        summary.records_created,
        summary.catalog_lines,
        summary.disposition_lines,
        summary.ignored,
        summary.failed.len()
    );
    for failure in &summary.failed {
        log::warn!("Row {}: {}", failure.row, failure.reason);
    }

    Ok(summary)
}
