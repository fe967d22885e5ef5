//! erp-import: one-shot import of asset pickup spreadsheets into the ERP
//!
//! Reads a nonstandard six-column spreadsheet of devices and their
//! sub-components, reconciles the models against the ERP's catalog, and
//! files catalog and disposition line items over JSON-RPC. Serials on the
//! ignore list land in a CSV report instead of the ERP.

mod api;
mod config;
mod import;
mod sheet;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use colored::*;

use api::ErpClient;
use config::{Connection, Targets};
use import::{IgnoreSet, RunSummary, run_import};

#[derive(Parser, Debug)]
#[command(name = "erp-import", about = "Import asset pickup spreadsheets into the ERP", version)]
struct Args {
    /// Path to the .xlsx workbook
    file: PathBuf,

    /// Name of the worksheet holding the asset rows
    #[arg(long)]
    sheet: String,

    /// First data row, 1-based (row 1 is assumed to be a header)
    #[arg(long, default_value_t = 2)]
    first_row: u32,

    /// Last data row to read (defaults to the end of the sheet)
    #[arg(long)]
    last_row: Option<u32>,

    /// Database id of the asset catalog receiving catalog lines (0 disables them)
    #[arg(long, default_value_t = 0)]
    catalog_id: i64,

    /// Database id of the data destruction list receiving disposition lines (0 disables them)
    #[arg(long, default_value_t = 0)]
    destruction_id: i64,

    /// File with one serial per line to exclude from upload
    #[arg(long)]
    ignore_file: Option<PathBuf>,

    /// Where to write the CSV report of skipped records
    #[arg(long, default_value = "skipped_records.csv")]
    report: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    // Fail fast on connection parameters before touching the spreadsheet.
    let connection = Connection::from_env()?;

    let ignore = match &args.ignore_file {
        Some(path) => {
            let set = IgnoreSet::from_file(path)?;
            log::info!("Loaded {} ignored serials from {}", set.len(), path.display());
            set
        }
        None => IgnoreSet::default(),
    };

    let rows = sheet::read_rows(&args.file, &args.sheet, args.first_row, args.last_row)?;
    log::info!(
        "Read {} rows from {} (sheet '{}')",
        rows.len(),
        args.file.display(),
        args.sheet
    );

    let targets = Targets {
        asset_catalog: args.catalog_id,
        data_destruction: args.destruction_id,
    };
    if targets.asset_catalog == 0 {
        log::warn!("No catalog id given, catalog lines are disabled");
    }
    if targets.data_destruction == 0 {
        log::warn!("No destruction id given, disposition lines are disabled");
    }

    let client = ErpClient::new(&connection)?;
    let summary = run_import(&client, &rows, &ignore, targets, &args.report).await?;

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", "Import complete".bright_green().bold());
    println!("  rows processed:    {}", summary.rows_processed);
    println!("  records created:   {}", summary.records_created);
    println!("  catalog lines:     {}", summary.catalog_lines);
    println!("  disposition lines: {}", summary.disposition_lines);
    println!("  records ignored:   {}", summary.ignored);

    if !summary.failed.is_empty() {
        println!();
        println!(
            "{}",
            format!("{} rows produced no record:", summary.failed.len()).yellow()
        );
        for failure in &summary.failed {
            println!("  row {}: {}", failure.row, failure.reason);
        }
    }
}
