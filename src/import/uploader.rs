//! Create catalog and disposition line items for eligible records
//!
//! Per record: one catalog line (if a catalog target is configured), then
//! disposition lines (if a destruction target is configured) — one per
//! child, or one for the record itself when it has none. The catalog line
//! is guarded by a duplicate check so a re-run against the same upstream
//! state does not file the same serial twice.
//!
//! A record whose model never resolved cannot be filed; that skips the
//! affected lines with an error log but does not abort the run.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;

use super::collections;
use super::record::{Record, type_code};
use super::resolver::ModelIndex;
use crate::api::{CatalogApi, Domain, DomainOp, SearchOptions};
use crate::config::Targets;

/// Sub-serial sentinel for disposition lines of childless records.
const NO_SUB_SERIAL: &str = "N/A";

/// Field map for an asset catalog line.
#[derive(Debug, Serialize)]
struct AssetLine<'a> {
    catalog: i64,
    make: i64,
    serial: &'a str,
    tag: &'a str,
}

/// Field map for a data destruction line.
#[derive(Debug, Serialize)]
struct DispositionLine<'a> {
    ddl: i64,
    make: i64,
    serial: &'a str,
    storser: &'a str,
    #[serde(rename = "type")]
    type_code: char,
}

/// Line items created by one upload pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct UploadCounts {
    pub catalog_lines: usize,
    pub disposition_lines: usize,
}

/// Upload line items for every record, in order.
pub async fn upload_line_items(
    client: &impl CatalogApi,
    records: &[&Record],
    index: &ModelIndex,
    targets: Targets,
) -> Result<UploadCounts> {
    let mut counts = UploadCounts::default();

    for record in records {
        if targets.asset_catalog != 0
            && upload_catalog_line(client, record, index, targets.asset_catalog).await?
        {
            counts.catalog_lines += 1;
        }

        if targets.data_destruction != 0 {
            counts.disposition_lines +=
                upload_disposition_lines(client, record, index, targets.data_destruction).await?;
        }
    }

    Ok(counts)
}

/// Create the catalog line for one record, unless it already exists.
///
/// Returns whether a line was created.
async fn upload_catalog_line(
    client: &impl CatalogApi,
    record: &Record,
    index: &ModelIndex,
    catalog: i64,
) -> Result<bool> {
    let Some(make_id) = index.id_for_model(&record.model) else {
        log::error!(
            "No catalog id for model '{}', cannot file serial '{}'",
            record.model,
            record.serial
        );
        return Ok(false);
    };

    // Same catalog target, same resolved make, same serial (case-insensitive
    // exact) means this line was already filed on a previous run.
    let domain = Domain::new()
        .filter("catalog", DomainOp::Eq, json!(catalog))
        .filter("make", DomainOp::Eq, json!(make_id))
        .filter("serial", DomainOp::EqILike, json!(record.serial));
    let existing = client
        .search(collections::ASSET_LINE, &domain, &SearchOptions::default())
        .await
        .with_context(|| format!("Duplicate check failed for serial '{}'", record.serial))?;

    if !existing.is_empty() {
        log::warn!(
            "Catalog line for serial '{}' already exists (ids {:?}), skipping",
            record.serial,
            existing
        );
        return Ok(false);
    }

    let fields = serde_json::to_value(AssetLine {
        catalog,
        make: make_id,
        serial: &record.serial,
        tag: &record.asset_tag,
    })?;
    let id = client
        .create(collections::ASSET_LINE, fields)
        .await
        .with_context(|| format!("Failed to create catalog line for serial '{}'", record.serial))?;
    log::info!("Created catalog line {} for serial '{}'", id, record.serial);
    Ok(true)
}

/// Create disposition lines for one record: one per child, or one for the
/// record itself when childless.
///
/// Returns how many lines were created.
async fn upload_disposition_lines(
    client: &impl CatalogApi,
    record: &Record,
    index: &ModelIndex,
    ddl: i64,
) -> Result<usize> {
    let Some(make_id) = index.id_for_model(&record.model) else {
        log::error!(
            "No catalog id for model '{}', skipping disposition lines for serial '{}'",
            record.model,
            record.serial
        );
        return Ok(0);
    };

    let mut created = 0;

    if record.children.is_empty() {
        create_disposition(
            client,
            DispositionLine {
                ddl,
                make: make_id,
                serial: &record.serial,
                storser: NO_SUB_SERIAL,
                type_code: type_code(&record.device_type),
            },
        )
        .await?;
        created += 1;
    } else {
        // The parent's serial is the primary; each child contributes its own
        // serial as the sub-serial and its own device type for the code.
        for child in &record.children {
            create_disposition(
                client,
                DispositionLine {
                    ddl,
                    make: make_id,
                    serial: &record.serial,
                    storser: &child.serial,
                    type_code: type_code(&child.device_type),
                },
            )
            .await?;
            created += 1;
        }
    }

    Ok(created)
}

async fn create_disposition(client: &impl CatalogApi, line: DispositionLine<'_>) -> Result<()> {
    let serial = line.serial.to_string();
    let fields = serde_json::to_value(line)?;
    let id = client
        .create(collections::DISPOSITION_LINE, fields)
        .await
        .with_context(|| format!("Failed to create disposition line for serial '{}'", serial))?;
    log::info!("Created disposition line {} for serial '{}'", id, serial);
    Ok(())
}
