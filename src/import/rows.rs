//! Row classification: raw spreadsheet rows into a forest of records
//!
//! Rows carry a relationship tag: `"Parent"` opens a new top-level record
//! and becomes the attachment target for every following `"Child"` row until
//! the next parent; any other tag is a standalone top-level record. The
//! "last parent" cursor is explicit state of the build, not a hidden field,
//! and survives interleaved child and standalone rows.
//!
//! Serial deduplication runs against top-level records for parent/standalone
//! rows and against the current parent's children for child rows. Serials in
//! the ignore set (or blank) bypass the check entirely: they must still
//! produce a record so the ignore partition can route them to the report
//! sink instead of dropping them silently.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::record::{Record, normalize_serial};

/// The stringified absent cell, as the legacy data dumps recorded it.
const ABSENT_MARKER: &str = "None";

const TAG_PARENT: &str = "Parent";
const TAG_CHILD: &str = "Child";

/// One spreadsheet row: six positional cells, already string-coerced.
#[derive(Clone, Debug, Default)]
pub struct RawRow {
    /// 1-based row number in the sheet, for audit messages
    pub row: usize,
    pub serial: String,
    pub asset_tag: String,
    pub relationship: String,
    pub make: String,
    pub model: String,
    pub device_type: String,
}

impl RawRow {
    pub fn is_empty(&self) -> bool {
        self.serial.is_empty()
            && self.asset_tag.is_empty()
            && self.relationship.is_empty()
            && self.make.is_empty()
            && self.model.is_empty()
            && self.device_type.is_empty()
    }
}

/// Serials excluded from deduplication and upload, routed to the report.
///
/// Blank serials and the literal absence marker always match, regardless of
/// the configured list.
#[derive(Clone, Debug, Default)]
pub struct IgnoreSet {
    serials: HashSet<String>,
}

impl IgnoreSet {
    pub fn new(serials: impl IntoIterator<Item = String>) -> Self {
        Self {
            serials: serials.into_iter().collect(),
        }
    }

    /// Load one serial per line; blank lines and `#` comments are skipped.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read ignore list: {}", path.display()))?;
        let serials = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string);
        Ok(Self::new(serials))
    }

    pub fn matches(&self, serial: &str) -> bool {
        serial.is_empty() || serial == ABSENT_MARKER || self.serials.contains(serial)
    }

    pub fn len(&self) -> usize {
        self.serials.len()
    }
}

/// A row that produced no record, with the reason for the audit trail.
#[derive(Clone, Debug)]
pub struct FailedRow {
    pub row: usize,
    pub reason: String,
}

/// Result of classifying one row stream.
#[derive(Debug, Default)]
pub struct BuildOutcome {
    /// Top-level records in row order, children attached in row order
    pub forest: Vec<Record>,
    /// Unique (make, model) pairs, first-seen order, deduplicated by model
    pub worklist: Vec<(String, String)>,
    pub rows_processed: usize,
    pub records_created: usize,
    pub failed: Vec<FailedRow>,
}

/// Classify rows into a record forest and a model-resolution worklist.
pub fn build_forest(rows: &[RawRow], ignore: &IgnoreSet) -> BuildOutcome {
    let mut outcome = BuildOutcome::default();
    // Index into the forest of the most recent Parent row. Only Parent rows
    // move it; standalone rows pass through without disturbing attachment.
    let mut last_parent: Option<usize> = None;
    let mut seen_models: HashSet<String> = HashSet::new();

    for raw in rows {
        outcome.rows_processed += 1;
        let serial = normalize_serial(&raw.serial);

        if raw.relationship == TAG_CHILD {
            let Some(parent_idx) = last_parent else {
                log::warn!("Row {}: child row with no preceding parent", raw.row);
                outcome.failed.push(FailedRow {
                    row: raw.row,
                    reason: "child row encountered with no preceding parent".to_string(),
                });
                continue;
            };

            let children = &mut outcome.forest[parent_idx].children;
            if !ignore.matches(&serial) && children.iter().any(|c| c.serial == serial) {
                outcome.failed.push(FailedRow {
                    row: raw.row,
                    reason: format!("duplicate child serial '{}' under the same parent", serial),
                });
                continue;
            }

            children.push(make_record(raw));
            outcome.records_created += 1;
            continue;
        }

        // Parent or standalone: both are top-level records.
        if !ignore.matches(&serial) && outcome.forest.iter().any(|r| r.serial == serial) {
            outcome.failed.push(FailedRow {
                row: raw.row,
                reason: format!("duplicate serial '{}'", serial),
            });
            continue;
        }

        if raw.relationship == TAG_PARENT {
            last_parent = Some(outcome.forest.len());
        }
        outcome.forest.push(make_record(raw));
        outcome.records_created += 1;

        // Register the model for catalog resolution. Dedup is by model value
        // alone; the make tags along for create-if-missing.
        if !raw.model.is_empty() && seen_models.insert(raw.model.clone()) {
            outcome
                .worklist
                .push((raw.make.clone(), raw.model.clone()));
        }
    }

    log::info!(
        "Classified {} rows: {} records, {} unique models, {} failed",
        outcome.rows_processed,
        outcome.records_created,
        outcome.worklist.len(),
        outcome.failed.len()
    );

    outcome
}

fn make_record(raw: &RawRow) -> Record {
    Record::new(
        &raw.serial,
        &raw.asset_tag,
        &raw.make,
        &raw.model,
        &raw.device_type,
    )
}
