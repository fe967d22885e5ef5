//! Read the fixed six-column asset sheet from an XLSX workbook
//!
//! The column layout is a fixed contract: serial, asset tag, relationship
//! tag, make, model, device type. Cells are coerced to strings the same way
//! for every type; fully blank rows are dropped.

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Reader, Xlsx, open_workbook};

use crate::import::RawRow;

/// Read rows from `first_row` (1-based) through `last_row` inclusive, or to
/// the end of the sheet when no last row is given.
pub fn read_rows(
    path: &Path,
    sheet: &str,
    first_row: u32,
    last_row: Option<u32>,
) -> Result<Vec<RawRow>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    let range = workbook
        .worksheet_range(sheet)
        .with_context(|| format!("Failed to read sheet '{}'", sheet))?;

    let mut rows = Vec::new();
    for (idx, row) in range.rows().enumerate() {
        let row_number = idx as u32 + 1;
        if row_number < first_row {
            continue;
        }
        if let Some(last) = last_row {
            if row_number > last {
                break;
            }
        }

        let raw = RawRow {
            row: row_number as usize,
            serial: cell_string(row, 0),
            asset_tag: cell_string(row, 1),
            relationship: cell_string(row, 2),
            make: cell_string(row, 3),
            model: cell_string(row, 4),
            device_type: cell_string(row, 5),
        };

        if raw.is_empty() {
            continue;
        }
        rows.push(raw);
    }

    Ok(rows)
}

/// Coerce one cell to a string; absent and error cells become empty.
fn cell_string(row: &[Data], col: usize) -> String {
    row.get(col)
        .map(|cell| match cell {
            Data::String(s) => s.trim().to_string(),
            Data::Int(i) => i.to_string(),
            Data::Float(f) => {
                if f.fract() == 0.0 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Data::Bool(b) => b.to_string(),
            _ => String::new(),
        })
        .unwrap_or_default()
}
