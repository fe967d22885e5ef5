//! CSV report of records excluded from upload
//!
//! The report is the audit trail for ignored serials, so the writer is
//! acquired, written and flushed in one scope; nothing is left to drop
//! timing.

use std::path::Path;

use anyhow::{Context, Result};

use super::record::Record;

const HEADER: [&str; 6] = ["serial", "asset_tag", "make", "model", "device_type", "children"];

/// Write the skipped records, one row each, children as nested JSON.
///
/// Returns the number of data rows written.
pub fn write_skipped(path: &Path, skipped: &[&Record]) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to open report file: {}", path.display()))?;

    writer
        .write_record(HEADER)
        .context("Failed to write report header")?;

    for record in skipped {
        let children = serde_json::to_string(&record.children)
            .context("Failed to serialize children for report")?;
        writer
            .write_record([
                record.serial.as_str(),
                record.asset_tag.as_str(),
                record.make.as_str(),
                record.model.as_str(),
                record.device_type.as_str(),
                children.as_str(),
            ])
            .with_context(|| format!("Failed to write report row for '{}'", record.serial))?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush report file: {}", path.display()))?;

    Ok(skipped.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_report_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("erp-import-{}-{}.csv", name, std::process::id()))
    }

    #[test]
    fn test_report_rows_and_nested_children() {
        let mut parent = Record::new("S1", "T1", "Dell", "Latitude", "Laptop");
        parent
            .children
            .push(Record::new("S2", "T2", "Dell", "Latitude", "Hard Drive"));
        let standalone = Record::new("S3", "T3", "IBM", "TS4300", "Tape");

        let path = temp_report_path("rows");
        let written = write_skipped(&path, &[&parent, &standalone]).unwrap();
        assert_eq!(written, 2);

        let content = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).ok();

        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "serial,asset_tag,make,model,device_type,children"
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("S1,T1,Dell,Latitude,Laptop,"));
        assert!(first.contains("\"\"serial\"\":\"\"S2\"\""));
        let second = lines.next().unwrap();
        assert!(second.starts_with("S3,T3,IBM,TS4300,Tape,"));
    }

    #[test]
    fn test_empty_report_still_has_header() {
        let path = temp_report_path("empty");
        let written = write_skipped(&path, &[]).unwrap();
        assert_eq!(written, 0);

        let content = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(
            content.trim(),
            "serial,asset_tag,make,model,device_type,children"
        );
    }
}
