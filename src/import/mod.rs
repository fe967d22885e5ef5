//! The import pipeline: spreadsheet rows in, ERP line items out
//!
//! Phases run strictly in order, mirroring the business process:
//! row classification builds a forest of [`Record`]s, the model resolver
//! binds every unique (make, model) pair to a catalog id, the ignore
//! partition routes excluded records to the CSV report, and the uploader
//! creates catalog and disposition lines for everything left.

pub mod pipeline;
pub mod record;
pub mod report;
pub mod resolver;
pub mod rows;
pub mod uploader;

pub use pipeline::{RunSummary, run_import};
pub use record::Record;
pub use rows::{IgnoreSet, RawRow};

/// Collection names in the ERP's warehouse schema.
pub(crate) mod collections {
    /// Catalog of sellable models, searched and extended by the resolver
    pub const CATALOG: &str = "erpwarehouse.sellable";
    /// Asset catalog line items
    pub const ASSET_LINE: &str = "erpwarehouse.asset";
    /// Data destruction line items
    pub const DISPOSITION_LINE: &str = "erpwarehouse.ddl_item";
}
