//! Generic CRUD client for the ERP's record store
//!
//! This module provides the transport-facing half of the importer: a typed
//! domain-filter language, the six query operations the ERP exposes through
//! `execute_kw`, and the JSON-RPC client that carries them. The import
//! pipeline only ever talks to the [`CatalogApi`] trait, never to the wire.

pub mod client;
pub mod domain;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{CatalogApi, ErpClient};
pub use domain::{Domain, DomainOp, SearchOptions};
