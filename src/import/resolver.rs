//! Resolve (make, model) pairs to catalog ids, creating missing entries
//!
//! Each worklist pair is searched with case-insensitive partial match on the
//! catalog's `model` field. Misses are queued and created afterwards with
//! the pair's make and model, so every pair ends the phase bound to an id.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Value, json};

use super::collections;
use crate::api::{CatalogApi, Domain, DomainOp, SearchOptions};

/// Field map for creating a catalog entry.
#[derive(Debug, Serialize)]
struct CatalogEntry<'a> {
    make: &'a str,
    model: &'a str,
}

/// Resolution table: every submitted (make, model) pair bound to an id.
#[derive(Debug, Default)]
pub struct ModelIndex {
    entries: Vec<((String, String), i64)>,
}

impl ModelIndex {
    /// Look up the catalog id for a model.
    ///
    /// Lookup is keyed by model alone: two makes sharing a model name
    /// collide on the first entry. Kept for parity with the legacy importer.
    pub fn id_for_model(&self, model: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|((_, entry_model), _)| entry_model == model)
            .map(|(_, id)| *id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve the whole worklist against the remote catalog.
pub async fn resolve_models(
    client: &impl CatalogApi,
    worklist: &[(String, String)],
) -> Result<ModelIndex> {
    let mut index = ModelIndex::default();
    let mut to_create: Vec<(String, String)> = Vec::new();

    for (make, model) in worklist {
        let domain = Domain::new().filter("model", DomainOp::ILike, json!(model));
        let matches = client
            .search_read(
                collections::CATALOG,
                &domain,
                &SearchOptions::fields(&["id", "make", "model"]),
            )
            .await
            .with_context(|| format!("Catalog search failed for model '{}'", model))?;

        match matches.first() {
            None => {
                log::info!("No catalog entry for model '{}', will create one", model);
                to_create.push((make.clone(), model.clone()));
            }
            Some(first) => {
                // Duplicates exist in the catalog for some models; take the
                // first match rather than flagging them.
                if matches.len() > 1 {
                    log::warn!(
                        "Model '{}' matched {} catalog entries, using the first",
                        model,
                        matches.len()
                    );
                }
                let id = first
                    .get("id")
                    .and_then(Value::as_i64)
                    .with_context(|| format!("Catalog entry for '{}' has no id", model))?;
                index.entries.push(((make.clone(), model.clone()), id));
            }
        }
    }

    for (make, model) in to_create {
        let fields = serde_json::to_value(CatalogEntry {
            make: &make,
            model: &model,
        })?;
        let id = client
            .create(collections::CATALOG, fields)
            .await
            .with_context(|| format!("Failed to create catalog entry for model '{}'", model))?;
        log::info!("Created catalog entry {} for {} {}", id, make, model);
        index.entries.push(((make, model), id));
    }

    log::info!("Resolved {} models", index.len());
    Ok(index)
}
