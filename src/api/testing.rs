//! In-memory [`CatalogApi`] implementation for pipeline tests
//!
//! Behaves like a tiny record store: catalog searches honor `ilike`
//! semantics, creates allocate ids and land in the store, and the asset-line
//! collection supports the duplicate-check search the uploader issues. Every
//! create is also recorded in call order so tests can assert on exactly what
//! reached the server.

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::client::CatalogApi;
use super::domain::{Domain, SearchOptions};
use crate::import::collections;

#[derive(Debug)]
pub(crate) struct MockApi {
    next_id: Mutex<i64>,
    /// Catalog entries on the "server": (id, make, model)
    pub catalog: Mutex<Vec<(i64, String, String)>>,
    /// Asset lines on the "server": (id, catalog target, make id, serial)
    pub asset_lines: Mutex<Vec<(i64, i64, i64, String)>>,
    /// Every create issued through the mock, in call order
    pub creates: Mutex<Vec<(String, Value)>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            next_id: Mutex::new(1000),
            catalog: Mutex::new(Vec::new()),
            asset_lines: Mutex::new(Vec::new()),
            creates: Mutex::new(Vec::new()),
        }
    }

    /// Seed the catalog with known (id, make, model) entries.
    pub fn with_catalog(entries: &[(i64, &str, &str)]) -> Self {
        let mock = Self::new();
        mock.catalog.lock().unwrap().extend(
            entries
                .iter()
                .map(|(id, make, model)| (*id, make.to_string(), model.to_string())),
        );
        mock
    }

    /// Creates issued against one collection, in call order.
    pub fn creates_for(&self, collection: &str) -> Vec<Value> {
        self.creates
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| c == collection)
            .map(|(_, fields)| fields.clone())
            .collect()
    }

    fn alloc_id(&self) -> i64 {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        *next
    }
}

/// Pull the value of the first predicate on `field` out of a serialized domain.
fn domain_value(domain: &Domain, field: &str) -> Option<Value> {
    let Value::Array(nodes) = domain.to_value() else {
        return None;
    };
    nodes.iter().find_map(|node| match node {
        Value::Array(tuple) if tuple.first().and_then(Value::as_str) == Some(field) => {
            tuple.get(2).cloned()
        }
        _ => None,
    })
}

fn field_str(fields: &Value, name: &str) -> String {
    fields
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl CatalogApi for MockApi {
    async fn search(
        &self,
        collection: &str,
        domain: &Domain,
        _options: &SearchOptions,
    ) -> Result<Vec<i64>> {
        if collection != collections::ASSET_LINE {
            return Ok(Vec::new());
        }

        let catalog = domain_value(domain, "catalog").and_then(|v| v.as_i64());
        let make = domain_value(domain, "make").and_then(|v| v.as_i64());
        let serial = domain_value(domain, "serial")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        let ids = self
            .asset_lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, line_catalog, line_make, line_serial)| {
                Some(*line_catalog) == catalog
                    && Some(*line_make) == make
                    && line_serial.eq_ignore_ascii_case(&serial)
            })
            .map(|(id, _, _, _)| *id)
            .collect();
        Ok(ids)
    }

    async fn create(&self, collection: &str, fields: Value) -> Result<i64> {
        let id = self.alloc_id();

        if collection == collections::CATALOG {
            self.catalog.lock().unwrap().push((
                id,
                field_str(&fields, "make"),
                field_str(&fields, "model"),
            ));
        } else if collection == collections::ASSET_LINE {
            self.asset_lines.lock().unwrap().push((
                id,
                fields.get("catalog").and_then(Value::as_i64).unwrap_or(0),
                fields.get("make").and_then(Value::as_i64).unwrap_or(0),
                field_str(&fields, "serial"),
            ));
        }

        self.creates
            .lock()
            .unwrap()
            .push((collection.to_string(), fields));
        Ok(id)
    }

    async fn read(
        &self,
        _collection: &str,
        _ids: &[i64],
        _options: &SearchOptions,
    ) -> Result<Vec<Value>> {
        Ok(Vec::new())
    }

    async fn update(&self, _collection: &str, _ids: &[i64], _fields: Value) -> Result<bool> {
        Ok(true)
    }

    async fn delete(&self, _collection: &str, _ids: &[i64]) -> Result<bool> {
        Ok(true)
    }

    async fn search_read(
        &self,
        collection: &str,
        domain: &Domain,
        _options: &SearchOptions,
    ) -> Result<Vec<Value>> {
        if collection != collections::CATALOG {
            return Ok(Vec::new());
        }

        // The resolver filters with ("model", ilike, value): contains,
        // case-insensitive.
        let needle = domain_value(domain, "model")
            .and_then(|v| v.as_str().map(|s| s.to_lowercase()))
            .unwrap_or_default();

        let matches = self
            .catalog
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, _, model)| model.to_lowercase().contains(&needle))
            .map(|(id, make, model)| {
                serde_json::json!({ "id": id, "make": make, "model": model })
            })
            .collect();
        Ok(matches)
    }
}
