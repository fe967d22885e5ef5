//! JSON-RPC client for the ERP record store
//!
//! Wraps the server's `execute_kw` entry point: every call names a
//! collection, a query method, positional args, and a kwargs map. The six
//! supported methods are surfaced as the [`CatalogApi`] trait so the import
//! pipeline can run against an in-memory store in tests.
//!
//! Calls are synchronous request/response with no retry; a transport failure
//! propagates and aborts the run.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Value, json};

use super::domain::{Domain, SearchOptions};
use crate::config::Connection;

/// The query operations the record store exposes for every collection.
#[async_trait]
pub trait CatalogApi {
    /// Search a collection, returning the matching record ids.
    async fn search(
        &self,
        collection: &str,
        domain: &Domain,
        options: &SearchOptions,
    ) -> Result<Vec<i64>>;

    /// Create one record from a field map, returning the new record id.
    ///
    /// The server returns a single integer id, not a list, despite what the
    /// legacy importer's docs claimed.
    async fn create(&self, collection: &str, fields: Value) -> Result<i64>;

    /// Read records by id, returning one field map per record.
    async fn read(
        &self,
        collection: &str,
        ids: &[i64],
        options: &SearchOptions,
    ) -> Result<Vec<Value>>;

    /// Update records by id with a field map of changes.
    async fn update(&self, collection: &str, ids: &[i64], fields: Value) -> Result<bool>;

    /// Delete records by id.
    async fn delete(&self, collection: &str, ids: &[i64]) -> Result<bool>;

    /// Combined search + read: returns field maps for every match.
    async fn search_read(
        &self,
        collection: &str,
        domain: &Domain,
        options: &SearchOptions,
    ) -> Result<Vec<Value>>;
}

/// JSON-RPC transport for [`CatalogApi`].
///
/// Connection parameters come from the environment once, at construction
/// (see [`Connection::from_env`]); nothing else about the transport is
/// configurable.
pub struct ErpClient {
    http: reqwest::Client,
    endpoint: String,
    database: String,
    user_id: i64,
    password: String,
    call_id: AtomicU64,
}

impl ErpClient {
    pub fn new(connection: &Connection) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            endpoint: format!("{}/jsonrpc", connection.host.trim_end_matches('/')),
            database: connection.database.clone(),
            user_id: connection.user_id,
            password: connection.password.clone(),
            call_id: AtomicU64::new(1),
        })
    }

    /// Issue one `execute_kw` call and unwrap the JSON-RPC envelope.
    async fn execute_kw(
        &self,
        collection: &str,
        method: &str,
        args: Value,
        kwargs: Value,
    ) -> Result<Value> {
        let id = self.call_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "method": "call",
            "params": {
                "service": "object",
                "method": "execute_kw",
                "args": [
                    self.database,
                    self.user_id,
                    self.password,
                    collection,
                    method,
                    args,
                    kwargs,
                ],
            },
            "id": id,
        });

        log::debug!("{} on {} (call id {})", method, collection, id);

        let response = self
            .http
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("{} call on {} failed to reach the server", method, collection))?
            .error_for_status()
            .with_context(|| format!("{} call on {} returned an HTTP error", method, collection))?;

        let body: Value = response
            .json()
            .await
            .with_context(|| format!("{} call on {} returned malformed JSON", method, collection))?;

        if let Some(error) = body.get("error") {
            anyhow::bail!(
                "{} on {} rejected by the server: {}",
                method,
                collection,
                serde_json::to_string(error).unwrap_or_else(|_| "unknown error".to_string())
            );
        }

        Ok(body.get("result").cloned().unwrap_or(Value::Null))
    }
}

#[async_trait]
impl CatalogApi for ErpClient {
    async fn search(
        &self,
        collection: &str,
        domain: &Domain,
        options: &SearchOptions,
    ) -> Result<Vec<i64>> {
        let result = self
            .execute_kw(collection, "search", json!([domain.to_value()]), options.to_kwargs())
            .await?;
        serde_json::from_value(result)
            .with_context(|| format!("search on {} returned a non-id list", collection))
    }

    async fn create(&self, collection: &str, fields: Value) -> Result<i64> {
        let result = self
            .execute_kw(collection, "create", json!([fields]), json!({}))
            .await?;
        result
            .as_i64()
            .with_context(|| format!("create on {} returned no record id", collection))
    }

    async fn read(
        &self,
        collection: &str,
        ids: &[i64],
        options: &SearchOptions,
    ) -> Result<Vec<Value>> {
        let result = self
            .execute_kw(collection, "read", json!([ids]), options.to_kwargs())
            .await?;
        serde_json::from_value(result)
            .with_context(|| format!("read on {} returned a non-record list", collection))
    }

    async fn update(&self, collection: &str, ids: &[i64], fields: Value) -> Result<bool> {
        let result = self
            .execute_kw(collection, "write", json!([ids, fields]), json!({}))
            .await?;
        result
            .as_bool()
            .with_context(|| format!("write on {} returned no acknowledgement", collection))
    }

    async fn delete(&self, collection: &str, ids: &[i64]) -> Result<bool> {
        let result = self
            .execute_kw(collection, "unlink", json!([ids]), json!({}))
            .await?;
        result
            .as_bool()
            .with_context(|| format!("unlink on {} returned no acknowledgement", collection))
    }

    async fn search_read(
        &self,
        collection: &str,
        domain: &Domain,
        options: &SearchOptions,
    ) -> Result<Vec<Value>> {
        let result = self
            .execute_kw(collection, "search_read", json!([domain.to_value()]), options.to_kwargs())
            .await?;
        serde_json::from_value(result)
            .with_context(|| format!("search_read on {} returned a non-record list", collection))
    }
}
