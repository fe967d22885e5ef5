//! Run configuration
//!
//! Connection parameters come from the environment (a `.env` file works via
//! dotenvy), are validated once at startup, and travel as an explicit struct
//! from then on. Validation failures name the variable that is missing so
//! the fix is a one-line `export`.

use std::env;

use anyhow::{Context, Result, anyhow};

/// Connection parameters for the ERP's JSON-RPC endpoint.
#[derive(Clone, Debug)]
pub struct Connection {
    /// Base URL of the instance, including the `http(s)://` scheme
    pub host: String,
    /// Database name, case sensitive
    pub database: String,
    /// Database id of the user to authenticate as
    pub user_id: i64,
    /// Password for that user
    pub password: String,
}

impl Connection {
    /// Read and validate the connection from the environment.
    ///
    /// `ERP_HOST`, `ERP_DATABASE` and `ERP_PASSWORD` are required;
    /// `ERP_USER_ID` defaults to the admin user (1) with a warning.
    pub fn from_env() -> Result<Self> {
        let host = require_env("ERP_HOST")?;
        let database = require_env("ERP_DATABASE")?;
        let password = require_env("ERP_PASSWORD")?;

        let user_id = match nonempty_env("ERP_USER_ID") {
            Some(raw) => parse_user_id(&raw)?,
            None => {
                log::warn!("ERP_USER_ID is not set, defaulting to the admin user (1)");
                1
            }
        };

        Ok(Self {
            host,
            database,
            user_id,
            password,
        })
    }
}

/// Line-item destinations for the run. A zero id disables that line type.
#[derive(Clone, Copy, Debug, Default)]
pub struct Targets {
    /// Database id of the asset catalog receiving catalog lines
    pub asset_catalog: i64,
    /// Database id of the data destruction list receiving disposition lines
    pub data_destruction: i64,
}

fn nonempty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require_env(name: &str) -> Result<String> {
    nonempty_env(name).ok_or_else(|| {
        anyhow!(
            "{name} is required; set it with `export {name}=...` and run again"
        )
    })
}

fn parse_user_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse()
        .with_context(|| format!("ERP_USER_ID must be a numeric database id, got '{raw}'"))
}
