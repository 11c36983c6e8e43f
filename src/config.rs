//! Service configuration.
//!
//! Loaded from an optional JSON file; binaries then apply command-line
//! overrides on top.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address, `host:port`.
    pub bind: String,

    /// Basic-auth user for the private endpoints.
    pub admin_user: String,

    /// Basic-auth password for the private endpoints.
    pub admin_password: String,

    /// Realm sent in `WWW-Authenticate` challenges.
    pub realm: String,

    /// CSV file loaded into the store at startup.
    pub data_path: Option<PathBuf>,

    /// Messages per transaction when loading CSV data.
    pub batch_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            admin_user: "admin".to_string(),
            admin_password: "back-challenge".to_string(),
            realm: "Please enter credentials:".to_string(),
            data_path: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: ServerConfig = serde_json::from_slice(&data)
            .with_context(|| format!("parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be greater than zero");
        }
        if self.admin_user.is_empty() {
            bail!("admin_user must not be empty");
        }
        if self.bind.is_empty() {
            bail!("bind address must not be empty");
        }
        Ok(())
    }
}
