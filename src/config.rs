//! Environment configuration.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    /// Absent means the in-memory document store.
    pub database_url: Option<String>,
    pub nats_url: Option<String>,
    /// Namespaces every stored document.
    pub project_id: String,
    /// Prefixes every asset path.
    pub asset_account: String,
    /// Required as a bearer token on upload routes when set.
    pub upload_token: Option<String>,
    pub asset_root: PathBuf,
    pub asset_public_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let port = match get("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid { name: "PORT", value: raw })?,
            None => 8083,
        };

        Ok(Self {
            port,
            database_url: get("DATABASE_URL"),
            nats_url: get("NATS_URL"),
            project_id: require("CATALOG_PROJECT_ID")?,
            asset_account: require("ASSET_ACCOUNT_ID")?,
            upload_token: get("ASSET_UPLOAD_TOKEN"),
            asset_root: get("ASSET_ROOT").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("./uploads")),
            asset_public_url: get("ASSET_PUBLIC_URL").unwrap_or_else(|| "/assets".to_string()),
        })
    }
}
