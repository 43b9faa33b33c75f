//! Agro Catalog
//!
//! Back office state for a bulk-commodity showcase: products, categories and
//! achievements held in memory, persisted to a document store, and kept in
//! sync across consumers through one typed change stream.
//!
//! ## Layers
//! - [`store`] and [`assets`]: ports to the remote document and asset stores
//! - [`access`]: translation between stored documents and records
//! - [`providers`]: long-lived in-memory collections with mutation operations
//! - [`bus`]: process-wide change notifications
//! - [`api`]: HTTP surface for the admin back office

pub mod access;
pub mod api;
pub mod assets;
pub mod bus;
pub mod config;
pub mod consumer;
pub mod domain;
pub mod providers;
pub mod relay;
pub mod seed;
pub mod store;

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("At most {limit} {kind} can be featured")]
    Capacity { kind: &'static str, limit: usize },
}

impl CatalogError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }

    pub fn persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<validator::ValidationErrors> for CatalogError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let reason = errs
                    .iter()
                    .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "is invalid".to_string());
                format!("{field} {reason}")
            })
            .collect();
        fields.sort();
        Self::Validation(fields.join(", "))
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Persistence(format!("malformed document: {err}"))
    }
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
