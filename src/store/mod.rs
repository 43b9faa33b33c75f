//! Remote catalog store port.
//!
//! The catalog is kept in a document database: three collections of JSON
//! objects keyed by store-assigned ids. Only the operations the access layer
//! depends on are modelled.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;

use crate::Result;

/// A stored document body. The id lives outside the body.
pub type Document = Map<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    Products,
    Categories,
    Achievements,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Categories => "categories",
            Self::Achievements => "achievements",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document in the collection, in creation order.
    async fn list(&self, collection: Collection) -> Result<Vec<(String, Document)>>;

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>>;

    /// Stores a new document and returns the generated id.
    async fn create(&self, collection: Collection, doc: Document) -> Result<String>;

    /// Merges top-level fields of `patch` into the document. Returns false if absent.
    async fn merge(&self, collection: Collection, id: &str, patch: Document) -> Result<bool>;

    /// Replaces the whole body. Returns false if absent.
    async fn replace(&self, collection: Collection, id: &str, doc: Document) -> Result<bool>;

    /// Hard delete. Returns false if absent.
    async fn delete(&self, collection: Collection, id: &str) -> Result<bool>;
}

pub(crate) fn new_document_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
