//! Catalog access: translation between stored documents and records.
//!
//! No caching and no retries. Partial writes read the document before writing
//! (absent id is `NotFound`) and read it again afterwards; a field that did not
//! take the written value is reported as `Persistence`.

mod achievements;
mod categories;
pub(crate) mod codec;
mod products;

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;

use crate::assets::AssetStore;
use crate::domain::value_objects::Actor;
use crate::store::{Collection, Document, DocumentStore};
use crate::{CatalogError, Result};

/// Asset folder for product images.
pub const PRODUCT_IMAGE_FOLDER: &str = "products";
/// Asset folder for category images.
pub const CATEGORY_IMAGE_FOLDER: &str = "categories";

/// When and by whom a write was made.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stamp {
    pub at: DateTime<Utc>,
    pub actor: Actor,
}

impl Stamp {
    pub fn now(actor: Option<&str>) -> Self {
        Self { at: Utc::now(), actor: Actor::from_optional(actor) }
    }

    fn fields(&self) -> [(&'static str, Value); 2] {
        [
            ("updatedAt", Value::String(self.at.to_rfc3339())),
            ("updatedBy", Value::String(self.actor.to_string())),
        ]
    }
}

#[derive(Clone)]
pub struct CatalogAccess {
    store: Arc<dyn DocumentStore>,
    assets: Arc<dyn AssetStore>,
}

impl CatalogAccess {
    pub fn new(store: Arc<dyn DocumentStore>, assets: Arc<dyn AssetStore>) -> Self {
        Self { store, assets }
    }

    /// Writes bytes over an existing asset path.
    pub async fn overwrite_asset(&self, path: &str, bytes: Vec<u8>) -> Result<String> {
        self.assets.overwrite(path, bytes).await
    }

    async fn upload(&self, folder: &str, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        self.assets.upload(folder, file_name, bytes).await
    }

    /// Read-before-write, merge, read-after-write.
    async fn patch_verified(
        &self,
        collection: Collection,
        kind: &'static str,
        id: &str,
        fields: impl IntoIterator<Item = (&'static str, Value)>,
        stamp: &Stamp,
    ) -> Result<()> {
        let mut patch = Document::new();
        for (field, value) in fields.into_iter().chain(stamp.fields()) {
            patch.insert(field.to_string(), value);
        }

        if self.store.get(collection, id).await?.is_none() {
            return Err(CatalogError::not_found(kind, id));
        }
        if !self.store.merge(collection, id, patch.clone()).await? {
            return Err(CatalogError::not_found(kind, id));
        }

        let stored = self
            .store
            .get(collection, id)
            .await?
            .ok_or_else(|| CatalogError::Persistence(format!("{kind} {id} vanished after write")))?;
        if let Some((field, _)) = patch.iter().find(|(field, expected)| stored.get(field.as_str()) != Some(*expected)) {
            tracing::warn!(%collection, id, field = %field, "write did not persist");
            return Err(CatalogError::Persistence(format!("{kind} {id}: field {field} did not persist")));
        }
        Ok(())
    }
}
