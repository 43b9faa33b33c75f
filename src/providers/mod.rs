//! Catalog state providers.
//!
//! One long-lived in-memory collection per entity kind. Loading always goes to
//! the store; mutations write through [`CatalogAccess`], apply the same change
//! to the local collection once the write returns, then publish on the
//! [`EventBus`]. A failed write leaves the collection as it was and is kept as
//! the provider's `last_error` until the next success. Nothing is rolled back
//! or retried on the caller's behalf.

mod achievements;
mod categories;
mod products;

pub use achievements::AchievementProvider;
pub use categories::CategoryProvider;
pub use products::{ProductProvider, ProductSnapshot};

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::access::CatalogAccess;
use crate::bus::EventBus;
use crate::domain::aggregates::Record;
use crate::domain::events::CatalogChange;
use crate::{CatalogError, Result};

/// Upper bound on featured products, and separately on featured categories.
pub const MAX_FEATURED: usize = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Uninitialized,
    Loading,
    Ready,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub phase: Phase,
    pub last_error: Option<String>,
}

/// The three providers wired together: categories follow the product list.
#[derive(Clone)]
pub struct Catalog {
    pub access: CatalogAccess,
    pub products: Arc<ProductProvider>,
    pub categories: Arc<CategoryProvider>,
    pub achievements: Arc<AchievementProvider>,
    pub bus: EventBus,
}

impl Catalog {
    pub fn new(access: CatalogAccess, bus: EventBus) -> Self {
        let products = Arc::new(ProductProvider::new(access.clone(), bus.clone()));
        let categories = Arc::new(CategoryProvider::new(access.clone(), bus.clone(), products.watch()));
        let achievements = Arc::new(AchievementProvider::new(access.clone(), bus.clone()));
        Self { access, products, categories, achievements, bus }
    }

    /// Fresh fetch of every collection. Each provider loads independently;
    /// the first failure is returned after all three have been attempted.
    pub async fn load(&self) -> Result<()> {
        let (products, categories, achievements) =
            tokio::join!(self.products.load(), self.categories.load(), self.achievements.load());
        products?;
        categories?;
        achievements?;
        Ok(())
    }

    pub async fn reload(&self) -> Result<()> { self.load().await }
}

/// Records in store order, addressed by id.
#[derive(Debug)]
pub(crate) struct RecordCache<T> {
    items: Vec<T>,
    status: ProviderStatus,
}

impl<T: Record> RecordCache<T> {
    fn new() -> Self {
        Self { items: Vec::new(), status: ProviderStatus::default() }
    }

    pub(crate) fn items(&self) -> &[T] { &self.items }

    fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|r| r.id() == id)
    }

    fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
    }

    fn insert(&mut self, record: T) {
        match self.items.iter_mut().find(|r| r.id() == record.id()) {
            Some(existing) => *existing = record,
            None => self.items.push(record),
        }
    }

    fn modify(&mut self, id: &str, f: impl FnOnce(&mut T)) -> bool {
        match self.items.iter_mut().find(|r| r.id() == id) {
            Some(record) => {
                f(record);
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: &str) -> Option<T> {
        let index = self.items.iter().position(|r| r.id() == id)?;
        Some(self.items.remove(index))
    }

    fn count(&self, predicate: impl Fn(&T) -> bool) -> usize {
        self.items.iter().filter(|r| predicate(r)).count()
    }
}

/// Shared lifecycle and bookkeeping for the three providers.
pub(crate) struct ProviderCore<T> {
    access: CatalogAccess,
    bus: EventBus,
    cache: RwLock<RecordCache<T>>,
}

impl<T: Record> ProviderCore<T> {
    fn new(access: CatalogAccess, bus: EventBus) -> Self {
        Self { access, bus, cache: RwLock::new(RecordCache::new()) }
    }

    async fn snapshot(&self) -> Vec<T> {
        self.cache.read().await.items.clone()
    }

    async fn find(&self, id: &str) -> Option<T> {
        self.cache.read().await.get(id).cloned()
    }

    async fn status(&self) -> ProviderStatus {
        self.cache.read().await.status.clone()
    }

    async fn begin_load(&self) {
        self.cache.write().await.status.phase = Phase::Loading;
    }

    async fn finish_load(&self, items: Vec<T>) -> usize {
        let mut cache = self.cache.write().await;
        let count = items.len();
        cache.replace_all(items);
        cache.status = ProviderStatus { phase: Phase::Ready, last_error: None };
        tracing::info!(kind = T::KIND, count, "provider ready");
        count
    }

    async fn fail_load(&self, err: &CatalogError) {
        let mut cache = self.cache.write().await;
        let phase = if cache.items.is_empty() { Phase::Uninitialized } else { Phase::Ready };
        cache.status.phase = phase;
        cache.status.last_error = Some(err.to_string());
        tracing::warn!(kind = T::KIND, error = %err, "provider load failed");
    }

    /// Featured-cap check against the in-memory collection, excluding `id`.
    async fn ensure_featured_capacity(&self, id: Option<&str>, is_featured: impl Fn(&T) -> bool) -> Result<()> {
        let featured = self.cache.read().await.count(|r| is_featured(r) && Some(r.id()) != id);
        if featured >= MAX_FEATURED {
            let err = CatalogError::Capacity { kind: plural(T::KIND), limit: MAX_FEATURED };
            self.record_error(&err).await;
            return Err(err);
        }
        Ok(())
    }

    /// Applies a successful write locally and announces it.
    async fn commit(&self, change: impl Into<CatalogChange>, apply: impl FnOnce(&mut RecordCache<T>)) {
        {
            let mut cache = self.cache.write().await;
            apply(&mut *cache);
            cache.status.last_error = None;
        }
        self.bus.publish(change);
    }

    async fn record_error(&self, err: &CatalogError) {
        tracing::warn!(kind = T::KIND, error = %err, "catalog mutation failed");
        self.cache.write().await.status.last_error = Some(err.to_string());
    }

    /// Passes `result` through, remembering a failure as the last error.
    async fn settle<R>(&self, result: Result<R>) -> Result<R> {
        if let Err(err) = &result {
            self.record_error(err).await;
        }
        result
    }
}

fn plural(kind: &'static str) -> &'static str {
    match kind {
        "product" => "products",
        "category" => "categories",
        "achievement" => "achievements",
        other => other,
    }
}
