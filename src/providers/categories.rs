use tokio::sync::watch;

use super::products::ProductSnapshot;
use super::{ProviderCore, ProviderStatus};
use crate::access::CatalogAccess;
use crate::bus::EventBus;
use crate::domain::aggregates::{Category, NewCategory, Product};
use crate::domain::events::CategoryChange;
use crate::domain::value_objects::{cache_busted, without_cache_bust};
use crate::Result;

/// Categories with `product_count` derived from the product provider's list.
pub struct CategoryProvider {
    core: ProviderCore<Category>,
    products: watch::Receiver<ProductSnapshot>,
}

impl CategoryProvider {
    /// `products` comes from [`ProductProvider::watch`](super::ProductProvider::watch).
    pub fn new(access: CatalogAccess, bus: EventBus, products: watch::Receiver<ProductSnapshot>) -> Self {
        Self { core: ProviderCore::new(access, bus), products }
    }

    /// Seeds missing baseline categories, then fetches the live set.
    pub async fn load(&self) -> Result<usize> {
        self.core.begin_load().await;
        let fetched = match self.core.access.ensure_baseline_categories().await {
            Ok(_) => self.core.access.fetch_all_categories().await,
            Err(err) => Err(err),
        };
        match fetched {
            Ok(categories) => Ok(self.core.finish_load(categories).await),
            Err(err) => {
                self.core.fail_load(&err).await;
                Err(err)
            }
        }
    }

    /// Current categories with counts recomputed against the latest products.
    pub async fn categories(&self) -> Vec<Category> {
        let mut categories = self.core.snapshot().await;
        let products = self.products.borrow().clone();
        for category in &mut categories {
            category.product_count = count_in(&products, category.slug.as_str());
        }
        categories
    }

    pub async fn category(&self, id: &str) -> Option<Category> {
        let mut category = self.core.find(id).await?;
        category.product_count = count_in(&self.products.borrow(), category.slug.as_str());
        Some(category)
    }

    pub async fn status(&self) -> ProviderStatus { self.core.status().await }

    pub async fn update_category_image(&self, id: &str, url: &str, actor: Option<&str>) -> Result<String> {
        let stamp = self.core.settle(self.core.access.update_category_image(id, url, actor).await).await?;
        let image_url = cache_busted(&without_cache_bust(url), stamp.at);
        let change = CategoryChange::ImageUpdated { category_id: id.to_string(), image_url: image_url.clone() };
        self.core
            .commit(change, |cache| {
                cache.modify(id, |c| c.set_image(url, stamp.at, stamp.actor.as_str()));
            })
            .await;
        Ok(image_url)
    }

    pub async fn replace_category_image(&self, id: &str, file_name: &str, bytes: Vec<u8>, actor: Option<&str>) -> Result<String> {
        let (url, stamp) = self.core.settle(self.core.access.replace_category_image(id, file_name, bytes, actor).await).await?;
        let image_url = cache_busted(&without_cache_bust(&url), stamp.at);
        let change = CategoryChange::ImageUpdated { category_id: id.to_string(), image_url: image_url.clone() };
        self.core
            .commit(change, |cache| {
                cache.modify(id, |c| c.set_image(&url, stamp.at, stamp.actor.as_str()));
            })
            .await;
        Ok(image_url)
    }

    pub async fn update_featured_status(&self, id: &str, featured: bool, actor: Option<&str>) -> Result<()> {
        if featured {
            self.core.ensure_featured_capacity(Some(id), |c| c.featured).await?;
        }
        let stamp = self.core.settle(self.core.access.update_category_featured(id, featured, actor).await).await?;
        let change = CategoryChange::FeaturedChanged { category_id: id.to_string(), featured };
        self.core
            .commit(change, |cache| {
                cache.modify(id, |c| {
                    c.featured = featured;
                    c.touch(stamp.at, stamp.actor.as_str());
                });
            })
            .await;
        Ok(())
    }

    pub async fn add_category(&self, data: NewCategory, actor: Option<&str>) -> Result<Category> {
        if data.featured {
            self.core.ensure_featured_capacity(None, |c| c.featured).await?;
        }
        let category = self.core.settle(self.core.access.create_category(data, actor).await).await?;
        let change = CategoryChange::Added { category_id: category.id.clone() };
        let added = category.clone();
        self.core.commit(change, |cache| cache.insert(added)).await;
        Ok(category)
    }

    /// Soft delete in the store; the category leaves the local list either way.
    pub async fn remove_category(&self, id: &str, actor: Option<&str>) -> Result<()> {
        self.core.settle(self.core.access.delete_category(id, actor).await).await?;
        let change = CategoryChange::Removed { category_id: id.to_string() };
        self.core
            .commit(change, |cache| {
                cache.remove(id);
            })
            .await;
        Ok(())
    }
}

fn count_in(products: &[Product], slug: &str) -> usize {
    products.iter().filter(|p| p.category == slug).count()
}
