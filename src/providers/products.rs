use std::sync::Arc;
use tokio::sync::watch;

use super::{ProviderCore, ProviderStatus, RecordCache};
use crate::access::CatalogAccess;
use crate::bus::EventBus;
use crate::domain::aggregates::{NewProduct, Product};
use crate::domain::events::ProductChange;
use crate::domain::value_objects::{cache_busted, without_cache_bust};
use crate::Result;

pub type ProductSnapshot = Arc<Vec<Product>>;

pub struct ProductProvider {
    core: ProviderCore<Product>,
    snapshot_tx: watch::Sender<ProductSnapshot>,
}

impl ProductProvider {
    pub fn new(access: CatalogAccess, bus: EventBus) -> Self {
        let (snapshot_tx, _) = watch::channel(Arc::new(Vec::new()));
        Self { core: ProviderCore::new(access, bus), snapshot_tx }
    }

    /// Fetches the full collection from the store, discarding local state.
    pub async fn load(&self) -> Result<usize> {
        self.core.begin_load().await;
        match self.core.access.fetch_all_products().await {
            Ok(products) => {
                let count = self.core.finish_load(products).await;
                self.publish_snapshot().await;
                Ok(count)
            }
            Err(err) => {
                self.core.fail_load(&err).await;
                Err(err)
            }
        }
    }

    pub async fn products(&self) -> Vec<Product> { self.core.snapshot().await }
    pub async fn product(&self, id: &str) -> Option<Product> { self.core.find(id).await }
    pub async fn status(&self) -> ProviderStatus { self.core.status().await }

    /// Follows every change to the product list; categories derive counts from it.
    pub fn watch(&self) -> watch::Receiver<ProductSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub async fn update_product_image(&self, id: &str, url: &str, actor: Option<&str>) -> Result<String> {
        let stamp = self.core.settle(self.core.access.update_product_image(id, url, actor).await).await?;
        let image_url = cache_busted(&without_cache_bust(url), stamp.at);
        let change = ProductChange::ImageUpdated { product_id: id.to_string(), image_url: image_url.clone() };
        self.commit(change, |cache| {
            cache.modify(id, |p| p.set_image(url, stamp.at, stamp.actor.as_str()));
        })
        .await;
        Ok(image_url)
    }

    /// Uploads the file to the asset store, then points the product at it.
    pub async fn replace_product_image(&self, id: &str, file_name: &str, bytes: Vec<u8>, actor: Option<&str>) -> Result<String> {
        let (url, stamp) = self.core.settle(self.core.access.replace_product_image(id, file_name, bytes, actor).await).await?;
        let image_url = cache_busted(&without_cache_bust(&url), stamp.at);
        let change = ProductChange::ImageUpdated { product_id: id.to_string(), image_url: image_url.clone() };
        self.commit(change, |cache| {
            cache.modify(id, |p| p.set_image(&url, stamp.at, stamp.actor.as_str()));
        })
        .await;
        Ok(image_url)
    }

    /// Featuring is refused once [`MAX_FEATURED`](super::MAX_FEATURED) other
    /// products are featured; the store is not contacted in that case.
    pub async fn update_featured_status(&self, id: &str, featured: bool, actor: Option<&str>) -> Result<()> {
        if featured {
            self.core.ensure_featured_capacity(Some(id), |p| p.featured).await?;
        }
        let stamp = self.core.settle(self.core.access.update_product_featured(id, featured, actor).await).await?;
        let change = ProductChange::FeaturedChanged { product_id: id.to_string(), featured };
        self.commit(change, |cache| {
            cache.modify(id, |p| {
                p.featured = featured;
                p.touch(stamp.at, stamp.actor.as_str());
            });
        })
        .await;
        Ok(())
    }

    pub async fn update_stock_status(&self, id: &str, in_stock: bool, actor: Option<&str>) -> Result<()> {
        let stamp = self.core.settle(self.core.access.update_product_stock(id, in_stock, actor).await).await?;
        let change = ProductChange::StockChanged { product_id: id.to_string(), in_stock };
        self.commit(change, |cache| {
            cache.modify(id, |p| {
                p.in_stock = in_stock;
                p.touch(stamp.at, stamp.actor.as_str());
            });
        })
        .await;
        Ok(())
    }

    pub async fn add_product(&self, data: NewProduct, actor: Option<&str>) -> Result<Product> {
        if data.featured {
            self.core.ensure_featured_capacity(None, |p| p.featured).await?;
        }
        let product = self.core.settle(self.core.access.create_product(data, actor).await).await?;
        let change = ProductChange::Added { product_id: product.id.clone() };
        let added = product.clone();
        self.commit(change, |cache| cache.insert(added)).await;
        Ok(product)
    }

    pub async fn remove_product(&self, id: &str) -> Result<()> {
        self.core.settle(self.core.access.delete_product(id).await).await?;
        let change = ProductChange::Removed { product_id: id.to_string() };
        self.commit(change, |cache| {
            cache.remove(id);
        })
        .await;
        Ok(())
    }

    pub async fn update_product(&self, record: Product, actor: Option<&str>) -> Result<Product> {
        let was_featured = self.core.find(&record.id).await.is_some_and(|p| p.featured);
        if record.featured && !was_featured {
            self.core.ensure_featured_capacity(Some(&record.id), |p| p.featured).await?;
        }
        let product = self.core.settle(self.core.access.update_product(&record, actor).await).await?;
        let change = ProductChange::Updated {
            product_id: product.id.clone(),
            name: product.name.clone(),
            image_url: product.image_url.clone(),
            featured: product.featured,
            in_stock: product.in_stock,
        };
        let updated = product.clone();
        self.commit(change, |cache| {
            cache.modify(&product.id, |p| *p = updated);
        })
        .await;
        Ok(product)
    }

    pub async fn featured_count(&self) -> usize {
        self.core.cache.read().await.count(|p| p.featured)
    }

    async fn commit(&self, change: ProductChange, apply: impl FnOnce(&mut RecordCache<Product>)) {
        let tx = &self.snapshot_tx;
        self.core
            .commit(change, |cache| {
                apply(cache);
                tx.send_replace(Arc::new(cache.items().to_vec()));
            })
            .await;
    }

    async fn publish_snapshot(&self) {
        let items = self.core.snapshot().await;
        self.snapshot_tx.send_replace(Arc::new(items));
    }
}
