//! View-side copies of catalog records.
//!
//! A card captures the fields it renders when it is mounted and afterwards only
//! learns about changes from the event bus. Events sent while no card is
//! following are lost; a card mounted later starts from whatever the provider
//! holds at that time.

use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

use crate::bus::EventBus;
use crate::domain::aggregates::Product;
use crate::domain::events::{CatalogChange, CatalogEvent, ProductChange};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductCard {
    pub product_id: String,
    pub name: String,
    pub image_url: String,
    pub featured: bool,
    pub in_stock: bool,
    pub removed: bool,
}

impl ProductCard {
    pub fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            image_url: product.image_url.clone(),
            featured: product.featured,
            in_stock: product.in_stock,
            removed: false,
        }
    }

    /// Overwrites the local copy when the event concerns this product.
    /// Returns whether anything changed.
    pub fn apply(&mut self, event: &CatalogEvent) -> bool {
        let CatalogChange::Product(change) = &event.change else { return false };
        if event.change.entity_id() != self.product_id {
            return false;
        }
        let before = self.clone();
        match change {
            ProductChange::ImageUpdated { image_url, .. } => self.image_url = image_url.clone(),
            ProductChange::FeaturedChanged { featured, .. } => self.featured = *featured,
            ProductChange::StockChanged { in_stock, .. } => self.in_stock = *in_stock,
            ProductChange::Updated { name, image_url, featured, in_stock, .. } => {
                self.name = name.clone();
                self.image_url = image_url.clone();
                self.featured = *featured;
                self.in_stock = *in_stock;
            }
            ProductChange::Removed { .. } => self.removed = true,
            ProductChange::Added { .. } => {}
        }
        *self != before
    }
}

/// A mounted card following the bus. Dropping it unmounts the card.
pub struct CardFollower {
    card: Arc<RwLock<ProductCard>>,
    task: JoinHandle<()>,
}

impl CardFollower {
    pub fn mount(bus: &EventBus, card: ProductCard) -> Self {
        let card = Arc::new(RwLock::new(card));
        let task = tokio::spawn(follow(bus.subscribe(), card.clone()));
        Self { card, task }
    }

    pub async fn card(&self) -> ProductCard {
        self.card.read().await.clone()
    }
}

impl Drop for CardFollower {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn follow(mut rx: broadcast::Receiver<CatalogEvent>, card: Arc<RwLock<ProductCard>>) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                if card.write().await.apply(&event) {
                    tracing::trace!(subject = %event.change.subject(), "card refreshed");
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "card fell behind the catalog event stream");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn card() -> ProductCard {
        ProductCard {
            product_id: "p1".into(),
            name: "Sesame Seeds".into(),
            image_url: "old.jpg".into(),
            featured: false,
            in_stock: true,
            removed: false,
        }
    }

    #[test]
    fn test_apply_ignores_other_ids() {
        let mut c = card();
        let event = CatalogEvent { at: Utc::now(), change: ProductChange::StockChanged { product_id: "p2".into(), in_stock: false }.into() };
        assert!(!c.apply(&event));
        assert!(c.in_stock);
    }

    #[test]
    fn test_apply_image_and_removal() {
        let mut c = card();
        let image = CatalogEvent::now(ProductChange::ImageUpdated { product_id: "p1".into(), image_url: "new.jpg?v=1".into() }.into());
        assert!(c.apply(&image));
        assert_eq!(c.image_url, "new.jpg?v=1");
        assert!(c.apply(&CatalogEvent::now(ProductChange::Removed { product_id: "p1".into() }.into())));
        assert!(c.removed);
    }

    #[test]
    fn test_apply_full_update() {
        let mut c = card();
        let update = ProductChange::Updated {
            product_id: "p1".into(),
            name: "Black Sesame Seeds".into(),
            image_url: "black.jpg?v=2".into(),
            featured: true,
            in_stock: false,
        };
        assert!(c.apply(&CatalogEvent::now(update.into())));
        assert_eq!(c.name, "Black Sesame Seeds");
        assert_eq!(c.image_url, "black.jpg?v=2");
        assert!(c.featured);
        assert!(!c.in_stock);
    }
}
