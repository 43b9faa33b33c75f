//! Catalog change events
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One notification on the catalog change stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEvent {
    pub at: DateTime<Utc>,
    pub change: CatalogChange,
}

impl CatalogEvent {
    pub fn now(change: CatalogChange) -> Self {
        Self { at: Utc::now(), change }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CatalogChange {
    Product(ProductChange),
    Category(CategoryChange),
    Achievement(AchievementChange),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ProductChange {
    Added { product_id: String },
    /// Full overwrite; carries the fields consumers keep copies of.
    Updated { product_id: String, name: String, image_url: String, featured: bool, in_stock: bool },
    ImageUpdated { product_id: String, image_url: String },
    FeaturedChanged { product_id: String, featured: bool },
    StockChanged { product_id: String, in_stock: bool },
    Removed { product_id: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum CategoryChange {
    Added { category_id: String },
    ImageUpdated { category_id: String, image_url: String },
    FeaturedChanged { category_id: String, featured: bool },
    Removed { category_id: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum AchievementChange {
    Added { achievement_id: String },
    Updated { achievement_id: String },
    Removed { achievement_id: String },
}

impl CatalogChange {
    /// Id of the record the change concerns.
    pub fn entity_id(&self) -> &str {
        match self {
            Self::Product(c) => match c {
                ProductChange::Added { product_id }
                | ProductChange::Updated { product_id, .. }
                | ProductChange::ImageUpdated { product_id, .. }
                | ProductChange::FeaturedChanged { product_id, .. }
                | ProductChange::StockChanged { product_id, .. }
                | ProductChange::Removed { product_id } => product_id,
            },
            Self::Category(c) => match c {
                CategoryChange::Added { category_id }
                | CategoryChange::ImageUpdated { category_id, .. }
                | CategoryChange::FeaturedChanged { category_id, .. }
                | CategoryChange::Removed { category_id } => category_id,
            },
            Self::Achievement(c) => match c {
                AchievementChange::Added { achievement_id }
                | AchievementChange::Updated { achievement_id }
                | AchievementChange::Removed { achievement_id } => achievement_id,
            },
        }
    }

    /// New image URL, for image changes only.
    pub fn image_url(&self) -> Option<&str> {
        match self {
            Self::Product(ProductChange::ImageUpdated { image_url, .. })
            | Self::Category(CategoryChange::ImageUpdated { image_url, .. }) => Some(image_url),
            _ => None,
        }
    }

    /// Dotted subject, e.g. `catalog.product.image_updated`.
    pub fn subject(&self) -> String {
        let (entity, action) = match self {
            Self::Product(c) => ("product", match c {
                ProductChange::Added { .. } => "added",
                ProductChange::Updated { .. } => "updated",
                ProductChange::ImageUpdated { .. } => "image_updated",
                ProductChange::FeaturedChanged { .. } => "featured_changed",
                ProductChange::StockChanged { .. } => "stock_changed",
                ProductChange::Removed { .. } => "removed",
            }),
            Self::Category(c) => ("category", match c {
                CategoryChange::Added { .. } => "added",
                CategoryChange::ImageUpdated { .. } => "image_updated",
                CategoryChange::FeaturedChanged { .. } => "featured_changed",
                CategoryChange::Removed { .. } => "removed",
            }),
            Self::Achievement(c) => ("achievement", match c {
                AchievementChange::Added { .. } => "added",
                AchievementChange::Updated { .. } => "updated",
                AchievementChange::Removed { .. } => "removed",
            }),
        };
        format!("catalog.{entity}.{action}")
    }
}

impl From<ProductChange> for CatalogChange {
    fn from(c: ProductChange) -> Self { Self::Product(c) }
}

impl From<CategoryChange> for CatalogChange {
    fn from(c: CategoryChange) -> Self { Self::Category(c) }
}

impl From<AchievementChange> for CatalogChange {
    fn from(c: AchievementChange) -> Self { Self::Achievement(c) }
}
