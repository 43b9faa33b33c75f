//! Product records

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{not_blank, Record};
use crate::domain::value_objects::{cache_busted, without_cache_bust, Slug};

/// A catalog product as held by the product provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub description: String,
    /// Category slug, by value. Not checked against the category set.
    pub category: String,
    pub image_url: String,
    /// Absent means "contact for pricing".
    #[serde(default, with = "rust_decimal::serde::float_option", skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub show_pricing: bool,
    pub featured: bool,
    pub in_stock: bool,
    pub specifications: IndexMap<String, String>,
    pub key_features: Vec<String>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

impl Product {
    /// Price shown to visitors, or `None` when the product is quoted on request.
    pub fn price_label(&self) -> Option<String> {
        if !self.show_pricing {
            return None;
        }
        let price = self.price?;
        Some(match &self.unit {
            Some(unit) if !unit.is_empty() => format!("{price} / {unit}"),
            _ => price.to_string(),
        })
    }

    pub(crate) fn set_image(&mut self, url: &str, at: DateTime<Utc>, actor: &str) {
        self.image_url = cache_busted(&without_cache_bust(url), at);
        self.touch(at, actor);
    }

    pub(crate) fn touch(&mut self, at: DateTime<Utc>, actor: &str) {
        self.updated_at = at;
        self.updated_by = actor.to_string();
    }
}

impl Record for Product {
    const KIND: &'static str = "product";
    fn id(&self) -> &str { &self.id }
}

/// Payload for `add_product`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(custom = "not_blank")]
    pub name: String,
    #[validate(custom = "not_blank")]
    pub description: String,
    #[validate(custom = "not_blank")]
    pub category: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub show_pricing: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub in_stock: Option<bool>,
    #[serde(default)]
    pub specifications: IndexMap<String, String>,
    #[serde(default)]
    pub key_features: Vec<String>,
}

impl NewProduct {
    pub fn slug(&self) -> Slug { Slug::from_name(&self.name) }

    /// This payload's fields over an existing record. An empty image URL keeps
    /// the current image, a missing stock flag keeps the current stock.
    pub fn apply_to(self, existing: &Product) -> Product {
        Product {
            id: existing.id.clone(),
            slug: self.slug().into_string(),
            name: self.name,
            description: self.description,
            category: self.category,
            image_url: if self.image_url.is_empty() { existing.image_url.clone() } else { self.image_url },
            price: self.price,
            unit: self.unit,
            show_pricing: self.show_pricing,
            featured: self.featured,
            in_stock: self.in_stock.unwrap_or(existing.in_stock),
            specifications: self.specifications,
            key_features: self.key_features,
            updated_at: existing.updated_at,
            updated_by: existing.updated_by.clone(),
        }
    }

    pub(crate) fn into_product(self, id: String, at: DateTime<Utc>, actor: &str) -> Product {
        let slug = self.slug().into_string();
        Product {
            id,
            slug,
            name: self.name,
            description: self.description,
            category: self.category,
            image_url: cache_busted(&self.image_url, at),
            price: self.price,
            unit: self.unit,
            show_pricing: self.show_pricing,
            featured: self.featured,
            in_stock: self.in_stock.unwrap_or(true),
            specifications: self.specifications,
            key_features: self.key_features,
            updated_at: at,
            updated_by: actor.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rice() -> NewProduct {
        NewProduct {
            name: "1121 Basmati Rice".into(),
            description: "Extra long grain".into(),
            category: "rice".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_product_validation() {
        assert!(rice().validate().is_ok());
        let blank = NewProduct { name: "   ".into(), ..rice() };
        let err = crate::CatalogError::from(blank.validate().unwrap_err());
        assert_eq!(err, crate::CatalogError::Validation("name is required".into()));
    }

    #[test]
    fn test_into_product_defaults() {
        let p = rice().into_product("p1".into(), Utc::now(), "system");
        assert_eq!(p.slug, "1121-basmati-rice");
        assert!(p.in_stock);
        assert!(p.specifications.is_empty());
        assert_eq!(p.image_url, "");
    }

    #[test]
    fn test_price_label_gated() {
        let mut p = NewProduct { price: Some(Decimal::new(4250, 2)), unit: Some("MT".into()), ..rice() }
            .into_product("p1".into(), Utc::now(), "system");
        assert_eq!(p.price_label(), None);
        p.show_pricing = true;
        assert_eq!(p.price_label().as_deref(), Some("42.50 / MT"));
    }
}
