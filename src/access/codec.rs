//! Document <-> record translation.
//!
//! Stored documents are loose: fields may be missing, timestamps may be RFC 3339
//! strings, epoch millis or `{seconds, nanoseconds}` objects, and prices may be
//! numbers or strings. Decoding fills every gap with the record default.

use chrono::{DateTime, TimeZone, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::aggregates::{Achievement, Category, Product};
use crate::domain::value_objects::{cache_busted, without_cache_bust, Actor, CategorySlug, Slug};
use crate::seed::BaselineCategory;
use crate::store::Document;
use crate::{CatalogError, Result};

pub(crate) fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s).ok().map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::Object(map) => {
            let seconds = map.get("seconds").or_else(|| map.get("_seconds"))?.as_i64()?;
            let nanos = map
                .get("nanoseconds")
                .or_else(|| map.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            Utc.timestamp_opt(seconds, u32::try_from(nanos).ok()?).single()
        }
        _ => None,
    }
}

fn timestamp_or_epoch(value: Option<&Value>) -> DateTime<Utc> {
    value.and_then(parse_timestamp).unwrap_or_default()
}

fn parse_price(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.to_string().parse().ok().or_else(|| Decimal::from_scientific(&n.to_string()).ok()),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse().ok(),
        _ => None,
    }
}

fn stringify(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ProductDocument {
    name: Option<String>,
    slug: Option<String>,
    description: Option<String>,
    category: Option<String>,
    image_url: Option<String>,
    price: Option<Value>,
    unit: Option<String>,
    show_pricing: Option<bool>,
    featured: Option<bool>,
    in_stock: Option<bool>,
    specifications: Option<IndexMap<String, Value>>,
    key_features: Option<Vec<Value>>,
    updated_at: Option<Value>,
    updated_by: Option<String>,
}

pub(crate) fn decode_product(id: String, doc: Document) -> Result<Product> {
    let raw: ProductDocument = serde_json::from_value(Value::Object(doc))?;
    let updated_at = timestamp_or_epoch(raw.updated_at.as_ref());
    let name = raw.name.unwrap_or_default();
    let slug = non_empty(raw.slug).unwrap_or_else(|| Slug::from_name(&name).into_string());
    Ok(Product {
        id,
        slug,
        image_url: cache_busted(&raw.image_url.unwrap_or_default(), updated_at),
        name,
        description: raw.description.unwrap_or_default(),
        category: raw.category.unwrap_or_default(),
        price: raw.price.as_ref().and_then(parse_price),
        unit: non_empty(raw.unit),
        show_pricing: raw.show_pricing.unwrap_or(false),
        featured: raw.featured.unwrap_or(false),
        in_stock: raw.in_stock.unwrap_or(true),
        specifications: raw
            .specifications
            .unwrap_or_default()
            .into_iter()
            .map(|(k, v)| (k, stringify(v)))
            .collect(),
        key_features: raw
            .key_features
            .unwrap_or_default()
            .into_iter()
            .map(stringify)
            .filter(|f| !f.is_empty())
            .collect(),
        updated_at,
        updated_by: raw.updated_by.unwrap_or_else(|| Actor::SYSTEM.to_string()),
    })
}

/// Full document for a product. Price and unit are left out entirely when
/// pricing is disabled so stale numbers never reach the store.
pub(crate) fn encode_product(product: &Product) -> Result<Document> {
    let Value::Object(mut doc) = serde_json::to_value(product)? else {
        return Err(CatalogError::Persistence("product did not encode to an object".into()));
    };
    doc.remove("id");
    doc.insert("imageUrl".into(), Value::String(without_cache_bust(&product.image_url)));
    if !product.show_pricing {
        doc.remove("price");
        doc.remove("unit");
    }
    Ok(doc)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CategoryDocument {
    slug: Option<String>,
    title: Option<String>,
    description: Option<String>,
    image: Option<String>,
    image_url: Option<String>,
    featured: Option<bool>,
    deleted: Option<bool>,
    updated_at: Option<Value>,
    updated_by: Option<String>,
}

/// A category document after decoding, before baseline merging.
#[derive(Debug)]
pub(crate) struct StoredCategory {
    pub slug: Option<CategorySlug>,
    pub deleted: bool,
    category: CategoryDocument,
}

pub(crate) fn decode_category_doc(doc: Document) -> Result<StoredCategory> {
    let raw: CategoryDocument = serde_json::from_value(Value::Object(doc))?;
    Ok(StoredCategory {
        slug: raw.slug.as_deref().and_then(CategorySlug::parse),
        deleted: raw.deleted.unwrap_or(false),
        category: raw,
    })
}

impl StoredCategory {
    /// Overlays stored fields onto the baseline entry for the same slug.
    pub(crate) fn into_category(self, id: String, slug: CategorySlug, baseline: Option<&BaselineCategory>) -> Category {
        let raw = self.category;
        let updated_at = raw.updated_at.as_ref().and_then(parse_timestamp);
        let image = non_empty(raw.image)
            .or_else(|| non_empty(raw.image_url))
            .or_else(|| baseline.map(|b| b.image.to_string()))
            .unwrap_or_default();
        let image = match updated_at {
            Some(at) => cache_busted(&image, at),
            None => image,
        };
        Category {
            id,
            slug,
            title: non_empty(raw.title)
                .or_else(|| baseline.map(|b| b.title.to_string()))
                .unwrap_or_else(|| slug.to_string()),
            description: non_empty(raw.description)
                .or_else(|| baseline.map(|b| b.description.to_string()))
                .unwrap_or_default(),
            image_url: image.clone(),
            image,
            product_count: 0,
            featured: raw.featured.unwrap_or(false),
            updated_at,
            updated_by: raw.updated_by,
        }
    }
}

pub(crate) fn encode_category(category: &Category) -> Result<Document> {
    let Value::Object(mut doc) = serde_json::to_value(category)? else {
        return Err(CatalogError::Persistence("category did not encode to an object".into()));
    };
    doc.remove("id");
    doc.remove("productCount");
    doc.insert("image".into(), Value::String(without_cache_bust(&category.image)));
    doc.insert("imageUrl".into(), Value::String(without_cache_bust(&category.image_url)));
    doc.insert("deleted".into(), Value::Bool(false));
    Ok(doc)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct AchievementDocument {
    year: Option<Value>,
    title: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
    certificate_url: Option<String>,
    created_at: Option<Value>,
    updated_at: Option<Value>,
}

pub(crate) fn decode_achievement(id: String, doc: Document) -> Result<Achievement> {
    let raw: AchievementDocument = serde_json::from_value(Value::Object(doc))?;
    let created_at = timestamp_or_epoch(raw.created_at.as_ref());
    let updated_at = raw.updated_at.as_ref().and_then(parse_timestamp).unwrap_or(created_at);
    Ok(Achievement {
        id,
        year: raw.year.map(stringify).unwrap_or_default(),
        title: raw.title.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        image_url: non_empty(raw.image_url).map(|u| cache_busted(&u, updated_at)),
        certificate_url: non_empty(raw.certificate_url),
        created_at,
        updated_at,
    })
}

pub(crate) fn encode_achievement(achievement: &Achievement) -> Result<Document> {
    let Value::Object(mut doc) = serde_json::to_value(achievement)? else {
        return Err(CatalogError::Persistence("achievement did not encode to an object".into()));
    };
    doc.remove("id");
    if let Some(url) = &achievement.image_url {
        doc.insert("imageUrl".into(), Value::String(without_cache_bust(url)));
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_decode_product_fills_defaults() {
        let p = decode_product("p1".into(), doc(json!({
            "name": "Refined Sunflower Oil",
            "description": "Bulk tanker",
            "category": "oil",
            "imageUrl": "https://cdn.example/oil.jpg",
            "updatedAt": 1_700_000_000_000i64
        })))
        .unwrap();
        assert_eq!(p.slug, "refined-sunflower-oil");
        assert!(p.in_stock);
        assert!(!p.featured);
        assert!(p.specifications.is_empty());
        assert!(p.key_features.is_empty());
        assert_eq!(p.updated_by, "system");
        assert_eq!(p.image_url, "https://cdn.example/oil.jpg?v=1700000000000");
    }

    #[test]
    fn test_decode_product_treats_null_as_missing() {
        let p = decode_product("p4".into(), doc(json!({
            "name": "Crude Palm Oil",
            "description": null,
            "category": null,
            "slug": null,
            "imageUrl": null,
            "inStock": null,
            "keyFeatures": ["Flexitank", null],
            "specifications": null
        })))
        .unwrap();
        assert_eq!(p.description, "");
        assert_eq!(p.category, "");
        assert_eq!(p.slug, "crude-palm-oil");
        assert_eq!(p.image_url, "");
        assert!(p.in_stock);
        assert_eq!(p.key_features, vec!["Flexitank"]);

        let a = decode_achievement("a2".into(), doc(json!({"year": null, "title": "Award", "description": null}))).unwrap();
        assert_eq!(a.year, "");
        assert_eq!(a.description, "");
    }

    #[test]
    fn test_decode_product_legacy_shapes() {
        let p = decode_product("p2".into(), doc(json!({
            "name": "Sugar S30",
            "slug": "icumsa-45",
            "price": "512.75",
            "specifications": {"Moisture": "0.04%", "Grade": 30},
            "updatedAt": {"seconds": 1_700_000_000, "nanoseconds": 0}
        })))
        .unwrap();
        assert_eq!(p.slug, "icumsa-45");
        assert_eq!(p.price, Some(Decimal::new(51275, 2)));
        let keys: Vec<_> = p.specifications.keys().cloned().collect();
        assert_eq!(keys, vec!["Moisture", "Grade"]);
        assert_eq!(p.specifications["Grade"], "30");
        assert_eq!(p.updated_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_encode_product_drops_price_when_hidden() {
        let mut p = decode_product("p3".into(), doc(json!({"name": "Rock Salt", "price": 80, "unit": "kg"}))).unwrap();
        p.image_url = "https://cdn.example/salt.jpg?v=1700000000000".into();
        let hidden = encode_product(&p).unwrap();
        assert_eq!(hidden["imageUrl"], "https://cdn.example/salt.jpg");
        assert!(!hidden.contains_key("price"));
        assert!(!hidden.contains_key("unit"));
        assert!(!hidden.contains_key("id"));

        p.show_pricing = true;
        let shown = encode_product(&p).unwrap();
        assert_eq!(shown["price"], json!(80.0));
        assert_eq!(shown["unit"], "kg");
    }

    #[test]
    fn test_category_overlays_baseline() {
        let baseline = crate::seed::baseline_category(CategorySlug::Sugar);
        let stored = decode_category_doc(doc(json!({"slug": "sugar", "featured": true}))).unwrap();
        assert_eq!(stored.slug, Some(CategorySlug::Sugar));
        let c = stored.into_category("c1".into(), CategorySlug::Sugar, Some(&baseline));
        assert_eq!(c.title, baseline.title);
        assert!(c.featured);
        assert_eq!(c.image, c.image_url);

        let encoded = encode_category(&c).unwrap();
        assert!(!encoded.contains_key("productCount"));
        assert_eq!(encoded["deleted"], false);
    }

    #[test]
    fn test_decode_achievement_numeric_year() {
        let a = decode_achievement("a1".into(), doc(json!({
            "year": 2019, "title": "Export award", "description": "Top exporter",
            "createdAt": "2020-01-01T00:00:00Z"
        })))
        .unwrap();
        assert_eq!(a.year, "2019");
        assert_eq!(a.updated_at, a.created_at);
        assert_eq!(a.image_url, None);
    }
}
