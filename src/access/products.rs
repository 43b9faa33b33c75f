use serde_json::Value;
use validator::Validate;

use super::codec::{decode_product, encode_product};
use super::{CatalogAccess, Stamp, PRODUCT_IMAGE_FOLDER};
use crate::domain::aggregates::{NewProduct, Product, Record};
use crate::domain::value_objects::{cache_busted, without_cache_bust, Slug};
use crate::store::Collection;
use crate::{CatalogError, Result};

impl CatalogAccess {
    pub async fn fetch_all_products(&self) -> Result<Vec<Product>> {
        let docs = self.store.list(Collection::Products).await?;
        let products = docs
            .into_iter()
            .map(|(id, doc)| decode_product(id, doc))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(count = products.len(), "products fetched");
        Ok(products)
    }

    pub async fn create_product(&self, data: NewProduct, actor: Option<&str>) -> Result<Product> {
        data.validate()?;
        let stamp = Stamp::now(actor);
        let draft = data.into_product(String::new(), stamp.at, stamp.actor.as_str());
        let id = self.store.create(Collection::Products, encode_product(&draft)?).await?;
        tracing::info!(product_id = %id, slug = %draft.slug, "product created");
        Ok(Product { id, ..draft })
    }

    pub async fn update_product_image(&self, id: &str, url: &str, actor: Option<&str>) -> Result<Stamp> {
        let stamp = Stamp::now(actor);
        self.patch_verified(Collection::Products, Product::KIND, id, [("imageUrl", Value::String(without_cache_bust(url)))], &stamp)
            .await?;
        tracing::info!(product_id = %id, "product image updated");
        Ok(stamp)
    }

    pub async fn update_product_featured(&self, id: &str, featured: bool, actor: Option<&str>) -> Result<Stamp> {
        let stamp = Stamp::now(actor);
        self.patch_verified(Collection::Products, Product::KIND, id, [("featured", Value::Bool(featured))], &stamp)
            .await?;
        tracing::info!(product_id = %id, featured, "product featured flag updated");
        Ok(stamp)
    }

    pub async fn update_product_stock(&self, id: &str, in_stock: bool, actor: Option<&str>) -> Result<Stamp> {
        let stamp = Stamp::now(actor);
        self.patch_verified(Collection::Products, Product::KIND, id, [("inStock", Value::Bool(in_stock))], &stamp)
            .await?;
        tracing::info!(product_id = %id, in_stock, "product stock updated");
        Ok(stamp)
    }

    /// Overwrites every mutable field. Returns the record as stored.
    pub async fn update_product(&self, record: &Product, actor: Option<&str>) -> Result<Product> {
        for (field, value) in [("name", &record.name), ("description", &record.description), ("category", &record.category)] {
            if value.trim().is_empty() {
                return Err(CatalogError::Validation(format!("{field} is required")));
            }
        }
        let stamp = Stamp::now(actor);
        let mut product = record.clone();
        product.slug = Slug::from_name(&product.name).into_string();
        if !product.show_pricing {
            product.price = None;
            product.unit = None;
        }
        product.touch(stamp.at, stamp.actor.as_str());
        product.image_url = cache_busted(&without_cache_bust(&product.image_url), stamp.at);

        if !self.store.replace(Collection::Products, &product.id, encode_product(&product)?).await? {
            return Err(CatalogError::not_found(Product::KIND, &product.id));
        }
        tracing::info!(product_id = %product.id, "product updated");
        Ok(product)
    }

    pub async fn delete_product(&self, id: &str) -> Result<()> {
        if !self.store.delete(Collection::Products, id).await? {
            return Err(CatalogError::not_found(Product::KIND, id));
        }
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    /// Uploads a new image and points the product at it. The upload is not
    /// undone if the record write fails.
    pub async fn replace_product_image(
        &self,
        id: &str,
        file_name: &str,
        bytes: Vec<u8>,
        actor: Option<&str>,
    ) -> Result<(String, Stamp)> {
        let url = self.upload(PRODUCT_IMAGE_FOLDER, file_name, bytes).await?;
        match self.update_product_image(id, &url, actor).await {
            Ok(stamp) => Ok((url, stamp)),
            Err(err) => {
                tracing::warn!(product_id = %id, %url, error = %err, "image uploaded but product not updated");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::memory_access;
    use super::*;
    use crate::store::DocumentStore;
    use rust_decimal::Decimal;

    fn sample() -> NewProduct {
        NewProduct {
            name: "Yellow Maize Seeds".into(),
            description: "Hybrid, 98% germination".into(),
            category: "seeds".into(),
            price: Some(Decimal::new(310, 0)),
            unit: Some("MT".into()),
            show_pricing: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_then_fetch() {
        let (access, _) = memory_access();
        let created = access.create_product(sample(), Some("admin")).await.unwrap();
        let all = access.fetch_all_products().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, created.id);
        assert_eq!(all[0].slug, "yellow-maize-seeds");
        assert_eq!(all[0].updated_by, "admin");
        assert_eq!(all[0].price, Some(Decimal::new(310, 0)));
    }

    #[tokio::test]
    async fn test_create_rejects_missing_category() {
        let (access, store) = memory_access();
        let err = access.create_product(NewProduct { category: String::new(), ..sample() }, None).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
        assert_eq!(store.len(Collection::Products).await, 0);
    }

    #[tokio::test]
    async fn test_update_product_omits_hidden_price() {
        let (access, store) = memory_access();
        let mut p = access.create_product(sample(), None).await.unwrap();
        p.show_pricing = false;
        p.name = "Maize Seeds".into();
        let stored = access.update_product(&p, None).await.unwrap();
        assert_eq!(stored.slug, "maize-seeds");
        let doc = store.get(Collection::Products, &p.id).await.unwrap().unwrap();
        assert!(!doc.contains_key("price"));
        assert!(!doc.contains_key("unit"));
    }

    #[tokio::test]
    async fn test_update_product_stores_raw_image_url() {
        let (access, store) = memory_access();
        let created = access
            .create_product(NewProduct { image_url: "https://cdn.example/maize.jpg".into(), ..sample() }, None)
            .await
            .unwrap();
        let doc = store.get(Collection::Products, &created.id).await.unwrap().unwrap();
        assert_eq!(doc["imageUrl"], "https://cdn.example/maize.jpg");

        let fetched = access.fetch_all_products().await.unwrap().remove(0);
        assert!(fetched.image_url.contains("?v="));
        let updated = access.update_product(&fetched, None).await.unwrap();
        assert!(updated.image_url.starts_with("https://cdn.example/maize.jpg?v="));
        let doc = store.get(Collection::Products, &created.id).await.unwrap().unwrap();
        assert_eq!(doc["imageUrl"], "https://cdn.example/maize.jpg");

        let renamed = Product { image_url: "https://cdn.example/maize-2.jpg".into(), ..updated };
        let updated = access.update_product(&renamed, None).await.unwrap();
        assert!(updated.image_url.starts_with("https://cdn.example/maize-2.jpg?v="));
        let doc = store.get(Collection::Products, &created.id).await.unwrap().unwrap();
        assert_eq!(doc["imageUrl"], "https://cdn.example/maize-2.jpg");
    }

    #[tokio::test]
    async fn test_image_replace_flow() {
        let (access, _) = memory_access();
        let p = access.create_product(sample(), None).await.unwrap();
        let (url, stamp) = access.replace_product_image(&p.id, "maize.png", vec![0xFF], None).await.unwrap();
        assert!(url.starts_with("memory://assets/products/"));
        assert_eq!(stamp.actor.as_str(), "system");
        let fetched = access.fetch_all_products().await.unwrap();
        assert!(fetched[0].image_url.starts_with(&url));
    }

    #[tokio::test]
    async fn test_delete_missing_product() {
        let (access, _) = memory_access();
        assert_eq!(access.delete_product("ghost").await.unwrap_err(), CatalogError::not_found("product", "ghost"));
    }
}
