use serde_json::{Map, Value};
use std::collections::HashSet;
use validator::Validate;

use super::codec::{decode_category_doc, encode_category};
use super::{CatalogAccess, Stamp, CATEGORY_IMAGE_FOLDER};
use crate::domain::aggregates::{Category, NewCategory, Record};
use crate::domain::value_objects::{cache_busted, without_cache_bust, CategorySlug};
use crate::seed::{baseline_categories, baseline_category};
use crate::store::Collection;
use crate::{CatalogError, Result};

impl CatalogAccess {
    /// Creates a document for every baseline slug the store has never seen.
    /// Soft-deleted categories count as seen and stay deleted.
    pub async fn ensure_baseline_categories(&self) -> Result<usize> {
        let known: HashSet<CategorySlug> = self
            .store
            .list(Collection::Categories)
            .await?
            .into_iter()
            .filter_map(|(_, doc)| decode_category_doc(doc).ok().and_then(|c| c.slug))
            .collect();

        let mut seeded = 0;
        for baseline in baseline_categories().into_iter().filter(|b| !known.contains(&b.slug)) {
            let mut doc = Map::new();
            doc.insert("slug".into(), Value::String(baseline.slug.to_string()));
            doc.insert("title".into(), Value::String(baseline.title.into()));
            doc.insert("description".into(), Value::String(baseline.description.into()));
            doc.insert("image".into(), Value::String(baseline.image.into()));
            doc.insert("imageUrl".into(), Value::String(baseline.image.into()));
            doc.insert("featured".into(), Value::Bool(false));
            doc.insert("deleted".into(), Value::Bool(false));
            self.store.create(Collection::Categories, doc).await?;
            seeded += 1;
        }
        if seeded > 0 {
            tracing::info!(seeded, "baseline categories seeded");
        }
        Ok(seeded)
    }

    /// Live categories, stored fields merged over the baseline. Soft-deleted
    /// documents and documents with an unknown slug are left out.
    pub async fn fetch_all_categories(&self) -> Result<Vec<Category>> {
        let docs = self.store.list(Collection::Categories).await?;
        let mut categories = Vec::with_capacity(docs.len());
        for (id, doc) in docs {
            let stored = decode_category_doc(doc)?;
            if stored.deleted {
                continue;
            }
            let Some(slug) = stored.slug else {
                tracing::warn!(category_id = %id, "skipping category with unknown slug");
                continue;
            };
            let baseline = baseline_category(slug);
            categories.push(stored.into_category(id, slug, Some(&baseline)));
        }
        tracing::debug!(count = categories.len(), "categories fetched");
        Ok(categories)
    }

    pub async fn create_category(&self, data: NewCategory, actor: Option<&str>) -> Result<Category> {
        data.validate()?;
        let slug = CategorySlug::parse(&data.slug)
            .ok_or_else(|| CatalogError::Validation(format!("slug {} is not a known category", data.slug)))?;
        let stamp = Stamp::now(actor);
        let image = cache_busted(&data.image, stamp.at);
        let mut category = Category {
            id: String::new(),
            slug,
            title: data.title,
            description: data.description,
            image_url: image.clone(),
            image,
            product_count: 0,
            featured: data.featured,
            updated_at: None,
            updated_by: None,
        };
        category.touch(stamp.at, stamp.actor.as_str());
        category.id = self.store.create(Collection::Categories, encode_category(&category)?).await?;
        tracing::info!(category_id = %category.id, %slug, "category created");
        Ok(category)
    }

    pub async fn update_category_image(&self, id: &str, url: &str, actor: Option<&str>) -> Result<Stamp> {
        let stamp = Stamp::now(actor);
        let url = without_cache_bust(url);
        let fields = [("image", Value::String(url.clone())), ("imageUrl", Value::String(url))];
        self.patch_verified(Collection::Categories, Category::KIND, id, fields, &stamp).await?;
        tracing::info!(category_id = %id, "category image updated");
        Ok(stamp)
    }

    pub async fn update_category_featured(&self, id: &str, featured: bool, actor: Option<&str>) -> Result<Stamp> {
        let stamp = Stamp::now(actor);
        self.patch_verified(Collection::Categories, Category::KIND, id, [("featured", Value::Bool(featured))], &stamp)
            .await?;
        tracing::info!(category_id = %id, featured, "category featured flag updated");
        Ok(stamp)
    }

    /// Soft delete: the document stays with `deleted: true`. No existence check.
    pub async fn delete_category(&self, id: &str, actor: Option<&str>) -> Result<()> {
        let stamp = Stamp::now(actor);
        let mut patch = Map::new();
        patch.insert("deleted".into(), Value::Bool(true));
        for (field, value) in stamp.fields() {
            patch.insert(field.into(), value);
        }
        let existed = self.store.merge(Collection::Categories, id, patch).await?;
        tracing::info!(category_id = %id, existed, "category soft-deleted");
        Ok(())
    }

    pub async fn replace_category_image(
        &self,
        id: &str,
        file_name: &str,
        bytes: Vec<u8>,
        actor: Option<&str>,
    ) -> Result<(String, Stamp)> {
        let url = self.upload(CATEGORY_IMAGE_FOLDER, file_name, bytes).await?;
        let stamp = self.update_category_image(id, &url, actor).await?;
        Ok((url, stamp))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::memory_access;
    use super::*;
    use crate::store::DocumentStore;

    #[tokio::test]
    async fn test_baseline_seeded_once() {
        let (access, store) = memory_access();
        assert_eq!(access.ensure_baseline_categories().await.unwrap(), CategorySlug::ALL.len());
        assert_eq!(access.ensure_baseline_categories().await.unwrap(), 0);
        assert_eq!(store.len(Collection::Categories).await, CategorySlug::ALL.len());

        let categories = access.fetch_all_categories().await.unwrap();
        let slugs: Vec<_> = categories.iter().map(|c| c.slug).collect();
        assert_eq!(slugs, CategorySlug::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_soft_delete_hides_and_is_not_reseeded() {
        let (access, store) = memory_access();
        access.ensure_baseline_categories().await.unwrap();
        let oil = access.fetch_all_categories().await.unwrap().into_iter().find(|c| c.slug == CategorySlug::Oil).unwrap();

        access.delete_category(&oil.id, Some("admin")).await.unwrap();
        assert!(store.get(Collection::Categories, &oil.id).await.unwrap().is_some());
        assert_eq!(access.ensure_baseline_categories().await.unwrap(), 0);
        assert!(access.fetch_all_categories().await.unwrap().iter().all(|c| c.slug != CategorySlug::Oil));

        // no existence check
        access.delete_category("never-existed", None).await.unwrap();
    }

    #[tokio::test]
    async fn test_image_update_writes_both_fields() {
        let (access, store) = memory_access();
        access.ensure_baseline_categories().await.unwrap();
        let rice = access.fetch_all_categories().await.unwrap().remove(0);
        access.update_category_image(&rice.id, "https://cdn.example/rice-new.jpg", None).await.unwrap();
        let doc = store.get(Collection::Categories, &rice.id).await.unwrap().unwrap();
        assert_eq!(doc["image"], doc["imageUrl"]);
        let refreshed = access.fetch_all_categories().await.unwrap().remove(0);
        assert!(refreshed.image.starts_with("https://cdn.example/rice-new.jpg?v="));
    }
}
