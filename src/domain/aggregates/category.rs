//! Category records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{not_blank, Record};
use crate::domain::value_objects::{cache_busted, without_cache_bust, CategorySlug};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub slug: CategorySlug,
    pub title: String,
    pub description: String,
    pub image: String,
    /// Mirror of `image` kept for readers of the older document shape.
    pub image_url: String,
    /// Derived from the live product collection; the stored value is ignored.
    pub product_count: usize,
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

impl Category {
    pub(crate) fn set_image(&mut self, url: &str, at: DateTime<Utc>, actor: &str) {
        let url = cache_busted(&without_cache_bust(url), at);
        self.image_url = url.clone();
        self.image = url;
        self.touch(at, actor);
    }

    pub(crate) fn touch(&mut self, at: DateTime<Utc>, actor: &str) {
        self.updated_at = Some(at);
        self.updated_by = Some(actor.to_string());
    }
}

impl Record for Category {
    const KIND: &'static str = "category";
    fn id(&self) -> &str { &self.id }
}

/// Payload for `add_category`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    #[validate(custom = "known_category_slug")]
    pub slug: String,
    #[validate(custom = "not_blank")]
    pub title: String,
    #[validate(custom = "not_blank")]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub featured: bool,
}

fn known_category_slug(value: &str) -> Result<(), ValidationError> {
    if CategorySlug::parse(value).is_some() {
        return Ok(());
    }
    let mut err = ValidationError::new("unknown_category");
    err.message = Some("is not a known category".into());
    Err(err)
}
