use chrono::Utc;
use validator::Validate;

use super::codec::{decode_achievement, encode_achievement};
use super::CatalogAccess;
use crate::domain::aggregates::{Achievement, NewAchievement, Record};
use crate::store::Collection;
use crate::{CatalogError, Result};

impl CatalogAccess {
    pub async fn fetch_all_achievements(&self) -> Result<Vec<Achievement>> {
        let docs = self.store.list(Collection::Achievements).await?;
        docs.into_iter().map(|(id, doc)| decode_achievement(id, doc)).collect()
    }

    pub async fn create_achievement(&self, data: NewAchievement) -> Result<Achievement> {
        data.validate()?;
        let draft = data.into_achievement(String::new(), Utc::now());
        let id = self.store.create(Collection::Achievements, encode_achievement(&draft)?).await?;
        tracing::info!(achievement_id = %id, year = %draft.year, "achievement created");
        Ok(Achievement { id, ..draft })
    }

    /// Full overwrite; `created_at` is kept from the record.
    pub async fn update_achievement(&self, record: &Achievement) -> Result<Achievement> {
        for (field, value) in [("year", &record.year), ("title", &record.title), ("description", &record.description)] {
            if value.trim().is_empty() {
                return Err(CatalogError::Validation(format!("{field} is required")));
            }
        }
        let mut achievement = record.clone();
        achievement.updated_at = Utc::now();
        if !self.store.replace(Collection::Achievements, &achievement.id, encode_achievement(&achievement)?).await? {
            return Err(CatalogError::not_found(Achievement::KIND, &achievement.id));
        }
        tracing::info!(achievement_id = %achievement.id, "achievement updated");
        Ok(achievement)
    }

    pub async fn delete_achievement(&self, id: &str) -> Result<()> {
        if !self.store.delete(Collection::Achievements, id).await? {
            return Err(CatalogError::not_found(Achievement::KIND, id));
        }
        tracing::info!(achievement_id = %id, "achievement deleted");
        Ok(())
    }
}
