use super::{ProviderCore, ProviderStatus};
use crate::access::CatalogAccess;
use crate::bus::EventBus;
use crate::domain::aggregates::{Achievement, NewAchievement};
use crate::domain::events::AchievementChange;
use crate::seed::seed_achievements;
use crate::Result;

pub struct AchievementProvider {
    core: ProviderCore<Achievement>,
}

impl AchievementProvider {
    pub fn new(access: CatalogAccess, bus: EventBus) -> Self {
        Self { core: ProviderCore::new(access, bus) }
    }

    /// Falls back to the built-in list when the store is unreachable or empty.
    /// The fallback is not an error; a failed fetch is still kept as `last_error`.
    pub async fn load(&self) -> Result<usize> {
        self.core.begin_load().await;
        match self.core.access.fetch_all_achievements().await {
            Ok(achievements) if !achievements.is_empty() => Ok(self.core.finish_load(achievements).await),
            Ok(_) => {
                tracing::info!("no stored achievements, using seed list");
                Ok(self.core.finish_load(seed_achievements()).await)
            }
            Err(err) => {
                tracing::warn!(error = %err, "achievements unavailable, using seed list");
                let count = self.core.finish_load(seed_achievements()).await;
                self.core.record_error(&err).await;
                Ok(count)
            }
        }
    }

    pub async fn achievements(&self) -> Vec<Achievement> { self.core.snapshot().await }
    pub async fn achievement(&self, id: &str) -> Option<Achievement> { self.core.find(id).await }
    pub async fn status(&self) -> ProviderStatus { self.core.status().await }

    pub async fn add_achievement(&self, data: NewAchievement) -> Result<Achievement> {
        let achievement = self.core.settle(self.core.access.create_achievement(data).await).await?;
        let change = AchievementChange::Added { achievement_id: achievement.id.clone() };
        let added = achievement.clone();
        self.core.commit(change, |cache| cache.insert(added)).await;
        Ok(achievement)
    }

    pub async fn update_achievement(&self, record: Achievement) -> Result<Achievement> {
        let achievement = self.core.settle(self.core.access.update_achievement(&record).await).await?;
        let change = AchievementChange::Updated { achievement_id: achievement.id.clone() };
        let updated = achievement.clone();
        self.core
            .commit(change, |cache| {
                cache.modify(&achievement.id, |a| *a = updated);
            })
            .await;
        Ok(achievement)
    }

    pub async fn remove_achievement(&self, id: &str) -> Result<()> {
        self.core.settle(self.core.access.delete_achievement(id).await).await?;
        let change = AchievementChange::Removed { achievement_id: id.to_string() };
        self.core
            .commit(change, |cache| {
                cache.remove(id);
            })
            .await;
        Ok(())
    }
}
