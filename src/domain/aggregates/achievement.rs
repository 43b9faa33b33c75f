//! Achievement records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{not_blank, Record};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub year: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Achievement {
    const KIND: &'static str = "achievement";
    fn id(&self) -> &str { &self.id }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewAchievement {
    #[validate(custom = "not_blank")]
    pub year: String,
    #[validate(custom = "not_blank")]
    pub title: String,
    #[validate(custom = "not_blank")]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub certificate_url: Option<String>,
}

impl NewAchievement {
    pub fn apply_to(self, existing: &Achievement) -> Achievement {
        let mut updated = self.into_achievement(existing.id.clone(), existing.created_at);
        updated.updated_at = existing.updated_at;
        updated
    }

    pub(crate) fn into_achievement(self, id: String, at: DateTime<Utc>) -> Achievement {
        Achievement {
            id,
            year: self.year,
            title: self.title,
            description: self.description,
            image_url: self.image_url.filter(|u| !u.is_empty()),
            certificate_url: self.certificate_url.filter(|u| !u.is_empty()),
            created_at: at,
            updated_at: at,
        }
    }
}
