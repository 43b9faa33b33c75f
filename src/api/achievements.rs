use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use super::{not_found, reject, ApiResult, AppState};
use crate::domain::aggregates::{Achievement, NewAchievement};

pub async fn list(State(s): State<AppState>) -> Json<Vec<Achievement>> {
    Json(s.catalog.achievements.achievements().await)
}

pub async fn create(State(s): State<AppState>, Json(r): Json<NewAchievement>) -> ApiResult<(StatusCode, Json<Achievement>)> {
    let a = s.catalog.achievements.add_achievement(r).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(a)))
}

pub async fn update(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<NewAchievement>) -> ApiResult<Json<Achievement>> {
    r.validate().map_err(|e| reject(e.into()))?;
    let existing = s.catalog.achievements.achievement(&id).await.ok_or_else(|| not_found("achievement", &id))?;
    let a = s.catalog.achievements.update_achievement(r.apply_to(&existing)).await.map_err(reject)?;
    Ok(Json(a))
}

pub async fn remove(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    s.catalog.achievements.remove_achievement(&id).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}
