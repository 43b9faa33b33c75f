use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use super::{actor, authorize_upload, not_found, reject, ApiResult, AppState, FeaturedRequest, ImageRequest, ImageResponse, UploadParams};
use crate::domain::aggregates::{Category, NewCategory};

pub async fn list(State(s): State<AppState>) -> Json<Vec<Category>> {
    Json(s.catalog.categories.categories().await)
}

pub async fn show(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Category>> {
    s.catalog.categories.category(&id).await.map(Json).ok_or_else(|| not_found("category", &id))
}

pub async fn create(State(s): State<AppState>, headers: HeaderMap, Json(r): Json<NewCategory>) -> ApiResult<(StatusCode, Json<Category>)> {
    let c = s.catalog.categories.add_category(r, actor(&headers).as_deref()).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(c)))
}

pub async fn remove(State(s): State<AppState>, Path(id): Path<String>, headers: HeaderMap) -> ApiResult<StatusCode> {
    s.catalog.categories.remove_category(&id, actor(&headers).as_deref()).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_featured(State(s): State<AppState>, Path(id): Path<String>, headers: HeaderMap, Json(r): Json<FeaturedRequest>) -> ApiResult<StatusCode> {
    s.catalog.categories.update_featured_status(&id, r.featured, actor(&headers).as_deref()).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_image(State(s): State<AppState>, Path(id): Path<String>, headers: HeaderMap, Json(r): Json<ImageRequest>) -> ApiResult<Json<ImageResponse>> {
    let image_url = s.catalog.categories.update_category_image(&id, &r.url, actor(&headers).as_deref()).await.map_err(reject)?;
    Ok(Json(ImageResponse { image_url }))
}

pub async fn upload_image(
    State(s): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<ImageResponse>> {
    authorize_upload(&s, &headers)?;
    let image_url = s
        .catalog
        .categories
        .replace_category_image(&id, &q.file_name, body.to_vec(), actor(&headers).as_deref())
        .await
        .map_err(reject)?;
    Ok(Json(ImageResponse { image_url }))
}
