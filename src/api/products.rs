use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use validator::Validate;

use super::{actor, authorize_upload, not_found, reject, ApiResult, AppState, FeaturedRequest, ImageRequest, ImageResponse, UploadParams};
use crate::domain::aggregates::{NewProduct, Product};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub in_stock: Option<bool>,
}

pub async fn list(State(s): State<AppState>, Query(p): Query<ListParams>) -> Json<Vec<Product>> {
    let products = s
        .catalog
        .products
        .products()
        .await
        .into_iter()
        .filter(|x| p.category.as_deref().map_or(true, |c| x.category == c))
        .filter(|x| p.featured.map_or(true, |f| x.featured == f))
        .filter(|x| p.in_stock.map_or(true, |i| x.in_stock == i))
        .collect();
    Json(products)
}

pub async fn show(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Product>> {
    s.catalog.products.product(&id).await.map(Json).ok_or_else(|| not_found("product", &id))
}

pub async fn create(State(s): State<AppState>, headers: HeaderMap, Json(r): Json<NewProduct>) -> ApiResult<(StatusCode, Json<Product>)> {
    let p = s.catalog.products.add_product(r, actor(&headers).as_deref()).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(p)))
}

pub async fn update(State(s): State<AppState>, Path(id): Path<String>, headers: HeaderMap, Json(r): Json<NewProduct>) -> ApiResult<Json<Product>> {
    r.validate().map_err(|e| reject(e.into()))?;
    let existing = s.catalog.products.product(&id).await.ok_or_else(|| not_found("product", &id))?;
    let p = s.catalog.products.update_product(r.apply_to(&existing), actor(&headers).as_deref()).await.map_err(reject)?;
    Ok(Json(p))
}

pub async fn remove(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    s.catalog.products.remove_product(&id).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_featured(State(s): State<AppState>, Path(id): Path<String>, headers: HeaderMap, Json(r): Json<FeaturedRequest>) -> ApiResult<StatusCode> {
    s.catalog.products.update_featured_status(&id, r.featured, actor(&headers).as_deref()).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRequest {
    pub in_stock: bool,
}

pub async fn set_stock(State(s): State<AppState>, Path(id): Path<String>, headers: HeaderMap, Json(r): Json<StockRequest>) -> ApiResult<StatusCode> {
    s.catalog.products.update_stock_status(&id, r.in_stock, actor(&headers).as_deref()).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_image(State(s): State<AppState>, Path(id): Path<String>, headers: HeaderMap, Json(r): Json<ImageRequest>) -> ApiResult<Json<ImageResponse>> {
    let image_url = s.catalog.products.update_product_image(&id, &r.url, actor(&headers).as_deref()).await.map_err(reject)?;
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
        .products
        .replace_product_image(&id, &q.file_name, body.to_vec(), actor(&headers).as_deref())
        .await
        .map_err(reject)?;
    Ok(Json(ImageResponse { image_url }))
}
