//! HTTP back office over the catalog providers.

mod achievements;
mod categories;
mod products;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::providers::{Catalog, ProviderStatus};
use crate::CatalogError;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    /// Bearer token required on upload routes, when configured.
    pub upload_token: Option<String>,
}

pub type ApiError = (StatusCode, Json<serde_json::Value>);
pub type ApiResult<T> = Result<T, ApiError>;

pub fn reject(err: CatalogError) -> ApiError {
    let status = match &err {
        CatalogError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CatalogError::NotFound { .. } => StatusCode::NOT_FOUND,
        CatalogError::Capacity { .. } => StatusCode::CONFLICT,
        CatalogError::Persistence(_) => StatusCode::BAD_GATEWAY,
    };
    (status, Json(json!({ "error": err.to_string() })))
}

fn not_found(kind: &'static str, id: &str) -> ApiError {
    reject(CatalogError::not_found(kind, id))
}

/// Acting identity from the `x-actor` header.
fn actor(headers: &HeaderMap) -> Option<String> {
    headers.get("x-actor").and_then(|v| v.to_str().ok()).map(str::to_string)
}

fn authorize_upload(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let Some(expected) = state.upload_token.as_deref() else { return Ok(()) };
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if presented == Some(expected) {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, Json(json!({ "error": "upload token required" }))))
    }
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    products: ProviderStatus,
    categories: ProviderStatus,
    achievements: ProviderStatus,
}

async fn status(State(s): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        products: s.catalog.products.status().await,
        categories: s.catalog.categories.status().await,
        achievements: s.catalog.achievements.status().await,
    })
}

async fn reload(State(s): State<AppState>) -> ApiResult<Json<StatusResponse>> {
    s.catalog.reload().await.map_err(reject)?;
    Ok(status(State(s)).await)
}

/// Replaces the bytes behind an existing asset; its URL stays the same.
async fn overwrite_asset(State(s): State<AppState>, Path(path): Path<String>, headers: HeaderMap, body: Bytes) -> ApiResult<Json<ImageResponse>> {
    authorize_upload(&s, &headers)?;
    let image_url = s.catalog.access.overwrite_asset(&path, body.to_vec()).await.map_err(reject)?;
    Ok(Json(ImageResponse { image_url }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(json!({"status": "healthy", "service": "agro-catalog"})) }))
        .route("/api/v1/status", get(status))
        .route("/api/v1/reload", post(reload))
        .route("/api/v1/assets/*path", put(overwrite_asset))
        .route("/api/v1/products", get(products::list).post(products::create))
        .route("/api/v1/products/:id", get(products::show).put(products::update).delete(products::remove))
        .route("/api/v1/products/:id/featured", patch(products::set_featured))
        .route("/api/v1/products/:id/stock", patch(products::set_stock))
        .route("/api/v1/products/:id/image", patch(products::set_image).post(products::upload_image))
        .route("/api/v1/categories", get(categories::list).post(categories::create))
        .route("/api/v1/categories/:id", get(categories::show).delete(categories::remove))
        .route("/api/v1/categories/:id/featured", patch(categories::set_featured))
        .route("/api/v1/categories/:id/image", patch(categories::set_image).post(categories::upload_image))
        .route("/api/v1/achievements", get(achievements::list).post(achievements::create))
        .route("/api/v1/achievements/:id", put(achievements::update).delete(achievements::remove))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, serde::Deserialize)]
pub struct FeaturedRequest {
    pub featured: bool,
}

#[derive(Debug, serde::Deserialize)]
pub struct ImageRequest {
    pub url: String,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadParams {
    pub file_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub image_url: String,
}
