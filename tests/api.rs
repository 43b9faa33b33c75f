use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use agro_catalog::access::CatalogAccess;
use agro_catalog::api::{router, AppState};
use agro_catalog::assets::MemoryAssetStore;
use agro_catalog::bus::EventBus;
use agro_catalog::providers::Catalog;
use agro_catalog::store::MemoryStore;

async fn app(upload_token: Option<&str>) -> Router {
    let access = CatalogAccess::new(Arc::new(MemoryStore::new()), Arc::new(MemoryAssetStore::new()));
    let catalog = Catalog::new(access, EventBus::new());
    catalog.load().await.unwrap();
    router(AppState { catalog, upload_token: upload_token.map(str::to_string) })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri).header("x-actor", "ops@agro.example");
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

fn rice() -> Value {
    json!({"name": "Golden Sella Basmati", "description": "Parboiled, 8.3mm", "category": "rice"})
}

#[tokio::test]
async fn health() {
    let app = app(None).await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn product_lifecycle() {
    let app = app(None).await;
    let (status, created) = send(&app, Method::POST, "/api/v1/products", Some(rice())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["slug"], "golden-sella-basmati");
    assert_eq!(created["updatedBy"], "ops@agro.example");
    assert_eq!(created["inStock"], true);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::PATCH, &format!("/api/v1/products/{id}/stock"), Some(json!({"inStock": false}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, listed) = send(&app, Method::GET, "/api/v1/products?inStock=false", None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, image) = send(&app, Method::PATCH, &format!("/api/v1/products/{id}/image"), Some(json!({"url": "https://cdn.example/gs.jpg"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(image["imageUrl"].as_str().unwrap().starts_with("https://cdn.example/gs.jpg?v="));

    let mut update = rice();
    update["name"] = json!("Golden Sella Basmati Rice");
    update["showPricing"] = json!(true);
    update["price"] = json!(1180.5);
    update["unit"] = json!("MT");
    let (status, updated) = send(&app, Method::PUT, &format!("/api/v1/products/{id}"), Some(update)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["slug"], "golden-sella-basmati-rice");
    assert_eq!(updated["inStock"], false);
    assert!(updated["imageUrl"].as_str().unwrap().starts_with("https://cdn.example/gs.jpg"));

    let (_, categories) = send(&app, Method::GET, "/api/v1/categories", None).await;
    let rice_cat = categories.as_array().unwrap().iter().find(|c| c["slug"] == "rice").unwrap();
    assert_eq!(rice_cat["productCount"], 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&app, Method::DELETE, &format!("/api/v1/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains(&id));
}

#[tokio::test]
async fn validation_and_capacity_map_to_status_codes() {
    let app = app(None).await;
    let (status, body) = send(&app, Method::POST, "/api/v1/products", Some(json!({"name": "X", "description": "", "category": "oil"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Validation failed: description is required");

    let (_, categories) = send(&app, Method::GET, "/api/v1/categories", None).await;
    let ids: Vec<String> = categories.as_array().unwrap().iter().map(|c| c["id"].as_str().unwrap().to_string()).collect();
    for id in &ids[..3] {
        let (status, _) = send(&app, Method::PATCH, &format!("/api/v1/categories/{id}/featured"), Some(json!({"featured": true}))).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
    let (status, _) = send(&app, Method::PATCH, &format!("/api/v1/categories/{}/featured", ids[3]), Some(json!({"featured": true}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, provider_status) = send(&app, Method::GET, "/api/v1/status", None).await;
    assert_eq!(provider_status["categories"]["phase"], "ready");
    assert!(provider_status["categories"]["last_error"].as_str().unwrap().contains("featured"));
}

#[tokio::test]
async fn upload_requires_token_when_configured() {
    let app = app(Some("s3cret")).await;
    let (_, created) = send(&app, Method::POST, "/api/v1/products", Some(rice())).await;
    let id = created["id"].as_str().unwrap();
    let uri = format!("/api/v1/products/{id}/image?fileName=sella.jpg");

    let denied = app
        .clone()
        .oneshot(Request::builder().method(Method::POST).uri(&uri).body(Body::from(vec![1u8, 2, 3])).unwrap())
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);

    let accepted = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(&uri)
                .header(header::AUTHORIZATION, "Bearer s3cret")
                .body(Body::from(vec![1u8, 2, 3]))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(accepted.status(), StatusCode::OK);
    let bytes = to_bytes(accepted.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let image_url = body["imageUrl"].as_str().unwrap();
    assert!(image_url.starts_with("memory://assets/products/"));

    let path = image_url.trim_start_matches("memory://assets/").split('?').next().unwrap();
    let overwrite = |token: Option<&str>| {
        let mut req = Request::builder().method(Method::PUT).uri(format!("/api/v1/assets/{path}"));
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        app.clone().oneshot(req.body(Body::from(vec![4u8, 5])).unwrap())
    };
    assert_eq!(overwrite(None).await.unwrap().status(), StatusCode::UNAUTHORIZED);
    assert_eq!(overwrite(Some("s3cret")).await.unwrap().status(), StatusCode::OK);
}

#[tokio::test]
async fn reload_reports_ready_providers() {
    let app = app(None).await;
    let (status, body) = send(&app, Method::POST, "/api/v1/reload", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"]["phase"], "ready");
    assert_eq!(body["achievements"]["phase"], "ready");
}

#[tokio::test]
async fn achievements_crud() {
    let app = app(None).await;
    let (status, created) = send(
        &app,
        Method::POST,
        "/api/v1/achievements",
        Some(json!({"year": "2022", "title": "APEDA Award", "description": "Rice export excellence"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/achievements/{id}"),
        Some(json!({"year": "2022", "title": "APEDA Gold Award", "description": "Rice export excellence"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "APEDA Gold Award");
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/achievements/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
