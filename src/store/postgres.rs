//! PostgreSQL document store: one JSONB row per document.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::{Collection, Document, DocumentStore};
use crate::{CatalogError, Result};

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
    project: String,
}

impl PgStore {
    /// Documents are namespaced by `project` so several catalogs can share a database.
    pub fn new(pool: PgPool, project: impl Into<String>) -> Self {
        Self { pool, project: project.into() }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(CatalogError::persistence)
    }
}

fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

fn into_document(value: Value) -> Result<Document> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(CatalogError::Persistence(format!("stored body is not an object: {other}"))),
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn list(&self, collection: Collection) -> Result<Vec<(String, Document)>> {
        let rows = sqlx::query_as::<_, (Uuid, Json<Value>)>(
            "SELECT id, body FROM catalog_documents WHERE project = $1 AND collection = $2 ORDER BY seq",
        )
        .bind(&self.project)
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|(id, Json(body))| Ok((id.to_string(), into_document(body)?)))
            .collect()
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        let Some(id) = parse_id(id) else { return Ok(None) };
        let row = sqlx::query_as::<_, (Json<Value>,)>(
            "SELECT body FROM catalog_documents WHERE project = $1 AND collection = $2 AND id = $3",
        )
        .bind(&self.project)
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|(Json(body),)| into_document(body)).transpose()
    }

    async fn create(&self, collection: Collection, doc: Document) -> Result<String> {
        let id = Uuid::now_v7();
        sqlx::query("INSERT INTO catalog_documents (project, collection, id, body, created_at, updated_at) VALUES ($1, $2, $3, $4, NOW(), NOW())")
            .bind(&self.project)
            .bind(collection.as_str())
            .bind(id)
            .bind(Json(Value::Object(doc)))
            .execute(&self.pool)
            .await?;
        Ok(id.to_string())
    }

    async fn merge(&self, collection: Collection, id: &str, patch: Document) -> Result<bool> {
        let Some(id) = parse_id(id) else { return Ok(false) };
        let result = sqlx::query("UPDATE catalog_documents SET body = body || $4, updated_at = NOW() WHERE project = $1 AND collection = $2 AND id = $3")
            .bind(&self.project)
            .bind(collection.as_str())
            .bind(id)
            .bind(Json(Value::Object(patch)))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn replace(&self, collection: Collection, id: &str, doc: Document) -> Result<bool> {
        let Some(id) = parse_id(id) else { return Ok(false) };
        let result = sqlx::query("UPDATE catalog_documents SET body = $4, updated_at = NOW() WHERE project = $1 AND collection = $2 AND id = $3")
            .bind(&self.project)
            .bind(collection.as_str())
            .bind(id)
            .bind(Json(Value::Object(doc)))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool> {
        let Some(id) = parse_id(id) else { return Ok(false) };
        let result = sqlx::query("DELETE FROM catalog_documents WHERE project = $1 AND collection = $2 AND id = $3")
            .bind(&self.project)
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
