//! Remote asset store port: binary uploads that come back as stable URLs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tokio::sync::RwLock;

use crate::domain::value_objects::Slug;
use crate::{CatalogError, Result};

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Stores `bytes` under a fresh name in `folder` and returns its URL.
    async fn upload(&self, folder: &str, file_name: &str, bytes: Vec<u8>) -> Result<String>;

    /// Writes `bytes` at an existing asset path and returns its URL.
    async fn overwrite(&self, path: &str, bytes: Vec<u8>) -> Result<String>;
}

/// `<uuid>-<slugged stem>.<ext>`; the uuid keeps uploads from colliding.
fn unique_name(file_name: &str) -> String {
    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    };
    let stem = Slug::from_name(stem);
    let mut name = uuid::Uuid::new_v4().simple().to_string();
    if !stem.as_str().is_empty() {
        name.push('-');
        name.push_str(stem.as_str());
    }
    if let Some(ext) = ext.map(|e| Slug::from_name(e).into_string()).filter(|e| !e.is_empty()) {
        name.push('.');
        name.push_str(&ext);
    }
    name
}

fn relative_path(path: &str) -> Result<PathBuf> {
    let trimmed = path.trim_start_matches('/');
    let candidate = Path::new(trimmed);
    let safe = !trimmed.is_empty() && candidate.components().all(|c| matches!(c, Component::Normal(_)));
    if !safe {
        return Err(CatalogError::Validation(format!("invalid asset path: {path}")));
    }
    Ok(candidate.to_path_buf())
}

/// Assets written beneath a local directory and served over HTTP.
#[derive(Clone, Debug)]
pub struct LocalAssetStore {
    root: PathBuf,
    account: String,
    public_base: String,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>, account: impl Into<String>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            account: account.into(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path { &self.root }

    fn url_for(&self, relative: &Path) -> String {
        format!("{}/{}", self.public_base, relative.to_string_lossy())
    }

    async fn write(&self, relative: &Path, bytes: &[u8]) -> Result<()> {
        let target = self.root.join(relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn upload(&self, folder: &str, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        let relative = Path::new(&self.account).join(relative_path(folder)?).join(unique_name(file_name));
        self.write(&relative, &bytes).await?;
        tracing::info!(path = %relative.display(), size = bytes.len(), "asset uploaded");
        Ok(self.url_for(&relative))
    }

    async fn overwrite(&self, path: &str, bytes: Vec<u8>) -> Result<String> {
        let mut relative = relative_path(path)?;
        if !relative.starts_with(&self.account) {
            relative = Path::new(&self.account).join(relative);
        }
        if !tokio::fs::try_exists(self.root.join(&relative)).await? {
            return Err(CatalogError::not_found("asset", path));
        }
        self.write(&relative, &bytes).await?;
        tracing::info!(path = %relative.display(), size = bytes.len(), "asset overwritten");
        Ok(self.url_for(&relative))
    }
}

/// Keeps uploaded bytes in memory; URLs use the `memory://` scheme.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryAssetStore {
    pub const BASE_URL: &'static str = "memory://assets";

    pub fn new() -> Self { Self::default() }

    pub async fn read(&self, url: &str) -> Option<Vec<u8>> {
        let path = url.strip_prefix(Self::BASE_URL)?.trim_start_matches('/');
        self.files.read().await.get(path).cloned()
    }

    pub async fn len(&self) -> usize { self.files.read().await.len() }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn upload(&self, folder: &str, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        let path = relative_path(folder)?.join(unique_name(file_name)).to_string_lossy().into_owned();
        self.files.write().await.insert(path.clone(), bytes);
        Ok(format!("{}/{path}", Self::BASE_URL))
    }

    async fn overwrite(&self, path: &str, bytes: Vec<u8>) -> Result<String> {
        let path = relative_path(path)?.to_string_lossy().into_owned();
        let mut files = self.files.write().await;
        let Some(existing) = files.get_mut(&path) else {
            return Err(CatalogError::not_found("asset", path));
        };
        *existing = bytes;
        Ok(format!("{}/{path}", Self::BASE_URL))
    }
}
