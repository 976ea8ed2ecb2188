//! Folder browser over a flat bucket. Folders are derived from key paths; there is no
//! directory entity, only `.folder` placeholders for empty folders.

use super::path::{
    file_name, folder_of, folder_prefix, is_placeholder, parent_prefix, unique_key, validate_folder, validate_key,
};
use super::{
    ObjectEntry, ObjectMetadata, ObjectStore, FOLDER_PLACEHOLDER, META_DISPLAY_NAME, META_FOLDER,
    META_ORIGINAL_NAME, ROOT_FOLDER,
};
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct FileEntry {
    pub key: String,
    pub name: String,
    pub folder: String,
    pub display_name: String,
    pub original_name: Option<String>,
    pub size: u64,
    pub content_type: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct BrowserListing {
    /// Folder the files belong to.
    pub folder: String,
    /// Every known folder, `root` excluded.
    pub folders: Vec<String>,
    pub files: Vec<FileEntry>,
}

#[derive(Clone)]
pub struct StorageBrowser {
    store: Arc<dyn ObjectStore>,
}

fn resolve_folder(folder: Option<&str>) -> Result<String, AppError> {
    match folder.map(str::trim).filter(|f| !f.is_empty()) {
        None => Ok(ROOT_FOLDER.to_string()),
        Some(f) if f == ROOT_FOLDER => Ok(ROOT_FOLDER.to_string()),
        Some(f) => {
            validate_folder(f)?;
            Ok(f.to_string())
        }
    }
}

impl StorageBrowser {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        StorageBrowser { store }
    }

    /// Root listing plus one level into every prefix.
    async fn scan(&self) -> Result<(BTreeSet<String>, Vec<ObjectEntry>), AppError> {
        let root = self.store.list("").await?;
        let mut folders = BTreeSet::new();
        let mut objects = root.objects;
        for prefix in root.prefixes {
            let nested = self.store.list(&prefix).await?;
            folders.insert(prefix.trim_end_matches('/').to_string());
            objects.extend(nested.objects);
        }
        Ok((folders, objects))
    }

    fn entry(&self, obj: ObjectEntry) -> FileEntry {
        let name = file_name(&obj.key).to_string();
        let display_name = obj
            .metadata
            .get(META_DISPLAY_NAME)
            .cloned()
            .unwrap_or_else(|| name.clone());
        FileEntry {
            url: self.store.public_url(&obj.key),
            folder: folder_of(&obj.key).to_string(),
            original_name: obj.metadata.get(META_ORIGINAL_NAME).cloned(),
            display_name,
            name,
            size: obj.size,
            content_type: obj.content_type,
            last_modified: obj.last_modified,
            key: obj.key,
        }
    }

    /// Files in one folder (`root` when none is given) and the names of all folders.
    pub async fn list(&self, folder: Option<&str>) -> Result<BrowserListing, AppError> {
        let folder = resolve_folder(folder)?;
        let (folders, objects) = self.scan().await?;
        let mut files: Vec<FileEntry> = objects
            .into_iter()
            .filter(|o| !is_placeholder(&o.key) && folder_of(&o.key) == folder)
            .map(|o| self.entry(o))
            .collect();
        files.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(BrowserListing {
            folder,
            folders: folders.into_iter().collect(),
            files,
        })
    }

    /// Store bytes under a fresh `<folder>/<label>-<suffix>.<ext>` key.
    pub async fn upload(
        &self,
        folder: Option<&str>,
        label: &str,
        original_name: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<FileEntry, AppError> {
        let folder = resolve_folder(folder)?;
        if body.is_empty() {
            return Err(AppError::Validation("file is empty".into()));
        }
        let original_name = file_name(original_name).to_string();
        let key = unique_key(&folder, label, &original_name);
        let label = label.trim();
        let display_name = if label.is_empty() { original_name.clone() } else { label.to_string() };

        let mut metadata = ObjectMetadata::new();
        metadata.insert(META_ORIGINAL_NAME.into(), original_name);
        metadata.insert(META_DISPLAY_NAME.into(), display_name);
        metadata.insert(META_FOLDER.into(), folder.clone());

        let size = body.len() as u64;
        self.store.put(&key, body, content_type, &metadata).await?;
        tracing::info!(%key, size, "uploaded");
        Ok(self.entry(ObjectEntry {
            key,
            size,
            last_modified: Some(Utc::now()),
            content_type: content_type.map(String::from),
            metadata,
        }))
    }

    /// Make an empty folder visible by writing its placeholder object.
    pub async fn create_folder(&self, name: &str) -> Result<String, AppError> {
        let name = name.trim();
        validate_folder(name)?;
        let key = format!("{}{}", folder_prefix(name), FOLDER_PLACEHOLDER);
        let mut metadata = ObjectMetadata::new();
        metadata.insert(META_FOLDER.into(), name.to_string());
        self.store.put(&key, Vec::new(), None, &metadata).await?;
        tracing::info!(folder = name, "folder created");
        Ok(name.to_string())
    }

    /// Download, re-upload under a new key with the same parent path, delete the original.
    ///
    /// Not atomic. A failure before the new object is written leaves the original as it
    /// was; a failure deleting the original leaves both copies and is returned as-is.
    pub async fn rename(&self, key: &str, new_label: &str) -> Result<FileEntry, AppError> {
        validate_key(key)?;
        if is_placeholder(key) {
            return Err(AppError::Validation("folder placeholders cannot be renamed".into()));
        }
        let new_label = new_label.trim();
        if new_label.is_empty() {
            return Err(AppError::Validation("label is required".into()));
        }

        let object = self.store.get(key).await?;
        let parent = parent_prefix(key);
        let folder = match parent.trim_end_matches('/') {
            "" => ROOT_FOLDER.to_string(),
            p => p.to_string(),
        };
        let original_name = object
            .metadata
            .get(META_ORIGINAL_NAME)
            .cloned()
            .unwrap_or_else(|| file_name(key).to_string());
        let new_key = format!("{}{}", parent, unique_key(ROOT_FOLDER, new_label, &original_name));

        let mut metadata = object.metadata;
        metadata.insert(META_ORIGINAL_NAME.into(), original_name);
        metadata.insert(META_DISPLAY_NAME.into(), new_label.to_string());
        metadata.insert(META_FOLDER.into(), folder);

        let size = object.body.len() as u64;
        let content_type = object.content_type;
        self.store
            .put(&new_key, object.body, content_type.as_deref(), &metadata)
            .await?;
        if let Err(e) = self.store.delete(key).await {
            tracing::warn!(old = key, new = %new_key, error = %e, "rename left both copies");
            return Err(e);
        }
        tracing::info!(old = key, new = %new_key, "renamed");
        Ok(self.entry(ObjectEntry {
            key: new_key,
            size,
            last_modified: Some(Utc::now()),
            content_type,
            metadata,
        }))
    }

    /// Remove one object. Folders are not cascaded.
    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        validate_key(key)?;
        self.store.delete(key).await?;
        tracing::info!(%key, "deleted");
        Ok(())
    }
}
