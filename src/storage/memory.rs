//! In-process bucket with delimiter listing semantics.

use super::{Listing, ObjectEntry, ObjectMetadata, ObjectStore, StoredObject};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

struct MemObject {
    object: StoredObject,
    last_modified: DateTime<Utc>,
}

pub struct MemoryObjectStore {
    bucket: String,
    objects: RwLock<BTreeMap<String, MemObject>>,
}

impl MemoryObjectStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        MemoryObjectStore {
            bucket: bucket.into(),
            objects: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, MemObject>>, AppError> {
        self.objects
            .read()
            .map_err(|_| AppError::Storage("state lock".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, MemObject>>, AppError> {
        self.objects
            .write()
            .map_err(|_| AppError::Storage("state lock".into()))
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list(&self, prefix: &str) -> Result<Listing, AppError> {
        let objects = self.read()?;
        let mut listing = Listing::default();
        let mut prefixes = BTreeSet::new();
        for (key, obj) in objects.range(prefix.to_string()..) {
            let Some(rest) = key.strip_prefix(prefix) else {
                break;
            };
            match rest.find('/') {
                Some(i) => {
                    prefixes.insert(format!("{}{}", prefix, &rest[..=i]));
                }
                None => listing.objects.push(ObjectEntry {
                    key: key.clone(),
                    size: obj.object.body.len() as u64,
                    last_modified: Some(obj.last_modified),
                    content_type: obj.object.content_type.clone(),
                    metadata: obj.object.metadata.clone(),
                }),
            }
        }
        listing.prefixes = prefixes.into_iter().collect();
        Ok(listing)
    }

    async fn put(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
        metadata: &ObjectMetadata,
    ) -> Result<(), AppError> {
        let mut objects = self.write()?;
        objects.insert(
            key.to_string(),
            MemObject {
                object: StoredObject {
                    body,
                    content_type: content_type.map(String::from),
                    metadata: metadata.clone(),
                },
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StoredObject, AppError> {
        let objects = self.read()?;
        objects
            .get(key)
            .map(|o| o.object.clone())
            .ok_or_else(|| AppError::NotFound(format!("object {}", key)))
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.write()?.remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("memory://{}/{}", self.bucket, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_one_level() {
        let store = MemoryObjectStore::new("b");
        let meta = ObjectMetadata::new();
        for key in ["cv.pdf", "avatars/me.png", "avatars/old/me.png", "projects/.folder"] {
            store.put(key, vec![1, 2, 3], None, &meta).await.unwrap();
        }

        let root = store.list("").await.unwrap();
        assert_eq!(root.objects.iter().map(|o| o.key.as_str()).collect::<Vec<_>>(), vec!["cv.pdf"]);
        assert_eq!(root.prefixes, vec!["avatars/", "projects/"]);

        let avatars = store.list("avatars/").await.unwrap();
        assert_eq!(avatars.objects.len(), 1);
        assert_eq!(avatars.objects[0].key, "avatars/me.png");
        assert_eq!(avatars.objects[0].size, 3);
        assert_eq!(avatars.prefixes, vec!["avatars/old/"]);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = MemoryObjectStore::new("b");
        assert!(matches!(store.get("nope").await, Err(AppError::NotFound(_))));
        store.delete("nope").await.unwrap();
    }
}
