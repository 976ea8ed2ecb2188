//! Object storage: a flat bucket behind the `ObjectStore` seam, and a browser that
//! presents it as one level of folders.

mod browser;
mod memory;
mod path;
mod s3;

pub use browser::{BrowserListing, FileEntry, StorageBrowser};
pub use memory::MemoryObjectStore;
pub use path::{folder_of, validate_folder, validate_key, ROOT_FOLDER, FOLDER_PLACEHOLDER};
pub use s3::S3ObjectStore;

use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

pub type ObjectMetadata = HashMap<String, String>;

pub const META_ORIGINAL_NAME: &str = "original_name";
pub const META_DISPLAY_NAME: &str = "display_name";
pub const META_FOLDER: &str = "folder";

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectEntry {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub content_type: Option<String>,
    pub metadata: ObjectMetadata,
}

/// One delimiter-`/` listing level: objects directly under the prefix and the
/// sub-prefixes (ending in `/`) below it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Listing {
    pub objects: Vec<ObjectEntry>,
    pub prefixes: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
    pub metadata: ObjectMetadata,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn list(&self, prefix: &str) -> Result<Listing, AppError>;

    async fn put(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
        metadata: &ObjectMetadata,
    ) -> Result<(), AppError>;

    async fn get(&self, key: &str) -> Result<StoredObject, AppError>;

    async fn delete(&self, key: &str) -> Result<(), AppError>;

    fn public_url(&self, key: &str) -> String;
}
