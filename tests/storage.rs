//! Storage browser behaviour against the in-memory bucket.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use portfolio_cms::storage::{
    Listing, MemoryObjectStore, ObjectMetadata, ObjectStore, StorageBrowser, StoredObject, META_ORIGINAL_NAME,
    ROOT_FOLDER,
};
use portfolio_cms::AppError;

fn browser() -> (StorageBrowser, Arc<MemoryObjectStore>) {
    let store = Arc::new(MemoryObjectStore::new("portfolio"));
    (StorageBrowser::new(store.clone()), store)
}

#[tokio::test]
async fn upload_appears_once_in_its_folder_only() {
    let (browser, _) = browser();
    let entry = browser
        .upload(Some("avatars"), "Profile photo", "me.PNG", vec![1, 2, 3, 4], Some("image/png"))
        .await
        .unwrap();
    assert!(entry.key.starts_with("avatars/profile-photo-"));
    assert!(entry.key.ends_with(".png"));
    assert_eq!(entry.folder, "avatars");
    assert_eq!(entry.display_name, "Profile photo");
    assert_eq!(entry.original_name.as_deref(), Some("me.PNG"));
    assert_eq!(entry.url, format!("memory://portfolio/{}", entry.key));

    let avatars = browser.list(Some("avatars")).await.unwrap();
    assert_eq!(avatars.files.len(), 1);
    assert_eq!(avatars.files[0].key, entry.key);
    assert_eq!(avatars.files[0].size, 4);
    assert_eq!(avatars.folders, vec!["avatars".to_string()]);

    assert!(browser.list(None).await.unwrap().files.is_empty());
    assert!(browser.list(Some("projects")).await.unwrap().files.is_empty());
}

#[tokio::test]
async fn root_uploads_have_no_folder_prefix() {
    let (browser, _) = browser();
    let entry = browser
        .upload(None, "", "Resume 2024.pdf", b"%PDF".to_vec(), Some("application/pdf"))
        .await
        .unwrap();
    assert!(!entry.key.contains('/'));
    assert!(entry.key.starts_with("resume-2024-"));
    assert_eq!(entry.folder, ROOT_FOLDER);
    assert_eq!(entry.display_name, "Resume 2024.pdf");

    let root = browser.list(Some("root")).await.unwrap();
    assert_eq!(root.folder, "root");
    assert_eq!(root.files.len(), 1);
}

#[tokio::test]
async fn empty_upload_is_rejected() {
    let (browser, store) = browser();
    let err = browser.upload(Some("docs"), "x", "x.txt", Vec::new(), None).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(store.is_empty());
}

#[tokio::test]
async fn created_folder_is_listed_without_files() {
    let (browser, store) = browser();
    assert_eq!(browser.create_folder(" projects ").await.unwrap(), "projects");
    assert_eq!(store.len(), 1);

    let listing = browser.list(Some("projects")).await.unwrap();
    assert_eq!(listing.folders, vec!["projects".to_string()]);
    assert!(listing.files.is_empty());

    assert!(matches!(browser.create_folder("a/b").await, Err(AppError::Validation(_))));
    assert!(matches!(browser.create_folder("root").await, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn rename_moves_bytes_to_a_new_key() {
    let (browser, store) = browser();
    let original = browser
        .upload(Some("docs"), "Old name", "cv.pdf", b"curriculum".to_vec(), Some("application/pdf"))
        .await
        .unwrap();

    let renamed = browser.rename(&original.key, "New name").await.unwrap();
    assert_ne!(renamed.key, original.key);
    assert!(renamed.key.starts_with("docs/new-name-"));
    assert!(renamed.key.ends_with(".pdf"));
    assert_eq!(renamed.display_name, "New name");
    assert_eq!(renamed.original_name.as_deref(), Some("cv.pdf"));
    assert_eq!(renamed.size, original.size);

    assert!(matches!(store.get(&original.key).await, Err(AppError::NotFound(_))));
    let moved = store.get(&renamed.key).await.unwrap();
    assert_eq!(moved.body, b"curriculum".to_vec());
    assert_eq!(moved.content_type.as_deref(), Some("application/pdf"));

    let docs = browser.list(Some("docs")).await.unwrap();
    assert_eq!(docs.files.len(), 1);
    assert_eq!(docs.files[0].key, renamed.key);
}

#[tokio::test]
async fn rename_keeps_the_full_parent_path() {
    let (browser, store) = browser();
    let mut metadata = ObjectMetadata::new();
    metadata.insert(META_ORIGINAL_NAME.into(), "c.txt".into());
    store.put("a/b/c.txt", b"nested".to_vec(), Some("text/plain"), &metadata).await.unwrap();

    let renamed = browser.rename("a/b/c.txt", "new").await.unwrap();
    assert!(renamed.key.starts_with("a/b/new-"), "{}", renamed.key);
    assert!(renamed.key.ends_with(".txt"));
    assert!(matches!(store.get("a/b/c.txt").await, Err(AppError::NotFound(_))));
    assert_eq!(store.get(&renamed.key).await.unwrap().body, b"nested".to_vec());

    let top = browser.upload(None, "notes", "notes.md", b"n".to_vec(), None).await.unwrap();
    let moved = browser.rename(&top.key, "todo").await.unwrap();
    assert!(moved.key.starts_with("todo-"));
    assert!(!moved.key.contains('/'));
    assert_eq!(moved.folder, ROOT_FOLDER);
}

#[tokio::test]
async fn rename_of_missing_key_leaves_bucket_untouched() {
    let (browser, store) = browser();
    let err = browser.rename("docs/missing.pdf", "x").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(store.is_empty());
}

#[tokio::test]
async fn delete_removes_one_object() {
    let (browser, _) = browser();
    let a = browser.upload(Some("docs"), "a", "a.txt", b"a".to_vec(), None).await.unwrap();
    let b = browser.upload(Some("docs"), "b", "b.txt", b"b".to_vec(), None).await.unwrap();

    browser.delete(&a.key).await.unwrap();
    let docs = browser.list(Some("docs")).await.unwrap();
    assert_eq!(docs.files.len(), 1);
    assert_eq!(docs.files[0].key, b.key);

    assert!(matches!(browser.delete("../etc").await, Err(AppError::Validation(_))));
}

/// Bucket whose deletes fail on demand.
struct FlakyDeletes {
    inner: MemoryObjectStore,
    fail_delete: AtomicBool,
}

#[async_trait]
impl ObjectStore for FlakyDeletes {
    async fn list(&self, prefix: &str) -> Result<Listing, AppError> {
        self.inner.list(prefix).await
    }

    async fn put(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
        metadata: &ObjectMetadata,
    ) -> Result<(), AppError> {
        self.inner.put(key, body, content_type, metadata).await
    }

    async fn get(&self, key: &str) -> Result<StoredObject, AppError> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AppError::Storage("delete refused".into()));
        }
        self.inner.delete(key).await
    }

    fn public_url(&self, key: &str) -> String {
        self.inner.public_url(key)
    }
}

#[tokio::test]
async fn failed_delete_during_rename_leaves_both_copies() {
    let store = Arc::new(FlakyDeletes {
        inner: MemoryObjectStore::new("portfolio"),
        fail_delete: AtomicBool::new(false),
    });
    let browser = StorageBrowser::new(store.clone());
    let original = browser
        .upload(Some("docs"), "report", "report.txt", b"v1".to_vec(), Some("text/plain"))
        .await
        .unwrap();

    store.fail_delete.store(true, Ordering::SeqCst);
    let err = browser.rename(&original.key, "final report").await.unwrap_err();
    assert!(matches!(err, AppError::Storage(_)));

    let docs = browser.list(Some("docs")).await.unwrap();
    assert_eq!(docs.files.len(), 2);
    assert!(docs.files.iter().any(|f| f.key == original.key));
    assert!(docs.files.iter().any(|f| f.display_name == "final report"));
}
