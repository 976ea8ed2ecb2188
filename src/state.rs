//! Shared application state for all routes.

use crate::model::{Record, Singleton};
use crate::repository::{Repository, SingletonRepository};
use crate::storage::{ObjectStore, StorageBrowser};
use crate::table::TableClient;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub tables: Arc<dyn TableClient>,
    pub storage: StorageBrowser,
    /// Request body limit on storage routes.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(tables: Arc<dyn TableClient>, store: Arc<dyn ObjectStore>, max_upload_bytes: usize) -> Self {
        AppState {
            tables,
            storage: StorageBrowser::new(store),
            max_upload_bytes,
        }
    }

    pub fn repo<R: Record>(&self) -> Repository<R> {
        Repository::new(Arc::clone(&self.tables))
    }

    pub fn singleton<R: Singleton>(&self) -> SingletonRepository<R> {
        SingletonRepository::new(Arc::clone(&self.tables))
    }
}
