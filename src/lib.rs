//! Portfolio CMS: typed repositories over a PostgreSQL table service and a folder-style
//! browser over S3-compatible object storage, served as a JSON API.

pub mod error;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod openapi;
pub mod repository;
pub mod response;
pub mod routes;
pub mod settings;
pub mod sql;
pub mod state;
pub mod storage;
pub mod table;

pub use error::{AppError, ConfigError};
pub use migration::{apply_migrations, ensure_database_exists};
pub use repository::{Repository, SingletonRepository};
pub use routes::app;
pub use settings::Settings;
pub use state::AppState;
pub use storage::{MemoryObjectStore, ObjectStore, S3ObjectStore, StorageBrowser};
pub use table::{MemoryTableClient, PgTableClient, TableClient};
