//! Table service client: one request per call, rows as JSON objects.

mod memory;
mod postgres;

pub use memory::MemoryTableClient;
pub use postgres::PgTableClient;

use crate::error::AppError;
use crate::model::{Row, TableDef};
use async_trait::async_trait;
use serde_json::Value;

/// Equality filter on one column.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: Value) -> Self {
        Filter {
            column: column.into(),
            value,
        }
    }
}

/// Expected value of the table's revision column for a compare-and-swap save.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevisionGuard {
    pub expected: i64,
}

#[async_trait]
pub trait TableClient: Send + Sync {
    /// Rows matching every filter, ordered by the key.
    async fn select(&self, table: &'static TableDef, filters: &[Filter]) -> Result<Vec<Row>, AppError>;

    /// Insert one row; returns it with server-assigned columns filled in.
    async fn insert(&self, table: &'static TableDef, row: Row) -> Result<Row, AppError>;

    /// Insert-or-update keyed on the primary key. Returns None only when a guard
    /// was given and the stored revision did not match.
    async fn upsert(
        &self,
        table: &'static TableDef,
        row: Row,
        guard: Option<RevisionGuard>,
    ) -> Result<Option<Row>, AppError>;

    /// Delete by key; returns the removed row, None if there was none.
    async fn delete(&self, table: &'static TableDef, id: &Value) -> Result<Option<Row>, AppError>;

    /// Cheap round trip used by readiness checks.
    async fn ping(&self) -> Result<(), AppError>;
}
