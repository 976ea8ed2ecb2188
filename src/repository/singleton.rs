//! Repository for tables holding at most one row (bio, copyright).

use crate::error::AppError;
use crate::model::{record_to_row, row_to_record, Singleton};
use crate::repository::RequestValidator;
use crate::table::{RevisionGuard, TableClient};
use std::marker::PhantomData;
use std::sync::Arc;

pub struct SingletonRepository<R> {
    client: Arc<dyn TableClient>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Singleton> SingletonRepository<R> {
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        SingletonRepository {
            client,
            _record: PhantomData,
        }
    }

    /// The row with the lowest key, if any.
    pub async fn fetch(&self) -> Result<Option<R>, AppError> {
        let rows = self.client.select(R::TABLE, &[]).await?;
        rows.into_iter().next().map(row_to_record).transpose()
    }

    /// Create the row when the record has no key; otherwise update it under a revision
    /// guard. The record's revision must be the one it was read at; if another session
    /// saved in between, the save fails with a conflict and nothing is written.
    ///
    /// A key that is not the stored row's key is a conflict, never a second row. The
    /// table's single-row index backs this up when two first saves race.
    pub async fn save(&self, record: &R) -> Result<R, AppError> {
        let row = record_to_row(record)?;
        RequestValidator::validate(&row, R::TABLE.validation)?;

        let existing = self.fetch().await?;
        let Some(id) = record.id() else {
            if let Some(existing) = existing {
                let id = existing.id().map(|i| i.to_string()).unwrap_or_default();
                return Err(AppError::Conflict(format!(
                    "{} already exists (id {}); update it instead",
                    R::TABLE.name,
                    id
                )));
            }
            let stored = self.client.insert(R::TABLE, row).await?;
            return row_to_record(stored);
        };

        let expected = record.revision().ok_or_else(|| {
            AppError::Validation(format!("{} update requires 'revision'", R::TABLE.name))
        })?;
        match existing.as_ref().and_then(|r| r.id()) {
            Some(stored_id) if stored_id.to_string() == id.to_string() => {}
            Some(stored_id) => {
                return Err(AppError::Conflict(format!(
                    "{} is stored under id {}, not {}",
                    R::TABLE.name,
                    stored_id,
                    id
                )));
            }
            None => {
                return Err(AppError::Conflict(format!(
                    "{} id {} no longer exists; reload and retry",
                    R::TABLE.name,
                    id
                )));
            }
        }
        let saved = self
            .client
            .upsert(R::TABLE, row, Some(RevisionGuard { expected }))
            .await?;
        match saved {
            Some(stored) => {
                tracing::info!(table = R::TABLE.name, revision = expected + 1, "saved");
                row_to_record(stored)
            }
            None => {
                tracing::warn!(table = R::TABLE.name, expected, "stale revision rejected");
                Err(AppError::Conflict(format!(
                    "{} was modified by another session (expected revision {}); reload and retry",
                    R::TABLE.name,
                    expected
                )))
            }
        }
    }
}

impl<R> Clone for SingletonRepository<R> {
    fn clone(&self) -> Self {
        SingletonRepository {
            client: Arc::clone(&self.client),
            _record: PhantomData,
        }
    }
}
