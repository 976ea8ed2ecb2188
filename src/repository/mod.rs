//! Typed repositories: one table request per operation, client-side guards first.

mod singleton;
mod validation;

pub use singleton::SingletonRepository;
pub use validation::{Format, RequestValidator, ValidationRule};

use crate::error::AppError;
use crate::model::{record_to_row, row_to_record, Record};
use crate::table::{Filter, TableClient};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

pub struct Repository<R> {
    client: Arc<dyn TableClient>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for Repository<R> {
    fn clone(&self) -> Self {
        Repository {
            client: Arc::clone(&self.client),
            _record: PhantomData,
        }
    }
}

fn id_value<I: serde::Serialize>(id: &I) -> Result<Value, AppError> {
    Ok(serde_json::to_value(id)?)
}

impl<R: Record> Repository<R> {
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Repository {
            client,
            _record: PhantomData,
        }
    }

    /// All rows, ordered by key.
    pub async fn fetch(&self) -> Result<Vec<R>, AppError> {
        self.fetch_filtered(&[]).await
    }

    /// Rows whose column equals the value (foreign-key lookups).
    pub async fn fetch_where(&self, column: &str, value: Value) -> Result<Vec<R>, AppError> {
        if !R::TABLE.has_column(column) {
            return Err(AppError::BadRequest(format!(
                "{} has no column '{}'",
                R::TABLE.name,
                column
            )));
        }
        self.fetch_filtered(&[Filter::eq(column, value)]).await
    }

    async fn fetch_filtered(&self, filters: &[Filter]) -> Result<Vec<R>, AppError> {
        let rows = self.client.select(R::TABLE, filters).await?;
        rows.into_iter().map(row_to_record).collect()
    }

    pub async fn get(&self, id: &R::Id) -> Result<Option<R>, AppError> {
        let filter = Filter::eq(R::TABLE.primary_key, id_value(id)?);
        let mut rows = self.client.select(R::TABLE, &[filter]).await?;
        rows.pop().map(row_to_record).transpose()
    }

    /// Insert and return the stored row with its key and defaults.
    pub async fn create(&self, record: &R) -> Result<R, AppError> {
        let row = record_to_row(record)?;
        RequestValidator::validate(&row, R::TABLE.validation)?;
        let stored = self.client.insert(R::TABLE, row).await?;
        tracing::debug!(table = R::TABLE.name, id = ?stored.get(R::TABLE.primary_key), "created");
        row_to_record(stored)
    }

    /// Upsert the full record, keyed on its primary key.
    pub async fn update(&self, record: &R) -> Result<R, AppError> {
        if record.id().is_none() {
            return Err(AppError::Validation(format!(
                "{} update requires '{}'",
                R::TABLE.name,
                R::TABLE.primary_key
            )));
        }
        let row = record_to_row(record)?;
        RequestValidator::validate(&row, R::TABLE.validation)?;
        let stored = self
            .client
            .upsert(R::TABLE, row, None)
            .await?
            .ok_or_else(|| AppError::Db(sqlx::Error::RowNotFound))?;
        row_to_record(stored)
    }

    /// Delete by key. Missing keys are not an error. Rejected while any dependent row
    /// still references the key.
    pub async fn delete(&self, id: &R::Id) -> Result<(), AppError> {
        let id = id_value(id)?;
        for dep in R::TABLE.dependents {
            let refs = self
                .client
                .select(dep.table, &[Filter::eq(dep.column, id.clone())])
                .await?;
            if !refs.is_empty() {
                return Err(AppError::Conflict(format!(
                    "{} {} is still referenced by {} row(s) in {}",
                    R::TABLE.name,
                    id,
                    refs.len(),
                    dep.table.name
                )));
            }
        }
        let removed = self.client.delete(R::TABLE, &id).await?;
        tracing::debug!(table = R::TABLE.name, %id, removed = removed.is_some(), "deleted");
        Ok(())
    }
}
