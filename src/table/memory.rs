//! In-process table client with the same key assignment, defaults, NOT NULL and upsert
//! semantics as the PostgreSQL tables. Backs the tests and database-less local runs.

use super::{Filter, RevisionGuard, TableClient};
use crate::error::AppError;
use crate::migration::single_row_index;
use crate::model::{ColumnDef, PkType, Row, TableDef};
use crate::sql::writable_columns;
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct MemTable {
    rows: Vec<Row>,
    /// Last identity value handed out.
    last_id: i64,
}

#[derive(Default)]
pub struct MemoryTableClient {
    tables: Mutex<HashMap<&'static str, MemTable>>,
}

impl MemoryTableClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<&'static str, MemTable>>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::Db(sqlx::Error::Protocol("table state lock poisoned".into())))
    }
}

fn key_eq(a: &Value, b: &Value) -> bool {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn key_cmp(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a.and_then(Value::as_i64), b.and_then(Value::as_i64)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => {
            let a = a.and_then(Value::as_str).unwrap_or_default();
            let b = b.and_then(Value::as_str).unwrap_or_default();
            a.cmp(b)
        }
    }
}

/// Evaluate the literal defaults used by the table descriptors.
fn default_value(expr: &str) -> Value {
    match expr {
        "now()" => Value::String(chrono::Utc::now().to_rfc3339()),
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "'[]'::jsonb" => Value::Array(Vec::new()),
        other => other
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(other.trim_matches('\'').to_string())),
    }
}

fn not_null_violation(def: &TableDef, column: &str) -> AppError {
    AppError::Validation(format!(
        "null value in column \"{}\" of relation \"{}\" violates not-null constraint",
        column, def.name
    ))
}

fn check_not_null(def: &TableDef, col: &ColumnDef, v: &Value) -> Result<(), AppError> {
    if v.is_null() && !col.nullable {
        return Err(not_null_violation(def, col.name));
    }
    Ok(())
}

impl MemTable {
    fn position(&self, def: &TableDef, id: &Value) -> Option<usize> {
        self.rows
            .iter()
            .position(|r| r.get(def.primary_key).map(|k| key_eq(k, id)).unwrap_or(false))
    }

    fn assign_key(&mut self, def: &TableDef, given: Option<&Value>) -> Result<Value, AppError> {
        match given.filter(|v| !v.is_null()) {
            Some(id) => {
                if self.position(def, id).is_some() {
                    return Err(AppError::Conflict(format!(
                        "duplicate key value violates unique constraint \"{}_pkey\"",
                        def.name
                    )));
                }
                if let Some(n) = id.as_i64() {
                    self.last_id = self.last_id.max(n);
                }
                Ok(id.clone())
            }
            None => Ok(match def.pk_type {
                PkType::BigInt => {
                    self.last_id += 1;
                    Value::from(self.last_id)
                }
                PkType::Uuid => Value::String(uuid::Uuid::new_v4().to_string()),
            }),
        }
    }

    fn insert(&mut self, def: &TableDef, row: &Row) -> Result<Row, AppError> {
        if def.is_singleton() && !self.rows.is_empty() {
            return Err(AppError::Conflict(format!(
                "duplicate key value violates unique constraint \"{}\"",
                single_row_index(def)
            )));
        }
        let mut stored = Row::new();
        for col in def.columns {
            let v = match row.get(col.name) {
                Some(v) if !v.is_null() => v.clone(),
                _ => col.default.map(default_value).unwrap_or(Value::Null),
            };
            check_not_null(def, col, &v)?;
            stored.insert(col.name.to_string(), v);
        }
        let id = self.assign_key(def, row.get(def.primary_key))?;
        stored.insert(def.primary_key.to_string(), id);
        self.rows.push(stored.clone());
        Ok(stored)
    }

    fn update(&mut self, def: &TableDef, idx: usize, row: &Row) -> Result<Row, AppError> {
        let revision = def.revision_column;
        let mut next = self.rows[idx].clone();
        for (name, v) in writable_columns(def, row) {
            if name == def.primary_key || Some(name) == revision || name == "updated_at" {
                continue;
            }
            if let Some(col) = def.column(name) {
                check_not_null(def, col, &v)?;
            }
            next.insert(name.to_string(), v);
        }
        if def.column("updated_at").is_some() {
            next.insert("updated_at".into(), default_value("now()"));
        }
        if let Some(rev) = revision {
            let current = next.get(rev).and_then(Value::as_i64).unwrap_or(0);
            next.insert(rev.to_string(), Value::from(current + 1));
        }
        self.rows[idx] = next.clone();
        Ok(next)
    }
}

#[async_trait]
impl TableClient for MemoryTableClient {
    async fn select(&self, table: &'static TableDef, filters: &[Filter]) -> Result<Vec<Row>, AppError> {
        let tables = self.lock()?;
        let Some(t) = tables.get(table.name) else {
            return Ok(Vec::new());
        };
        let mut rows: Vec<Row> = t
            .rows
            .iter()
            .filter(|r| {
                filters
                    .iter()
                    .filter(|f| table.has_column(&f.column))
                    .all(|f| r.get(&f.column).map(|v| key_eq(v, &f.value)).unwrap_or(false))
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| key_cmp(a.get(table.primary_key), b.get(table.primary_key)));
        Ok(rows)
    }

    async fn insert(&self, table: &'static TableDef, row: Row) -> Result<Row, AppError> {
        let mut tables = self.lock()?;
        tables.entry(table.name).or_default().insert(table, &row)
    }

    async fn upsert(
        &self,
        table: &'static TableDef,
        row: Row,
        guard: Option<RevisionGuard>,
    ) -> Result<Option<Row>, AppError> {
        let mut tables = self.lock()?;
        let t = tables.entry(table.name).or_default();
        let existing = row
            .get(table.primary_key)
            .filter(|v| !v.is_null())
            .and_then(|id| t.position(table, id));
        let Some(idx) = existing else {
            return t.insert(table, &row).map(Some);
        };
        if let (Some(g), Some(rev)) = (guard, table.revision_column) {
            let stored = t.rows[idx].get(rev).and_then(Value::as_i64);
            if stored != Some(g.expected) {
                return Ok(None);
            }
        }
        t.update(table, idx, &row).map(Some)
    }

    async fn delete(&self, table: &'static TableDef, id: &Value) -> Result<Option<Row>, AppError> {
        let mut tables = self.lock()?;
        let Some(t) = tables.get_mut(table.name) else {
            return Ok(None);
        };
        Ok(t.position(table, id).map(|idx| t.rows.remove(idx)))
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.lock().map(|_| ())
    }
}
