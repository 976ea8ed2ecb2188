//! Schema bootstrap: database, schema, one table per descriptor, indexes on foreign-key
//! columns. Every statement is `IF NOT EXISTS`, so re-running is a no-op.

use crate::error::AppError;
use crate::model::{all_tables, PkType, TableDef};
use crate::sql::qualified_table;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn key_definition(def: &TableDef) -> String {
    let ty = match def.pk_type {
        PkType::BigInt => "BIGINT GENERATED BY DEFAULT AS IDENTITY",
        PkType::Uuid => "UUID NOT NULL DEFAULT gen_random_uuid()",
    };
    format!("{} {} PRIMARY KEY", quote(def.primary_key), ty)
}

/// `CREATE TABLE IF NOT EXISTS` for one descriptor.
pub fn table_ddl(schema: &str, def: &TableDef) -> String {
    let mut col_defs = vec![key_definition(def)];
    for c in def.columns {
        let mut col = format!("{} {}", quote(c.name), c.pg_type.to_uppercase());
        if !c.nullable {
            col.push_str(" NOT NULL");
        }
        if let Some(d) = c.default {
            col.push_str(" DEFAULT ");
            col.push_str(d);
        }
        col_defs.push(col);
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        qualified_table(schema, def.name),
        col_defs.join(",\n  ")
    )
}

/// One `CREATE INDEX IF NOT EXISTS` per indexed column.
pub fn index_ddl(schema: &str, def: &TableDef) -> Vec<String> {
    def.columns
        .iter()
        .filter(|c| c.indexed)
        .map(|c| {
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} USING btree ({})",
                quote(&format!("{}_{}_idx", def.name, c.name)),
                qualified_table(schema, def.name),
                quote(c.name)
            )
        })
        .collect()
}

/// Name of the unique index that caps a singleton table at one row.
pub fn single_row_index(def: &TableDef) -> String {
    format!("{}_single_row_idx", def.name)
}

/// Unique index over a constant, so a singleton table rejects a second row.
pub fn single_row_ddl(schema: &str, def: &TableDef) -> Option<String> {
    def.is_singleton().then(|| {
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ((true))",
            quote(&single_row_index(def)),
            qualified_table(schema, def.name)
        )
    })
}

/// Create the schema, every portfolio table, their foreign-key indexes and the
/// single-row guard of singleton tables.
pub async fn apply_migrations(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote(schema)))
        .execute(pool)
        .await?;
    for def in all_tables() {
        sqlx::query(&table_ddl(schema, def)).execute(pool).await?;
        for sql in index_ddl(schema, def).into_iter().chain(single_row_ddl(schema, def)) {
            sqlx::query(&sql).execute(pool).await?;
        }
        tracing::debug!(table = def.name, schema, "table ready");
    }
    tracing::info!(schema, tables = all_tables().len(), "migrations applied");
    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = split_database_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote(&db_name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "database created");
    }
    Ok(())
}

/// Split into (URL of the `postgres` admin database, target database name).
fn split_database_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| AppError::BadRequest("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let mut parts = path_and_query.splitn(2, '?');
    let db_name = parts.next().unwrap_or("").trim();
    let query = parts.next().map(|q| format!("?{}", q)).unwrap_or_default();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres{}", base, query), db_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BIO, MEMBERS, PROJECTS};

    #[test]
    fn bigint_table_with_defaults() {
        let sql = table_ddl("public", &BIO);
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"public\".\"bio\" (\n"));
        assert!(sql.contains("\"id\" BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY"));
        assert!(sql.contains("\"name\" TEXT NOT NULL"));
        assert!(sql.contains("\"title\" TEXT,"));
        assert!(sql.contains("\"revision\" BIGINT NOT NULL DEFAULT 1"));
        assert!(sql.contains("\"updated_at\" TIMESTAMPTZ NOT NULL DEFAULT now()"));
    }

    #[test]
    fn uuid_key_and_fk_index() {
        assert!(table_ddl("cms", &PROJECTS).contains("\"id\" UUID NOT NULL DEFAULT gen_random_uuid() PRIMARY KEY"));
        assert!(index_ddl("cms", &PROJECTS).is_empty());
        assert_eq!(
            index_ddl("cms", &MEMBERS),
            vec!["CREATE INDEX IF NOT EXISTS \"members_project_id_idx\" ON \"cms\".\"members\" USING btree (\"project_id\")"]
        );
    }

    #[test]
    fn singleton_tables_get_a_single_row_index() {
        assert_eq!(
            single_row_ddl("public", &BIO).as_deref(),
            Some("CREATE UNIQUE INDEX IF NOT EXISTS \"bio_single_row_idx\" ON \"public\".\"bio\" ((true))")
        );
        assert!(single_row_ddl("public", &PROJECTS).is_none());
    }

    #[test]
    fn admin_url_keeps_query() {
        let (admin, db) = split_database_url("postgres://u:p@host:5432/portfolio?sslmode=require").unwrap();
        assert_eq!(admin, "postgres://u:p@host:5432/postgres?sslmode=require");
        assert_eq!(db, "portfolio");
    }
}
