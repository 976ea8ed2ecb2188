//! Builds parameterized SELECT, INSERT, UPSERT, DELETE from a static table descriptor.

use crate::model::{Row, TableDef};
use crate::table::{Filter, RevisionGuard};
use serde_json::Value;

const TARGET_ALIAS: &str = "t";
const UPDATED_AT: &str = "updated_at";

/// Quote identifier for PostgreSQL (safe: only from table descriptors).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }

    /// Push a value and return its placeholder, cast to the column's type.
    fn bind(&mut self, def: &TableDef, column: &str, v: Value) -> String {
        let n = self.push_param(v);
        def.pg_type_of(column)
            .map(|t| format!("${}::{}", n, t))
            .unwrap_or_else(|| format!("${}", n))
    }
}

fn select_column_list(def: &TableDef) -> String {
    def.column_names().map(quoted).collect::<Vec<_>>().join(", ")
}

/// Columns to write for a row, in table order. A null key or a null column that has a
/// database default is left out so the server fills it in; any other missing column is
/// sent as NULL and left to the table's NOT NULL constraints.
pub fn writable_columns(def: &TableDef, row: &Row) -> Vec<(&'static str, Value)> {
    let mut out = Vec::new();
    for name in def.column_names() {
        let val = row.get(name).cloned().unwrap_or(Value::Null);
        if val.is_null() {
            let skip = name == def.primary_key || def.column(name).map(|c| c.has_default()).unwrap_or(false);
            if skip {
                continue;
            }
        }
        out.push((name, val));
    }
    out
}

/// SELECT with equality filters, ORDER BY the key. Filters on unknown columns are dropped.
pub fn select(schema: &str, def: &TableDef, filters: &[Filter]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(schema, def.name);
    let mut where_parts = Vec::new();
    for f in filters {
        if !def.has_column(&f.column) {
            continue;
        }
        let ph = q.bind(def, &f.column, f.value.clone());
        where_parts.push(format!("{} = {}", quoted(&f.column), ph));
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {}",
        select_column_list(def),
        table,
        where_clause,
        quoted(def.primary_key)
    );
    q
}

/// INSERT one row, returning every column.
pub fn insert(schema: &str, def: &TableDef, row: &Row) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(schema, def.name);
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for (name, val) in writable_columns(def, row) {
        placeholders.push(q.bind(def, name, val));
        cols.push(quoted(name));
    }
    let returning = select_column_list(def);
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", table, returning)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            table,
            cols.join(", "),
            placeholders.join(", "),
            returning
        )
    };
    q
}

/// INSERT .. ON CONFLICT (key) DO UPDATE, returning every column.
///
/// On the update branch `updated_at` is set to NOW() and the revision column (if the
/// table has one) is incremented instead of taken from the row. With a guard the update
/// only applies while the stored revision equals the expected one; a miss returns no row.
pub fn upsert(schema: &str, def: &TableDef, row: &Row, guard: Option<RevisionGuard>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(schema, def.name);
    let pk = def.primary_key;
    let revision = def.revision_column;
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    let mut sets = Vec::new();
    for (name, val) in writable_columns(def, row) {
        placeholders.push(q.bind(def, name, val));
        cols.push(quoted(name));
        if name != pk && Some(name) != revision && name != UPDATED_AT {
            sets.push(format!("{} = EXCLUDED.{}", quoted(name), quoted(name)));
        }
    }
    if def.column(UPDATED_AT).is_some() {
        sets.push(format!("{} = NOW()", quoted(UPDATED_AT)));
    }
    if let Some(rev) = revision {
        sets.push(format!("{} = {}.{} + 1", quoted(rev), TARGET_ALIAS, quoted(rev)));
    }
    if sets.is_empty() {
        sets.push(format!("{} = EXCLUDED.{}", quoted(pk), quoted(pk)));
    }
    let guard_clause = match (guard, revision) {
        (Some(g), Some(rev)) => {
            let n = q.push_param(Value::from(g.expected));
            format!(" WHERE {}.{} = ${}::bigint", TARGET_ALIAS, quoted(rev), n)
        }
        _ => String::new(),
    };
    q.sql = format!(
        "INSERT INTO {} AS {} ({}) VALUES ({}) ON CONFLICT ({}) DO UPDATE SET {}{} RETURNING {}",
        table,
        TARGET_ALIAS,
        cols.join(", "),
        placeholders.join(", "),
        quoted(pk),
        sets.join(", "),
        guard_clause,
        select_column_list(def)
    );
    q
}

/// DELETE by key, returning the removed row.
pub fn delete(schema: &str, def: &TableDef, id: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(schema, def.name);
    let ph = q.bind(def, def.primary_key, id.clone());
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {} RETURNING {}",
        table,
        quoted(def.primary_key),
        ph,
        select_column_list(def)
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BIO, SKILLS, SKILL_CATEGORIES};
    use serde_json::json;

    fn row(v: Value) -> Row {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn select_filters_and_orders_by_key() {
        let q = select(
            "public",
            &SKILLS,
            &[Filter::eq("category_id", json!(4)), Filter::eq("bogus", json!(1))],
        );
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"name\", \"category_id\", \"proficiency\", \"icon_url\" FROM \"public\".\"skills\" WHERE \"category_id\" = $1::bigint ORDER BY \"id\""
        );
        assert_eq!(q.params, vec![json!(4)]);
    }

    #[test]
    fn insert_skips_null_key_and_defaulted_columns() {
        let q = insert(
            "public",
            &SKILL_CATEGORIES,
            &row(json!({"id": null, "name": "Languages", "sort_order": null})),
        );
        assert_eq!(
            q.sql,
            "INSERT INTO \"public\".\"skill_categories\" (\"name\") VALUES ($1::text) RETURNING \"id\", \"name\", \"sort_order\""
        );
        assert_eq!(q.params, vec![json!("Languages")]);
    }

    #[test]
    fn insert_sends_null_for_missing_required_column() {
        let q = insert("public", &SKILL_CATEGORIES, &row(json!({})));
        assert!(q.sql.contains("(\"name\") VALUES ($1::text)"));
        assert_eq!(q.params, vec![Value::Null]);
    }

    #[test]
    fn upsert_without_revision_column() {
        let q = upsert(
            "public",
            &SKILL_CATEGORIES,
            &row(json!({"id": 7, "name": "Tools", "sort_order": 2})),
            None,
        );
        assert_eq!(
            q.sql,
            "INSERT INTO \"public\".\"skill_categories\" AS t (\"id\", \"name\", \"sort_order\") VALUES ($1::bigint, $2::text, $3::integer) ON CONFLICT (\"id\") DO UPDATE SET \"name\" = EXCLUDED.\"name\", \"sort_order\" = EXCLUDED.\"sort_order\" RETURNING \"id\", \"name\", \"sort_order\""
        );
    }

    #[test]
    fn guarded_upsert_bumps_revision_and_checks_expected() {
        let q = upsert(
            "cms",
            &BIO,
            &row(json!({"id": 1, "name": "Ada", "revision": 3})),
            Some(RevisionGuard { expected: 3 }),
        );
        assert!(q.sql.starts_with("INSERT INTO \"cms\".\"bio\" AS t (\"id\", \"name\", \"title\""));
        assert!(q.sql.contains("\"updated_at\" = NOW(), \"revision\" = t.\"revision\" + 1"));
        assert!(!q.sql.contains("\"revision\" = EXCLUDED"));
        let n = q.params.len();
        assert!(q.sql.contains(&format!("WHERE t.\"revision\" = ${}::bigint RETURNING", n)));
        assert_eq!(q.params.last(), Some(&json!(3)));
    }

    #[test]
    fn delete_by_key() {
        let q = delete("public", &SKILLS, &json!(9));
        assert_eq!(
            q.sql,
            "DELETE FROM \"public\".\"skills\" WHERE \"id\" = $1::bigint RETURNING \"id\", \"name\", \"category_id\", \"proficiency\", \"icon_url\""
        );
        assert_eq!(q.params, vec![json!(9)]);
    }
}
