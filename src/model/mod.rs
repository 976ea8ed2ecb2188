//! Portfolio records and the static table descriptors they map onto.

mod bio;
mod contact;
mod education;
mod experience;
mod project;
mod skill;

pub use bio::{Bio, Copyright, BIO, COPYRIGHT};
pub use contact::{Contact, CONTACTS};
pub use education::{Education, EDUCATION};
pub use experience::{Experience, EXPERIENCES};
pub use project::{Project, ProjectAssociation, ProjectMember, ASSOCIATIONS, MEMBERS, PROJECTS};
pub use skill::{Skill, SkillCategory, SKILLS, SKILL_CATEGORIES};

use crate::repository::ValidationRule;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// One table row as returned by the table service.
pub type Row = Map<String, Value>;

/// Primary key type; decides how the key is assigned and how it is declared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PkType {
    /// `BIGINT GENERATED BY DEFAULT AS IDENTITY`
    BigInt,
    /// `UUID DEFAULT gen_random_uuid()`
    Uuid,
}

#[derive(Clone, Copy, Debug)]
pub struct ColumnDef {
    pub name: &'static str,
    /// PostgreSQL type name, also used for `$n::type` casts when binding.
    pub pg_type: &'static str,
    pub nullable: bool,
    /// SQL default expression, if any.
    pub default: Option<&'static str>,
    /// Create a btree index on this column (foreign keys).
    pub indexed: bool,
}

impl ColumnDef {
    pub const fn required(name: &'static str, pg_type: &'static str) -> Self {
        ColumnDef {
            name,
            pg_type,
            nullable: false,
            default: None,
            indexed: false,
        }
    }

    pub const fn optional(name: &'static str, pg_type: &'static str) -> Self {
        ColumnDef {
            name,
            pg_type,
            nullable: true,
            default: None,
            indexed: false,
        }
    }

    pub const fn with_default(name: &'static str, pg_type: &'static str, default: &'static str) -> Self {
        ColumnDef {
            name,
            pg_type,
            nullable: false,
            default: Some(default),
            indexed: false,
        }
    }

    pub const fn indexed(self) -> Self {
        ColumnDef {
            indexed: true,
            ..self
        }
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// Rows in another table that point at this one through a plain foreign-key column.
#[derive(Debug)]
pub struct Dependent {
    pub table: &'static TableDef,
    pub column: &'static str,
}

/// Static description of one table: everything the SQL builder, migrations and the
/// in-memory backend need to know.
#[derive(Debug)]
pub struct TableDef {
    pub name: &'static str,
    pub primary_key: &'static str,
    pub pk_type: PkType,
    /// Non-key columns, in declaration order.
    pub columns: &'static [ColumnDef],
    /// Compare-and-swap column for singleton saves. Its presence marks the table as
    /// single-row.
    pub revision_column: Option<&'static str>,
    pub validation: &'static [(&'static str, ValidationRule)],
    /// Checked before a delete; any referencing row rejects it.
    pub dependents: &'static [Dependent],
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn pk_pg_type(&self) -> &'static str {
        match self.pk_type {
            PkType::BigInt => "bigint",
            PkType::Uuid => "uuid",
        }
    }

    /// Revision-guarded tables hold at most one row.
    pub fn is_singleton(&self) -> bool {
        self.revision_column.is_some()
    }

    /// Key column plus every declared column, key first.
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.primary_key).chain(self.columns.iter().map(|c| c.name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        name == self.primary_key || self.column(name).is_some()
    }

    /// Cast type for a column name (key included).
    pub fn pg_type_of(&self, name: &str) -> Option<&'static str> {
        if name == self.primary_key {
            Some(self.pk_pg_type())
        } else {
            self.column(name).map(|c| c.pg_type)
        }
    }
}

/// A typed record stored in one table.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    type Id: Serialize + DeserializeOwned + Clone + std::fmt::Display + Send + Sync + 'static;

    const TABLE: &'static TableDef;

    fn id(&self) -> Option<Self::Id>;

    fn set_id(&mut self, id: Self::Id);
}

/// A record expected to exist at most once, saved under a revision guard.
pub trait Singleton: Record {
    fn revision(&self) -> Option<i64>;
}

/// Serialize a record into a row restricted to the table's columns.
pub fn record_to_row<R: Record>(record: &R) -> Result<Row, crate::error::AppError> {
    let value = serde_json::to_value(record)?;
    let Value::Object(map) = value else {
        return Err(crate::error::AppError::BadRequest(format!(
            "{} record must serialize to an object",
            R::TABLE.name
        )));
    };
    Ok(map.into_iter().filter(|(k, _)| R::TABLE.has_column(k)).collect())
}

/// Decode a returned row into its record type.
pub fn row_to_record<R: Record>(row: Row) -> Result<R, crate::error::AppError> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

/// All table descriptors, in creation order.
pub fn all_tables() -> [&'static TableDef; 10] {
    [
        &BIO,
        &COPYRIGHT,
        &EDUCATION,
        &EXPERIENCES,
        &PROJECTS,
        &MEMBERS,
        &ASSOCIATIONS,
        &SKILL_CATEGORIES,
        &SKILLS,
        &CONTACTS,
    ]
}
