//! Singleton records: the site owner's bio and the footer copyright line.

use super::{ColumnDef, PkType, Record, Singleton, TableDef};
use crate::repository::{Format, ValidationRule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const BIO: TableDef = TableDef {
    name: "bio",
    primary_key: "id",
    pk_type: PkType::BigInt,
    columns: &[
        ColumnDef::required("name", "text"),
        ColumnDef::optional("title", "text"),
        ColumnDef::optional("summary", "text"),
        ColumnDef::optional("location", "text"),
        ColumnDef::optional("email", "text"),
        ColumnDef::optional("avatar_url", "text"),
        ColumnDef::optional("resume_url", "text"),
        ColumnDef::with_default("revision", "bigint", "1"),
        ColumnDef::with_default("updated_at", "timestamptz", "now()"),
    ],
    revision_column: Some("revision"),
    validation: &[
        ("name", ValidationRule::required().max_length(200)),
        ("email", ValidationRule::new().format(Format::Email)),
        ("avatar_url", ValidationRule::new().format(Format::Url)),
        ("resume_url", ValidationRule::new().format(Format::Url)),
    ],
    dependents: &[],
};

pub const COPYRIGHT: TableDef = TableDef {
    name: "copyright",
    primary_key: "id",
    pk_type: PkType::BigInt,
    columns: &[
        ColumnDef::required("holder", "text"),
        ColumnDef::required("year_start", "integer"),
        ColumnDef::optional("year_end", "integer"),
        ColumnDef::optional("notice", "text"),
        ColumnDef::with_default("revision", "bigint", "1"),
        ColumnDef::with_default("updated_at", "timestamptz", "now()"),
    ],
    revision_column: Some("revision"),
    validation: &[
        ("holder", ValidationRule::required().max_length(200)),
        ("year_start", ValidationRule::required().range(1900.0, 2100.0)),
        ("year_end", ValidationRule::new().range(1900.0, 2100.0)),
    ],
    dependents: &[],
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Bio {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
    /// Revision the client read; the save is rejected if the row moved on since.
    #[serde(default)]
    pub revision: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for Bio {
    type Id = i64;
    const TABLE: &'static TableDef = &BIO;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

impl Singleton for Bio {
    fn revision(&self) -> Option<i64> {
        self.revision
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Copyright {
    #[serde(default)]
    pub id: Option<i64>,
    pub holder: String,
    pub year_start: i32,
    #[serde(default)]
    pub year_end: Option<i32>,
    #[serde(default)]
    pub notice: Option<String>,
    #[serde(default)]
    pub revision: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for Copyright {
    type Id = i64;
    const TABLE: &'static TableDef = &COPYRIGHT;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

impl Singleton for Copyright {
    fn revision(&self) -> Option<i64> {
        self.revision
    }
}
