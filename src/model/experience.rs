use super::{ColumnDef, PkType, Record, TableDef};
use crate::repository::ValidationRule;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const EXPERIENCES: TableDef = TableDef {
    name: "experiences",
    primary_key: "id",
    pk_type: PkType::BigInt,
    columns: &[
        ColumnDef::required("company", "text"),
        ColumnDef::required("role", "text"),
        ColumnDef::optional("location", "text"),
        ColumnDef::optional("start_date", "date"),
        ColumnDef::optional("end_date", "date"),
        ColumnDef::optional("description", "text"),
        ColumnDef::with_default("highlights", "jsonb", "'[]'::jsonb"),
        ColumnDef::with_default("sort_order", "integer", "0"),
    ],
    revision_column: None,
    validation: &[
        ("company", ValidationRule::required().max_length(200)),
        ("role", ValidationRule::required().max_length(200)),
    ],
    dependents: &[],
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Experience {
    #[serde(default)]
    pub id: Option<i64>,
    pub company: String,
    pub role: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

impl Record for Experience {
    type Id = i64;
    const TABLE: &'static TableDef = &EXPERIENCES;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}
