use super::{ColumnDef, PkType, Record, TableDef};
use crate::repository::ValidationRule;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const EDUCATION: TableDef = TableDef {
    name: "education",
    primary_key: "id",
    pk_type: PkType::BigInt,
    columns: &[
        ColumnDef::required("institution", "text"),
        ColumnDef::required("degree", "text"),
        ColumnDef::optional("field_of_study", "text"),
        ColumnDef::optional("start_date", "date"),
        ColumnDef::optional("end_date", "date"),
        ColumnDef::optional("description", "text"),
        ColumnDef::with_default("sort_order", "integer", "0"),
    ],
    revision_column: None,
    validation: &[
        ("institution", ValidationRule::required().max_length(200)),
        ("degree", ValidationRule::required().max_length(200)),
    ],
    dependents: &[],
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Education {
    #[serde(default)]
    pub id: Option<i64>,
    pub institution: String,
    pub degree: String,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// None while still enrolled.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

impl Record for Education {
    type Id = i64;
    const TABLE: &'static TableDef = &EDUCATION;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}
