use super::{ColumnDef, PkType, Record, TableDef};
use crate::repository::ValidationRule;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const CONTACTS: TableDef = TableDef {
    name: "contacts",
    primary_key: "id",
    pk_type: PkType::BigInt,
    columns: &[
        ColumnDef::required("platform", "text"),
        ColumnDef::optional("label", "text"),
        ColumnDef::required("url", "text"),
        ColumnDef::with_default("sort_order", "integer", "0"),
    ],
    revision_column: None,
    validation: &[
        ("platform", ValidationRule::required().max_length(50)),
        // mailto: and tel: links are allowed, so no url format here
        ("url", ValidationRule::required()),
    ],
    dependents: &[],
};

/// A link on the contact strip (GitHub, LinkedIn, mailto:, ...).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Contact {
    #[serde(default)]
    pub id: Option<i64>,
    pub platform: String,
    #[serde(default)]
    pub label: Option<String>,
    pub url: String,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

impl Record for Contact {
    type Id = i64;
    const TABLE: &'static TableDef = &CONTACTS;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}
