use super::{ColumnDef, Dependent, PkType, Record, TableDef};
use crate::repository::{Format, ValidationRule};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const SKILLS: TableDef = TableDef {
    name: "skills",
    primary_key: "id",
    pk_type: PkType::BigInt,
    columns: &[
        ColumnDef::required("name", "text"),
        ColumnDef::optional("category_id", "bigint").indexed(),
        ColumnDef::optional("proficiency", "integer"),
        ColumnDef::optional("icon_url", "text"),
    ],
    revision_column: None,
    validation: &[
        ("name", ValidationRule::required().max_length(200)),
        ("proficiency", ValidationRule::new().range(0.0, 100.0)),
        ("icon_url", ValidationRule::new().format(Format::Url)),
    ],
    dependents: &[],
};

pub const SKILL_CATEGORIES: TableDef = TableDef {
    name: "skill_categories",
    primary_key: "id",
    pk_type: PkType::BigInt,
    columns: &[
        ColumnDef::required("name", "text"),
        ColumnDef::with_default("sort_order", "integer", "0"),
    ],
    revision_column: None,
    validation: &[("name", ValidationRule::required().max_length(200))],
    dependents: &[Dependent {
        table: &SKILLS,
        column: "category_id",
    }],
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Skill {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    /// Must name an existing category; categories with skills cannot be deleted.
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub proficiency: Option<i32>,
    #[serde(default)]
    pub icon_url: Option<String>,
}

impl Record for Skill {
    type Id = i64;
    const TABLE: &'static TableDef = &SKILLS;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SkillCategory {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

impl Record for SkillCategory {
    type Id = i64;
    const TABLE: &'static TableDef = &SKILL_CATEGORIES;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}
