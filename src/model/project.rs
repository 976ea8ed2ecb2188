//! Projects and the people / organizations attached to them.

use super::{ColumnDef, PkType, Record, TableDef};
use crate::repository::{Format, ValidationRule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const PROJECTS: TableDef = TableDef {
    name: "projects",
    primary_key: "id",
    pk_type: PkType::Uuid,
    columns: &[
        ColumnDef::required("title", "text"),
        ColumnDef::optional("slug", "text"),
        ColumnDef::optional("summary", "text"),
        ColumnDef::optional("description", "text"),
        ColumnDef::optional("repo_url", "text"),
        ColumnDef::optional("live_url", "text"),
        ColumnDef::optional("image_url", "text"),
        ColumnDef::with_default("tags", "jsonb", "'[]'::jsonb"),
        ColumnDef::with_default("featured", "boolean", "false"),
        ColumnDef::with_default("created_at", "timestamptz", "now()"),
    ],
    revision_column: None,
    validation: &[
        ("title", ValidationRule::required().max_length(200)),
        ("slug", ValidationRule::new().pattern("^[a-z0-9-]*$")),
        ("repo_url", ValidationRule::new().format(Format::Url)),
        ("live_url", ValidationRule::new().format(Format::Url)),
        ("image_url", ValidationRule::new().format(Format::Url)),
    ],
    dependents: &[],
};

pub const MEMBERS: TableDef = TableDef {
    name: "members",
    primary_key: "id",
    pk_type: PkType::BigInt,
    columns: &[
        ColumnDef::required("project_id", "uuid").indexed(),
        ColumnDef::required("name", "text"),
        ColumnDef::optional("role", "text"),
        ColumnDef::optional("profile_url", "text"),
    ],
    revision_column: None,
    validation: &[
        ("project_id", ValidationRule::required().format(Format::Uuid)),
        ("name", ValidationRule::required().max_length(200)),
        ("profile_url", ValidationRule::new().format(Format::Url)),
    ],
    dependents: &[],
};

pub const ASSOCIATIONS: TableDef = TableDef {
    name: "associations",
    primary_key: "id",
    pk_type: PkType::BigInt,
    columns: &[
        ColumnDef::required("project_id", "uuid").indexed(),
        ColumnDef::required("name", "text"),
        ColumnDef::optional("kind", "text"),
        ColumnDef::optional("url", "text"),
    ],
    revision_column: None,
    validation: &[
        ("project_id", ValidationRule::required().format(Format::Uuid)),
        ("name", ValidationRule::required().max_length(200)),
        ("url", ValidationRule::new().format(Format::Url)),
    ],
    dependents: &[],
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Project {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub repo_url: Option<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for Project {
    type Id = Uuid;
    const TABLE: &'static TableDef = &PROJECTS;

    fn id(&self) -> Option<Uuid> {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = Some(id);
    }
}

/// Collaborator credited on a project.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProjectMember {
    #[serde(default)]
    pub id: Option<i64>,
    pub project_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub profile_url: Option<String>,
}

impl Record for ProjectMember {
    type Id = i64;
    const TABLE: &'static TableDef = &MEMBERS;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

/// Organization, course or client a project was built for.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProjectAssociation {
    #[serde(default)]
    pub id: Option<i64>,
    pub project_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Record for ProjectAssociation {
    type Id = i64;
    const TABLE: &'static TableDef = &ASSOCIATIONS;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}
