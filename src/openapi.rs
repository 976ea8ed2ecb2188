use axum::Json;
use utoipa::OpenApi;

use crate::handlers::storage::{FolderRequest, RenameRequest};
use crate::model::{
    Bio, Contact, Copyright, Education, Experience, Project, ProjectAssociation, ProjectMember, Skill, SkillCategory,
};
use crate::storage::{BrowserListing, FileEntry};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Portfolio CMS API",
        version = "1.0.0"
    ),
    tags(
        (name = "profile", description = "Bio and copyright singletons"),
        (name = "content", description = "Education, experience, projects, skills and contacts"),
        (name = "storage", description = "Folder-style file browser over object storage")
    ),
    components(schemas(
        Bio,
        Copyright,
        Education,
        Experience,
        Project,
        ProjectMember,
        ProjectAssociation,
        Skill,
        SkillCategory,
        Contact,
        FileEntry,
        BrowserListing,
        FolderRequest,
        RenameRequest,
    ))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
