//! Storage browser handlers: listing, multipart upload, folders, rename, delete.

use super::entity::{json_body, path_param};
use crate::error::AppError;
use crate::response::{success_one, success_one_ok, success_with_meta};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub folder: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FolderRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RenameRequest {
    pub key: String,
    pub label: String,
}

pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let listing = state.storage.list(q.folder.as_deref()).await?;
    let meta = serde_json::json!({
        "count": listing.files.len(),
        "folders": listing.folders.len(),
    });
    Ok(success_with_meta(listing, meta))
}

struct UploadForm {
    file: Option<(String, Option<String>, Vec<u8>)>,
    folder: Option<String>,
    label: String,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm {
        file: None,
        folder: None,
        label: String::new(),
    };
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("file").to_string();
                let content_type = field.content_type().map(String::from);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                form.file = Some((file_name, content_type, bytes.to_vec()));
            }
            "folder" => {
                form.folder = Some(field.text().await.map_err(|e| AppError::BadRequest(e.body_text()))?);
            }
            "label" => {
                form.label = field.text().await.map_err(|e| AppError::BadRequest(e.body_text()))?;
            }
            other => tracing::debug!(field = other, "ignoring multipart field"),
        }
    }
    Ok(form)
}

/// Multipart fields: `file` (required), `folder`, `label`.
pub async fn upload(State(state): State<AppState>, multipart: Multipart) -> Result<impl IntoResponse, AppError> {
    let form = read_upload_form(multipart).await?;
    let (original_name, content_type, body) = form
        .file
        .ok_or_else(|| AppError::Validation("multipart field 'file' is required".into()))?;
    let entry = state
        .storage
        .upload(
            form.folder.as_deref(),
            &form.label,
            &original_name,
            body,
            content_type.as_deref(),
        )
        .await?;
    Ok(success_one(entry))
}

pub async fn delete_file(
    State(state): State<AppState>,
    key: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let key = path_param(key)?;
    state.storage.delete(key.trim_start_matches('/')).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_folder(
    State(state): State<AppState>,
    payload: Result<Json<FolderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req = json_body(payload)?;
    let name = state.storage.create_folder(&req.name).await?;
    Ok(success_one(serde_json::json!({ "name": name })))
}

pub async fn rename(
    State(state): State<AppState>,
    payload: Result<Json<RenameRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req = json_body(payload)?;
    let entry = state.storage.rename(&req.key, &req.label).await?;
    Ok(success_one_ok(entry))
}
