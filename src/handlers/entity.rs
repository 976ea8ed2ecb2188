//! Collection CRUD handlers, generic over the record type, plus foreign-key lookups.

use crate::error::AppError;
use crate::model::{ProjectAssociation, ProjectMember, Record, Skill};
use crate::response::{success_many, success_one, success_one_ok};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use uuid::Uuid;

/// Path parameter, with extractor failures in the error envelope.
pub(crate) fn path_param<T>(param: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    param
        .map(|Path(v)| v)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

/// JSON body, with extractor failures in the error envelope.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

pub async fn list<R: Record>(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rows = state.repo::<R>().fetch().await?;
    Ok(success_many(rows))
}

pub async fn read<R: Record>(
    State(state): State<AppState>,
    id: Result<Path<R::Id>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_param(id)?;
    let row = state
        .repo::<R>()
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {}", R::TABLE.name, id)))?;
    Ok(success_one_ok(row))
}

pub async fn create<R: Record>(
    State(state): State<AppState>,
    payload: Result<Json<R>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let record = json_body(payload)?;
    let created = state.repo::<R>().create(&record).await?;
    Ok(success_one(created))
}

/// Full-record upsert; the key in the path wins over any key in the body.
pub async fn update<R: Record>(
    State(state): State<AppState>,
    id: Result<Path<R::Id>, PathRejection>,
    payload: Result<Json<R>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_param(id)?;
    let mut record = json_body(payload)?;
    record.set_id(id);
    let stored = state.repo::<R>().update(&record).await?;
    Ok(success_one_ok(stored))
}

pub async fn delete<R: Record>(
    State(state): State<AppState>,
    id: Result<Path<R::Id>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_param(id)?;
    state.repo::<R>().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn project_members(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_param(id)?;
    let rows = state
        .repo::<ProjectMember>()
        .fetch_where("project_id", Value::String(id.to_string()))
        .await?;
    Ok(success_many(rows))
}

pub async fn project_associations(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_param(id)?;
    let rows = state
        .repo::<ProjectAssociation>()
        .fetch_where("project_id", Value::String(id.to_string()))
        .await?;
    Ok(success_many(rows))
}

pub async fn category_skills(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_param(id)?;
    let rows = state.repo::<Skill>().fetch_where("category_id", Value::from(id)).await?;
    Ok(success_many(rows))
}
