//! Bio and copyright: one row each, saved under a revision guard.

use super::entity::json_body;
use crate::error::AppError;
use crate::model::{Record, Singleton};
use crate::response::{success_one, success_one_ok};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};

/// The stored row, or `data: null` when none exists yet.
pub async fn fetch<R: Singleton>(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let row = state.singleton::<R>().fetch().await?;
    Ok(success_one_ok(row))
}

/// Create on first save (201), guarded update afterwards (200).
pub async fn save<R: Singleton>(
    State(state): State<AppState>,
    payload: Result<Json<R>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let record = json_body(payload)?;
    let creating = record.id().is_none();
    let stored = state.singleton::<R>().save(&record).await?;
    Ok(if creating {
        success_one(stored)
    } else {
        success_one_ok(stored)
    })
}
