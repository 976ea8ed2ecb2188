//! Router assembly.

mod common;
mod content;
mod storage;

pub use common::common_routes;
pub use content::content_routes;
pub use storage::storage_routes;

use crate::openapi::openapi_json;
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

/// Full application: `/health`, `/ready`, `/version` and everything else under `/api/v1`.
pub fn app(state: AppState) -> Router {
    let api = content_routes()
        .nest("/storage", storage_routes(state.max_upload_bytes))
        .route("/openapi.json", get(openapi_json));
    Router::new()
        .merge(common_routes())
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
