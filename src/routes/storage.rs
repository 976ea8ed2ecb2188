//! Storage browser routes, with their own request body limit.

use crate::handlers::storage::{create_folder, delete_file, list, rename, upload};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

pub fn storage_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/files", post(upload))
        .route("/files/*key", delete(delete_file))
        .route("/folders", post(create_folder))
        .route("/rename", post(rename))
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(max_upload_bytes)),
        )
}
