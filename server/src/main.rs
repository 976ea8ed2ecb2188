//! Portfolio CMS server: settings from the environment, PostgreSQL tables, S3 storage.
//!
//! Run from repo root: `cargo run -p portfolio-server`

use portfolio_cms::{
    app, apply_migrations, ensure_database_exists, AppState, PgTableClient, S3ObjectStore, Settings,
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("portfolio_cms=info,portfolio_server=info")
            }),
        )
        .init();

    let settings = Settings::from_env()?;

    ensure_database_exists(&settings.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;
    apply_migrations(&pool, &settings.schema).await?;

    let tables = Arc::new(PgTableClient::new(pool, settings.schema.clone()));
    let store = Arc::new(S3ObjectStore::from_settings(&settings.storage).await);
    let state = AppState::new(tables, store, settings.max_upload_bytes);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("Portfolio CMS listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
