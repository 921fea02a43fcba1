//! services/api/src/bin/api.rs
//!
//! Entry point for the assessment service: loads configuration, opens the
//! key-value store, restores any persisted session and serves the API.

use api_lib::{
    adapters::{CannedPhotoAnalyzer, SqliteKvAdapter},
    config::Config,
    error::ApiError,
    web::{router, ApiDoc, AppState},
};
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::{extract::DefaultBodyLimit, Router};
use chrono::Utc;
use sanctuary_core::{KeyValueStore, MemoryStore, StorageKeys, Workspace};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open the Key-Value Store & Run Migrations ---
    let store: Arc<dyn KeyValueStore> = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let kv_adapter = SqliteKvAdapter::connect(database_url).await?;
            info!("Running database migrations...");
            kv_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(kv_adapter)
        }
        None => {
            warn!("DATABASE_URL not set; assessments will only be kept in memory.");
            Arc::new(MemoryStore::new())
        }
    };

    // --- 3. Restore the Workspace ---
    let today = Utc::now().date_naive();
    let mut workspace = Workspace::new(
        store,
        StorageKeys::with_prefix(&config.storage_prefix),
        today,
    );
    match workspace.restore(today).await {
        Some(session) => info!("Restored session for {}", session.email),
        None => info!("No persisted session; waiting for login."),
    }

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(
        workspace,
        config.clone(),
        Arc::new(CannedPhotoAnalyzer::new()),
    ));

    let cors_origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!(
            "Invalid CORS origin '{}': {}",
            config.cors_origin, e
        ))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let api_router = router(app_state)
        .layer(DefaultBodyLimit::max(25 * 1024 * 1024))
        .layer(cors);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
