use anyhow::Result;
use axum::{routing::get, Router};
use dotenvy::dotenv;
use sea_orm::Database;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod db;
mod error;
mod handlers;
mod services;
mod state;
mod tasks;

use config::Config;
use services::Notifier;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "printvend=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Printvend...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Connect to database. The schema itself is applied by the `migration`
    // binary at deploy time, not here.
    let db = Database::connect(&config.database_url).await?;
    db.ping().await?;
    tracing::info!("Connected to database");

    // Status-change notification publisher
    let notifier = Notifier::new(config.notify_webhook_url.clone());

    // Initialize application state
    let state = AppState::new(db, config, notifier);

    // Start background tasks
    let _scheduler = tasks::start_scheduler(state.clone()).await?;
    tracing::info!("Background task scheduler started");

    // Build application routes
    let app = create_router(state.clone());

    // Start server
    let addr = format!("{}:{}", state.config.server_host, state.config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health::health_check))

        // API routes (JSON)
        .nest("/api", handlers::api_routes())

        // Middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
