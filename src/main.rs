//! Donation Tracker Backend
//!
//! Scrapes fundraiser pages on a schedule, records deduplicated donation
//! snapshots in SQLite, and serves them over a small REST API.

mod api;
mod config;
mod db;
mod errors;
mod models;
mod scheduler;
mod scrape;

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::SnapshotStore;
use scrape::{HttpFetcher, ScrapePipeline};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SnapshotStore>,
    pub pipeline: Arc<ScrapePipeline>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Donation Tracker Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Campaign: {}", config.campaign);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let store = Arc::new(SnapshotStore::new(pool));

    // Wire the scrape pipeline
    let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(
        config.fetch_timeout_secs,
    )));
    let pipeline = Arc::new(ScrapePipeline::from_config(&config, fetcher, store.clone())?);

    // Create application state
    let state = AppState {
        store,
        pipeline,
        config: Arc::new(config.clone()),
    };

    // Start the recurring trigger
    if config.scrape_interval_mins > 0 {
        tracing::info!("Scraping every {} minutes", config.scrape_interval_mins);
        tokio::spawn(scheduler::run(
            state.clone(),
            Duration::from_secs(config.scrape_interval_mins * 60),
        ));
    } else {
        tracing::info!("Scheduler disabled; scrapes run on demand only");
    }

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        .route("/scrape", get(api::run_scrape))
        .route("/data", get(api::list_snapshots))
        .route("/data/latest", get(api::latest_snapshot));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
