mod analysis;
mod cache;
mod clients;
mod config;
mod db;
mod errors;
mod models;
mod persistence;
mod routes;
mod state;
mod telemetry;
mod worker;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::AnalysisOrchestrator;
use crate::cache::durable::RedisCache;
use crate::clients::profile::ProfileClient;
use crate::clients::scoring::ScoringClient;
use crate::config::Config;
use crate::db::create_pool;
use crate::persistence::PgAnalysisStore;
use crate::routes::build_router;
use crate::state::AppState;
use crate::telemetry::PerformanceMonitor;
use crate::worker::WorkerChannel;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CareerScope API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis (durable cache tier)
    let redis = redis::Client::open(config.redis_url.clone())?;
    let redis_conn = redis.get_multiplexed_async_connection().await?;
    info!("Redis connection established");
    let durable = Arc::new(RedisCache::new(redis_conn, config.cache_ttl));

    // Worker thread for CPU-bound extraction and parsing
    let worker = WorkerChannel::spawn();

    // Outbound clients
    let scorer = Arc::new(ScoringClient::new(
        config.scoring_api_url.clone(),
        config.scoring_api_key.clone(),
        config.scoring_model.clone(),
    ));
    info!("Scoring client initialized (model: {})", config.scoring_model);
    let profiles = Arc::new(ProfileClient::new(
        config.profile_api_url.clone(),
        config.profile_api_key.clone(),
    ));

    // Diagnostics
    let monitor = Arc::new(PerformanceMonitor::new(256));

    // Orchestration layer over all of the above
    let orchestrator = Arc::new(AnalysisOrchestrator::new(
        config.cache_capacity,
        config.cache_ttl,
        durable,
        worker,
        scorer,
        profiles,
        Arc::new(PgAnalysisStore::new(db)),
        Arc::clone(&monitor),
    ));

    // Build app state
    let state = AppState {
        config: config.clone(),
        orchestrator,
        monitor,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
