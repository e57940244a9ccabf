pub mod health;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tokio_util::sync::CancellationToken;

use crate::analysis::{ProfileAnalysisRequest, ResumeAnalysisRequest};
use crate::errors::AppError;
use crate::models::analysis::AnalysisResult;
use crate::state::AppState;
use crate::telemetry::OperationStats;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/analysis/resume", post(handle_analyze_resume))
        .route("/api/v1/analysis/profile", post(handle_analyze_profile))
        .route("/api/v1/analysis/stats", get(handle_stats))
        .with_state(state)
}

/// POST /api/v1/analysis/resume
///
/// The per-request token is cancelled by the drop guard if the client
/// disconnects before the analysis settles, which releases this caller's
/// interest in any shared computation.
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    Json(request): Json<ResumeAnalysisRequest>,
) -> Result<Json<AnalysisResult>, AppError> {
    let token = CancellationToken::new();
    let _guard = token.clone().drop_guard();
    let result = state
        .orchestrator
        .clone()
        .analyze_resume(request, token)
        .await?;
    Ok(Json(result))
}

/// POST /api/v1/analysis/profile
pub async fn handle_analyze_profile(
    State(state): State<AppState>,
    Json(request): Json<ProfileAnalysisRequest>,
) -> Result<Json<AnalysisResult>, AppError> {
    let token = CancellationToken::new();
    let _guard = token.clone().drop_guard();
    let result = state
        .orchestrator
        .clone()
        .analyze_profile(request, token)
        .await?;
    Ok(Json(result))
}

/// GET /api/v1/analysis/stats
/// Rolling-window latency numbers, for dashboards and debugging only.
pub async fn handle_stats(State(state): State<AppState>) -> Json<Vec<OperationStats>> {
    Json(state.monitor.snapshot())
}
