use std::sync::Arc;

use crate::analysis::AnalysisOrchestrator;
use crate::config::Config;
use crate::telemetry::PerformanceMonitor;

/// Shared application state injected into all route handlers via Axum
/// extractors. Everything stateful is constructed once in `main` and
/// carried here; no module-level singletons.
#[derive(Clone)]
pub struct AppState {
    /// Kept for handlers that need runtime settings (none do yet).
    #[allow(dead_code)]
    pub config: Config,
    pub orchestrator: Arc<AnalysisOrchestrator>,
    pub monitor: Arc<PerformanceMonitor>,
}
