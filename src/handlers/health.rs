//! Health check endpoint handler.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::registry::RegistryStats;
use crate::state::SharedState;
use crate::stats::HealthReport;

/// Combined health view: sampler report plus registry stats.
#[derive(Debug, Serialize)]
pub struct HealthView {
    pub status: &'static str,
    pub sampler: HealthReport,
    pub registry: RegistryStats,
}

/// Handler for the /health endpoint.
///
/// Answers 503 while no tick has completed yet, or when the last tick
/// is older than three intervals (the loop is wedged, not just slow).
#[instrument(skip(state))]
pub async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let now = chrono::Utc::now().timestamp();
    let report = state.stats.report(now);

    let stale_after = (state.config.interval().as_secs_f64() * 3.0).ceil() as i64;
    let healthy = matches!(
        report.last_tick_age_seconds,
        Some(age) if age <= stale_after.max(1)
    );

    let (status, label) = if healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "stale")
    };

    debug!(%label, ticks = report.ticks_total, "health check");

    (
        status,
        Json(HealthView {
            status: label,
            sampler: report,
            registry: state.registry.stats(),
        }),
    )
}
