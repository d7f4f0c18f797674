//! Root endpoint handler.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use tracing::instrument;

use crate::state::SharedState;

/// Handler for the / endpoint. Lists the service identity and every
/// available endpoint, so a dashboard (or a human with curl) can
/// discover the API.
#[instrument(skip(state))]
pub async fn root_handler(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "service": "hostpulse",
        "version": env!("CARGO_PKG_VERSION"),
        "built": option_env!("VERGEN_BUILD_TIMESTAMP"),
        "provider": state.provider.name(),
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "endpoints": [
            "/cpu",
            "/memory",
            "/disk",
            "/network",
            "/temperature",
            "/series?key=<series-key>",
            "/keys?category=<category>",
            "/health",
            "/config",
            "/system",
        ],
    }))
}
