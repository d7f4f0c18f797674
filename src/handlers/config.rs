//! Configuration display endpoint handler.

use axum::extract::State;
use axum::Json;
use tracing::instrument;

use crate::config::Config;
use crate::state::SharedState;

/// Handler for the /config endpoint. Returns the effective merged
/// configuration the process is running with.
#[instrument(skip(state))]
pub async fn config_handler(State(state): State<SharedState>) -> Json<Config> {
    Json((*state.config).clone())
}
