//! Static host information endpoint handler.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::instrument;

use crate::collectors::host::{self, UnameInfo};
use crate::collectors::memory;
use crate::state::SharedState;

/// Static host information for the dashboard header.
#[derive(Debug, Serialize)]
pub struct SystemView {
    pub uname: UnameInfo,
    pub cores: usize,
    /// Total physical memory; null when /proc/meminfo is unreadable.
    pub total_memory_bytes: Option<u64>,
    /// Host uptime; null when /proc/uptime is unreadable.
    pub uptime_seconds: Option<f64>,
}

/// Handler for the /system endpoint.
#[instrument(skip(_state))]
pub async fn system_handler(State(_state): State<SharedState>) -> Json<SystemView> {
    Json(SystemView {
        uname: host::uname_info().clone(),
        cores: host::core_count(),
        total_memory_bytes: memory::read_meminfo().ok().map(|m| m.total_bytes),
        uptime_seconds: host::read_uptime().ok(),
    })
}
