//! Telemetry read endpoints: category projections and single series.
//!
//! These handlers are the read side of the series registry. They never
//! fail on unknown input: an unknown series key or category yields an
//! empty projection, mirroring a dashboard panel that simply has no
//! data yet.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::registry::MetricCategory;
use crate::state::SharedState;

/// One point of a series history. The entity lives on the series, not
/// on every point.
#[derive(Debug, Clone, Serialize)]
pub struct SamplePoint {
    pub timestamp: i64,
    pub value: f64,
}

/// Renderable projection of one series.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesView {
    pub key: String,
    pub entity: Option<String>,
    /// Most recent value; null while the series has no data.
    pub current: Option<f64>,
    /// Unix timestamp of the newest sample. A value far in the past
    /// marks a stalled series (entity gone from the host).
    pub last_updated: Option<i64>,
    pub history: Vec<SamplePoint>,
}

/// Renderable projection of one metric category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub category: &'static str,
    pub series: Vec<SeriesView>,
}

fn project_series(state: &SharedState, key: &str) -> SeriesView {
    let history = state.registry.history(key);
    let newest = history.last();

    SeriesView {
        key: key.to_string(),
        entity: newest.and_then(|s| s.entity.clone()),
        current: newest.map(|s| s.value),
        last_updated: newest.map(|s| s.timestamp),
        history: history
            .iter()
            .map(|s| SamplePoint {
                timestamp: s.timestamp,
                value: s.value,
            })
            .collect(),
    }
}

fn project_category(state: &SharedState, category: MetricCategory) -> CategoryView {
    let series = state
        .registry
        .known_series(category)
        .iter()
        .map(|key| project_series(state, key))
        .collect();

    CategoryView {
        category: category.name(),
        series,
    }
}

/// Handler for the /cpu endpoint.
#[instrument(skip(state))]
pub async fn cpu_handler(State(state): State<SharedState>) -> Json<CategoryView> {
    Json(project_category(&state, MetricCategory::Cpu))
}

/// Handler for the /memory endpoint.
#[instrument(skip(state))]
pub async fn memory_handler(State(state): State<SharedState>) -> Json<CategoryView> {
    Json(project_category(&state, MetricCategory::Memory))
}

/// Handler for the /disk endpoint.
#[instrument(skip(state))]
pub async fn disk_handler(State(state): State<SharedState>) -> Json<CategoryView> {
    Json(project_category(&state, MetricCategory::Disk))
}

/// Handler for the /network endpoint.
#[instrument(skip(state))]
pub async fn network_handler(State(state): State<SharedState>) -> Json<CategoryView> {
    Json(project_category(&state, MetricCategory::Network))
}

/// Handler for the /temperature endpoint.
#[instrument(skip(state))]
pub async fn temperature_handler(State(state): State<SharedState>) -> Json<CategoryView> {
    Json(project_category(&state, MetricCategory::Temperature))
}

/// Query parameters for the /series endpoint.
#[derive(Debug, Deserialize)]
pub struct SeriesQuery {
    pub key: String,
}

/// Handler for the /series endpoint.
///
/// An unknown key answers an empty series with HTTP 200.
#[instrument(skip(state))]
pub async fn series_handler(
    State(state): State<SharedState>,
    Query(query): Query<SeriesQuery>,
) -> Json<SeriesView> {
    debug!(key = %query.key, "series lookup");
    Json(project_series(&state, &query.key))
}

/// Query parameters for the /keys endpoint.
#[derive(Debug, Deserialize)]
pub struct KeysQuery {
    pub category: Option<String>,
}

/// Response of the /keys endpoint.
#[derive(Debug, Serialize)]
pub struct KeysView {
    pub keys: Vec<String>,
}

/// Handler for the /keys endpoint.
///
/// Without a category filter every known series key is returned; an
/// unrecognized category yields an empty set.
#[instrument(skip(state))]
pub async fn keys_handler(
    State(state): State<SharedState>,
    Query(query): Query<KeysQuery>,
) -> Json<KeysView> {
    let keys = match query.category.as_deref() {
        None => state.registry.all_series(),
        Some(name) => match MetricCategory::from_name(name) {
            Some(category) => state.registry.known_series(category),
            None => Vec::new(),
        },
    };

    Json(KeysView { keys })
}
