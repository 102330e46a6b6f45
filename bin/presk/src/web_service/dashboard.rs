use axum::extract::State;
use axum::Json;
use fan_control::{ChartSeries, Snapshot};

use super::AppState;

pub async fn dashboard(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.handle.snapshot())
}

pub async fn history(State(state): State<AppState>) -> Json<ChartSeries> {
    Json(state.handle.snapshot().chart)
}
