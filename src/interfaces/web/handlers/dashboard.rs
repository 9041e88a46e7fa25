use axum::{
    Json,
    extract::{Query, State},
};

use crate::core::jobs::{DEFAULT_RECENT_JOBS, dashboard};

use super::super::AppState;

#[derive(serde::Deserialize)]
pub struct DashboardQuery {
    recent: Option<usize>,
}

pub async fn dashboard_endpoint(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Json<serde_json::Value> {
    let records = state.records.lock().await;
    let summary = dashboard(records.jobs(), query.recent.unwrap_or(DEFAULT_RECENT_JOBS));
    Json(serde_json::json!({
        "success": true,
        "counts": summary.counts,
        "recent": summary.recent,
    }))
}
