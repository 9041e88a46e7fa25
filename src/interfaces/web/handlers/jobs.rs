use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::core::jobs::{JobStatus, history};

use super::super::AppState;
use super::ApiJson;

#[derive(serde::Deserialize)]
pub struct JobsQuery {
    status: Option<String>,
}

pub async fn list_jobs_endpoint(
    State(state): State<AppState>,
    Query(query): Query<JobsQuery>,
) -> (StatusCode, Json<serde_json::Value>) {
    let filter = match query.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") | Some("All") => None,
        Some(raw) => match raw.parse::<JobStatus>() {
            Ok(status) => Some(status),
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({ "success": false, "error": e.to_string() })),
                );
            }
        },
    };

    let records = state.records.lock().await;
    let jobs = history(records.jobs(), filter);
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "success": true,
            "count": jobs.len(),
            "jobs": jobs,
        })),
    )
}

#[derive(serde::Deserialize)]
pub struct UpdateStatusRequest {
    status: String,
}

pub async fn update_status_endpoint(
    Path(id): Path<String>,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<UpdateStatusRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    let status = match payload.status.parse::<JobStatus>() {
        Ok(status) => status,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "success": false, "error": e.to_string() })),
            );
        }
    };

    let mut records = state.records.lock().await;
    let updated = records.set_status(&id, status).await;
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "success": true,
            "updated": updated,
            "job": records.get(&id),
        })),
    )
}
