use axum::{Json, extract::State};

use super::super::AppState;
use super::ApiJson;

pub async fn get_key_status(State(state): State<AppState>) -> Json<serde_json::Value> {
    match state.vault.has_selected_key().await {
        Ok(selected) => Json(serde_json::json!({ "success": true, "selected": selected })),
        Err(e) => Json(serde_json::json!({ "success": false, "error": e.to_string() })),
    }
}

#[derive(serde::Deserialize)]
pub struct SelectKeyRequest {
    key: String,
}

pub async fn select_key_endpoint(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SelectKeyRequest>,
) -> Json<serde_json::Value> {
    if payload.key.trim().is_empty() {
        return Json(serde_json::json!({ "success": false, "error": "Key must not be empty" }));
    }
    match state.vault.select_key(&payload.key).await {
        Ok(()) => Json(serde_json::json!({ "success": true, "selected": true })),
        Err(e) => Json(serde_json::json!({ "success": false, "error": e.to_string() })),
    }
}

pub async fn clear_key_endpoint(State(state): State<AppState>) -> Json<serde_json::Value> {
    match state.vault.clear_key().await {
        Ok(()) => Json(serde_json::json!({ "success": true, "selected": false })),
        Err(e) => Json(serde_json::json!({ "success": false, "error": e.to_string() })),
    }
}
