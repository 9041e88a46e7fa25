use axum::{Json, extract::State};
use tracing::{info, warn};

use crate::core::settings::{WEBHOOK_OVERRIDE_KEY, is_valid_endpoint};

use super::super::AppState;
use super::ApiJson;

pub async fn get_config_endpoint(State(state): State<AppState>) -> Json<serde_json::Value> {
    let settings = state.settings.read().await;
    Json(serde_json::json!({
        "success": true,
        "webhook_url": settings.webhook_url,
        "webhook_configured": settings.webhook_configured(),
        "endpoint_valid": is_valid_endpoint(&settings.webhook_url),
        "delivery_mode": settings.delivery_mode,
        "legacy_form_url": settings.legacy_form_url,
    }))
}

#[derive(serde::Deserialize)]
pub struct SetWebhookRequest {
    url: String,
}

/// Replace the webhook URL for this and later runs. An empty URL switches
/// bookings to local simulation.
pub async fn set_webhook_endpoint(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SetWebhookRequest>,
) -> Json<serde_json::Value> {
    let url = payload.url.trim().to_string();
    if let Err(e) = state.store.set(WEBHOOK_OVERRIDE_KEY, &url).await {
        warn!("Failed to persist webhook URL: {}", e);
        return Json(serde_json::json!({ "success": false, "error": e.to_string() }));
    }

    let valid = is_valid_endpoint(&url);
    state.settings.write().await.webhook_url = url.clone();
    if url.is_empty() {
        info!("Webhook cleared, bookings will be simulated");
    } else if valid {
        info!("Webhook URL updated");
    } else {
        warn!("Webhook URL '{}' does not look like an http(s) URL", url);
    }

    Json(serde_json::json!({
        "success": true,
        "webhook_url": url,
        "endpoint_valid": valid,
    }))
}
