pub mod ai;
pub mod bookings;
pub mod config;
pub mod dashboard;
pub mod jobs;

use axum::{
    Json,
    extract::{FromRequest, Request, State},
    http::StatusCode,
};
use serde::de::DeserializeOwned;

use super::AppState;

/// `Json` whose rejections answer 400 with the usual `{"success": false}` body
/// instead of axum's plain-text message.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err((
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "success": false,
                    "error": rejection.body_text(),
                })),
            )),
        }
    }
}

pub async fn health_endpoint(State(state): State<AppState>) -> Json<serde_json::Value> {
    let records = state.records.lock().await;
    Json(serde_json::json!({
        "success": true,
        "service": "flashfix",
        "version": env!("CARGO_PKG_VERSION"),
        "jobs": records.len(),
        "store_dirty": records.is_dirty(),
    }))
}
