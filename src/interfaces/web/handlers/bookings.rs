use axum::{Json, extract::State, http::StatusCode};

use crate::core::booking::{BookingError, BookingForm, ValidationError};
use crate::core::jobs::{BookingParams, ServiceType};

use super::super::AppState;
use super::ApiJson;

/// Wire shape of a booking. Everything arrives as text so that a bad
/// service type is reported like any other validation failure.
#[derive(serde::Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBookingRequest {
    client_name: String,
    client_email: String,
    address: String,
    unit: String,
    service_type: String,
    lockbox: String,
}

impl CreateBookingRequest {
    fn into_params(self) -> Result<BookingParams, String> {
        if self.service_type.trim().is_empty() {
            return Err(ValidationError::MissingField("Service type").to_string());
        }
        let service_type = self
            .service_type
            .parse::<ServiceType>()
            .map_err(|e| e.to_string())?;
        Ok(BookingParams {
            client_name: self.client_name,
            client_email: self.client_email,
            address: self.address,
            unit: self.unit,
            service_type,
            lockbox: self.lockbox,
        })
    }
}

pub async fn create_booking_endpoint(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateBookingRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    let params = match payload.into_params() {
        Ok(params) => params,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "success": false, "error": e })),
            );
        }
    };

    let mut form = BookingForm::with_params(params);
    match state.bookings.submit(&mut form).await {
        Ok(job) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "job": job })),
        ),
        Err(e) => {
            let status = match &e {
                BookingError::Invalid(_) => StatusCode::BAD_REQUEST,
                BookingError::AlreadySubmitting => StatusCode::CONFLICT,
                BookingError::Delivery(_) => StatusCode::BAD_GATEWAY,
            };
            (
                status,
                Json(serde_json::json!({ "success": false, "error": e.to_string() })),
            )
        }
    }
}
