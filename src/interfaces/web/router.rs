use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Method, Request, header},
    middleware,
    middleware::Next,
    routing::{get, patch, post, put},
};
use tower_http::cors::CorsLayer;

use super::AppState;
use super::handlers::{self, ai, bookings, config, dashboard, jobs};

fn build_localhost_cors(api_port: u16) -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        format!("http://127.0.0.1:{}", api_port),
        format!("http://localhost:{}", api_port),
    ]
    .iter()
    .filter_map(|o| o.parse().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers(tower_http::cors::Any)
}

pub fn build_api_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health_endpoint))
        .route("/api/jobs", get(jobs::list_jobs_endpoint))
        .route(
            "/api/jobs/{id}/status",
            patch(jobs::update_status_endpoint),
        )
        .route("/api/bookings", post(bookings::create_booking_endpoint))
        .route("/api/dashboard", get(dashboard::dashboard_endpoint))
        .route("/api/config", get(config::get_config_endpoint))
        .route("/api/config/webhook", put(config::set_webhook_endpoint))
        .route(
            "/api/ai/key",
            get(ai::get_key_status)
                .post(ai::select_key_endpoint)
                .delete(ai::clear_key_endpoint),
        )
        .route("/api/logs", get(super::sse_logs_endpoint))
        .layer(middleware::from_fn(security_headers))
        .layer(build_localhost_cors(state.api_port))
        .with_state(state)
}

async fn security_headers(req: Request<Body>, next: Next) -> axum::response::Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'self'"),
    );
    response
}
