use axum::{
    Router,
    http::StatusCode,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::otp::{get_provisioning_uri, mark_otp_used, send_otp, verify_otp};
use crate::state::AppState;

/// Handler for `GET /healthz` — liveness check.
async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Handler for `GET /readyz` — readiness check.
async fn readyz() -> StatusCode {
    StatusCode::OK
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Passcodes
        .route("/otp/code", post(send_otp))
        .route("/otp/code", patch(mark_otp_used))
        .route("/otp/verification", post(verify_otp))
        // Authenticator enrollment
        .route("/otp/provisioning-uri", get(get_provisioning_uri))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
