use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// OTP service error variants.
///
/// Verification outcomes (no active record, expired, mismatch) are NOT
/// errors — they collapse to a single `false` at the public boundary so a
/// caller cannot tell which one happened.
#[derive(Debug, thiserror::Error)]
pub enum OtpServiceError {
    #[error("user not found")]
    UserNotFound,
    #[error("user has no otp secret")]
    MissingOtpSecret,
    #[error("user has no phone number")]
    MissingPhoneNumber,
    #[error("no active passcode")]
    NoActivePasscode,
    #[error("sms transport not configured")]
    SmsUnconfigured,
    #[error("delivery failed")]
    DeliveryFailed(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl OtpServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::MissingOtpSecret => "MISSING_OTP_SECRET",
            Self::MissingPhoneNumber => "MISSING_PHONE_NUMBER",
            Self::NoActivePasscode => "NO_ACTIVE_PASSCODE",
            Self::SmsUnconfigured => "SMS_UNCONFIGURED",
            Self::DeliveryFailed(_) => "DELIVERY_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for OtpServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::MissingPhoneNumber => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NoActivePasscode => StatusCode::CONFLICT,
            Self::SmsUnconfigured => StatusCode::SERVICE_UNAVAILABLE,
            Self::DeliveryFailed(_) => StatusCode::BAD_GATEWAY,
            Self::MissingOtpSecret | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // tower-http TraceLayer already records method/uri/status for every
        // request; 4xx are expected client outcomes. Internal and delivery
        // errors carry a source chain operators need, so log those here.
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = %e, kind = "INTERNAL", "internal error");
            }
            Self::DeliveryFailed(e) => {
                tracing::error!(error = %e, kind = "DELIVERY_FAILED", "passcode delivery failed");
            }
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
