use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::domain::types::{OtpMethod, OtpPurpose};
use crate::error::OtpServiceError;
use crate::state::AppState;
use crate::usecase::provisioning::{ProvisioningUriInput, ProvisioningUriUseCase};
use crate::usecase::send::{SendOtpInput, SendOtpUseCase};
use crate::usecase::verify::{
    MarkUsedInput, MarkUsedUseCase, VerifyOtpInput, VerifyOtpUseCase,
};

fn empty_object() -> serde_json::Value {
    serde_json::json!({})
}

// ── POST /otp/code ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SendOtpRequest {
    pub email: String,
    pub purpose: OtpPurpose,
    #[serde(default)]
    pub method: OtpMethod,
    #[serde(default = "empty_object")]
    pub meta: serde_json::Value,
    #[serde(default = "empty_object")]
    pub context: serde_json::Value,
}

pub async fn send_otp(
    State(state): State<AppState>,
    Json(body): Json<SendOtpRequest>,
) -> Result<StatusCode, OtpServiceError> {
    let usecase = SendOtpUseCase {
        users: state.user_port(),
        otps: state.otp_repo(),
        mailer: state.mailer(),
        sms: state.sms_sender(),
        codec: state.codec(),
        clock: state.clock(),
        ttl_secs: state.config.ttl_secs,
        locks: state.send_locks.clone(),
    };
    usecase
        .execute(SendOtpInput {
            email: body.email,
            purpose: body.purpose,
            method: body.method,
            meta: body.meta,
            context: body.context,
        })
        .await?;
    Ok(StatusCode::CREATED)
}

// ── POST /otp/verification ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub purpose: OtpPurpose,
    #[serde(default)]
    pub method: OtpMethod,
    pub code: String,
}

#[derive(Serialize)]
pub struct VerifyOtpResponse {
    pub valid: bool,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>, OtpServiceError> {
    let usecase = VerifyOtpUseCase {
        users: state.user_port(),
        otps: state.otp_repo(),
        codec: state.codec(),
    };
    let valid = usecase
        .execute(VerifyOtpInput {
            email: body.email,
            purpose: body.purpose,
            method: body.method,
            code: body.code,
        })
        .await?;
    Ok(Json(VerifyOtpResponse { valid }))
}

// ── PATCH /otp/code ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct MarkOtpUsedRequest {
    pub email: String,
    pub purpose: OtpPurpose,
    #[serde(default)]
    pub method: OtpMethod,
}

pub async fn mark_otp_used(
    State(state): State<AppState>,
    Json(body): Json<MarkOtpUsedRequest>,
) -> Result<StatusCode, OtpServiceError> {
    let usecase = MarkUsedUseCase {
        users: state.user_port(),
        otps: state.otp_repo(),
    };
    usecase
        .execute(MarkUsedInput {
            email: body.email,
            purpose: body.purpose,
            method: body.method,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /otp/provisioning-uri ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ProvisioningUriQuery {
    pub email: String,
}

#[derive(Serialize)]
pub struct ProvisioningUriResponse {
    pub uri: String,
}

pub async fn get_provisioning_uri(
    State(state): State<AppState>,
    Query(query): Query<ProvisioningUriQuery>,
) -> Result<Json<ProvisioningUriResponse>, OtpServiceError> {
    let usecase = ProvisioningUriUseCase {
        users: state.user_port(),
        issuer: state.config.issuer.clone(),
    };
    let uri = usecase
        .execute(ProvisioningUriInput { email: query.email })
        .await?;
    Ok(Json(ProvisioningUriResponse { uri }))
}
