use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User data fetched from the users service (everything the passcode flows
/// need: addresses to deliver to, the secret to derive codes from).
#[derive(Debug, Clone, Deserialize)]
pub struct OtpUser {
    pub id: Uuid,
    pub email: String,
    pub phone_number: Option<String>,
    /// Per-user shared secret keying passcode generation. Provisioned and
    /// rotated by the users service; this service only consumes it.
    pub otp_secret: Option<String>,
}

/// Transport a passcode is issued over.
///
/// `Authenticator` is verify-only: the code comes from the user's TOTP app,
/// nothing is ever sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpMethod {
    Sms,
    #[default]
    Email,
    Authenticator,
}

/// What a verified passcode authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    ConfirmEmail,
    SetPassword,
    ForgetPassword,
    ChangeEmail,
}

/// Lifecycle state of a passcode record.
///
/// `Active` is the only non-terminal state: a record moves to `Used` when
/// consumed, or to `Skipped` when a newer send supersedes it. Nothing leaves
/// `Used` or `Skipped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpStatus {
    Active,
    Used,
    Skipped,
}

/// A single issued passcode.
#[derive(Debug, Clone)]
pub struct OtpRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    /// HOTP counter the code was generated against. Fixed at creation.
    pub counter: u64,
    pub expires_at: DateTime<Utc>,
    pub method: OtpMethod,
    pub purpose: OtpPurpose,
    pub status: OtpStatus,
    /// Purpose-specific payload (e.g. the pending address for `ChangeEmail`).
    pub meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl OtpRecord {
    /// A record expiring exactly at `now` is already expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
