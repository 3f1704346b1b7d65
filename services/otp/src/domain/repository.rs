#![allow(async_fn_in_trait)]

use uuid::Uuid;

use crate::domain::types::{OtpMethod, OtpPurpose, OtpRecord, OtpUser};
use crate::error::OtpServiceError;

/// Port for looking up users via the users service.
pub trait UserPort: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<OtpUser>, OtpServiceError>;
}

/// Repository for passcode records.
pub trait OtpRepository: Send + Sync {
    /// Find the single Active record for a (user, method, purpose) tuple.
    async fn find_active(
        &self,
        user_id: Uuid,
        method: OtpMethod,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpRecord>, OtpServiceError>;

    /// Insert a freshly issued record.
    async fn create(&self, record: &OtpRecord) -> Result<(), OtpServiceError>;

    /// Persist a status transition on an existing record (matched by id).
    async fn save(&self, record: &OtpRecord) -> Result<(), OtpServiceError>;
}

/// Port for the mailer service. Template rendering happens on the mailer
/// side; this hands over a template id plus the render context.
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        to: &OtpUser,
        template: &'static str,
        context: &serde_json::Value,
    ) -> Result<(), OtpServiceError>;
}

/// Port for the SMS gateway.
pub trait SmsSender: Send + Sync {
    async fn send(&self, to_number: &str, body: &str) -> Result<(), OtpServiceError>;
}
