use chrono::Utc;

use crate::domain::repository::{OtpRepository, UserPort};
use crate::domain::types::{OtpMethod, OtpPurpose, OtpStatus};
use crate::error::OtpServiceError;
use crate::usecase::passcode::PasscodeCodec;

pub struct VerifyOtpInput {
    pub email: String,
    pub purpose: OtpPurpose,
    pub method: OtpMethod,
    pub code: String,
}

pub struct VerifyOtpUseCase<U, R>
where
    U: UserPort,
    R: OtpRepository,
{
    pub users: U,
    pub otps: R,
    pub codec: PasscodeCodec,
}

impl<U, R> VerifyOtpUseCase<U, R>
where
    U: UserPort,
    R: OtpRepository,
{
    /// Check a candidate code against the Active record for the tuple.
    ///
    /// No active record, an expired record, and a code mismatch all come
    /// back as a plain `false`. Never mutates record state — consuming the
    /// code is a separate, deliberate step (`MarkUsedUseCase`).
    pub async fn execute(&self, input: VerifyOtpInput) -> Result<bool, OtpServiceError> {
        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or(OtpServiceError::UserNotFound)?;
        let secret = user
            .otp_secret
            .as_deref()
            .ok_or(OtpServiceError::MissingOtpSecret)?;

        let Some(record) = self
            .otps
            .find_active(user.id, input.method, input.purpose)
            .await?
        else {
            return Ok(false);
        };

        // Expired records are never valid, even for a mathematically correct
        // code — the counter may be reused by a later send. The codec is not
        // consulted.
        if record.is_expired_at(Utc::now()) {
            return Ok(false);
        }

        let valid = match input.method {
            OtpMethod::Authenticator => self.codec.check_time_based(&input.code, secret),
            OtpMethod::Email | OtpMethod::Sms => {
                self.codec
                    .check_counter_based(&input.code, secret, record.counter)
            }
        };
        Ok(valid)
    }
}

pub struct MarkUsedInput {
    pub email: String,
    pub purpose: OtpPurpose,
    pub method: OtpMethod,
}

pub struct MarkUsedUseCase<U, R>
where
    U: UserPort,
    R: OtpRepository,
{
    pub users: U,
    pub otps: R,
}

impl<U, R> MarkUsedUseCase<U, R>
where
    U: UserPort,
    R: OtpRepository,
{
    /// Transition the tuple's Active record to Used.
    ///
    /// Precondition: the caller has already obtained `true` from a verify
    /// for the same tuple. Calling this without an Active record present is
    /// a caller bug and fails with `NoActivePasscode` rather than silently
    /// succeeding.
    pub async fn execute(&self, input: MarkUsedInput) -> Result<(), OtpServiceError> {
        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or(OtpServiceError::UserNotFound)?;

        let mut record = self
            .otps
            .find_active(user.id, input.method, input.purpose)
            .await?
            .ok_or(OtpServiceError::NoActivePasscode)?;

        record.status = OtpStatus::Used;
        self.otps.save(&record).await
    }
}
