use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::repository::{Mailer, OtpRepository, SmsSender, UserPort};
use crate::domain::types::{OtpMethod, OtpPurpose, OtpRecord, OtpStatus};
use crate::error::OtpServiceError;
use crate::infra::lock::TupleLocks;
use crate::usecase::passcode::{CounterClock, PasscodeCodec};

/// Mailer template rendered for each purpose.
///
/// Exhaustive on purpose — a new purpose without a template is a compile
/// error, not a runtime hole.
pub fn email_template(purpose: OtpPurpose) -> &'static str {
    match purpose {
        OtpPurpose::ConfirmEmail => "invitation",
        OtpPurpose::SetPassword => "set_password",
        OtpPurpose::ForgetPassword => "password_reset",
        OtpPurpose::ChangeEmail => "change_email",
    }
}

pub struct SendOtpInput {
    pub email: String,
    pub purpose: OtpPurpose,
    pub method: OtpMethod,
    pub meta: serde_json::Value,
    /// Caller-supplied template context; the generated code is merged in
    /// under `token`.
    pub context: serde_json::Value,
}

pub struct SendOtpUseCase<U, R, M, S>
where
    U: UserPort,
    R: OtpRepository,
    M: Mailer,
    S: SmsSender,
{
    pub users: U,
    pub otps: R,
    pub mailer: M,
    /// `None` when no SMS credentials are configured; SMS sends then fail
    /// with a typed error instead of a silently dropped message.
    pub sms: Option<S>,
    pub codec: PasscodeCodec,
    pub clock: CounterClock,
    pub ttl_secs: i64,
    pub locks: Arc<TupleLocks>,
}

impl<U, R, M, S> SendOtpUseCase<U, R, M, S>
where
    U: UserPort,
    R: OtpRepository,
    M: Mailer,
    S: SmsSender,
{
    pub async fn execute(&self, input: SendOtpInput) -> Result<(), OtpServiceError> {
        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or(OtpServiceError::UserNotFound)?;
        let secret = user
            .otp_secret
            .as_deref()
            .ok_or(OtpServiceError::MissingOtpSecret)?;

        // Supersede-then-create must not interleave with a concurrent send
        // for the same tuple, or two Active records could coexist.
        let guard = self
            .locks
            .acquire(user.id, input.method, input.purpose)
            .await;

        if let Some(mut previous) = self
            .otps
            .find_active(user.id, input.method, input.purpose)
            .await?
        {
            previous.status = OtpStatus::Skipped;
            self.otps.save(&previous).await?;
        }

        let counter = self.clock.current_counter();
        let now = Utc::now();
        let record = OtpRecord {
            id: Uuid::new_v4(),
            user_id: user.id,
            counter,
            expires_at: now + Duration::seconds(self.ttl_secs),
            method: input.method,
            purpose: input.purpose,
            status: OtpStatus::Active,
            meta: input.meta,
            created_at: now,
        };
        self.otps.create(&record).await?;

        // Delivery runs outside the lock; a failure there leaves the record
        // Active and verifiable.
        drop(guard);

        let code = self.codec.generate(secret, counter);
        match input.method {
            OtpMethod::Email => {
                let mut context = match input.context {
                    serde_json::Value::Object(map) => map,
                    _ => serde_json::Map::new(),
                };
                context.insert("token".to_owned(), json!(code));
                self.mailer
                    .send(
                        &user,
                        email_template(input.purpose),
                        &serde_json::Value::Object(context),
                    )
                    .await?;
            }
            OtpMethod::Sms => {
                let Some(sms) = &self.sms else {
                    tracing::error!(
                        user_id = %user.id,
                        "sms passcode issued but no sms transport is configured"
                    );
                    return Err(OtpServiceError::SmsUnconfigured);
                };
                let to = user
                    .phone_number
                    .as_deref()
                    .ok_or(OtpServiceError::MissingPhoneNumber)?;
                sms.send(to, &format!("Your passcode: {code}")).await?;
            }
            // Verify-only method: the code lives in the user's app.
            OtpMethod::Authenticator => {}
        }

        Ok(())
    }
}
