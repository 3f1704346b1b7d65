use crate::domain::repository::UserPort;
use crate::error::OtpServiceError;
use crate::usecase::passcode::provisioning_uri;

pub struct ProvisioningUriInput {
    pub email: String,
}

/// Derives the otpauth:// enrollment URI for a user's authenticator app.
/// Pure derivation — no lifecycle state involved; the caller renders the QR
/// code.
pub struct ProvisioningUriUseCase<U>
where
    U: UserPort,
{
    pub users: U,
    pub issuer: String,
}

impl<U> ProvisioningUriUseCase<U>
where
    U: UserPort,
{
    pub async fn execute(&self, input: ProvisioningUriInput) -> Result<String, OtpServiceError> {
        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or(OtpServiceError::UserNotFound)?;
        let secret = user
            .otp_secret
            .as_deref()
            .ok_or(OtpServiceError::MissingOtpSecret)?;

        Ok(provisioning_uri(&self.issuer, &user.email, secret))
    }
}
