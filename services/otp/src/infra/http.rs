use anyhow::Context as _;
use reqwest::StatusCode;

use crate::domain::repository::UserPort;
use crate::domain::types::OtpUser;
use crate::error::OtpServiceError;

/// Users-service client. The OTP service holds no user data of its own;
/// email, phone number and the per-user secret all come from here.
#[derive(Clone)]
pub struct HttpUserPort {
    pub client: reqwest::Client,
    pub base_url: String,
}

impl UserPort for HttpUserPort {
    async fn find_by_email(&self, email: &str) -> Result<Option<OtpUser>, OtpServiceError> {
        let url = format!(
            "{}/users/by-email/{}",
            self.base_url,
            urlencoding::encode(email)
        );
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("users service request")?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let user = resp
            .error_for_status()
            .context("users service response")?
            .json::<OtpUser>()
            .await
            .context("users service body")?;
        Ok(Some(user))
    }
}
