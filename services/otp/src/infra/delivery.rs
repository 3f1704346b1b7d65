use anyhow::Context as _;

use crate::domain::repository::{Mailer, SmsSender};
use crate::domain::types::OtpUser;
use crate::error::OtpServiceError;

/// Mailer-service client. Hands over the template id and render context;
/// the mailer owns templates and rendering.
#[derive(Clone)]
pub struct HttpMailer {
    pub client: reqwest::Client,
    pub base_url: String,
    pub from_address: String,
}

impl Mailer for HttpMailer {
    async fn send(
        &self,
        to: &OtpUser,
        template: &'static str,
        context: &serde_json::Value,
    ) -> Result<(), OtpServiceError> {
        let body = serde_json::json!({
            "to": to.email,
            "from": self.from_address,
            "template": template,
            "context": context,
        });
        self.client
            .post(format!("{}/send", self.base_url))
            .json(&body)
            .send()
            .await
            .context("mailer request")
            .map_err(OtpServiceError::DeliveryFailed)?
            .error_for_status()
            .context("mailer response")
            .map_err(OtpServiceError::DeliveryFailed)?;
        Ok(())
    }
}

/// SMS gateway client (message-create endpoint, Twilio-style).
#[derive(Clone)]
pub struct HttpSmsSender {
    pub client: reqwest::Client,
    pub api_url: String,
    pub sender_id: String,
}

impl SmsSender for HttpSmsSender {
    async fn send(&self, to_number: &str, body: &str) -> Result<(), OtpServiceError> {
        let payload = serde_json::json!({
            "from": self.sender_id,
            "to": to_number,
            "body": body,
        });
        self.client
            .post(format!("{}/messages", self.api_url))
            .json(&payload)
            .send()
            .await
            .context("sms gateway request")
            .map_err(OtpServiceError::DeliveryFailed)?
            .error_for_status()
            .context("sms gateway response")
            .map_err(OtpServiceError::DeliveryFailed)?;
        Ok(())
    }
}
