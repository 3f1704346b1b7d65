use std::sync::Arc;

use crate::config::OtpConfig;
use crate::infra::delivery::{HttpMailer, HttpSmsSender};
use crate::infra::http::HttpUserPort;
use crate::infra::lock::TupleLocks;
use crate::infra::memory::InMemoryOtpRepository;
use crate::usecase::passcode::{CounterClock, PasscodeCodec};

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<OtpConfig>,
    pub http: reqwest::Client,
    pub otps: InMemoryOtpRepository,
    pub send_locks: Arc<TupleLocks>,
}

impl AppState {
    pub fn new(config: OtpConfig) -> Self {
        Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
            otps: InMemoryOtpRepository::new(),
            send_locks: Arc::new(TupleLocks::new()),
        }
    }

    pub fn user_port(&self) -> HttpUserPort {
        HttpUserPort {
            client: self.http.clone(),
            base_url: self.config.users_url.clone(),
        }
    }

    pub fn otp_repo(&self) -> InMemoryOtpRepository {
        self.otps.clone()
    }

    pub fn mailer(&self) -> HttpMailer {
        HttpMailer {
            client: self.http.clone(),
            base_url: self.config.mailer_url.clone(),
            from_address: self.config.email_from_address.clone(),
        }
    }

    pub fn sms_sender(&self) -> Option<HttpSmsSender> {
        self.config.sms.as_ref().map(|sms| HttpSmsSender {
            client: self.http.clone(),
            api_url: sms.api_url.clone(),
            sender_id: sms.sender_id.clone(),
        })
    }

    pub fn codec(&self) -> PasscodeCodec {
        PasscodeCodec::new(self.config.digits)
    }

    pub fn clock(&self) -> CounterClock {
        CounterClock::new(self.config.step_secs)
    }
}
