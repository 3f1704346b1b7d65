/// OTP service configuration loaded from environment variables.
#[derive(Debug)]
pub struct OtpConfig {
    /// Passcode digit length. Env var: `OTP_DIGITS` (default 6).
    pub digits: u32,
    /// Record validity window in seconds. Env var: `OTP_TTL_SECS` (default 300).
    pub ttl_secs: i64,
    /// Counter quantization step in seconds. Env var: `OTP_STEP_SECS` (default 2).
    pub step_secs: u32,
    /// Issuer label in authenticator enrollment URIs. Env var: `OTP_ISSUER`.
    pub issuer: String,
    /// TCP port to listen on (default 3114). Env var: `OTP_PORT`.
    pub otp_port: u16,
    /// Users service base URL. Env var: `USERS_URL`.
    pub users_url: String,
    /// Mailer service base URL. Env var: `MAILER_URL`.
    pub mailer_url: String,
    /// From address handed to the mailer. Env var: `EMAIL_FROM_ADDRESS`.
    pub email_from_address: String,
    /// SMS gateway settings, present only when both env vars are set.
    pub sms: Option<SmsConfig>,
}

/// SMS gateway settings. Env vars: `SMS_API_URL`, `SMS_SENDER_ID`.
#[derive(Debug)]
pub struct SmsConfig {
    pub api_url: String,
    pub sender_id: String,
}

impl OtpConfig {
    pub fn from_env() -> Self {
        Self {
            digits: env_or("OTP_DIGITS", 6),
            ttl_secs: env_or("OTP_TTL_SECS", 300),
            step_secs: env_or("OTP_STEP_SECS", 2),
            issuer: std::env::var("OTP_ISSUER").expect("OTP_ISSUER"),
            otp_port: env_or("OTP_PORT", 3114),
            users_url: std::env::var("USERS_URL").expect("USERS_URL"),
            mailer_url: std::env::var("MAILER_URL").expect("MAILER_URL"),
            email_from_address: std::env::var("EMAIL_FROM_ADDRESS").expect("EMAIL_FROM_ADDRESS"),
            sms: match (std::env::var("SMS_API_URL"), std::env::var("SMS_SENDER_ID")) {
                (Ok(api_url), Ok(sender_id)) => Some(SmsConfig { api_url, sender_id }),
                _ => None,
            },
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
