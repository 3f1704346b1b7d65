//! HOTP passcode generation and checking (RFC 4226), the time-based variant
//! authenticator apps use (RFC 6238), and the enrollment key URI.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;

/// Time step authenticator apps agree on. Not configurable — the app side
/// derives its own counters and assumes the RFC 6238 default.
const TOTP_STEP_SECS: i64 = 30;

/// Accepted clock drift for time-based checks, in steps either side.
const TOTP_DRIFT_STEPS: i64 = 1;

/// Derives HOTP counters from wall-clock time.
///
/// Two sends inside the same quantization step share a counter (and so a
/// code); sends in different steps get distinct counters. There is no hidden
/// sequence state — the counter is a pure function of the clock.
#[derive(Debug, Clone, Copy)]
pub struct CounterClock {
    step_secs: u32,
}

impl CounterClock {
    pub fn new(step_secs: u32) -> Self {
        Self { step_secs }
    }

    pub fn current_counter(&self) -> u64 {
        self.counter_at(chrono::Utc::now().timestamp())
    }

    pub fn counter_at(&self, unix_secs: i64) -> u64 {
        (unix_secs / i64::from(self.step_secs)).max(0) as u64
    }
}

/// Computes and checks HMAC-based one-time codes.
///
/// Counter-based codes (email/SMS) key the HMAC with the secret's raw bytes.
/// Time-based codes treat the secret as base32, the encoding enrollment QR
/// codes carry. Digit length is per-instance configuration, never a
/// process-wide default.
#[derive(Debug, Clone, Copy)]
pub struct PasscodeCodec {
    digits: u32,
}

impl PasscodeCodec {
    /// `digits` is the code length; 6–8 are the meaningful values.
    pub fn new(digits: u32) -> Self {
        Self { digits }
    }

    /// Deterministic fixed-length numeric code for (secret, counter).
    pub fn generate(&self, secret: &str, counter: u64) -> String {
        self.hotp(secret.as_bytes(), counter)
    }

    /// Compare `candidate` against the expected code for `counter` in
    /// constant time with respect to the candidate.
    pub fn check_counter_based(&self, candidate: &str, secret: &str, counter: u64) -> bool {
        let expected = self.generate(secret, counter);
        candidate.as_bytes().ct_eq(expected.as_bytes()).into()
    }

    /// Check an authenticator-app code against the current time.
    pub fn check_time_based(&self, candidate: &str, secret: &str) -> bool {
        self.check_time_based_at(candidate, secret, chrono::Utc::now().timestamp())
    }

    /// Time-based check at an explicit timestamp, tolerating
    /// [`TOTP_DRIFT_STEPS`] of clock drift either side. A secret that is not
    /// valid base32 fails closed.
    pub fn check_time_based_at(&self, candidate: &str, secret: &str, unix_secs: i64) -> bool {
        let Some(key) = decode_base32_secret(secret) else {
            return false;
        };
        let step = unix_secs / TOTP_STEP_SECS;
        let mut matched = false;
        for drift in -TOTP_DRIFT_STEPS..=TOTP_DRIFT_STEPS {
            let expected = self.hotp(&key, (step + drift).max(0) as u64);
            matched |= bool::from(candidate.as_bytes().ct_eq(expected.as_bytes()));
        }
        matched
    }

    /// The code an authenticator app would show at `unix_secs`, or `None`
    /// for a secret that is not valid base32.
    pub fn generate_time_based_at(&self, secret: &str, unix_secs: i64) -> Option<String> {
        let key = decode_base32_secret(secret)?;
        Some(self.hotp(&key, (unix_secs / TOTP_STEP_SECS).max(0) as u64))
    }

    /// RFC 4226: HMAC-SHA1 over the big-endian counter, dynamic truncation,
    /// modulo 10^digits, zero-padded.
    fn hotp(&self, key: &[u8], counter: u64) -> String {
        let mut mac =
            Hmac::<Sha1>::new_from_slice(key).expect("hmac accepts keys of any length");
        mac.update(&counter.to_be_bytes());
        let digest = mac.finalize().into_bytes();

        let offset = (digest[digest.len() - 1] & 0x0f) as usize;
        let binary = ((digest[offset] & 0x7f) as u32) << 24
            | (digest[offset + 1] as u32) << 16
            | (digest[offset + 2] as u32) << 8
            | digest[offset + 3] as u32;

        let code = binary % 10u32.pow(self.digits);
        format!("{code:0width$}", width = self.digits as usize)
    }
}

/// Standard otpauth:// key URI for enrolling an authenticator app.
///
/// The secret is carried verbatim — enrollment expects the same base32 form
/// the time-based check decodes.
pub fn provisioning_uri(issuer: &str, account: &str, secret: &str) -> String {
    format!(
        "otpauth://totp/{}:{}?secret={}&issuer={}",
        urlencoding::encode(issuer),
        urlencoding::encode(account),
        secret,
        urlencoding::encode(issuer),
    )
}

fn decode_base32_secret(secret: &str) -> Option<Vec<u8>> {
    let clean = secret.replace([' ', '-'], "").to_uppercase();
    base32::decode(base32::Alphabet::Rfc4648 { padding: false }, &clean)
}
