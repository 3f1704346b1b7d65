use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use passgate_otp::domain::types::{OtpMethod, OtpPurpose, OtpRecord, OtpStatus};
use passgate_otp::error::OtpServiceError;
use passgate_otp::infra::lock::TupleLocks;
use passgate_otp::infra::memory::InMemoryOtpRepository;
use passgate_otp::usecase::passcode::{CounterClock, PasscodeCodec};
use passgate_otp::usecase::send::{SendOtpInput, SendOtpUseCase};
use passgate_otp::usecase::verify::{
    MarkUsedInput, MarkUsedUseCase, VerifyOtpInput, VerifyOtpUseCase,
};

use crate::helpers::{CapturingMailer, CapturingSms, MockUserPort, TEST_SECRET, test_user};

/// Issue a passcode over email and return the code that was "delivered".
async fn send_and_capture(repo: &InMemoryOtpRepository, purpose: OtpPurpose) -> String {
    let mailer = CapturingMailer::new();
    let sent = mailer.sent_handle();
    let uc = SendOtpUseCase {
        users: MockUserPort::new(vec![test_user()]),
        otps: repo.clone(),
        mailer,
        sms: None::<CapturingSms>,
        codec: PasscodeCodec::new(6),
        clock: CounterClock::new(2),
        ttl_secs: 300,
        locks: Arc::new(TupleLocks::new()),
    };
    uc.execute(SendOtpInput {
        email: test_user().email,
        purpose,
        method: OtpMethod::Email,
        meta: serde_json::json!({}),
        context: serde_json::json!({}),
    })
    .await
    .unwrap();

    let sent = sent.lock().unwrap();
    sent.last().unwrap().context["token"]
        .as_str()
        .unwrap()
        .to_owned()
}

fn verify_usecase(repo: &InMemoryOtpRepository) -> VerifyOtpUseCase<MockUserPort, InMemoryOtpRepository> {
    VerifyOtpUseCase {
        users: MockUserPort::new(vec![test_user()]),
        otps: repo.clone(),
        codec: PasscodeCodec::new(6),
    }
}

fn verify_input(purpose: OtpPurpose, method: OtpMethod, code: &str) -> VerifyOtpInput {
    VerifyOtpInput {
        email: test_user().email,
        purpose,
        method,
        code: code.to_owned(),
    }
}

fn seeded_record(counter: u64, expires_at: chrono::DateTime<Utc>) -> OtpRecord {
    OtpRecord {
        id: Uuid::new_v4(),
        user_id: test_user().id,
        counter,
        expires_at,
        method: OtpMethod::Email,
        purpose: OtpPurpose::ForgetPassword,
        status: OtpStatus::Active,
        meta: serde_json::json!({}),
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn should_verify_code_issued_by_send() {
    let repo = InMemoryOtpRepository::new();
    let code = send_and_capture(&repo, OtpPurpose::ForgetPassword).await;

    let valid = verify_usecase(&repo)
        .execute(verify_input(
            OtpPurpose::ForgetPassword,
            OtpMethod::Email,
            &code,
        ))
        .await
        .unwrap();
    assert!(valid);

    // Verification never consumes the record.
    assert_eq!(repo.records()[0].status, OtpStatus::Active);
    let again = verify_usecase(&repo)
        .execute(verify_input(
            OtpPurpose::ForgetPassword,
            OtpMethod::Email,
            &code,
        ))
        .await
        .unwrap();
    assert!(again);
}

#[tokio::test]
async fn should_reject_wrong_code() {
    let repo = InMemoryOtpRepository::new();
    let code = send_and_capture(&repo, OtpPurpose::ForgetPassword).await;
    let wrong = if code == "000000" { "000001" } else { "000000" };

    let valid = verify_usecase(&repo)
        .execute(verify_input(
            OtpPurpose::ForgetPassword,
            OtpMethod::Email,
            wrong,
        ))
        .await
        .unwrap();
    assert!(!valid);
}

#[tokio::test]
async fn should_reject_when_no_active_record() {
    let repo = InMemoryOtpRepository::new();
    let valid = verify_usecase(&repo)
        .execute(verify_input(
            OtpPurpose::ForgetPassword,
            OtpMethod::Email,
            "123456",
        ))
        .await
        .unwrap();
    assert!(!valid);
}

#[tokio::test]
async fn should_reject_expired_record_with_correct_code() {
    let repo = InMemoryOtpRepository::new();
    let codec = PasscodeCodec::new(6);
    let counter = CounterClock::new(2).current_counter();
    repo.insert(seeded_record(counter, Utc::now() - Duration::seconds(1)));
    let code = codec.generate(TEST_SECRET, counter);

    let valid = verify_usecase(&repo)
        .execute(verify_input(
            OtpPurpose::ForgetPassword,
            OtpMethod::Email,
            &code,
        ))
        .await
        .unwrap();
    assert!(!valid, "an expired record must fail even with the right code");
}

#[tokio::test]
async fn should_reject_code_from_superseded_send() {
    let repo = InMemoryOtpRepository::new();
    let codec = PasscodeCodec::new(6);

    // A previously issued record, from an older counter step.
    let old_counter = CounterClock::new(2).current_counter() - 500;
    repo.insert(seeded_record(old_counter, Utc::now() + Duration::seconds(300)));
    let old_code = codec.generate(TEST_SECRET, old_counter);

    // A fresh send supersedes it.
    let _new_code = send_and_capture(&repo, OtpPurpose::ForgetPassword).await;
    assert_eq!(repo.records()[0].status, OtpStatus::Skipped);

    let valid = verify_usecase(&repo)
        .execute(verify_input(
            OtpPurpose::ForgetPassword,
            OtpMethod::Email,
            &old_code,
        ))
        .await
        .unwrap();
    assert!(!valid, "a superseded code must no longer verify");
}

#[tokio::test]
async fn should_accept_current_authenticator_code() {
    let repo = InMemoryOtpRepository::new();
    let codec = PasscodeCodec::new(6);

    // Authenticator records are created by send but nothing is delivered;
    // the code comes from the user's app.
    let mut record = seeded_record(0, Utc::now() + Duration::seconds(300));
    record.method = OtpMethod::Authenticator;
    repo.insert(record);

    let code = codec
        .generate_time_based_at(TEST_SECRET, Utc::now().timestamp())
        .unwrap();
    let valid = verify_usecase(&repo)
        .execute(verify_input(
            OtpPurpose::ForgetPassword,
            OtpMethod::Authenticator,
            &code,
        ))
        .await
        .unwrap();
    assert!(valid);
}

#[tokio::test]
async fn should_reject_stale_authenticator_code() {
    let repo = InMemoryOtpRepository::new();
    let codec = PasscodeCodec::new(6);

    let mut record = seeded_record(0, Utc::now() + Duration::seconds(300));
    record.method = OtpMethod::Authenticator;
    repo.insert(record);

    let code = codec
        .generate_time_based_at(TEST_SECRET, Utc::now().timestamp() - 300)
        .unwrap();
    let valid = verify_usecase(&repo)
        .execute(verify_input(
            OtpPurpose::ForgetPassword,
            OtpMethod::Authenticator,
            &code,
        ))
        .await
        .unwrap();
    assert!(!valid);
}

#[tokio::test]
async fn should_reject_verify_for_unknown_user() {
    let repo = InMemoryOtpRepository::new();
    let uc = VerifyOtpUseCase {
        users: MockUserPort::empty(),
        otps: repo,
        codec: PasscodeCodec::new(6),
    };
    let result = uc
        .execute(verify_input(
            OtpPurpose::ForgetPassword,
            OtpMethod::Email,
            "123456",
        ))
        .await;
    assert!(matches!(result, Err(OtpServiceError::UserNotFound)));
}

#[tokio::test]
async fn should_mark_active_record_used() {
    let repo = InMemoryOtpRepository::new();
    let code = send_and_capture(&repo, OtpPurpose::ConfirmEmail).await;

    let valid = verify_usecase(&repo)
        .execute(verify_input(
            OtpPurpose::ConfirmEmail,
            OtpMethod::Email,
            &code,
        ))
        .await
        .unwrap();
    assert!(valid);

    let uc = MarkUsedUseCase {
        users: MockUserPort::new(vec![test_user()]),
        otps: repo.clone(),
    };
    uc.execute(MarkUsedInput {
        email: test_user().email,
        purpose: OtpPurpose::ConfirmEmail,
        method: OtpMethod::Email,
    })
    .await
    .unwrap();

    assert_eq!(repo.records()[0].status, OtpStatus::Used);

    // With the record consumed, the same code no longer verifies.
    let valid = verify_usecase(&repo)
        .execute(verify_input(
            OtpPurpose::ConfirmEmail,
            OtpMethod::Email,
            &code,
        ))
        .await
        .unwrap();
    assert!(!valid);
}

#[tokio::test]
async fn should_fail_loudly_when_marking_used_twice() {
    let repo = InMemoryOtpRepository::new();
    let _code = send_and_capture(&repo, OtpPurpose::ConfirmEmail).await;

    let build = || MarkUsedUseCase {
        users: MockUserPort::new(vec![test_user()]),
        otps: repo.clone(),
    };
    let input = || MarkUsedInput {
        email: test_user().email,
        purpose: OtpPurpose::ConfirmEmail,
        method: OtpMethod::Email,
    };

    build().execute(input()).await.unwrap();
    let second = build().execute(input()).await;
    assert!(
        matches!(second, Err(OtpServiceError::NoActivePasscode)),
        "expected NoActivePasscode, got {second:?}"
    );
}
