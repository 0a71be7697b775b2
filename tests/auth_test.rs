//! Auth manager and quota integration tests

use chrono::NaiveDate;
use ollama_chat_gateway::auth::{AuthManager, QuotaDecision, QuotaKind};
use ollama_chat_gateway::config::Settings;
use ollama_chat_gateway::{AppError, AuthError};

fn settings(users: &str) -> Settings {
    let mut settings = Settings::default();
    settings.auth.users = users.to_string();
    settings
}

#[test]
fn credential_table_scenarios() {
    let auth = AuthManager::new(&settings("joe:1234"));

    assert!(auth.authenticate("joe", "1234").is_ok());
    assert_eq!(auth.authenticate("joe", "wrong"), Err(AuthError::BadPassword));
    assert_eq!(auth.authenticate("nobody", "x"), Err(AuthError::UnknownUser));
}

#[test]
fn login_creates_one_session_per_call() {
    let auth = AuthManager::new(&settings("joe:1234"));

    let token_a = auth.login("joe", "1234", "agent-a").unwrap();
    let token_b = auth.login("joe", "1234", "agent-b").unwrap();
    assert_ne!(token_a, token_b);
    assert_eq!(auth.session_count(), 2);

    let session_a = auth.verify_token(&token_a).unwrap();
    let session_b = auth.verify_token(&token_b).unwrap();
    assert_ne!(session_a.session_id, session_b.session_id);
    assert_eq!(session_a.device, "agent-a");
    assert_eq!(session_b.device, "agent-b");
}

#[test]
fn chat_quota_allows_limit_then_rejects() {
    let mut settings = settings("joe:1234");
    settings.auth.daily_request_limit = 3;
    let auth = AuthManager::new(&settings);

    for _ in 0..3 {
        assert!(auth.check_quota(QuotaKind::ChatRequest).is_ok());
    }

    let err = auth.check_quota(QuotaKind::ChatRequest).unwrap_err();
    assert!(matches!(err, AppError::QuotaExceeded(_)));
}

#[test]
fn auth_quota_is_separate_from_chat_quota() {
    let mut settings = settings("joe:1234");
    settings.auth.daily_auth_limit = 1;
    settings.auth.daily_request_limit = 1;
    let auth = AuthManager::new(&settings);

    assert!(auth.check_quota(QuotaKind::AuthAttempt).is_ok());
    assert!(auth.check_quota(QuotaKind::AuthAttempt).is_err());

    assert!(auth.check_quota(QuotaKind::ChatRequest).is_ok());
}

#[test]
fn quota_window_resets_at_date_rollover() {
    let mut settings = settings("joe:1234");
    settings.auth.daily_request_limit = 2;
    let auth = AuthManager::new(&settings);

    let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
    let tuesday = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();

    let quotas = auth.quotas();
    assert_eq!(quotas.check_on(QuotaKind::ChatRequest, monday), QuotaDecision::Allowed);
    assert_eq!(quotas.check_on(QuotaKind::ChatRequest, monday), QuotaDecision::Allowed);
    assert_eq!(quotas.check_on(QuotaKind::ChatRequest, monday), QuotaDecision::Exceeded);

    assert_eq!(quotas.check_on(QuotaKind::ChatRequest, tuesday), QuotaDecision::Allowed);
}
