//! Session authentication manager
//!
//! Gates the API surface: verifies credentials against the configured
//! table, mints device-bound session tokens and enforces the daily usage
//! ceilings. Sessions live in memory only; a restart invalidates every
//! outstanding token (the signing secret is regenerated too).

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use subtle::ConstantTimeEq;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::quota::{QuotaDecision, QuotaKind, QuotaLedger};
use crate::auth::token::{TokenClaims, TokenSigner};
use crate::config::Settings;
use crate::error::{AppError, AuthError, Result};

/// An authenticated user's device-bound context
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub user: String,
    pub device_fingerprint: String,
    pub issued_at: DateTime<Utc>,
    pub request_count: u64,
}

/// Snapshot of a verified session returned to request handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub user: String,
    pub device: String,
    pub session_id: Uuid,
    pub request_number: u64,
}

fn digest(text: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.finalize().into()
}

/// Validates credentials, issues and verifies tokens, tracks quotas
pub struct AuthManager {
    /// username -> SHA-256 digest of the configured secret
    users: HashMap<String, [u8; 32]>,
    sessions: DashMap<Uuid, Session>,
    signer: TokenSigner,
    quotas: QuotaLedger,
}

impl AuthManager {
    pub fn new(settings: &Settings) -> Self {
        let users = settings
            .parsed_users()
            .into_iter()
            .map(|(user, pass)| (user, digest(&pass)))
            .collect::<HashMap<_, _>>();

        info!(users = users.len(), "Auth manager initialized");

        Self {
            users,
            sessions: DashMap::new(),
            signer: TokenSigner::new(),
            quotas: QuotaLedger::new(
                settings.auth.daily_auth_limit,
                settings.auth.daily_request_limit,
            ),
        }
    }

    /// Check a credential pair against the configured table.
    /// Digest comparison is constant-time.
    pub fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> std::result::Result<(), AuthError> {
        let stored = self.users.get(username).ok_or(AuthError::UnknownUser)?;
        let supplied = digest(password);

        if bool::from(stored.ct_eq(&supplied)) {
            Ok(())
        } else {
            Err(AuthError::BadPassword)
        }
    }

    /// Authenticate and open a new session, returning its bearer token
    pub fn login(
        &self,
        username: &str,
        password: &str,
        device: &str,
    ) -> std::result::Result<String, AuthError> {
        self.authenticate(username, password)?;

        let session = Session {
            id: Uuid::new_v4(),
            user: username.to_string(),
            device_fingerprint: device.to_string(),
            issued_at: Utc::now(),
            request_count: 0,
        };

        let claims = TokenClaims {
            device: session.device_fingerprint.clone(),
            user: session.user.clone(),
            session_id: session.id,
            request_number: session.request_count,
        };
        let token = self.signer.sign(&claims)?;

        debug!(user = %username, session_id = %session.id, "Session opened");
        self.sessions.insert(session.id, session);

        Ok(token)
    }

    /// Verify a bearer token and count the call against its session.
    /// The token must carry a valid signature and reference a live session.
    pub fn verify_token(&self, token: &str) -> std::result::Result<SessionData, AuthError> {
        let claims = self.signer.verify(token)?;

        let mut session = self
            .sessions
            .get_mut(&claims.session_id)
            .ok_or(AuthError::InvalidToken)?;

        session.request_count += 1;

        Ok(SessionData {
            user: session.user.clone(),
            device: session.device_fingerprint.clone(),
            session_id: session.id,
            request_number: session.request_count,
        })
    }

    /// Count a request against its daily ceiling
    pub fn check_quota(&self, kind: QuotaKind) -> Result<()> {
        match self.quotas.check(kind) {
            QuotaDecision::Allowed => Ok(()),
            QuotaDecision::Exceeded => Err(AppError::QuotaExceeded(kind.label())),
        }
    }

    /// Drop a session so its token no longer verifies
    pub fn revoke_session(&self, session_id: Uuid) -> bool {
        self.sessions.remove(&session_id).is_some()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn quotas(&self) -> &QuotaLedger {
        &self.quotas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> AuthManager {
        let mut settings = Settings::default();
        settings.auth.users = "joe:1234,ann:s3cret".to_string();
        AuthManager::new(&settings)
    }

    #[test]
    fn authenticate_known_user() {
        let auth = manager();
        assert!(auth.authenticate("joe", "1234").is_ok());
    }

    #[test]
    fn authenticate_wrong_password() {
        let auth = manager();
        assert_eq!(auth.authenticate("joe", "wrong"), Err(AuthError::BadPassword));
    }

    #[test]
    fn authenticate_unknown_user() {
        let auth = manager();
        assert_eq!(auth.authenticate("nobody", "x"), Err(AuthError::UnknownUser));
    }

    #[test]
    fn login_issues_verifiable_token() {
        let auth = manager();
        let token = auth.login("joe", "1234", "Mozilla/5.0").unwrap();

        let session = auth.verify_token(&token).unwrap();
        assert_eq!(session.user, "joe");
        assert_eq!(session.device, "Mozilla/5.0");
        assert_eq!(session.request_number, 1);

        // Each verified call bumps the per-session counter
        let session = auth.verify_token(&token).unwrap();
        assert_eq!(session.request_number, 2);
    }

    #[test]
    fn revoked_session_no_longer_verifies() {
        let auth = manager();
        let token = auth.login("ann", "s3cret", "curl/8.0").unwrap();
        let session = auth.verify_token(&token).unwrap();

        assert!(auth.revoke_session(session.session_id));
        assert_eq!(auth.verify_token(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn token_from_previous_process_is_rejected() {
        // A fresh manager models a restart: new secret, empty session store
        let old = manager();
        let token = old.login("joe", "1234", "Mozilla/5.0").unwrap();

        let fresh = manager();
        assert_eq!(fresh.verify_token(&token), Err(AuthError::InvalidToken));
    }
}
