//! Session gate shared by browser and API routes
//!
//! Both route families run the same token check; they differ only in how a
//! failure is presented. Browser routes bounce to the login page, API
//! routes get a structured 401 JSON body.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};

use crate::auth::{AuthManager, SessionData};
use crate::error::{AppError, AuthError};

pub const AUTH_COOKIE: &str = "auth";

/// How an authentication failure is presented to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateMode {
    /// Browser-facing route: redirect to the login page
    Page,
    /// API route: structured JSON error
    Api,
}

/// A rejected session check, rendered according to the gate mode
#[derive(Debug)]
pub struct SessionRejection {
    mode: GateMode,
    error: AuthError,
}

impl SessionRejection {
    pub fn error(&self) -> &AuthError {
        &self.error
    }
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        match self.mode {
            GateMode::Page => Redirect::to("/login").into_response(),
            GateMode::Api => AppError::Auth(self.error).into_response(),
        }
    }
}

/// Pull the `auth` cookie value out of the request headers
fn auth_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == AUTH_COOKIE)
        .map(|(_, value)| value)
}

/// Verify the request's session token, counting the call against its
/// session. Returns the session snapshot, or a mode-appropriate rejection.
pub fn require_session(
    auth: &AuthManager,
    headers: &HeaderMap,
    mode: GateMode,
) -> Result<SessionData, SessionRejection> {
    let token = auth_cookie(headers).ok_or(SessionRejection {
        mode,
        error: AuthError::InvalidToken,
    })?;

    auth.verify_token(token)
        .map_err(|error| SessionRejection { mode, error })
}
