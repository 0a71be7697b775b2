//! HTTP request handlers

use axum::extract::State;
use axum::http::header::{SET_COOKIE, USER_AGENT};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::models::{
    ChatApiRequest, ChatApiResponse, ConnectionResponse, ConnectionStatsResponse, LoginForm,
};
use crate::api::pages;
use crate::auth::QuotaKind;
use crate::error::AppError;
use crate::middleware::{require_session, GateMode};
use crate::AppState;

/// Chat page, behind the session gate
pub async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    match require_session(&state.auth, &headers, GateMode::Page) {
        Ok(_) => Html(pages::INDEX_HTML).into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

/// Login form
pub async fn login_page() -> Html<String> {
    Html(pages::render_login(None))
}

/// Credential submission. On success sets the `auth` cookie and redirects
/// to the chat page; on failure re-renders the form with an error banner.
pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    if state.auth.check_quota(QuotaKind::AuthAttempt).is_err() {
        warn!(user = %form.username, "Login rejected: daily auth quota exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Html(pages::render_login(Some(
                "Daily login limit reached, try again tomorrow",
            ))),
        )
            .into_response();
    }

    let device = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    match state.auth.login(&form.username, &form.password, device) {
        Ok(token) => {
            info!(user = %form.username, "Login succeeded");

            let cookie = format!("auth={}; HttpOnly; SameSite=Lax; Path=/", token);
            let mut response = Redirect::to("/").into_response();
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    response.headers_mut().insert(SET_COOKIE, value);
                    response
                }
                Err(_) => {
                    AppError::Internal("failed to encode session cookie".to_string())
                        .into_response()
                }
            }
        }
        Err(e) => {
            info!(user = %form.username, error = %e, "Login failed");
            Html(pages::render_login(Some("Invalid username or password"))).into_response()
        }
    }
}

/// Backend reachability probe. Mirrors the upstream status code so clients
/// can tell a healthy backend from an unreachable one.
pub async fn api_connection(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Err(rejection) = require_session(&state.auth, &headers, GateMode::Api) {
        return rejection.into_response();
    }

    // The response names the backend endpoint being probed, not our own
    // bind address.
    let (host, port) = {
        let settings = state.settings.read().await;
        backend_endpoint(&settings.backend.base_url)
    };

    let (status_code, status) = match state.adapter.probe().await {
        Ok(code) => {
            let status_code =
                StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let label = if status_code.is_success() { "OK" } else { "ERROR" };
            (status_code, label)
        }
        Err(e) => {
            warn!(error = %e, "Backend reachability probe failed");
            (StatusCode::NOT_FOUND, "ERROR")
        }
    };

    (
        status_code,
        Json(ConnectionResponse {
            host,
            port,
            status: status.to_string(),
        }),
    )
        .into_response()
}

/// Host and port of the inference backend, taken from its base URL
fn backend_endpoint(base_url: &str) -> (String, u16) {
    match reqwest::Url::parse(base_url) {
        Ok(url) => {
            let host = url.host_str().unwrap_or("localhost").to_string();
            let port = url.port_or_known_default().unwrap_or(80);
            (host, port)
        }
        Err(_) => ("localhost".to_string(), 11434),
    }
}

/// Available and active model listings; 404 when the backend reports none
pub async fn api_connection_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    if let Err(rejection) = require_session(&state.auth, &headers, GateMode::Api) {
        return rejection.into_response();
    }

    let available = state.adapter.list_models().await;
    let active = state.adapter.list_active_models().await;

    if available.is_empty() && active.is_empty() {
        return AppError::NotFound("no models found".to_string()).into_response();
    }

    Json(ConnectionStatsResponse { available, active }).into_response()
}

/// Chat endpoint: validate, quota-check, then hand the task to the gateway
pub async fn api_chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ChatApiRequest>,
) -> Response {
    let session = match require_session(&state.auth, &headers, GateMode::Api) {
        Ok(session) => session,
        Err(rejection) => return rejection.into_response(),
    };

    if let Err(e) = state.auth.check_quota(QuotaKind::ChatRequest) {
        return e.into_response();
    }

    let (prompt, model) = match (request.prompt.as_deref(), request.model.as_deref()) {
        (Some(prompt), Some(model)) if !prompt.trim().is_empty() && !model.trim().is_empty() => {
            (prompt, model)
        }
        _ => {
            return AppError::InvalidRequest(
                "body must carry non-empty 'prompt' and 'model' fields".to_string(),
            )
            .into_response();
        }
    };

    info!(
        user = %session.user,
        model = %model,
        request_number = session.request_number,
        "Received chat request"
    );

    match state.gateway.submit(prompt, model).await {
        Ok(response) => Json(ChatApiResponse { response }).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Fallback for unknown paths
pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(pages::NOT_FOUND_HTML)).into_response()
}
