// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login routes: Google OAuth via the backend, authority accounts, logout.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use validator::{Validate, ValidationErrors};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::config::{AUTHORITY_HOME, AUTHORITY_REDIRECT_DELAY_MS};
use crate::error::{AppError, Result};
use crate::models::{AdminCredential, AdminRegistration};
use crate::services::session::{
    create_session_token, decode_session_token, is_local_path, removal_cookie, session_cookie,
    sign_state, verify_state,
};
use crate::AppState;

pub const LOGIN_SUCCESS: &str = "Login successful!";
pub const PASSWORD_MISMATCH: &str = "Passwords do not match";
pub const REGISTRATION_SUCCESS: &str = "Registration successful! Please log in.";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/google/login", get(google_login))
        .route("/auth/google/callback", get(google_callback))
        .route("/auth/authority/login", post(authority_login))
        .route("/auth/authority/register", post(authority_register))
        .route("/auth/logout", post(logout))
        .route("/api/login", get(login_page))
}

// ─── Google OAuth ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct GoogleLoginParams {
    /// Page to return to after login
    #[serde(default)]
    return_to: Option<String>,
}

/// Start Google login - redirect to the backend's OAuth entry point.
async fn google_login(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GoogleLoginParams>,
) -> Result<Redirect> {
    let return_to = params
        .return_to
        .filter(|p| is_local_path(p))
        .unwrap_or_else(|| "/".to_string());

    let oauth_state = sign_state(&return_to, &state.config.oauth_state_key)?;

    tracing::info!(return_to = %return_to, "Starting Google login via backend");
    Ok(Redirect::temporary(
        &state.backend.google_login_url(&oauth_state),
    ))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - verify the backend's token and start a session.
async fn google_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> (CookieJar, Redirect) {
    let frontend = state.config.frontend_url.trim_end_matches('/');
    let fail = |reason: &str| {
        Redirect::temporary(&format!(
            "{}/login?error={}",
            frontend,
            urlencoding::encode(reason)
        ))
    };

    let return_to = params
        .state
        .as_deref()
        .and_then(|s| verify_state(s, &state.config.oauth_state_key));

    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from identity provider");
        return (jar, fail(&error));
    }

    let Some(return_to) = return_to else {
        tracing::warn!("Invalid or missing OAuth state on callback");
        return (jar, fail("invalid_state"));
    };

    let Some(token) = params.token else {
        return (jar, fail("missing_token"));
    };

    let user = match decode_session_token(&token, &state.config.session_signing_key) {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "Backend session token rejected");
            return (jar, fail("invalid_token"));
        }
    };

    let session_token = match create_session_token(&user, &state.config.session_signing_key) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "Session token creation failed");
            return (jar, fail("session_error"));
        }
    };

    tracing::info!(email = %user.email, "Google login successful");

    let jar = jar.add(session_cookie(session_token, state.config.secure_cookies()));
    let redirect = format!(
        "{}/login?success=1&next={}",
        frontend,
        urlencoding::encode(&return_to)
    );
    (jar, Redirect::temporary(&redirect))
}

// ─── Login page ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginPageParams {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    success: Option<String>,
}

/// Login page view model.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginPageResponse {
    pub message: Option<String>,
    pub error: Option<String>,
    pub google_login_url: String,
}

async fn login_page(Query(params): Query<LoginPageParams>) -> Json<LoginPageResponse> {
    Json(LoginPageResponse {
        message: params.success.map(|_| LOGIN_SUCCESS.to_string()),
        error: params.error.filter(|e| !e.is_empty()),
        google_login_url: "/auth/google/login".to_string(),
    })
}

// ─── Authority accounts ──────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthorityLoginResponse {
    pub message: String,
    pub redirect_to: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub redirect_after_ms: u64,
}

/// Forward authority credentials; relay the backend's cookies unchanged.
async fn authority_login(
    State(state): State<Arc<AppState>>,
    Json(credential): Json<AdminCredential>,
) -> Result<Response> {
    if credential.username.trim().is_empty() || credential.password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    let login = state.backend.authority_login(&credential).await?;

    let message = login
        .body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or(LOGIN_SUCCESS)
        .to_string();

    let mut headers = HeaderMap::new();
    for cookie in login.set_cookies {
        headers.append(header::SET_COOKIE, cookie);
    }

    Ok((
        headers,
        Json(AuthorityLoginResponse {
            message,
            redirect_to: AUTHORITY_HOME.to_string(),
            redirect_after_ms: AUTHORITY_REDIRECT_DELAY_MS,
        }),
    )
        .into_response())
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: String,
}

/// Register an authority account. Local checks run before any network call.
async fn authority_register(
    State(state): State<Arc<AppState>>,
    Json(form): Json<AdminRegistration>,
) -> Result<Json<RegisterResponse>> {
    if !form.passwords_match() {
        return Err(AppError::Validation(PASSWORD_MISMATCH.to_string()));
    }
    form.validate()
        .map_err(|e| AppError::Validation(first_message(&e)))?;

    state
        .backend
        .authority_register(&form.to_backend_request())
        .await?;

    tracing::info!(username = %form.username, "Authority account registered");
    Ok(Json(RegisterResponse {
        message: REGISTRATION_SUCCESS.to_string(),
    }))
}

/// First human-readable message; fields are visited alphabetically.
fn first_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .into_iter()
        .flat_map(|(_, errs)| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string())
}

// ─── Logout ──────────────────────────────────────────────────

/// Clear the session cookie and go back to the login page.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar.add(removal_cookie(state.config.secure_cookies()));
    let login = format!("{}/login", state.config.frontend_url.trim_end_matches('/'));
    (jar, Redirect::to(&login))
}
