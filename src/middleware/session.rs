// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session gate middleware.

use crate::models::SessionUser;
use crate::services::session::{decode_session_token, SESSION_COOKIE};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Where unauthenticated page requests are sent.
pub const LOGIN_PATH: &str = "/login";

/// Signed-in user attached to the request by [`require_session`].
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user: SessionUser,
}

impl SessionContext {
    /// Key for per-session in-memory state.
    pub fn key(&self) -> &str {
        &self.user.email
    }
}

/// Require a valid session cookie (or bearer token).
///
/// JSON API requests without a session get 401; browser page requests are
/// redirected to the login page.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        Some(cookie.value().to_string())
    } else {
        request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string)
    };

    let user = token.and_then(|t| {
        decode_session_token(&t, &state.config.session_signing_key)
            .map_err(|e| tracing::debug!(error = %e, "Rejected session token"))
            .ok()
    });

    match user {
        Some(user) => {
            request.extensions_mut().insert(SessionContext { user });
            next.run(request).await
        }
        None if request.uri().path().starts_with("/api/") => {
            StatusCode::UNAUTHORIZED.into_response()
        }
        None => Redirect::to(LOGIN_PATH).into_response(),
    }
}
