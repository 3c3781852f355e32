// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Session and authority credential models.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Signed-in end user, carried in the session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Email address (also the session subject)
    pub email: String,
    /// Display name from the identity provider
    #[serde(alias = "name")]
    pub display_name: String,
    /// Profile picture URL
    #[serde(alias = "picture", default)]
    pub avatar_url: Option<String>,
}

/// Authority login credentials. Never persisted or logged.
#[derive(Clone, Deserialize, Serialize)]
pub struct AdminCredential {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Authority registration form as submitted by the login page.
#[derive(Clone, Deserialize, Validate)]
pub struct AdminRegistration {
    #[validate(length(min = 1, max = 64, message = "Username is required"))]
    pub username: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub confirm_password: String,
}

impl AdminRegistration {
    /// Check the confirmation field. Runs before anything else.
    pub fn passwords_match(&self) -> bool {
        self.password == self.confirm_password
    }

    /// Body sent to the backend register endpoint.
    pub fn to_backend_request(&self) -> RegisterRequest<'_> {
        RegisterRequest {
            username: &self.username,
            email: &self.email,
            role: "authority",
            password: &self.password,
        }
    }
}

/// Wire body for `POST /auth/authority/register`.
#[derive(Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub role: &'static str,
    pub password: &'a str,
}
