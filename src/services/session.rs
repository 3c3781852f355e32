// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session tokens, session cookies and the signed OAuth `state` parameter.

use crate::models::SessionUser;
use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

/// Name of the cookie holding the session token.
pub const SESSION_COOKIE: &str = "waste_session";

/// Session lifetime (7 days).
pub const SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// JWT claims shared with the backend.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Subject (user email)
    pub sub: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

impl SessionClaims {
    pub fn user(&self) -> SessionUser {
        SessionUser {
            email: self.sub.clone(),
            display_name: if self.name.is_empty() {
                self.sub.clone()
            } else {
                self.name.clone()
            },
            avatar_url: self.picture.clone(),
        }
    }
}

/// Issue a session token for a user.
pub fn create_session_token(user: &SessionUser, signing_key: &[u8]) -> anyhow::Result<String> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = SessionClaims {
        sub: user.email.clone(),
        name: user.display_name.clone(),
        picture: user.avatar_url.clone(),
        iat: now,
        exp: now + SESSION_TTL_SECS as usize,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Verify a session token and return its user.
pub fn decode_session_token(
    token: &str,
    signing_key: &[u8],
) -> Result<SessionUser, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<SessionClaims>(token, &key, &validation)?;
    Ok(data.claims.user())
}

/// Cookie carrying a freshly issued session token.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time_max_age(SESSION_TTL_SECS as i64))
        .build()
}

/// Cookie that clears the session; attributes mirror [`session_cookie`].
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time_max_age(0))
        .build()
}

fn time_max_age(secs: i64) -> time::Duration {
    time::Duration::seconds(secs)
}

// ─── OAuth state ─────────────────────────────────────────────

/// Sign the page to return to after Google login.
///
/// Format before encoding: `return_to|timestamp_hex|signature_hex`.
pub fn sign_state(return_to: &str, secret: &[u8]) -> anyhow::Result<String> {
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis();
    let payload = format!("{}|{:x}", return_to, timestamp);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| anyhow::anyhow!("HMAC init failed: {}", e))?;
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    let signed = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Verify a signed state and return the page it carries.
pub fn verify_state(state: &str, secret: &[u8]) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Signature and timestamp are always the last two fields
    let mut parts = state_str.rsplitn(3, '|');
    let signature_hex = parts.next()?;
    let timestamp_hex = parts.next()?;
    let return_to = parts.next()?;

    let signature = hex::decode(signature_hex).ok()?;

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(format!("{}|{}", return_to, timestamp_hex).as_bytes());

    if mac.verify_slice(&signature).is_err() {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    Some(return_to.to_string())
}

/// Only same-site absolute paths are accepted as return targets.
pub fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
}
