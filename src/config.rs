// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honored for local development.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Path of the route the authority login hands the browser off to.
pub const AUTHORITY_HOME: &str = "/authority/pickups";

/// Delay before the browser follows a successful authority login.
pub const AUTHORITY_REDIRECT_DELAY_MS: u64 = 1500;

/// What the wallet page shows when a backend fetch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Substitute the built-in demo data set.
    Demo,
    /// Show an explicit "unavailable" section.
    Unavailable,
}

impl FromStr for FallbackPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "demo" => Ok(Self::Demo),
            "unavailable" => Ok(Self::Unavailable),
            _ => Err(ConfigError::Invalid("WALLET_FALLBACK", s.to_string())),
        }
    }
}

/// When the local wallet copy is debited after a redemption request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeemPolicy {
    /// Only after the backend confirms the redemption.
    Strict,
    /// Regardless of the backend outcome (demo continuity).
    Optimistic,
}

impl FromStr for RedeemPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "optimistic" => Ok(Self::Optimistic),
            _ => Err(ConfigError::Invalid("REDEEM_POLICY", s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the waste backend (validation, reports, wallet, auth)
    pub backend_url: String,
    /// Frontend URL for CORS and cookie attributes
    pub frontend_url: String,
    /// Base URL of the reverse geocoding service
    pub geocoder_url: String,
    /// Server port
    pub port: u16,
    /// Timeout applied to every outbound request
    pub backend_timeout: Duration,
    /// Wallet owner used by the rewards page until wallets are tied to sessions
    pub demo_user_id: String,
    pub wallet_fallback: FallbackPolicy,
    pub redeem_policy: RedeemPolicy,
    /// GeoJSON file with known waste dump sites
    pub dumps_path: String,

    // --- Secrets ---
    /// Key shared with the backend for session tokens (raw bytes)
    pub session_signing_key: Vec<u8>,
    /// HMAC key for the OAuth `state` parameter
    pub oauth_state_key: Vec<u8>,
}

impl Config {
    /// Config for tests; nothing here points at a real service.
    pub fn test_default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:9".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            geocoder_url: "http://127.0.0.1:9".to_string(),
            port: 8080,
            backend_timeout: Duration::from_secs(5),
            demo_user_id: "user_123".to_string(),
            wallet_fallback: FallbackPolicy::Demo,
            redeem_policy: RedeemPolicy::Strict,
            dumps_path: "data/waste_dumps.geojson".to_string(),
            session_signing_key: b"test_session_key_32_bytes_long!!".to_vec(),
            oauth_state_key: b"test_oauth_state_key".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            backend_url: env::var("BACKEND_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            geocoder_url: env::var("GEOCODER_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            backend_timeout: Duration::from_secs(
                env::var("BACKEND_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
            demo_user_id: env::var("DEMO_USER_ID").unwrap_or_else(|_| "user_123".to_string()),
            wallet_fallback: env::var("WALLET_FALLBACK")
                .map(|v| v.parse())
                .unwrap_or(Ok(FallbackPolicy::Demo))?,
            redeem_policy: env::var("REDEEM_POLICY")
                .map(|v| v.parse())
                .unwrap_or(Ok(RedeemPolicy::Strict))?,
            dumps_path: env::var("DUMPS_PATH")
                .unwrap_or_else(|_| "data/waste_dumps.geojson".to_string()),

            session_signing_key: env::var("SESSION_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("SESSION_SIGNING_KEY"))?
                .into_bytes(),
            oauth_state_key: env::var("OAUTH_STATE_KEY")
                .map_err(|_| ConfigError::Missing("OAUTH_STATE_KEY"))?
                .into_bytes(),
        })
    }

    /// Whether cookies must carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.frontend_url.starts_with("https://")
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
