// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client for the external waste backend.
//!
//! Handles:
//! - Authority login/registration (credential cookie relayed, never stored)
//! - Report validation and lookup
//! - Cleanup verification uploads
//! - Wallet, benefit catalog and redemption calls
//!
//! Nothing here retries; a failed call is reported once and the page
//! decides what to show.

use crate::capture::ImageAttachment;
use crate::error::AppError;
use crate::models::report::ReportId;
use crate::models::user::{AdminCredential, RegisterRequest};
use crate::models::wallet::RedeemRequest;
use crate::models::{Benefit, ValidationResult, WalletAccount, WasteReport};
use anyhow::Context;
use axum::http::HeaderValue;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Multipart payload for `POST /api/waste/validate`.
#[derive(Debug, Clone)]
pub struct ReportSubmission {
    pub image: ImageAttachment,
    /// `"lat,lng"`
    pub location: String,
    pub description: String,
    /// RFC3339 capture time
    pub timestamp: String,
}

/// Outcome of a successful authority login.
#[derive(Debug)]
pub struct AuthorityLogin {
    /// `Set-Cookie` headers from the backend, to be relayed unchanged.
    pub set_cookies: Vec<HeaderValue>,
    pub body: Value,
}

/// Error body returned by the backend auth endpoints.
#[derive(Debug, Deserialize)]
struct DetailBody {
    detail: Value,
}

/// Waste backend API client.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed building backend HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Browser-facing URL that starts the Google OAuth flow on the backend.
    pub fn google_login_url(&self, state: &str) -> String {
        format!(
            "{}/auth/google/login?state={}",
            self.base_url,
            urlencoding::encode(state)
        )
    }

    // ─── Authority Auth ──────────────────────────────────────────

    /// Log an authority user in. The backend sets its own credential cookie.
    pub async fn authority_login(
        &self,
        credential: &AdminCredential,
    ) -> Result<AuthorityLogin, AppError> {
        let url = format!("{}/auth/authority/login", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(credential)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Login request failed: {}", e)))?;

        let response = self.check_auth_response(response).await?;

        let set_cookies = response
            .headers()
            .get_all(reqwest::header::SET_COOKIE)
            .iter()
            .cloned()
            .collect();

        let body = response.json().await.unwrap_or(Value::Null);

        tracing::info!(username = %credential.username, "Authority login accepted by backend");
        Ok(AuthorityLogin { set_cookies, body })
    }

    /// Register a new authority account.
    pub async fn authority_register(&self, request: &RegisterRequest<'_>) -> Result<Value, AppError> {
        let url = format!("{}/auth/authority/register", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Registration request failed: {}", e)))?;

        let response = self.check_auth_response(response).await?;
        Ok(response.json().await.unwrap_or(Value::Null))
    }

    // ─── Reports ─────────────────────────────────────────────────

    /// Submit a report image for validation.
    pub async fn validate_report(
        &self,
        submission: &ReportSubmission,
    ) -> Result<ValidationResult, AppError> {
        let url = format!("{}/api/waste/validate", self.base_url);

        let form = Form::new()
            .part("image", image_part(&submission.image)?)
            .text("location", submission.location.clone())
            .text("description", submission.description.clone())
            .text("timestamp", submission.timestamp.clone());

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Fetch a stored report by identifier.
    pub async fn get_report(&self, id: &ReportId) -> Result<WasteReport, AppError> {
        let url = format!("{}/api/waste/reports/{}", self.base_url, id);
        self.get_json(&url).await
    }

    /// Upload an after-cleanup image. The body is returned raw so the
    /// caller can decide how strictly to read it.
    pub async fn verify_cleanup(
        &self,
        id: &ReportId,
        after_image: &ImageAttachment,
    ) -> Result<Value, AppError> {
        let url = format!("{}/api/waste/reports/{}/verify-cleanup", self.base_url, id);

        let form = Form::new().part("after_image", image_part(after_image)?);

        tracing::debug!(
            report_id = %id,
            size = after_image.bytes.len(),
            content_type = %after_image.content_type,
            "Sending verification request"
        );

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Verification request rejected");
            return Err(AppError::Backend(format!(
                "Verification failed with status: {}. {}",
                status.as_u16(),
                body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::MalformedResponse(format!("JSON parse error: {}", e)))
    }

    // ─── Wallet ──────────────────────────────────────────────────

    /// Fetch the benefit catalog.
    pub async fn list_benefits(&self) -> Result<Vec<Benefit>, AppError> {
        let url = format!("{}/api/digital-wallet/benefits", self.base_url);
        self.get_json(&url).await
    }

    /// Fetch a user's wallet.
    pub async fn get_wallet(&self, user_id: &str) -> Result<WalletAccount, AppError> {
        let url = format!(
            "{}/api/digital-wallet/{}",
            self.base_url,
            urlencoding::encode(user_id)
        );
        self.get_json(&url).await
    }

    /// Redeem a benefit. Only the status code is meaningful.
    pub async fn redeem(&self, user_id: &str, benefit_id: &str) -> Result<(), AppError> {
        let url = format!("{}/api/digital-wallet/redeem", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(&RedeemRequest {
                user_id,
                benefit_id,
            })
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Redeem request failed: {}", e)))?;

        self.check_response(response).await
    }

    // ─── Helpers ─────────────────────────────────────────────────

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response status and return error if not successful.
    async fn check_response(&self, response: reqwest::Response) -> Result<(), AppError> {
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(body));
        }

        Err(AppError::Backend(format!("HTTP {}: {}", status, body)))
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status == StatusCode::NOT_FOUND {
                return Err(AppError::NotFound(body));
            }

            return Err(AppError::Backend(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::MalformedResponse(format!("JSON parse error: {}", e)))
    }

    /// Auth endpoints report failures as `{detail}`; surface that text.
    async fn check_auth_response(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<DetailBody>(&body)
            .ok()
            .map(|d| match d.detail {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

        tracing::warn!(status = %status, detail = %detail, "Backend rejected auth request");

        if status.is_client_error() {
            Err(AppError::Rejected {
                status: status.as_u16(),
                detail,
            })
        } else {
            Err(AppError::Backend(detail))
        }
    }
}

fn image_part(image: &ImageAttachment) -> Result<Part, AppError> {
    Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(&image.content_type)
        .map_err(|e| AppError::BadRequest(format!("Invalid image type: {}", e)))
}
