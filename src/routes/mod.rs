// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod auth;
pub mod deposits;
pub mod profile;
pub mod report;
pub mod verify;
pub mod wallet;

use crate::capture::{ImageAttachment, MAX_IMAGE_BYTES};
use crate::error::{AppError, Result};
use crate::middleware::session::require_session;
use crate::AppState;
use axum::extract::multipart::Field;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Request body limit for routes that accept an image upload.
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 64 * 1024;

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    Json(HealthResponse {
        status: "ok".to_string(),
        build_id,
    })
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS layer - allow requests from frontend URL and localhost (for dev)
    let frontend_url = state.config.frontend_url.clone();
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &axum::http::HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str == frontend_url
                    || origin_str.starts_with("http://localhost")
                    || origin_str.starts_with("http://127.0.0.1")
            },
        ))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    // Public routes (no session required)
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .merge(auth::routes())
        .merge(report::public_routes())
        .merge(deposits::routes());

    // Session-gated routes
    let protected_routes = Router::new()
        .merge(profile::routes())
        .merge(report::routes())
        .merge(verify::routes())
        .merge(wallet::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

// ─── Multipart helpers ───────────────────────────────────────

/// Read an uploaded image, enforcing type and size.
pub(crate) async fn read_image(field: Field<'_>) -> Result<ImageAttachment> {
    let file_name = field.file_name().map(str::to_string);
    let content_type = field.content_type().map(str::to_string);
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read image: {}", e)))?;

    ImageAttachment::from_upload(file_name.as_deref(), content_type.as_deref(), bytes.to_vec())
        .map_err(|e| AppError::Validation(e.to_string()))
}

/// Read a text field; blank values count as absent.
pub(crate) async fn read_text(field: Field<'_>) -> Result<Option<String>> {
    let text = field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid form field: {}", e)))?;
    let text = text.trim();
    Ok((!text.is_empty()).then(|| text.to_string()))
}

/// Read a numeric field.
pub(crate) async fn read_number(field: Field<'_>, name: &str) -> Result<f64> {
    read_text(field)
        .await?
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| AppError::BadRequest(format!("Invalid {}", name)))
}
