// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cleanup verification page routes.

use crate::error::{AppError, Result};
use crate::flows::verify::{self, VerificationView, VerifyPage};
use crate::models::ReportId;
use crate::services::handoff::HANDOFF_COOKIE;
use crate::AppState;
use axum::{
    extract::{Multipart, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/verify-cleanup", get(get_page))
        .route("/api/verify-cleanup/reset", post(reset))
        .route("/api/verify-cleanup/{report_id}", post(submit))
}

#[derive(Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "reportId", default)]
    report_id: Option<String>,
}

/// Page data for the report being verified.
async fn get_page(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<VerifyQuery>,
) -> Json<VerifyPage> {
    let handoff = jar
        .get(HANDOFF_COOKIE)
        .and_then(|cookie| state.handoff.get(cookie.value()));

    let raw_id = verify::resolve_report_id(query.report_id.as_deref(), handoff);
    Json(verify::load_page(&state.backend, raw_id).await)
}

/// Upload the after-cleanup image.
async fn submit(
    State(state): State<Arc<AppState>>,
    Path(report_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<VerificationView>> {
    // A malformed id is refused before the upload is read
    ReportId::parse(&report_id).map_err(|e| AppError::Validation(e.to_string()))?;

    let mut after_image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid form data: {}", e)))?
    {
        if field.name() == Some("after_image") {
            after_image = Some(super::read_image(field).await?);
        }
    }

    let view = verify::submit(&state.backend, &report_id, after_image).await?;

    tracing::info!(
        report_id = %view.report_id,
        band = ?view.band,
        "Cleanup verification complete"
    );
    Ok(Json(view))
}

/// Cleared result card.
#[derive(Serialize)]
pub struct ResetResponse {
    pub result: Option<VerificationView>,
    pub error: Option<String>,
}

/// Clear the previous verification result so another image can be tried.
async fn reset() -> Json<ResetResponse> {
    Json(ResetResponse {
        result: None,
        error: None,
    })
}
