// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Report page routes: location lookup and report submission.

use crate::capture::{AttachmentSummary, ImageAttachment, NoCamera};
use crate::error::{AppError, Result};
use crate::flows::report::{LocationState, ReportFlow, ReportPhase, MISSING_INPUT};
use crate::middleware::SessionContext;
use crate::models::report::Tone;
use crate::models::{Location, ValidationResult};
use crate::services::geocoding::{check_coordinates, PositionError};
use crate::services::handoff::{handoff_cookie, HANDOFF_COOKIE};
use crate::AppState;
use axum::{
    extract::{Multipart, State},
    routing::post,
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/reports", post(submit_report))
}

/// Public; the deposit map uses the same lookup before login.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/location/resolve", post(resolve_location))
}

// ─── Location ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResolveLocationRequest {
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    /// Set when the browser could not produce a position
    #[serde(default)]
    position_error: Option<PositionError>,
}

#[derive(Serialize)]
pub struct ResolveLocationResponse {
    pub location: LocationState,
}

/// Resolve browser coordinates into a named location.
async fn resolve_location(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResolveLocationRequest>,
) -> Result<Json<ResolveLocationResponse>> {
    let location = match (req.position_error, req.latitude, req.longitude) {
        (Some(reason), _, _) => LocationState::Failed(reason.message().to_string()),
        (None, Some(latitude), Some(longitude)) => {
            check_coordinates(latitude, longitude)?;
            match state.geocoder.resolve(latitude, longitude).await {
                Ok(location) => LocationState::Resolved(location),
                Err(e) => LocationState::Failed(e.to_string()),
            }
        }
        _ => {
            return Err(AppError::BadRequest(
                "latitude and longitude are required".to_string(),
            ))
        }
    };

    Ok(Json(ResolveLocationResponse { location }))
}

// ─── Submission ──────────────────────────────────────────────

/// Fields of the report form.
#[derive(Default)]
struct ReportForm {
    image: Option<ImageAttachment>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    place_name: Option<String>,
    description: String,
    timestamp: Option<String>,
}

impl ReportForm {
    async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = ReportForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid form data: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => form.image = Some(super::read_image(field).await?),
                "latitude" => form.latitude = Some(super::read_number(field, "latitude").await?),
                "longitude" => form.longitude = Some(super::read_number(field, "longitude").await?),
                "place_name" => form.place_name = super::read_text(field).await?,
                "description" => form.description = super::read_text(field).await?.unwrap_or_default(),
                "timestamp" => form.timestamp = super::read_text(field).await?,
                other => tracing::debug!(field = %other, "Ignoring unknown report form field"),
            }
        }

        Ok(form)
    }
}

#[derive(Serialize)]
pub struct ReportResponse {
    pub result: ValidationResult,
    pub severity_tone: Tone,
    pub location: Location,
    pub image: AttachmentSummary,
    /// Set when the verification page can be opened without a query parameter
    pub verify_report_id: Option<String>,
}

/// Submit a report for validation.
async fn submit_report(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<(CookieJar, Json<ReportResponse>)> {
    let form = ReportForm::read(multipart).await?;

    let (Some(image), Some(latitude), Some(longitude)) = (form.image, form.latitude, form.longitude)
    else {
        return Err(AppError::Validation(MISSING_INPUT.to_string()));
    };
    check_coordinates(latitude, longitude)?;

    let location = match form.place_name.filter(|p| !p.trim().is_empty()) {
        Some(place_name) => Location {
            latitude,
            longitude,
            place_name,
        },
        None => state.geocoder.resolve(latitude, longitude).await?,
    };

    let mut flow = ReportFlow::new(NoCamera);
    let image = flow.select_image(image).summary();
    flow.resolve_location(Ok(location.clone()));
    flow.set_description(form.description);
    flow.set_captured_at(form.timestamp);

    tracing::info!(
        email = %session.user.email,
        place = %location.place_name,
        size = image.size,
        "Submitting waste report"
    );

    let result = match flow.submit(&state.backend).await? {
        ReportPhase::Succeeded(result) => result.clone(),
        ReportPhase::Failed(message) => return Err(AppError::Backend(message.clone())),
        other => {
            return Err(AppError::Internal(anyhow::anyhow!(
                "report flow ended in {:?}",
                other
            )))
        }
    };

    let mut jar = jar;
    let verify_report_id = match result.report_id.as_deref() {
        Some(report_id) => {
            let key = match jar.get(HANDOFF_COOKIE) {
                Some(cookie) => cookie.value().to_string(),
                None => {
                    let key = state.handoff.new_key()?;
                    jar = jar.add(handoff_cookie(key.clone(), state.config.secure_cookies()));
                    key
                }
            };
            state.handoff.put(&key, report_id);
            Some(report_id.to_string())
        }
        None => None,
    };

    Ok((
        jar,
        Json(ReportResponse {
            severity_tone: result.severity.tone(),
            result,
            location,
            image,
            verify_report_id,
        }),
    ))
}
