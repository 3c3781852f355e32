// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cleanup verification page logic.

use crate::capture::ImageAttachment;
use crate::error::AppError;
use crate::models::report::Tone;
use crate::models::verification::StatusTone;
use crate::models::{ImprovementBand, ReportId, VerificationResult, WasteReport};
use crate::services::backend::BackendClient;
use serde::Serialize;
use serde_json::Value;

pub const NO_REPORT_SELECTED: &str =
    "No report selected. Open this page from a submitted report or add ?reportId= to the URL.";
pub const REPORT_LOAD_FAILED: &str = "Failed to load the original report details";
pub const MISSING_AFTER_IMAGE: &str = "Please upload an after-cleanup image";
pub const INVALID_RESPONSE: &str = "Invalid API response format";

/// Pick the raw identifier: query parameter first, then the handoff.
pub fn resolve_report_id(query: Option<&str>, handoff: Option<String>) -> Option<String> {
    query
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .or(handoff)
}

/// Verification page view model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifyPage {
    pub report_id: Option<String>,
    pub report: Option<WasteReport>,
    pub severity_tone: Option<Tone>,
    pub status_tone: Option<StatusTone>,
    /// Informational text (nothing selected yet)
    pub notice: Option<String>,
    /// Error banner
    pub error: Option<String>,
    /// Submitting is possible only with a valid identifier
    pub can_submit: bool,
}

impl VerifyPage {
    fn empty() -> Self {
        Self {
            report_id: None,
            report: None,
            severity_tone: None,
            status_tone: None,
            notice: None,
            error: None,
            can_submit: false,
        }
    }

    fn with_report(mut self, report: WasteReport) -> Self {
        self.severity_tone = Some(report.severity.tone());
        self.status_tone = Some(StatusTone::of(&report.status));
        self.report = Some(report);
        self
    }
}

/// Build the page for a raw identifier. Only a valid id reaches the network.
pub async fn load_page(backend: &BackendClient, raw_id: Option<String>) -> VerifyPage {
    let Some(raw_id) = raw_id else {
        return VerifyPage {
            notice: Some(NO_REPORT_SELECTED.to_string()),
            ..VerifyPage::empty()
        };
    };

    let id = match ReportId::parse(&raw_id) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(report_id = %raw_id, "Refusing malformed report id");
            return VerifyPage {
                report_id: Some(ReportId::strip_prefix(&raw_id).to_string()),
                error: Some(e.to_string()),
                ..VerifyPage::empty()
            };
        }
    };

    let page = VerifyPage {
        report_id: Some(id.to_string()),
        can_submit: true,
        ..VerifyPage::empty()
    };

    match backend.get_report(&id).await {
        Ok(report) => page.with_report(report),
        Err(e) => {
            tracing::warn!(report_id = %id, error = %e, "Original report unavailable");
            VerifyPage {
                error: Some(REPORT_LOAD_FAILED.to_string()),
                ..page.with_report(WasteReport::placeholder(id.as_str()))
            }
        }
    }
}

/// Verification outcome as shown in the result card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationView {
    pub report_id: String,
    pub result: VerificationResult,
    pub status_label: Option<String>,
    pub status_tone: Option<StatusTone>,
    pub location_label: Option<&'static str>,
    pub cleanliness_label: Option<&'static str>,
    pub band: Option<ImprovementBand>,
    pub assessment: Option<&'static str>,
    /// Expected fields the backend left out
    pub missing_fields: Vec<&'static str>,
}

/// Accept only a JSON object; read the expected fields permissively.
pub fn interpret_response(id: &ReportId, body: &Value) -> Result<VerificationView, AppError> {
    let Some(object) = body.as_object() else {
        tracing::warn!(report_id = %id, body = %body, "Verification response is not an object");
        return Err(AppError::MalformedResponse(INVALID_RESPONSE.to_string()));
    };

    let (result, missing_fields) = VerificationResult::from_object(object);
    for field in &missing_fields {
        tracing::warn!(report_id = %id, field = %field, "Verification response missing field");
    }

    let band = result.band();
    Ok(VerificationView {
        report_id: id.to_string(),
        status_label: result.status_label(),
        status_tone: result.status.as_deref().map(StatusTone::of),
        location_label: result.location_label(),
        cleanliness_label: result.cleanliness_label(),
        band,
        assessment: band.map(ImprovementBand::message),
        missing_fields,
        result,
    })
}

/// Validate inputs locally, then send the after image once.
pub async fn submit(
    backend: &BackendClient,
    raw_id: &str,
    after_image: Option<ImageAttachment>,
) -> Result<VerificationView, AppError> {
    let id = ReportId::parse(raw_id).map_err(|e| AppError::Validation(e.to_string()))?;
    let image = after_image.ok_or_else(|| AppError::Validation(MISSING_AFTER_IMAGE.to_string()))?;

    tracing::info!(report_id = %id, "Starting cleanup verification");
    let body = backend.verify_cleanup(&id, &image).await?;
    interpret_response(&id, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn id() -> ReportId {
        ReportId::parse("65f1a2b3c4d5e6f708192a3b").unwrap()
    }

    #[test]
    fn test_query_wins_over_handoff() {
        assert_eq!(
            resolve_report_id(Some("abc"), Some("def".to_string())).as_deref(),
            Some("abc")
        );
        assert_eq!(
            resolve_report_id(Some("  "), Some("def".to_string())).as_deref(),
            Some("def")
        );
        assert_eq!(resolve_report_id(None, None), None);
    }

    #[test]
    fn test_interpret_full_response() {
        let view = interpret_response(
            &id(),
            &json!({"status": "verified", "is_same_location": true, "is_clean": true,
                    "improvement_percentage": 92.5}),
        )
        .unwrap();
        assert_eq!(view.status_label.as_deref(), Some("Verified"));
        assert_eq!(view.status_tone, Some(StatusTone::Verified));
        assert_eq!(view.location_label, Some("Same Location"));
        assert_eq!(view.cleanliness_label, Some("Area Clean"));
        assert_eq!(view.band, Some(ImprovementBand::Excellent));
        assert!(view.missing_fields.is_empty());
    }

    #[test]
    fn test_interpret_partial_response() {
        let view = interpret_response(&id(), &json!({"improvement_percentage": 50})).unwrap();
        assert_eq!(view.band, Some(ImprovementBand::GoodProgress));
        assert_eq!(
            view.missing_fields,
            vec!["status", "is_same_location", "is_clean"]
        );
        assert_eq!(view.status_label, None);
    }

    #[test]
    fn test_non_object_rejected() {
        for body in [json!([1, 2]), json!("ok"), json!(null), json!(42)] {
            let err = interpret_response(&id(), &body).unwrap_err();
            assert!(err.to_string().contains(INVALID_RESPONSE));
        }
    }

    // Backend points at a closed port; anything that reached it would fail
    // with a backend error rather than the local validation errors below.
    fn unreachable_backend() -> BackendClient {
        BackendClient::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap()
    }

    #[tokio::test]
    async fn test_submit_validates_locally() {
        let backend = unreachable_backend();
        let image = ImageAttachment::from_frame(vec![1]);

        let err = submit(&backend, "report_xyz", Some(image)).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid report ID format: xyz. The API requires a 24-character hex string."
        );

        let err = submit(&backend, "65f1a2b3c4d5e6f708192a3b", None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), MISSING_AFTER_IMAGE);
    }

    #[tokio::test]
    async fn test_load_page_without_id() {
        let page = load_page(&unreachable_backend(), None).await;
        assert_eq!(page.notice.as_deref(), Some(NO_REPORT_SELECTED));
        assert!(!page.can_submit);
        assert!(page.report.is_none());
    }

    #[tokio::test]
    async fn test_load_page_invalid_id() {
        let page = load_page(&unreachable_backend(), Some("report_123".to_string())).await;
        assert_eq!(page.report_id.as_deref(), Some("123"));
        assert!(page.error.unwrap().starts_with("Invalid report ID format: 123."));
        assert!(!page.can_submit);
    }

    #[tokio::test]
    async fn test_load_page_falls_back_to_placeholder() {
        let page = load_page(
            &unreachable_backend(),
            Some("report_65f1a2b3c4d5e6f708192a3b".to_string()),
        )
        .await;
        assert_eq!(page.error.as_deref(), Some(REPORT_LOAD_FAILED));
        let report = page.report.unwrap();
        assert_eq!(report.id, "65f1a2b3c4d5e6f708192a3b");
        assert_eq!(report.image_url, "/placeholder-waste-image.jpg");
        assert_eq!(report.location.place_name, "Unknown location");
        assert!(page.can_submit);
    }
}
