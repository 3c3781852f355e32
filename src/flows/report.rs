// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Report submission workflow.
//!
//! `Idle → Capturing | Selecting → ImageReady → Submitting → Succeeded | Failed`
//!
//! The flow owns at most one [`CameraSession`]; it is stopped on every mode
//! switch, before a new capture starts, after a frame is captured, and when
//! the flow is dropped.

use crate::capture::{
    CameraConstraints, CameraSession, CaptureError, ImageAttachment, MediaDevices, NoCamera,
};
use crate::error::AppError;
use crate::models::{Location, ValidationResult};
use crate::services::backend::{BackendClient, ReportSubmission};
use crate::services::geocoding::PositionError;
use crate::time_utils::now_rfc3339;
use serde::Serialize;

/// Message shown when submit is pressed too early.
pub const MISSING_INPUT: &str = "Please provide an image and wait for your location";

/// How the user supplies the image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadMode {
    #[default]
    Camera,
    Gallery,
}

/// One-shot device location.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum LocationState {
    #[default]
    Pending,
    Resolved(Location),
    Failed(String),
}

impl LocationState {
    pub fn location(&self) -> Option<&Location> {
        match self {
            LocationState::Resolved(location) => Some(location),
            _ => None,
        }
    }
}

/// Where the page is in the workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "phase", content = "detail", rename_all = "snake_case")]
pub enum ReportPhase {
    #[default]
    Idle,
    Capturing,
    Selecting,
    ImageReady,
    Submitting,
    Succeeded(ValidationResult),
    Failed(String),
}

/// State of one report page.
pub struct ReportFlow<D: MediaDevices = NoCamera> {
    devices: D,
    mode: UploadMode,
    camera: Option<CameraSession<D::Stream>>,
    image: Option<ImageAttachment>,
    location: LocationState,
    description: String,
    captured_at: Option<String>,
    phase: ReportPhase,
}

impl Default for ReportFlow<NoCamera> {
    fn default() -> Self {
        Self::new(NoCamera)
    }
}

impl<D: MediaDevices> ReportFlow<D> {
    pub fn new(devices: D) -> Self {
        Self {
            devices,
            mode: UploadMode::default(),
            camera: None,
            image: None,
            location: LocationState::Pending,
            description: String::new(),
            captured_at: None,
            phase: ReportPhase::Idle,
        }
    }

    pub fn mode(&self) -> UploadMode {
        self.mode
    }

    pub fn phase(&self) -> &ReportPhase {
        &self.phase
    }

    pub fn location(&self) -> &LocationState {
        &self.location
    }

    pub fn image(&self) -> Option<&ImageAttachment> {
        self.image.as_ref()
    }

    pub fn camera_running(&self) -> bool {
        self.camera.as_ref().is_some_and(CameraSession::is_running)
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Capture time reported by the client; defaults to submission time.
    pub fn set_captured_at(&mut self, timestamp: Option<String>) {
        self.captured_at = timestamp.filter(|t| crate::time_utils::parse_rfc3339(t).is_some());
    }

    /// Switch between camera and gallery. Any running camera is released.
    pub fn set_mode(&mut self, mode: UploadMode) {
        self.stop_camera();
        self.mode = mode;
        if mode == UploadMode::Gallery && self.image.is_none() {
            self.phase = ReportPhase::Selecting;
        }
    }

    /// Open the camera, releasing any previous stream first.
    pub async fn start_camera(&mut self) -> Result<(), AppError> {
        self.stop_camera();
        self.mode = UploadMode::Camera;

        match CameraSession::open(&self.devices, CameraConstraints::default()).await {
            Ok(session) => {
                self.camera = Some(session);
                self.phase = ReportPhase::Capturing;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Camera unavailable");
                self.phase = self.resting_phase();
                Err(AppError::Permission(e.to_string()))
            }
        }
    }

    pub fn stop_camera(&mut self) {
        if let Some(mut session) = self.camera.take() {
            session.stop();
            if self.phase == ReportPhase::Capturing {
                self.phase = self.resting_phase();
            }
        }
    }

    /// Grab a still from the running camera and release it.
    pub fn capture(&mut self) -> Result<&ImageAttachment, AppError> {
        let session = self
            .camera
            .take()
            .ok_or_else(|| AppError::Validation(CaptureError::NotRunning.to_string()))?;

        match session.capture() {
            Ok(image) => Ok(self.accept_image(image)),
            Err(e) => {
                self.phase = self.resting_phase();
                Err(AppError::Validation(e.to_string()))
            }
        }
    }

    /// Use a picked file as the report image.
    pub fn select_image(&mut self, image: ImageAttachment) -> &ImageAttachment {
        self.stop_camera();
        self.accept_image(image)
    }

    /// Record the device position result. Only the first call has effect.
    pub fn resolve_location(&mut self, outcome: Result<Location, AppError>) {
        if self.location != LocationState::Pending {
            return;
        }
        self.location = match outcome {
            Ok(location) => LocationState::Resolved(location),
            Err(e) => LocationState::Failed(e.to_string()),
        };
    }

    /// The browser could not produce coordinates at all.
    pub fn position_unavailable(&mut self, reason: PositionError) {
        self.resolve_location(Err(AppError::Permission(reason.message().to_string())));
    }

    /// Validate inputs and move to `Submitting`.
    pub fn begin_submit(&mut self) -> Result<ReportSubmission, AppError> {
        if self.phase == ReportPhase::Submitting {
            return Err(AppError::BadRequest("Submission already in progress".to_string()));
        }
        let (Some(image), Some(location)) = (self.image.as_ref(), self.location.location()) else {
            return Err(AppError::Validation(MISSING_INPUT.to_string()));
        };

        let submission = ReportSubmission {
            image: image.clone(),
            location: location.as_form_value(),
            description: self.description.clone(),
            timestamp: self.captured_at.clone().unwrap_or_else(now_rfc3339),
        };
        self.phase = ReportPhase::Submitting;
        Ok(submission)
    }

    /// Record the validation outcome.
    pub fn finish(&mut self, outcome: Result<ValidationResult, AppError>) -> &ReportPhase {
        self.phase = match outcome {
            Ok(result) => ReportPhase::Succeeded(result),
            Err(e) => {
                tracing::warn!(error = %e, "Report validation failed");
                ReportPhase::Failed(AppError::VALIDATION_FAILED.to_string())
            }
        };
        &self.phase
    }

    /// Submit once; no retry.
    pub async fn submit(&mut self, backend: &BackendClient) -> Result<&ReportPhase, AppError> {
        let submission = self.begin_submit()?;
        let outcome = backend.validate_report(&submission).await;
        Ok(self.finish(outcome))
    }

    fn accept_image(&mut self, image: ImageAttachment) -> &ImageAttachment {
        tracing::debug!(
            file_name = %image.file_name,
            size = image.bytes.len(),
            "Report image ready"
        );
        self.phase = ReportPhase::ImageReady;
        self.image.insert(image)
    }

    fn resting_phase(&self) -> ReportPhase {
        match (self.image.is_some(), self.mode) {
            (true, _) => ReportPhase::ImageReady,
            (false, UploadMode::Gallery) => ReportPhase::Selecting,
            (false, UploadMode::Camera) => ReportPhase::Idle,
        }
    }
}
