// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Waste report models: locations, report identifiers, validation results.

use crate::models::labels::{deserialize_labels, DetectedLabel};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Backend report identifiers are 24-character hex strings.
static REPORT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{24}$").expect("static pattern"));

/// Prefix some pages attach to report identifiers before handing them off.
const REPORT_ID_PREFIX: &str = "report_";

/// A resolved user position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub place_name: String,
}

impl Location {
    /// The `"lat,lng"` form the validation endpoint expects.
    pub fn as_form_value(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// A validated report identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ReportId(String);

/// Why a raw report identifier was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid report ID format: {0}. The API requires a 24-character hex string.")]
pub struct InvalidReportId(pub String);

impl ReportId {
    /// Strip the handoff prefix if present and check the identifier format.
    pub fn parse(raw: &str) -> Result<Self, InvalidReportId> {
        let cleaned = Self::strip_prefix(raw);
        if REPORT_ID_PATTERN.is_match(cleaned) {
            Ok(Self(cleaned.to_string()))
        } else {
            Err(InvalidReportId(cleaned.to_string()))
        }
    }

    /// Remove a single leading `report_` token.
    pub fn strip_prefix(raw: &str) -> &str {
        let trimmed = raw.trim();
        trimmed.strip_prefix(REPORT_ID_PREFIX).unwrap_or(trimmed)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Severity assigned by the validation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Clean,
    Low,
    Medium,
    High,
    Unknown(String),
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "clean" => Severity::Clean,
            "low" => Severity::Low,
            "medium" => Severity::Medium,
            "high" => Severity::High,
            _ => Severity::Unknown(value),
        }
    }
}

impl From<Severity> for String {
    fn from(value: Severity) -> Self {
        match value {
            Severity::Clean => "Clean".to_string(),
            Severity::Low => "Low".to_string(),
            Severity::Medium => "Medium".to_string(),
            Severity::High => "High".to_string(),
            Severity::Unknown(raw) => raw,
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Unknown("unknown".to_string())
    }
}

/// Display tone for severity badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Positive,
    Caution,
    Warning,
    Critical,
    Neutral,
}

impl Severity {
    pub fn tone(&self) -> Tone {
        match self {
            Severity::Clean => Tone::Positive,
            Severity::Low => Tone::Caution,
            Severity::Medium => Tone::Warning,
            Severity::High => Tone::Critical,
            Severity::Unknown(_) => Tone::Neutral,
        }
    }
}

/// Location block of a stored report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportLocation {
    /// `[lng, lat]` as stored by the backend
    #[serde(default)]
    pub coordinates: [f64; 2],
    #[serde(rename(deserialize = "placeName"), alias = "place_name", default)]
    pub place_name: String,
}

/// A previously submitted waste report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteReport {
    #[serde(rename(deserialize = "_id"), alias = "id")]
    pub id: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub description: String,
    pub location: ReportLocation,
    pub timestamp: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub severity: Severity,
}

impl WasteReport {
    /// Stand-in shown when the original report cannot be loaded.
    pub fn placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            image_url: "/placeholder-waste-image.jpg".to_string(),
            description: "Report details could not be loaded".to_string(),
            location: ReportLocation {
                coordinates: [0.0, 0.0],
                place_name: "Unknown location".to_string(),
            },
            timestamp: crate::time_utils::now_rfc3339(),
            status: "pending".to_string(),
            severity: Severity::Unknown("unknown".to_string()),
        }
    }
}

/// Time-of-day plausibility analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeAnalysis {
    #[serde(default)]
    pub time_appears_valid: bool,
    #[serde(default)]
    pub lighting_condition: String,
    #[serde(default)]
    pub notes: String,
}

/// Whether the free-text description matches the image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptionMatch {
    #[serde(default)]
    pub matches_image: bool,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub notes: String,
}

/// Result of `POST /api/waste/validate`, normalized at decode time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub confidence_score: f64,
    #[serde(default, deserialize_with = "deserialize_labels")]
    pub waste_types: Vec<DetectedLabel>,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, deserialize_with = "deserialize_labels")]
    pub recyclable_items: Vec<DetectedLabel>,
    #[serde(default)]
    pub time_analysis: TimeAnalysis,
    #[serde(default)]
    pub description_match: DescriptionMatch,
    /// Identifier of the stored report, when the backend persisted one
    #[serde(default, alias = "_id")]
    pub report_id: Option<String>,
}
