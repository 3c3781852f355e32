// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Cleanup verification results and their textual assessment.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Improvement at or above this is an excellent cleanup.
pub const EXCELLENT_THRESHOLD: f64 = 90.0;
/// Improvement at or above this is good progress.
pub const GOOD_PROGRESS_THRESHOLD: f64 = 50.0;

/// Fields the verify-cleanup endpoint is expected to return.
pub const EXPECTED_FIELDS: [&str; 4] = [
    "status",
    "is_same_location",
    "is_clean",
    "improvement_percentage",
];

/// Before/after comparison result. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub status: Option<String>,
    pub is_same_location: Option<bool>,
    pub is_clean: Option<bool>,
    pub improvement_percentage: Option<f64>,
}

impl VerificationResult {
    /// Read the expected fields from a JSON object, tolerating gaps.
    ///
    /// Returns the result and the names of fields that were missing or
    /// had the wrong type.
    pub fn from_object(object: &Map<String, Value>) -> (Self, Vec<&'static str>) {
        let result = Self {
            status: object
                .get("status")
                .and_then(Value::as_str)
                .map(str::to_string),
            is_same_location: object.get("is_same_location").and_then(Value::as_bool),
            is_clean: object.get("is_clean").and_then(Value::as_bool),
            improvement_percentage: object
                .get("improvement_percentage")
                .and_then(Value::as_f64),
        };

        let missing = EXPECTED_FIELDS
            .iter()
            .copied()
            .filter(|field| match *field {
                "status" => result.status.is_none(),
                "is_same_location" => result.is_same_location.is_none(),
                "is_clean" => result.is_clean.is_none(),
                _ => result.improvement_percentage.is_none(),
            })
            .collect();

        (result, missing)
    }

    /// Status with its first letter capitalized, as shown in the result card.
    pub fn status_label(&self) -> Option<String> {
        let status = self.status.as_deref()?;
        let mut chars = status.chars();
        Some(match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        })
    }

    pub fn location_label(&self) -> Option<&'static str> {
        self.is_same_location.map(|same| {
            if same {
                "Same Location"
            } else {
                "Different Location"
            }
        })
    }

    pub fn cleanliness_label(&self) -> Option<&'static str> {
        self.is_clean.map(|clean| {
            if clean {
                "Area Clean"
            } else {
                "Still Needs Attention"
            }
        })
    }

    pub fn band(&self) -> Option<ImprovementBand> {
        self.improvement_percentage.map(ImprovementBand::from_percentage)
    }
}

/// Banded assessment of the improvement percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImprovementBand {
    Excellent,
    GoodProgress,
    Minimal,
}

impl ImprovementBand {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= EXCELLENT_THRESHOLD {
            ImprovementBand::Excellent
        } else if percentage >= GOOD_PROGRESS_THRESHOLD {
            ImprovementBand::GoodProgress
        } else {
            ImprovementBand::Minimal
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ImprovementBand::Excellent => "Excellent cleanup! The area looks significantly better.",
            ImprovementBand::GoodProgress => {
                "Good progress, but there's still room for improvement."
            }
            ImprovementBand::Minimal => {
                "Minimal improvement detected. The area needs more attention."
            }
        }
    }
}

/// Badge tone for a report status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Verified,
    Unverified,
    Rejected,
    Other,
}

impl StatusTone {
    pub fn of(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "verified" => StatusTone::Verified,
            "unverified" => StatusTone::Unverified,
            "rejected" => StatusTone::Rejected,
            _ => StatusTone::Other,
        }
    }
}
