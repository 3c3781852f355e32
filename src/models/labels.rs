// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Detected-label fields from the validation endpoint.
//!
//! `waste_types` and `recyclable_items` arrive in one of three shapes:
//! a list of plain labels, a list of `{type, confidence}` objects, or a
//! single comma-separated string. They are normalized once, when the
//! response is decoded, into an ordered list of [`DetectedLabel`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A label with an optional confidence percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DetectedLabel {
    pub label: String,
    pub confidence: Option<f64>,
}

/// Wire shape of a label field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LabelField {
    List(Vec<LabelEntry>),
    Joined(String),
    Other(Value),
}

/// One element of a list-shaped label field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LabelEntry {
    Plain(String),
    Scored {
        #[serde(rename = "type", alias = "label")]
        label: String,
        #[serde(default, alias = "confidence_score")]
        confidence: Option<f64>,
    },
    Other(Value),
}

impl Default for LabelField {
    fn default() -> Self {
        LabelField::List(Vec::new())
    }
}

impl LabelField {
    /// Flatten into the uniform `(label, confidence)` list.
    pub fn normalize(self) -> Vec<DetectedLabel> {
        match self {
            LabelField::List(entries) => entries
                .into_iter()
                .filter_map(LabelEntry::into_label)
                .collect(),
            LabelField::Joined(joined) => split_joined(&joined),
            LabelField::Other(Value::Null) => Vec::new(),
            LabelField::Other(value) => vec![DetectedLabel {
                label: value.to_string(),
                confidence: None,
            }],
        }
    }
}

impl LabelEntry {
    fn into_label(self) -> Option<DetectedLabel> {
        let (label, confidence) = match self {
            LabelEntry::Plain(label) => (label, None),
            LabelEntry::Scored { label, confidence } => (label, confidence),
            LabelEntry::Other(Value::Null) => return None,
            LabelEntry::Other(value) => (value.to_string(), None),
        };
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        Some(DetectedLabel {
            label: label.to_string(),
            confidence,
        })
    }
}

fn split_joined(joined: &str) -> Vec<DetectedLabel> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(|piece| DetectedLabel {
            label: piece.to_string(),
            confidence: None,
        })
        .collect()
}

/// Serde helper: decode a label field and normalize it in one step.
pub fn deserialize_labels<'de, D>(deserializer: D) -> Result<Vec<DetectedLabel>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let field = Option::<LabelField>::deserialize(deserializer)?;
    Ok(field.map(LabelField::normalize).unwrap_or_default())
}
