// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Waste dump site loading and distance ranking.

use crate::models::{DumpStatus, WasteDump};
use geo::{Distance, Haversine, Point};
use geojson::GeoJson;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// A dump site with its distance from the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedDump {
    #[serde(flatten)]
    pub dump: WasteDump,
    /// Great-circle distance in kilometres
    pub distance_km: f64,
}

/// Read-only catalog of dump sites.
#[derive(Default, Clone)]
pub struct DepositService {
    dumps: Vec<WasteDump>,
}

impl DepositService {
    /// Load dump sites from a GeoJSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, DepositError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| DepositError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load dump sites from a GeoJSON string (FeatureCollection of Points).
    pub fn load_from_json(json_data: &str) -> Result<Self, DepositError> {
        let geojson: GeoJson = json_data
            .parse()
            .map_err(|e: geojson::Error| DepositError::ParseError(e.to_string()))?;

        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(DepositError::ParseError(
                "expected a FeatureCollection".to_string(),
            ));
        };

        let mut dumps = Vec::with_capacity(collection.features.len());

        for (index, feature) in collection.features.into_iter().enumerate() {
            let Some(geometry) = feature.geometry.as_ref() else {
                tracing::warn!(index, "Skipping dump site without geometry");
                continue;
            };

            let point: Point<f64> = geometry
                .value
                .clone()
                .try_into()
                .map_err(|_| DepositError::UnsupportedGeometry)?;

            let text = |name: &str| {
                feature
                    .property(name)
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            };

            let id = feature
                .id
                .as_ref()
                .map(|id| match id {
                    geojson::feature::Id::String(s) => s.clone(),
                    geojson::feature::Id::Number(n) => n.to_string(),
                })
                .or_else(|| text("id"))
                .unwrap_or_else(|| (index + 1).to_string());

            let status = match text("status").as_deref() {
                Some("full") => DumpStatus::Full,
                Some("empty") | None => DumpStatus::Empty,
                Some(other) => return Err(DepositError::InvalidStatus(other.to_string())),
            };

            let capacity_percent = feature
                .property("capacity")
                .and_then(|v| v.as_u64())
                .unwrap_or(0)
                .min(100) as u8;

            dumps.push(WasteDump {
                id,
                name: text("name").unwrap_or_else(|| "Unnamed Site".to_string()),
                latitude: point.y(),
                longitude: point.x(),
                status,
                capacity_percent,
                last_updated: text("last_updated").unwrap_or_default(),
            });
        }

        tracing::info!(count = dumps.len(), "Loaded dump sites");
        Ok(Self { dumps })
    }

    /// The two sites shipped with the product.
    pub fn builtin() -> Self {
        let last_updated = "2024-03-20T10:00:00Z".to_string();
        Self {
            dumps: vec![
                WasteDump {
                    id: "1".to_string(),
                    name: "Central India Waste Facility".to_string(),
                    latitude: 20.5937,
                    longitude: 78.9629,
                    status: DumpStatus::Empty,
                    capacity_percent: 80,
                    last_updated: last_updated.clone(),
                },
                WasteDump {
                    id: "2".to_string(),
                    name: "West India Waste Facility".to_string(),
                    latitude: 19.0824822,
                    longitude: 72.7141282,
                    status: DumpStatus::Empty,
                    capacity_percent: 40,
                    last_updated,
                },
            ],
        }
    }

    pub fn dumps(&self) -> &[WasteDump] {
        &self.dumps
    }

    /// All sites ordered nearest first.
    pub fn nearest_to(&self, latitude: f64, longitude: f64) -> Vec<RankedDump> {
        let origin = Point::new(longitude, latitude);

        let mut ranked: Vec<RankedDump> = self
            .dumps
            .iter()
            .map(|dump| RankedDump {
                dump: dump.clone(),
                distance_km: Haversine.distance(origin, dump.point()) / 1000.0,
            })
            .collect();

        ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        ranked
    }
}

/// Errors from dump site loading.
#[derive(Debug, thiserror::Error)]
pub enum DepositError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse GeoJSON: {0}")]
    ParseError(String),

    #[error("Unsupported geometry type (expected Point)")]
    UnsupportedGeometry,

    #[error("Unknown dump status: {0}")]
    InvalidStatus(String),
}
