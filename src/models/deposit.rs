// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Waste dump sites and map presentation models.

use geo::Point;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Fill state of a dump site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(rename_all = "lowercase")]
pub enum DumpStatus {
    Full,
    Empty,
}

impl DumpStatus {
    pub fn label(self) -> &'static str {
        match self {
            DumpStatus::Full => "Full",
            DumpStatus::Empty => "Empty",
        }
    }
}

/// A known waste collection site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WasteDump {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: DumpStatus,
    /// Fill level, 0-100
    pub capacity_percent: u8,
    pub last_updated: String,
}

impl WasteDump {
    /// Position as a `geo` point (x = longitude, y = latitude).
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// Map camera position handed to the tile renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub struct MapView {
    /// `[lat, lng]`
    pub center: [f64; 2],
    pub zoom: u8,
}

impl MapView {
    /// Country-wide view used until the user's position is known.
    pub const DEFAULT: MapView = MapView {
        center: [20.5937, 78.9629],
        zoom: 5,
    };

    /// Zoom applied when recentring on the user.
    pub const USER_ZOOM: u8 = 12;

    pub fn centred_on(latitude: f64, longitude: f64) -> Self {
        Self {
            center: [latitude, longitude],
            zoom: Self::USER_ZOOM,
        }
    }
}

/// What a marker stands for; the renderer picks the pin colour from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    User,
    Dump,
}

/// A pin on the deposit map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub struct MapMarker {
    pub kind: MarkerKind,
    pub position: [f64; 2],
    /// Popup lines
    pub popup: Vec<String>,
}

impl MapMarker {
    pub fn user(latitude: f64, longitude: f64) -> Self {
        Self {
            kind: MarkerKind::User,
            position: [latitude, longitude],
            popup: vec!["Your Location".to_string()],
        }
    }

    pub fn dump(dump: &WasteDump) -> Self {
        Self {
            kind: MarkerKind::Dump,
            position: [dump.latitude, dump.longitude],
            popup: vec![
                dump.name.clone(),
                format!("Status: {}", dump.status.label()),
                format!("Capacity: {}%", dump.capacity_percent),
                format!("Last Updated: {}", dump.last_updated),
            ],
        }
    }
}
