// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Deposit locator route.

use crate::error::{AppError, Result};
use crate::flows::report::LocationState;
use crate::models::deposit::{MapMarker, MapView, WasteDump};
use crate::services::geocoding::check_coordinates;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/deposits", get(get_deposits))
}

#[derive(Deserialize)]
pub struct DepositsQuery {
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

/// A dump site in the sidebar list.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub struct DumpListing {
    #[serde(flatten)]
    pub dump: WasteDump,
    /// Present only when the user's position is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// Deposit map view model.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub struct DepositsResponse {
    pub view: MapView,
    #[cfg_attr(feature = "binding-generation", ts(type = "unknown"))]
    pub user_location: Option<LocationState>,
    pub markers: Vec<MapMarker>,
    pub dumps: Vec<DumpListing>,
}

/// Dump sites around the user (or country-wide when unknown).
async fn get_deposits(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DepositsQuery>,
) -> Result<Json<DepositsResponse>> {
    let user = match (query.latitude, query.longitude) {
        (Some(latitude), Some(longitude)) => {
            check_coordinates(latitude, longitude)?;
            Some((latitude, longitude))
        }
        (None, None) => None,
        _ => {
            return Err(AppError::BadRequest(
                "latitude and longitude must be given together".to_string(),
            ))
        }
    };

    let Some((latitude, longitude)) = user else {
        let dumps = state.deposits.dumps();
        return Ok(Json(DepositsResponse {
            view: MapView::DEFAULT,
            user_location: None,
            markers: dumps.iter().map(MapMarker::dump).collect(),
            dumps: dumps
                .iter()
                .cloned()
                .map(|dump| DumpListing {
                    dump,
                    distance_km: None,
                })
                .collect(),
        }));
    };

    let user_location = match state.geocoder.resolve(latitude, longitude).await {
        Ok(location) => LocationState::Resolved(location),
        Err(e) => LocationState::Failed(e.to_string()),
    };

    let ranked = state.deposits.nearest_to(latitude, longitude);

    let mut markers = Vec::with_capacity(ranked.len() + 1);
    markers.push(MapMarker::user(latitude, longitude));
    markers.extend(ranked.iter().map(|r| MapMarker::dump(&r.dump)));

    Ok(Json(DepositsResponse {
        view: MapView::centred_on(latitude, longitude),
        user_location: Some(user_location),
        markers,
        dumps: ranked
            .into_iter()
            .map(|r| DumpListing {
                dump: r.dump,
                distance_km: Some(r.distance_km),
            })
            .collect(),
    }))
}
