// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reverse geocoding (coordinates → human-readable place name).

use crate::error::AppError;
use crate::models::Location;
use anyhow::Context;
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Place name used when the lookup succeeds but has no display name.
pub const UNKNOWN_PLACE: &str = "Unknown Location";

/// Message shown when the lookup itself fails.
pub const LOOKUP_FAILED: &str = "Could not fetch location details";

const USER_AGENT: &str = concat!("waste-portal/", env!("CARGO_PKG_VERSION"));

/// Coordinates are cached at ~11 m resolution.
const CACHE_PRECISION: f64 = 10_000.0;

/// Upper bound on cached place names.
pub const CACHE_CAPACITY: usize = 10_000;

/// How long a cached place name is reused.
pub const CACHE_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
struct CachedPlace {
    place_name: String,
    stored_at: Instant,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
}

/// Why the browser could not provide a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionError {
    PermissionDenied,
    Unsupported,
}

impl PositionError {
    pub fn message(self) -> &'static str {
        match self {
            PositionError::PermissionDenied => "Location access denied",
            PositionError::Unsupported => "Geolocation is not supported by your browser",
        }
    }
}

/// Nominatim-compatible reverse geocoder with an in-memory cache.
#[derive(Clone)]
pub struct Geocoder {
    http: reqwest::Client,
    base_url: String,
    cache: Arc<DashMap<(i64, i64), CachedPlace>>,
    capacity: usize,
    ttl: Duration,
}

impl Geocoder {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("failed building geocoder HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: Arc::new(DashMap::new()),
            capacity: CACHE_CAPACITY,
            ttl: CACHE_TTL,
        })
    }

    /// Override the cache bounds.
    pub fn with_cache_limits(mut self, capacity: usize, ttl: Duration) -> Self {
        self.capacity = capacity;
        self.ttl = ttl;
        self
    }

    /// Resolve coordinates into a [`Location`].
    pub async fn resolve(&self, latitude: f64, longitude: f64) -> Result<Location, AppError> {
        check_coordinates(latitude, longitude)?;
        let place_name = self.place_name(latitude, longitude).await?;
        Ok(Location {
            latitude,
            longitude,
            place_name,
        })
    }

    /// Look up the display name for a coordinate pair.
    pub async fn place_name(&self, latitude: f64, longitude: f64) -> Result<String, AppError> {
        let key = cache_key(latitude, longitude);
        if let Some(cached) = self.cached(key) {
            return Ok(cached);
        }

        let url = format!("{}/reverse", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Reverse geocoding request failed");
                AppError::Geocoding(LOOKUP_FAILED.to_string())
            })?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Reverse geocoding rejected");
            return Err(AppError::Geocoding(LOOKUP_FAILED.to_string()));
        }

        let body: ReverseResponse = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "Reverse geocoding returned unreadable body");
            AppError::Geocoding(LOOKUP_FAILED.to_string())
        })?;

        let place_name = body
            .display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_PLACE.to_string());

        self.remember(key, &place_name);
        Ok(place_name)
    }

    fn cached(&self, key: (i64, i64)) -> Option<String> {
        let entry = self.cache.get(&key)?;
        if entry.stored_at.elapsed() > self.ttl {
            drop(entry);
            self.cache.remove(&key);
            return None;
        }
        Some(entry.place_name.clone())
    }

    /// Cache a place name. A full cache is purged of expired entries first;
    /// if it is still full the name is not cached.
    fn remember(&self, key: (i64, i64), place_name: &str) {
        if self.cache.len() >= self.capacity && !self.cache.contains_key(&key) {
            self.purge_expired();
            if self.cache.len() >= self.capacity {
                tracing::debug!(capacity = self.capacity, "Geocoder cache full, not caching");
                return;
            }
        }
        self.cache.insert(
            key,
            CachedPlace {
                place_name: place_name.to_string(),
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop all expired cache entries.
    pub fn purge_expired(&self) -> usize {
        let before = self.cache.len();
        let ttl = self.ttl;
        self.cache.retain(|_, e| e.stored_at.elapsed() <= ttl);
        before.saturating_sub(self.cache.len())
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

fn cache_key(latitude: f64, longitude: f64) -> (i64, i64) {
    (
        (latitude * CACHE_PRECISION).round() as i64,
        (longitude * CACHE_PRECISION).round() as i64,
    )
}

/// Reject coordinates that cannot be on Earth.
pub fn check_coordinates(latitude: f64, longitude: f64) -> Result<(), AppError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(AppError::BadRequest(format!("Invalid latitude: {}", latitude)));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(AppError::BadRequest(format!("Invalid longitude: {}", longitude)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_rounds() {
        assert_eq!(cache_key(12.97161, 77.59456), cache_key(12.971609, 77.594561));
        assert_ne!(cache_key(12.9716, 77.5946), cache_key(12.9726, 77.5946));
    }

    fn geocoder(capacity: usize, ttl: Duration) -> Geocoder {
        Geocoder::new("http://geocoder.invalid", Duration::from_secs(1))
            .unwrap()
            .with_cache_limits(capacity, ttl)
    }

    #[test]
    fn test_cache_is_bounded() {
        let geo = geocoder(3, CACHE_TTL);
        for i in 0..50 {
            geo.remember(cache_key(10.0 + i as f64 * 0.01, 77.0), "Somewhere");
        }
        assert_eq!(geo.cache_len(), 3);

        // Known keys are still refreshed when full
        let key = cache_key(10.0, 77.0);
        geo.remember(key, "Renamed");
        assert_eq!(geo.cached(key).as_deref(), Some("Renamed"));
    }

    #[test]
    fn test_full_cache_makes_room_from_expired() {
        let geo = geocoder(2, Duration::ZERO);
        geo.remember(cache_key(1.0, 1.0), "A");
        geo.remember(cache_key(2.0, 2.0), "B");
        std::thread::sleep(Duration::from_millis(5));

        geo.remember(cache_key(3.0, 3.0), "C");
        assert_eq!(geo.cache_len(), 1);
    }

    #[test]
    fn test_expired_entries_purged() {
        let geo = geocoder(10, Duration::ZERO);
        geo.remember(cache_key(1.0, 1.0), "A");
        geo.remember(cache_key(2.0, 2.0), "B");
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(geo.cached(cache_key(1.0, 1.0)), None);
        assert_eq!(geo.purge_expired(), 1);
        assert_eq!(geo.cache_len(), 0);
    }

    #[test]
    fn test_check_coordinates() {
        assert!(check_coordinates(20.5937, 78.9629).is_ok());
        assert!(check_coordinates(91.0, 0.0).is_err());
        assert!(check_coordinates(0.0, -180.5).is_err());
        assert!(check_coordinates(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_position_error_messages() {
        assert_eq!(PositionError::PermissionDenied.message(), "Location access denied");
        assert_eq!(
            PositionError::Unsupported.message(),
            "Geolocation is not supported by your browser"
        );
    }
}
