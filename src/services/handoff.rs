// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Navigation handoff between pages.
//!
//! The report page records the id of a freshly stored report so the
//! verification page can pick it up without a query parameter. Entries are
//! keyed by a random per-browser token kept in the `waste_nav` cookie and
//! expire after [`HANDOFF_TTL`].

use axum_extra::extract::cookie::{Cookie, SameSite};
use dashmap::DashMap;
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cookie carrying the handoff key.
pub const HANDOFF_COOKIE: &str = "waste_nav";

/// How long a recorded report id stays available.
pub const HANDOFF_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone)]
struct Entry {
    report_id: String,
    stored_at: Instant,
}

/// In-memory, TTL-bounded report id handoff.
#[derive(Clone)]
pub struct HandoffStore {
    entries: Arc<DashMap<String, Entry>>,
    rng: SystemRandom,
    ttl: Duration,
}

impl Default for HandoffStore {
    fn default() -> Self {
        Self::with_ttl(HANDOFF_TTL)
    }
}

impl HandoffStore {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            rng: SystemRandom::new(),
            ttl,
        }
    }

    /// Generate a fresh handoff key.
    pub fn new_key(&self) -> anyhow::Result<String> {
        let mut bytes = [0u8; 16];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| anyhow::anyhow!("system RNG unavailable"))?;
        Ok(hex::encode(bytes))
    }

    /// Record the report id for `key`, replacing any earlier one.
    pub fn put(&self, key: &str, report_id: &str) {
        self.entries.insert(
            key.to_string(),
            Entry {
                report_id: report_id.to_string(),
                stored_at: Instant::now(),
            },
        );
        tracing::debug!(report_id = %report_id, "Recorded report handoff");
    }

    /// Raw report id recorded for `key`, if still fresh.
    ///
    /// The id is returned unvalidated; callers parse it into a `ReportId`.
    pub fn get(&self, key: &str) -> Option<String> {
        let entry = self.entries.get(key)?;
        if entry.stored_at.elapsed() > self.ttl {
            drop(entry);
            self.entries.remove(key);
            return None;
        }
        Some(entry.report_id.clone())
    }

    pub fn clear(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Drop all expired entries.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, e| e.stored_at.elapsed() <= ttl);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cookie carrying a handoff key.
pub fn handoff_cookie(key: String, secure: bool) -> Cookie<'static> {
    Cookie::build((HANDOFF_COOKIE, key))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(HANDOFF_TTL.as_secs() as i64))
        .build()
}
