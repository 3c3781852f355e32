// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile page route.

use crate::config::AUTHORITY_HOME;
use crate::middleware::SessionContext;
use crate::models::SessionUser;
use crate::AppState;
use axum::{routing::get, Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/profile", get(get_profile))
}

/// A navigation shortcut on the profile page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub struct QuickAction {
    pub label: &'static str,
    pub href: &'static str,
}

const QUICK_ACTIONS: [QuickAction; 2] = [
    QuickAction {
        label: "Report Waste",
        href: "/report",
    },
    QuickAction {
        label: "Find Waste Deposits",
        href: "/waste-deposits",
    },
];

const AUTHORITY_ACTION: QuickAction = QuickAction {
    label: "Authority Pickups",
    href: AUTHORITY_HOME,
};

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "unknown"))]
    pub user: SessionUser,
    pub quick_actions: Vec<QuickAction>,
    pub authority_action: QuickAction,
}

/// Get the current user's profile page
async fn get_profile(Extension(session): Extension<SessionContext>) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        user: session.user,
        quick_actions: QUICK_ACTIONS.to_vec(),
        authority_action: AUTHORITY_ACTION,
    })
}
