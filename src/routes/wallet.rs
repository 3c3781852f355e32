// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wallet and rewards page routes.

use crate::error::Result;
use crate::flows::RedemptionModal;
use crate::middleware::SessionContext;
use crate::services::wallet::WalletView;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/wallet", get(get_wallet))
        .route("/api/wallet/redeem/select", post(select))
        .route("/api/wallet/redeem/confirm", post(confirm))
        .route("/api/wallet/redeem/dismiss", post(dismiss))
}

/// Wallet and benefit catalog, with fallbacks per policy.
async fn get_wallet(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Json<WalletView> {
    Json(
        state
            .wallet
            .load(session.key(), &state.config.demo_user_id)
            .await,
    )
}

#[derive(Deserialize)]
pub struct SelectRequest {
    benefit_id: String,
}

/// Open the confirmation modal for a benefit.
async fn select(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<RedemptionModal>> {
    Ok(Json(state.wallet.select(session.key(), &req.benefit_id)?))
}

/// Confirm the selected redemption.
async fn confirm(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<WalletView>> {
    Ok(Json(
        state
            .wallet
            .confirm(session.key(), &state.config.demo_user_id)
            .await?,
    ))
}

/// Close the modal.
async fn dismiss(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<RedemptionModal>> {
    Ok(Json(state.wallet.dismiss(session.key())?))
}
