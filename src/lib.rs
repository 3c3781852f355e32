// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Waste Portal: citizen waste reporting, cleanup verification and rewards
//!
//! This crate provides the page-facing API (backend-for-frontend) that the
//! browser shell talks to. Validation, storage and wallets live in the
//! external waste backend; this service owns sessions, page workflows and
//! the deposit map.

pub mod capture;
pub mod config;
pub mod error;
pub mod flows;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{BackendClient, DepositService, Geocoder, HandoffStore, WalletService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub backend: BackendClient,
    pub geocoder: Geocoder,
    pub deposits: DepositService,
    pub handoff: HandoffStore,
    pub wallet: WalletService,
}

impl AppState {
    /// Wire up the outbound clients and in-memory stores.
    pub fn new(config: Config, deposits: DepositService) -> anyhow::Result<Self> {
        let backend = BackendClient::new(&config.backend_url, config.backend_timeout)?;
        let geocoder = Geocoder::new(&config.geocoder_url, config.backend_timeout)?;
        let wallet = WalletService::new(
            backend.clone(),
            config.wallet_fallback,
            config.redeem_policy,
        );

        Ok(Self {
            config,
            backend,
            geocoder,
            deposits,
            handoff: HandoffStore::default(),
            wallet,
        })
    }
}
