// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Waste Portal API Server
//!
//! Backend-for-frontend for citizen waste reporting: report submission,
//! cleanup verification, the deposit locator and the rewards wallet.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waste_portal::{config::Config, services::DepositService, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        backend = %config.backend_url,
        wallet_fallback = ?config.wallet_fallback,
        redeem_policy = ?config.redeem_policy,
        "Starting Waste Portal API"
    );

    // Load dump sites
    tracing::info!(path = %config.dumps_path, "Loading waste dump sites");
    let deposits = DepositService::load_from_file(&config.dumps_path)?;
    tracing::info!(count = deposits.dumps().len(), "Waste dump sites loaded");

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), deposits)?);

    // Drop expired verification handoffs and cached place names in the background
    let handoff = state.handoff.clone();
    let geocoder = state.geocoder.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            let purged = handoff.purge_expired();
            if purged > 0 {
                tracing::debug!(purged, "Purged expired report handoffs");
            }
            let purged = geocoder.purge_expired();
            if purged > 0 {
                tracing::debug!(purged, "Purged expired place names");
            }
        }
    });

    // Build router
    let app = waste_portal::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("waste_portal=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
