// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod backend;
pub mod deposits;
pub mod geocoding;
pub mod handoff;
pub mod session;
pub mod wallet;

pub use backend::BackendClient;
pub use deposits::{DepositError, DepositService};
pub use geocoding::Geocoder;
pub use handoff::HandoffStore;
pub use wallet::WalletService;
