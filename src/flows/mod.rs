// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page workflows (state machines driven by the route handlers).

pub mod report;
pub mod verify;
pub mod wallet;

pub use report::{LocationState, ReportFlow, ReportPhase, UploadMode};
pub use wallet::RedemptionModal;
