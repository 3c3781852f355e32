// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod deposit;
pub mod labels;
pub mod report;
pub mod user;
pub mod verification;
pub mod wallet;

pub use deposit::{DumpStatus, WasteDump};
pub use labels::{DetectedLabel, LabelField};
pub use report::{Location, ReportId, Severity, ValidationResult, WasteReport};
pub use user::{AdminCredential, AdminRegistration, SessionUser};
pub use verification::{ImprovementBand, VerificationResult};
pub use wallet::{Benefit, WalletAccount};
