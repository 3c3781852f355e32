// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Eco-coin wallet and benefit catalog models.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A user's eco-coin wallet. The backend holds the authoritative copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WalletAccount {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub balance: i64,
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_earned: i64,
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_spent: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// A redeemable reward item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Benefit {
    pub id: String,
    pub name: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub coins_required: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub validity_days: u32,
}

/// Wire body for `POST /api/digital-wallet/redeem`.
#[derive(Debug, Serialize)]
pub struct RedeemRequest<'a> {
    pub user_id: &'a str,
    pub benefit_id: &'a str,
}

/// Refusal raised when a redemption would overdraw the wallet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("You don't have enough coins to redeem this benefit")]
pub struct InsufficientCoins {
    pub balance: i64,
    pub required: i64,
}

impl WalletAccount {
    /// Redemption is allowed exactly when the balance covers the cost.
    pub fn can_afford(&self, benefit: &Benefit) -> bool {
        self.balance >= benefit.coins_required
    }

    /// Apply a redemption to the local copy.
    pub fn debit(&mut self, benefit: &Benefit, now: &str) -> Result<(), InsufficientCoins> {
        if !self.can_afford(benefit) {
            return Err(InsufficientCoins {
                balance: self.balance,
                required: benefit.coins_required,
            });
        }
        self.balance -= benefit.coins_required;
        self.total_spent += benefit.coins_required;
        self.updated_at = now.to_string();
        Ok(())
    }

    /// Demo wallet shown when the wallet fetch fails.
    pub fn fallback(user_id: &str, now: &str) -> Self {
        Self {
            id: "wallet_123".to_string(),
            user_id: user_id.to_string(),
            balance: 1500,
            total_earned: 2500,
            total_spent: 1000,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }
}

/// Demo catalog shown when the benefit fetch fails.
pub fn fallback_benefits() -> Vec<Benefit> {
    vec![
        Benefit {
            id: "benefit_1".to_string(),
            name: "10% Discount on Eco-Friendly Products".to_string(),
            coins_required: 500,
            description: "Get 10% off on all eco-friendly products at partner stores".to_string(),
            validity_days: 30,
        },
        Benefit {
            id: "benefit_2".to_string(),
            name: "Free Waste Collection".to_string(),
            coins_required: 1000,
            description: "One-time free waste collection service at your doorstep".to_string(),
            validity_days: 60,
        },
        Benefit {
            id: "benefit_3".to_string(),
            name: "Plant a Tree in Your Name".to_string(),
            coins_required: 2000,
            description: "We'll plant a tree in the city park with your name on a plaque"
                .to_string(),
            validity_days: 90,
        },
        Benefit {
            id: "benefit_4".to_string(),
            name: "Recycling Workshop Pass".to_string(),
            coins_required: 750,
            description: "Free pass to attend a recycling workshop and learn new skills"
                .to_string(),
            validity_days: 45,
        },
    ]
}
