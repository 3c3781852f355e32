// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Redemption confirmation modal.

use crate::config::RedeemPolicy;
use crate::models::wallet::InsufficientCoins;
use crate::models::{Benefit, WalletAccount};
use serde::Serialize;

/// Shown when the backend refused or could not be reached.
pub const REDEEM_FAILED: &str = "Failed to redeem benefit. Please try again.";

/// Shown when the redemption was applied locally without backend confirmation.
pub const REDEEM_UNCONFIRMED: &str = "Redeemed locally; the server did not confirm this redemption.";

/// State of the redemption modal for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RedemptionModal {
    #[default]
    Closed,
    /// Waiting for the user to confirm. `error` holds the last local refusal.
    Confirming {
        benefit: Benefit,
        error: Option<String>,
    },
    /// Request in flight.
    Redeeming { benefit: Benefit },
    /// Terminal until dismissed. `warning` is set when the backend failed but
    /// the optimistic policy applied the redemption anyway.
    Succeeded {
        benefit: Benefit,
        warning: Option<String>,
    },
    /// Backend refused or could not be reached; confirm again or dismiss.
    Failed { benefit: Benefit, error: String },
}

/// Transition refused by the modal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModalError {
    #[error("No benefit selected")]
    NothingSelected,

    #[error("A redemption is already in progress")]
    Busy,

    #[error("Close the confirmation before redeeming another benefit")]
    AlreadyRedeemed,

    #[error(transparent)]
    Insufficient(#[from] InsufficientCoins),
}

impl RedemptionModal {
    pub fn benefit(&self) -> Option<&Benefit> {
        match self {
            RedemptionModal::Closed => None,
            RedemptionModal::Confirming { benefit, .. }
            | RedemptionModal::Redeeming { benefit }
            | RedemptionModal::Succeeded { benefit, .. }
            | RedemptionModal::Failed { benefit, .. } => Some(benefit),
        }
    }

    /// Open the modal for `benefit`.
    pub fn select(&mut self, benefit: Benefit) -> Result<(), ModalError> {
        match self {
            RedemptionModal::Redeeming { .. } => Err(ModalError::Busy),
            RedemptionModal::Succeeded { .. } => Err(ModalError::AlreadyRedeemed),
            _ => {
                *self = RedemptionModal::Confirming {
                    benefit,
                    error: None,
                };
                Ok(())
            }
        }
    }

    /// Check the balance and move to `Redeeming`. On refusal the modal stays
    /// open with the error recorded and nothing is sent.
    pub fn begin_confirm(&mut self, wallet: &WalletAccount) -> Result<Benefit, ModalError> {
        let benefit = match self {
            RedemptionModal::Confirming { benefit, .. } | RedemptionModal::Failed { benefit, .. } => {
                benefit.clone()
            }
            RedemptionModal::Redeeming { .. } => return Err(ModalError::Busy),
            RedemptionModal::Succeeded { .. } => return Err(ModalError::AlreadyRedeemed),
            RedemptionModal::Closed => return Err(ModalError::NothingSelected),
        };

        if !wallet.can_afford(&benefit) {
            let refusal = InsufficientCoins {
                balance: wallet.balance,
                required: benefit.coins_required,
            };
            *self = RedemptionModal::Confirming {
                benefit,
                error: Some(refusal.to_string()),
            };
            return Err(refusal.into());
        }

        *self = RedemptionModal::Redeeming {
            benefit: benefit.clone(),
        };
        Ok(benefit)
    }

    /// Record whether the backend accepted the redemption. Returns whether
    /// the local balance should be debited.
    pub fn finish(&mut self, accepted: bool, policy: RedeemPolicy) -> bool {
        let RedemptionModal::Redeeming { benefit } = self else {
            return false;
        };
        let benefit = benefit.clone();

        match (accepted, policy) {
            (true, _) => {
                *self = RedemptionModal::Succeeded {
                    benefit,
                    warning: None,
                };
                true
            }
            (false, RedeemPolicy::Optimistic) => {
                *self = RedemptionModal::Succeeded {
                    benefit,
                    warning: Some(REDEEM_UNCONFIRMED.to_string()),
                };
                true
            }
            (false, RedeemPolicy::Strict) => {
                *self = RedemptionModal::Failed {
                    benefit,
                    error: REDEEM_FAILED.to_string(),
                };
                false
            }
        }
    }

    /// Close the modal. Refused while a request is in flight.
    pub fn dismiss(&mut self) -> Result<(), ModalError> {
        if matches!(self, RedemptionModal::Redeeming { .. }) {
            return Err(ModalError::Busy);
        }
        *self = RedemptionModal::Closed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::wallet::fallback_benefits;

    fn wallet(balance: i64) -> WalletAccount {
        let mut w = WalletAccount::fallback("user_123", "t0");
        w.balance = balance;
        w
    }

    fn benefit(cost: i64) -> Benefit {
        let mut b = fallback_benefits().remove(0);
        b.coins_required = cost;
        b
    }

    #[test]
    fn test_confirm_at_exact_balance() {
        let mut modal = RedemptionModal::default();
        modal.select(benefit(500)).unwrap();
        let chosen = modal.begin_confirm(&wallet(500)).unwrap();
        assert_eq!(chosen.coins_required, 500);
        assert!(matches!(modal, RedemptionModal::Redeeming { .. }));
    }

    #[test]
    fn test_insufficient_balance_stays_confirming() {
        let mut modal = RedemptionModal::default();
        modal.select(benefit(501)).unwrap();
        let err = modal.begin_confirm(&wallet(500)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "You don't have enough coins to redeem this benefit"
        );
        match &modal {
            RedemptionModal::Confirming { error, .. } => assert_eq!(
                error.as_deref(),
                Some("You don't have enough coins to redeem this benefit")
            ),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_strict_failure_keeps_balance() {
        let mut modal = RedemptionModal::default();
        modal.select(benefit(100)).unwrap();
        modal.begin_confirm(&wallet(500)).unwrap();
        let debit = modal.finish(false, RedeemPolicy::Strict);
        assert!(!debit);
        match &modal {
            RedemptionModal::Failed { error, .. } => assert_eq!(error, REDEEM_FAILED),
            other => panic!("unexpected state {:?}", other),
        }

        // Retry is allowed from Failed
        modal.begin_confirm(&wallet(500)).unwrap();
        assert!(modal.finish(true, RedeemPolicy::Strict));
        assert!(matches!(modal, RedemptionModal::Succeeded { warning: None, .. }));
    }

    #[test]
    fn test_optimistic_failure_still_succeeds() {
        let mut modal = RedemptionModal::default();
        modal.select(benefit(100)).unwrap();
        modal.begin_confirm(&wallet(500)).unwrap();
        assert!(modal.finish(false, RedeemPolicy::Optimistic));
        match modal {
            RedemptionModal::Succeeded { warning, .. } => {
                assert_eq!(warning.as_deref(), Some(REDEEM_UNCONFIRMED))
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_succeeded_is_terminal_until_dismissed() {
        let mut modal = RedemptionModal::default();
        modal.select(benefit(100)).unwrap();
        modal.begin_confirm(&wallet(500)).unwrap();
        modal.finish(true, RedeemPolicy::Strict);

        assert_eq!(modal.select(benefit(50)), Err(ModalError::AlreadyRedeemed));
        assert_eq!(
            modal.begin_confirm(&wallet(500)),
            Err(ModalError::AlreadyRedeemed)
        );

        modal.dismiss().unwrap();
        assert_eq!(modal, RedemptionModal::Closed);
        modal.select(benefit(50)).unwrap();
    }

    #[test]
    fn test_busy_while_redeeming() {
        let mut modal = RedemptionModal::default();
        modal.select(benefit(100)).unwrap();
        modal.begin_confirm(&wallet(500)).unwrap();
        assert_eq!(modal.dismiss(), Err(ModalError::Busy));
        assert_eq!(modal.select(benefit(1)), Err(ModalError::Busy));
    }

    #[test]
    fn test_confirm_without_selection() {
        let mut modal = RedemptionModal::Closed;
        assert_eq!(
            modal.begin_confirm(&wallet(500)),
            Err(ModalError::NothingSelected)
        );
    }

    #[test]
    fn test_modal_serializes_with_state_tag() {
        let json = serde_json::to_value(RedemptionModal::Closed).unwrap();
        assert_eq!(json["state"], "closed");
    }
}
