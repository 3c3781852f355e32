// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wallet page data and benefit redemption.
//!
//! Keeps a local copy of each wallet so the page stays consistent between
//! loads, the last benefit catalog, and one redemption modal per session.
//! Confirmations for the same wallet are serialized with a per-user lock.
//! The catalog is replaced as a whole on every load.

use crate::config::{FallbackPolicy, RedeemPolicy};
use crate::error::AppError;
use crate::flows::wallet::{ModalError, RedemptionModal};
use crate::models::wallet::fallback_benefits;
use crate::models::{Benefit, WalletAccount};
use crate::services::backend::BackendClient;
use crate::time_utils::now_rfc3339;
use arc_swap::ArcSwap;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Banner shown when either wallet fetch failed.
pub const LOAD_FAILED_BANNER: &str = "Failed to load data. Please try again later.";

/// Where a section of the page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Live,
    Fallback,
    Unavailable,
}

/// A catalog entry with its affordability for the current balance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenefitView {
    #[serde(flatten)]
    pub benefit: Benefit,
    pub affordable: bool,
}

/// Wallet page view model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletView {
    pub wallet: Option<WalletAccount>,
    pub wallet_source: Source,
    pub benefits: Vec<BenefitView>,
    pub benefits_source: Source,
    pub banner: Option<String>,
    pub modal: RedemptionModal,
}

pub type UserLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Last benefit catalog shown, in display order.
#[derive(Debug)]
struct Catalog {
    benefits: Vec<Benefit>,
    source: Source,
}

/// Wallet and redemption service.
#[derive(Clone)]
pub struct WalletService {
    backend: BackendClient,
    fallback: FallbackPolicy,
    redeem_policy: RedeemPolicy,
    /// Local wallet copies, keyed by wallet user id
    ledger: Arc<DashMap<String, (WalletAccount, Source)>>,
    catalog: Arc<ArcSwap<Catalog>>,
    /// Redemption modal per session
    modals: Arc<DashMap<String, RedemptionModal>>,
    locks: UserLocks,
}

impl WalletService {
    pub fn new(backend: BackendClient, fallback: FallbackPolicy, redeem_policy: RedeemPolicy) -> Self {
        Self {
            backend,
            fallback,
            redeem_policy,
            ledger: Arc::new(DashMap::new()),
            catalog: Arc::new(ArcSwap::from_pointee(Catalog {
                benefits: Vec::new(),
                source: Source::Unavailable,
            })),
            modals: Arc::new(DashMap::new()),
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Build the wallet page for `user_id`, as seen by `session`.
    pub async fn load(&self, session: &str, user_id: &str) -> WalletView {
        let (benefits, wallet) = tokio::join!(
            self.backend.list_benefits(),
            self.backend.get_wallet(user_id)
        );

        let mut failed = false;

        let (benefits, benefits_source) = match benefits {
            Ok(list) => (list, Source::Live),
            Err(e) => {
                tracing::warn!(error = %e, "Benefit catalog fetch failed");
                failed = true;
                match self.fallback {
                    FallbackPolicy::Demo => (fallback_benefits(), Source::Fallback),
                    FallbackPolicy::Unavailable => (Vec::new(), Source::Unavailable),
                }
            }
        };
        self.remember_catalog(&benefits, benefits_source);

        let (wallet, wallet_source) = match wallet {
            Ok(account) => {
                self.ledger
                    .insert(user_id.to_string(), (account.clone(), Source::Live));
                (Some(account), Source::Live)
            }
            Err(e) => {
                tracing::warn!(error = %e, user_id = %user_id, "Wallet fetch failed");
                failed = true;
                match self.offline_wallet(user_id) {
                    (wallet, Source::Live) => (wallet, Source::Fallback),
                    other => other,
                }
            }
        };

        let balance = wallet.as_ref().map(|w| w.balance).unwrap_or(0);
        let benefits = benefits
            .into_iter()
            .map(|benefit| BenefitView {
                affordable: wallet.is_some() && balance >= benefit.coins_required,
                benefit,
            })
            .collect();

        WalletView {
            wallet,
            wallet_source,
            benefits,
            benefits_source,
            banner: failed.then(|| LOAD_FAILED_BANNER.to_string()),
            modal: self.modal(session),
        }
    }

    /// Current modal for a session.
    pub fn modal(&self, session: &str) -> RedemptionModal {
        self.modals
            .get(session)
            .map(|m| m.value().clone())
            .unwrap_or_default()
    }

    /// Open the confirmation modal for a benefit.
    pub fn select(&self, session: &str, benefit_id: &str) -> Result<RedemptionModal, AppError> {
        let benefit = self
            .catalog
            .load()
            .benefits
            .iter()
            .find(|benefit| benefit.id == benefit_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Benefit {}", benefit_id)))?;

        let mut modal = self.modals.entry(session.to_string()).or_default();
        modal.select(benefit).map_err(modal_error)?;
        Ok(modal.value().clone())
    }

    /// Confirm the selected redemption for `user_id`.
    ///
    /// The balance check happens before any request is sent. With the strict
    /// policy the local balance changes only after the backend accepts.
    /// The redemption runs in its own task, so the outcome is recorded even
    /// when the caller stops waiting.
    pub async fn confirm(&self, session: &str, user_id: &str) -> Result<WalletView, AppError> {
        let service = self.clone();
        let session = session.to_string();
        let user_id = user_id.to_string();

        tokio::spawn(async move { service.redeem_selected(&session, &user_id).await })
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("redemption task failed: {}", e)))?
    }

    async fn redeem_selected(&self, session: &str, user_id: &str) -> Result<WalletView, AppError> {
        let lock = self
            .locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let (wallet, _) = self.offline_wallet(user_id);
        let wallet = wallet.ok_or_else(|| {
            AppError::Validation("Wallet is not available right now".to_string())
        })?;

        // Modal entry must not be held across the await below
        let benefit = {
            let mut modal = self.modals.entry(session.to_string()).or_default();
            modal.begin_confirm(&wallet).map_err(modal_error)?
        };

        tracing::info!(
            user_id = %user_id,
            benefit_id = %benefit.id,
            cost = benefit.coins_required,
            "Redeeming benefit"
        );

        let accepted = match self.backend.redeem(user_id, &benefit.id).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, benefit_id = %benefit.id, "Redemption failed");
                false
            }
        };

        let debit = {
            let mut modal = self.modals.entry(session.to_string()).or_default();
            modal.finish(accepted, self.redeem_policy)
        };

        if debit {
            if let Some(mut entry) = self.ledger.get_mut(user_id) {
                let (account, _) = entry.value_mut();
                if let Err(e) = account.debit(&benefit, &now_rfc3339()) {
                    // Only reachable if the balance moved under the lock
                    tracing::error!(error = %e, "Local debit refused after redemption");
                }
            }
        }

        Ok(self.snapshot(session, user_id))
    }

    /// Close the modal.
    pub fn dismiss(&self, session: &str) -> Result<RedemptionModal, AppError> {
        let mut modal = self.modals.entry(session.to_string()).or_default();
        modal.dismiss().map_err(modal_error)?;
        Ok(modal.value().clone())
    }

    /// Page state from local copies only; no network.
    pub fn snapshot(&self, session: &str, user_id: &str) -> WalletView {
        let (wallet, wallet_source) = self.offline_wallet(user_id);
        let balance = wallet.as_ref().map(|w| w.balance).unwrap_or(0);

        let catalog = self.catalog.load_full();

        WalletView {
            benefits: catalog
                .benefits
                .iter()
                .map(|benefit| BenefitView {
                    affordable: wallet.is_some() && balance >= benefit.coins_required,
                    benefit: benefit.clone(),
                })
                .collect(),
            benefits_source: catalog.source,
            wallet,
            wallet_source,
            banner: None,
            modal: self.modal(session),
        }
    }

    /// Last known wallet, or the fallback according to policy.
    fn offline_wallet(&self, user_id: &str) -> (Option<WalletAccount>, Source) {
        if let Some(entry) = self.ledger.get(user_id) {
            let (account, source) = entry.value();
            return (Some(account.clone()), *source);
        }

        match self.fallback {
            FallbackPolicy::Demo => {
                let account = WalletAccount::fallback(user_id, &now_rfc3339());
                self.ledger
                    .insert(user_id.to_string(), (account.clone(), Source::Fallback));
                (Some(account), Source::Fallback)
            }
            FallbackPolicy::Unavailable => (None, Source::Unavailable),
        }
    }

    fn remember_catalog(&self, benefits: &[Benefit], source: Source) {
        self.catalog.store(Arc::new(Catalog {
            benefits: benefits.to_vec(),
            source,
        }));
    }
}

fn modal_error(err: ModalError) -> AppError {
    match err {
        ModalError::Insufficient(e) => AppError::Validation(e.to_string()),
        other => AppError::BadRequest(other.to_string()),
    }
}
