//! The host-environment boundary.
//!
//! The settlement core never moves real funds itself. Inbound value arrives
//! as already-executed grouped transfers ([`Payment`], [`AssetTransfer`])
//! whose shape the core verifies before trusting; outbound value leaves as
//! [`HostEffect`]s handed back to the host, which applies the whole bundle
//! atomically or not at all.
//!
//! [`SimHost`] is a deterministic in-memory host used by integration tests:
//! it tracks external balances and asset opt-ins, refuses asset delivery to
//! accounts that have not opted in, and applies effect bundles with the
//! same all-or-nothing guarantee the real host provides.

use std::collections::{HashMap, HashSet};

use openlot_types::{AccountId, AssetId, MicroAlgos, OpenlotError, Result};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Inbound transfer shapes
// ---------------------------------------------------------------------------

/// A grouped payment the host has already executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub sender: AccountId,
    pub receiver: AccountId,
    pub amount: MicroAlgos,
}

/// A grouped asset transfer the host has already executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTransfer {
    pub sender: AccountId,
    pub asset: AssetId,
    pub receiver: AccountId,
    /// Quantity of asset units transferred.
    pub amount: u64,
}

/// Asset metadata the host supplies for sponsorship checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetParams {
    /// Clawback authority, if the asset has one configured.
    pub clawback: Option<AccountId>,
}

// ---------------------------------------------------------------------------
// Outbound effects
// ---------------------------------------------------------------------------

/// An outward fund or asset movement the host must perform.
///
/// Each settlement operation produces at most one effect; a group's
/// effects are released together and only if every operation committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostEffect {
    /// Pay microalgos out of custody.
    PayOut { to: AccountId, amount: MicroAlgos },
    /// Transfer escrowed asset units out of custody.
    AssetOut {
        asset: AssetId,
        to: AccountId,
        amount: u64,
    },
    /// Zero-amount self-acceptance establishing custody of an asset.
    AssetOptIn { asset: AssetId },
}

// ---------------------------------------------------------------------------
// SimHost
// ---------------------------------------------------------------------------

/// Deterministic in-memory host environment.
#[derive(Debug, Clone)]
pub struct SimHost {
    /// The settlement core's custodial address.
    custody: AccountId,
    /// External microalgo balances, custody's included.
    algos: HashMap<AccountId, MicroAlgos>,
    /// External asset holdings.
    assets: HashMap<(AccountId, AssetId), u64>,
    /// Which accounts accept which assets.
    opted_in: HashSet<(AccountId, AssetId)>,
}

impl SimHost {
    #[must_use]
    pub fn new(custody: AccountId) -> Self {
        Self {
            custody,
            algos: HashMap::new(),
            assets: HashMap::new(),
            opted_in: HashSet::new(),
        }
    }

    #[must_use]
    pub fn custody(&self) -> AccountId {
        self.custody
    }

    // =================================================================
    // Test fixture setup
    // =================================================================

    /// Mint external microalgos into an account.
    pub fn fund(&mut self, account: AccountId, amount: MicroAlgos) {
        let entry = self.algos.entry(account).or_insert(MicroAlgos::ZERO);
        *entry = MicroAlgos::saturating_sum([*entry, amount]);
    }

    /// Opt an account into an asset so it can receive units.
    pub fn opt_in(&mut self, account: AccountId, asset: AssetId) {
        self.opted_in.insert((account, asset));
    }

    /// Mint asset units into an account (opting it in as the issuer).
    pub fn mint_asset(&mut self, account: AccountId, asset: AssetId, amount: u64) {
        self.opt_in(account, asset);
        *self.assets.entry((account, asset)).or_insert(0) += amount;
    }

    // =================================================================
    // Inbound transfers
    // =================================================================

    /// Execute a payment from `sender` into custody, returning the
    /// [`Payment`] shape the settlement core validates.
    ///
    /// # Errors
    /// Returns `HostTransferRejected` if the sender lacks the funds.
    pub fn pay_to_custody(&mut self, sender: AccountId, amount: MicroAlgos) -> Result<Payment> {
        let balance = self.algo_balance(&sender);
        let remaining =
            balance
                .checked_sub(amount)
                .ok_or_else(|| OpenlotError::HostTransferRejected {
                    reason: format!("{sender} cannot pay {amount}, holds {balance}"),
                })?;
        self.algos.insert(sender, remaining);
        self.fund(self.custody, amount);
        Ok(Payment {
            sender,
            receiver: self.custody,
            amount,
        })
    }

    /// Execute an asset transfer from `sender` into custody, returning the
    /// [`AssetTransfer`] shape the settlement core validates.
    ///
    /// # Errors
    /// Returns `HostTransferRejected` if custody has not opted in or the
    /// sender lacks the units.
    pub fn transfer_asset_to_custody(
        &mut self,
        sender: AccountId,
        asset: AssetId,
        amount: u64,
    ) -> Result<AssetTransfer> {
        let custody = self.custody;
        if !self.is_opted_in(&custody, asset) {
            return Err(OpenlotError::HostTransferRejected {
                reason: format!("custody has not opted in to {asset}"),
            });
        }
        let held = self.asset_balance(&sender, asset);
        let remaining = held
            .checked_sub(amount)
            .ok_or_else(|| OpenlotError::HostTransferRejected {
                reason: format!("{sender} holds {held} of {asset}, cannot send {amount}"),
            })?;
        self.assets.insert((sender, asset), remaining);
        *self.assets.entry((self.custody, asset)).or_insert(0) += amount;
        Ok(AssetTransfer {
            sender,
            asset,
            receiver: self.custody,
            amount,
        })
    }

    // =================================================================
    // Outbound effects
    // =================================================================

    /// Apply a bundle of effects atomically: either every effect lands or
    /// none does.
    ///
    /// # Errors
    /// Returns `HostTransferRejected` if any effect is undeliverable
    /// (custody short of funds/units, or the recipient not opted in).
    pub fn apply_effects(&mut self, effects: &[HostEffect]) -> Result<()> {
        let mut staged = self.clone();
        for effect in effects {
            staged.apply_one(*effect)?;
        }
        *self = staged;
        Ok(())
    }

    fn apply_one(&mut self, effect: HostEffect) -> Result<()> {
        match effect {
            HostEffect::PayOut { to, amount } => {
                let custody = self.custody;
                let held = self.algo_balance(&custody);
                let remaining =
                    held.checked_sub(amount)
                        .ok_or_else(|| OpenlotError::HostTransferRejected {
                            reason: format!("custody holds {held}, cannot pay out {amount}"),
                        })?;
                self.algos.insert(custody, remaining);
                self.fund(to, amount);
            }
            HostEffect::AssetOut { asset, to, amount } => {
                if !self.is_opted_in(&to, asset) {
                    return Err(OpenlotError::HostTransferRejected {
                        reason: format!("{to} has not opted in to {asset}"),
                    });
                }
                let custody = self.custody;
                let held = self.asset_balance(&custody, asset);
                let remaining =
                    held.checked_sub(amount)
                        .ok_or_else(|| OpenlotError::HostTransferRejected {
                            reason: format!(
                                "custody holds {held} of {asset}, cannot send {amount}"
                            ),
                        })?;
                self.assets.insert((custody, asset), remaining);
                *self.assets.entry((to, asset)).or_insert(0) += amount;
            }
            HostEffect::AssetOptIn { asset } => {
                self.opted_in.insert((self.custody, asset));
            }
        }
        Ok(())
    }

    // =================================================================
    // Queries
    // =================================================================

    #[must_use]
    pub fn algo_balance(&self, account: &AccountId) -> MicroAlgos {
        self.algos
            .get(account)
            .copied()
            .unwrap_or(MicroAlgos::ZERO)
    }

    #[must_use]
    pub fn asset_balance(&self, account: &AccountId, asset: AssetId) -> u64 {
        self.assets.get(&(*account, asset)).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn is_opted_in(&self, account: &AccountId, asset: AssetId) -> bool {
        self.opted_in.contains(&(*account, asset))
    }
}
