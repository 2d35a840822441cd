//! Custodial balance ledger.
//!
//! Tracks every principal's deposited balance in exact microunits. All
//! amounts are unsigned, so a debit that would go below zero is the single
//! failure mode, the most load-bearing invariant in the whole system.
//! Multi-legged operations (a refund and a debit in the same settlement
//! step) go through [`BalanceLedger::adjust`], which checks feasibility
//! with checked arithmetic before touching the entry, so a failed leg
//! never leaves a partial write behind.

use std::collections::HashMap;

use openlot_types::{AccountId, MicroAlgos, OpenlotError, Result};

/// In-memory ledger of per-account custodial balances.
#[derive(Debug, Clone, Default)]
pub struct BalanceLedger {
    balances: HashMap<AccountId, MicroAlgos>,
}

impl BalanceLedger {
    /// Create a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance of an account. Zero if the account has never
    /// deposited.
    #[must_use]
    pub fn balance(&self, account: &AccountId) -> MicroAlgos {
        self.balances
            .get(account)
            .copied()
            .unwrap_or(MicroAlgos::ZERO)
    }

    /// Whether the account has a ledger entry at all.
    #[must_use]
    pub fn contains(&self, account: &AccountId) -> bool {
        self.balances.contains_key(account)
    }

    // =================================================================
    // Core operations
    // =================================================================

    /// Credit an amount, creating the entry on first use.
    ///
    /// # Errors
    /// Returns `AmountOverflow` if the balance would exceed `u64::MAX`.
    pub fn credit(&mut self, account: AccountId, amount: MicroAlgos) -> Result<()> {
        let entry = self.balances.entry(account).or_insert(MicroAlgos::ZERO);
        *entry = entry
            .checked_add(amount)
            .ok_or(OpenlotError::AmountOverflow)?;
        Ok(())
    }

    /// Debit an amount.
    ///
    /// # Errors
    /// Returns `InsufficientFunds` if the debit would go below zero.
    pub fn debit(&mut self, account: AccountId, amount: MicroAlgos) -> Result<()> {
        let available = self.balance(&account);
        let Some(remaining) = available.checked_sub(amount) else {
            tracing::warn!(
                account = %account,
                needed = %amount,
                available = %available,
                "Debit refused: would go negative"
            );
            return Err(OpenlotError::InsufficientFunds {
                needed: amount,
                available,
            });
        };
        self.balances.insert(account, remaining);
        Ok(())
    }

    /// Apply a credit and a debit to the same account as one atomic step.
    ///
    /// Feasibility is checked against `balance + credit` before anything
    /// is written, so a bid replacement nets out correctly: the refund of
    /// the displaced bid counts toward funding the new one.
    ///
    /// # Errors
    /// - `AmountOverflow` if `balance + credit` overflows
    /// - `InsufficientFunds` if the debit exceeds `balance + credit`
    pub fn adjust(
        &mut self,
        account: AccountId,
        credit: MicroAlgos,
        debit: MicroAlgos,
    ) -> Result<()> {
        let current = self.balance(&account);
        let funded = current
            .checked_add(credit)
            .ok_or(OpenlotError::AmountOverflow)?;
        let remaining = funded
            .checked_sub(debit)
            .ok_or(OpenlotError::InsufficientFunds {
                needed: debit,
                available: funded,
            })?;
        self.balances.insert(account, remaining);
        Ok(())
    }

    // =================================================================
    // Close-out
    // =================================================================

    /// Remove an account's entry, requiring the balance be exactly zero.
    ///
    /// # Errors
    /// Returns `BalanceNotEmpty` if anything remains deposited.
    pub fn close(&mut self, account: AccountId) -> Result<()> {
        let remaining = self.balance(&account);
        if !remaining.is_zero() {
            return Err(OpenlotError::BalanceNotEmpty { remaining });
        }
        self.balances.remove(&account);
        Ok(())
    }

    /// Remove an account's entry and return whatever was in it.
    #[must_use]
    pub fn drain(&mut self, account: AccountId) -> MicroAlgos {
        self.balances.remove(&account).unwrap_or(MicroAlgos::ZERO)
    }

    // =================================================================
    // Utilities
    // =================================================================

    /// Sum of all balances, for conservation checks.
    #[must_use]
    pub fn total(&self) -> MicroAlgos {
        MicroAlgos::saturating_sum(self.balances.values().copied())
    }

    /// Number of accounts with a ledger entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}
