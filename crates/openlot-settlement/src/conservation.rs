//! Custody conservation invariant checker.
//!
//! Mathematical invariant enforced after every committed group:
//! ```text
//! Σ(deposits) − Σ(withdrawals) ==
//!     Σ(balances) + Σ(locked bid receipts) + Σ(outstanding storage reservations)
//! ```
//!
//! Storage debits and credits always come in matched create/destroy pairs,
//! and purchases only move money between balances, so nothing but real
//! external deposits and withdrawals may change the custodial total. If
//! this ever breaks, something has gone catastrophically wrong, and the check
//! is the ultimate safety net, not a business rule.

use openlot_types::{MicroAlgos, OpenlotError, Result};

/// Running tally of external microalgo flows since genesis.
///
/// Tallies are `u128` so they cannot realistically overflow even over an
/// unbounded operation history.
#[derive(Debug, Clone, Copy, Default)]
pub struct Conservation {
    deposits: u128,
    withdrawals: u128,
}

impl Conservation {
    /// Create a new tracker with zero flows.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an external deposit into custody.
    pub fn record_deposit(&mut self, amount: MicroAlgos) {
        self.deposits += u128::from(amount.raw());
    }

    /// Record an external withdrawal out of custody.
    pub fn record_withdrawal(&mut self, amount: MicroAlgos) {
        self.withdrawals += u128::from(amount.raw());
    }

    /// Expected custodial holdings: deposits − withdrawals.
    ///
    /// # Errors
    /// Returns `ConservationViolation` if more has been withdrawn than was
    /// ever deposited, impossible unless the ledger is already corrupt.
    pub fn expected_custody(&self) -> Result<u128> {
        self.deposits.checked_sub(self.withdrawals).ok_or_else(|| {
            OpenlotError::ConservationViolation {
                reason: format!(
                    "withdrawals {} exceed deposits {}",
                    self.withdrawals, self.deposits
                ),
            }
        })
    }

    /// Verify that the actual custodial holdings match the expected value.
    ///
    /// # Errors
    /// Returns `ConservationViolation` if actual ≠ expected.
    pub fn verify(&self, actual: u128) -> Result<()> {
        let expected = self.expected_custody()?;
        if actual != expected {
            return Err(OpenlotError::ConservationViolation {
                reason: format!(
                    "actual custody {actual} != expected {expected} \
                     (deposits={}, withdrawals={})",
                    self.deposits, self.withdrawals
                ),
            });
        }
        Ok(())
    }

    /// Total external deposits since genesis.
    #[must_use]
    pub fn total_deposits(&self) -> u128 {
        self.deposits
    }

    /// Total external withdrawals since genesis.
    #[must_use]
    pub fn total_withdrawals(&self) -> u128 {
        self.withdrawals
    }
}
