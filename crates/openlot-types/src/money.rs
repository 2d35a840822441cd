//! Exact money arithmetic in microunits.
//!
//! Every balance, cost, bid, and storage reservation is an unsigned integer
//! number of microalgos. There is no fractional representation and no
//! rounding anywhere in the core: a debit that would go below zero is the
//! single arithmetic failure mode, surfaced as `InsufficientFunds` by the
//! ledger. This type deliberately offers only checked arithmetic: callers
//! handle `None` instead of relying on panicking operators.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An amount of microalgos (1 algo = 1_000_000 microalgos).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MicroAlgos(pub u64);

impl MicroAlgos {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    /// Whole algos, for readable test fixtures.
    #[must_use]
    pub const fn from_algos(algos: u64) -> Self {
        Self(algos * 1_000_000)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    #[must_use]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    #[must_use]
    pub fn checked_mul(self, rhs: u64) -> Option<Self> {
        self.0.checked_mul(rhs).map(Self)
    }

    /// Saturating sum of an iterator of amounts. Used for read-only totals
    /// where a saturated answer is preferable to an error path.
    #[must_use]
    pub fn saturating_sum<I: IntoIterator<Item = Self>>(amounts: I) -> Self {
        Self(
            amounts
                .into_iter()
                .fold(0u64, |acc, a| acc.saturating_add(a.0)),
        )
    }
}

impl fmt::Display for MicroAlgos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}µ", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_construction() {
        assert!(MicroAlgos::ZERO.is_zero());
        assert_eq!(MicroAlgos::from_algos(5), MicroAlgos::new(5_000_000));
        assert_eq!(MicroAlgos::new(123).raw(), 123);
    }

    #[test]
    fn checked_add_detects_overflow() {
        let a = MicroAlgos::new(u64::MAX);
        assert_eq!(a.checked_add(MicroAlgos::new(1)), None);
        assert_eq!(
            MicroAlgos::new(2).checked_add(MicroAlgos::new(3)),
            Some(MicroAlgos::new(5))
        );
    }

    #[test]
    fn checked_sub_detects_underflow() {
        assert_eq!(MicroAlgos::new(2).checked_sub(MicroAlgos::new(3)), None);
        assert_eq!(
            MicroAlgos::new(3).checked_sub(MicroAlgos::new(2)),
            Some(MicroAlgos::new(1))
        );
    }

    #[test]
    fn saturating_sum_caps_at_max() {
        let total = MicroAlgos::saturating_sum([
            MicroAlgos::new(u64::MAX),
            MicroAlgos::new(10),
        ]);
        assert_eq!(total, MicroAlgos::new(u64::MAX));

        let total = MicroAlgos::saturating_sum([
            MicroAlgos::new(1),
            MicroAlgos::new(2),
            MicroAlgos::new(3),
        ]);
        assert_eq!(total, MicroAlgos::new(6));
    }

    #[test]
    fn ordering_is_numeric() {
        assert!(MicroAlgos::new(4_000_000) < MicroAlgos::new(4_000_001));
    }

    #[test]
    fn serde_is_transparent() {
        let amount = MicroAlgos::new(42_900);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "42900");
        let back: MicroAlgos = serde_json::from_str(&json).unwrap();
        assert_eq!(amount, back);
    }
}
