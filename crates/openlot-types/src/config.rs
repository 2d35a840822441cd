//! Policy configuration for the settlement core.
//!
//! The marketplace semantics hardened over time: self-dealing guards and
//! bid-exclusive destruction were added late, and close-out withdrawal has
//! both a drain-everything and a require-exact interpretation. Rather than
//! baking one snapshot in, the differences are explicit policy flags with
//! the hardened behavior as the default.

use serde::{Deserialize, Serialize};

/// How a close-out withdrawal treats the remaining balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseoutPolicy {
    /// The requested amount must equal the full remaining balance;
    /// anything else fails with `BalanceNotEmpty`.
    RequireExact,
    /// Pay out the entire remaining balance regardless of the requested
    /// amount.
    DrainAll,
}

/// Whether a withdrawal is ordinary or closes the account out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WithdrawMode {
    /// Debit the requested amount, keep the account.
    Partial,
    /// Remove the account's balance entry per the [`CloseoutPolicy`].
    CloseOut,
}

/// Tunable marketplace rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketPolicy {
    /// Reject sellers buying or bidding on their own listings.
    pub forbid_self_dealing: bool,
    /// Refuse `buy` and `close_sale` while a live bid exists. When false,
    /// the sale is destroyed anyway and the displaced receipt becomes
    /// unencumbered (claimable).
    pub strict_bid_exclusivity: bool,
    /// Close-out withdrawal behavior.
    pub closeout: CloseoutPolicy,
}

impl MarketPolicy {
    /// The hardened rule set: self-dealing rejected, bid-exclusive
    /// destruction, exact-amount close-out.
    #[must_use]
    pub fn hardened() -> Self {
        Self {
            forbid_self_dealing: true,
            strict_bid_exclusivity: true,
            closeout: CloseoutPolicy::RequireExact,
        }
    }

    /// The permissive rule set of the early marketplace snapshots.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            forbid_self_dealing: false,
            strict_bid_exclusivity: false,
            closeout: CloseoutPolicy::DrainAll,
        }
    }
}

impl Default for MarketPolicy {
    fn default() -> Self {
        Self::hardened()
    }
}
