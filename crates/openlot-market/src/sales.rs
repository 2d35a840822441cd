//! Keyed store of active sale listings.
//!
//! Per [`openlot_types::SaleKey`] the lifecycle is:
//!
//! ```text
//! absent → open (no bid) → open (bid) → absent
//! ```
//!
//! with bid/no-bid toggled only by `place_bid` and the accept path, and
//! the entry removed by exactly one of close / buy / accept-bid. The
//! registry stores and guards; all money movement belongs to the
//! settlement layer.

use std::collections::HashMap;

use openlot_types::{AccountId, Bid, OpenlotError, Result, Sale, SaleKey};

/// In-memory registry of all live listings.
#[derive(Debug, Clone, Default)]
pub struct SaleRegistry {
    sales: HashMap<SaleKey, Sale>,
}

impl SaleRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a listing.
    ///
    /// # Errors
    /// Returns `SaleNotFound` if no sale is listed under `key`.
    pub fn get(&self, key: SaleKey) -> Result<&Sale> {
        self.sales.get(&key).ok_or(OpenlotError::SaleNotFound(key))
    }

    #[must_use]
    pub fn contains(&self, key: SaleKey) -> bool {
        self.sales.contains_key(&key)
    }

    // =================================================================
    // Lifecycle
    // =================================================================

    /// List a new sale with no bid.
    ///
    /// # Errors
    /// Returns `SaleAlreadyExists` if the key is already listed.
    pub fn open(&mut self, key: SaleKey, sale: Sale) -> Result<()> {
        if self.sales.contains_key(&key) {
            return Err(OpenlotError::SaleAlreadyExists(key));
        }
        self.sales.insert(key, sale);
        Ok(())
    }

    /// Remove a listing, returning it.
    ///
    /// # Errors
    /// Returns `SaleNotFound` if no sale is listed under `key`.
    pub fn remove(&mut self, key: SaleKey) -> Result<Sale> {
        self.sales
            .remove(&key)
            .ok_or(OpenlotError::SaleNotFound(key))
    }

    /// Replace the sale's bid with a strictly better one, returning the
    /// displaced bid if there was one.
    ///
    /// # Errors
    /// - `SaleNotFound` if no sale is listed under `key`
    /// - `WorseBid` unless `bid.amount` strictly exceeds the current best
    pub fn place_bid(&mut self, key: SaleKey, bid: Bid) -> Result<Option<Bid>> {
        let sale = self
            .sales
            .get_mut(&key)
            .ok_or(OpenlotError::SaleNotFound(key))?;

        if let Some(best) = sale.bid {
            if bid.amount <= best.amount {
                return Err(OpenlotError::WorseBid {
                    offered: bid.amount,
                    best: best.amount,
                });
            }
            tracing::debug!(
                sale = %key,
                outbid = %best.bidder,
                old = %best.amount,
                new = %bid.amount,
                "Best bid displaced"
            );
        }
        Ok(sale.bid.replace(bid))
    }

    // =================================================================
    // Encumbrance
    // =================================================================

    /// The encumbrance predicate: true iff the sale exists, carries a bid,
    /// and that bid was placed by `account`. A receipt whose sale fails
    /// this test is claimable.
    #[must_use]
    pub fn is_winning_bidder(&self, key: SaleKey, account: &AccountId) -> bool {
        self.sales
            .get(&key)
            .and_then(|sale| sale.bid)
            .is_some_and(|bid| bid.bidder == *account)
    }

    // =================================================================
    // Utilities
    // =================================================================

    /// Number of live listings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sales.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }

    /// Iterate over all live listings.
    pub fn iter(&self) -> impl Iterator<Item = (&SaleKey, &Sale)> {
        self.sales.iter()
    }
}
