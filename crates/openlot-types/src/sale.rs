//! Sale listings and their optional best bid.

use serde::{Deserialize, Serialize};

use crate::{AccountId, MicroAlgos};

/// The current best bid on a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub bidder: AccountId,
    pub amount: MicroAlgos,
}

impl Bid {
    #[must_use]
    pub fn new(bidder: AccountId, amount: MicroAlgos) -> Self {
        Self { bidder, amount }
    }
}

/// A live listing.
///
/// `amount` is the quantity of the asset held in escrow for this sale and
/// `cost` the fixed purchase price. At most one bid is live at any time;
/// `place_bid` only ever replaces it with a strictly better one.
///
/// A `Sale` exists in the registry exactly as long as its escrowed asset has
/// not been transferred out: `close_sale`, `buy`, and `accept_bid` each move
/// the escrow out exactly once and remove the entry in the same operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    /// Quantity of the asset escrowed for this listing.
    pub amount: u64,
    /// Fixed purchase price.
    pub cost: MicroAlgos,
    /// Current best bid, if any.
    pub bid: Option<Bid>,
}

impl Sale {
    /// A fresh listing with no bid.
    #[must_use]
    pub fn open(amount: u64, cost: MicroAlgos) -> Self {
        Self {
            amount,
            cost,
            bid: None,
        }
    }

    #[must_use]
    pub fn has_bid(&self) -> bool {
        self.bid.is_some()
    }

    /// Amount of the current best bid, zero when there is none.
    #[must_use]
    pub fn best_bid_amount(&self) -> MicroAlgos {
        self.bid.map_or(MicroAlgos::ZERO, |b| b.amount)
    }
}
