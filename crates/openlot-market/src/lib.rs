//! # openlot-market
//!
//! **Market plane**: the sale registry and the bid ledger.
//!
//! ## Architecture
//!
//! 1. **SaleRegistry**: keyed store of live listings, each carrying at most
//!    one current best bid, with the per-key lifecycle
//!    `absent → open (no bid) → open (bid) → absent`.
//! 2. **ReceiptBook**: per-bidder lists of locked bid receipts, at most one
//!    receipt per (bidder, sale): the record a bidder later uses to
//!    reclaim money for bids that are no longer winning.
//!
//! Both stores are pure state: they enforce structural invariants and
//! report outcomes; every balance movement they imply is applied by the
//! settlement layer in the same atomic operation.

pub mod receipts;
pub mod sales;

pub use receipts::{ReceiptBook, RecordOutcome, RemoveOutcome};
pub use sales::SaleRegistry;
