//! Bid receipts and the settlement audit trail.
//!
//! A [`BidReceipt`] records money a bidder has locked against one sale's
//! best-bid slot. A receipt is *encumbered* while its bid is still the
//! winning bid on that sale; an unencumbered receipt is claimable back.
//!
//! A [`SettlementReceipt`] is an audit-trail entry: every successful
//! settlement operation appends exactly one, hash-chained to its
//! predecessor so the log is tamper-evident.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, MicroAlgos, SaleKey};

// ---------------------------------------------------------------------------
// BidReceipt
// ---------------------------------------------------------------------------

/// One bidder's locked bid against one sale.
///
/// Held in the receipt book under the bidder's account; at most one receipt
/// per (bidder, sale key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidReceipt {
    pub sale_key: SaleKey,
    pub amount: MicroAlgos,
}

impl BidReceipt {
    #[must_use]
    pub fn new(sale_key: SaleKey, amount: MicroAlgos) -> Self {
        Self { sale_key, amount }
    }
}

/// Result of the read-only bid totals query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidTotals {
    /// Sum of every receipt the bidder holds.
    pub total: MicroAlgos,
    /// Sum of the receipts that are no longer the winning bid.
    pub unencumbered: MicroAlgos,
}

// ---------------------------------------------------------------------------
// Settlement audit trail
// ---------------------------------------------------------------------------

/// The kind of settlement operation a receipt proves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReceiptKind {
    Deposited,
    Withdrawn,
    AssetSponsored,
    SaleOpened,
    SaleClosed,
    SaleBought,
    BidPlaced,
    BidAccepted,
    BidsClaimed,
}

impl std::fmt::Display for ReceiptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deposited => write!(f, "DEPOSITED"),
            Self::Withdrawn => write!(f, "WITHDRAWN"),
            Self::AssetSponsored => write!(f, "ASSET_SPONSORED"),
            Self::SaleOpened => write!(f, "SALE_OPENED"),
            Self::SaleClosed => write!(f, "SALE_CLOSED"),
            Self::SaleBought => write!(f, "SALE_BOUGHT"),
            Self::BidPlaced => write!(f, "BID_PLACED"),
            Self::BidAccepted => write!(f, "BID_ACCEPTED"),
            Self::BidsClaimed => write!(f, "BIDS_CLAIMED"),
        }
    }
}

/// One entry of the append-only settlement audit trail.
///
/// `digest` is SHA-256 over the serialized entry body plus `prev_digest`,
/// so each receipt commits to the whole history before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    /// Position in the log, starting at 0.
    pub seq: u64,
    pub kind: ReceiptKind,
    /// The account whose operation produced this receipt.
    pub actor: AccountId,
    /// The sale involved, if the operation targeted one.
    pub sale_key: Option<SaleKey>,
    /// Principal amount moved by the operation (zero for pure queries).
    pub amount: MicroAlgos,
    /// Digest of the previous receipt (all-zero for the first entry).
    pub prev_digest: [u8; 32],
    /// Digest of this receipt.
    pub digest: [u8; 32],
    pub issued_at: DateTime<Utc>,
}
