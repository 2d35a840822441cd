//! Error types for the OpenLot settlement core.
//!
//! All errors use the `OL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Balance errors
//! - 2xx: Transaction shape errors
//! - 3xx: Sale errors
//! - 4xx: Bid errors
//! - 5xx: Asset sponsorship errors
//! - 6xx: Settlement / conservation errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{AccountId, AssetId, MicroAlgos, SaleKey};

/// Central error enum for all OpenLot operations.
///
/// Every error aborts the entire enclosing operation (and, through the
/// group boundary, the whole atomic batch); nothing is retried internally.
#[derive(Debug, Error)]
pub enum OpenlotError {
    // =================================================================
    // Balance Errors (1xx)
    // =================================================================
    /// A debit would drive the balance below zero.
    #[error("OL_ERR_100: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds {
        needed: MicroAlgos,
        available: MicroAlgos,
    },

    /// Close-out attempted with a nonzero remaining balance.
    #[error("OL_ERR_101: Balance not empty: {remaining} still deposited")]
    BalanceNotEmpty { remaining: MicroAlgos },

    /// A credit would overflow the balance representation.
    #[error("OL_ERR_102: Amount overflow")]
    AmountOverflow,

    // =================================================================
    // Transaction Shape Errors (2xx)
    // =================================================================
    /// The grouped transfer's sender is not the operation's caller.
    #[error("OL_ERR_200: Different sender: transfer sent by {actual}, operation called by {expected}")]
    DifferentSender {
        expected: AccountId,
        actual: AccountId,
    },

    /// The grouped transfer does not pay the custodial address.
    #[error("OL_ERR_201: Wrong receiver: {0}")]
    WrongReceiver(AccountId),

    // =================================================================
    // Sale Errors (3xx)
    // =================================================================
    /// No sale is listed under this key.
    #[error("OL_ERR_300: Sale not found: {0}")]
    SaleNotFound(SaleKey),

    /// A sale is already listed under this key.
    #[error("OL_ERR_301: Sale already exists: {0}")]
    SaleAlreadyExists(SaleKey),

    /// The sale carries a live bid and the operation excludes one.
    #[error("OL_ERR_302: Sale has a live bid: {0}")]
    SaleHasLiveBid(SaleKey),

    /// Self-dealing guard: a seller may not buy their own listing.
    #[error("OL_ERR_303: Seller cannot be buyer: {0}")]
    SellerCannotBeBuyer(SaleKey),

    /// `accept_bid` called on a sale with no bid to accept.
    #[error("OL_ERR_304: No bid to accept: {0}")]
    NoBidToAccept(SaleKey),

    // =================================================================
    // Bid Errors (4xx)
    // =================================================================
    /// The new bid does not strictly exceed the current best.
    #[error("OL_ERR_400: Worse bid: offered {offered}, current best {best}")]
    WorseBid {
        offered: MicroAlgos,
        best: MicroAlgos,
    },

    /// Self-dealing guard: a seller may not bid on their own listing.
    #[error("OL_ERR_401: Seller cannot be bidder: {0}")]
    SellerCannotBeBidder(SaleKey),

    /// No receipt under this (bidder, sale key) pair.
    #[error("OL_ERR_402: Bid receipt not found: bidder {bidder}, {sale_key}")]
    ReceiptNotFound {
        bidder: AccountId,
        sale_key: SaleKey,
    },

    // =================================================================
    // Asset Sponsorship Errors (5xx)
    // =================================================================
    /// The custodial account already holds this asset.
    #[error("OL_ERR_500: Already opted in: {0}")]
    AlreadyOptedIn(AssetId),

    /// The asset has a clawback address configured and cannot be escrowed.
    #[error("OL_ERR_501: Clawback asset refused: {0}")]
    ClawbackAsset(AssetId),

    // =================================================================
    // Settlement Errors (6xx)
    // =================================================================
    /// Custody conservation invariant violated. Critical safety alert.
    #[error("OL_ERR_600: Conservation violation: {reason}")]
    ConservationViolation { reason: String },

    /// The host refused an outward transfer (e.g. recipient not opted in).
    #[error("OL_ERR_601: Host transfer rejected: {reason}")]
    HostTransferRejected { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error (broken invariant).
    #[error("OL_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization error while building an audit receipt.
    #[error("OL_ERR_901: Serialization error: {0}")]
    Serialization(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, OpenlotError>;

impl From<serde_json::Error> for OpenlotError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(n: u8) -> AccountId {
        AccountId([n; 32])
    }

    #[test]
    fn error_display_contains_prefix() {
        let err = OpenlotError::SaleNotFound(SaleKey::new(acct(1), AssetId(3)));
        let msg = format!("{err}");
        assert!(msg.starts_with("OL_ERR_300"), "Got: {msg}");
    }

    #[test]
    fn insufficient_funds_display() {
        let err = OpenlotError::InsufficientFunds {
            needed: MicroAlgos::new(100),
            available: MicroAlgos::new(50),
        };
        let msg = format!("{err}");
        assert!(msg.contains("OL_ERR_100"));
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn worse_bid_display() {
        let err = OpenlotError::WorseBid {
            offered: MicroAlgos::new(4_000_000),
            best: MicroAlgos::new(4_000_001),
        };
        let msg = format!("{err}");
        assert!(msg.contains("OL_ERR_400"));
        assert!(msg.contains("4000000"));
        assert!(msg.contains("4000001"));
    }

    #[test]
    fn all_errors_have_ol_err_prefix() {
        let key = SaleKey::new(acct(1), AssetId(1));
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(OpenlotError::AmountOverflow),
            Box::new(OpenlotError::BalanceNotEmpty {
                remaining: MicroAlgos::new(1),
            }),
            Box::new(OpenlotError::SaleHasLiveBid(key)),
            Box::new(OpenlotError::SellerCannotBeBidder(key)),
            Box::new(OpenlotError::AlreadyOptedIn(AssetId(9))),
            Box::new(OpenlotError::Internal("test".into())),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("OL_ERR_"),
                "Error missing OL_ERR_ prefix: {msg}"
            );
        }
    }
}
