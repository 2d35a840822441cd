//! Hash-chained settlement audit trail.
//!
//! Every successful settlement operation appends exactly one
//! [`SettlementReceipt`]. Each receipt's digest is SHA-256 over its
//! serialized body plus the previous receipt's digest, so the log commits
//! to its whole history and [`ReceiptLog::verify_chain`] detects any
//! tampering or reordering.

use chrono::{DateTime, Utc};
use openlot_types::{AccountId, MicroAlgos, ReceiptKind, Result, SaleKey, SettlementReceipt};
use sha2::{Digest, Sha256};

/// Digest an empty log chains from.
pub const GENESIS_DIGEST: [u8; 32] = [0u8; 32];

/// Append-only, hash-chained log of settlement receipts.
#[derive(Debug, Clone, Default)]
pub struct ReceiptLog {
    receipts: Vec<SettlementReceipt>,
}

impl ReceiptLog {
    /// Create a new empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Digest of the newest receipt, or the genesis digest when empty.
    #[must_use]
    pub fn head_digest(&self) -> [u8; 32] {
        self.receipts
            .last()
            .map_or(GENESIS_DIGEST, |receipt| receipt.digest)
    }

    /// Append a receipt for a completed operation.
    ///
    /// # Errors
    /// Returns `Serialization` if the receipt body cannot be serialized
    /// for hashing.
    pub fn append(
        &mut self,
        kind: ReceiptKind,
        actor: AccountId,
        sale_key: Option<SaleKey>,
        amount: MicroAlgos,
    ) -> Result<SettlementReceipt> {
        let seq = self.receipts.len() as u64;
        let prev_digest = self.head_digest();
        let issued_at = Utc::now();
        let digest =
            entry_digest(seq, kind, actor, sale_key, amount, prev_digest, issued_at)?;

        let receipt = SettlementReceipt {
            seq,
            kind,
            actor,
            sale_key,
            amount,
            prev_digest,
            digest,
            issued_at,
        };
        self.receipts.push(receipt.clone());
        Ok(receipt)
    }

    /// Recompute every digest and chain link. Returns false if any receipt
    /// was altered, inserted, or reordered after the fact.
    #[must_use]
    pub fn verify_chain(&self) -> bool {
        let mut prev = GENESIS_DIGEST;
        for (i, receipt) in self.receipts.iter().enumerate() {
            if receipt.seq != i as u64 || receipt.prev_digest != prev {
                return false;
            }
            let Ok(expected) = entry_digest(
                receipt.seq,
                receipt.kind,
                receipt.actor,
                receipt.sale_key,
                receipt.amount,
                receipt.prev_digest,
                receipt.issued_at,
            ) else {
                return false;
            };
            if receipt.digest != expected {
                return false;
            }
            prev = receipt.digest;
        }
        true
    }

    /// Number of receipts in the log.
    #[must_use]
    pub fn len(&self) -> usize {
        self.receipts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receipts.is_empty()
    }

    /// The newest receipt, if any.
    #[must_use]
    pub fn last(&self) -> Option<&SettlementReceipt> {
        self.receipts.last()
    }

    /// Iterate over all receipts in append order.
    pub fn iter(&self) -> impl Iterator<Item = &SettlementReceipt> {
        self.receipts.iter()
    }
}

fn entry_digest(
    seq: u64,
    kind: ReceiptKind,
    actor: AccountId,
    sale_key: Option<SaleKey>,
    amount: MicroAlgos,
    prev_digest: [u8; 32],
    issued_at: DateTime<Utc>,
) -> Result<[u8; 32]> {
    let body = serde_json::to_vec(&(seq, kind, actor, sale_key, amount, issued_at))?;
    let mut hasher = Sha256::new();
    hasher.update(b"openlot:receipt:v1:");
    hasher.update(prev_digest);
    hasher.update(&body);
    Ok(hasher.finalize().into())
}
