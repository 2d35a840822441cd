//! Per-bidder receipt book: the bid ledger.
//!
//! One ordered list of [`BidReceipt`]s per bidder, at most one receipt per
//! sale key. The book is a pure store: it reports what happened
//! ([`RecordOutcome`], [`RemoveOutcome`]) and the settlement layer applies
//! the matching storage debits and refunds, so pricing never leaks in here.

use std::collections::HashMap;

use openlot_types::{AccountId, BidReceipt, MicroAlgos, OpenlotError, Result, SaleKey};

/// What `record` did with the new receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// First receipt for this bidder: a new book entry was created and its
    /// storage reservation is owed.
    CreatedBook,
    /// The bidder already held a receipt for this sale; it was overwritten
    /// and the previous locked amount is refundable.
    Replaced { previous: MicroAlgos },
    /// Appended to an existing book, no receipt for this sale before.
    Appended,
}

/// What `remove` did with the receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveOutcome {
    /// The locked amount of the removed receipt.
    pub amount: MicroAlgos,
    /// True if the removed receipt was the last one and the whole book
    /// entry was deleted; its storage reservation is refundable.
    pub book_deleted: bool,
}

/// In-memory bid ledger: every bidder's receipts across all sales.
#[derive(Debug, Clone, Default)]
pub struct ReceiptBook {
    book: HashMap<AccountId, Vec<BidReceipt>>,
}

impl ReceiptBook {
    /// Create a new empty receipt book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A bidder's receipts, if they hold any.
    #[must_use]
    pub fn receipts(&self, bidder: &AccountId) -> Option<&[BidReceipt]> {
        self.book.get(bidder).map(Vec::as_slice)
    }

    /// Whether the bidder has a book entry at all.
    #[must_use]
    pub fn contains(&self, bidder: &AccountId) -> bool {
        self.book.contains_key(bidder)
    }

    // =================================================================
    // Mutation
    // =================================================================

    /// Record a receipt, collapsing to at most one per (bidder, sale key):
    /// an existing receipt for the same sale is overwritten, never
    /// duplicated.
    pub fn record(&mut self, bidder: AccountId, receipt: BidReceipt) -> RecordOutcome {
        match self.book.get_mut(&bidder) {
            None => {
                self.book.insert(bidder, vec![receipt]);
                RecordOutcome::CreatedBook
            }
            Some(receipts) => {
                if let Some(existing) = receipts
                    .iter_mut()
                    .find(|r| r.sale_key == receipt.sale_key)
                {
                    let previous = existing.amount;
                    *existing = receipt;
                    RecordOutcome::Replaced { previous }
                } else {
                    receipts.push(receipt);
                    RecordOutcome::Appended
                }
            }
        }
    }

    /// Remove the bidder's receipt for one sale, deleting the book entry
    /// when it was the last receipt.
    ///
    /// # Errors
    /// Returns `ReceiptNotFound` if the bidder holds no receipt for
    /// `sale_key`.
    pub fn remove(&mut self, bidder: AccountId, sale_key: SaleKey) -> Result<RemoveOutcome> {
        let receipts =
            self.book
                .get_mut(&bidder)
                .ok_or(OpenlotError::ReceiptNotFound { bidder, sale_key })?;

        let index = receipts
            .iter()
            .position(|r| r.sale_key == sale_key)
            .ok_or(OpenlotError::ReceiptNotFound { bidder, sale_key })?;

        let removed = receipts.remove(index);
        let book_deleted = receipts.is_empty();
        if book_deleted {
            self.book.remove(&bidder);
        }
        Ok(RemoveOutcome {
            amount: removed.amount,
            book_deleted,
        })
    }

    /// Store back a filtered receipt list; an empty list deletes the entry.
    pub fn replace(&mut self, bidder: AccountId, receipts: Vec<BidReceipt>) {
        if receipts.is_empty() {
            self.book.remove(&bidder);
        } else {
            self.book.insert(bidder, receipts);
        }
    }

    /// Delete the bidder's whole book entry.
    pub fn delete(&mut self, bidder: &AccountId) {
        self.book.remove(bidder);
    }

    // =================================================================
    // Utilities
    // =================================================================

    /// Sum of every receipt of every bidder, for conservation checks.
    #[must_use]
    pub fn total_locked(&self) -> MicroAlgos {
        MicroAlgos::saturating_sum(
            self.book
                .values()
                .flat_map(|receipts| receipts.iter().map(|r| r.amount)),
        )
    }

    /// Number of bidders with a book entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.book.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.book.is_empty()
    }
}
