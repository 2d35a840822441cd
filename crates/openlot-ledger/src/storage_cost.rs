//! Storage-cost accountant.
//!
//! Every variable-size record a principal causes to exist carries a storage
//! reservation: a flat fee plus a per-byte fee over the record's key+value
//! layout. The reservation is debited from the responsible account on
//! creation and credited back when the record is destroyed, to whichever
//! account triggers the deletion (not necessarily the creator).
//!
//! [`StorageSchedule`] is the single source of truth for these prices;
//! nothing else in the workspace computes a reservation inline.
//!
//! Billing regime: the sale box has a fixed layout (the one optional bid
//! slot is part of its base price) and the receipt book is charged its
//! worst-case size once, up front, regardless of how many receipts it
//! actually holds.

use openlot_types::constants::{
    ASSET_OPT_IN_MBR, BOX_BYTE_MBR, BOX_FLAT_MBR, RECEIPT_BOOK_KEY_BYTES,
    RECEIPT_BOOK_MAX_VALUE_BYTES, SALE_KEY_BYTES, SALE_KEY_PREFIX_LEN, SALE_VALUE_BYTES,
};
use openlot_types::MicroAlgos;
use serde::{Deserialize, Serialize};

/// Deterministic reservation pricing derived from box geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSchedule {
    /// Flat fee per box.
    pub flat: u64,
    /// Fee per byte of key + value.
    pub per_byte: u64,
    /// Length of the sale box key-prefix (domain separator).
    pub sale_key_prefix_len: u64,
}

impl StorageSchedule {
    /// The host chain's current pricing.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            flat: BOX_FLAT_MBR,
            per_byte: BOX_BYTE_MBR,
            sale_key_prefix_len: SALE_KEY_PREFIX_LEN,
        }
    }

    /// Reservation for one sale box: prefixed key, amount and cost fields,
    /// and the single optional bid slot.
    #[must_use]
    pub fn sale_box_cost(&self) -> MicroAlgos {
        let bytes = self.sale_key_prefix_len + SALE_KEY_BYTES + SALE_VALUE_BYTES;
        MicroAlgos::new(self.flat + self.per_byte * bytes)
    }

    /// Reservation for one bidder's receipt book, priced at its worst-case
    /// size. Charged once when the book is created, refunded in full when
    /// the last receipt is removed.
    #[must_use]
    pub fn receipt_book_cost(&self) -> MicroAlgos {
        let bytes = RECEIPT_BOOK_KEY_BYTES + RECEIPT_BOOK_MAX_VALUE_BYTES;
        MicroAlgos::new(self.flat + self.per_byte * bytes)
    }

    /// Fixed reservation for the custodial account's opt-in to one asset.
    /// Not refundable: the opt-in persists for the life of the system.
    #[must_use]
    pub fn asset_opt_in_cost(&self) -> MicroAlgos {
        MicroAlgos::new(ASSET_OPT_IN_MBR)
    }
}

impl Default for StorageSchedule {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_box_cost_exact_figure() {
        let schedule = StorageSchedule::standard();
        // 2_500 + 400 * (5 + 40 + 56)
        assert_eq!(schedule.sale_box_cost(), MicroAlgos::new(42_900));
    }

    #[test]
    fn receipt_book_cost_exact_figure() {
        let schedule = StorageSchedule::standard();
        // 2_500 + 400 * (64 + 32_768)
        assert_eq!(schedule.receipt_book_cost(), MicroAlgos::new(13_135_300));
    }

    #[test]
    fn asset_opt_in_cost_exact_figure() {
        let schedule = StorageSchedule::standard();
        assert_eq!(schedule.asset_opt_in_cost(), MicroAlgos::new(100_000));
    }

    #[test]
    fn prices_are_deterministic() {
        let a = StorageSchedule::standard();
        let b = StorageSchedule::standard();
        assert_eq!(a.sale_box_cost(), b.sale_box_cost());
        assert_eq!(a.receipt_book_cost(), b.receipt_book_cost());
    }

    #[test]
    fn longer_prefix_raises_sale_cost_only() {
        let mut schedule = StorageSchedule::standard();
        let base_sale = schedule.sale_box_cost();
        let base_book = schedule.receipt_book_cost();

        schedule.sale_key_prefix_len += 3;
        assert_eq!(
            schedule.sale_box_cost(),
            MicroAlgos::new(base_sale.raw() + 3 * 400)
        );
        assert_eq!(schedule.receipt_book_cost(), base_book);
    }

    #[test]
    fn schedule_serde_roundtrip() {
        let schedule = StorageSchedule::standard();
        let json = serde_json::to_string(&schedule).unwrap();
        let back: StorageSchedule = serde_json::from_str(&json).unwrap();
        assert_eq!(schedule, back);
    }
}
