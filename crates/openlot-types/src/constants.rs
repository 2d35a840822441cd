//! System-wide constants for the OpenLot settlement core.
//!
//! The storage reservation figures mirror the host chain's box pricing:
//! a flat fee per box plus a per-byte fee over the full key+value layout.

/// Flat storage reservation per box, in microalgos.
pub const BOX_FLAT_MBR: u64 = 2_500;

/// Storage reservation per byte of box key + value, in microalgos.
pub const BOX_BYTE_MBR: u64 = 400;

/// Length of the sale box key-prefix (domain separator).
pub const SALE_KEY_PREFIX_LEN: u64 = 5;

/// Serialized size of a sale box key: 32-byte owner + 8-byte asset id.
pub const SALE_KEY_BYTES: u64 = 32 + 8;

/// Serialized size of a sale box value: amount and cost fields plus the
/// one optional bid slot (bidder address + amount).
pub const SALE_VALUE_BYTES: u64 = 8 + 8 + 32 + 8;

/// Serialized size of a receipt book box key.
pub const RECEIPT_BOOK_KEY_BYTES: u64 = 64;

/// Worst-case serialized size of a receipt book box value. The book is
/// priced at this maximum once, regardless of actual occupancy.
pub const RECEIPT_BOOK_MAX_VALUE_BYTES: u64 = 32_768;

/// Minimum balance a holder must reserve per asset opt-in, in microalgos.
pub const ASSET_OPT_IN_MBR: u64 = 100_000;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "OpenLot";
