//! # openlot-settlement
//!
//! The settlement plane of OpenLot: everything that moves money.
//!
//! - [`marketplace`]: the [`Marketplace`] orchestrator: deposits,
//!   withdrawals, asset sponsorship, the sale lifecycle, bidding, and
//!   atomic operation groups
//! - [`host`]: the boundary with the hosting chain: inbound transfer
//!   shapes, outbound [`HostEffect`]s, and an in-memory [`SimHost`] for
//!   end-to-end tests
//! - [`conservation`]: the custody conservation checker, the ultimate
//!   safety net over every other invariant
//! - [`audit`]: the hash-chained settlement receipt log

pub mod audit;
pub mod conservation;
pub mod host;
pub mod marketplace;

pub use audit::{GENESIS_DIGEST, ReceiptLog};
pub use conservation::Conservation;
pub use host::{AssetParams, AssetTransfer, HostEffect, Payment, SimHost};
pub use marketplace::{ClaimOutcome, Marketplace, Op};
