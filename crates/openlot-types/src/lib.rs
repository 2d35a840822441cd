//! # openlot-types
//!
//! Shared types, errors, and policy configuration for the **OpenLot**
//! marketplace settlement core.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`AssetId`], [`SaleKey`]
//! - **Money**: [`MicroAlgos`] (exact microunit arithmetic, checked only)
//! - **Sale model**: [`Sale`], [`Bid`]
//! - **Receipt model**: [`BidReceipt`], [`BidTotals`], [`SettlementReceipt`], [`ReceiptKind`]
//! - **Policy**: [`MarketPolicy`], [`CloseoutPolicy`], [`WithdrawMode`]
//! - **Errors**: [`OpenlotError`] with `OL_ERR_` prefix codes
//! - **Constants**: storage reservation geometry and system defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod money;
pub mod receipt;
pub mod sale;

// Re-export all primary types at crate root for ergonomic imports:
//   use openlot_types::{AccountId, Sale, MicroAlgos, ...};

pub use config::*;
pub use error::*;
pub use ids::*;
pub use money::*;
pub use receipt::*;
pub use sale::*;

// Constants are accessed via `openlot_types::constants::FOO`
// (not re-exported to avoid name collisions).
