//! # openlot-ledger
//!
//! **Accounting plane**: the custodial balance ledger and the storage-cost
//! accountant.
//!
//! ## Architecture
//!
//! 1. **BalanceLedger**: per-account deposited balances; unsigned amounts,
//!    so underflow (`InsufficientFunds`) is the only debit failure mode
//!    and no balance can ever be left negative.
//! 2. **StorageSchedule**: deterministic reservation prices for every
//!    variable-size record the marketplace creates, the single source of
//!    truth for storage billing.
//!
//! Every credit or debit in the whole system flows through the
//! `BalanceLedger`; every storage charge is computed by the
//! `StorageSchedule` and applied by the settlement layer as a matched
//! debit-on-create / credit-on-destroy pair that nets to zero.

pub mod balance;
pub mod storage_cost;

pub use balance::BalanceLedger;
pub use storage_cost::StorageSchedule;
