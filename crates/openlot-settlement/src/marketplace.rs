//! The settlement orchestrator.
//!
//! [`Marketplace`] composes the balance ledger, storage-cost schedule,
//! sale registry, and receipt book under invariant-preserving operations.
//! Every public operation follows the same discipline:
//!
//! 1. validate every precondition (pure reads, checked arithmetic),
//! 2. apply state mutations, infallible once validation passed,
//! 3. record conservation flows and append an audit receipt,
//! 4. return the at-most-one outward [`HostEffect`].
//!
//! A failed precondition therefore never leaves a partial write behind,
//! and [`Marketplace::apply_group`] extends the same all-or-nothing
//! guarantee to an ordered batch of operations.

use std::collections::BTreeSet;

use openlot_ledger::{BalanceLedger, StorageSchedule};
use openlot_market::{ReceiptBook, SaleRegistry};
use openlot_types::{
    AccountId, AssetId, Bid, BidReceipt, BidTotals, CloseoutPolicy, MarketPolicy, MicroAlgos,
    OpenlotError, ReceiptKind, Result, Sale, SaleKey, WithdrawMode,
};

use crate::audit::ReceiptLog;
use crate::conservation::Conservation;
use crate::host::{AssetParams, AssetTransfer, HostEffect, Payment};

/// What a claim returned to the bidder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimOutcome {
    /// Sum of the unencumbered bid amounts credited back.
    pub reclaimed: MicroAlgos,
    /// Receipt-book storage reservation refunded, if the book emptied.
    pub storage_refund: MicroAlgos,
    /// True if the bidder's whole book entry was deleted.
    pub book_deleted: bool,
}

/// A settlement operation, for submission in atomic groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Deposit { payment: Payment },
    Withdraw { amount: MicroAlgos, mode: WithdrawMode },
    SponsorAsset { asset: AssetId, params: AssetParams },
    OpenSale { deposit: AssetTransfer, cost: MicroAlgos },
    CloseSale { asset: AssetId },
    Buy { key: SaleKey },
    Bid { key: SaleKey, amount: MicroAlgos },
    AcceptBid { asset: AssetId },
    ClaimUnencumberedBids,
}

/// The escrow-based marketplace settlement core.
#[derive(Debug, Clone)]
pub struct Marketplace {
    /// The custodial address all inbound transfers must pay.
    address: AccountId,
    policy: MarketPolicy,
    schedule: StorageSchedule,
    balances: BalanceLedger,
    sales: SaleRegistry,
    receipts: ReceiptBook,
    /// Assets the custodial account has opted in to hold.
    sponsored: BTreeSet<AssetId>,
    conservation: Conservation,
    audit: ReceiptLog,
}

impl Marketplace {
    /// Create a marketplace at the given custodial address with the
    /// standard storage schedule.
    #[must_use]
    pub fn new(address: AccountId, policy: MarketPolicy) -> Self {
        Self::with_schedule(address, policy, StorageSchedule::standard())
    }

    #[must_use]
    pub fn with_schedule(
        address: AccountId,
        policy: MarketPolicy,
        schedule: StorageSchedule,
    ) -> Self {
        Self {
            address,
            policy,
            schedule,
            balances: BalanceLedger::new(),
            sales: SaleRegistry::new(),
            receipts: ReceiptBook::new(),
            sponsored: BTreeSet::new(),
            conservation: Conservation::new(),
            audit: ReceiptLog::new(),
        }
    }

    // =================================================================
    // Deposits & withdrawals
    // =================================================================

    /// Credit the caller's custodial balance from a grouped payment.
    ///
    /// # Errors
    /// - `DifferentSender` if the payment was not sent by the caller
    /// - `WrongReceiver` if the payment does not pay the custodial address
    pub fn deposit(&mut self, caller: AccountId, payment: &Payment) -> Result<()> {
        self.check_inbound(caller, payment.sender, payment.receiver)?;

        self.balances.credit(caller, payment.amount)?;
        self.conservation.record_deposit(payment.amount);
        self.audit
            .append(ReceiptKind::Deposited, caller, None, payment.amount)?;

        tracing::debug!(account = %caller, amount = %payment.amount, "Deposit credited");
        Ok(())
    }

    /// Pay deposited funds back out.
    ///
    /// With [`WithdrawMode::CloseOut`] the account's balance entry is
    /// removed; how the remaining balance is treated depends on the
    /// configured [`CloseoutPolicy`].
    ///
    /// # Errors
    /// - `InsufficientFunds` on an ordinary overdraft
    /// - `BalanceNotEmpty` on a `RequireExact` close-out whose amount
    ///   does not equal the full remaining balance
    pub fn withdraw(
        &mut self,
        caller: AccountId,
        amount: MicroAlgos,
        mode: WithdrawMode,
    ) -> Result<HostEffect> {
        let paid = match mode {
            WithdrawMode::Partial => {
                self.balances.debit(caller, amount)?;
                amount
            }
            WithdrawMode::CloseOut => match self.policy.closeout {
                CloseoutPolicy::RequireExact => {
                    let remaining = self.balances.balance(&caller);
                    if amount != remaining {
                        return Err(OpenlotError::BalanceNotEmpty { remaining });
                    }
                    self.balances.drain(caller)
                }
                CloseoutPolicy::DrainAll => self.balances.drain(caller),
            },
        };

        self.conservation.record_withdrawal(paid);
        self.audit
            .append(ReceiptKind::Withdrawn, caller, None, paid)?;

        tracing::debug!(account = %caller, amount = %paid, ?mode, "Withdrawal paid out");
        Ok(HostEffect::PayOut {
            to: caller,
            amount: paid,
        })
    }

    // =================================================================
    // Asset sponsorship
    // =================================================================

    /// Opt the custodial account into an asset, at the caller's expense.
    ///
    /// # Errors
    /// - `AlreadyOptedIn` if custody already holds the asset
    /// - `ClawbackAsset` if the asset has a clawback authority
    /// - `InsufficientFunds` if the caller cannot cover the opt-in MBR
    pub fn sponsor_asset(
        &mut self,
        caller: AccountId,
        asset: AssetId,
        params: &AssetParams,
    ) -> Result<HostEffect> {
        if self.sponsored.contains(&asset) {
            return Err(OpenlotError::AlreadyOptedIn(asset));
        }
        if params.clawback.is_some() {
            return Err(OpenlotError::ClawbackAsset(asset));
        }

        let cost = self.schedule.asset_opt_in_cost();
        self.balances.debit(caller, cost)?;
        self.sponsored.insert(asset);
        self.audit
            .append(ReceiptKind::AssetSponsored, caller, None, cost)?;

        tracing::info!(sponsor = %caller, asset = %asset, "Asset sponsored");
        Ok(HostEffect::AssetOptIn { asset })
    }

    // =================================================================
    // Sale lifecycle
    // =================================================================

    /// List the escrowed asset deposit for sale at a fixed cost.
    ///
    /// # Errors
    /// - `DifferentSender` / `WrongReceiver` on transfer shape mismatch
    /// - `SaleAlreadyExists` if the caller already lists this asset
    /// - `InsufficientFunds` if the caller cannot cover the sale box MBR
    pub fn open_sale(
        &mut self,
        caller: AccountId,
        deposit: &AssetTransfer,
        cost: MicroAlgos,
    ) -> Result<()> {
        self.check_inbound(caller, deposit.sender, deposit.receiver)?;

        let key = SaleKey::new(caller, deposit.asset);
        if self.sales.contains(key) {
            return Err(OpenlotError::SaleAlreadyExists(key));
        }

        self.balances.debit(caller, self.schedule.sale_box_cost())?;
        self.sales.open(key, Sale::open(deposit.amount, cost))?;
        self.audit
            .append(ReceiptKind::SaleOpened, caller, Some(key), cost)?;

        tracing::info!(sale = %key, amount = deposit.amount, cost = %cost, "Sale opened");
        Ok(())
    }

    /// Return the escrowed asset to the seller and delist.
    ///
    /// # Errors
    /// - `SaleNotFound` if the caller has no sale for this asset
    /// - `SaleHasLiveBid` under strict bid exclusivity
    pub fn close_sale(&mut self, caller: AccountId, asset: AssetId) -> Result<HostEffect> {
        let key = SaleKey::new(caller, asset);
        let sale = *self.sales.get(key)?;
        if self.policy.strict_bid_exclusivity && sale.has_bid() {
            return Err(OpenlotError::SaleHasLiveBid(key));
        }

        let refund = self.schedule.sale_box_cost();
        self.balances.credit(caller, refund)?;
        self.sales.remove(key)?;
        self.audit
            .append(ReceiptKind::SaleClosed, caller, Some(key), refund)?;

        tracing::info!(sale = %key, "Sale closed by seller");
        Ok(HostEffect::AssetOut {
            asset,
            to: caller,
            amount: sale.amount,
        })
    }

    /// Buy a listed sale at its fixed cost.
    ///
    /// The buyer pays `cost` out of their deposited balance; the seller is
    /// credited `cost` plus the sale box reservation they escrowed when
    /// opening the listing.
    ///
    /// # Errors
    /// - `SaleNotFound` if no sale is listed under `key`
    /// - `SellerCannotBeBuyer` under the self-dealing policy
    /// - `SaleHasLiveBid` under strict bid exclusivity
    /// - `InsufficientFunds` if the buyer cannot cover `cost`
    pub fn buy(&mut self, caller: AccountId, key: SaleKey) -> Result<HostEffect> {
        let sale = *self.sales.get(key)?;
        if self.policy.forbid_self_dealing && caller == key.owner {
            return Err(OpenlotError::SellerCannotBeBuyer(key));
        }
        if self.policy.strict_bid_exclusivity && sale.has_bid() {
            return Err(OpenlotError::SaleHasLiveBid(key));
        }

        let seller_credit = sale
            .cost
            .checked_add(self.schedule.sale_box_cost())
            .ok_or(OpenlotError::AmountOverflow)?;
        // Validate the seller-side credit before the buyer-side debit so a
        // failure cannot strand a half-applied purchase.
        self.balances
            .balance(&key.owner)
            .checked_add(seller_credit)
            .ok_or(OpenlotError::AmountOverflow)?;

        self.balances.debit(caller, sale.cost)?;
        self.balances.credit(key.owner, seller_credit)?;
        self.sales.remove(key)?;
        self.audit
            .append(ReceiptKind::SaleBought, caller, Some(key), sale.cost)?;

        tracing::info!(sale = %key, buyer = %caller, cost = %sale.cost, "Sale bought");
        Ok(HostEffect::AssetOut {
            asset: key.asset,
            to: caller,
            amount: sale.amount,
        })
    }

    // =================================================================
    // Bidding
    // =================================================================

    /// Place or raise a bid on a sale, locking the bid amount.
    ///
    /// The net balance movement is `amount`, plus the receipt-book
    /// reservation if this is the bidder's first receipt, minus the refund
    /// of the bidder's own previous bid on this same sale.
    ///
    /// # Errors
    /// - `SaleNotFound` if no sale is listed under `key`
    /// - `SellerCannotBeBidder` under the self-dealing policy
    /// - `WorseBid` unless `amount` strictly exceeds the current best
    /// - `InsufficientFunds` if the net debit cannot be funded
    pub fn bid(&mut self, caller: AccountId, key: SaleKey, amount: MicroAlgos) -> Result<()> {
        let sale = *self.sales.get(key)?;
        if self.policy.forbid_self_dealing && caller == key.owner {
            return Err(OpenlotError::SellerCannotBeBidder(key));
        }
        if let Some(best) = sale.bid {
            if amount <= best.amount {
                return Err(OpenlotError::WorseBid {
                    offered: amount,
                    best: best.amount,
                });
            }
        }

        let book_fee = if self.receipts.contains(&caller) {
            MicroAlgos::ZERO
        } else {
            self.schedule.receipt_book_cost()
        };
        let refund = self
            .receipts
            .receipts(&caller)
            .and_then(|receipts| receipts.iter().find(|r| r.sale_key == key))
            .map_or(MicroAlgos::ZERO, |r| r.amount);
        let debit = amount
            .checked_add(book_fee)
            .ok_or(OpenlotError::AmountOverflow)?;

        // The single failable mutation: refund and debit net out in one
        // atomic step.
        self.balances.adjust(caller, refund, debit)?;
        self.sales.place_bid(key, Bid::new(caller, amount))?;
        let outcome = self.receipts.record(caller, BidReceipt::new(key, amount));
        self.audit
            .append(ReceiptKind::BidPlaced, caller, Some(key), amount)?;

        tracing::debug!(
            sale = %key,
            bidder = %caller,
            amount = %amount,
            ?outcome,
            "Bid placed"
        );
        Ok(())
    }

    /// Accept the current best bid on the caller's own sale.
    ///
    /// Pays the seller the bid amount plus the sale box refund, removes
    /// the winning bidder's receipt (refunding the book reservation if
    /// their book empties), and ships the escrow to the bidder.
    ///
    /// # Errors
    /// - `SaleNotFound` if the caller has no sale for this asset
    /// - `NoBidToAccept` if the sale carries no bid
    pub fn accept_bid(&mut self, caller: AccountId, asset: AssetId) -> Result<HostEffect> {
        let key = SaleKey::new(caller, asset);
        let sale = *self.sales.get(key)?;
        let best = sale.bid.ok_or(OpenlotError::NoBidToAccept(key))?;

        let seller_credit = best
            .amount
            .checked_add(self.schedule.sale_box_cost())
            .ok_or(OpenlotError::AmountOverflow)?;
        self.balances
            .balance(&caller)
            .checked_add(seller_credit)
            .ok_or(OpenlotError::AmountOverflow)?;
        self.balances
            .balance(&best.bidder)
            .checked_add(self.schedule.receipt_book_cost())
            .ok_or(OpenlotError::AmountOverflow)?;

        // Every stored bid is mirrored by a receipt; a miss here means the
        // ledger is corrupt, not that the caller erred.
        let removed = self
            .receipts
            .remove(best.bidder, key)
            .map_err(|_| OpenlotError::Internal("winning bid has no receipt".into()))?;
        if removed.book_deleted {
            self.balances
                .credit(best.bidder, self.schedule.receipt_book_cost())?;
        }
        self.balances.credit(caller, seller_credit)?;
        self.sales.remove(key)?;
        self.audit
            .append(ReceiptKind::BidAccepted, caller, Some(key), best.amount)?;

        tracing::info!(
            sale = %key,
            bidder = %best.bidder,
            amount = %best.amount,
            "Bid accepted"
        );
        Ok(HostEffect::AssetOut {
            asset,
            to: best.bidder,
            amount: sale.amount,
        })
    }

    /// Reclaim every bid of the caller's that is no longer winning.
    ///
    /// A caller with no receipt book at all gets a successful zero-value
    /// no-op, which makes repeated claims idempotent.
    pub fn claim_unencumbered_bids(&mut self, caller: AccountId) -> Result<ClaimOutcome> {
        let Some(receipts) = self.receipts.receipts(&caller) else {
            return Ok(ClaimOutcome::default());
        };

        let mut encumbered = Vec::new();
        let mut reclaimed = MicroAlgos::ZERO;
        for receipt in receipts {
            if self.sales.is_winning_bidder(receipt.sale_key, &caller) {
                encumbered.push(*receipt);
            } else {
                reclaimed = reclaimed
                    .checked_add(receipt.amount)
                    .ok_or(OpenlotError::AmountOverflow)?;
            }
        }

        let book_deleted = encumbered.is_empty();
        let storage_refund = if book_deleted {
            self.schedule.receipt_book_cost()
        } else {
            MicroAlgos::ZERO
        };
        let credit = reclaimed
            .checked_add(storage_refund)
            .ok_or(OpenlotError::AmountOverflow)?;

        self.balances.credit(caller, credit)?;
        if book_deleted {
            self.receipts.delete(&caller);
        } else {
            self.receipts.replace(caller, encumbered);
        }
        self.audit
            .append(ReceiptKind::BidsClaimed, caller, None, reclaimed)?;

        tracing::debug!(
            bidder = %caller,
            reclaimed = %reclaimed,
            book_deleted,
            "Unencumbered bids claimed"
        );
        Ok(ClaimOutcome {
            reclaimed,
            storage_refund,
            book_deleted,
        })
    }

    /// Read-only totals over the caller's receipts: everything locked and
    /// the portion that is currently claimable.
    #[must_use]
    pub fn total_and_unencumbered_bids(&self, caller: AccountId) -> BidTotals {
        let Some(receipts) = self.receipts.receipts(&caller) else {
            return BidTotals::default();
        };
        let total = MicroAlgos::saturating_sum(receipts.iter().map(|r| r.amount));
        let unencumbered = MicroAlgos::saturating_sum(
            receipts
                .iter()
                .filter(|r| !self.sales.is_winning_bidder(r.sale_key, &caller))
                .map(|r| r.amount),
        );
        BidTotals {
            total,
            unencumbered,
        }
    }

    // =================================================================
    // Atomic grouping
    // =================================================================

    /// Dispatch a single operation, returning its outward effects.
    pub fn apply(&mut self, caller: AccountId, op: Op) -> Result<Vec<HostEffect>> {
        match op {
            Op::Deposit { payment } => {
                self.deposit(caller, &payment)?;
                Ok(Vec::new())
            }
            Op::Withdraw { amount, mode } => Ok(vec![self.withdraw(caller, amount, mode)?]),
            Op::SponsorAsset { asset, params } => {
                Ok(vec![self.sponsor_asset(caller, asset, &params)?])
            }
            Op::OpenSale { deposit, cost } => {
                self.open_sale(caller, &deposit, cost)?;
                Ok(Vec::new())
            }
            Op::CloseSale { asset } => Ok(vec![self.close_sale(caller, asset)?]),
            Op::Buy { key } => Ok(vec![self.buy(caller, key)?]),
            Op::Bid { key, amount } => {
                self.bid(caller, key, amount)?;
                Ok(Vec::new())
            }
            Op::AcceptBid { asset } => Ok(vec![self.accept_bid(caller, asset)?]),
            Op::ClaimUnencumberedBids => {
                self.claim_unencumbered_bids(caller)?;
                Ok(Vec::new())
            }
        }
    }

    /// Apply an ordered group of operations atomically.
    ///
    /// Each operation sees the effects of the ones before it. If any
    /// fails, the whole group is rolled back and no outward effect is
    /// released; on success the accumulated effects are returned as one
    /// bundle for the host to execute.
    ///
    /// # Errors
    /// The first failing operation's error, plus `ConservationViolation`
    /// if the committed group would break the custody invariant.
    pub fn apply_group(&mut self, ops: &[(AccountId, Op)]) -> Result<Vec<HostEffect>> {
        let mut staged = self.clone();
        let mut effects = Vec::new();
        for (caller, op) in ops {
            effects.extend(staged.apply(*caller, *op)?);
        }
        staged.verify_conservation()?;
        *self = staged;
        Ok(effects)
    }

    // =================================================================
    // Invariants & queries
    // =================================================================

    /// Check the custody conservation invariant right now.
    ///
    /// # Errors
    /// Returns `ConservationViolation` if the books do not balance.
    pub fn verify_conservation(&self) -> Result<()> {
        self.conservation.verify(self.custody_holdings())
    }

    /// Everything custody is currently answerable for: balances, locked
    /// bids, and outstanding storage reservations.
    #[must_use]
    pub fn custody_holdings(&self) -> u128 {
        let sale_mbr =
            self.sales.len() as u128 * u128::from(self.schedule.sale_box_cost().raw());
        let book_mbr =
            self.receipts.len() as u128 * u128::from(self.schedule.receipt_book_cost().raw());
        let opt_in_mbr =
            self.sponsored.len() as u128 * u128::from(self.schedule.asset_opt_in_cost().raw());
        u128::from(self.balances.total().raw())
            + u128::from(self.receipts.total_locked().raw())
            + sale_mbr
            + book_mbr
            + opt_in_mbr
    }

    /// The caller's deposited balance.
    #[must_use]
    pub fn balance(&self, account: &AccountId) -> MicroAlgos {
        self.balances.balance(account)
    }

    /// The custodial address.
    #[must_use]
    pub fn address(&self) -> AccountId {
        self.address
    }

    #[must_use]
    pub fn policy(&self) -> &MarketPolicy {
        &self.policy
    }

    #[must_use]
    pub fn schedule(&self) -> &StorageSchedule {
        &self.schedule
    }

    /// Look up a live sale.
    ///
    /// # Errors
    /// Returns `SaleNotFound` if no sale is listed under `key`.
    pub fn sale(&self, key: SaleKey) -> Result<&Sale> {
        self.sales.get(key)
    }

    /// Whether a sale is currently listed.
    #[must_use]
    pub fn has_sale(&self, key: SaleKey) -> bool {
        self.sales.contains(key)
    }

    /// The settlement audit trail.
    #[must_use]
    pub fn audit(&self) -> &ReceiptLog {
        &self.audit
    }

    fn check_inbound(
        &self,
        caller: AccountId,
        sender: AccountId,
        receiver: AccountId,
    ) -> Result<()> {
        if sender != caller {
            return Err(OpenlotError::DifferentSender {
                expected: caller,
                actual: sender,
            });
        }
        if receiver != self.address {
            return Err(OpenlotError::WrongReceiver(receiver));
        }
        Ok(())
    }
}
