//! End-to-end settlement scenarios driven through the simulated host:
//! real transfer shapes in, real effect bundles out, with the custody
//! conservation invariant checked against the host's books.

use openlot_settlement::{HostEffect, Marketplace, Op, SimHost};
use openlot_types::{
    AccountId, AssetId, BidTotals, MarketPolicy, MicroAlgos, OpenlotError, SaleKey, WithdrawMode,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SALE_MBR: u64 = 42_900;
const BOOK_MBR: u64 = 13_135_300;
const OPT_IN_MBR: u64 = 100_000;

fn acct(n: u8) -> AccountId {
    AccountId([n; 32])
}

fn setup() -> (Marketplace, SimHost) {
    let custody = acct(0xcc);
    (
        Marketplace::new(custody, MarketPolicy::hardened()),
        SimHost::new(custody),
    )
}

/// Pay `amount` into custody and deposit it in one step.
fn deposit(market: &mut Marketplace, host: &mut SimHost, who: AccountId, amount: u64) {
    let payment = host.pay_to_custody(who, MicroAlgos::new(amount)).unwrap();
    market.deposit(who, &payment).unwrap();
}

/// Assert custody's external holdings match what the core answers for.
fn assert_custody_conserved(market: &Marketplace, host: &SimHost) {
    market.verify_conservation().unwrap();
    assert_eq!(
        u128::from(host.algo_balance(&host.custody()).raw()),
        market.custody_holdings(),
        "custody microalgos must equal the core's accounted holdings"
    );
}

#[test]
fn full_lifecycle_sponsor_list_bid_accept_withdraw() {
    let (mut market, mut host) = setup();
    let seller = acct(1);
    let bidder = acct(2);
    let asset = AssetId(7);

    host.fund(seller, MicroAlgos::from_algos(10));
    host.fund(bidder, MicroAlgos::from_algos(20));
    host.mint_asset(seller, asset, 2000);

    // Seller funds their custodial balance and sponsors the asset.
    deposit(&mut market, &mut host, seller, 10_000_000);
    let effect = market
        .sponsor_asset(seller, asset, &Default::default())
        .unwrap();
    host.apply_effects(&[effect]).unwrap();
    assert!(host.is_opted_in(&host.custody(), asset));

    // Escrow the units and list them at 5 algos.
    let transfer = host.transfer_asset_to_custody(seller, asset, 2000).unwrap();
    market
        .open_sale(seller, &transfer, MicroAlgos::from_algos(5))
        .unwrap();
    assert_eq!(host.asset_balance(&host.custody(), asset), 2000);
    assert_custody_conserved(&market, &host);

    // Bidder deposits and bids below the asking cost.
    deposit(&mut market, &mut host, bidder, 20_000_000);
    let key = SaleKey::new(seller, asset);
    market.bid(bidder, key, MicroAlgos::new(4_000_000)).unwrap();
    assert_eq!(
        market.balance(&bidder),
        MicroAlgos::new(20_000_000 - 4_000_000 - BOOK_MBR)
    );
    assert_custody_conserved(&market, &host);

    // Seller accepts; the escrow ships to the bidder.
    host.opt_in(bidder, asset);
    let effect = market.accept_bid(seller, asset).unwrap();
    host.apply_effects(&[effect]).unwrap();
    assert_eq!(host.asset_balance(&bidder, asset), 2000);
    assert_eq!(host.asset_balance(&host.custody(), asset), 0);

    // Seller: 10 algos deposited, minus opt-in, plus bid and box refund.
    let expected_seller =
        10_000_000 - OPT_IN_MBR - SALE_MBR + 4_000_000 + SALE_MBR;
    assert_eq!(market.balance(&seller), MicroAlgos::new(expected_seller));
    // Bidder: book emptied on acceptance, reservation refunded.
    assert_eq!(market.balance(&bidder), MicroAlgos::new(16_000_000));
    assert_custody_conserved(&market, &host);

    // Seller closes out; the exact remaining balance is required.
    let effect = market
        .withdraw(seller, MicroAlgos::new(expected_seller), WithdrawMode::CloseOut)
        .unwrap();
    host.apply_effects(&[effect]).unwrap();
    assert_eq!(market.balance(&seller), MicroAlgos::ZERO);
    assert_eq!(
        host.algo_balance(&seller),
        MicroAlgos::new(expected_seller)
    );
    assert!(market.audit().verify_chain());
    assert_custody_conserved(&market, &host);
}

#[test]
fn outbid_receipt_is_reclaimed_with_storage_refund() {
    let (mut market, mut host) = setup();
    let seller = acct(1);
    let low = acct(2);
    let high = acct(3);
    let asset = AssetId(7);

    host.fund(seller, MicroAlgos::from_algos(10));
    host.fund(low, MicroAlgos::from_algos(20));
    host.fund(high, MicroAlgos::from_algos(20));
    host.mint_asset(seller, asset, 2000);

    deposit(&mut market, &mut host, seller, 10_000_000);
    let effect = market
        .sponsor_asset(seller, asset, &Default::default())
        .unwrap();
    host.apply_effects(&[effect]).unwrap();
    let transfer = host.transfer_asset_to_custody(seller, asset, 2000).unwrap();
    market
        .open_sale(seller, &transfer, MicroAlgos::from_algos(5))
        .unwrap();
    let key = SaleKey::new(seller, asset);

    deposit(&mut market, &mut host, low, 20_000_000);
    deposit(&mut market, &mut host, high, 20_000_000);
    market.bid(low, key, MicroAlgos::new(4_000_000)).unwrap();
    // One microalgo more is enough to displace.
    market.bid(high, key, MicroAlgos::new(4_000_001)).unwrap();

    assert_eq!(
        market.total_and_unencumbered_bids(low),
        BidTotals {
            total: MicroAlgos::new(4_000_000),
            unencumbered: MicroAlgos::new(4_000_000),
        }
    );
    assert_eq!(
        market.total_and_unencumbered_bids(high),
        BidTotals {
            total: MicroAlgos::new(4_000_001),
            unencumbered: MicroAlgos::ZERO,
        }
    );

    let outcome = market.claim_unencumbered_bids(low).unwrap();
    assert_eq!(outcome.reclaimed, MicroAlgos::new(4_000_000));
    assert_eq!(outcome.storage_refund, MicroAlgos::new(BOOK_MBR));
    assert!(outcome.book_deleted);
    assert_eq!(market.balance(&low), MicroAlgos::new(20_000_000));
    assert_custody_conserved(&market, &host);
}

#[test]
fn atomic_group_lists_and_buys_in_one_bundle() {
    let (mut market, mut host) = setup();
    let seller = acct(1);
    let buyer = acct(2);
    let asset = AssetId(7);

    host.fund(seller, MicroAlgos::from_algos(10));
    host.fund(buyer, MicroAlgos::from_algos(10));
    host.mint_asset(seller, asset, 500);
    host.opt_in(buyer, asset);

    deposit(&mut market, &mut host, seller, 10_000_000);
    let effect = market
        .sponsor_asset(seller, asset, &Default::default())
        .unwrap();
    host.apply_effects(&[effect]).unwrap();

    let listing = host.transfer_asset_to_custody(seller, asset, 500).unwrap();
    let purchase = host.pay_to_custody(buyer, MicroAlgos::from_algos(6)).unwrap();
    let key = SaleKey::new(seller, asset);

    let effects = market
        .apply_group(&[
            (
                seller,
                Op::OpenSale {
                    deposit: listing,
                    cost: MicroAlgos::from_algos(5),
                },
            ),
            (buyer, Op::Deposit { payment: purchase }),
            (buyer, Op::Buy { key }),
        ])
        .unwrap();
    assert_eq!(
        effects,
        vec![HostEffect::AssetOut {
            asset,
            to: buyer,
            amount: 500
        }]
    );
    host.apply_effects(&effects).unwrap();

    assert_eq!(host.asset_balance(&buyer, asset), 500);
    assert_eq!(market.balance(&buyer), MicroAlgos::from_algos(1));
    assert_eq!(
        market.balance(&seller),
        MicroAlgos::new(10_000_000 - OPT_IN_MBR + 5_000_000)
    );
    assert!(!market.has_sale(key));
    assert_custody_conserved(&market, &host);
}

#[test]
fn failed_group_releases_no_effects() {
    let (mut market, mut host) = setup();
    let account = acct(1);

    host.fund(account, MicroAlgos::from_algos(5));
    let payment = host
        .pay_to_custody(account, MicroAlgos::from_algos(5))
        .unwrap();

    let err = market
        .apply_group(&[
            (account, Op::Deposit { payment }),
            (
                account,
                Op::Withdraw {
                    amount: MicroAlgos::from_algos(6),
                    mode: WithdrawMode::Partial,
                },
            ),
        ])
        .unwrap_err();
    assert!(matches!(err, OpenlotError::InsufficientFunds { .. }));

    // The core rolled back; the host already executed the inbound payment,
    // so custody holds funds the core refuses to account for until the
    // group is resubmitted.
    assert_eq!(market.balance(&account), MicroAlgos::ZERO);
    assert_eq!(market.custody_holdings(), 0);
    assert!(market.audit().is_empty());
}

#[test]
fn closeout_policies_disagree_on_partial_amounts() {
    let custody = acct(0xcc);
    let account = acct(1);

    let mut strict = Marketplace::new(custody, MarketPolicy::hardened());
    let mut host = SimHost::new(custody);
    host.fund(account, MicroAlgos::from_algos(1));
    let payment = host
        .pay_to_custody(account, MicroAlgos::from_algos(1))
        .unwrap();
    strict.deposit(account, &payment).unwrap();

    let err = strict
        .withdraw(account, MicroAlgos::new(1), WithdrawMode::CloseOut)
        .unwrap_err();
    assert!(matches!(err, OpenlotError::BalanceNotEmpty { .. }));

    let mut lenient = Marketplace::new(custody, MarketPolicy::permissive());
    let mut host = SimHost::new(custody);
    host.fund(account, MicroAlgos::from_algos(1));
    let payment = host
        .pay_to_custody(account, MicroAlgos::from_algos(1))
        .unwrap();
    lenient.deposit(account, &payment).unwrap();

    let effect = lenient
        .withdraw(account, MicroAlgos::new(1), WithdrawMode::CloseOut)
        .unwrap();
    host.apply_effects(&[effect]).unwrap();
    assert_eq!(host.algo_balance(&account), MicroAlgos::from_algos(1));
    assert_eq!(lenient.balance(&account), MicroAlgos::ZERO);
}

#[test]
fn randomized_flows_never_break_conservation() {
    let (mut market, mut host) = setup();
    let mut rng = StdRng::seed_from_u64(0x10_7);

    let seller = acct(9);
    let asset = AssetId(42);
    let bidders: Vec<AccountId> = (1..=4).map(acct).collect();

    host.fund(seller, MicroAlgos::from_algos(100));
    host.mint_asset(seller, asset, 1_000);
    for bidder in &bidders {
        host.fund(*bidder, MicroAlgos::from_algos(1_000));
    }

    deposit(&mut market, &mut host, seller, 100_000_000);
    let effect = market
        .sponsor_asset(seller, asset, &Default::default())
        .unwrap();
    host.apply_effects(&[effect]).unwrap();
    let transfer = host
        .transfer_asset_to_custody(seller, asset, 1_000)
        .unwrap();
    market
        .open_sale(seller, &transfer, MicroAlgos::from_algos(50))
        .unwrap();
    let key = SaleKey::new(seller, asset);

    for _ in 0..300 {
        let who = bidders[rng.gen_range(0..bidders.len())];
        match rng.gen_range(0..4u8) {
            0 => {
                let amount = MicroAlgos::new(rng.gen_range(1..=5_000_000));
                if let Ok(payment) = host.pay_to_custody(who, amount) {
                    market.deposit(who, &payment).unwrap();
                }
            }
            1 => {
                let amount = MicroAlgos::new(rng.gen_range(1..=5_000_000));
                if let Ok(effect) = market.withdraw(who, amount, WithdrawMode::Partial) {
                    host.apply_effects(&[effect]).unwrap();
                }
            }
            2 => {
                let best = market
                    .sale(key)
                    .map(|sale| sale.best_bid_amount().raw())
                    .unwrap_or(0);
                let raise = rng.gen_range(1..=100_000);
                // May fail on funds; a failed bid must leave no trace.
                let _ = market.bid(who, key, MicroAlgos::new(best + raise));
            }
            _ => {
                market.claim_unencumbered_bids(who).unwrap();
            }
        }
        assert_custody_conserved(&market, &host);
    }

    assert!(market.audit().verify_chain());
}
