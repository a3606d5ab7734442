//! End-to-end ledger scenarios.
//!
//! Each test walks a complete escrow lifecycle over the in-memory bank and
//! checks balances, statuses and error codes at every step.

use std::sync::Arc;

use escrow_core::{AccountId, EscrowId, FeeRate, LedgerConfig};
use escrow_ledger::{EscrowLedger, EscrowStatus, InMemoryBank, ManualClock};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const W1_FUNDS: u64 = 100_000_000;

fn account(s: &str) -> AccountId {
    AccountId::new(s).unwrap()
}

struct World {
    ledger: EscrowLedger,
    bank: Arc<InMemoryBank>,
    deployer: AccountId,
    wallet_1: AccountId,
    wallet_2: AccountId,
}

fn world() -> World {
    let deployer = account("deployer");
    let wallet_1 = account("wallet_1");
    let wallet_2 = account("wallet_2");
    let bank = Arc::new(InMemoryBank::with_balances([(wallet_1.clone(), W1_FUNDS)]));
    let config = LedgerConfig::new(deployer.clone(), account("escrow.custody")).unwrap();
    let ledger = EscrowLedger::new(config, bank.clone(), Arc::new(ManualClock::starting_at(1)));
    World {
        ledger,
        bank,
        deployer,
        wallet_1,
        wallet_2,
    }
}

// ---------------------------------------------------------------------------
// Release path
// ---------------------------------------------------------------------------

#[test]
fn create_release_and_double_release() {
    let w = world();
    let id = w
        .ledger
        .create_escrow(&w.wallet_1, w.wallet_2.clone(), 1_000_000)
        .unwrap();
    assert_eq!(id, EscrowId::new(1));

    let record = w.ledger.get_escrow(id).unwrap();
    assert_eq!(record.amount, 1_000_000);
    assert_eq!(record.status, EscrowStatus::Active);

    assert_eq!(w.ledger.release_funds(&w.deployer, id), Ok(true));
    assert_eq!(w.bank.balance_of(&w.wallet_2), 950_000);
    assert_eq!(w.bank.balance_of(&w.deployer), 50_000);
    assert_eq!(w.ledger.get_escrow(id).unwrap().status, EscrowStatus::Released);

    let err = w.ledger.release_funds(&w.deployer, id).unwrap_err();
    assert_eq!(err.code(), 103);
    assert_eq!(w.bank.balance_of(&w.wallet_2), 950_000);
    assert_eq!(w.bank.balance_of(&w.deployer), 50_000);
}

#[test]
fn unauthorized_release_then_authorized() {
    let w = world();
    let id = w
        .ledger
        .create_escrow(&w.wallet_1, w.wallet_2.clone(), 2_000)
        .unwrap();

    assert_eq!(w.ledger.release_funds(&w.wallet_1, id).unwrap_err().code(), 100);
    assert_eq!(w.ledger.release_funds(&w.wallet_2, id).unwrap_err().code(), 100);
    assert_eq!(w.ledger.get_escrow(id).unwrap().status, EscrowStatus::Active);

    w.ledger.release_funds(&w.deployer, id).unwrap();
    assert_eq!(w.bank.balance_of(&w.wallet_2), 1_900);
}

// ---------------------------------------------------------------------------
// Cancel path
// ---------------------------------------------------------------------------

#[test]
fn cancel_refunds_and_blocks_release() {
    let w = world();
    let id = w
        .ledger
        .create_escrow(&w.wallet_1, w.wallet_2.clone(), 5_000_000)
        .unwrap();
    assert_eq!(w.bank.balance_of(&w.wallet_1), W1_FUNDS - 5_000_000);

    assert_eq!(w.ledger.cancel_escrow(&w.deployer, id), Ok(true));
    assert_eq!(w.bank.balance_of(&w.wallet_1), W1_FUNDS);
    assert_eq!(w.ledger.get_escrow(id).unwrap().status, EscrowStatus::Cancelled);

    assert_eq!(w.ledger.release_funds(&w.deployer, id).unwrap_err().code(), 103);
    assert_eq!(w.ledger.cancel_escrow(&w.deployer, id).unwrap_err().code(), 104);
    assert_eq!(w.bank.balance_of(&w.wallet_2), 0);
}

#[test]
fn cancel_of_released_reports_already_cancelled() {
    let w = world();
    let id = w
        .ledger
        .create_escrow(&w.wallet_1, w.wallet_2.clone(), 1_000)
        .unwrap();
    w.ledger.release_funds(&w.deployer, id).unwrap();
    assert_eq!(w.ledger.cancel_escrow(&w.deployer, id).unwrap_err().code(), 104);
}

// ---------------------------------------------------------------------------
// Boundaries
// ---------------------------------------------------------------------------

#[test]
fn zero_amount_and_unknown_ids() {
    let w = world();
    assert_eq!(
        w.ledger
            .create_escrow(&w.wallet_1, w.wallet_2.clone(), 0)
            .unwrap_err()
            .code(),
        105
    );
    assert_eq!(w.ledger.escrow_count(), 0);

    assert_eq!(
        w.ledger.release_funds(&w.deployer, EscrowId::new(999)).unwrap_err().code(),
        101
    );
    assert!(w.ledger.get_escrow(EscrowId::new(999)).is_none());
}

#[test]
fn fee_preview_examples() {
    let w = world();
    let cases = [
        (0, 0, 0),
        (19, 0, 19),
        (20, 1, 19),
        (1_000_000, 50_000, 950_000),
        (u64::MAX, u64::MAX / 20, u64::MAX - u64::MAX / 20),
    ];
    for (amount, fee, payment) in cases {
        assert_eq!(w.ledger.calculate_fee(amount), fee, "fee for {amount}");
        assert_eq!(
            w.ledger.calculate_freelancer_payment(amount),
            payment,
            "payment for {amount}"
        );
    }
}

#[test]
fn one_unit_escrow_pays_payee_everything() {
    let w = world();
    let id = w.ledger.create_escrow(&w.wallet_1, w.wallet_2.clone(), 1).unwrap();
    w.ledger.release_funds(&w.deployer, id).unwrap();
    assert_eq!(w.bank.balance_of(&w.wallet_2), 1);
    assert_eq!(w.bank.balance_of(&w.deployer), 0);
}

#[test]
fn full_fee_rate_pays_treasury_everything() {
    let payer = account("payer");
    let admin = account("admin");
    let bank = Arc::new(InMemoryBank::with_balances([(payer.clone(), 100)]));
    let config = LedgerConfig::new(admin.clone(), account("pool"))
        .unwrap()
        .with_fee_rate(FeeRate::new(1, 1).unwrap());
    let ledger = EscrowLedger::new(config, bank.clone(), Arc::new(ManualClock::default()));

    let id = ledger.create_escrow(&payer, account("payee"), 100).unwrap();
    ledger.release_funds(&admin, id).unwrap();
    assert_eq!(bank.balance_of(&admin), 100);
    assert_eq!(bank.balance_of(&account("payee")), 0);
}

#[test]
fn interleaved_escrows_settle_independently() {
    let w = world();
    w.bank.deposit(&w.wallet_2, 10_000).unwrap();
    let a = w
        .ledger
        .create_escrow(&w.wallet_1, w.wallet_2.clone(), 4_000)
        .unwrap();
    let b = w
        .ledger
        .create_escrow(&w.wallet_2, w.wallet_1.clone(), 6_000)
        .unwrap();
    assert_eq!((a.get(), b.get()), (1, 2));
    assert_eq!(w.ledger.held_total(), 10_000);

    w.ledger.cancel_escrow(&w.deployer, b).unwrap();
    assert_eq!(w.ledger.held_total(), 4_000);
    assert_eq!(w.bank.balance_of(w.ledger.custody()), 4_000);

    w.ledger.release_funds(&w.deployer, a).unwrap();
    assert_eq!(w.ledger.held_total(), 0);
    assert_eq!(w.bank.balance_of(w.ledger.custody()), 0);
    assert_eq!(w.bank.balance_of(&w.wallet_2), 10_000 + 3_800);
}
