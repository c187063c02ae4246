// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use ledgerline::ledger::{self, Step};
use ledgerline::models::{AccountKind, NewAccount, TransactionDraft, TxKind, TxStatus};
use ledgerline::{LedgerError, db, store};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn setup() -> (Connection, i64, i64) {
    let conn = db::open_in_memory().unwrap();
    let a = open(&conn, 1, "Main", "500.00");
    let b = open(&conn, 1, "Side", "200.00");
    (conn, a, b)
}

fn open(conn: &Connection, user_id: i64, name: &str, balance: &str) -> i64 {
    store::insert_account(
        conn,
        &NewAccount {
            user_id,
            name: name.into(),
            number: String::new(),
            kind: AccountKind::Checking,
            currency: "USD".into(),
            opening_balance: d(balance),
        },
    )
    .unwrap()
    .id
}

fn draft(account_id: i64, kind: TxKind, amount: &str) -> TransactionDraft {
    TransactionDraft {
        user_id: 1,
        account_id,
        kind,
        category: "General".into(),
        amount: d(amount),
        description: None,
        date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        status: TxStatus::Completed,
    }
}

fn balance(conn: &Connection, id: i64) -> Decimal {
    store::get_account(conn, 1, id).unwrap().balance
}

#[test]
fn income_raises_balance_and_persists_transaction() {
    let (mut conn, a, _) = setup();
    let done = ledger::create_transaction(&mut conn, &draft(a, TxKind::Income, "100.00")).unwrap();

    assert_eq!(balance(&conn, a), d("600.00"));
    let stored = store::get_transaction(&conn, 1, done.value.id).unwrap();
    assert_eq!(stored.amount, d("100.00"));
    assert_eq!(stored.kind, TxKind::Income);
    assert_eq!(stored.account_id, a);
    assert_eq!(done.changes.len(), 1);
    assert_eq!(done.changes[0].from, d("500.00"));
    assert_eq!(done.changes[0].to, d("600.00"));
}

#[test]
fn expense_lowers_balance() {
    let (mut conn, a, _) = setup();
    ledger::create_transaction(&mut conn, &draft(a, TxKind::Income, "100.00")).unwrap();
    ledger::create_transaction(&mut conn, &draft(a, TxKind::Expense, "50.00")).unwrap();
    assert_eq!(balance(&conn, a), d("550.00"));
}

#[test]
fn update_reverts_old_effect_then_applies_new() {
    let (mut conn, a, _) = setup();
    let created =
        ledger::create_transaction(&mut conn, &draft(a, TxKind::Income, "100.00")).unwrap();
    assert_eq!(balance(&conn, a), d("600.00"));

    let done =
        ledger::update_transaction(&mut conn, created.value.id, &draft(a, TxKind::Expense, "30.00"))
            .unwrap();
    assert_eq!(balance(&conn, a), d("470.00"));
    assert_eq!(done.value.kind, TxKind::Expense);
    assert_eq!(done.value.amount, d("30.00"));
    // Both writes land on one account, reported as a single net change.
    assert_eq!(done.changes.len(), 1);
    assert_eq!(done.changes[0].from, d("600.00"));
    assert_eq!(done.changes[0].to, d("470.00"));
}

#[test]
fn update_runs_named_steps_in_order() {
    let (mut conn, a, b) = setup();
    let created =
        ledger::create_transaction(&mut conn, &draft(a, TxKind::Income, "10.00")).unwrap();
    let done =
        ledger::update_transaction(&mut conn, created.value.id, &draft(b, TxKind::Income, "10.00"))
            .unwrap();
    let id = created.value.id;
    assert_eq!(
        done.steps,
        vec![
            Step::FetchTransaction { transaction_id: id },
            Step::FetchAccount { account_id: a },
            Step::WriteBalance {
                account_id: a,
                from: d("510.00"),
                to: d("500.00")
            },
            Step::FetchAccount { account_id: b },
            Step::WriteBalance {
                account_id: b,
                from: d("200.00"),
                to: d("210.00")
            },
            Step::UpdateTransaction { transaction_id: id },
        ]
    );
}

#[test]
fn delete_restores_balance() {
    let (mut conn, a, _) = setup();
    ledger::create_transaction(&mut conn, &draft(a, TxKind::Income, "100.00")).unwrap();
    let expense =
        ledger::create_transaction(&mut conn, &draft(a, TxKind::Expense, "50.00")).unwrap();
    assert_eq!(balance(&conn, a), d("550.00"));

    let done = ledger::delete_transaction(&mut conn, 1, expense.value.id).unwrap();
    assert_eq!(balance(&conn, a), d("600.00"));
    assert_eq!(done.value.id, expense.value.id);
    let err = store::get_transaction(&conn, 1, expense.value.id).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn moving_between_accounts_touches_each_side_once() {
    let (mut conn, a, b) = setup();
    let created =
        ledger::create_transaction(&mut conn, &draft(a, TxKind::Expense, "40.00")).unwrap();
    assert_eq!(balance(&conn, a), d("460.00"));

    ledger::update_transaction(&mut conn, created.value.id, &draft(b, TxKind::Income, "25.00"))
        .unwrap();
    // A gets back its 40 and never sees the 25; B gets the 25 and never the -40.
    assert_eq!(balance(&conn, a), d("500.00"));
    assert_eq!(balance(&conn, b), d("225.00"));
    let moved = store::get_transaction(&conn, 1, created.value.id).unwrap();
    assert_eq!(moved.account_id, b);
}

#[test]
fn failed_update_rolls_back_the_revert() {
    let (mut conn, a, _) = setup();
    let created =
        ledger::create_transaction(&mut conn, &draft(a, TxKind::Income, "100.00")).unwrap();

    let err = ledger::update_transaction(
        &mut conn,
        created.value.id,
        &draft(9999, TxKind::Income, "100.00"),
    )
    .unwrap_err();
    assert!(err.is_not_found());

    // The revert on A happened before the missing account was hit; it must not stick.
    assert_eq!(balance(&conn, a), d("600.00"));
    let unchanged = store::get_transaction(&conn, 1, created.value.id).unwrap();
    assert_eq!(unchanged.account_id, a);
}

#[test]
fn create_on_missing_account_writes_nothing() {
    let (mut conn, _, _) = setup();
    let err = ledger::create_transaction(&mut conn, &draft(4242, TxKind::Income, "1.00")).unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { entity: "account", .. }));
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn rejects_non_positive_amount_and_blank_category() {
    let (mut conn, a, _) = setup();
    for amount in ["0", "-5.00"] {
        let err =
            ledger::create_transaction(&mut conn, &draft(a, TxKind::Income, amount)).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }
    let mut blank = draft(a, TxKind::Expense, "3.00");
    blank.category = "   ".into();
    let err = ledger::create_transaction(&mut conn, &blank).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(balance(&conn, a), d("500.00"));
}

#[test]
fn overflowing_amount_is_rejected_without_moving_balance() {
    let (mut conn, a, _) = setup();
    let mut huge = draft(a, TxKind::Income, "1");
    huge.amount = Decimal::MAX;

    let err = ledger::create_transaction(&mut conn, &huge).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(balance(&conn, a), d("500.00"));
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn overflowing_update_rolls_back_the_revert() {
    let (mut conn, a, _) = setup();
    let created =
        ledger::create_transaction(&mut conn, &draft(a, TxKind::Income, "100.00")).unwrap();
    let mut huge = draft(a, TxKind::Income, "1");
    huge.amount = Decimal::MAX;

    let err = ledger::update_transaction(&mut conn, created.value.id, &huge).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(balance(&conn, a), d("600.00"));
    let unchanged = store::get_transaction(&conn, 1, created.value.id).unwrap();
    assert_eq!(unchanged.amount, d("100.00"));
}

#[test]
fn batch_create_is_all_or_nothing() {
    let (mut conn, a, b) = setup();
    let drafts = [
        draft(a, TxKind::Income, "10.00"),
        draft(b, TxKind::Expense, "5.00"),
        draft(4242, TxKind::Income, "1.00"),
    ];
    let err = ledger::create_transactions(&mut conn, 1, &drafts).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(balance(&conn, a), d("500.00"));
    assert_eq!(balance(&conn, b), d("200.00"));

    let done = ledger::create_transactions(&mut conn, 1, &drafts[..2]).unwrap();
    assert_eq!(done.value.len(), 2);
    assert_eq!(done.changes.len(), 2);
    assert_eq!(balance(&conn, a), d("510.00"));
    assert_eq!(balance(&conn, b), d("195.00"));
}

#[test]
fn delete_of_unknown_transaction_is_not_found() {
    let (mut conn, a, _) = setup();
    let err = ledger::delete_transaction(&mut conn, 1, 77).unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { entity: "transaction", .. }));
    assert_eq!(balance(&conn, a), d("500.00"));
}

#[test]
fn closed_account_refuses_new_effects() {
    let (mut conn, a, b) = setup();
    let created =
        ledger::create_transaction(&mut conn, &draft(a, TxKind::Income, "10.00")).unwrap();
    store::close_account(&conn, 1, b).unwrap();

    let err = ledger::create_transaction(&mut conn, &draft(b, TxKind::Income, "1.00")).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    let err = ledger::update_transaction(&mut conn, created.value.id, &draft(b, TxKind::Income, "10.00"))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(balance(&conn, a), d("510.00"));
    assert_eq!(balance(&conn, b), d("200.00"));
}

#[test]
fn other_users_accounts_are_invisible() {
    let (mut conn, _, _) = setup();
    let foreign = open(&conn, 2, "Theirs", "10.00");
    let err = ledger::create_transaction(&mut conn, &draft(foreign, TxKind::Income, "5.00"))
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(store::get_account(&conn, 2, foreign).unwrap().balance, d("10.00"));
}

#[test]
fn audit_finds_and_fixes_drift() {
    let (mut conn, a, b) = setup();
    ledger::create_transaction(&mut conn, &draft(a, TxKind::Income, "100.00")).unwrap();
    store::set_account_balance(&conn, 1, a, d("1.00")).unwrap();

    let drifts = ledger::audit_balances(&mut conn, 1, false).unwrap();
    assert_eq!(drifts.len(), 1);
    assert_eq!(drifts[0].account_id, a);
    assert_eq!(drifts[0].expected, d("600.00"));
    assert_eq!(balance(&conn, a), d("1.00"));

    ledger::audit_balances(&mut conn, 1, true).unwrap();
    assert_eq!(balance(&conn, a), d("600.00"));
    assert_eq!(balance(&conn, b), d("200.00"));
    assert!(ledger::audit_balances(&mut conn, 1, false).unwrap().is_empty());
}
