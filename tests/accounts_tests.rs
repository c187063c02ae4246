// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use ledgerline::config::Settings;
use ledgerline::models::AccountKind;
use ledgerline::{cli, commands::accounts, commands::transactions, db, store};
use rust_decimal::Decimal;

fn settings() -> Settings {
    Settings {
        user_id: 1,
        default_currency: "EUR".into(),
    }
}

fn account_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["ledgerline", "account"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("account", m)) => m.clone(),
        _ => panic!("account command not parsed"),
    }
}

fn nested(m: &clap::ArgMatches) -> &clap::ArgMatches {
    m.subcommand().map(|(_, s)| s).expect("nested subcommand")
}

#[test]
fn add_uses_default_currency_and_opening_balance() {
    let conn = db::open_in_memory().unwrap();
    let m = account_matches(&[
        "add", "--name", " Rainy Day ", "--type", "investment", "--balance", "250.00",
    ]);
    let a = accounts::add(&conn, &settings(), nested(&m)).unwrap();
    assert_eq!(a.name, "Rainy Day");
    assert_eq!(a.kind, AccountKind::Investment);
    assert_eq!(a.currency, "EUR");
    assert_eq!(a.balance, "250.00".parse::<Decimal>().unwrap());
    assert_eq!(a.opening_balance, a.balance);
    assert!(a.is_active);
}

#[test]
fn add_normalizes_and_checks_currency() {
    let conn = db::open_in_memory().unwrap();
    let m = account_matches(&["add", "--name", "Trip", "--currency", "jpy"]);
    let a = accounts::add(&conn, &settings(), nested(&m)).unwrap();
    assert_eq!(a.currency, "JPY");
    assert_eq!(a.kind, AccountKind::Savings);

    let m = account_matches(&["add", "--name", "Bad", "--currency", "dollars"]);
    let err = accounts::add(&conn, &settings(), nested(&m)).unwrap_err();
    assert!(err.to_string().contains("Invalid currency code"));
}

#[test]
fn add_rejects_negative_opening_balance_and_duplicates() {
    let conn = db::open_in_memory().unwrap();
    let m = account_matches(&["add", "--name", "Neg", "--balance", "-1"]);
    assert!(accounts::add(&conn, &settings(), nested(&m)).is_err());

    let m = account_matches(&["add", "--name", "Dup"]);
    accounts::add(&conn, &settings(), nested(&m)).unwrap();
    assert!(accounts::add(&conn, &settings(), nested(&m)).is_err());
}

#[test]
fn close_hides_account_from_default_list() {
    let conn = db::open_in_memory().unwrap();
    accounts::handle(&conn, &settings(), &account_matches(&["add", "--name", "Old"])).unwrap();
    accounts::handle(&conn, &settings(), &account_matches(&["add", "--name", "New"])).unwrap();
    accounts::handle(&conn, &settings(), &account_matches(&["close", "Old"])).unwrap();

    let active: Vec<String> = store::list_accounts(&conn, 1, false)
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(active, vec!["New".to_string()]);
    assert_eq!(store::list_accounts(&conn, 1, true).unwrap().len(), 2);
}

#[test]
fn rm_cascades_to_transactions() {
    let mut conn = db::open_in_memory().unwrap();
    accounts::handle(&conn, &settings(), &account_matches(&["add", "--name", "Gone"])).unwrap();
    let m = cli::build_cli().get_matches_from([
        "ledgerline", "tx", "add", "--account", "Gone", "--type", "income", "--category", "Gift",
        "--amount", "9",
    ]);
    let tx_m = m.subcommand().map(|(_, s)| s).unwrap();
    transactions::handle(&mut conn, &settings(), tx_m).unwrap();

    accounts::handle(&conn, &settings(), &account_matches(&["rm", "Gone"])).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn detail_reports_policy_and_count() {
    let mut conn = db::open_in_memory().unwrap();
    let m = account_matches(&["add", "--name", "S", "--balance", "1200"]);
    let a = accounts::add(&conn, &settings(), nested(&m)).unwrap();
    let m = cli::build_cli().get_matches_from([
        "ledgerline", "tx", "add", "--account", "S", "--type", "expense", "--category", "Rent",
        "--amount", "600",
    ]);
    transactions::handle(&mut conn, &settings(), m.subcommand().map(|(_, s)| s).unwrap()).unwrap();

    let account = store::get_account(&conn, 1, a.id).unwrap();
    let d = accounts::detail(&conn, account).unwrap();
    assert_eq!(d.transaction_count, 1);
    assert_eq!(d.policy.minimum_balance, Some(Decimal::from(100)));
    // 600 * 2% / 12
    assert_eq!(d.monthly_interest, Decimal::from(1));
}
