// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{Settings, normalize_currency};
use crate::models::{Account, AccountKind, NewAccount};
use crate::policy;
use crate::store;
use crate::utils::{fmt_money, json_flags, maybe_print_json, parse_decimal, pretty_table, required};
use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

pub fn handle(conn: &Connection, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let account = add(conn, settings, sub)?;
            println!(
                "Added account '{}' ({}, {}) with balance {}",
                account.name,
                account.kind.as_str(),
                account.currency,
                fmt_money(&account.balance, &account.currency)
            );
        }
        Some(("list", sub)) => list(conn, settings, sub)?,
        Some(("show", sub)) => show(conn, settings, sub)?,
        Some(("close", sub)) => {
            let name = required(sub, "name")?;
            let account = store::find_account_by_name(conn, settings.user_id, name)?;
            store::close_account(conn, settings.user_id, account.id)?;
            println!("Closed account '{}'", account.name);
        }
        Some(("rm", sub)) => {
            let name = required(sub, "name")?;
            let account = store::find_account_by_name(conn, settings.user_id, name)?;
            store::delete_account(conn, settings.user_id, account.id)?;
            info!(account = %account.name, "account removed");
            println!("Removed account '{}' and its transactions", account.name);
        }
        _ => {}
    }
    Ok(())
}

pub fn add(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<Account> {
    let name = required(sub, "name")?.trim().to_string();
    let kind = AccountKind::parse(required(sub, "type")?)?;
    let currency = match sub.get_one::<String>("currency") {
        Some(c) => normalize_currency(c)?,
        None => settings.default_currency.clone(),
    };
    let opening_balance = parse_decimal(required(sub, "balance")?)?;
    let number = sub
        .get_one::<String>("number")
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let account = store::insert_account(
        conn,
        &NewAccount {
            user_id: settings.user_id,
            name,
            number,
            kind,
            currency,
            opening_balance,
        },
    )
    .context("Could not add account")?;
    Ok(account)
}

fn list(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let accounts = store::list_accounts(conn, settings.user_id, sub.get_flag("all"))?;
    if !maybe_print_json(json_flag, jsonl_flag, &accounts)? {
        let rows = accounts
            .iter()
            .map(|a| {
                vec![
                    a.name.clone(),
                    a.number.clone(),
                    a.kind.as_str().to_string(),
                    a.currency.clone(),
                    format!("{:.2}", a.balance),
                    if a.is_active { "active" } else { "closed" }.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Name", "Number", "Type", "Currency", "Balance", "State"],
                rows
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct AccountDetail {
    #[serde(flatten)]
    pub account: Account,
    pub policy: policy::Policy,
    pub monthly_interest: rust_decimal::Decimal,
    pub transaction_count: usize,
}

pub fn detail(conn: &Connection, account: Account) -> Result<AccountDetail> {
    let (_, transaction_count) = store::signed_total(conn, account.id)?;
    Ok(AccountDetail {
        policy: policy::policy(account.kind),
        monthly_interest: policy::monthly_interest(account.kind, account.balance),
        transaction_count,
        account,
    })
}

fn show(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let name = required(sub, "name")?;
    let account = store::find_account_by_name(conn, settings.user_id, name)?;
    let d = detail(conn, account)?;
    if maybe_print_json(json_flag, jsonl_flag, &d)? {
        return Ok(());
    }
    let ccy = d.account.currency.clone();
    let opt = |v: Option<rust_decimal::Decimal>| v.map(|x| fmt_money(&x, &ccy)).unwrap_or("-".into());
    let rows = vec![
        vec!["Name".into(), d.account.name.clone()],
        vec!["Number".into(), d.account.number.clone()],
        vec!["Type".into(), d.account.kind.as_str().into()],
        vec!["Balance".into(), fmt_money(&d.account.balance, &ccy)],
        vec!["Opening balance".into(), fmt_money(&d.account.opening_balance, &ccy)],
        vec!["Transactions".into(), d.transaction_count.to_string()],
        vec![
            "Annual rate".into(),
            format!("{:.2}%", d.policy.annual_rate * rust_decimal::Decimal::from(100)),
        ],
        vec!["Monthly interest".into(), fmt_money(&d.monthly_interest, &ccy)],
        vec!["Minimum balance".into(), opt(d.policy.minimum_balance)],
        vec!["Overdraft limit".into(), opt(d.policy.overdraft_limit)],
        vec!["Created".into(), d.account.created_at.clone()],
        vec!["Updated".into(), d.account.updated_at.clone()],
    ];
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}
