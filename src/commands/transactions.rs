// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::ledger::{self, Reconciled};
use crate::models::{Transaction, TransactionDraft, TransactionFilter, TxKind, TxStatus};
use crate::store;
use crate::utils::{
    fmt_signed, json_flags, maybe_print_json, parse_date, parse_decimal, pretty_table, required,
    today,
};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

pub fn handle(conn: &mut Connection, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let done = add(conn, settings, sub)?;
            println!(
                "Recorded #{} {} {} ({})",
                done.value.id,
                done.value.kind.as_str(),
                done.value.amount,
                done.value.category
            );
            print_changes(conn, settings, &done)?;
        }
        Some(("edit", sub)) => {
            let done = edit(conn, settings, sub)?;
            println!("Updated #{}", done.value.id);
            print_changes(conn, settings, &done)?;
        }
        Some(("rm", sub)) => {
            let id = *sub
                .get_one::<i64>("id")
                .ok_or_else(|| anyhow::anyhow!("Missing transaction id"))?;
            let done = ledger::delete_transaction(conn, settings.user_id, id)?;
            println!("Deleted #{}", id);
            print_changes(conn, settings, &done)?;
        }
        Some(("list", sub)) => list(conn, settings, sub)?,
        _ => {}
    }
    Ok(())
}

fn print_changes(
    conn: &Connection,
    settings: &Settings,
    done: &Reconciled<Transaction>,
) -> Result<()> {
    for c in &done.changes {
        let name = match store::get_account(conn, settings.user_id, c.account_id) {
            Ok(a) => a.name,
            Err(e) if e.is_not_found() => format!("#{}", c.account_id),
            Err(e) => return Err(e.into()),
        };
        println!("  {}: {:.2} -> {:.2}", name, c.from, c.to);
    }
    Ok(())
}

pub fn add(
    conn: &mut Connection,
    settings: &Settings,
    sub: &clap::ArgMatches,
) -> Result<Reconciled<Transaction>> {
    let account = store::find_account_by_name(conn, settings.user_id, required(sub, "account")?)?;
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => today(),
    };
    let status = match sub.get_one::<String>("status") {
        Some(s) => TxStatus::parse(s)?,
        None => TxStatus::default(),
    };
    let draft = TransactionDraft {
        user_id: settings.user_id,
        account_id: account.id,
        kind: TxKind::parse(required(sub, "type")?)?,
        category: required(sub, "category")?.trim().to_string(),
        amount: parse_decimal(required(sub, "amount")?)?,
        description: non_empty(sub.get_one::<String>("description")),
        date,
        status,
    };
    Ok(ledger::create_transaction(conn, &draft)?)
}

pub fn edit(
    conn: &mut Connection,
    settings: &Settings,
    sub: &clap::ArgMatches,
) -> Result<Reconciled<Transaction>> {
    let id = *sub
        .get_one::<i64>("id")
        .ok_or_else(|| anyhow::anyhow!("Missing transaction id"))?;
    let mut draft = store::get_transaction(conn, settings.user_id, id)?.to_draft();

    if let Some(name) = sub.get_one::<String>("account") {
        draft.account_id = store::find_account_by_name(conn, settings.user_id, name)?.id;
    }
    if let Some(t) = sub.get_one::<String>("type") {
        draft.kind = TxKind::parse(t)?;
    }
    if let Some(c) = sub.get_one::<String>("category") {
        draft.category = c.trim().to_string();
    }
    if let Some(a) = sub.get_one::<String>("amount") {
        draft.amount = parse_decimal(a)?;
    }
    if let Some(d) = sub.get_one::<String>("description") {
        draft.description = non_empty(Some(d));
    }
    if let Some(d) = sub.get_one::<String>("date") {
        draft.date = parse_date(d)?;
    }
    if let Some(s) = sub.get_one::<String>("status") {
        draft.status = TxStatus::parse(s)?;
    }
    Ok(ledger::update_transaction(conn, id, &draft)?)
}

fn non_empty(s: Option<&String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub account: String,
    pub r#type: String,
    pub category: String,
    pub amount: String,
    pub status: String,
    pub description: String,
}

pub fn filter_from_args(
    conn: &Connection,
    settings: &Settings,
    sub: &clap::ArgMatches,
) -> Result<TransactionFilter> {
    let account_id = match sub.get_one::<String>("account") {
        Some(name) => Some(store::find_account_by_name(conn, settings.user_id, name)?.id),
        None => None,
    };
    Ok(TransactionFilter {
        user_id: settings.user_id,
        kind: sub.get_one::<String>("type").map(|s| TxKind::parse(s)).transpose()?,
        status: sub
            .get_one::<String>("status")
            .map(|s| TxStatus::parse(s))
            .transpose()?,
        from: sub.get_one::<String>("from").map(|s| parse_date(s)).transpose()?,
        to: sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?,
        account_id,
        limit: sub.get_one::<usize>("limit").copied(),
    })
}

pub fn query_rows(
    conn: &Connection,
    settings: &Settings,
    sub: &clap::ArgMatches,
) -> Result<Vec<TransactionRow>> {
    let filter = filter_from_args(conn, settings, sub)?;
    let names: HashMap<i64, String> = store::list_accounts(conn, settings.user_id, true)?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();
    let rows = store::list_transactions(conn, &filter)?
        .into_iter()
        .map(|t| TransactionRow {
            id: t.id,
            date: t.date.to_string(),
            account: names.get(&t.account_id).cloned().unwrap_or_default(),
            r#type: t.kind.as_str().to_string(),
            category: t.category.clone(),
            amount: fmt_signed(&t.signed_amount()),
            status: t.status.label().to_string(),
            description: t.description.clone().unwrap_or_default(),
        })
        .collect();
    Ok(rows)
}

fn list(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let data = query_rows(conn, settings, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.account.clone(),
                    r.r#type.clone(),
                    r.category.clone(),
                    r.amount.clone(),
                    r.status.clone(),
                    r.description.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Account", "Type", "Category", "Amount", "Status", "Description"],
                rows,
            )
        );
    }
    Ok(())
}
