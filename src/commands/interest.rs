// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::ledger;
use crate::models::{TransactionDraft, TxKind, TxStatus};
use crate::policy;
use crate::store;
use crate::utils::{fmt_money, json_flags, maybe_print_json, parse_date, pretty_table, today};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

pub const INTEREST_CATEGORY: &str = "Interest";

#[derive(Debug, Clone, Serialize)]
pub struct InterestLine {
    pub account_id: i64,
    pub account: String,
    pub currency: String,
    pub balance: Decimal,
    pub interest: Decimal,
}

pub fn handle(conn: &mut Connection, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("preview", sub)) => {
            let (json_flag, jsonl_flag) = json_flags(sub);
            let lines = preview(conn, settings.user_id)?;
            if !maybe_print_json(json_flag, jsonl_flag, &lines)? {
                let rows = lines
                    .iter()
                    .map(|l| {
                        vec![
                            l.account.clone(),
                            fmt_money(&l.balance, &l.currency),
                            fmt_money(&l.interest, &l.currency),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Account", "Balance", "Interest"], rows));
            }
        }
        Some(("apply", sub)) => {
            let date = match sub.get_one::<String>("date") {
                Some(d) => parse_date(d)?,
                None => today(),
            };
            let applied = apply(conn, settings.user_id, date)?;
            if applied.is_empty() {
                println!("No interest due");
            }
            for l in applied {
                println!(
                    "Credited {} to '{}'",
                    fmt_money(&l.interest, &l.currency),
                    l.account
                );
            }
        }
        _ => {}
    }
    Ok(())
}

/// Interest due this month on every active account that earns any.
pub fn preview(conn: &Connection, user_id: i64) -> Result<Vec<InterestLine>> {
    let lines = store::list_accounts(conn, user_id, false)?
        .into_iter()
        .filter_map(|a| {
            let interest = policy::monthly_interest(a.kind, a.balance);
            (interest > Decimal::ZERO).then(|| InterestLine {
                account_id: a.id,
                account: a.name,
                currency: a.currency,
                balance: a.balance,
                interest,
            })
        })
        .collect();
    Ok(lines)
}

/// Posts every due amount as an income transaction in one ledger commit;
/// either all accounts are credited or none is.
pub fn apply(conn: &mut Connection, user_id: i64, date: NaiveDate) -> Result<Vec<InterestLine>> {
    let lines = preview(conn, user_id)?;
    let drafts: Vec<TransactionDraft> = lines
        .iter()
        .map(|l| TransactionDraft {
            user_id,
            account_id: l.account_id,
            kind: TxKind::Income,
            category: INTEREST_CATEGORY.to_string(),
            amount: l.interest,
            description: Some("Monthly Interest".to_string()),
            date,
            status: TxStatus::Completed,
        })
        .collect();
    if drafts.is_empty() {
        return Ok(lines);
    }
    ledger::create_transactions(conn, user_id, &drafts)?;
    for l in &lines {
        info!(account = %l.account, interest = %l.interest, "interest credited");
    }
    Ok(lines)
}
