// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::error::LedgerError;
use crate::models::{TransactionFilter, TransactionSummary, TxKind};
use crate::store;
use crate::utils::{fmt_money, json_flags, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::ToPrimitive;

pub fn handle(conn: &Connection, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(m);
    let s = compute(conn, settings.user_id)?;
    if maybe_print_json(json_flag, jsonl_flag, &s)? {
        return Ok(());
    }
    let ccy = settings.default_currency.as_str();
    let rows = vec![
        vec!["Total income".into(), fmt_money(&s.total_income, ccy)],
        vec!["Total expense".into(), fmt_money(&s.total_expense, ccy)],
        vec!["Net".into(), fmt_money(&s.balance, ccy)],
        vec!["Transactions".into(), s.transaction_count.to_string()],
        vec!["Average transaction".into(), fmt_money(&s.average_transaction, ccy)],
        vec!["Savings rate".into(), format!("{}%", s.savings_rate)],
        vec!["Across accounts".into(), fmt_money(&s.accounts_total, ccy)],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    Ok(())
}

/// Totals over every transaction of `user_id`, whatever its status.
pub fn compute(conn: &Connection, user_id: i64) -> Result<TransactionSummary> {
    let txs = store::list_transactions(
        conn,
        &TransactionFilter {
            user_id,
            ..Default::default()
        },
    )?;
    let mut s = TransactionSummary {
        transaction_count: txs.len(),
        ..Default::default()
    };
    for t in &txs {
        match t.kind {
            TxKind::Income => s.total_income = add(s.total_income, t.amount, "income total")?,
            TxKind::Expense => s.total_expense = add(s.total_expense, t.amount, "expense total")?,
        }
    }
    s.balance = s.total_income - s.total_expense;
    if s.transaction_count > 0 {
        let turnover = add(s.total_income, s.total_expense, "turnover")?;
        s.average_transaction = (turnover / Decimal::from(s.transaction_count)).round_dp(2);
    }
    if s.total_income > Decimal::ZERO {
        let rate = s
            .balance
            .checked_div(s.total_income)
            .and_then(|r| r.checked_mul(Decimal::from(100)))
            .ok_or_else(|| {
                anyhow::Error::from(LedgerError::Corrupt {
                    what: "savings rate",
                    value: format!("{} / {}", s.balance, s.total_income),
                })
            })?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        s.savings_rate = rate.to_i64().unwrap_or_default();
    }
    s.accounts_total = store::list_accounts(conn, user_id, false)?
        .iter()
        .try_fold(Decimal::ZERO, |acc, a| add(acc, a.balance, "accounts total"))?;
    Ok(s)
}

fn add(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal> {
    a.checked_add(b).ok_or_else(|| {
        anyhow::Error::from(LedgerError::Corrupt {
            what,
            value: format!("{a} + {b}"),
        })
    })
}
