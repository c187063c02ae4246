// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::ledger;
use crate::policy;
use crate::store;
use crate::utils::{json_flags, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub issue: String,
    pub account: String,
    pub detail: String,
}

pub fn handle(conn: &mut Connection, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(m);
    let fix = m.get_flag("fix");
    let issues = check(conn, settings.user_id, fix)?;
    if maybe_print_json(json_flag, jsonl_flag, &issues)? {
        return Ok(());
    }
    if issues.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.issue, i.account, i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Account", "Detail"], rows));
        if fix {
            println!("Drifted balances were rewritten");
        }
    }
    Ok(())
}

pub fn check(conn: &mut Connection, user_id: i64, fix: bool) -> Result<Vec<Issue>> {
    let mut issues = Vec::new();

    // 1) Stored balance vs opening balance + signed transactions
    for d in ledger::audit_balances(conn, user_id, fix)? {
        issues.push(Issue {
            issue: "balance_drift".into(),
            account: d.account,
            detail: format!("stored {:.2}, expected {:.2}", d.stored, d.expected),
        });
    }

    // 2) Per-kind policy limits, on balances as they stand after any fix
    for a in store::list_accounts(conn, user_id, false)? {
        if let Some(b) = policy::breach(&a) {
            let detail = match &b {
                policy::Breach::BelowMinimum { minimum } => {
                    format!("balance {:.2} below minimum {:.2}", a.balance, minimum)
                }
                policy::Breach::OverOverdraft { limit } => {
                    format!("balance {:.2} beyond overdraft {:.2}", a.balance, limit)
                }
            };
            issues.push(Issue {
                issue: b.code().into(),
                account: a.name,
                detail,
            });
        }
    }
    Ok(issues)
}
