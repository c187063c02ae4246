// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Balance reconciliation for transaction create, update and delete.
//!
//! Each operation is a fixed sequence of named steps executed inside one
//! SQLite transaction. If any step fails the transaction is dropped without
//! committing, so earlier balance writes are rolled back and the stored
//! balance always equals the opening balance plus the signed sum of the
//! account's transactions.

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, Transaction, TransactionDraft};
use crate::store;

/// One executed step of a reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    FetchAccount { account_id: i64 },
    WriteBalance { account_id: i64, from: Decimal, to: Decimal },
    FetchTransaction { transaction_id: i64 },
    InsertTransaction { transaction_id: i64 },
    UpdateTransaction { transaction_id: i64 },
    DeleteTransaction { transaction_id: i64 },
}

/// Net balance movement on one account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceChange {
    pub account_id: i64,
    pub from: Decimal,
    pub to: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct Reconciled<T> {
    pub value: T,
    pub changes: Vec<BalanceChange>,
    pub steps: Vec<Step>,
}

struct Workflow<'a> {
    conn: &'a Connection,
    user_id: i64,
    steps: Vec<Step>,
    changes: Vec<BalanceChange>,
}

impl<'a> Workflow<'a> {
    fn new(conn: &'a Connection, user_id: i64) -> Self {
        Workflow {
            conn,
            user_id,
            steps: Vec::new(),
            changes: Vec::new(),
        }
    }

    fn record(&mut self, step: Step) {
        debug!(?step, "reconciliation step");
        self.steps.push(step);
    }

    fn fetch_account(&mut self, account_id: i64) -> LedgerResult<Account> {
        let account = store::get_account(self.conn, self.user_id, account_id)?;
        self.record(Step::FetchAccount { account_id });
        Ok(account)
    }

    fn fetch_transaction(&mut self, transaction_id: i64) -> LedgerResult<Transaction> {
        let t = store::get_transaction(self.conn, self.user_id, transaction_id)?;
        self.record(Step::FetchTransaction { transaction_id });
        Ok(t)
    }

    /// Writes `account.balance + delta` and returns the new balance.
    fn shift_balance(&mut self, account: &Account, delta: Decimal) -> LedgerResult<Decimal> {
        let from = account.balance;
        let to = from.checked_add(delta).ok_or_else(|| {
            LedgerError::Validation(format!(
                "balance of account '{}' would overflow ({} + {})",
                account.name, from, delta
            ))
        })?;
        store::set_account_balance(self.conn, self.user_id, account.id, to)?;
        self.record(Step::WriteBalance {
            account_id: account.id,
            from,
            to,
        });
        match self.changes.iter_mut().find(|c| c.account_id == account.id) {
            Some(c) => c.to = to,
            None => self.changes.push(BalanceChange {
                account_id: account.id,
                from,
                to,
            }),
        }
        Ok(to)
    }
}

fn run<T>(
    conn: &mut Connection,
    user_id: i64,
    op: &'static str,
    body: impl FnOnce(&mut Workflow<'_>) -> LedgerResult<T>,
) -> LedgerResult<Reconciled<T>> {
    let tx = conn.transaction()?;
    let mut wf = Workflow::new(&tx, user_id);
    let value = match body(&mut wf) {
        Ok(v) => v,
        Err(e) => {
            warn!(
                op,
                completed_steps = wf.steps.len(),
                error = %e,
                "reconciliation failed, rolling back"
            );
            return Err(e);
        }
    };
    let Workflow { steps, changes, .. } = wf;
    tx.commit()?;
    info!(op, steps = steps.len(), accounts = changes.len(), "reconciled");
    Ok(Reconciled {
        value,
        changes,
        steps,
    })
}

fn ensure_open(account: &Account) -> LedgerResult<()> {
    if !account.is_active {
        return Err(LedgerError::Validation(format!(
            "account '{}' is closed",
            account.name
        )));
    }
    Ok(())
}

fn post(wf: &mut Workflow<'_>, draft: &TransactionDraft) -> LedgerResult<Transaction> {
    let account = wf.fetch_account(draft.account_id)?;
    ensure_open(&account)?;
    wf.shift_balance(&account, draft.signed_amount())?;
    let created = store::insert_transaction(wf.conn, draft)?;
    wf.record(Step::InsertTransaction {
        transaction_id: created.id,
    });
    Ok(created)
}

/// Applies the draft's signed amount to its account, then records it.
pub fn create_transaction(
    conn: &mut Connection,
    draft: &TransactionDraft,
) -> LedgerResult<Reconciled<Transaction>> {
    draft.validate()?;
    run(conn, draft.user_id, "create", |wf| post(wf, draft))
}

/// Creates every draft of `user_id` in one commit. A failure on any draft
/// leaves no transaction recorded and no balance moved.
pub fn create_transactions(
    conn: &mut Connection,
    user_id: i64,
    drafts: &[TransactionDraft],
) -> LedgerResult<Reconciled<Vec<Transaction>>> {
    for draft in drafts {
        draft.validate()?;
        if draft.user_id != user_id {
            return Err(LedgerError::Validation(format!(
                "draft for user {} in a batch for user {}",
                draft.user_id, user_id
            )));
        }
    }
    run(conn, user_id, "create_batch", |wf| {
        drafts.iter().map(|draft| post(wf, draft)).collect()
    })
}

/// Reverts transaction `id` on its current account, applies `draft` to the
/// (possibly different) target account, then rewrites the record.
pub fn update_transaction(
    conn: &mut Connection,
    id: i64,
    draft: &TransactionDraft,
) -> LedgerResult<Reconciled<Transaction>> {
    draft.validate()?;
    run(conn, draft.user_id, "update", |wf| {
        let old = wf.fetch_transaction(id)?;

        let old_account = wf.fetch_account(old.account_id)?;
        wf.shift_balance(&old_account, -old.signed_amount())?;

        // Re-read so a same-account edit sees the reverted balance.
        let new_account = wf.fetch_account(draft.account_id)?;
        ensure_open(&new_account)?;
        wf.shift_balance(&new_account, draft.signed_amount())?;

        let updated = store::update_transaction(wf.conn, id, draft)?;
        wf.record(Step::UpdateTransaction { transaction_id: id });
        Ok(updated)
    })
}

/// Reverses transaction `id` on its account, then removes the record.
/// Returns the deleted transaction.
pub fn delete_transaction(
    conn: &mut Connection,
    user_id: i64,
    id: i64,
) -> LedgerResult<Reconciled<Transaction>> {
    run(conn, user_id, "delete", |wf| {
        let old = wf.fetch_transaction(id)?;
        let account = wf.fetch_account(old.account_id)?;
        wf.shift_balance(&account, -old.signed_amount())?;
        store::delete_transaction(wf.conn, user_id, id)?;
        wf.record(Step::DeleteTransaction { transaction_id: id });
        Ok(old)
    })
}

/// An account whose stored balance disagrees with its transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Drift {
    pub account_id: i64,
    pub account: String,
    pub stored: Decimal,
    pub expected: Decimal,
}

/// Recomputes every balance of `user_id` from opening balance and
/// transactions. With `fix`, drifted balances are overwritten atomically.
pub fn audit_balances(conn: &mut Connection, user_id: i64, fix: bool) -> LedgerResult<Vec<Drift>> {
    let tx = conn.transaction()?;
    let mut drifts = Vec::new();
    for account in store::list_accounts(&tx, user_id, true)? {
        let (total, _) = store::signed_total(&tx, account.id)?;
        let expected =
            account
                .opening_balance
                .checked_add(total)
                .ok_or_else(|| LedgerError::Corrupt {
                    what: "balance total",
                    value: format!("{} + {}", account.opening_balance, total),
                })?;
        if expected != account.balance {
            warn!(
                account = %account.name,
                stored = %account.balance,
                %expected,
                "balance drift"
            );
            if fix {
                store::set_account_balance(&tx, user_id, account.id, expected)?;
            }
            drifts.push(Drift {
                account_id: account.id,
                account: account.name,
                stored: account.balance,
                expected,
            });
        }
    }
    if fix {
        tx.commit()?;
    }
    Ok(drifts)
}
