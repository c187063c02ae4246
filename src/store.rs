// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Row-level reads and writes for accounts and transactions.
//!
//! Every function is scoped to an owning user. None of them touch more than
//! one entity; keeping balances and transactions consistent is the job of
//! [`crate::ledger`].

use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    Account, AccountKind, NewAccount, Transaction, TransactionDraft, TransactionFilter, TxKind,
    TxStatus,
};

const ACCOUNT_COLUMNS: &str = "id, user_id, name, number, type, currency, opening_balance, balance, is_active, created_at, updated_at";
const TRANSACTION_COLUMNS: &str =
    "id, user_id, account_id, type, category, amount, description, date, status, created_at";

struct AccountRow {
    id: i64,
    user_id: i64,
    name: String,
    number: String,
    kind: String,
    currency: String,
    opening_balance: String,
    balance: String,
    is_active: bool,
    created_at: String,
    updated_at: String,
}

impl AccountRow {
    fn read(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(AccountRow {
            id: r.get(0)?,
            user_id: r.get(1)?,
            name: r.get(2)?,
            number: r.get(3)?,
            kind: r.get(4)?,
            currency: r.get(5)?,
            opening_balance: r.get(6)?,
            balance: r.get(7)?,
            is_active: r.get(8)?,
            created_at: r.get(9)?,
            updated_at: r.get(10)?,
        })
    }

    fn decode(self) -> LedgerResult<Account> {
        let kind = AccountKind::parse(&self.kind).map_err(|_| LedgerError::Corrupt {
            what: "account type",
            value: self.kind.clone(),
        })?;
        Ok(Account {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            number: self.number,
            kind,
            currency: self.currency,
            opening_balance: decode_decimal("opening balance", &self.opening_balance)?,
            balance: decode_decimal("balance", &self.balance)?,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

struct TransactionRow {
    id: i64,
    user_id: i64,
    account_id: i64,
    kind: String,
    category: String,
    amount: String,
    description: Option<String>,
    date: String,
    status: String,
    created_at: String,
}

impl TransactionRow {
    fn read(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(TransactionRow {
            id: r.get(0)?,
            user_id: r.get(1)?,
            account_id: r.get(2)?,
            kind: r.get(3)?,
            category: r.get(4)?,
            amount: r.get(5)?,
            description: r.get(6)?,
            date: r.get(7)?,
            status: r.get(8)?,
            created_at: r.get(9)?,
        })
    }

    fn decode(self) -> LedgerResult<Transaction> {
        let kind = TxKind::parse(&self.kind).map_err(|_| LedgerError::Corrupt {
            what: "transaction type",
            value: self.kind.clone(),
        })?;
        let status = TxStatus::parse(&self.status).map_err(|_| LedgerError::Corrupt {
            what: "transaction status",
            value: self.status.clone(),
        })?;
        let date =
            NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").map_err(|_| LedgerError::Corrupt {
                what: "transaction date",
                value: self.date.clone(),
            })?;
        Ok(Transaction {
            id: self.id,
            user_id: self.user_id,
            account_id: self.account_id,
            kind,
            category: self.category,
            amount: decode_decimal("amount", &self.amount)?,
            description: self.description,
            date,
            status,
            created_at: self.created_at,
        })
    }
}

fn decode_decimal(what: &'static str, s: &str) -> LedgerResult<Decimal> {
    s.trim().parse::<Decimal>().map_err(|_| LedgerError::Corrupt {
        what,
        value: s.to_string(),
    })
}

// Accounts

pub fn get_account(conn: &Connection, user_id: i64, id: i64) -> LedgerResult<Account> {
    let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id=?1 AND user_id=?2");
    let row = conn
        .query_row(&sql, params![id, user_id], AccountRow::read)
        .optional()?;
    row.ok_or_else(|| LedgerError::account(id))?.decode()
}

pub fn find_account_by_name(conn: &Connection, user_id: i64, name: &str) -> LedgerResult<Account> {
    let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE name=?1 AND user_id=?2");
    let row = conn
        .query_row(&sql, params![name.trim(), user_id], AccountRow::read)
        .optional()?;
    row.ok_or_else(|| LedgerError::account(format!("'{}'", name.trim())))?
        .decode()
}

pub fn list_accounts(
    conn: &Connection,
    user_id: i64,
    include_inactive: bool,
) -> LedgerResult<Vec<Account>> {
    let mut sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE user_id=?1");
    if !include_inactive {
        sql.push_str(" AND is_active=1");
    }
    sql.push_str(" ORDER BY name");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id], AccountRow::read)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?.decode()?);
    }
    Ok(out)
}

pub fn insert_account(conn: &Connection, new: &NewAccount) -> LedgerResult<Account> {
    if new.name.trim().is_empty() {
        return Err(LedgerError::Validation("account name is required".into()));
    }
    if new.opening_balance < Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "opening balance must not be negative, got {}",
            new.opening_balance
        )));
    }
    conn.execute(
        "INSERT INTO accounts(user_id, name, number, type, currency, opening_balance, balance)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            new.user_id,
            new.name.trim(),
            new.number.trim(),
            new.kind.as_str(),
            new.currency,
            new.opening_balance.to_string(),
        ],
    )?;
    get_account(conn, new.user_id, conn.last_insert_rowid())
}

/// `UpdateAccount(id, {balance})`.
pub fn set_account_balance(
    conn: &Connection,
    user_id: i64,
    id: i64,
    balance: Decimal,
) -> LedgerResult<()> {
    let n = conn.execute(
        "UPDATE accounts SET balance=?1, updated_at=datetime('now') WHERE id=?2 AND user_id=?3",
        params![balance.to_string(), id, user_id],
    )?;
    if n == 0 {
        return Err(LedgerError::account(id));
    }
    Ok(())
}

pub fn close_account(conn: &Connection, user_id: i64, id: i64) -> LedgerResult<()> {
    let n = conn.execute(
        "UPDATE accounts SET is_active=0, updated_at=datetime('now') WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    if n == 0 {
        return Err(LedgerError::account(id));
    }
    Ok(())
}

/// Removes the account and, through the foreign key, its transactions.
pub fn delete_account(conn: &Connection, user_id: i64, id: i64) -> LedgerResult<()> {
    let n = conn.execute(
        "DELETE FROM accounts WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    if n == 0 {
        return Err(LedgerError::account(id));
    }
    Ok(())
}

/// Sum of signed amounts of every transaction on the account.
pub fn signed_total(conn: &Connection, account_id: i64) -> LedgerResult<(Decimal, usize)> {
    let mut stmt = conn.prepare("SELECT type, amount FROM transactions WHERE account_id=?1")?;
    let mut rows = stmt.query(params![account_id])?;
    let mut total = Decimal::ZERO;
    let mut count = 0;
    while let Some(r) = rows.next()? {
        let kind: String = r.get(0)?;
        let amount: String = r.get(1)?;
        let kind = TxKind::parse(&kind).map_err(|_| LedgerError::Corrupt {
            what: "transaction type",
            value: kind.clone(),
        })?;
        let signed = kind.signed(decode_decimal("amount", &amount)?);
        total = total
            .checked_add(signed)
            .ok_or_else(|| LedgerError::Corrupt {
                what: "transaction total",
                value: format!("{} + {}", total, signed),
            })?;
        count += 1;
    }
    Ok((total, count))
}

// Transactions

pub fn get_transaction(conn: &Connection, user_id: i64, id: i64) -> LedgerResult<Transaction> {
    let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id=?1 AND user_id=?2");
    let row = conn
        .query_row(&sql, params![id, user_id], TransactionRow::read)
        .optional()?;
    row.ok_or_else(|| LedgerError::transaction(id))?.decode()
}

/// `CreateTransaction(data)`.
pub fn insert_transaction(conn: &Connection, draft: &TransactionDraft) -> LedgerResult<Transaction> {
    conn.execute(
        "INSERT INTO transactions(user_id, account_id, type, category, amount, description, date, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            draft.user_id,
            draft.account_id,
            draft.kind.as_str(),
            draft.category.trim(),
            draft.amount.to_string(),
            draft.description,
            draft.date.to_string(),
            draft.status.as_str(),
        ],
    )?;
    get_transaction(conn, draft.user_id, conn.last_insert_rowid())
}

/// `UpdateTransaction(id, data)`.
pub fn update_transaction(
    conn: &Connection,
    id: i64,
    draft: &TransactionDraft,
) -> LedgerResult<Transaction> {
    let n = conn.execute(
        "UPDATE transactions
         SET account_id=?1, type=?2, category=?3, amount=?4, description=?5, date=?6, status=?7
         WHERE id=?8 AND user_id=?9",
        params![
            draft.account_id,
            draft.kind.as_str(),
            draft.category.trim(),
            draft.amount.to_string(),
            draft.description,
            draft.date.to_string(),
            draft.status.as_str(),
            id,
            draft.user_id,
        ],
    )?;
    if n == 0 {
        return Err(LedgerError::transaction(id));
    }
    get_transaction(conn, draft.user_id, id)
}

/// `DeleteTransaction(id)`.
pub fn delete_transaction(conn: &Connection, user_id: i64, id: i64) -> LedgerResult<()> {
    let n = conn.execute(
        "DELETE FROM transactions WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    if n == 0 {
        return Err(LedgerError::transaction(id));
    }
    Ok(())
}

pub fn list_transactions(
    conn: &Connection,
    filter: &TransactionFilter,
) -> LedgerResult<Vec<Transaction>> {
    let mut sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE user_id=?");
    let mut params_vec: Vec<Value> = vec![Value::Integer(filter.user_id)];

    if let Some(kind) = filter.kind {
        sql.push_str(" AND type=?");
        params_vec.push(Value::Text(kind.as_str().into()));
    }
    if let Some(status) = filter.status {
        sql.push_str(" AND status=?");
        params_vec.push(Value::Text(status.as_str().into()));
    }
    if let Some(from) = filter.from {
        sql.push_str(" AND date>=?");
        params_vec.push(Value::Text(from.to_string()));
    }
    if let Some(to) = filter.to {
        sql.push_str(" AND date<=?");
        params_vec.push(Value::Text(to.to_string()));
    }
    if let Some(acct) = filter.account_id {
        sql.push_str(" AND account_id=?");
        params_vec.push(Value::Integer(acct));
    }
    sql.push_str(" ORDER BY date DESC, id DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(Value::Integer(limit as i64));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), TransactionRow::read)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?.decode()?);
    }
    Ok(out)
}
