// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Savings,
    Checking,
    Credit,
    Investment,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Savings => "savings",
            Self::Checking => "checking",
            Self::Credit => "credit",
            Self::Investment => "investment",
        }
    }

    pub fn parse(s: &str) -> LedgerResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "savings" => Ok(Self::Savings),
            "checking" => Ok(Self::Checking),
            "credit" => Ok(Self::Credit),
            "investment" => Ok(Self::Investment),
            other => Err(LedgerError::Validation(format!(
                "unknown account type '{}' (use savings|checking|credit|investment)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub number: String,
    pub kind: AccountKind,
    pub currency: String,
    pub opening_balance: Decimal,
    pub balance: Decimal,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for opening a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub user_id: i64,
    pub name: String,
    pub number: String,
    pub kind: AccountKind,
    pub currency: String,
    pub opening_balance: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Income,
    Expense,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> LedgerResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(LedgerError::Validation(format!(
                "unknown transaction type '{}' (use income|expense)",
                other
            ))),
        }
    }

    /// Contribution of `amount` to an account balance.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            Self::Income => amount,
            Self::Expense => -amount,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    #[default]
    Completed,
    Cancelled,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> LedgerResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(LedgerError::Validation(format!(
                "unknown status '{}' (use pending|completed|cancelled)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub account_id: i64,
    pub kind: TxKind,
    pub category: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub status: TxStatus,
    pub created_at: String,
}

impl Transaction {
    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }

    /// The fields an edit starts from.
    pub fn to_draft(&self) -> TransactionDraft {
        TransactionDraft {
            user_id: self.user_id,
            account_id: self.account_id,
            kind: self.kind,
            category: self.category.clone(),
            amount: self.amount,
            description: self.description.clone(),
            date: self.date,
            status: self.status,
        }
    }
}

/// Caller-supplied transaction data for create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub user_id: i64,
    pub account_id: i64,
    pub kind: TxKind,
    pub category: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub status: TxStatus,
}

impl TransactionDraft {
    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }

    pub fn validate(&self) -> LedgerResult<()> {
        if self.amount <= Decimal::ZERO {
            return Err(LedgerError::Validation(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        if self.category.trim().is_empty() {
            return Err(LedgerError::Validation("category is required".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub user_id: i64,
    pub kind: Option<TxKind>,
    pub status: Option<TxStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub account_id: Option<i64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionSummary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
    pub transaction_count: usize,
    pub average_transaction: Decimal,
    pub savings_rate: i64,
    pub accounts_total: Decimal,
}
