// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Per-kind account rules: interest, minimum balance, overdraft.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Account, AccountKind};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Policy {
    /// Annual rate as a fraction (0.02 = 2%).
    pub annual_rate: Decimal,
    pub minimum_balance: Option<Decimal>,
    pub overdraft_limit: Option<Decimal>,
}

pub fn policy(kind: AccountKind) -> Policy {
    match kind {
        AccountKind::Savings => Policy {
            annual_rate: Decimal::new(2, 2),
            minimum_balance: Some(Decimal::new(100, 0)),
            overdraft_limit: None,
        },
        AccountKind::Investment => Policy {
            annual_rate: Decimal::new(4, 2),
            minimum_balance: Some(Decimal::new(100, 0)),
            overdraft_limit: None,
        },
        AccountKind::Checking => Policy {
            annual_rate: Decimal::ZERO,
            minimum_balance: None,
            overdraft_limit: Some(Decimal::new(500, 0)),
        },
        AccountKind::Credit => Policy {
            annual_rate: Decimal::ZERO,
            minimum_balance: None,
            overdraft_limit: None,
        },
    }
}

/// One month of interest on `balance`, rounded to cents. Zero when the
/// balance is not positive.
pub fn monthly_interest(kind: AccountKind, balance: Decimal) -> Decimal {
    if balance <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (balance * policy(kind).annual_rate / Decimal::from(12)).round_dp(2)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum Breach {
    BelowMinimum { minimum: Decimal },
    OverOverdraft { limit: Decimal },
}

impl Breach {
    pub fn code(&self) -> &'static str {
        match self {
            Breach::BelowMinimum { .. } => "below_minimum",
            Breach::OverOverdraft { .. } => "over_overdraft",
        }
    }
}

pub fn breach(account: &Account) -> Option<Breach> {
    let p = policy(account.kind);
    if let Some(minimum) = p.minimum_balance {
        if account.balance < minimum {
            return Some(Breach::BelowMinimum { minimum });
        }
    }
    if let Some(limit) = p.overdraft_limit {
        if account.balance < -limit {
            return Some(Breach::OverOverdraft { limit });
        }
    }
    None
}
