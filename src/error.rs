// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Failures surfaced by the store and the reconciliation workflow.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("storage failure: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("stored {what} '{value}' could not be decoded")]
    Corrupt { what: &'static str, value: String },
}

impl LedgerError {
    pub fn account(id: impl ToString) -> Self {
        LedgerError::NotFound {
            entity: "account",
            id: id.to_string(),
        }
    }

    pub fn transaction(id: impl ToString) -> Self {
        LedgerError::NotFound {
            entity: "transaction",
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::NotFound { .. })
    }
}
