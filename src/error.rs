// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failures surfaced by the service, ledger and remote layers.
///
/// Ownership mismatches are reported as `NotFound`, never as a distinct
/// "forbidden" case.
#[derive(Debug, Error)]
pub enum FinanceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Integrity(String),

    #[error("backend unavailable: {0}. The server may be starting up; please wait a moment and try again")]
    Unavailable(String),

    #[error("request failed ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("corrupt stored value: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Db(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FinanceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        FinanceError::Validation(msg.into())
    }

    pub fn integrity(msg: impl Into<String>) -> Self {
        FinanceError::Integrity(msg.into())
    }

    /// Network or availability failures; the ledger keeps these mutations
    /// locally instead of failing the caller.
    pub fn is_transient(&self) -> bool {
        match self {
            FinanceError::Unavailable(_) => true,
            FinanceError::Remote { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type FinanceResult<T> = std::result::Result<T, FinanceError>;
