// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! CRUD over the relational store, scoped to one user.
//!
//! Every read-by-id and mutation filters on `user_id`; a row owned by
//! someone else is indistinguishable from a missing row.

pub mod accounts;
pub mod preferences;
pub mod records;
pub mod transactions;
pub mod users;

use rusqlite::Row;
use rusqlite::types::Type;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::FinanceError;
use crate::models::RecordId;

pub use transactions::{TransactionFilter, TransactionStats};

pub struct Service<'c> {
    conn: &'c rusqlite::Connection,
    user_id: RecordId,
}

impl<'c> Service<'c> {
    pub fn new(conn: &'c rusqlite::Connection, user_id: RecordId) -> Self {
        Service { conn, user_id }
    }
}

fn conversion_error(idx: usize, e: FinanceError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

pub(crate) fn get_decimal(r: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = r.get(idx)?;
    crate::utils::decimal_from_db(&s).map_err(|e| conversion_error(idx, e))
}

pub(crate) fn get_enum<T>(r: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = FinanceError>,
{
    let s: String = r.get(idx)?;
    s.parse::<T>().map_err(|e| conversion_error(idx, e))
}

/// Maps "no rows" to `NotFound(what)`.
pub(crate) fn not_found(what: &'static str) -> impl Fn(rusqlite::Error) -> FinanceError {
    move |e| match e {
        rusqlite::Error::QueryReturnedNoRows => FinanceError::NotFound(what),
        other => FinanceError::Db(other),
    }
}
