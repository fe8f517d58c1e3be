// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, Utc};
use rusqlite::{Row, params};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Service, get_decimal, get_enum, not_found};
use crate::error::FinanceResult;
use crate::models::{NewTransaction, RecordId, Transaction, TransactionPatch, TxKind};

const COLS: &str =
    "id, user_id, account_id, type, amount, category, description, date, created_at, updated_at";

fn from_row(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: r.get(0)?,
        user_id: r.get(1)?,
        account_id: r.get(2)?,
        kind: get_enum(r, 3)?,
        amount: get_decimal(r, 4)?,
        category: r.get(5)?,
        description: r.get(6)?,
        date: r.get(7)?,
        created_at: r.get(8)?,
        updated_at: r.get(9)?,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionFilter {
    pub account_id: Option<RecordId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub kind: Option<TxKind>,
    pub category: Option<String>,
    pub limit: Option<usize>,
}

impl TransactionFilter {
    pub fn matches(&self, t: &Transaction) -> bool {
        self.account_id.is_none_or(|id| t.account_id == id)
            && self.start_date.is_none_or(|d| t.date >= d)
            && self.end_date.is_none_or(|d| t.date <= d)
            && self.kind.is_none_or(|k| t.kind == k)
            && self.category.as_deref().is_none_or(|c| t.category == c)
    }

    /// Appends ` AND ...` clauses for every set field.
    fn push_clauses(&self, sql: &mut String, params: &mut Vec<Box<dyn rusqlite::ToSql>>) {
        if let Some(id) = self.account_id {
            params.push(Box::new(id));
            sql.push_str(&format!(" AND account_id=?{}", params.len()));
        }
        if let Some(d) = self.start_date {
            params.push(Box::new(d));
            sql.push_str(&format!(" AND date>=?{}", params.len()));
        }
        if let Some(d) = self.end_date {
            params.push(Box::new(d));
            sql.push_str(&format!(" AND date<=?{}", params.len()));
        }
        if let Some(k) = self.kind {
            params.push(Box::new(k.as_str()));
            sql.push_str(&format!(" AND type=?{}", params.len()));
        }
        if let Some(c) = &self.category {
            params.push(Box::new(c.clone()));
            sql.push_str(&format!(" AND category=?{}", params.len()));
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionStats {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub transaction_count: usize,
}

impl Service<'_> {
    fn ensure_account(&self, account_id: RecordId) -> FinanceResult<()> {
        self.conn
            .query_row(
                "SELECT id FROM accounts WHERE id=?1 AND user_id=?2",
                params![account_id, self.user_id],
                |r| r.get::<_, i64>(0),
            )
            .map_err(not_found("Account"))?;
        Ok(())
    }

    /// Newest first: by date, then by creation time.
    pub fn list_transactions(&self, filter: &TransactionFilter) -> FinanceResult<Vec<Transaction>> {
        let mut sql = format!("SELECT {COLS} FROM transactions WHERE user_id=?1");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(self.user_id)];
        filter.push_clauses(&mut sql, &mut params_vec);
        sql.push_str(" ORDER BY date DESC, created_at DESC, id DESC");
        if let Some(limit) = filter.limit {
            params_vec.push(Box::new(limit as i64));
            sql.push_str(&format!(" LIMIT ?{}", params_vec.len()));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(params_vec.iter().map(|p| p.as_ref())),
            from_row,
        )?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn get_transaction(&self, id: RecordId) -> FinanceResult<Transaction> {
        self.conn
            .query_row(
                &format!("SELECT {COLS} FROM transactions WHERE id=?1 AND user_id=?2"),
                params![id, self.user_id],
                from_row,
            )
            .map_err(not_found("Transaction"))
    }

    pub fn create_transaction(&self, new: &NewTransaction) -> FinanceResult<Transaction> {
        new.validate()?;
        self.ensure_account(new.account_id)?;
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO transactions(user_id, account_id, type, amount, category, description, date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                self.user_id,
                new.account_id,
                new.kind.as_str(),
                new.amount.to_string(),
                new.category.trim(),
                new.description.as_deref().unwrap_or(""),
                new.date,
                now
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(user_id = self.user_id, transaction_id = id, "created transaction");
        self.get_transaction(id)
    }

    pub fn update_transaction(
        &self,
        id: RecordId,
        patch: &TransactionPatch,
    ) -> FinanceResult<Transaction> {
        self.get_transaction(id)?;
        patch.validate()?;
        if let Some(account_id) = patch.account_id {
            self.ensure_account(account_id)?;
        }
        self.conn.execute(
            "UPDATE transactions SET
                account_id = COALESCE(?1, account_id),
                type = COALESCE(?2, type),
                amount = COALESCE(?3, amount),
                category = COALESCE(?4, category),
                description = COALESCE(?5, description),
                date = COALESCE(?6, date),
                updated_at = ?7
             WHERE id=?8 AND user_id=?9",
            params![
                patch.account_id,
                patch.kind.map(|k| k.as_str()),
                patch.amount.map(|a| a.to_string()),
                patch.category.as_deref().map(str::trim),
                patch.description,
                patch.date,
                Utc::now(),
                id,
                self.user_id
            ],
        )?;
        self.get_transaction(id)
    }

    pub fn delete_transaction(&self, id: RecordId) -> FinanceResult<()> {
        self.get_transaction(id)?;
        self.conn.execute(
            "DELETE FROM transactions WHERE id=?1 AND user_id=?2",
            params![id, self.user_id],
        )?;
        info!(user_id = self.user_id, transaction_id = id, "deleted transaction");
        Ok(())
    }

    /// Totals over the date range and account of `filter`; kind and category
    /// are ignored.
    pub fn transaction_stats(&self, filter: &TransactionFilter) -> FinanceResult<TransactionStats> {
        let scope = TransactionFilter {
            account_id: filter.account_id,
            start_date: filter.start_date,
            end_date: filter.end_date,
            ..TransactionFilter::default()
        };
        let mut stats = TransactionStats::default();
        for t in self.list_transactions(&scope)? {
            match t.kind {
                TxKind::Income => stats.total_income += t.amount,
                TxKind::Expense => stats.total_expense += t.amount,
            }
            stats.transaction_count += 1;
        }
        Ok(stats)
    }
}
