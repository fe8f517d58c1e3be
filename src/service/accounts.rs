// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};
use tracing::{debug, info};

use super::{Service, get_decimal, get_enum, not_found};
use crate::error::{FinanceError, FinanceResult};
use crate::models::{Account, AccountPatch, NewAccount, RecordId};

const COLS: &str = "id, user_id, name, type, icon, color, currency, initial_balance, is_default, created_at, updated_at";

fn from_row(r: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        r#type: get_enum(r, 3)?,
        icon: r.get(4)?,
        color: r.get(5)?,
        currency: r.get(6)?,
        initial_balance: get_decimal(r, 7)?,
        is_default: r.get(8)?,
        created_at: r.get(9)?,
        updated_at: r.get(10)?,
    })
}

pub(crate) fn normalize_currency(code: &str) -> FinanceResult<String> {
    let code = code.trim().to_uppercase();
    if code.len() < 3 || code.len() > 5 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(FinanceError::validation(format!(
            "Invalid currency code '{}'",
            code
        )));
    }
    Ok(code)
}

impl Service<'_> {
    pub fn list_accounts(&self) -> FinanceResult<Vec<Account>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COLS} FROM accounts WHERE user_id=?1 ORDER BY created_at ASC, id ASC"
        ))?;
        let rows = stmt.query_map(params![self.user_id], from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn get_account(&self, id: RecordId) -> FinanceResult<Account> {
        self.conn
            .query_row(
                &format!("SELECT {COLS} FROM accounts WHERE id=?1 AND user_id=?2"),
                params![id, self.user_id],
                from_row,
            )
            .map_err(not_found("Account"))
    }

    pub fn default_account(&self) -> FinanceResult<Option<Account>> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {COLS} FROM accounts WHERE user_id=?1 AND is_default=1 ORDER BY id LIMIT 1"
                ),
                params![self.user_id],
                from_row,
            )
            .optional()?)
    }

    pub fn create_account(&self, new: &NewAccount) -> FinanceResult<Account> {
        new.validate()?;
        let currency = normalize_currency(new.currency.as_deref().unwrap_or("USD"))?;
        let icon = new
            .icon
            .clone()
            .unwrap_or_else(|| new.r#type.default_icon().to_string());
        let color = new
            .color
            .clone()
            .unwrap_or_else(|| new.r#type.default_color().to_string());
        let initial = new.initial_balance.unwrap_or_default();
        let now = Utc::now();

        let tx = self.conn.unchecked_transaction()?;
        if new.is_default {
            tx.execute(
                "UPDATE accounts SET is_default=0 WHERE user_id=?1",
                params![self.user_id],
            )?;
        }
        tx.execute(
            "INSERT INTO accounts(user_id, name, type, icon, color, currency, initial_balance, is_default, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                self.user_id,
                new.name.trim(),
                new.r#type.as_str(),
                icon,
                color,
                currency,
                initial.to_string(),
                new.is_default,
                now
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        info!(user_id = self.user_id, account_id = id, "created account");
        self.get_account(id)
    }

    pub fn update_account(&self, id: RecordId, patch: &AccountPatch) -> FinanceResult<Account> {
        self.get_account(id)?;
        let currency = match &patch.currency {
            Some(c) => Some(normalize_currency(c)?),
            None => None,
        };
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(FinanceError::validation("Account name is required"));
        }

        let tx = self.conn.unchecked_transaction()?;
        if patch.is_default == Some(true) {
            tx.execute(
                "UPDATE accounts SET is_default=0 WHERE user_id=?1 AND id!=?2",
                params![self.user_id, id],
            )?;
        }
        tx.execute(
            "UPDATE accounts SET
                name = COALESCE(?1, name),
                type = COALESCE(?2, type),
                icon = COALESCE(?3, icon),
                color = COALESCE(?4, color),
                currency = COALESCE(?5, currency),
                is_default = COALESCE(?6, is_default),
                updated_at = ?7
             WHERE id=?8 AND user_id=?9",
            params![
                patch.name.as_deref().map(str::trim),
                patch.r#type.map(|t| t.as_str()),
                patch.icon,
                patch.color,
                currency,
                patch.is_default,
                Utc::now(),
                id,
                self.user_id
            ],
        )?;
        tx.commit()?;
        debug!(user_id = self.user_id, account_id = id, "updated account");
        self.get_account(id)
    }

    /// Refuses to remove the last account or one that transactions still
    /// reference.
    pub fn delete_account(&self, id: RecordId) -> FinanceResult<()> {
        self.get_account(id)?;
        let total: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM accounts WHERE user_id=?1",
            params![self.user_id],
            |r| r.get(0),
        )?;
        if total <= 1 {
            return Err(FinanceError::integrity("Cannot delete the only account"));
        }
        let used: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE user_id=?1 AND account_id=?2",
            params![self.user_id, id],
            |r| r.get(0),
        )?;
        if used > 0 {
            return Err(FinanceError::integrity(
                "Cannot delete account with existing transactions",
            ));
        }
        self.conn.execute(
            "DELETE FROM accounts WHERE id=?1 AND user_id=?2",
            params![id, self.user_id],
        )?;
        info!(user_id = self.user_id, account_id = id, "deleted account");
        Ok(())
    }

    /// Clears the flag on every sibling and sets it on `id` in one
    /// transaction, so readers never see zero or two defaults.
    pub fn set_default_account(&self, id: RecordId) -> FinanceResult<Account> {
        self.get_account(id)?;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE accounts SET is_default=0 WHERE user_id=?1 AND id!=?2",
            params![self.user_id, id],
        )?;
        tx.execute(
            "UPDATE accounts SET is_default=1, updated_at=?1 WHERE id=?2 AND user_id=?3",
            params![Utc::now(), id, self.user_id],
        )?;
        tx.commit()?;
        info!(user_id = self.user_id, account_id = id, "set default account");
        self.get_account(id)
    }
}
