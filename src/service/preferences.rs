// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};
use tracing::{info, warn};

use super::accounts::normalize_currency;
use super::{Service, get_enum};
use crate::currency;
use crate::error::{FinanceError, FinanceResult};
use crate::models::{Preferences, PreferencesPatch};

fn from_row(r: &Row<'_>) -> rusqlite::Result<Preferences> {
    Ok(Preferences {
        user_id: r.get(0)?,
        mode: get_enum(r, 1)?,
        base_currency: r.get(2)?,
        display_currency: r.get(3)?,
        theme: get_enum(r, 4)?,
        updated_at: r.get(5)?,
    })
}

fn checked_currency(code: &str) -> FinanceResult<String> {
    let code = normalize_currency(code)?;
    if !currency::is_known(&code) {
        return Err(FinanceError::validation(format!(
            "Unsupported currency '{}'",
            code
        )));
    }
    Ok(code)
}

impl Service<'_> {
    /// The caller's preferences, creating the default row on first read.
    pub fn get_preferences(&self) -> FinanceResult<Preferences> {
        let existing = self
            .conn
            .query_row(
                "SELECT user_id, mode, base_currency, display_currency, theme, updated_at
                 FROM user_preferences WHERE user_id=?1",
                params![self.user_id],
                from_row,
            )
            .optional()?;
        if let Some(p) = existing {
            return Ok(p);
        }
        let defaults = Preferences::defaults_for(self.user_id);
        self.insert_preferences(&defaults)?;
        info!(user_id = self.user_id, "created default preferences");
        Ok(defaults)
    }

    fn insert_preferences(&self, p: &Preferences) -> FinanceResult<()> {
        self.conn.execute(
            "INSERT INTO user_preferences(user_id, mode, base_currency, display_currency, theme, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                p.user_id,
                p.mode.as_str(),
                p.base_currency,
                p.display_currency,
                p.theme.as_str(),
                p.updated_at
            ],
        )?;
        Ok(())
    }

    /// Applies only the supplied fields.
    pub fn update_preferences(&self, patch: &PreferencesPatch) -> FinanceResult<Preferences> {
        let mut clean = patch.clone();
        if let Some(c) = &patch.base_currency {
            clean.base_currency = Some(checked_currency(c)?);
        }
        if let Some(c) = &patch.display_currency {
            clean.display_currency = Some(checked_currency(c)?);
        }
        let mut prefs = self.get_preferences()?;
        if clean.base_currency.as_ref().is_some_and(|c| *c != prefs.base_currency) {
            warn!(
                user_id = self.user_id,
                "base currency changed; stored amounts are not converted"
            );
        }
        clean.apply(&mut prefs);
        prefs.updated_at = Utc::now();
        self.conn.execute(
            "UPDATE user_preferences SET mode=?1, base_currency=?2, display_currency=?3, theme=?4, updated_at=?5
             WHERE user_id=?6",
            params![
                prefs.mode.as_str(),
                prefs.base_currency,
                prefs.display_currency,
                prefs.theme.as_str(),
                prefs.updated_at,
                self.user_id
            ],
        )?;
        Ok(prefs)
    }
}
