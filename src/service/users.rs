// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::info;

use crate::error::{FinanceError, FinanceResult};
use crate::models::{RecordId, User};

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"));

pub fn validate_email(email: &str) -> FinanceResult<()> {
    if EMAIL.is_match(email.trim()) {
        Ok(())
    } else {
        Err(FinanceError::validation(format!(
            "Invalid email address '{}'",
            email
        )))
    }
}

pub fn register(conn: &Connection, email: &str, name: &str) -> FinanceResult<User> {
    let email = email.trim().to_lowercase();
    validate_email(&email)?;
    if name.trim().is_empty() {
        return Err(FinanceError::validation("Name is required"));
    }
    let exists: Option<i64> = conn
        .query_row("SELECT id FROM users WHERE email=?1", params![email], |r| {
            r.get(0)
        })
        .optional()?;
    if exists.is_some() {
        return Err(FinanceError::validation(format!(
            "User '{}' already exists",
            email
        )));
    }
    let now = Utc::now();
    conn.execute(
        "INSERT INTO users(email, name, created_at) VALUES (?1, ?2, ?3)",
        params![email, name.trim(), now],
    )?;
    let id = conn.last_insert_rowid();
    info!(user_id = id, "registered user");
    Ok(User {
        id,
        email,
        name: name.trim().to_string(),
        created_at: now,
    })
}

pub fn id_for_email(conn: &Connection, email: &str) -> FinanceResult<RecordId> {
    conn.query_row(
        "SELECT id FROM users WHERE email=?1",
        params![email.trim().to_lowercase()],
        |r| r.get(0),
    )
    .optional()?
    .ok_or(FinanceError::NotFound("User"))
}

pub fn list(conn: &Connection) -> FinanceResult<Vec<User>> {
    let mut stmt = conn.prepare("SELECT id, email, name, created_at FROM users ORDER BY id")?;
    let rows = stmt.query_map([], |r| {
        Ok(User {
            id: r.get(0)?,
            email: r.get(1)?,
            name: r.get(2)?,
            created_at: r.get::<_, DateTime<Utc>>(3)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
