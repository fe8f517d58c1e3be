// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Budgets, debts, investments, recurring payments and goals. None of them
//! carry invariants beyond ownership, so they share one code path.

use chrono::Utc;
use rusqlite::{Row, ToSql, params};
use rust_decimal::Decimal;
use tracing::debug;

use super::{Service, get_decimal, get_enum, not_found};
use crate::error::{FinanceError, FinanceResult};
use crate::models::{
    Budget, Debt, Goal, Investment, Record, RecordId, RecordKind, RecurringPayment,
};

struct Table {
    name: &'static str,
    /// Data columns, in the order `from_row` reads them after `id, user_id`.
    columns: &'static [&'static str],
    order_by: &'static str,
}

fn table(kind: RecordKind) -> Table {
    match kind {
        RecordKind::Budget => Table {
            name: "budgets",
            columns: &["category", "amount", "spent", "period", "month", "year"],
            order_by: "created_at DESC, id DESC",
        },
        RecordKind::Debt => Table {
            name: "debts",
            columns: &[
                "direction",
                "name",
                "description",
                "amount",
                "amount_paid",
                "status",
                "interest_rate",
                "due_date",
            ],
            order_by: "created_at DESC, id DESC",
        },
        RecordKind::Investment => Table {
            name: "investments",
            columns: &[
                "name",
                "type",
                "amount",
                "current_value",
                "return_rate",
                "purchase_date",
            ],
            order_by: "created_at DESC, id DESC",
        },
        RecordKind::Recurring => Table {
            name: "recurring_payments",
            columns: &[
                "name",
                "amount",
                "category",
                "frequency",
                "next_date",
                "is_active",
            ],
            order_by: "next_date ASC, id ASC",
        },
        RecordKind::Goal => Table {
            name: "goals",
            columns: &[
                "name",
                "target_amount",
                "current_amount",
                "deadline",
                "category",
            ],
            order_by: "created_at DESC, id DESC",
        },
    }
}

fn select_sql(t: &Table) -> String {
    format!(
        "SELECT id, user_id, {}, created_at, updated_at FROM {}",
        t.columns.join(", "),
        t.name
    )
}

fn from_row(kind: RecordKind, r: &Row<'_>) -> rusqlite::Result<Record> {
    let n = table(kind).columns.len();
    let (created_at, updated_at) = (r.get(n + 2)?, r.get(n + 3)?);
    let (id, user_id) = (r.get(0)?, r.get(1)?);
    Ok(match kind {
        RecordKind::Budget => Record::Budget(Budget {
            id,
            user_id,
            category: r.get(2)?,
            amount: get_decimal(r, 3)?,
            spent: get_decimal(r, 4)?,
            period: r.get(5)?,
            month: r.get(6)?,
            year: r.get(7)?,
            created_at,
            updated_at,
        }),
        RecordKind::Debt => Record::Debt(Debt {
            id,
            user_id,
            direction: get_enum(r, 2)?,
            name: r.get(3)?,
            description: r.get(4)?,
            amount: get_decimal(r, 5)?,
            amount_paid: get_decimal(r, 6)?,
            status: get_enum(r, 7)?,
            interest_rate: get_decimal(r, 8)?,
            due_date: r.get(9)?,
            created_at,
            updated_at,
        }),
        RecordKind::Investment => Record::Investment(Investment {
            id,
            user_id,
            name: r.get(2)?,
            r#type: r.get(3)?,
            amount: get_decimal(r, 4)?,
            current_value: get_decimal(r, 5)?,
            return_rate: get_decimal(r, 6)?,
            purchase_date: r.get(7)?,
            created_at,
            updated_at,
        }),
        RecordKind::Recurring => Record::Recurring(RecurringPayment {
            id,
            user_id,
            name: r.get(2)?,
            amount: get_decimal(r, 3)?,
            category: r.get(4)?,
            frequency: get_enum(r, 5)?,
            next_date: r.get(6)?,
            is_active: r.get(7)?,
            created_at,
            updated_at,
        }),
        RecordKind::Goal => Record::Goal(Goal {
            id,
            user_id,
            name: r.get(2)?,
            target_amount: get_decimal(r, 3)?,
            current_amount: get_decimal(r, 4)?,
            deadline: r.get(5)?,
            category: r.get(6)?,
            created_at,
            updated_at,
        }),
    })
}

/// Values for `table(kind).columns`, in the same order.
fn values(rec: &Record) -> Vec<Box<dyn ToSql>> {
    fn d(v: Decimal) -> Box<dyn ToSql> {
        Box::new(v.to_string())
    }
    match rec {
        Record::Budget(b) => vec![
            Box::new(b.category.trim().to_string()),
            d(b.amount),
            d(b.spent),
            Box::new(b.period.clone()),
            Box::new(b.month),
            Box::new(b.year),
        ],
        Record::Debt(x) => vec![
            Box::new(x.direction.as_str()),
            Box::new(x.name.trim().to_string()),
            Box::new(x.description.clone()),
            d(x.amount),
            d(x.amount_paid),
            Box::new(x.status.as_str()),
            d(x.interest_rate),
            Box::new(x.due_date),
        ],
        Record::Investment(x) => vec![
            Box::new(x.name.trim().to_string()),
            Box::new(x.r#type.clone()),
            d(x.amount),
            d(x.current_value),
            d(x.return_rate),
            Box::new(x.purchase_date),
        ],
        Record::Recurring(x) => vec![
            Box::new(x.name.trim().to_string()),
            d(x.amount),
            Box::new(x.category.clone()),
            Box::new(x.frequency.as_str()),
            Box::new(x.next_date),
            Box::new(x.is_active),
        ],
        Record::Goal(x) => vec![
            Box::new(x.name.trim().to_string()),
            d(x.target_amount),
            d(x.current_amount),
            Box::new(x.deadline),
            Box::new(x.category.clone()),
        ],
    }
}

impl Service<'_> {
    pub fn list_records(&self, kind: RecordKind) -> FinanceResult<Vec<Record>> {
        let t = table(kind);
        let sql = format!("{} WHERE user_id=?1 ORDER BY {}", select_sql(&t), t.order_by);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![self.user_id], |r| from_row(kind, r))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn get_record(&self, kind: RecordKind, id: RecordId) -> FinanceResult<Record> {
        let t = table(kind);
        self.conn
            .query_row(
                &format!("{} WHERE id=?1 AND user_id=?2", select_sql(&t)),
                params![id, self.user_id],
                |r| from_row(kind, r),
            )
            .map_err(not_found(kind.label()))
    }

    /// Inserts `rec` for the caller; its id and owner fields are ignored.
    pub fn create_record(&self, rec: &Record) -> FinanceResult<Record> {
        rec.validate()?;
        let t = table(rec.kind());
        let vals = values(rec);
        let n = t.columns.len();
        let placeholders: Vec<String> = (2..n + 2).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {}(user_id, {}, created_at, updated_at) VALUES (?1, {}, ?{}, ?{})",
            t.name,
            t.columns.join(", "),
            placeholders.join(", "),
            n + 2,
            n + 2
        );
        let mut bound: Vec<&dyn ToSql> = vec![&self.user_id];
        bound.extend(vals.iter().map(|v| v.as_ref()));
        let now = Utc::now();
        bound.push(&now);
        self.conn.execute(&sql, bound.as_slice())?;
        let id = self.conn.last_insert_rowid();
        debug!(user_id = self.user_id, id, table = t.name, "created record");
        self.get_record(rec.kind(), id)
    }

    /// Full-field update of the caller's record with `rec.id`.
    pub fn update_record(&self, rec: &Record) -> FinanceResult<Record> {
        rec.validate()?;
        let kind = rec.kind();
        let t = table(kind);
        let vals = values(rec);
        let n = t.columns.len();
        let sets: Vec<String> = t
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}=?{}", c, i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {}, updated_at=?{} WHERE id=?{} AND user_id=?{}",
            t.name,
            sets.join(", "),
            n + 1,
            n + 2,
            n + 3
        );
        let now = Utc::now();
        let id = rec.id();
        let mut bound: Vec<&dyn ToSql> = vals.iter().map(|v| v.as_ref()).collect();
        bound.push(&now);
        bound.push(&id);
        bound.push(&self.user_id);
        let changed = self.conn.execute(&sql, bound.as_slice())?;
        if changed == 0 {
            return Err(FinanceError::NotFound(kind.label()));
        }
        self.get_record(kind, id)
    }

    pub fn delete_record(&self, kind: RecordKind, id: RecordId) -> FinanceResult<()> {
        let t = table(kind);
        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE id=?1 AND user_id=?2", t.name),
            params![id, self.user_id],
        )?;
        if changed == 0 {
            return Err(FinanceError::NotFound(kind.label()));
        }
        debug!(user_id = self.user_id, id, table = t.name, "deleted record");
        Ok(())
    }

    pub fn list_budgets(&self) -> FinanceResult<Vec<Budget>> {
        Ok(self
            .list_records(RecordKind::Budget)?
            .into_iter()
            .filter_map(|r| match r {
                Record::Budget(b) => Some(b),
                _ => None,
            })
            .collect())
    }

    pub fn list_debts(&self) -> FinanceResult<Vec<Debt>> {
        Ok(self
            .list_records(RecordKind::Debt)?
            .into_iter()
            .filter_map(|r| match r {
                Record::Debt(d) => Some(d),
                _ => None,
            })
            .collect())
    }

    pub fn pay_debt(&self, id: RecordId, payment: Decimal) -> FinanceResult<Debt> {
        let Record::Debt(mut debt) = self.get_record(RecordKind::Debt, id)? else {
            return Err(FinanceError::NotFound("Debt"));
        };
        debt.apply_payment(payment)?;
        match self.update_record(&Record::Debt(debt))? {
            Record::Debt(d) => Ok(d),
            _ => Err(FinanceError::NotFound("Debt")),
        }
    }

    pub fn advance_recurring(&self, id: RecordId) -> FinanceResult<RecurringPayment> {
        let Record::Recurring(mut rp) = self.get_record(RecordKind::Recurring, id)? else {
            return Err(FinanceError::NotFound("Recurring payment"));
        };
        rp.advance();
        match self.update_record(&Record::Recurring(rp))? {
            Record::Recurring(r) => Ok(r),
            _ => Err(FinanceError::NotFound("Recurring payment")),
        }
    }

    pub fn contribute_to_goal(&self, id: RecordId, amount: Decimal) -> FinanceResult<Goal> {
        if amount <= Decimal::ZERO {
            return Err(FinanceError::validation("Contribution must be positive"));
        }
        let Record::Goal(mut goal) = self.get_record(RecordKind::Goal, id)? else {
            return Err(FinanceError::NotFound("Goal"));
        };
        goal.current_amount += amount;
        match self.update_record(&Record::Goal(goal))? {
            Record::Goal(g) => Ok(g),
            _ => Err(FinanceError::NotFound("Goal")),
        }
    }
}
