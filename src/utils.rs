// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Datelike, Months, NaiveDate};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{FinanceError, FinanceResult};

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_month(s: &str) -> Result<MonthWindow> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok(MonthWindow::containing(first))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .replace([',', ' '], "")
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Amounts are stored as TEXT; anything unparseable is a corrupt row.
pub fn decimal_from_db(s: &str) -> FinanceResult<Decimal> {
    s.parse::<Decimal>()
        .map_err(|_| FinanceError::Corrupt(format!("invalid decimal '{}'", s)))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// `numerator / denominator`, or exactly zero when the denominator is not
/// positive. Every rate and percentage in the crate goes through here.
/// Quotients beyond the `Decimal` range saturate.
pub fn safe_ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator > Decimal::ZERO {
        numerator
            .checked_div(denominator)
            .unwrap_or_else(|| saturate(numerator))
    } else {
        Decimal::ZERO
    }
}

pub fn percent_of(numerator: Decimal, denominator: Decimal) -> Decimal {
    safe_ratio(numerator, denominator).saturating_mul(Decimal::ONE_HUNDRED)
}

fn saturate(toward: Decimal) -> Decimal {
    if toward.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

/// Rounds half towards positive infinity (2.5 -> 3, -2.5 -> -2).
pub fn round_half_up(d: Decimal) -> Decimal {
    (d + Decimal::new(5, 1)).floor()
}

/// Integer percentage for progress displays; 0 for a zero total.
pub fn calculate_percentage(value: Decimal, total: Decimal) -> i64 {
    if total.is_zero() {
        return 0;
    }
    let ratio = value.checked_div(total).unwrap_or_else(|| saturate(value));
    let pct = ratio.saturating_mul(Decimal::ONE_HUNDRED);
    pct.checked_add(Decimal::new(5, 1))
        .map(|d| d.floor())
        .and_then(|d| d.to_i64())
        .unwrap_or(if pct.is_sign_negative() { i64::MIN } else { i64::MAX })
}

/// A calendar month. Both ends of the interval are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthWindow {
    pub year: i32,
    pub month: u32,
}

impl MonthWindow {
    pub fn new(year: i32, month: u32) -> FinanceResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(FinanceError::validation(format!(
                "Invalid month number {}",
                month
            )));
        }
        Ok(MonthWindow { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        MonthWindow {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn start(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn end(&self) -> NaiveDate {
        self.start()
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start() && date <= self.end()
    }

    pub fn previous(&self) -> Self {
        self.back(1)
    }

    pub fn back(&self, months: u32) -> Self {
        let d = self
            .start()
            .checked_sub_months(Months::new(months))
            .unwrap_or(NaiveDate::MIN);
        MonthWindow::containing(d)
    }

    /// Short month name, e.g. `Jan`.
    pub fn short_label(&self) -> String {
        self.start().format("%b").to_string()
    }
}

impl std::fmt::Display for MonthWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
