// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod budgets;
pub mod categories;
pub mod debts;
pub mod doctor;
pub mod exporter;
pub mod fx;
pub mod goals;
pub mod investments;
pub mod prefs;
pub mod recurring;
pub mod reports;
pub mod session;
pub mod sync;
pub mod transactions;
pub mod users;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::ArgMatches;
use rust_decimal::Decimal;

use crate::currency;
use crate::ledger::{Applied, Backend, Ledger};
use crate::models::{Record, RecordKind, TxKind};
use crate::service::TransactionFilter;
use crate::utils::{MonthWindow, parse_date, parse_decimal, parse_month};

/// Runs one per-user subcommand against `ledger`. Returns false for names
/// that are not ledger commands.
pub fn dispatch<B: Backend>(ledger: &mut Ledger<B>, name: &str, sub: &ArgMatches) -> Result<bool> {
    match name {
        "account" => accounts::handle(ledger, sub)?,
        "tx" => transactions::handle(ledger, sub)?,
        "budget" => budgets::handle(ledger, sub)?,
        "debt" => debts::handle(ledger, sub)?,
        "investment" => investments::handle(ledger, sub)?,
        "recurring" => recurring::handle(ledger, sub)?,
        "goal" => goals::handle(ledger, sub)?,
        "prefs" => prefs::handle(ledger, sub)?,
        "report" => reports::handle(ledger, sub)?,
        "export" => exporter::handle(ledger, sub)?,
        "doctor" => doctor::handle(ledger)?,
        _ => return Ok(false),
    }
    Ok(true)
}

/// A value clap has already been told is required.
pub(crate) fn arg<'a>(m: &'a ArgMatches, name: &str) -> Result<&'a str> {
    m.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("Missing --{}", name))
}

pub(crate) fn id_of(m: &ArgMatches) -> Result<i64> {
    m.get_one::<i64>("id").copied().context("Missing id")
}

pub(crate) fn opt<'a>(m: &'a ArgMatches, name: &str) -> Option<&'a str> {
    m.get_one::<String>(name).map(String::as_str)
}

pub(crate) fn opt_decimal(m: &ArgMatches, name: &str) -> Result<Option<Decimal>> {
    opt(m, name).map(parse_decimal).transpose()
}

pub(crate) fn opt_date(m: &ArgMatches, name: &str) -> Result<Option<NaiveDate>> {
    opt(m, name).map(parse_date).transpose()
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `--month`, or the current calendar month.
pub(crate) fn month_or_current(m: &ArgMatches) -> Result<MonthWindow> {
    match opt(m, "month") {
        Some(s) => parse_month(s),
        None => Ok(MonthWindow::containing(today())),
    }
}

pub(crate) fn json_flags(m: &ArgMatches) -> (bool, bool) {
    let flag = |name: &str| m.try_get_one::<bool>(name).ok().flatten().copied().unwrap_or(false);
    (flag("json"), flag("jsonl"))
}

/// Builds a filter from the shared `--account/--from/--to/--month/--type/--category` flags.
pub fn tx_filter(m: &ArgMatches) -> Result<TransactionFilter> {
    let mut filter = TransactionFilter {
        account_id: m.get_one::<i64>("account").copied(),
        start_date: opt_date(m, "from")?,
        end_date: opt_date(m, "to")?,
        kind: opt(m, "type").map(str::parse::<TxKind>).transpose()?,
        category: opt(m, "category").map(str::to_string),
        limit: m.try_get_one::<usize>("limit").ok().flatten().copied(),
    };
    if let Some(month) = opt(m, "month") {
        let w = parse_month(month)?;
        filter.start_date = Some(w.start());
        filter.end_date = Some(w.end());
    }
    Ok(filter)
}

/// Unwraps a ledger outcome, telling the user when the change only reached
/// the local cache.
pub(crate) fn settle<T>(applied: Applied<T>) -> T {
    if applied.is_local_only() {
        println!("Backend unreachable: saved locally. Run `budgeta sync` to upload it.");
    }
    applied.into_inner()
}

/// Cached records of one kind, unwrapped by `pick`, in ledger order.
pub(crate) fn records_as<B: Backend, T>(
    ledger: &Ledger<B>,
    kind: RecordKind,
    pick: impl Fn(Record) -> Option<T>,
) -> Vec<T> {
    ledger.records(kind).into_iter().filter_map(pick).collect()
}

/// Stored amounts are in the base currency; output goes through the
/// display currency (`--currency` overrides the preference).
pub(crate) struct Money {
    pub base: String,
    pub display: String,
}

impl Money {
    pub fn for_user<B: Backend>(ledger: &Ledger<B>, m: &ArgMatches) -> Self {
        let prefs = ledger.preferences();
        let display = m
            .try_get_one::<String>("currency")
            .ok()
            .flatten()
            .map(|c| c.trim().to_uppercase())
            .unwrap_or(prefs.display_currency);
        Money {
            base: prefs.base_currency,
            display,
        }
    }

    pub fn show(&self, amount: Decimal) -> String {
        currency::format_converted(amount, &self.base, &self.display)
    }
}
