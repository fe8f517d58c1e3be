// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::Utc;
use rust_decimal::Decimal;

use super::{
    Money, arg, id_of, json_flags, month_or_current, opt, opt_decimal, records_as, settle,
};
use crate::categories;
use crate::ledger::{Backend, Ledger};
use crate::models::{Budget, Record, RecordKind};
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};

pub fn handle<B: Backend>(ledger: &mut Ledger<B>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ledger, sub)?,
        Some(("list", sub)) => list(ledger, sub)?,
        Some(("rm", sub)) => {
            let id = id_of(sub)?;
            settle(ledger.delete_record(RecordKind::Budget, id)?);
            println!("Removed budget {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add<B: Backend>(ledger: &mut Ledger<B>, sub: &clap::ArgMatches) -> Result<()> {
    let window = month_or_current(sub)?;
    let now = Utc::now();
    let budget = Budget {
        id: 0,
        user_id: ledger.user_id(),
        category: arg(sub, "category")?.trim().to_string(),
        amount: parse_decimal(arg(sub, "amount")?)?,
        spent: opt_decimal(sub, "spent")?.unwrap_or(Decimal::ZERO),
        period: opt(sub, "period").unwrap_or("monthly").to_string(),
        month: window.month,
        year: window.year,
        created_at: now,
        updated_at: now,
    };
    let Record::Budget(b) = settle(ledger.create_record(&Record::Budget(budget))?) else {
        return Ok(());
    };
    println!(
        "Budget for {} in {}: {} (id {})",
        categories::display_name(&b.category),
        window,
        b.amount,
        b.id
    );
    Ok(())
}

/// Budgets for one month, oldest entry first.
pub fn budgets_for_month<B: Backend>(
    ledger: &Ledger<B>,
    sub: &clap::ArgMatches,
) -> Result<Vec<Budget>> {
    let window = month_or_current(sub)?;
    let mut out: Vec<Budget> = records_as(ledger, RecordKind::Budget, |r| match r {
        Record::Budget(b) if b.month == window.month && b.year == window.year => Some(b),
        _ => None,
    });
    out.reverse();
    Ok(out)
}

fn list<B: Backend>(ledger: &Ledger<B>, sub: &clap::ArgMatches) -> Result<()> {
    let budgets = budgets_for_month(ledger, sub)?;
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &budgets)? {
        return Ok(());
    }
    let money = Money::for_user(ledger, sub);
    let rows = budgets
        .iter()
        .map(|b| {
            vec![
                b.id.to_string(),
                categories::display_name(&b.category).to_string(),
                money.show(b.amount),
                money.show(b.spent),
                money.show(b.remaining()),
                format!("{:.1}%", b.percentage()),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Category", "Budget", "Spent", "Remaining", "Used"],
            rows
        )
    );
    Ok(())
}
