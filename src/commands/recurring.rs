// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::Utc;
use rust_decimal::Decimal;

use super::{Money, arg, id_of, json_flags, opt, opt_date, records_as, settle, today};
use crate::models::{Frequency, Record, RecordKind, RecurringPayment};
use crate::ledger::{Backend, Ledger};
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};

pub fn handle<B: Backend>(ledger: &mut Ledger<B>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let now = Utc::now();
            let rp = RecurringPayment {
                id: 0,
                user_id: ledger.user_id(),
                name: arg(sub, "name")?.trim().to_string(),
                amount: parse_decimal(arg(sub, "amount")?)?,
                category: opt(sub, "category").unwrap_or("bills").to_string(),
                frequency: opt(sub, "frequency")
                    .map(str::parse::<Frequency>)
                    .transpose()?
                    .unwrap_or_default(),
                next_date: opt_date(sub, "next")?.unwrap_or_else(today),
                is_active: !sub.get_flag("inactive"),
                created_at: now,
                updated_at: now,
            };
            let created = settle(ledger.create_record(&Record::Recurring(rp))?);
            println!("Added recurring payment (id {})", created.id());
        }
        Some(("list", sub)) => list(ledger, sub)?,
        Some(("advance", sub)) => {
            let rp = settle(ledger.advance_recurring(id_of(sub)?)?);
            println!("'{}' next due on {}", rp.name, rp.next_date);
        }
        Some(("rm", sub)) => {
            let id = id_of(sub)?;
            settle(ledger.delete_record(RecordKind::Recurring, id)?);
            println!("Removed recurring payment {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn list<B: Backend>(ledger: &Ledger<B>, sub: &clap::ArgMatches) -> Result<()> {
    let payments: Vec<RecurringPayment> = records_as(ledger, RecordKind::Recurring, |r| match r {
        Record::Recurring(p) => Some(p),
        _ => None,
    });
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &payments)? {
        return Ok(());
    }
    let money = Money::for_user(ledger, sub);
    let monthly: Decimal = payments
        .iter()
        .filter(|p| p.is_active)
        .map(RecurringPayment::monthly_equivalent)
        .fold(Decimal::ZERO, Decimal::saturating_add);
    let rows = payments
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.name.clone(),
                money.show(p.amount),
                p.frequency.to_string(),
                p.next_date.to_string(),
                if p.is_active { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Name", "Amount", "Frequency", "Next", "Active"],
            rows
        )
    );
    println!("Monthly commitment: {}", money.show(monthly));
    Ok(())
}
