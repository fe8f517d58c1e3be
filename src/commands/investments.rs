// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::Utc;
use rust_decimal::Decimal;

use super::{Money, arg, id_of, json_flags, opt, opt_date, opt_decimal, records_as, settle};
use crate::models::{Investment, Record, RecordKind};
use crate::ledger::{Backend, Ledger};
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};

pub fn handle<B: Backend>(ledger: &mut Ledger<B>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let amount = parse_decimal(arg(sub, "amount")?)?;
            let now = Utc::now();
            let inv = Investment {
                id: 0,
                user_id: ledger.user_id(),
                name: arg(sub, "name")?.trim().to_string(),
                r#type: opt(sub, "type").unwrap_or("stocks").to_string(),
                amount,
                current_value: opt_decimal(sub, "current")?.unwrap_or(amount),
                return_rate: opt_decimal(sub, "return-rate")?.unwrap_or(Decimal::ZERO),
                purchase_date: opt_date(sub, "purchased")?,
                created_at: now,
                updated_at: now,
            };
            let created = settle(ledger.create_record(&Record::Investment(inv))?);
            println!("Added investment (id {})", created.id());
        }
        Some(("list", sub)) => list(ledger, sub)?,
        Some(("rm", sub)) => {
            let id = id_of(sub)?;
            settle(ledger.delete_record(RecordKind::Investment, id)?);
            println!("Removed investment {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn list<B: Backend>(ledger: &Ledger<B>, sub: &clap::ArgMatches) -> Result<()> {
    let holdings: Vec<Investment> = records_as(ledger, RecordKind::Investment, |r| match r {
        Record::Investment(i) => Some(i),
        _ => None,
    });
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &holdings)? {
        return Ok(());
    }
    let money = Money::for_user(ledger, sub);
    let mut rows: Vec<Vec<String>> = holdings
        .iter()
        .map(|i| {
            vec![
                i.id.to_string(),
                i.name.clone(),
                i.r#type.clone(),
                money.show(i.amount),
                money.show(i.current_value),
                format!("{} ({:+.2}%)", money.show(i.gain()), i.gain_percentage()),
            ]
        })
        .collect();
    let invested: Decimal = holdings
        .iter()
        .map(|i| i.amount)
        .fold(Decimal::ZERO, Decimal::saturating_add);
    let value: Decimal = holdings
        .iter()
        .map(|i| i.current_value)
        .fold(Decimal::ZERO, Decimal::saturating_add);
    rows.push(vec![
        String::new(),
        "Total".into(),
        String::new(),
        money.show(invested),
        money.show(value),
        money.show(value - invested),
    ]);
    println!(
        "{}",
        pretty_table(
            &["ID", "Name", "Type", "Invested", "Current", "Gain"],
            rows
        )
    );
    Ok(())
}
