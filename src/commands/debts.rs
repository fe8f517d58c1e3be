// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::Utc;
use rust_decimal::Decimal;

use super::{
    Money, arg, id_of, json_flags, opt, opt_date, opt_decimal, records_as, settle, today,
};
use crate::models::{Debt, DebtDirection, DebtStatus, Record, RecordKind};
use crate::ledger::{Backend, Ledger};
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};

pub fn handle<B: Backend>(ledger: &mut Ledger<B>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ledger, sub)?,
        Some(("list", sub)) => list(ledger, sub)?,
        Some(("pay", sub)) => {
            let id = id_of(sub)?;
            let d = settle(ledger.pay_debt(id, parse_decimal(arg(sub, "amount")?)?)?);
            println!(
                "Debt '{}' is {} ({} of {} paid)",
                d.name, d.status, d.amount_paid, d.amount
            );
        }
        Some(("rm", sub)) => {
            let id = id_of(sub)?;
            settle(ledger.delete_record(RecordKind::Debt, id)?);
            println!("Removed debt {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add<B: Backend>(ledger: &mut Ledger<B>, sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_decimal(arg(sub, "amount")?)?;
    let amount_paid = opt_decimal(sub, "paid")?.unwrap_or(Decimal::ZERO);
    let status = if amount_paid.is_zero() {
        DebtStatus::Pending
    } else if amount_paid >= amount {
        DebtStatus::Paid
    } else {
        DebtStatus::Partial
    };
    let now = Utc::now();
    let debt = Debt {
        id: 0,
        user_id: ledger.user_id(),
        direction: arg(sub, "direction")?.parse::<DebtDirection>()?,
        name: arg(sub, "name")?.trim().to_string(),
        description: opt(sub, "description").unwrap_or_default().to_string(),
        amount,
        amount_paid,
        status,
        interest_rate: opt_decimal(sub, "interest")?.unwrap_or(Decimal::ZERO),
        due_date: opt_date(sub, "due")?,
        created_at: now,
        updated_at: now,
    };
    let created = settle(ledger.create_record(&Record::Debt(debt))?);
    println!("Added debt (id {})", created.id());
    Ok(())
}

fn list<B: Backend>(ledger: &Ledger<B>, sub: &clap::ArgMatches) -> Result<()> {
    let debts: Vec<Debt> = records_as(ledger, RecordKind::Debt, |r| match r {
        Record::Debt(d) => Some(d),
        _ => None,
    });
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &debts)? {
        return Ok(());
    }
    let money = Money::for_user(ledger, sub);
    let today = today();
    let rows = debts
        .iter()
        .map(|d| {
            let status = if d.is_overdue(today) {
                DebtStatus::Overdue
            } else {
                d.status
            };
            vec![
                d.id.to_string(),
                d.name.clone(),
                d.direction.to_string(),
                money.show(d.amount),
                money.show(d.remaining()),
                status.to_string(),
                d.due_date.map(|x| x.to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Name", "Direction", "Amount", "Remaining", "Status", "Due"],
            rows
        )
    );
    Ok(())
}
