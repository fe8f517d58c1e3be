// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::Utc;
use rust_decimal::Decimal;

use super::{Money, arg, id_of, json_flags, opt, opt_date, opt_decimal, records_as, settle};
use crate::models::{Goal, Record, RecordKind};
use crate::ledger::{Backend, Ledger};
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};

pub fn handle<B: Backend>(ledger: &mut Ledger<B>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let now = Utc::now();
            let goal = Goal {
                id: 0,
                user_id: ledger.user_id(),
                name: arg(sub, "name")?.trim().to_string(),
                target_amount: parse_decimal(arg(sub, "target")?)?,
                current_amount: opt_decimal(sub, "current")?.unwrap_or(Decimal::ZERO),
                deadline: opt_date(sub, "deadline")?,
                category: opt(sub, "category").map(str::to_string),
                created_at: now,
                updated_at: now,
            };
            let created = settle(ledger.create_record(&Record::Goal(goal))?);
            println!("Added goal (id {})", created.id());
        }
        Some(("list", sub)) => list(ledger, sub)?,
        Some(("contribute", sub)) => {
            let id = id_of(sub)?;
            let g = settle(ledger.contribute_to_goal(id, parse_decimal(arg(sub, "amount")?)?)?);
            println!("'{}' is {}% funded", g.name, g.percentage());
        }
        Some(("rm", sub)) => {
            let id = id_of(sub)?;
            settle(ledger.delete_record(RecordKind::Goal, id)?);
            println!("Removed goal {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn list<B: Backend>(ledger: &Ledger<B>, sub: &clap::ArgMatches) -> Result<()> {
    let goals: Vec<Goal> = records_as(ledger, RecordKind::Goal, |r| match r {
        Record::Goal(g) => Some(g),
        _ => None,
    });
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &goals)? {
        return Ok(());
    }
    let money = Money::for_user(ledger, sub);
    let rows = goals
        .iter()
        .map(|g| {
            vec![
                g.id.to_string(),
                g.name.clone(),
                money.show(g.current_amount),
                money.show(g.target_amount),
                format!("{}%", g.percentage()),
                g.deadline.map(|d| d.to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Goal", "Saved", "Target", "Progress", "Deadline"],
            rows
        )
    );
    Ok(())
}
