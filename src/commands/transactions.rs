// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};

use super::{
    Money, arg, id_of, json_flags, opt, opt_date, opt_decimal, settle, today, tx_filter,
};
use crate::categories;
use crate::ledger::{Backend, Ledger};
use crate::models::{NewTransaction, Transaction, TransactionPatch, TxKind};
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};

pub fn handle<B: Backend>(ledger: &mut Ledger<B>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ledger, sub)?,
        Some(("list", sub)) => list(ledger, sub)?,
        Some(("edit", sub)) => {
            let id = id_of(sub)?;
            let patch = TransactionPatch {
                account_id: sub.get_one::<i64>("account").copied(),
                kind: opt(sub, "type").map(str::parse::<TxKind>).transpose()?,
                amount: opt_decimal(sub, "amount")?,
                category: opt(sub, "category").map(str::to_string),
                description: opt(sub, "description").map(str::to_string),
                date: opt_date(sub, "date")?,
            };
            let t = settle(ledger.update_transaction(id, &patch)?);
            println!("Updated transaction {} ({} {})", t.id, t.kind, t.amount);
        }
        Some(("rm", sub)) => {
            let id = id_of(sub)?;
            settle(ledger.delete_transaction(id)?);
            println!("Removed transaction {}", id);
        }
        Some(("stats", sub)) => stats(ledger, sub)?,
        _ => {}
    }
    Ok(())
}

fn add<B: Backend>(ledger: &mut Ledger<B>, sub: &clap::ArgMatches) -> Result<()> {
    let account_id = match sub.get_one::<i64>("account") {
        Some(id) => *id,
        None => {
            ledger
                .default_account()
                .context("No default account; pass --account or run `account set-default`")?
                .id
        }
    };
    let new = NewTransaction {
        account_id,
        kind: arg(sub, "type")?.parse()?,
        amount: parse_decimal(arg(sub, "amount")?)?,
        category: arg(sub, "category")?.to_string(),
        description: opt(sub, "description").map(str::to_string),
        date: opt_date(sub, "date")?.unwrap_or_else(today),
    };
    if !categories::is_known(new.category.trim()) {
        tracing::warn!(category = %new.category, "category is not a built-in category id");
    }
    let t = settle(ledger.create_transaction(&new)?);
    println!(
        "Recorded {} {} in {} on {} (id {})",
        t.kind,
        t.amount,
        categories::display_name(&t.category),
        t.date,
        t.id
    );
    Ok(())
}

/// Transactions matching the list flags, newest first.
pub fn query_rows<B: Backend>(
    ledger: &Ledger<B>,
    sub: &clap::ArgMatches,
) -> Result<Vec<Transaction>> {
    Ok(ledger.list_transactions(&tx_filter(sub)?))
}

fn list<B: Backend>(ledger: &Ledger<B>, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(ledger, sub)?;
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &data)? {
        return Ok(());
    }
    let money = Money::for_user(ledger, sub);
    let names: std::collections::HashMap<i64, &str> = ledger
        .accounts()
        .iter()
        .map(|a| (a.id, a.name.as_str()))
        .collect();
    let rows: Vec<Vec<String>> = data
        .into_iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.date.to_string(),
                names.get(&t.account_id).copied().unwrap_or_default().to_string(),
                t.kind.to_string(),
                categories::display_name(&t.category).to_string(),
                money.show(t.kind.signed(t.amount)),
                t.description,
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Date", "Account", "Type", "Category", "Amount", "Description"],
            rows,
        )
    );
    Ok(())
}

fn stats<B: Backend>(ledger: &Ledger<B>, sub: &clap::ArgMatches) -> Result<()> {
    let s = ledger.transaction_stats(&tx_filter(sub)?);
    if sub.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&s)?);
        return Ok(());
    }
    let money = Money::for_user(ledger, sub);
    let rows = vec![
        vec!["Income".to_string(), money.show(s.total_income)],
        vec!["Expense".to_string(), money.show(s.total_expense)],
        vec![
            "Net".to_string(),
            money.show(s.total_income.saturating_sub(s.total_expense)),
        ],
        vec!["Count".to_string(), s.transaction_count.to_string()],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    Ok(())
}
