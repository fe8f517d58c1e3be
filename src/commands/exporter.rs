// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use serde_json::json;
use std::collections::HashMap;

use super::{arg, tx_filter};
use crate::categories;
use crate::ledger::{Backend, Ledger};

pub fn handle<B: Backend>(ledger: &Ledger<B>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(ledger, sub),
        _ => Ok(()),
    }
}

fn export_transactions<B: Backend>(ledger: &Ledger<B>, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = arg(sub, "format")?.to_lowercase();
    let out = arg(sub, "out")?;
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let mut txs = ledger.list_transactions(&tx_filter(sub)?);
    txs.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
    let accounts: HashMap<i64, (String, String)> = ledger
        .accounts()
        .iter()
        .map(|a| (a.id, (a.name.clone(), a.currency.clone())))
        .collect();
    let lookup = |id: i64| accounts.get(&id).cloned().unwrap_or_default();

    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record([
            "id",
            "date",
            "account",
            "currency",
            "type",
            "amount",
            "category",
            "description",
        ])?;
        for t in &txs {
            let (account, currency) = lookup(t.account_id);
            wtr.write_record([
                t.id.to_string(),
                t.date.to_string(),
                account,
                currency,
                t.kind.to_string(),
                t.amount.to_string(),
                categories::display_name(&t.category).to_string(),
                t.description.clone(),
            ])?;
        }
        wtr.flush()?;
    } else {
        let items: Vec<_> = txs
            .iter()
            .map(|t| {
                let (account, currency) = lookup(t.account_id);
                json!({
                    "id": t.id,
                    "date": t.date,
                    "account": account,
                    "currency": currency,
                    "type": t.kind,
                    "amount": t.amount.to_string(),
                    "category": t.category,
                    "description": t.description,
                })
            })
            .collect();
        std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
    }
    tracing::info!(count = txs.len(), path = out, format = %fmt, "exported transactions");
    println!("Exported {} transactions to {}", txs.len(), out);
    Ok(())
}
