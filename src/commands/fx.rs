// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use serde_json::json;

use super::{arg, json_flags, opt};
use crate::currency::{self, CURRENCIES, CurrencyInfo};
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("convert", sub)) => {
            let amount = parse_decimal(arg(sub, "amount")?)?;
            let from = arg(sub, "from")?.trim().to_uppercase();
            let to = arg(sub, "to")?.trim().to_uppercase();
            for code in [&from, &to] {
                if !currency::is_known(code) {
                    tracing::warn!(currency = %code, "unknown currency converts at rate 1");
                }
            }
            let res = currency::convert(amount, &from, &to);
            println!(
                "{} -> {}",
                currency::format(amount, &from),
                currency::format(res, &to)
            );
        }
        Some(("list", sub)) => list(sub)?,
        Some(("format", sub)) => {
            let amount = parse_decimal(arg(sub, "amount")?)?;
            println!("{}", currency::format(amount, &arg(sub, "code")?.trim().to_uppercase()));
        }
        _ => {}
    }
    Ok(())
}

fn list(sub: &clap::ArgMatches) -> Result<()> {
    let selected: Vec<&CurrencyInfo> = match opt(sub, "group") {
        Some(g) => {
            let codes = currency::group(g);
            if codes.is_empty() {
                let names: Vec<&str> = currency::GROUPS.iter().map(|(n, _)| *n).collect();
                bail!("Unknown currency group '{}'. Available: {}", g, names.join(", "));
            }
            codes.iter().filter_map(|c| currency::lookup(c)).collect()
        }
        None => CURRENCIES.iter().collect(),
    };
    let (json, jsonl) = json_flags(sub);
    let values: Vec<_> = selected
        .iter()
        .map(|c| {
            json!({
                "code": c.code,
                "symbol": c.symbol,
                "name": c.name,
                "decimals": c.decimals,
                "rate": c.rate,
            })
        })
        .collect();
    if maybe_print_json(json, jsonl, &values)? {
        return Ok(());
    }
    let rows = selected
        .iter()
        .map(|c| {
            vec![
                c.code.to_string(),
                c.symbol.to_string(),
                c.name.to_string(),
                c.rate.to_string(),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Code", "Symbol", "Name", "Per USD"], rows));
    Ok(())
}
