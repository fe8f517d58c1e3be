// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};

use super::{opt, settle};
use crate::models::PreferencesPatch;
use crate::ledger::{Backend, Ledger};
use crate::utils::pretty_table;

pub fn handle<B: Backend>(ledger: &mut Ledger<B>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let p = ledger.preferences();
            if sub.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&p)?);
                return Ok(());
            }
            let rows = vec![
                vec!["Mode".to_string(), p.mode.to_string()],
                vec!["Base currency".to_string(), p.base_currency],
                vec!["Display currency".to_string(), p.display_currency],
                vec!["Theme".to_string(), p.theme.to_string()],
            ];
            println!("{}", pretty_table(&["Preference", "Value"], rows));
        }
        Some(("set", sub)) => {
            let patch = PreferencesPatch {
                mode: opt(sub, "mode").map(str::parse).transpose()?,
                base_currency: opt(sub, "base-currency").map(str::to_string),
                display_currency: opt(sub, "display-currency").map(str::to_string),
                theme: opt(sub, "theme").map(str::parse).transpose()?,
            };
            if patch == PreferencesPatch::default() {
                bail!("Nothing to update; pass at least one preference flag");
            }
            let p = settle(ledger.update_preferences(&patch)?);
            println!(
                "Preferences saved ({} mode, base {}, display {})",
                p.mode, p.base_currency, p.display_currency
            );
        }
        _ => {}
    }
    Ok(())
}
