// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::collections::HashSet;

use crate::ledger::{Backend, Ledger};
use crate::utils::pretty_table;
use crate::{categories, currency};

/// One finding per row: an issue code and what it concerns.
pub fn findings<B: Backend>(ledger: &Ledger<B>) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    let accounts = ledger.accounts();

    let defaults: Vec<_> = accounts.iter().filter(|a| a.is_default).collect();
    if !accounts.is_empty() && defaults.is_empty() {
        rows.push(("no_default_account".into(), String::new()));
    }
    if defaults.len() > 1 {
        let names: Vec<&str> = defaults.iter().map(|a| a.name.as_str()).collect();
        rows.push(("multiple_default_accounts".into(), names.join(", ")));
    }

    for a in accounts {
        if !currency::is_known(&a.currency) {
            rows.push((
                "unknown_account_currency".into(),
                format!("{} ({})", a.name, a.currency),
            ));
        }
    }

    let prefs = ledger.preferences();
    for code in [&prefs.base_currency, &prefs.display_currency] {
        if !currency::is_known(code) {
            rows.push(("unknown_preference_currency".into(), code.clone()));
        }
    }

    let mut seen = HashSet::new();
    for t in ledger.transactions() {
        if !categories::is_known(&t.category) && seen.insert(t.category.as_str()) {
            rows.push(("unknown_category".into(), t.category.clone()));
        }
    }
    rows
}

pub fn handle<B: Backend>(ledger: &Ledger<B>) -> Result<()> {
    let rows = findings(ledger);
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        let data = rows.into_iter().map(|(a, b)| vec![a, b]).collect();
        println!("{}", pretty_table(&["Issue", "Detail"], data));
    }
    Ok(())
}
