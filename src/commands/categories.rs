// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use serde_json::json;

use super::{json_flags, opt};
use crate::categories::categories_for;
use crate::models::TxKind;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    if let Some(("list", sub)) = m.subcommand() {
        let kinds: Vec<TxKind> = match opt(sub, "type") {
            Some(t) => vec![t.parse()?],
            None => TxKind::ALL.to_vec(),
        };
        let entries: Vec<_> = kinds
            .iter()
            .flat_map(|k| categories_for(*k).iter().map(move |c| (*k, c)))
            .collect();
        let (json, jsonl) = json_flags(sub);
        let values: Vec<_> = entries
            .iter()
            .map(|(k, c)| json!({"id": c.id, "name": c.name, "icon": c.icon, "type": k}))
            .collect();
        if maybe_print_json(json, jsonl, &values)? {
            return Ok(());
        }
        let rows = entries
            .iter()
            .map(|(k, c)| {
                vec![
                    k.to_string(),
                    c.id.to_string(),
                    format!("{} {}", c.icon, c.name),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Type", "Id", "Name"], rows));
    }
    Ok(())
}
