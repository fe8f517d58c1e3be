// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use super::{arg, json_flags};
use crate::service::users;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let user = users::register(conn, arg(sub, "email")?, arg(sub, "name")?)?;
            println!("Registered {} <{}> (id {})", user.name, user.email, user.id);
        }
        Some(("list", sub)) => {
            let all = users::list(conn)?;
            let (json, jsonl) = json_flags(sub);
            if maybe_print_json(json, jsonl, &all)? {
                return Ok(());
            }
            let rows = all
                .into_iter()
                .map(|u| {
                    vec![
                        u.id.to_string(),
                        u.email,
                        u.name,
                        u.created_at.format("%Y-%m-%d").to_string(),
                    ]
                })
                .collect();
            println!("{}", pretty_table(&["ID", "Email", "Name", "Created"], rows));
        }
        _ => {}
    }
    Ok(())
}
