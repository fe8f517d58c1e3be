// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing::info;

use crate::ledger::{Ledger, Snapshot};
use crate::remote::HttpBackend;
use crate::utils::pretty_table;

/// Reconciles the ledger cache with the remote backend, after adopting
/// `seed` when given. The caller owns loading and saving the cache so
/// queued work survives a sync that fails part way.
pub fn handle(
    ledger: &mut Ledger<HttpBackend>,
    seed: Option<Snapshot>,
    m: &clap::ArgMatches,
) -> Result<()> {
    if let Some(snapshot) = seed {
        ledger.adopt(snapshot);
    }
    let report = ledger.sync()?;
    info!(
        uploaded = report.uploaded,
        pushed = report.pushed,
        failed = report.failed,
        "sync finished"
    );

    if m.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    let rows = vec![
        vec!["Deletions replayed".to_string(), report.deletions_replayed.to_string()],
        vec!["Uploaded".to_string(), report.uploaded.to_string()],
        vec!["Pushed (local newer)".to_string(), report.pushed.to_string()],
        vec!["Failed".to_string(), report.failed.to_string()],
        vec!["Remote records".to_string(), report.remote_records.to_string()],
    ];
    println!("{}", pretty_table(&["Sync", "Count"], rows));
    if ledger.has_pending() {
        println!("Some changes are still queued; run `budgeta sync` again later.");
    }
    Ok(())
}
