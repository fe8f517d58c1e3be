// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use rusqlite::Connection;

use crate::config::Config;
use crate::ledger::{Backend, Ledger, LocalBackend, Snapshot};
use crate::models::RecordId;
use crate::remote::HttpBackend;
use crate::service::users;

/// Runs a per-user subcommand: through the on-disk cache when a backend
/// URL is configured, straight against the database otherwise.
pub fn run(conn: &Connection, cfg: &Config, name: &str, sub: &ArgMatches) -> Result<()> {
    if cfg.api_url.is_some() {
        run_remote(conn, cfg, name, sub)
    } else {
        run_local(conn, cfg, name, sub)
    }
}

/// `--user`/`BUDGETA_USER` by email, or the only registered user.
pub fn resolve_user(conn: &Connection, cfg: &Config) -> Result<RecordId> {
    if let Some(email) = &cfg.user {
        return Ok(users::id_for_email(conn, email)?);
    }
    let all = users::list(conn)?;
    match all.as_slice() {
        [only] => Ok(only.id),
        [] => bail!("No users yet; run `budgeta user add --email <EMAIL> --name <NAME>`"),
        _ => bail!("Several users exist; pass --user <EMAIL> or set BUDGETA_USER"),
    }
}

/// Without a backend URL the ledger sits directly on the database.
fn run_local(conn: &Connection, cfg: &Config, name: &str, sub: &ArgMatches) -> Result<()> {
    if name == "sync" {
        bail!("sync needs BUDGETA_API_URL");
    }
    let mut ledger = Ledger::new(LocalBackend::new(conn, resolve_user(conn, cfg)?));
    ledger.refresh()?;
    super::dispatch(&mut ledger, name, sub)?;
    Ok(())
}

/// With a backend URL every command goes through the on-disk cache, which
/// is written back even when the command fails so queued work survives.
fn run_remote(conn: &Connection, cfg: &Config, name: &str, sub: &ArgMatches) -> Result<()> {
    let fresh = !cfg.cache_path.exists();
    let mut ledger = Ledger::load(HttpBackend::from_config(cfg)?, &cfg.cache_path)
        .with_context(|| format!("Failed to load {}", cfg.cache_path.display()))?;

    let outcome = if name == "sync" {
        seed(conn, cfg, fresh, sub)
            .and_then(|seed| super::sync::handle(&mut ledger, seed, sub))
    } else {
        ledger
            .warm()
            .map_err(anyhow::Error::from)
            .and_then(|_| super::dispatch(&mut ledger, name, sub).map(|_| ()))
    };
    ledger.save(&cfg.cache_path)?;
    outcome
}

/// `sync --seed-local` uploads the database once, into an empty cache.
fn seed(conn: &Connection, cfg: &Config, fresh: bool, sub: &ArgMatches) -> Result<Option<Snapshot>> {
    if !sub.get_flag("seed-local") {
        return Ok(None);
    }
    if !fresh {
        bail!(
            "--seed-local only applies before the first sync; {} already exists",
            cfg.cache_path.display()
        );
    }
    let local = LocalBackend::new(conn, resolve_user(conn, cfg)?);
    Ok(Some(local.snapshot()?))
}

