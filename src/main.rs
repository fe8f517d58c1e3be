// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use budgeta::config::Config;
use budgeta::{cli, commands, db};

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt.json())
            .init();
    } else {
        tracing_subscriber::registry().with(filter).with(fmt).init();
    }
}

fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();
    let cfg = Config::from_env()?.with_user(matches.get_one::<String>("user"));
    init_tracing(cfg.log_json);

    let conn = db::open_or_init(&cfg.db_path)?;
    tracing::debug!(db = %cfg.db_path.display(), "opened database");

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", cfg.db_path.display());
        }
        Some(("user", sub)) => commands::users::handle(&conn, sub)?,
        Some(("category", sub)) => commands::categories::handle(sub)?,
        Some(("fx", sub)) => commands::fx::handle(sub)?,
        Some((name, sub)) => commands::session::run(&conn, &cfg, name, sub)?,
        None => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
