// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;
use std::time::Duration;

use budgeta::commands::{budgets, doctor, exporter, session, transactions, tx_filter};
use budgeta::config::Config;
use budgeta::ledger::{Ledger, LocalBackend};
use budgeta::models::{AccountType, NewAccount, NewTransaction, TxKind};
use budgeta::remote::HttpBackend;
use budgeta::service::{Service, users};
use budgeta::{cli, db};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use tempfile::tempdir;

fn setup() -> (Connection, i64) {
    let conn = db::open_in_memory().unwrap();
    let user = users::register(&conn, "neema@example.com", "Neema").unwrap();
    (conn, user.id)
}

fn ledger(conn: &Connection, uid: i64) -> Ledger<LocalBackend<'_>> {
    let mut ledger = Ledger::new(LocalBackend::new(conn, uid));
    ledger.refresh().unwrap();
    ledger
}

fn seed(ledger: &mut Ledger<LocalBackend<'_>>) -> i64 {
    let acc = ledger
        .create_account(&NewAccount {
            name: "Checking".into(),
            r#type: AccountType::Bank,
            icon: None,
            color: None,
            currency: Some("USD".into()),
            initial_balance: None,
            is_default: true,
        })
        .unwrap()
        .into_inner();
    for (day, kind, amount, category) in [
        (1, TxKind::Income, 5000, "salary"),
        (2, TxKind::Expense, 12, "food"),
        (3, TxKind::Expense, 30, "transport"),
    ] {
        ledger
            .create_transaction(&NewTransaction {
                account_id: acc.id,
                kind,
                amount: Decimal::from(amount),
                category: category.into(),
                description: Some("Weekly run".into()),
                date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            })
            .unwrap();
    }
    acc.id
}

/// Matches of the top-level subcommand.
fn command(args: &[&str]) -> clap::ArgMatches {
    let m = cli::build_cli().get_matches_from(args);
    match m.subcommand() {
        Some((_, sub)) => sub.clone(),
        None => panic!("no subcommand in {:?}", args),
    }
}

fn leaf(args: &[&str]) -> clap::ArgMatches {
    let mut m = cli::build_cli().get_matches_from(args);
    while let Some((_, sub)) = m.subcommand() {
        m = sub.clone();
    }
    m
}

#[test]
fn list_limit_respected() {
    let (conn, uid) = setup();
    let mut ledger = ledger(&conn, uid);
    seed(&mut ledger);
    let m = leaf(&["budgeta", "tx", "list", "--limit", "2"]);
    let rows = transactions::query_rows(&ledger, &m).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2025, 1, 3).unwrap());
}

#[test]
fn list_filters_by_type_and_month() {
    let (conn, uid) = setup();
    let mut ledger = ledger(&conn, uid);
    seed(&mut ledger);
    let m = leaf(&["budgeta", "tx", "list", "--type", "expense", "--month", "2025-01"]);
    let rows = transactions::query_rows(&ledger, &m).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|t| t.kind == TxKind::Expense));

    let m = leaf(&["budgeta", "tx", "list", "--month", "2025-02"]);
    assert!(transactions::query_rows(&ledger, &m).unwrap().is_empty());
}

#[test]
fn month_overrides_date_range() {
    let m = leaf(&["budgeta", "tx", "stats", "--month", "2024-02"]);
    let f = tx_filter(&m).unwrap();
    assert_eq!(f.start_date, NaiveDate::from_ymd_opt(2024, 2, 1));
    assert_eq!(f.end_date, NaiveDate::from_ymd_opt(2024, 2, 29));
}

#[test]
fn month_conflicts_with_from() {
    let res = cli::build_cli().try_get_matches_from([
        "budgeta", "tx", "list", "--month", "2025-01", "--from", "2025-01-01",
    ]);
    assert!(res.is_err());
}

#[test]
fn export_transactions_to_json() {
    let (conn, uid) = setup();
    let mut ledger = ledger(&conn, uid);
    seed(&mut ledger);
    let dir = tempdir().unwrap();
    let out = dir.path().join("export.json");
    let out_str = out.to_string_lossy().to_string();

    let sub = command(&[
        "budgeta",
        "export",
        "transactions",
        "--format",
        "json",
        "--out",
        out_str.as_str(),
    ]);
    exporter::handle(&ledger, &sub).unwrap();

    let text = std::fs::read_to_string(&out).unwrap();
    let items: serde_json::Value = serde_json::from_str(&text).unwrap();
    let arr = items.as_array().unwrap();
    assert_eq!(arr.len(), 3);
    assert_eq!(arr[0]["date"], "2025-01-01");
    assert_eq!(arr[0]["account"], "Checking");
    assert_eq!(arr[0]["currency"], "USD");
    assert_eq!(arr[1]["type"], "expense");
    assert_eq!(arr[1]["amount"], "12");
    assert_eq!(arr[1]["description"], "Weekly run");
}

#[test]
fn export_transactions_to_csv_with_filter() {
    let (conn, uid) = setup();
    let mut ledger = ledger(&conn, uid);
    seed(&mut ledger);
    let dir = tempdir().unwrap();
    let out = dir.path().join("export.csv");
    let out_str = out.to_string_lossy().to_string();

    let sub = command(&[
        "budgeta",
        "export",
        "transactions",
        "--type",
        "expense",
        "--out",
        out_str.as_str(),
    ]);
    exporter::handle(&ledger, &sub).unwrap();

    let mut rdr = csv::Reader::from_path(&out).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "id");
    assert_eq!(&headers[6], "category");
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(&records[0][6], "Food & Dining");
    assert_eq!(&records[1][5], "30");
}

#[test]
fn export_unknown_format_writes_nothing() {
    let (conn, uid) = setup();
    let mut ledger = ledger(&conn, uid);
    seed(&mut ledger);
    let dir = tempdir().unwrap();
    let out = dir.path().join("export.xml");
    let out_str = out.to_string_lossy().to_string();

    let sub = command(&[
        "budgeta",
        "export",
        "transactions",
        "--format",
        "xml",
        "--out",
        out_str.as_str(),
    ]);
    assert!(exporter::handle(&ledger, &sub).is_err());
    assert!(!out.exists());
}

#[test]
fn budgets_filtered_by_month() {
    let (conn, uid) = setup();
    let mut ledger = ledger(&conn, uid);
    for (month, category) in [("2025-01", "food"), ("2025-01", "rent"), ("2025-02", "food")] {
        let m = command(&[
            "budgeta", "budget", "add", "--category", category, "--amount", "100", "--month", month,
        ]);
        budgets::handle(&mut ledger, &m).unwrap();
    }
    let m = leaf(&["budgeta", "budget", "list", "--month", "2025-01"]);
    let rows = budgets::budgets_for_month(&ledger, &m).unwrap();
    let cats: Vec<&str> = rows.iter().map(|b| b.category.as_str()).collect();
    assert_eq!(cats, vec!["food", "rent"]);
    assert!(rows.iter().all(|b| b.month == 1 && b.year == 2025));
}

#[test]
fn doctor_flags_unknown_categories_and_currencies() {
    let (conn, uid) = setup();
    let mut ledger = ledger(&conn, uid);
    let acc = seed(&mut ledger);
    assert!(doctor::findings(&ledger).is_empty());

    ledger
        .create_transaction(&NewTransaction {
            account_id: acc,
            kind: TxKind::Expense,
            amount: Decimal::ONE,
            category: "mystery".into(),
            description: None,
            date: NaiveDate::from_ymd_opt(2025, 1, 9).unwrap(),
        })
        .unwrap();
    conn.execute("UPDATE accounts SET currency='ZZZ'", []).unwrap();
    ledger.refresh().unwrap();

    let issues: Vec<String> = doctor::findings(&ledger)
        .into_iter()
        .map(|(code, _)| code)
        .collect();
    assert!(issues.contains(&"unknown_category".to_string()));
    assert!(issues.contains(&"unknown_account_currency".to_string()));
}

/// Nothing listens on the discard port, so every request is refused.
fn offline_config(dir: &Path) -> Config {
    Config {
        db_path: dir.join("budgeta.db"),
        cache_path: dir.join("ledger.json"),
        user: None,
        api_url: Some("http://127.0.0.1:9".into()),
        token: None,
        timeout: Duration::from_secs(2),
        log_json: false,
    }
}

const ADD_WALLET: &[&str] = &["budgeta", "account", "add", "--name", "Wallet", "--type", "cash"];

fn run(conn: &Connection, cfg: &Config, args: &[&str]) -> anyhow::Result<()> {
    let m = cli::build_cli().get_matches_from(args);
    let (name, sub) = m.subcommand().unwrap();
    session::run(conn, cfg, name, sub)
}

#[test]
fn commands_without_backend_url_write_the_database() {
    let (conn, uid) = setup();
    let dir = tempdir().unwrap();
    let cfg = Config {
        api_url: None,
        ..offline_config(dir.path())
    };
    run(&conn, &cfg, ADD_WALLET).unwrap();

    let accounts = Service::new(&conn, uid).list_accounts().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].name, "Wallet");
    assert!(!cfg.cache_path.exists());

    let err = run(&conn, &cfg, &["budgeta", "sync"]).unwrap_err();
    assert!(err.to_string().contains("BUDGETA_API_URL"));
}

#[test]
fn commands_with_backend_url_queue_in_the_cache_when_offline() {
    let (conn, uid) = setup();
    let dir = tempdir().unwrap();
    let cfg = offline_config(dir.path());

    run(&conn, &cfg, ADD_WALLET).unwrap();
    run(&conn, &cfg, &["budgeta", "budget", "add", "--category", "food", "--amount", "80"]).unwrap();
    run(&conn, &cfg, &["budgeta", "account", "list"]).unwrap();

    let cached = Ledger::load(HttpBackend::from_config(&cfg).unwrap(), &cfg.cache_path).unwrap();
    assert!(cached.has_pending());
    assert_eq!(cached.accounts().len(), 1);
    assert_eq!(cached.accounts()[0].name, "Wallet");
    assert!(cached.accounts()[0].id < 0);
    assert_eq!(cached.budgets().len(), 1);
    assert!(cached.budgets()[0].id < 0);

    assert!(Service::new(&conn, uid).list_accounts().unwrap().is_empty());
}

#[test]
fn seed_local_is_refused_once_a_cache_exists() {
    let (conn, _) = setup();
    let dir = tempdir().unwrap();
    let cfg = offline_config(dir.path());
    run(&conn, &cfg, ADD_WALLET).unwrap();

    let err = run(&conn, &cfg, &["budgeta", "sync", "--seed-local"]).unwrap_err();
    assert!(err.to_string().contains("--seed-local"));

    let cached = Ledger::load(HttpBackend::from_config(&cfg).unwrap(), &cfg.cache_path).unwrap();
    assert_eq!(cached.accounts().len(), 1);
    assert!(cached.has_pending());
}
