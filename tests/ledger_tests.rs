// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use budgeta::balance::BalancePolicy;
use budgeta::db;
use budgeta::error::{FinanceError, FinanceResult};
use budgeta::ledger::{Backend, Ledger, LocalBackend, Snapshot, Tombstone};
use budgeta::models::{
    Account, AccountPatch, AccountType, Goal, NewAccount, NewTransaction, Preferences,
    PreferencesPatch, Record, RecordId, RecordKind, Transaction, TransactionPatch, TxKind,
};
use budgeta::service::{Service, TransactionFilter, users};
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::cell::Cell;
use tempfile::tempdir;

/// A local store that can be switched offline, standing in for the HTTP
/// backend.
struct Flaky<'c> {
    inner: LocalBackend<'c>,
    offline: Cell<bool>,
    reject_records: Cell<bool>,
}

impl<'c> Flaky<'c> {
    fn new(conn: &'c Connection, user_id: RecordId) -> Self {
        Flaky {
            inner: LocalBackend::new(conn, user_id),
            offline: Cell::new(false),
            reject_records: Cell::new(false),
        }
    }

    fn check(&self) -> FinanceResult<()> {
        if self.offline.get() {
            Err(FinanceError::Unavailable("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

impl Backend for Flaky<'_> {
    fn snapshot(&self) -> FinanceResult<Snapshot> {
        self.check()?;
        self.inner.snapshot()
    }
    fn create_account(&self, new: &NewAccount) -> FinanceResult<Account> {
        self.check()?;
        self.inner.create_account(new)
    }
    fn update_account(&self, id: RecordId, patch: &AccountPatch) -> FinanceResult<Account> {
        self.check()?;
        self.inner.update_account(id, patch)
    }
    fn delete_account(&self, id: RecordId) -> FinanceResult<()> {
        self.check()?;
        self.inner.delete_account(id)
    }
    fn set_default_account(&self, id: RecordId) -> FinanceResult<Account> {
        self.check()?;
        self.inner.set_default_account(id)
    }
    fn create_transaction(&self, new: &NewTransaction) -> FinanceResult<Transaction> {
        self.check()?;
        self.inner.create_transaction(new)
    }
    fn update_transaction(
        &self,
        id: RecordId,
        patch: &TransactionPatch,
    ) -> FinanceResult<Transaction> {
        self.check()?;
        self.inner.update_transaction(id, patch)
    }
    fn delete_transaction(&self, id: RecordId) -> FinanceResult<()> {
        self.check()?;
        self.inner.delete_transaction(id)
    }
    fn update_preferences(&self, patch: &PreferencesPatch) -> FinanceResult<Preferences> {
        self.check()?;
        self.inner.update_preferences(patch)
    }
    fn create_record(&self, rec: &Record) -> FinanceResult<Record> {
        self.check()?;
        if self.reject_records.get() {
            return Err(FinanceError::Remote {
                status: 400,
                message: "rejected".into(),
            });
        }
        self.inner.create_record(rec)
    }
    fn update_record(&self, rec: &Record) -> FinanceResult<Record> {
        self.check()?;
        self.inner.update_record(rec)
    }
    fn delete_record(&self, kind: RecordKind, id: RecordId) -> FinanceResult<()> {
        self.check()?;
        self.inner.delete_record(kind, id)
    }
}

fn setup() -> (Connection, RecordId) {
    let conn = db::open_in_memory().unwrap();
    let user = users::register(&conn, "juma@example.com", "Juma").unwrap();
    (conn, user.id)
}

fn new_account(name: &str, is_default: bool) -> NewAccount {
    NewAccount {
        name: name.into(),
        r#type: AccountType::Cash,
        icon: None,
        color: None,
        currency: Some("TZS".into()),
        initial_balance: Some(Decimal::from(100)),
        is_default,
    }
}

fn new_tx(account_id: RecordId, kind: TxKind, amount: i64) -> NewTransaction {
    NewTransaction {
        account_id,
        kind,
        amount: Decimal::from(amount),
        category: "food".into(),
        description: None,
        date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
    }
}

fn goal(name: &str) -> Record {
    Record::Goal(Goal {
        id: 0,
        user_id: 0,
        name: name.into(),
        target_amount: Decimal::from(500),
        current_amount: Decimal::ZERO,
        deadline: None,
        category: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    })
}

#[test]
fn online_mutations_are_synced() {
    let (conn, uid) = setup();
    let mut ledger = Ledger::new(Flaky::new(&conn, uid));
    let acc = ledger.create_account(&new_account("Cash", true)).unwrap();
    assert!(!acc.is_local_only());
    let acc = acc.into_inner();
    assert!(acc.id > 0);

    ledger.create_transaction(&new_tx(acc.id, TxKind::Income, 50)).unwrap();
    ledger.create_transaction(&new_tx(acc.id, TxKind::Expense, 20)).unwrap();
    assert_eq!(
        ledger.account_balance(acc.id, BalancePolicy::TransactionsOnly).unwrap(),
        Decimal::from(30)
    );
    assert_eq!(
        ledger.account_balance(acc.id, BalancePolicy::IncludeInitial).unwrap(),
        Decimal::from(130)
    );
    assert!(!ledger.has_pending());

    let svc = Service::new(&conn, uid);
    assert_eq!(svc.list_transactions(&TransactionFilter::default()).unwrap().len(), 2);
}

#[test]
fn offline_mutations_get_temporary_ids_and_upload_on_sync() {
    let (conn, uid) = setup();
    let mut ledger = Ledger::new(Flaky::new(&conn, uid));
    ledger.backend().offline.set(true);

    let acc = ledger.create_account(&new_account("Cash", true)).unwrap();
    assert!(acc.is_local_only());
    let acc = acc.into_inner();
    assert_eq!(acc.id, -1);
    assert_eq!(acc.icon, AccountType::Cash.default_icon());

    let t = ledger
        .create_transaction(&new_tx(acc.id, TxKind::Expense, 20))
        .unwrap()
        .into_inner();
    assert_eq!(t.id, -2);
    assert_eq!(t.account_id, -1);
    assert!(ledger.has_pending());

    // Still offline: nothing uploads and the final fetch fails.
    assert!(ledger.sync().is_err());
    assert!(ledger.has_pending());

    ledger.backend().offline.set(false);
    let report = ledger.sync().unwrap();
    assert_eq!(report.uploaded, 2);
    assert_eq!(report.failed, 0);
    assert!(!ledger.has_pending());

    let account = &ledger.accounts()[0];
    assert!(account.id > 0);
    assert!(account.is_default);
    assert_eq!(ledger.transactions()[0].account_id, account.id);

    let svc = Service::new(&conn, uid);
    let stored = svc.list_transactions(&TransactionFilter::default()).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].account_id, account.id);
}

#[test]
fn partial_upload_keeps_failures_pending() {
    let (conn, uid) = setup();
    let mut ledger = Ledger::new(Flaky::new(&conn, uid));
    ledger.create_account(&new_account("Cash", true)).unwrap();
    ledger.backend().offline.set(true);
    ledger.create_record(&goal("Bike")).unwrap();
    ledger.create_account(&new_account("Wallet", false)).unwrap();

    ledger.backend().offline.set(false);
    ledger.backend().reject_records.set(true);
    let report = ledger.sync().unwrap();
    assert_eq!(report.uploaded, 1);
    assert_eq!(report.failed, 1);
    assert!(ledger.has_pending());
    assert_eq!(ledger.accounts().len(), 2);
    assert!(ledger.snapshot().records[0].id() < 0);

    ledger.backend().reject_records.set(false);
    let report = ledger.sync().unwrap();
    assert_eq!(report.uploaded, 1);
    assert!(!ledger.has_pending());
}

#[test]
fn deletion_guards_run_before_the_backend() {
    let (conn, uid) = setup();
    let mut ledger = Ledger::new(Flaky::new(&conn, uid));
    let only = ledger
        .create_account(&new_account("Cash", true))
        .unwrap()
        .into_inner();
    ledger.backend().offline.set(true);
    assert!(matches!(
        ledger.delete_account(only.id),
        Err(FinanceError::Integrity(_))
    ));

    let other = ledger
        .create_account(&new_account("Wallet", false))
        .unwrap()
        .into_inner();
    ledger.create_transaction(&new_tx(only.id, TxKind::Income, 5)).unwrap();
    assert!(matches!(
        ledger.delete_account(only.id),
        Err(FinanceError::Integrity(_))
    ));
    assert!(ledger.tombstones().is_empty());
    assert_eq!(ledger.accounts().len(), 2);

    // A local-only account disappears without a tombstone.
    assert!(ledger.delete_account(other.id).unwrap().is_local_only());
    assert!(ledger.tombstones().is_empty());
}

#[test]
fn offline_delete_is_replayed() {
    let (conn, uid) = setup();
    let mut ledger = Ledger::new(Flaky::new(&conn, uid));
    ledger.create_account(&new_account("Cash", true)).unwrap();
    let spare = ledger
        .create_account(&new_account("Spare", false))
        .unwrap()
        .into_inner();

    ledger.backend().offline.set(true);
    assert!(ledger.delete_account(spare.id).unwrap().is_local_only());
    assert_eq!(ledger.tombstones(), &[Tombstone::Account(spare.id)]);

    ledger.backend().offline.set(false);
    let report = ledger.sync().unwrap();
    assert_eq!(report.deletions_replayed, 1);
    assert!(ledger.tombstones().is_empty());
    assert_eq!(Service::new(&conn, uid).list_accounts().unwrap().len(), 1);
}

#[test]
fn set_default_keeps_one_default_offline() {
    let (conn, uid) = setup();
    let mut ledger = Ledger::new(Flaky::new(&conn, uid));
    let first = ledger
        .create_account(&new_account("Cash", true))
        .unwrap()
        .into_inner();
    let second = ledger
        .create_account(&new_account("Bank", false))
        .unwrap()
        .into_inner();

    ledger.backend().offline.set(true);
    ledger.set_default_account(second.id).unwrap();
    let defaults: Vec<RecordId> = ledger
        .accounts()
        .iter()
        .filter(|a| a.is_default)
        .map(|a| a.id)
        .collect();
    assert_eq!(defaults, vec![second.id]);
    assert_eq!(ledger.default_account().map(|a| a.id), Some(second.id));
    assert!(!ledger.account(first.id).unwrap().is_default);
}

#[test]
fn offline_set_default_stays_exclusive_after_sync() {
    let (conn, uid) = setup();
    let mut ledger = Ledger::new(Flaky::new(&conn, uid));
    let first = ledger
        .create_account(&new_account("Cash", true))
        .unwrap()
        .into_inner();
    let second = ledger
        .create_account(&new_account("Bank", false))
        .unwrap()
        .into_inner();

    ledger.backend().offline.set(true);
    ledger.set_default_account(second.id).unwrap();
    ledger.backend().offline.set(false);
    let report = ledger.sync().unwrap();
    assert_eq!(report.pushed, 1);

    let cached: Vec<RecordId> = ledger
        .accounts()
        .iter()
        .filter(|a| a.is_default)
        .map(|a| a.id)
        .collect();
    assert_eq!(cached, vec![second.id]);

    let stored: Vec<RecordId> = Service::new(&conn, uid)
        .list_accounts()
        .unwrap()
        .into_iter()
        .filter(|a| a.is_default)
        .map(|a| a.id)
        .collect();
    assert_eq!(stored, vec![second.id]);
    assert!(!ledger.account(first.id).unwrap().is_default);
}

#[test]
fn offline_rename_is_trimmed_like_the_service() {
    let (conn, uid) = setup();
    let mut ledger = Ledger::new(Flaky::new(&conn, uid));
    let cash = ledger
        .create_account(&new_account("Cash", true))
        .unwrap()
        .into_inner();
    let patch = AccountPatch {
        name: Some("  Wallet  ".into()),
        ..AccountPatch::default()
    };

    ledger.backend().offline.set(true);
    let offline = ledger.update_account(cash.id, &patch).unwrap();
    assert!(offline.is_local_only());
    assert_eq!(offline.value().name, "Wallet");

    ledger.backend().offline.set(false);
    let online = ledger.update_account(cash.id, &patch).unwrap();
    assert!(!online.is_local_only());
    assert_eq!(online.value().name, offline.value().name);
}

#[test]
fn last_write_wins_in_both_directions() {
    let (conn, uid) = setup();
    let mut ledger = Ledger::new(Flaky::new(&conn, uid));
    let cash = ledger
        .create_account(&new_account("Cash", true))
        .unwrap()
        .into_inner();
    let bank = ledger
        .create_account(&new_account("Bank", false))
        .unwrap()
        .into_inner();

    // Changed elsewhere after the cache saw it: remote wins.
    let svc = Service::new(&conn, uid);
    svc.update_account(
        cash.id,
        &AccountPatch {
            name: Some("Cash box".into()),
            ..AccountPatch::default()
        },
    )
    .unwrap();

    // Changed here while offline: local is newer and gets pushed.
    ledger.backend().offline.set(true);
    ledger
        .update_account(
            bank.id,
            &AccountPatch {
                name: Some("Savings".into()),
                ..AccountPatch::default()
            },
        )
        .unwrap();
    ledger.backend().offline.set(false);

    let report = ledger.sync().unwrap();
    assert_eq!(report.pushed, 1);
    assert_eq!(ledger.account(cash.id).unwrap().name, "Cash box");
    assert_eq!(ledger.account(bank.id).unwrap().name, "Savings");
    assert_eq!(svc.get_account(bank.id).unwrap().name, "Savings");
}

#[test]
fn rows_deleted_remotely_are_dropped() {
    let (conn, uid) = setup();
    let mut ledger = Ledger::new(Flaky::new(&conn, uid));
    let acc = ledger
        .create_account(&new_account("Cash", true))
        .unwrap()
        .into_inner();
    let t = ledger
        .create_transaction(&new_tx(acc.id, TxKind::Expense, 3))
        .unwrap()
        .into_inner();
    Service::new(&conn, uid).delete_transaction(t.id).unwrap();

    ledger.sync().unwrap();
    assert!(ledger.transactions().is_empty());
    assert!(matches!(
        ledger.transaction(t.id),
        Err(FinanceError::NotFound(_))
    ));
}

#[test]
fn preferences_are_validated_and_cached() {
    let (conn, uid) = setup();
    let mut ledger = Ledger::new(Flaky::new(&conn, uid));
    ledger.refresh().unwrap();
    assert!(ledger.snapshot().preferences.is_some());
    assert!(matches!(
        ledger.update_preferences(&PreferencesPatch {
            display_currency: Some("QQQ".into()),
            ..PreferencesPatch::default()
        }),
        Err(FinanceError::Validation(_))
    ));

    ledger.backend().offline.set(true);
    let p = ledger
        .update_preferences(&PreferencesPatch {
            display_currency: Some("usd".into()),
            ..PreferencesPatch::default()
        })
        .unwrap();
    assert!(p.is_local_only());
    assert_eq!(p.value().display_currency, "USD");

    ledger.backend().offline.set(false);
    let report = ledger.sync().unwrap();
    assert_eq!(report.pushed, 1);
    let stored = Service::new(&conn, uid).get_preferences().unwrap();
    assert_eq!(stored.display_currency, "USD");
}

#[test]
fn cache_round_trips_through_disk() {
    let (conn, uid) = setup();
    let dir = tempdir().unwrap();
    let path = dir.path().join("cache").join("ledger.json");

    let mut ledger = Ledger::new(Flaky::new(&conn, uid));
    ledger.create_account(&new_account("Cash", true)).unwrap();
    let spare = ledger
        .create_account(&new_account("Spare", false))
        .unwrap()
        .into_inner();
    ledger.backend().offline.set(true);
    ledger.delete_account(spare.id).unwrap();
    ledger.create_record(&goal("Laptop")).unwrap();
    ledger.save(&path).unwrap();

    let restored = Ledger::load(Flaky::new(&conn, uid), &path).unwrap();
    assert_eq!(restored.snapshot(), ledger.snapshot());
    assert_eq!(restored.tombstones(), ledger.tombstones());
    assert!(restored.has_pending());

    let empty = Ledger::load(Flaky::new(&conn, uid), &dir.path().join("missing.json")).unwrap();
    assert!(empty.accounts().is_empty());
}

#[test]
fn adopt_migrates_a_local_store() {
    let (conn, uid) = setup();
    let svc = Service::new(&conn, uid);
    let acc = svc.create_account(&new_account("Cash", true)).unwrap();
    svc.create_transaction(&new_tx(acc.id, TxKind::Income, 10)).unwrap();
    svc.create_record(&goal("Trip")).unwrap();

    let remote_conn = db::open_in_memory().unwrap();
    let remote_user = users::register(&remote_conn, "juma@example.com", "Juma").unwrap();
    let mut ledger = Ledger::new(Flaky::new(&remote_conn, remote_user.id));
    ledger.adopt(LocalBackend::new(&conn, uid).snapshot().unwrap());
    assert!(ledger.accounts().iter().all(|a| a.id < 0));
    assert_eq!(ledger.transactions()[0].account_id, ledger.accounts()[0].id);

    let report = ledger.sync().unwrap();
    assert_eq!(report.uploaded, 3);
    let remote = Service::new(&remote_conn, remote_user.id);
    assert_eq!(remote.list_accounts().unwrap().len(), 1);
    assert_eq!(remote.list_records(RecordKind::Goal).unwrap().len(), 1);
}
