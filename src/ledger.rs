// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Client-side ledger: an in-memory copy of one user's data in front of a
//! [`Backend`].
//!
//! Mutations are checked locally first. A transient backend failure does not
//! fail the caller; the change is kept in the cache and reported as
//! [`Applied::LocalOnly`] until [`Ledger::sync`] reconciles it.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::hash::Hash;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::balance::{self, BalancePolicy};
use crate::currency;
use crate::error::{FinanceError, FinanceResult};
use crate::models::{
    Account, AccountPatch, Budget, Debt, Goal, NewAccount, NewTransaction, Preferences,
    PreferencesPatch, Record, RecordId, RecordKind, RecurringPayment, Transaction,
    TransactionPatch,
};
use crate::service::accounts::normalize_currency;
use crate::service::{Service, TransactionFilter, TransactionStats};
use crate::summary::{self, Summary};
use crate::utils::MonthWindow;

/// The persistence boundary behind the ledger. Implementations scope every
/// call to one user.
pub trait Backend {
    fn snapshot(&self) -> FinanceResult<Snapshot>;

    fn create_account(&self, new: &NewAccount) -> FinanceResult<Account>;
    fn update_account(&self, id: RecordId, patch: &AccountPatch) -> FinanceResult<Account>;
    fn delete_account(&self, id: RecordId) -> FinanceResult<()>;
    fn set_default_account(&self, id: RecordId) -> FinanceResult<Account>;

    fn create_transaction(&self, new: &NewTransaction) -> FinanceResult<Transaction>;
    fn update_transaction(
        &self,
        id: RecordId,
        patch: &TransactionPatch,
    ) -> FinanceResult<Transaction>;
    fn delete_transaction(&self, id: RecordId) -> FinanceResult<()>;

    fn update_preferences(&self, patch: &PreferencesPatch) -> FinanceResult<Preferences>;

    fn create_record(&self, rec: &Record) -> FinanceResult<Record>;
    fn update_record(&self, rec: &Record) -> FinanceResult<Record>;
    fn delete_record(&self, kind: RecordKind, id: RecordId) -> FinanceResult<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
    pub records: Vec<Record>,
    pub preferences: Option<Preferences>,
}

impl Snapshot {
    pub fn budgets(&self) -> Vec<Budget> {
        self.records
            .iter()
            .filter_map(|r| match r {
                Record::Budget(b) => Some(b.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn debts(&self) -> Vec<Debt> {
        self.records
            .iter()
            .filter_map(|r| match r {
                Record::Debt(d) => Some(d.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn records_of(&self, kind: RecordKind) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(move |r| r.kind() == kind)
    }
}

/// The SQLite service as a ledger backend.
pub struct LocalBackend<'c> {
    service: Service<'c>,
}

impl<'c> LocalBackend<'c> {
    pub fn new(conn: &'c Connection, user_id: RecordId) -> Self {
        LocalBackend {
            service: Service::new(conn, user_id),
        }
    }
}

impl Backend for LocalBackend<'_> {
    fn snapshot(&self) -> FinanceResult<Snapshot> {
        let mut records = Vec::new();
        for kind in [
            RecordKind::Budget,
            RecordKind::Debt,
            RecordKind::Investment,
            RecordKind::Recurring,
            RecordKind::Goal,
        ] {
            records.extend(self.service.list_records(kind)?);
        }
        Ok(Snapshot {
            accounts: self.service.list_accounts()?,
            transactions: self
                .service
                .list_transactions(&TransactionFilter::default())?,
            records,
            preferences: Some(self.service.get_preferences()?),
        })
    }

    fn create_account(&self, new: &NewAccount) -> FinanceResult<Account> {
        self.service.create_account(new)
    }

    fn update_account(&self, id: RecordId, patch: &AccountPatch) -> FinanceResult<Account> {
        self.service.update_account(id, patch)
    }

    fn delete_account(&self, id: RecordId) -> FinanceResult<()> {
        self.service.delete_account(id)
    }

    fn set_default_account(&self, id: RecordId) -> FinanceResult<Account> {
        self.service.set_default_account(id)
    }

    fn create_transaction(&self, new: &NewTransaction) -> FinanceResult<Transaction> {
        self.service.create_transaction(new)
    }

    fn update_transaction(
        &self,
        id: RecordId,
        patch: &TransactionPatch,
    ) -> FinanceResult<Transaction> {
        self.service.update_transaction(id, patch)
    }

    fn delete_transaction(&self, id: RecordId) -> FinanceResult<()> {
        self.service.delete_transaction(id)
    }

    fn update_preferences(&self, patch: &PreferencesPatch) -> FinanceResult<Preferences> {
        self.service.update_preferences(patch)
    }

    fn create_record(&self, rec: &Record) -> FinanceResult<Record> {
        self.service.create_record(rec)
    }

    fn update_record(&self, rec: &Record) -> FinanceResult<Record> {
        self.service.update_record(rec)
    }

    fn delete_record(&self, kind: RecordKind, id: RecordId) -> FinanceResult<()> {
        self.service.delete_record(kind, id)
    }
}

/// Outcome of a ledger mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied<T> {
    /// The backend accepted the change; the value is its copy.
    Synced(T),
    /// The backend was unreachable; only the cache holds the change.
    LocalOnly(T),
}

impl<T> Applied<T> {
    pub fn is_local_only(&self) -> bool {
        matches!(self, Applied::LocalOnly(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Applied::Synced(v) | Applied::LocalOnly(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Applied::Synced(v) | Applied::LocalOnly(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity", content = "id", rename_all = "snake_case")]
pub enum Tombstone {
    Account(RecordId),
    Transaction(RecordId),
    Record(RecordKind, RecordId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub deletions_replayed: usize,
    pub uploaded: usize,
    pub pushed: usize,
    pub failed: usize,
    pub remote_records: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheState {
    snapshot: Snapshot,
    tombstones: Vec<Tombstone>,
    next_temp_id: RecordId,
}

impl Default for CacheState {
    fn default() -> Self {
        CacheState {
            snapshot: Snapshot::default(),
            tombstones: Vec::new(),
            next_temp_id: -1,
        }
    }
}

fn is_local_only(id: RecordId) -> bool {
    id < 0
}

fn account_patch_from(a: &Account) -> AccountPatch {
    AccountPatch {
        name: Some(a.name.clone()),
        r#type: Some(a.r#type),
        icon: Some(a.icon.clone()),
        color: Some(a.color.clone()),
        currency: Some(a.currency.clone()),
        is_default: Some(a.is_default),
    }
}

fn new_account_from(a: &Account) -> NewAccount {
    NewAccount {
        name: a.name.clone(),
        r#type: a.r#type,
        icon: Some(a.icon.clone()),
        color: Some(a.color.clone()),
        currency: Some(a.currency.clone()),
        initial_balance: Some(a.initial_balance),
        is_default: a.is_default,
    }
}

fn transaction_patch_from(t: &Transaction) -> TransactionPatch {
    TransactionPatch {
        account_id: Some(t.account_id),
        kind: Some(t.kind),
        amount: Some(t.amount),
        category: Some(t.category.clone()),
        description: Some(t.description.clone()),
        date: Some(t.date),
    }
}

fn new_transaction_from(t: &Transaction) -> NewTransaction {
    NewTransaction {
        account_id: t.account_id,
        kind: t.kind,
        amount: t.amount,
        category: t.category.clone(),
        description: Some(t.description.clone()),
        date: t.date,
    }
}

fn preferences_patch_from(p: &Preferences) -> PreferencesPatch {
    PreferencesPatch {
        mode: Some(p.mode),
        base_currency: Some(p.base_currency.clone()),
        display_currency: Some(p.display_currency.clone()),
        theme: Some(p.theme),
    }
}

fn record_key(r: &Record) -> (RecordKind, RecordId) {
    (r.kind(), r.id())
}

/// Last-write-wins merge of one collection. Returns the merged list and the
/// local items that are newer than their remote copy.
///
/// Remote items win ties. Local items with a temporary id are kept as is;
/// other local items missing remotely were deleted elsewhere and are dropped.
fn merge_lww<T, K>(
    local: &[T],
    remote: Vec<T>,
    key: impl Fn(&T) -> K,
    local_only: impl Fn(&T) -> bool,
    stamp: impl Fn(&T) -> DateTime<Utc>,
) -> (Vec<T>, Vec<T>)
where
    T: Clone,
    K: Eq + Hash,
{
    let by_key: HashMap<K, &T> = local.iter().map(|t| (key(t), t)).collect();
    let mut merged = Vec::with_capacity(remote.len());
    let mut newer = Vec::new();
    for r in remote {
        match by_key.get(&key(&r)) {
            Some(&l) if stamp(l) > stamp(&r) => {
                newer.push(l.clone());
                merged.push(l.clone());
            }
            _ => merged.push(r),
        }
    }
    merged.extend(local.iter().filter(|t| local_only(t)).cloned());
    (merged, newer)
}

pub struct Ledger<B: Backend> {
    backend: B,
    state: CacheState,
}

impl<B: Backend> Ledger<B> {
    pub fn new(backend: B) -> Self {
        Ledger {
            backend,
            state: CacheState::default(),
        }
    }

    /// Restores a cache written by [`Ledger::save`]; a missing file yields an
    /// empty ledger.
    pub fn load(backend: B, path: &Path) -> FinanceResult<Self> {
        let state = if path.exists() {
            let text = fs::read_to_string(path)?;
            serde_json::from_str(&text).map_err(|e| {
                FinanceError::Corrupt(format!("ledger cache {}: {}", path.display(), e))
            })?
        } else {
            CacheState::default()
        };
        Ok(Ledger { backend, state })
    }

    pub fn save(&self, path: &Path) -> FinanceResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&self.state)?)?;
        debug!(path = %path.display(), "saved ledger cache");
        Ok(())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.state.snapshot
    }

    pub fn tombstones(&self) -> &[Tombstone] {
        &self.state.tombstones
    }

    /// Whether anything is waiting for [`Ledger::sync`].
    pub fn has_pending(&self) -> bool {
        let s = &self.state.snapshot;
        !self.state.tombstones.is_empty()
            || s.accounts.iter().any(|a| is_local_only(a.id))
            || s.transactions.iter().any(|t| is_local_only(t.id))
            || s.records.iter().any(|r| is_local_only(r.id()))
    }

    /// Replaces the cache with the backend's current data. Pending local
    /// changes are discarded; use [`Ledger::sync`] to keep them.
    pub fn refresh(&mut self) -> FinanceResult<()> {
        self.state.snapshot = self.backend.snapshot()?;
        self.state.tombstones.clear();
        Ok(())
    }

    /// Refreshes unless changes are pending. An unreachable backend leaves
    /// the cache as it is; returns whether the cache was refreshed.
    pub fn warm(&mut self) -> FinanceResult<bool> {
        if self.has_pending() {
            debug!("pending changes; serving from cache");
            return Ok(false);
        }
        match self.backend.snapshot() {
            Ok(snapshot) => {
                self.state.snapshot = snapshot;
                Ok(true)
            }
            Err(e) if e.is_transient() => {
                warn!(error = %e, "backend unreachable; serving from cache");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Takes over `snapshot` as unsynced local data, as when migrating a
    /// local store to an empty backend. Every row gets a temporary id.
    pub fn adopt(&mut self, snapshot: Snapshot) {
        let mut account_ids = HashMap::new();
        let mut accounts = Vec::with_capacity(snapshot.accounts.len());
        for mut a in snapshot.accounts {
            let temp = self.temp_id();
            account_ids.insert(a.id, temp);
            a.id = temp;
            accounts.push(a);
        }
        let mut transactions = Vec::with_capacity(snapshot.transactions.len());
        for mut t in snapshot.transactions {
            t.id = self.temp_id();
            if let Some(&id) = account_ids.get(&t.account_id) {
                t.account_id = id;
            }
            transactions.push(t);
        }
        let mut records = Vec::with_capacity(snapshot.records.len());
        for mut r in snapshot.records {
            let id = self.temp_id();
            r.set_id(id);
            records.push(r);
        }
        info!(
            accounts = accounts.len(),
            transactions = transactions.len(),
            records = records.len(),
            "adopted local data"
        );
        self.state.snapshot = Snapshot {
            accounts,
            transactions,
            records,
            preferences: snapshot.preferences,
        };
        self.state.tombstones.clear();
    }

    fn temp_id(&mut self) -> RecordId {
        let id = self.state.next_temp_id;
        self.state.next_temp_id -= 1;
        id
    }

    /// Runs `op` against the backend; transient failures become `None`.
    fn attempt<T>(
        &self,
        what: &str,
        op: impl FnOnce(&B) -> FinanceResult<T>,
    ) -> FinanceResult<Option<T>> {
        match op(&self.backend) {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.is_transient() => {
                warn!(error = %e, "{} applied locally only", what);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// The owner of the cached rows, or 0 before anything was loaded.
    pub fn user_id(&self) -> RecordId {
        self.state
            .snapshot
            .preferences
            .as_ref()
            .map(|p| p.user_id)
            .or_else(|| self.state.snapshot.accounts.first().map(|a| a.user_id))
            .unwrap_or_default()
    }

    // ---- reads ----

    pub fn accounts(&self) -> &[Account] {
        &self.state.snapshot.accounts
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.state.snapshot.transactions
    }

    pub fn account(&self, id: RecordId) -> FinanceResult<&Account> {
        self.state
            .snapshot
            .accounts
            .iter()
            .find(|a| a.id == id)
            .ok_or(FinanceError::NotFound("Account"))
    }

    pub fn transaction(&self, id: RecordId) -> FinanceResult<&Transaction> {
        self.state
            .snapshot
            .transactions
            .iter()
            .find(|t| t.id == id)
            .ok_or(FinanceError::NotFound("Transaction"))
    }

    pub fn default_account(&self) -> Option<&Account> {
        self.state.snapshot.accounts.iter().find(|a| a.is_default)
    }

    /// Cached preferences, or the defaults a backend would create lazily.
    pub fn preferences(&self) -> Preferences {
        self.state
            .snapshot
            .preferences
            .clone()
            .unwrap_or_else(|| Preferences::defaults_for(self.user_id()))
    }

    /// Newest first: by date, then by creation time.
    pub fn list_transactions(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        let mut out: Vec<Transaction> = self
            .state
            .snapshot
            .transactions
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });
        if let Some(limit) = filter.limit {
            out.truncate(limit);
        }
        out
    }

    /// Totals over the date range and account of `filter`; kind and category
    /// are ignored.
    pub fn transaction_stats(&self, filter: &TransactionFilter) -> TransactionStats {
        let scope = TransactionFilter {
            account_id: filter.account_id,
            start_date: filter.start_date,
            end_date: filter.end_date,
            ..TransactionFilter::default()
        };
        let txs: Vec<&Transaction> = self
            .state
            .snapshot
            .transactions
            .iter()
            .filter(|t| scope.matches(t))
            .collect();
        let totals = balance::totals(txs.iter().copied());
        TransactionStats {
            total_income: totals.income,
            total_expense: totals.expense,
            transaction_count: txs.len(),
        }
    }

    /// Records of one kind: recurring payments by next date, everything else
    /// newest first.
    pub fn records(&self, kind: RecordKind) -> Vec<Record> {
        let mut out: Vec<Record> = self.state.snapshot.records_of(kind).cloned().collect();
        match kind {
            RecordKind::Recurring => out.sort_by(|a, b| {
                let due = |r: &Record| match r {
                    Record::Recurring(p) => Some(p.next_date),
                    _ => None,
                };
                due(a).cmp(&due(b)).then(a.id().cmp(&b.id()))
            }),
            _ => out.sort_by(|a, b| {
                created_at(b)
                    .cmp(&created_at(a))
                    .then(b.id().cmp(&a.id()))
            }),
        }
        out
    }

    pub fn budgets(&self) -> Vec<Budget> {
        self.state.snapshot.budgets()
    }

    pub fn debts(&self) -> Vec<Debt> {
        self.state.snapshot.debts()
    }

    pub fn record(&self, kind: RecordKind, id: RecordId) -> FinanceResult<&Record> {
        self.state
            .snapshot
            .records
            .iter()
            .find(|r| record_key(r) == (kind, id))
            .ok_or(FinanceError::NotFound(kind.label()))
    }

    pub fn account_balance(&self, id: RecordId, policy: BalancePolicy) -> FinanceResult<Decimal> {
        let account = self.account(id)?;
        Ok(balance::account_balance_with(
            account,
            &self.state.snapshot.transactions,
            policy,
        ))
    }

    pub fn summary(&self, window: MonthWindow) -> Summary {
        let s = &self.state.snapshot;
        summary::summarize(&s.transactions, &s.budgets(), &s.debts(), window)
    }

    // ---- accounts ----

    pub fn create_account(&mut self, new: &NewAccount) -> FinanceResult<Applied<Account>> {
        new.validate()?;
        let currency = normalize_currency(new.currency.as_deref().unwrap_or("USD"))?;
        match self.attempt("create account", |b| b.create_account(new))? {
            Some(account) => {
                if account.is_default {
                    self.clear_default_except(account.id);
                }
                self.state.snapshot.accounts.push(account.clone());
                Ok(Applied::Synced(account))
            }
            None => {
                let now = Utc::now();
                let account = Account {
                    id: self.temp_id(),
                    user_id: self.user_id(),
                    name: new.name.trim().to_string(),
                    r#type: new.r#type,
                    icon: new
                        .icon
                        .clone()
                        .unwrap_or_else(|| new.r#type.default_icon().to_string()),
                    color: new
                        .color
                        .clone()
                        .unwrap_or_else(|| new.r#type.default_color().to_string()),
                    currency,
                    initial_balance: new.initial_balance.unwrap_or_default(),
                    is_default: new.is_default,
                    created_at: now,
                    updated_at: now,
                };
                if account.is_default {
                    self.clear_default_except(account.id);
                }
                self.state.snapshot.accounts.push(account.clone());
                Ok(Applied::LocalOnly(account))
            }
        }
    }

    pub fn update_account(
        &mut self,
        id: RecordId,
        patch: &AccountPatch,
    ) -> FinanceResult<Applied<Account>> {
        let mut local = self.account(id)?.clone();
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(FinanceError::validation("Account name is required"));
        }
        let mut patch = patch.clone();
        if let Some(c) = &patch.currency {
            patch.currency = Some(normalize_currency(c)?);
        }
        let remote = if is_local_only(id) {
            None
        } else {
            self.attempt("update account", |b| b.update_account(id, &patch))?
        };
        let (account, synced) = match remote {
            Some(a) => (a, true),
            None => {
                patch.apply(&mut local);
                local.updated_at = Utc::now();
                (local, false)
            }
        };
        if account.is_default {
            self.clear_default_except(id);
        }
        self.replace_account(account.clone());
        Ok(if synced {
            Applied::Synced(account)
        } else {
            Applied::LocalOnly(account)
        })
    }

    /// Refuses to remove the last account or one that transactions still
    /// reference, before the backend is contacted.
    pub fn delete_account(&mut self, id: RecordId) -> FinanceResult<Applied<()>> {
        self.account(id)?;
        if self.state.snapshot.accounts.len() <= 1 {
            return Err(FinanceError::integrity("Cannot delete the only account"));
        }
        if self
            .state
            .snapshot
            .transactions
            .iter()
            .any(|t| t.account_id == id)
        {
            return Err(FinanceError::integrity(
                "Cannot delete account with existing transactions",
            ));
        }
        let synced = if is_local_only(id) {
            false
        } else {
            let done = self.attempt("delete account", |b| b.delete_account(id))?;
            if done.is_none() {
                self.state.tombstones.push(Tombstone::Account(id));
            }
            done.is_some()
        };
        self.state.snapshot.accounts.retain(|a| a.id != id);
        Ok(if synced {
            Applied::Synced(())
        } else {
            Applied::LocalOnly(())
        })
    }

    pub fn set_default_account(&mut self, id: RecordId) -> FinanceResult<Applied<Account>> {
        let mut local = self.account(id)?.clone();
        let remote = if is_local_only(id) {
            None
        } else {
            self.attempt("set default account", |b| b.set_default_account(id))?
        };
        let synced = remote.is_some();
        let account = remote.unwrap_or_else(|| {
            local.is_default = true;
            local.updated_at = Utc::now();
            local
        });
        self.clear_default_except(id);
        self.replace_account(account.clone());
        Ok(if synced {
            Applied::Synced(account)
        } else {
            Applied::LocalOnly(account)
        })
    }

    fn clear_default_except(&mut self, id: RecordId) {
        for a in self.state.snapshot.accounts.iter_mut() {
            if a.id != id {
                a.is_default = false;
            }
        }
    }

    fn replace_account(&mut self, account: Account) {
        if let Some(slot) = self
            .state
            .snapshot
            .accounts
            .iter_mut()
            .find(|a| a.id == account.id)
        {
            *slot = account;
        }
    }

    // ---- transactions ----

    pub fn create_transaction(
        &mut self,
        new: &NewTransaction,
    ) -> FinanceResult<Applied<Transaction>> {
        new.validate()?;
        self.account(new.account_id)?;
        let remote = if is_local_only(new.account_id) {
            None
        } else {
            self.attempt("create transaction", |b| b.create_transaction(new))?
        };
        let applied = match remote {
            Some(t) => Applied::Synced(t),
            None => {
                let now = Utc::now();
                Applied::LocalOnly(Transaction {
                    id: self.temp_id(),
                    user_id: self.user_id(),
                    account_id: new.account_id,
                    kind: new.kind,
                    amount: new.amount,
                    category: new.category.trim().to_string(),
                    description: new.description.clone().unwrap_or_default(),
                    date: new.date,
                    created_at: now,
                    updated_at: now,
                })
            }
        };
        self.state.snapshot.transactions.push(applied.value().clone());
        Ok(applied)
    }

    pub fn update_transaction(
        &mut self,
        id: RecordId,
        patch: &TransactionPatch,
    ) -> FinanceResult<Applied<Transaction>> {
        let mut local = self.transaction(id)?.clone();
        patch.validate()?;
        if let Some(account_id) = patch.account_id {
            self.account(account_id)?;
        }
        let offline_target = patch.account_id.is_some_and(is_local_only);
        let remote = if is_local_only(id) || offline_target {
            None
        } else {
            self.attempt("update transaction", |b| b.update_transaction(id, patch))?
        };
        let applied = match remote {
            Some(t) => Applied::Synced(t),
            None => {
                patch.apply(&mut local);
                local.updated_at = Utc::now();
                Applied::LocalOnly(local)
            }
        };
        if let Some(slot) = self
            .state
            .snapshot
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
        {
            *slot = applied.value().clone();
        }
        Ok(applied)
    }

    pub fn delete_transaction(&mut self, id: RecordId) -> FinanceResult<Applied<()>> {
        self.transaction(id)?;
        let synced = if is_local_only(id) {
            false
        } else {
            let done = self.attempt("delete transaction", |b| b.delete_transaction(id))?;
            if done.is_none() {
                self.state.tombstones.push(Tombstone::Transaction(id));
            }
            done.is_some()
        };
        self.state.snapshot.transactions.retain(|t| t.id != id);
        Ok(if synced {
            Applied::Synced(())
        } else {
            Applied::LocalOnly(())
        })
    }

    // ---- preferences ----

    pub fn update_preferences(
        &mut self,
        patch: &PreferencesPatch,
    ) -> FinanceResult<Applied<Preferences>> {
        let mut patch = patch.clone();
        for code in [&mut patch.base_currency, &mut patch.display_currency]
            .into_iter()
            .flatten()
        {
            let normalized = normalize_currency(code)?;
            if !currency::is_known(&normalized) {
                return Err(FinanceError::validation(format!(
                    "Unsupported currency '{}'",
                    normalized
                )));
            }
            *code = normalized;
        }
        let applied = match self.attempt("update preferences", |b| b.update_preferences(&patch))? {
            Some(p) => Applied::Synced(p),
            None => {
                let mut prefs = self
                    .state
                    .snapshot
                    .preferences
                    .clone()
                    .unwrap_or_else(|| Preferences::defaults_for(self.user_id()));
                patch.apply(&mut prefs);
                prefs.updated_at = Utc::now();
                Applied::LocalOnly(prefs)
            }
        };
        self.state.snapshot.preferences = Some(applied.value().clone());
        Ok(applied)
    }

    // ---- budgets, debts, investments, recurring payments, goals ----

    pub fn create_record(&mut self, rec: &Record) -> FinanceResult<Applied<Record>> {
        rec.validate()?;
        let applied = match self.attempt("create record", |b| b.create_record(rec))? {
            Some(r) => Applied::Synced(r),
            None => {
                let mut local = rec.clone();
                local.set_id(self.temp_id());
                Applied::LocalOnly(local)
            }
        };
        self.state.snapshot.records.push(applied.value().clone());
        Ok(applied)
    }

    pub fn update_record(&mut self, rec: &Record) -> FinanceResult<Applied<Record>> {
        rec.validate()?;
        let key = record_key(rec);
        let pos = self
            .state
            .snapshot
            .records
            .iter()
            .position(|r| record_key(r) == key)
            .ok_or(FinanceError::NotFound(rec.kind().label()))?;
        let remote = if is_local_only(rec.id()) {
            None
        } else {
            self.attempt("update record", |b| b.update_record(rec))?
        };
        let applied = match remote {
            Some(r) => Applied::Synced(r),
            None => {
                let mut local = rec.clone();
                touch(&mut local);
                Applied::LocalOnly(local)
            }
        };
        self.state.snapshot.records[pos] = applied.value().clone();
        Ok(applied)
    }

    pub fn delete_record(&mut self, kind: RecordKind, id: RecordId) -> FinanceResult<Applied<()>> {
        if !self
            .state
            .snapshot
            .records
            .iter()
            .any(|r| record_key(r) == (kind, id))
        {
            return Err(FinanceError::NotFound(kind.label()));
        }
        let synced = if is_local_only(id) {
            false
        } else {
            let done = self.attempt("delete record", |b| b.delete_record(kind, id))?;
            if done.is_none() {
                self.state.tombstones.push(Tombstone::Record(kind, id));
            }
            done.is_some()
        };
        self.state
            .snapshot
            .records
            .retain(|r| record_key(r) != (kind, id));
        Ok(if synced {
            Applied::Synced(())
        } else {
            Applied::LocalOnly(())
        })
    }

    pub fn pay_debt(&mut self, id: RecordId, payment: Decimal) -> FinanceResult<Applied<Debt>> {
        let Record::Debt(mut debt) = self.record(RecordKind::Debt, id)?.clone() else {
            return Err(FinanceError::NotFound("Debt"));
        };
        debt.apply_payment(payment)?;
        map_applied(self.update_record(&Record::Debt(debt))?, |r| match r {
            Record::Debt(d) => Some(d),
            _ => None,
        })
        .ok_or(FinanceError::NotFound("Debt"))
    }

    pub fn advance_recurring(&mut self, id: RecordId) -> FinanceResult<Applied<RecurringPayment>> {
        let Record::Recurring(mut rp) = self.record(RecordKind::Recurring, id)?.clone() else {
            return Err(FinanceError::NotFound("Recurring payment"));
        };
        rp.advance();
        map_applied(self.update_record(&Record::Recurring(rp))?, |r| match r {
            Record::Recurring(p) => Some(p),
            _ => None,
        })
        .ok_or(FinanceError::NotFound("Recurring payment"))
    }

    pub fn contribute_to_goal(
        &mut self,
        id: RecordId,
        amount: Decimal,
    ) -> FinanceResult<Applied<Goal>> {
        if amount <= Decimal::ZERO {
            return Err(FinanceError::validation("Contribution must be positive"));
        }
        let Record::Goal(mut goal) = self.record(RecordKind::Goal, id)?.clone() else {
            return Err(FinanceError::NotFound("Goal"));
        };
        goal.current_amount = goal.current_amount.saturating_add(amount);
        map_applied(self.update_record(&Record::Goal(goal))?, |r| match r {
            Record::Goal(g) => Some(g),
            _ => None,
        })
        .ok_or(FinanceError::NotFound("Goal"))
    }

    // ---- reconciliation ----

    /// Replays deletions, uploads local-only rows one at a time, then merges
    /// with the backend's snapshot, last write wins on `updated_at`.
    ///
    /// Each row succeeds or fails on its own; failures stay in the cache for
    /// the next run. An unreachable backend during the final fetch is
    /// returned as an error after the earlier steps have been kept.
    pub fn sync(&mut self) -> FinanceResult<SyncReport> {
        let mut report = SyncReport::default();
        self.replay_tombstones(&mut report);
        self.upload_local_only(&mut report);

        let remote = self.backend.snapshot()?;
        self.merge(remote, &mut report);
        info!(
            deletions = report.deletions_replayed,
            uploaded = report.uploaded,
            pushed = report.pushed,
            failed = report.failed,
            "ledger synced"
        );
        Ok(report)
    }

    fn replay_tombstones(&mut self, report: &mut SyncReport) {
        let pending = std::mem::take(&mut self.state.tombstones);
        for stone in pending {
            let result = match stone {
                Tombstone::Account(id) => self.backend.delete_account(id),
                Tombstone::Transaction(id) => self.backend.delete_transaction(id),
                Tombstone::Record(kind, id) => self.backend.delete_record(kind, id),
            };
            match result {
                Ok(()) | Err(FinanceError::NotFound(_)) => report.deletions_replayed += 1,
                Err(e) if e.is_transient() => {
                    warn!(error = %e, ?stone, "deletion still pending");
                    report.failed += 1;
                    self.state.tombstones.push(stone);
                }
                Err(e) => {
                    warn!(error = %e, ?stone, "dropping rejected deletion");
                    report.failed += 1;
                }
            }
        }
    }

    fn upload_local_only(&mut self, report: &mut SyncReport) {
        let mut remapped: HashMap<RecordId, RecordId> = HashMap::new();
        let temp_accounts: Vec<Account> = self
            .state
            .snapshot
            .accounts
            .iter()
            .filter(|a| is_local_only(a.id))
            .cloned()
            .collect();
        for local in temp_accounts {
            match self.backend.create_account(&new_account_from(&local)) {
                Ok(created) => {
                    remapped.insert(local.id, created.id);
                    if let Some(slot) = self
                        .state
                        .snapshot
                        .accounts
                        .iter_mut()
                        .find(|a| a.id == local.id)
                    {
                        *slot = created;
                    }
                    report.uploaded += 1;
                }
                Err(e) => {
                    warn!(error = %e, account = %local.name, "account upload failed");
                    report.failed += 1;
                }
            }
        }
        for t in self.state.snapshot.transactions.iter_mut() {
            if let Some(&id) = remapped.get(&t.account_id) {
                t.account_id = id;
            }
        }

        let temp_transactions: Vec<Transaction> = self
            .state
            .snapshot
            .transactions
            .iter()
            .filter(|t| is_local_only(t.id))
            .cloned()
            .collect();
        for local in temp_transactions {
            if is_local_only(local.account_id) {
                debug!(transaction_id = local.id, "account not uploaded yet; skipping");
                report.failed += 1;
                continue;
            }
            match self.backend.create_transaction(&new_transaction_from(&local)) {
                Ok(created) => {
                    if let Some(slot) = self
                        .state
                        .snapshot
                        .transactions
                        .iter_mut()
                        .find(|t| t.id == local.id)
                    {
                        *slot = created;
                    }
                    report.uploaded += 1;
                }
                Err(e) => {
                    warn!(error = %e, transaction_id = local.id, "transaction upload failed");
                    report.failed += 1;
                }
            }
        }

        let temp_records: Vec<Record> = self
            .state
            .snapshot
            .records
            .iter()
            .filter(|r| is_local_only(r.id()))
            .cloned()
            .collect();
        for local in temp_records {
            match self.backend.create_record(&local) {
                Ok(created) => {
                    let key = record_key(&local);
                    if let Some(slot) = self
                        .state
                        .snapshot
                        .records
                        .iter_mut()
                        .find(|r| record_key(r) == key)
                    {
                        *slot = created;
                    }
                    report.uploaded += 1;
                }
                Err(e) => {
                    warn!(error = %e, kind = local.kind().label(), "record upload failed");
                    report.failed += 1;
                }
            }
        }
    }

    fn merge(&mut self, remote: Snapshot, report: &mut SyncReport) {
        let local = std::mem::take(&mut self.state.snapshot);
        report.remote_records =
            remote.accounts.len() + remote.transactions.len() + remote.records.len();

        let (mut accounts, newer) = merge_lww(
            &local.accounts,
            remote.accounts,
            |a| a.id,
            |a| is_local_only(a.id),
            |a| a.updated_at,
        );
        let mut pushed_default = None;
        for a in newer {
            match self.backend.update_account(a.id, &account_patch_from(&a)) {
                Ok(pushed) => {
                    if pushed.is_default {
                        pushed_default = Some(pushed.id);
                    }
                    replace_by(&mut accounts, pushed, |x| x.id);
                    report.pushed += 1;
                }
                Err(e) => {
                    warn!(error = %e, account_id = a.id, "push failed");
                    report.failed += 1;
                }
            }
        }
        // The backend cleared the siblings of a pushed default; the fetched
        // copies predate that.
        if let Some(id) = pushed_default {
            for a in accounts.iter_mut().filter(|a| a.id != id) {
                a.is_default = false;
            }
        }

        let (mut transactions, newer) = merge_lww(
            &local.transactions,
            remote.transactions,
            |t| t.id,
            |t| is_local_only(t.id),
            |t| t.updated_at,
        );
        for t in newer {
            match self
                .backend
                .update_transaction(t.id, &transaction_patch_from(&t))
            {
                Ok(pushed) => {
                    replace_by(&mut transactions, pushed, |x| x.id);
                    report.pushed += 1;
                }
                Err(e) => {
                    warn!(error = %e, transaction_id = t.id, "push failed");
                    report.failed += 1;
                }
            }
        }

        let (mut records, newer) = merge_lww(
            &local.records,
            remote.records,
            record_key,
            |r| is_local_only(r.id()),
            Record::updated_at,
        );
        for r in newer {
            match self.backend.update_record(&r) {
                Ok(pushed) => {
                    replace_by(&mut records, pushed, record_key);
                    report.pushed += 1;
                }
                Err(e) => {
                    warn!(error = %e, kind = r.kind().label(), id = r.id(), "push failed");
                    report.failed += 1;
                }
            }
        }

        let preferences = match (local.preferences, remote.preferences) {
            (Some(l), Some(r)) if l.updated_at > r.updated_at => {
                match self.backend.update_preferences(&preferences_patch_from(&l)) {
                    Ok(p) => {
                        report.pushed += 1;
                        Some(p)
                    }
                    Err(e) => {
                        warn!(error = %e, "preferences push failed");
                        report.failed += 1;
                        Some(l)
                    }
                }
            }
            (l, r) => r.or(l),
        };

        let live: HashSet<RecordId> = accounts.iter().map(|a| a.id).collect();
        let orphans = transactions
            .iter()
            .filter(|t| !live.contains(&t.account_id))
            .count();
        if orphans > 0 {
            warn!(orphans, "transactions reference accounts missing after merge");
        }

        self.state.snapshot = Snapshot {
            accounts,
            transactions,
            records,
            preferences,
        };
    }
}

fn replace_by<T, K: PartialEq>(items: &mut [T], item: T, key: impl Fn(&T) -> K) {
    let k = key(&item);
    if let Some(slot) = items.iter_mut().find(|x| key(x) == k) {
        *slot = item;
    }
}

fn map_applied<T, U>(applied: Applied<T>, f: impl FnOnce(T) -> Option<U>) -> Option<Applied<U>> {
    match applied {
        Applied::Synced(v) => f(v).map(Applied::Synced),
        Applied::LocalOnly(v) => f(v).map(Applied::LocalOnly),
    }
}

fn created_at(rec: &Record) -> DateTime<Utc> {
    match rec {
        Record::Budget(r) => r.created_at,
        Record::Debt(r) => r.created_at,
        Record::Investment(r) => r.created_at,
        Record::Recurring(r) => r.created_at,
        Record::Goal(r) => r.created_at,
    }
}

fn touch(rec: &mut Record) {
    let now = Utc::now();
    match rec {
        Record::Budget(r) => r.updated_at = now,
        Record::Debt(r) => r.updated_at = now,
        Record::Investment(r) => r.updated_at = now,
        Record::Recurring(r) => r.updated_at = now,
        Record::Goal(r) => r.updated_at = now,
    }
}
