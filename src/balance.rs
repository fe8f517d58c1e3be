// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Balance folding and per-account trend analytics over an in-memory ledger.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use crate::models::{Account, RecordId, Transaction, TxKind};
use crate::utils::{MonthWindow, percent_of, round_half_up, safe_ratio};

pub const TREND_MONTHS: u32 = 6;
pub const TOP_CATEGORY_LIMIT: usize = 5;
pub const RECENT_LIMIT: usize = 10;

/// Whether an account's stored opening balance is part of its running
/// balance. Stored balances historically exclude it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BalancePolicy {
    #[default]
    TransactionsOnly,
    IncludeInitial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct KindTotals {
    pub income: Decimal,
    pub expense: Decimal,
}

impl KindTotals {
    pub fn net(&self) -> Decimal {
        self.income.saturating_sub(self.expense)
    }

    fn add(&mut self, t: &Transaction) {
        match t.kind {
            TxKind::Income => self.income = self.income.saturating_add(t.amount),
            TxKind::Expense => self.expense = self.expense.saturating_add(t.amount),
        }
    }
}

pub fn totals<'a, I>(txs: I) -> KindTotals
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut out = KindTotals::default();
    for t in txs {
        out.add(t);
    }
    out
}

fn for_account(
    account_id: Option<RecordId>,
    txs: &[Transaction],
) -> impl Iterator<Item = &Transaction> {
    txs.iter()
        .filter(move |t| account_id.is_none_or(|id| t.account_id == id))
}

/// Running balance of one account: income adds, expense subtracts.
pub fn account_balance(account_id: RecordId, txs: &[Transaction]) -> Decimal {
    for_account(Some(account_id), txs).fold(Decimal::ZERO, |acc, t| {
        acc.saturating_add(t.kind.signed(t.amount))
    })
}

pub fn account_balance_with(
    account: &Account,
    txs: &[Transaction],
    policy: BalancePolicy,
) -> Decimal {
    let folded = account_balance(account.id, txs);
    match policy {
        BalancePolicy::TransactionsOnly => folded,
        BalancePolicy::IncludeInitial => account.initial_balance.saturating_add(folded),
    }
}

/// Income and expense inside `window`; `None` covers every account.
pub fn month_totals(
    account_id: Option<RecordId>,
    txs: &[Transaction],
    window: MonthWindow,
) -> KindTotals {
    totals(for_account(account_id, txs).filter(|t| window.contains(t.date)))
}

/// Percentage change from `previous` to `current`; 0 when `previous` is 0.
pub fn percent_change(current: Decimal, previous: Decimal) -> Decimal {
    percent_of(current.saturating_sub(previous), previous)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthChange {
    pub window: MonthWindow,
    pub current: KindTotals,
    pub previous: KindTotals,
    pub income_change: Decimal,
    pub expense_change: Decimal,
}

pub fn month_over_month(
    account_id: Option<RecordId>,
    txs: &[Transaction],
    window: MonthWindow,
) -> MonthChange {
    let current = month_totals(account_id, txs, window);
    let previous = month_totals(account_id, txs, window.previous());
    MonthChange {
        window,
        current,
        previous,
        income_change: percent_change(current.income, previous.income),
        expense_change: percent_change(current.expense, previous.expense),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub month: String,
    pub window: MonthWindow,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

/// `months` consecutive windows ending with `last`, oldest first.
pub fn monthly_trend(
    account_id: Option<RecordId>,
    txs: &[Transaction],
    last: MonthWindow,
    months: u32,
) -> Vec<TrendPoint> {
    (0..months)
        .rev()
        .map(|i| {
            let w = last.back(i);
            let t = month_totals(account_id, txs, w);
            TrendPoint {
                month: w.short_label(),
                window: w,
                income: t.income,
                expense: t.expense,
                net: t.net(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: Decimal,
}

/// Sums `kind` transactions per category, largest first. Ties keep the
/// order in which the categories first appear.
pub fn breakdown_by_category<'a, I>(txs: I, kind: TxKind) -> Vec<CategoryAmount>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<CategoryAmount> = Vec::new();
    for t in txs.into_iter().filter(|t| t.kind == kind) {
        match index.get(t.category.as_str()) {
            Some(&i) => out[i].amount = out[i].amount.saturating_add(t.amount),
            None => {
                index.insert(t.category.as_str(), out.len());
                out.push(CategoryAmount {
                    category: t.category.clone(),
                    amount: t.amount,
                });
            }
        }
    }
    out.sort_by(|a, b| b.amount.cmp(&a.amount));
    out
}

pub fn top_categories(
    account_id: Option<RecordId>,
    txs: &[Transaction],
    limit: usize,
) -> Vec<CategoryAmount> {
    let mut all = breakdown_by_category(for_account(account_id, txs), TxKind::Expense);
    all.truncate(limit);
    all
}

fn largest(txs: &[&Transaction], kind: TxKind) -> Option<Transaction> {
    let mut best: Option<&Transaction> = None;
    for t in txs.iter().copied().filter(|t| t.kind == kind) {
        if best.is_none_or(|b| t.amount > b.amount) {
            best = Some(t);
        }
    }
    best.cloned()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountAnalytics {
    pub account_id: RecordId,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
    pub month_income: Decimal,
    pub month_expense: Decimal,
    pub prev_month_income: Decimal,
    pub prev_month_expense: Decimal,
    pub income_change: Decimal,
    pub expense_change: Decimal,
    pub monthly_trend: Vec<TrendPoint>,
    pub top_categories: Vec<CategoryAmount>,
    pub transaction_count: usize,
    pub avg_transactions_per_month: Decimal,
    pub largest_income: Option<Transaction>,
    pub largest_expense: Option<Transaction>,
    pub recent_transactions: Vec<Transaction>,
}

/// Everything the account detail view shows, relative to `today`'s month.
pub fn account_analytics(
    account_id: RecordId,
    txs: &[Transaction],
    today: NaiveDate,
) -> AccountAnalytics {
    let own: Vec<&Transaction> = for_account(Some(account_id), txs).collect();
    let all = totals(own.iter().copied());
    let window = MonthWindow::containing(today);
    let change = month_over_month(Some(account_id), txs, window);
    let trend = monthly_trend(Some(account_id), txs, window, TREND_MONTHS);

    let count = own.len();
    let avg = if count > 0 {
        let per_month = safe_ratio(Decimal::from(count), Decimal::from(trend.len().max(1)));
        round_half_up(per_month * Decimal::TEN) / Decimal::TEN
    } else {
        Decimal::ZERO
    };

    AccountAnalytics {
        account_id,
        total_income: all.income,
        total_expense: all.expense,
        balance: all.net(),
        month_income: change.current.income,
        month_expense: change.current.expense,
        prev_month_income: change.previous.income,
        prev_month_expense: change.previous.expense,
        income_change: change.income_change,
        expense_change: change.expense_change,
        monthly_trend: trend,
        top_categories: top_categories(Some(account_id), txs, TOP_CATEGORY_LIMIT),
        transaction_count: count,
        avg_transactions_per_month: avg,
        largest_income: largest(&own, TxKind::Income),
        largest_expense: largest(&own, TxKind::Expense),
        recent_transactions: own.iter().take(RECENT_LIMIT).map(|t| (*t).clone()).collect(),
    }
}

