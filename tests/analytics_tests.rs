// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use budgeta::balance::{self, BalancePolicy};
use budgeta::models::{
    Account, AccountType, Budget, Debt, DebtDirection, DebtStatus, Transaction, TxKind,
};
use budgeta::summary::{HealthInputs, HealthLabel, health_breakdown, health_score, summarize};
use budgeta::utils::MonthWindow;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn tx(id: i64, account_id: i64, kind: TxKind, amount: i64, category: &str, on: &str) -> Transaction {
    Transaction {
        id,
        user_id: 1,
        account_id,
        kind,
        amount: Decimal::from(amount),
        category: category.to_string(),
        description: String::new(),
        date: date(on),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn account(id: i64, initial: i64) -> Account {
    Account {
        id,
        user_id: 1,
        name: format!("Account {}", id),
        r#type: AccountType::Bank,
        icon: "🏦".into(),
        color: "#3b82f6".into(),
        currency: "TZS".into(),
        initial_balance: Decimal::from(initial),
        is_default: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn debt(direction: DebtDirection, amount: i64, paid: i64, status: DebtStatus) -> Debt {
    Debt {
        id: 1,
        user_id: 1,
        direction,
        name: "Loan".into(),
        description: String::new(),
        amount: Decimal::from(amount),
        amount_paid: Decimal::from(paid),
        status,
        interest_rate: Decimal::ZERO,
        due_date: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn budget(month: u32, year: i32, amount: i64, spent: i64) -> Budget {
    Budget {
        id: 1,
        user_id: 1,
        category: "food".into(),
        amount: Decimal::from(amount),
        spent: Decimal::from(spent),
        period: "monthly".into(),
        month,
        year,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn balance_folds_only_the_account() {
    let txs = vec![
        tx(1, 1, TxKind::Income, 5000, "salary", "2025-03-01"),
        tx(2, 1, TxKind::Expense, 1500, "food", "2025-03-05"),
        tx(3, 2, TxKind::Expense, 700, "food", "2025-03-05"),
    ];
    assert_eq!(balance::account_balance(1, &txs), Decimal::from(3500));
    assert_eq!(balance::account_balance(2, &txs), Decimal::from(-700));
    assert_eq!(balance::account_balance(9, &txs), Decimal::ZERO);
}

#[test]
fn initial_balance_is_opt_in() {
    let txs = vec![tx(1, 1, TxKind::Income, 100, "salary", "2025-03-01")];
    let a = account(1, 1000);
    assert_eq!(
        balance::account_balance_with(&a, &txs, BalancePolicy::TransactionsOnly),
        Decimal::from(100)
    );
    assert_eq!(
        balance::account_balance_with(&a, &txs, BalancePolicy::IncludeInitial),
        Decimal::from(1100)
    );
}

#[test]
fn percent_change_guards_zero() {
    assert_eq!(
        balance::percent_change(Decimal::from(50), Decimal::ZERO),
        Decimal::ZERO
    );
    assert_eq!(
        balance::percent_change(Decimal::from(150), Decimal::from(100)),
        Decimal::from(50)
    );
}

#[test]
fn month_over_month_uses_inclusive_month_bounds() {
    let txs = vec![
        tx(1, 1, TxKind::Expense, 100, "food", "2025-02-28"),
        tx(2, 1, TxKind::Expense, 200, "food", "2025-03-01"),
        tx(3, 1, TxKind::Expense, 100, "food", "2025-03-31"),
        tx(4, 1, TxKind::Expense, 999, "food", "2025-04-01"),
    ];
    let change = balance::month_over_month(Some(1), &txs, MonthWindow::new(2025, 3).unwrap());
    assert_eq!(change.current.expense, Decimal::from(300));
    assert_eq!(change.previous.expense, Decimal::from(100));
    assert_eq!(change.expense_change, Decimal::from(200));
    assert_eq!(change.income_change, Decimal::ZERO);
}

#[test]
fn trend_is_oldest_first_and_crosses_years() {
    let txs = vec![
        tx(1, 1, TxKind::Income, 10, "salary", "2024-12-15"),
        tx(2, 1, TxKind::Income, 20, "salary", "2025-01-15"),
    ];
    let points = balance::monthly_trend(None, &txs, MonthWindow::new(2025, 1).unwrap(), 3);
    let labels: Vec<String> = points.iter().map(|p| p.window.to_string()).collect();
    assert_eq!(labels, vec!["2024-11", "2024-12", "2025-01"]);
    assert_eq!(points[1].income, Decimal::from(10));
    assert_eq!(points[2].net, Decimal::from(20));
    assert_eq!(points[2].month, "Jan");
}

#[test]
fn top_categories_sorted_and_truncated() {
    let cats = ["a", "b", "c", "d", "e", "f"];
    let mut txs: Vec<Transaction> = cats
        .iter()
        .enumerate()
        .map(|(i, c)| tx(i as i64, 1, TxKind::Expense, (i as i64 + 1) * 10, c, "2025-03-01"))
        .collect();
    txs.push(tx(99, 1, TxKind::Expense, 100, "a", "2025-03-02"));
    txs.push(tx(100, 1, TxKind::Income, 5000, "salary", "2025-03-02"));

    let top = balance::top_categories(Some(1), &txs, balance::TOP_CATEGORY_LIMIT);
    assert_eq!(top.len(), 5);
    assert_eq!(top[0].category, "a");
    assert_eq!(top[0].amount, Decimal::from(110));
    assert_eq!(top[1].category, "f");
    assert!(top.iter().all(|c| c.category != "salary"));
}

#[test]
fn account_analytics_reports_month_and_largest() {
    let txs = vec![
        tx(1, 1, TxKind::Income, 3000, "salary", "2025-03-02"),
        tx(2, 1, TxKind::Expense, 400, "food", "2025-03-03"),
        tx(3, 1, TxKind::Expense, 900, "rent", "2025-02-01"),
        tx(4, 2, TxKind::Expense, 5000, "rent", "2025-03-01"),
    ];
    let a = balance::account_analytics(1, &txs, date("2025-03-20"));
    assert_eq!(a.transaction_count, 3);
    assert_eq!(a.balance, Decimal::from(1700));
    assert_eq!(a.month_expense, Decimal::from(400));
    assert_eq!(a.prev_month_expense, Decimal::from(900));
    assert_eq!(a.monthly_trend.len(), balance::TREND_MONTHS as usize);
    assert_eq!(a.largest_expense.map(|t| t.id), Some(3));
    assert_eq!(a.avg_transactions_per_month, Decimal::new(5, 1));
}

#[test]
fn summary_of_income_and_expense() {
    let txs = vec![
        tx(1, 1, TxKind::Income, 5000, "salary", "2025-03-01"),
        tx(2, 1, TxKind::Expense, 1500, "food", "2025-03-10"),
        tx(3, 1, TxKind::Expense, 800, "food", "2025-04-01"),
    ];
    let s = summarize(&txs, &[], &[], MonthWindow::new(2025, 3).unwrap());
    assert_eq!(s.total_income, Decimal::from(5000));
    assert_eq!(s.total_expense, Decimal::from(1500));
    assert_eq!(s.net_savings, Decimal::from(3500));
    assert_eq!(s.savings_rate, Decimal::from(70));
    assert_eq!(s.transaction_count, 2);
    assert_eq!(s.expenses_by_category[0].amount, Decimal::from(1500));
}

#[test]
fn aggregates_saturate_instead_of_overflowing() {
    let mut big = tx(1, 1, TxKind::Income, 0, "salary", "2025-03-01");
    big.amount = Decimal::MAX;
    let mut bigger = big.clone();
    bigger.id = 2;
    let txs = vec![big, bigger];

    assert_eq!(balance::account_balance(1, &txs), Decimal::MAX);
    let s = summarize(&txs, &[], &[], MonthWindow::new(2025, 3).unwrap());
    assert_eq!(s.total_income, Decimal::MAX);
    assert_eq!(s.savings_rate, Decimal::from(100));
    assert_eq!(s.income_by_category[0].amount, Decimal::MAX);
    assert_eq!(balance::percent_change(Decimal::MAX, Decimal::new(1, 2)), Decimal::MAX);
}

#[test]
fn summary_without_income_has_zero_rate() {
    let txs = vec![tx(1, 1, TxKind::Expense, 10, "food", "2025-03-01")];
    let s = summarize(&txs, &[], &[], MonthWindow::new(2025, 3).unwrap());
    assert_eq!(s.savings_rate, Decimal::ZERO);
}

#[test]
fn summary_budget_and_debt_totals() {
    let budgets = vec![budget(3, 2025, 1000, 250), budget(4, 2025, 5000, 5000)];
    let debts = vec![
        debt(DebtDirection::IOwe, 1000, 400, DebtStatus::Partial),
        debt(DebtDirection::IOwe, 300, 300, DebtStatus::Paid),
        debt(DebtDirection::OwedToMe, 200, 0, DebtStatus::Pending),
    ];
    let s = summarize(&[], &budgets, &debts, MonthWindow::new(2025, 3).unwrap());
    assert_eq!(s.total_budget, Decimal::from(1000));
    assert_eq!(s.budget_remaining, Decimal::from(750));
    assert_eq!(s.budget_usage_percentage, Decimal::from(25));
    assert_eq!(s.total_debt_owed, Decimal::from(600));
    assert_eq!(s.total_debt_to_collect, Decimal::from(200));
}

#[test]
fn health_score_components() {
    let inputs = HealthInputs {
        total_income: Decimal::from(1000),
        total_expense: Decimal::from(400),
        savings_rate: Decimal::from(60),
        total_debt_owed: Decimal::ZERO,
        budget_usage_percentage: Decimal::from(50),
    };
    let b = health_breakdown(&inputs);
    assert_eq!(b.income_vs_expense, Decimal::from(30));
    assert_eq!(b.savings_rate, Decimal::from(25));
    assert_eq!(b.debt_ratio, Decimal::from(25));
    assert_eq!(b.budget_adherence, Decimal::from(10));
    assert_eq!(b.score, 90);
}

#[test]
fn health_score_floors_and_overspend() {
    let inputs = HealthInputs {
        total_income: Decimal::from(100),
        total_expense: Decimal::from(300),
        savings_rate: Decimal::from(-200),
        total_debt_owed: Decimal::from(1000),
        budget_usage_percentage: Decimal::from(140),
    };
    let b = health_breakdown(&inputs);
    assert_eq!(b.income_vs_expense, Decimal::ZERO);
    assert_eq!(b.savings_rate, Decimal::ZERO);
    assert_eq!(b.debt_ratio, Decimal::ZERO);
    assert_eq!(b.budget_adherence, Decimal::ZERO);
    assert_eq!(health_score(&inputs), 0);
}

#[test]
fn health_labels() {
    assert_eq!(HealthLabel::for_score(80), HealthLabel::Excellent);
    assert_eq!(HealthLabel::for_score(79), HealthLabel::Good);
    assert_eq!(HealthLabel::for_score(40), HealthLabel::Fair);
    assert_eq!(HealthLabel::for_score(39), HealthLabel::NeedsAttention);
    assert_eq!(HealthLabel::NeedsAttention.to_string(), "Needs Attention");
}
