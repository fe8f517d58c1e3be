// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly financial summary and the composite 0-100 health score.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::balance::{CategoryAmount, breakdown_by_category, totals};
use crate::models::{Budget, Debt, DebtDirection, DebtStatus, Transaction, TxKind};
use crate::utils::{MonthWindow, percent_of, round_half_up};

const INCOME_POINTS: i64 = 30;
const SAVINGS_POINTS: i64 = 25;
const DEBT_POINTS: i64 = 25;
const BUDGET_POINTS: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthLabel {
    Excellent,
    Good,
    Fair,
    NeedsAttention,
}

impl HealthLabel {
    pub fn for_score(score: i64) -> Self {
        match score {
            s if s >= 80 => HealthLabel::Excellent,
            s if s >= 60 => HealthLabel::Good,
            s if s >= 40 => HealthLabel::Fair,
            _ => HealthLabel::NeedsAttention,
        }
    }
}

impl std::fmt::Display for HealthLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            HealthLabel::Excellent => "Excellent",
            HealthLabel::Good => "Good",
            HealthLabel::Fair => "Fair",
            HealthLabel::NeedsAttention => "Needs Attention",
        })
    }
}

/// Inputs of the health score, kept separate so the score can be computed
/// without a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct HealthInputs {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub savings_rate: Decimal,
    pub total_debt_owed: Decimal,
    pub budget_usage_percentage: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthBreakdown {
    pub income_vs_expense: Decimal,
    pub savings_rate: Decimal,
    pub debt_ratio: Decimal,
    pub budget_adherence: Decimal,
    pub score: i64,
}

/// Four independently bounded components, summed and rounded.
///
/// The savings-rate component reuses the percentage directly as points, so
/// any rate of 25% or more saturates it; a negative rate scores 0. Component
/// sums are not clamped a second time.
pub fn health_breakdown(i: &HealthInputs) -> HealthBreakdown {
    let income_vs_expense = if i.total_income > i.total_expense {
        percent_of(i.total_income - i.total_expense, i.total_income)
            .min(Decimal::from(INCOME_POINTS))
    } else {
        Decimal::ZERO
    };

    let savings_rate = i
        .savings_rate
        .clamp(Decimal::ZERO, Decimal::from(SAVINGS_POINTS));

    let debt_ratio_pct = percent_of(i.total_debt_owed, i.total_income);
    let debt_ratio =
        (Decimal::from(DEBT_POINTS) - debt_ratio_pct / Decimal::from(4)).max(Decimal::ZERO);

    let budget_adherence = if i.budget_usage_percentage <= Decimal::ONE_HUNDRED {
        Decimal::from(BUDGET_POINTS) - i.budget_usage_percentage / Decimal::from(5)
    } else {
        Decimal::ZERO
    };

    let total = income_vs_expense + savings_rate + debt_ratio + budget_adherence;
    let score = round_half_up(total).to_i64().unwrap_or(0);

    HealthBreakdown {
        income_vs_expense,
        savings_rate,
        debt_ratio,
        budget_adherence,
        score,
    }
}

pub fn health_score(i: &HealthInputs) -> i64 {
    health_breakdown(i).score
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub window: MonthWindow,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net_savings: Decimal,
    pub savings_rate: Decimal,
    pub total_budget: Decimal,
    pub total_budget_spent: Decimal,
    pub budget_remaining: Decimal,
    pub budget_usage_percentage: Decimal,
    pub total_debt_owed: Decimal,
    pub total_debt_to_collect: Decimal,
    pub expenses_by_category: Vec<CategoryAmount>,
    pub income_by_category: Vec<CategoryAmount>,
    pub health: HealthBreakdown,
    pub health_score: i64,
    pub health_label: HealthLabel,
    pub transaction_count: usize,
}

fn outstanding(debts: &[Debt], direction: DebtDirection) -> Decimal {
    debts
        .iter()
        .filter(|d| d.direction == direction && d.status != DebtStatus::Paid)
        .map(Debt::remaining)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

pub fn summarize(
    transactions: &[Transaction],
    budgets: &[Budget],
    debts: &[Debt],
    window: MonthWindow,
) -> Summary {
    let month_txs: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| window.contains(t.date))
        .collect();
    let kt = totals(month_txs.iter().copied());
    let total_income = kt.income;
    let total_expense = kt.expense;
    let net_savings = kt.net();
    let savings_rate = percent_of(net_savings, total_income);

    let month_budgets = budgets
        .iter()
        .filter(|b| b.month == window.month && b.year == window.year);
    let (total_budget, total_budget_spent) = month_budgets
        .fold((Decimal::ZERO, Decimal::ZERO), |(limit, spent), b| {
            (limit.saturating_add(b.amount), spent.saturating_add(b.spent))
        });
    let budget_usage_percentage = percent_of(total_budget_spent, total_budget);

    let total_debt_owed = outstanding(debts, DebtDirection::IOwe);
    let total_debt_to_collect = outstanding(debts, DebtDirection::OwedToMe);

    let health = health_breakdown(&HealthInputs {
        total_income,
        total_expense,
        savings_rate,
        total_debt_owed,
        budget_usage_percentage,
    });

    Summary {
        window,
        total_income,
        total_expense,
        net_savings,
        savings_rate,
        total_budget,
        total_budget_spent,
        budget_remaining: total_budget.saturating_sub(total_budget_spent),
        budget_usage_percentage,
        total_debt_owed,
        total_debt_to_collect,
        expenses_by_category: breakdown_by_category(month_txs.iter().copied(), TxKind::Expense),
        income_by_category: breakdown_by_category(month_txs.iter().copied(), TxKind::Income),
        health_score: health.score,
        health_label: HealthLabel::for_score(health.score),
        health,
        transaction_count: month_txs.len(),
    }
}
