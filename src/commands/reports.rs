// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rust_decimal::Decimal;

use super::accounts::account_rows;
use super::{Money, json_flags, month_or_current, opt};
use crate::balance::{self, BalancePolicy};
use crate::categories;
use crate::models::TxKind;
use crate::ledger::{Backend, Ledger};
use crate::service::TransactionFilter;
use crate::summary::summarize;
use crate::utils::{MonthWindow, maybe_print_json, pretty_table};

pub fn handle<B: Backend>(ledger: &Ledger<B>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("balances", sub)) => balances(ledger, sub)?,
        Some(("summary", sub)) => summary(ledger, sub)?,
        Some(("trend", sub)) => trend(ledger, sub)?,
        Some(("categories", sub)) => by_category(ledger, sub)?,
        _ => {}
    }
    Ok(())
}

fn balances<B: Backend>(ledger: &Ledger<B>, sub: &clap::ArgMatches) -> Result<()> {
    let policy = if sub.get_flag("include-initial") {
        BalancePolicy::IncludeInitial
    } else {
        BalancePolicy::TransactionsOnly
    };
    let rows = account_rows(ledger, policy);
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &rows)? {
        return Ok(());
    }
    let money = Money::for_user(ledger, sub);
    let total: Decimal = rows
        .iter()
        .map(|r| r.balance)
        .fold(Decimal::ZERO, Decimal::saturating_add);
    let mut data: Vec<Vec<String>> = rows
        .into_iter()
        .map(|r| vec![r.account.name, money.show(r.balance)])
        .collect();
    data.push(vec!["Total".into(), money.show(total)]);
    let header = format!("Balance ({})", money.display);
    println!("{}", pretty_table(&["Account", header.as_str()], data));
    Ok(())
}

fn summary<B: Backend>(ledger: &Ledger<B>, sub: &clap::ArgMatches) -> Result<()> {
    let window = month_or_current(sub)?;
    let s = summarize(
        ledger.transactions(),
        &ledger.budgets(),
        &ledger.debts(),
        window,
    );
    if sub.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&s)?);
        return Ok(());
    }
    let money = Money::for_user(ledger, sub);
    let rows = vec![
        vec!["Income".to_string(), money.show(s.total_income)],
        vec!["Expense".to_string(), money.show(s.total_expense)],
        vec!["Net savings".to_string(), money.show(s.net_savings)],
        vec!["Savings rate".to_string(), format!("{:.1}%", s.savings_rate)],
        vec![
            "Budget used".to_string(),
            format!(
                "{} of {} ({:.1}%)",
                money.show(s.total_budget_spent),
                money.show(s.total_budget),
                s.budget_usage_percentage
            ),
        ],
        vec!["Debt owed".to_string(), money.show(s.total_debt_owed)],
        vec!["Debt to collect".to_string(), money.show(s.total_debt_to_collect)],
        vec![
            "Health".to_string(),
            format!("{}/100 ({})", s.health_score, s.health_label),
        ],
    ];
    println!("Summary for {}", window);
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    if !s.expenses_by_category.is_empty() {
        let cats = s
            .expenses_by_category
            .iter()
            .map(|c| {
                vec![
                    categories::display_name(&c.category).to_string(),
                    money.show(c.amount),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Expense category", "Amount"], cats));
    }
    Ok(())
}

fn trend<B: Backend>(ledger: &Ledger<B>, sub: &clap::ArgMatches) -> Result<()> {
    let account_id = sub.get_one::<i64>("account").copied();
    let months = sub
        .get_one::<u32>("months")
        .copied()
        .unwrap_or(balance::TREND_MONTHS);
    let last = MonthWindow::containing(super::today());
    let points = balance::monthly_trend(account_id, ledger.transactions(), last, months);
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &points)? {
        return Ok(());
    }
    let money = Money::for_user(ledger, sub);
    let rows = points
        .iter()
        .map(|p| {
            vec![
                p.window.to_string(),
                money.show(p.income),
                money.show(p.expense),
                money.show(p.net),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Month", "Income", "Expense", "Net"], rows)
    );
    Ok(())
}

fn by_category<B: Backend>(ledger: &Ledger<B>, sub: &clap::ArgMatches) -> Result<()> {
    let window = month_or_current(sub)?;
    let kind: TxKind = opt(sub, "type").unwrap_or("expense").parse()?;
    let limit = sub
        .get_one::<usize>("limit")
        .copied()
        .unwrap_or(balance::TOP_CATEGORY_LIMIT);
    let txs = ledger.list_transactions(&TransactionFilter {
        account_id: sub.get_one::<i64>("account").copied(),
        start_date: Some(window.start()),
        end_date: Some(window.end()),
        ..TransactionFilter::default()
    });
    let mut data = balance::breakdown_by_category(&txs, kind);
    let total: Decimal = data
        .iter()
        .map(|c| c.amount)
        .fold(Decimal::ZERO, Decimal::saturating_add);
    data.truncate(limit);
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &data)? {
        return Ok(());
    }
    let money = Money::for_user(ledger, sub);
    let rows = data
        .iter()
        .map(|c| {
            vec![
                categories::display_name(&c.category).to_string(),
                money.show(c.amount),
                format!("{:.1}%", crate::utils::percent_of(c.amount, total)),
            ]
        })
        .collect();
    println!("{} by category, {}", kind, window);
    println!("{}", pretty_table(&["Category", "Amount", "Share"], rows));
    Ok(())
}
