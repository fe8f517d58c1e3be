// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use serde::Serialize;

use super::{Money, arg, id_of, json_flags, opt, opt_decimal, settle, today};
use crate::balance::{self, BalancePolicy};
use crate::categories::{QUICK_ADD_ACCOUNTS, quick_add_template};
use crate::ledger::{Backend, Ledger};
use crate::models::{Account, AccountPatch, AccountType, NewAccount};
use crate::service::TransactionFilter;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle<B: Backend>(ledger: &mut Ledger<B>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let new = NewAccount {
                name: arg(sub, "name")?.to_string(),
                r#type: arg(sub, "type")?.parse::<AccountType>()?,
                icon: opt(sub, "icon").map(str::to_string),
                color: opt(sub, "color").map(str::to_string),
                currency: opt(sub, "currency").map(str::to_string),
                initial_balance: opt_decimal(sub, "initial")?,
                is_default: sub.get_flag("default"),
            };
            let a = settle(ledger.create_account(&new)?);
            println!(
                "Added account '{}' (id {}, {}, {})",
                a.name, a.id, a.r#type, a.currency
            );
        }
        Some(("quick-add", sub)) => {
            let name = arg(sub, "template")?;
            let Some(template) = quick_add_template(name) else {
                let known: Vec<&str> = QUICK_ADD_ACCOUNTS.iter().map(|t| t.name).collect();
                bail!("Unknown template '{}'. Available: {}", name, known.join(", "));
            };
            let currency = match opt(sub, "currency") {
                Some(c) => c.to_string(),
                None => ledger.preferences().base_currency,
            };
            let a = settle(ledger.create_account(&template.to_new_account(&currency))?);
            println!("Added account '{}' (id {})", a.name, a.id);
        }
        Some(("list", sub)) => list(ledger, sub)?,
        Some(("edit", sub)) => {
            let id = id_of(sub)?;
            let patch = AccountPatch {
                name: opt(sub, "name").map(str::to_string),
                r#type: opt(sub, "type").map(str::parse).transpose()?,
                icon: opt(sub, "icon").map(str::to_string),
                color: opt(sub, "color").map(str::to_string),
                currency: opt(sub, "currency").map(str::to_string),
                is_default: sub.get_flag("default").then_some(true),
            };
            let a = settle(ledger.update_account(id, &patch)?);
            println!("Updated account '{}' (id {})", a.name, a.id);
        }
        Some(("rm", sub)) => {
            let id = id_of(sub)?;
            settle(ledger.delete_account(id)?);
            println!("Removed account {}", id);
        }
        Some(("set-default", sub)) => {
            let id = id_of(sub)?;
            let a = settle(ledger.set_default_account(id)?);
            println!("'{}' is now the default account", a.name);
        }
        Some(("show", sub)) => show(ledger, sub)?,
        _ => {}
    }
    Ok(())
}

fn policy(m: &clap::ArgMatches) -> BalancePolicy {
    if m.get_flag("include-initial") {
        BalancePolicy::IncludeInitial
    } else {
        BalancePolicy::TransactionsOnly
    }
}

#[derive(Debug, Serialize)]
pub struct AccountRow {
    #[serde(flatten)]
    pub account: Account,
    pub balance: rust_decimal::Decimal,
}

/// Accounts with their running balances, in creation order.
pub fn account_rows<B: Backend>(ledger: &Ledger<B>, policy: BalancePolicy) -> Vec<AccountRow> {
    let txs = ledger.transactions();
    ledger
        .accounts()
        .iter()
        .map(|account| AccountRow {
            balance: balance::account_balance_with(account, txs, policy),
            account: account.clone(),
        })
        .collect()
}

fn list<B: Backend>(ledger: &Ledger<B>, sub: &clap::ArgMatches) -> Result<()> {
    let rows = account_rows(ledger, policy(sub));
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &rows)? {
        return Ok(());
    }
    let money = Money::for_user(ledger, sub);
    let data = rows
        .into_iter()
        .map(|r| {
            vec![
                r.account.id.to_string(),
                format!("{} {}", r.account.icon, r.account.name),
                r.account.r#type.to_string(),
                r.account.currency,
                money.show(r.balance),
                if r.account.is_default { "★" } else { "" }.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Name", "Type", "Currency", "Balance", "Default"],
            data
        )
    );
    Ok(())
}

fn show<B: Backend>(ledger: &Ledger<B>, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_of(sub)?;
    let account = ledger.account(id)?;
    let txs = ledger.list_transactions(&TransactionFilter {
        account_id: Some(id),
        ..TransactionFilter::default()
    });
    let mut analytics = balance::account_analytics(id, &txs, today());
    analytics.balance = balance::account_balance_with(account, &txs, policy(sub));
    if sub.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&analytics)?);
        return Ok(());
    }

    let money = Money::for_user(ledger, sub);
    println!("{} {} ({})", account.icon, account.name, account.r#type);
    let overview = vec![
        vec!["Balance".into(), money.show(analytics.balance)],
        vec!["Total income".into(), money.show(analytics.total_income)],
        vec!["Total expense".into(), money.show(analytics.total_expense)],
        vec![
            "This month income".into(),
            format!(
                "{} ({:+.1}%)",
                money.show(analytics.month_income),
                analytics.income_change
            ),
        ],
        vec![
            "This month expense".into(),
            format!(
                "{} ({:+.1}%)",
                money.show(analytics.month_expense),
                analytics.expense_change
            ),
        ],
        vec![
            "Transactions".into(),
            format!(
                "{} (avg {}/month)",
                analytics.transaction_count, analytics.avg_transactions_per_month
            ),
        ],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], overview));

    let trend = analytics
        .monthly_trend
        .iter()
        .map(|p| {
            vec![
                p.month.clone(),
                money.show(p.income),
                money.show(p.expense),
                money.show(p.net),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Month", "Income", "Expense", "Net"], trend)
    );

    if !analytics.top_categories.is_empty() {
        let cats = analytics
            .top_categories
            .iter()
            .map(|c| {
                vec![
                    crate::categories::display_name(&c.category).to_string(),
                    money.show(c.amount),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Top expenses", "Amount"], cats));
    }
    Ok(())
}
