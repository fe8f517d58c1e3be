// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_flags() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Output as pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Output as JSON lines"),
    ]
}

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(value_parser!(i64))
        .allow_negative_numbers(true)
}

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .help("Calendar month YYYY-MM (default: current month)")
}

fn currency_arg() -> Arg {
    Arg::new("currency")
        .long("currency")
        .help("Display currency (default: preferences)")
}

fn include_initial() -> Arg {
    Arg::new("include-initial")
        .long("include-initial")
        .action(ArgAction::SetTrue)
        .help("Add each account's initial balance to its running balance")
}

fn tx_filters() -> [Arg; 6] {
    [
        Arg::new("account")
            .long("account")
            .value_parser(value_parser!(i64)),
        Arg::new("from").long("from").help("Start date YYYY-MM-DD"),
        Arg::new("to").long("to").help("End date YYYY-MM-DD"),
        month_arg().conflicts_with_all(["from", "to"]),
        Arg::new("type").long("type").help("income | expense"),
        Arg::new("category").long("category"),
    ]
}

fn user_cmd() -> Command {
    Command::new("user")
        .about("Manage users")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(Arg::new("email").long("email").required(true))
                .arg(Arg::new("name").long("name").required(true)),
        )
        .subcommand(Command::new("list").args(json_flags()))
}

fn account_cmd() -> Command {
    Command::new("account")
        .about("Manage accounts")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").long("name").required(true))
                .arg(
                    Arg::new("type")
                        .long("type")
                        .required(true)
                        .help("bank | mobile_money | crypto | digital_wallet | cash | investment"),
                )
                .arg(Arg::new("currency").long("currency"))
                .arg(Arg::new("initial").long("initial").help("Initial balance"))
                .arg(Arg::new("icon").long("icon"))
                .arg(Arg::new("color").long("color"))
                .arg(
                    Arg::new("default")
                        .long("default")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("quick-add")
                .about("Create an account from a template")
                .arg(Arg::new("template").required(true))
                .arg(Arg::new("currency").long("currency")),
        )
        .subcommand(
            Command::new("list")
                .arg(include_initial())
                .arg(currency_arg())
                .args(json_flags()),
        )
        .subcommand(
            Command::new("edit")
                .arg(id_arg())
                .arg(Arg::new("name").long("name"))
                .arg(Arg::new("type").long("type"))
                .arg(Arg::new("icon").long("icon"))
                .arg(Arg::new("color").long("color"))
                .arg(Arg::new("currency").long("currency"))
                .arg(
                    Arg::new("default")
                        .long("default")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
        .subcommand(Command::new("set-default").arg(id_arg()))
        .subcommand(
            Command::new("show")
                .about("Analytics for one account")
                .arg(id_arg())
                .arg(include_initial())
                .arg(Arg::new("json").long("json").action(ArgAction::SetTrue)),
        )
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Manage transactions")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(
                    Arg::new("account")
                        .long("account")
                        .value_parser(value_parser!(i64))
                        .help("Account id (default: the default account)"),
                )
                .arg(Arg::new("type").long("type").required(true))
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(Arg::new("category").long("category").required(true))
                .arg(Arg::new("description").long("description"))
                .arg(Arg::new("date").long("date").help("YYYY-MM-DD (default: today)")),
        )
        .subcommand(
            Command::new("list")
                .args(tx_filters())
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize)),
                )
                .args(json_flags()),
        )
        .subcommand(
            Command::new("edit")
                .arg(id_arg())
                .arg(
                    Arg::new("account")
                        .long("account")
                        .value_parser(value_parser!(i64)),
                )
                .arg(Arg::new("type").long("type"))
                .arg(Arg::new("amount").long("amount"))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("description").long("description"))
                .arg(Arg::new("date").long("date")),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
        .subcommand(
            Command::new("stats")
                .args(tx_filters())
                .arg(Arg::new("json").long("json").action(ArgAction::SetTrue)),
        )
}

fn budget_cmd() -> Command {
    Command::new("budget")
        .about("Monthly budgets per category")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(Arg::new("category").long("category").required(true))
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(Arg::new("spent").long("spent"))
                .arg(month_arg())
                .arg(
                    Arg::new("period")
                        .long("period")
                        .default_value("monthly"),
                ),
        )
        .subcommand(
            Command::new("list")
                .arg(month_arg())
                .arg(currency_arg())
                .args(json_flags()),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
}

fn debt_cmd() -> Command {
    Command::new("debt")
        .about("Debts owed and owed to you")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").long("name").required(true))
                .arg(
                    Arg::new("direction")
                        .long("direction")
                        .required(true)
                        .help("i_owe | owed_to_me"),
                )
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(Arg::new("paid").long("paid"))
                .arg(Arg::new("interest").long("interest"))
                .arg(Arg::new("due").long("due").help("Due date YYYY-MM-DD"))
                .arg(Arg::new("description").long("description")),
        )
        .subcommand(Command::new("list").arg(currency_arg()).args(json_flags()))
        .subcommand(
            Command::new("pay")
                .arg(id_arg())
                .arg(Arg::new("amount").long("amount").required(true)),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
}

fn investment_cmd() -> Command {
    Command::new("investment")
        .about("Investment holdings")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("type").long("type").default_value("stocks"))
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(Arg::new("current").long("current").help("Current value"))
                .arg(Arg::new("return-rate").long("return-rate"))
                .arg(Arg::new("purchased").long("purchased").help("Purchase date YYYY-MM-DD")),
        )
        .subcommand(Command::new("list").arg(currency_arg()).args(json_flags()))
        .subcommand(Command::new("rm").arg(id_arg()))
}

fn recurring_cmd() -> Command {
    Command::new("recurring")
        .about("Recurring payments")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(Arg::new("category").long("category").default_value("bills"))
                .arg(
                    Arg::new("frequency")
                        .long("frequency")
                        .default_value("monthly")
                        .help("daily | weekly | monthly | yearly"),
                )
                .arg(Arg::new("next").long("next").help("Next due date YYYY-MM-DD"))
                .arg(
                    Arg::new("inactive")
                        .long("inactive")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("list").arg(currency_arg()).args(json_flags()))
        .subcommand(
            Command::new("advance")
                .about("Move the next due date forward by one period")
                .arg(id_arg()),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
}

fn goal_cmd() -> Command {
    Command::new("goal")
        .about("Savings goals")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("target").long("target").required(true))
                .arg(Arg::new("current").long("current"))
                .arg(Arg::new("deadline").long("deadline"))
                .arg(Arg::new("category").long("category")),
        )
        .subcommand(Command::new("list").arg(currency_arg()).args(json_flags()))
        .subcommand(
            Command::new("contribute")
                .arg(id_arg())
                .arg(Arg::new("amount").long("amount").required(true)),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
}

fn prefs_cmd() -> Command {
    Command::new("prefs")
        .about("User preferences")
        .subcommand_required(true)
        .subcommand(
            Command::new("show").arg(Arg::new("json").long("json").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("set")
                .arg(Arg::new("mode").long("mode").help("personal | business"))
                .arg(Arg::new("base-currency").long("base-currency"))
                .arg(Arg::new("display-currency").long("display-currency"))
                .arg(Arg::new("theme").long("theme").help("light | dark")),
        )
}

fn category_cmd() -> Command {
    Command::new("category")
        .about("Built-in transaction categories")
        .subcommand_required(true)
        .subcommand(
            Command::new("list")
                .arg(Arg::new("type").long("type").help("income | expense"))
                .args(json_flags()),
        )
}

fn fx_cmd() -> Command {
    Command::new("fx")
        .about("Currency table and conversion")
        .subcommand_required(true)
        .subcommand(
            Command::new("convert")
                .arg(Arg::new("amount").required(true).allow_hyphen_values(true))
                .arg(Arg::new("from").required(true))
                .arg(Arg::new("to").required(true)),
        )
        .subcommand(
            Command::new("list")
                .arg(Arg::new("group").long("group").help("Currency group name"))
                .args(json_flags()),
        )
        .subcommand(
            Command::new("format")
                .arg(Arg::new("amount").required(true).allow_hyphen_values(true))
                .arg(Arg::new("code").required(true)),
        )
}

fn report_cmd() -> Command {
    Command::new("report")
        .about("Balances, monthly summary, trends and category breakdowns")
        .subcommand_required(true)
        .subcommand(
            Command::new("balances")
                .arg(include_initial())
                .arg(currency_arg())
                .args(json_flags()),
        )
        .subcommand(
            Command::new("summary")
                .arg(month_arg())
                .arg(currency_arg())
                .arg(Arg::new("json").long("json").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("trend")
                .arg(
                    Arg::new("account")
                        .long("account")
                        .value_parser(value_parser!(i64)),
                )
                .arg(
                    Arg::new("months")
                        .long("months")
                        .value_parser(value_parser!(u32))
                        .default_value("6"),
                )
                .arg(currency_arg())
                .args(json_flags()),
        )
        .subcommand(
            Command::new("categories")
                .arg(
                    Arg::new("account")
                        .long("account")
                        .value_parser(value_parser!(i64)),
                )
                .arg(month_arg())
                .arg(
                    Arg::new("type")
                        .long("type")
                        .default_value("expense")
                        .help("income | expense"),
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize))
                        .default_value("5"),
                )
                .arg(currency_arg())
                .args(json_flags()),
        )
}

fn export_cmd() -> Command {
    Command::new("export")
        .about("Export data")
        .subcommand_required(true)
        .subcommand(
            Command::new("transactions")
                .args(tx_filters())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("csv")
                        .help("csv | json"),
                )
                .arg(Arg::new("out").long("out").required(true)),
        )
}

pub fn build_cli() -> Command {
    Command::new("budgeta")
        .version(crate_version!())
        .about("Budgeta: multi-currency personal finance ledger")
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .help("Email of the user to act as (default: BUDGETA_USER, or the only user)"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(user_cmd())
        .subcommand(account_cmd())
        .subcommand(tx_cmd())
        .subcommand(budget_cmd())
        .subcommand(debt_cmd())
        .subcommand(investment_cmd())
        .subcommand(recurring_cmd())
        .subcommand(goal_cmd())
        .subcommand(prefs_cmd())
        .subcommand(category_cmd())
        .subcommand(fx_cmd())
        .subcommand(report_cmd())
        .subcommand(export_cmd())
        .subcommand(
            Command::new("sync")
                .about("Reconcile the ledger cache with the remote backend")
                .arg(
                    Arg::new("seed-local")
                        .long("seed-local")
                        .action(ArgAction::SetTrue)
                        .help("Upload the local database when no cache exists yet"),
                )
                .arg(Arg::new("json").long("json").action(ArgAction::SetTrue)),
        )
        .subcommand(Command::new("doctor").about("Check data consistency"))
}
