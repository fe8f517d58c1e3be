// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use budgeta::db;
use budgeta::error::FinanceError;
use budgeta::models::{
    AccountPatch, AccountType, Debt, DebtDirection, DebtStatus, Frequency, Goal, Mode,
    NewAccount, NewTransaction, PreferencesPatch, Record, RecordKind, RecurringPayment,
    TransactionPatch, TxKind,
};
use budgeta::service::{Service, TransactionFilter, users};
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> (Connection, i64, i64) {
    let conn = db::open_in_memory().unwrap();
    let a = users::register(&conn, "amina@example.com", "Amina").unwrap();
    let b = users::register(&conn, "baraka@example.com", "Baraka").unwrap();
    (conn, a.id, b.id)
}

fn new_account(name: &str, is_default: bool) -> NewAccount {
    NewAccount {
        name: name.to_string(),
        r#type: AccountType::Bank,
        icon: None,
        color: None,
        currency: None,
        initial_balance: None,
        is_default,
    }
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn new_tx(account_id: i64, kind: TxKind, amount: i64, category: &str, on: &str) -> NewTransaction {
    NewTransaction {
        account_id,
        kind,
        amount: Decimal::from(amount),
        category: category.to_string(),
        description: None,
        date: date(on),
    }
}

#[test]
fn register_rejects_bad_and_duplicate_emails() {
    let (conn, _, _) = setup();
    assert!(matches!(
        users::register(&conn, "not-an-email", "X"),
        Err(FinanceError::Validation(_))
    ));
    assert!(users::register(&conn, "AMINA@example.com", "Again").is_err());
    assert_eq!(users::list(&conn).unwrap().len(), 2);
    assert!(users::id_for_email(&conn, "Amina@Example.com").is_ok());
}

#[test]
fn account_defaults_fill_icon_color_and_currency() {
    let (conn, a, _) = setup();
    let svc = Service::new(&conn, a);
    let mut new = new_account("Wallet", false);
    new.r#type = AccountType::MobileMoney;
    new.currency = Some(" kes ".into());
    let acc = svc.create_account(&new).unwrap();
    assert_eq!(acc.icon, "📱");
    assert_eq!(acc.color, "#10b981");
    assert_eq!(acc.currency, "KES");
    assert_eq!(acc.initial_balance, Decimal::ZERO);

    let bad = NewAccount {
        currency: Some("1$".into()),
        ..new_account("Bad", false)
    };
    assert!(svc.create_account(&bad).is_err());
}

#[test]
fn set_default_is_exclusive() {
    let (conn, a, _) = setup();
    let svc = Service::new(&conn, a);
    let first = svc.create_account(&new_account("First", true)).unwrap();
    let second = svc.create_account(&new_account("Second", false)).unwrap();
    assert!(first.is_default);

    svc.set_default_account(second.id).unwrap();
    let defaults: Vec<i64> = svc
        .list_accounts()
        .unwrap()
        .into_iter()
        .filter(|x| x.is_default)
        .map(|x| x.id)
        .collect();
    assert_eq!(defaults, vec![second.id]);

    svc.update_account(
        first.id,
        &AccountPatch {
            is_default: Some(true),
            ..AccountPatch::default()
        },
    )
    .unwrap();
    assert_eq!(svc.default_account().unwrap().map(|x| x.id), Some(first.id));
    assert!(!svc.get_account(second.id).unwrap().is_default);
}

#[test]
fn delete_guards_leave_state_untouched() {
    let (conn, a, _) = setup();
    let svc = Service::new(&conn, a);
    let only = svc.create_account(&new_account("Only", true)).unwrap();
    assert!(matches!(
        svc.delete_account(only.id),
        Err(FinanceError::Integrity(_))
    ));

    let other = svc.create_account(&new_account("Other", false)).unwrap();
    svc.create_transaction(&new_tx(other.id, TxKind::Expense, 5, "food", "2025-03-01"))
        .unwrap();
    assert!(matches!(
        svc.delete_account(other.id),
        Err(FinanceError::Integrity(_))
    ));
    assert_eq!(svc.list_accounts().unwrap().len(), 2);

    let spare = svc.create_account(&new_account("Spare", false)).unwrap();
    svc.delete_account(spare.id).unwrap();
    assert_eq!(svc.list_accounts().unwrap().len(), 2);
}

#[test]
fn other_users_rows_are_not_found() {
    let (conn, a, b) = setup();
    let mine = Service::new(&conn, a);
    let theirs = Service::new(&conn, b);
    let acc = mine.create_account(&new_account("Mine", true)).unwrap();
    let t = mine
        .create_transaction(&new_tx(acc.id, TxKind::Income, 10, "salary", "2025-03-01"))
        .unwrap();

    assert!(matches!(
        theirs.get_account(acc.id),
        Err(FinanceError::NotFound("Account"))
    ));
    assert!(matches!(
        theirs.delete_transaction(t.id),
        Err(FinanceError::NotFound("Transaction"))
    ));
    assert!(matches!(
        theirs.create_transaction(&new_tx(acc.id, TxKind::Income, 1, "gift", "2025-03-01")),
        Err(FinanceError::NotFound("Account"))
    ));
    assert!(theirs.list_accounts().unwrap().is_empty());
    assert_eq!(mine.list_transactions(&TransactionFilter::default()).unwrap().len(), 1);
}

#[test]
fn transaction_validation_and_update() {
    let (conn, a, _) = setup();
    let svc = Service::new(&conn, a);
    let acc = svc.create_account(&new_account("Main", true)).unwrap();
    assert!(matches!(
        svc.create_transaction(&new_tx(acc.id, TxKind::Expense, -5, "food", "2025-03-01")),
        Err(FinanceError::Validation(_))
    ));
    assert!(svc
        .create_transaction(&new_tx(acc.id, TxKind::Expense, 5, "  ", "2025-03-01"))
        .is_err());

    let t = svc
        .create_transaction(&new_tx(acc.id, TxKind::Expense, 5, "food", "2025-03-01"))
        .unwrap();
    let updated = svc
        .update_transaction(
            t.id,
            &TransactionPatch {
                amount: Some(Decimal::from(8)),
                description: Some("lunch".into()),
                ..TransactionPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.amount, Decimal::from(8));
    assert_eq!(updated.category, "food");
    assert_eq!(updated.description, "lunch");
}

#[test]
fn filters_and_stats() {
    let (conn, a, _) = setup();
    let svc = Service::new(&conn, a);
    let main = svc.create_account(&new_account("Main", true)).unwrap();
    let side = svc.create_account(&new_account("Side", false)).unwrap();
    svc.create_transaction(&new_tx(main.id, TxKind::Income, 5000, "salary", "2025-03-01"))
        .unwrap();
    svc.create_transaction(&new_tx(main.id, TxKind::Expense, 1500, "food", "2025-03-10"))
        .unwrap();
    svc.create_transaction(&new_tx(side.id, TxKind::Expense, 200, "transport", "2025-03-11"))
        .unwrap();
    svc.create_transaction(&new_tx(main.id, TxKind::Expense, 99, "food", "2025-04-02"))
        .unwrap();

    let march = TransactionFilter {
        start_date: Some(date("2025-03-01")),
        end_date: Some(date("2025-03-31")),
        ..TransactionFilter::default()
    };
    let rows = svc.list_transactions(&march).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].date, date("2025-03-11"));

    let food = TransactionFilter {
        kind: Some(TxKind::Expense),
        category: Some("food".into()),
        ..TransactionFilter::default()
    };
    assert_eq!(svc.list_transactions(&food).unwrap().len(), 2);

    let side_only = TransactionFilter {
        account_id: Some(side.id),
        ..TransactionFilter::default()
    };
    assert_eq!(svc.list_transactions(&side_only).unwrap().len(), 1);

    let stats = svc
        .transaction_stats(&TransactionFilter {
            account_id: Some(main.id),
            kind: Some(TxKind::Expense),
            ..march
        })
        .unwrap();
    assert_eq!(stats.total_income, Decimal::from(5000));
    assert_eq!(stats.total_expense, Decimal::from(1500));
    assert_eq!(stats.transaction_count, 2);
}

#[test]
fn preferences_created_lazily_and_patched() {
    let (conn, a, _) = setup();
    let svc = Service::new(&conn, a);
    let p = svc.get_preferences().unwrap();
    assert_eq!(p.base_currency, "TZS");
    assert_eq!(p.display_currency, "TZS");
    assert_eq!(p.mode, Mode::Personal);

    let p = svc
        .update_preferences(&PreferencesPatch {
            display_currency: Some("usd".into()),
            mode: Some(Mode::Business),
            ..PreferencesPatch::default()
        })
        .unwrap();
    assert_eq!(p.display_currency, "USD");
    assert_eq!(p.base_currency, "TZS");
    assert_eq!(svc.get_preferences().unwrap().mode, Mode::Business);

    assert!(svc
        .update_preferences(&PreferencesPatch {
            base_currency: Some("ZZZ".into()),
            ..PreferencesPatch::default()
        })
        .is_err());
}

fn debt(user_id: i64, amount: i64) -> Debt {
    Debt {
        id: 0,
        user_id,
        direction: DebtDirection::IOwe,
        name: "Car loan".into(),
        description: String::new(),
        amount: Decimal::from(amount),
        amount_paid: Decimal::ZERO,
        status: DebtStatus::Pending,
        interest_rate: Decimal::ZERO,
        due_date: Some(date("2025-12-31")),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn debt_payments_move_status() {
    let (conn, a, b) = setup();
    let svc = Service::new(&conn, a);
    let id = svc.create_record(&Record::Debt(debt(a, 1000))).unwrap().id();

    let d = svc.pay_debt(id, Decimal::from(400)).unwrap();
    assert_eq!(d.status, DebtStatus::Partial);
    assert_eq!(d.remaining(), Decimal::from(600));

    let d = svc.pay_debt(id, Decimal::from(600)).unwrap();
    assert_eq!(d.status, DebtStatus::Paid);
    assert!(svc.pay_debt(id, Decimal::ZERO).is_err());

    let other = Service::new(&conn, b);
    assert!(matches!(
        other.pay_debt(id, Decimal::ONE),
        Err(FinanceError::NotFound("Debt"))
    ));
}

#[test]
fn recurring_advance_and_goal_contribution() {
    let (conn, a, _) = setup();
    let svc = Service::new(&conn, a);
    let rp = RecurringPayment {
        id: 0,
        user_id: a,
        name: "Internet".into(),
        amount: Decimal::from(60),
        category: "bills".into(),
        frequency: Frequency::Monthly,
        next_date: date("2025-01-31"),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    let id = svc.create_record(&Record::Recurring(rp)).unwrap().id();
    let advanced = svc.advance_recurring(id).unwrap();
    assert_eq!(advanced.next_date, date("2025-02-28"));

    let goal = Goal {
        id: 0,
        user_id: a,
        name: "Emergency fund".into(),
        target_amount: Decimal::from(1000),
        current_amount: Decimal::from(250),
        deadline: None,
        category: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    let id = svc.create_record(&Record::Goal(goal)).unwrap().id();
    let g = svc.contribute_to_goal(id, Decimal::from(250)).unwrap();
    assert_eq!(g.percentage(), 50);
    assert!(svc.contribute_to_goal(id, Decimal::from(-1)).is_err());
}

#[test]
fn records_list_update_delete() {
    let (conn, a, _) = setup();
    let svc = Service::new(&conn, a);
    assert!(matches!(
        svc.create_record(&Record::Debt(Debt {
            name: " ".into(),
            ..debt(a, 10)
        })),
        Err(FinanceError::Validation(_))
    ));

    let created = svc.create_record(&Record::Debt(debt(a, 10))).unwrap();
    let Record::Debt(mut d) = created else {
        panic!("expected a debt");
    };
    d.name = "Phone".into();
    svc.update_record(&Record::Debt(d.clone())).unwrap();
    assert_eq!(svc.list_debts().unwrap()[0].name, "Phone");

    svc.delete_record(RecordKind::Debt, d.id).unwrap();
    assert!(svc.list_records(RecordKind::Debt).unwrap().is_empty());
    assert!(matches!(
        svc.delete_record(RecordKind::Debt, d.id),
        Err(FinanceError::NotFound("Debt"))
    ));
}
