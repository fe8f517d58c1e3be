// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{FinanceError, FinanceResult};
use crate::utils::{calculate_percentage, percent_of};

/// Server-assigned ids are positive; records created while the backend was
/// unreachable carry negative ids until they are uploaded.
pub type RecordId = i64;

macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = FinanceError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(FinanceError::validation(format!(
                        "Invalid {} '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    Income,
    Expense,
}
string_enum!(TxKind { Income => "income", Expense => "expense" });

impl TxKind {
    /// Sign applied when the amount is folded into a balance.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            TxKind::Income => amount,
            TxKind::Expense => -amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Bank,
    MobileMoney,
    Crypto,
    DigitalWallet,
    Cash,
    Investment,
}
string_enum!(AccountType {
    Bank => "bank",
    MobileMoney => "mobile_money",
    Crypto => "crypto",
    DigitalWallet => "digital_wallet",
    Cash => "cash",
    Investment => "investment",
});

impl AccountType {
    pub fn default_icon(&self) -> &'static str {
        match self {
            AccountType::Bank => "🏦",
            AccountType::MobileMoney => "📱",
            AccountType::Crypto => "₿",
            AccountType::DigitalWallet => "💳",
            AccountType::Cash => "💵",
            AccountType::Investment => "📈",
        }
    }

    pub fn default_color(&self) -> &'static str {
        match self {
            AccountType::Bank => "#3b82f6",
            AccountType::MobileMoney => "#10b981",
            AccountType::Crypto => "#f59e0b",
            AccountType::DigitalWallet => "#8b5cf6",
            AccountType::Cash => "#22c55e",
            AccountType::Investment => "#06b6d4",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Personal,
    Business,
}
string_enum!(Mode { Personal => "personal", Business => "business" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}
string_enum!(Theme { Light => "light", Dark => "dark" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtDirection {
    IOwe,
    OwedToMe,
}
string_enum!(DebtDirection { IOwe => "i_owe", OwedToMe => "owed_to_me" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    #[default]
    Pending,
    Partial,
    Paid,
    Overdue,
}
string_enum!(DebtStatus {
    Pending => "pending",
    Partial => "partial",
    Paid => "paid",
    Overdue => "overdue",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Yearly,
}
string_enum!(Frequency {
    Daily => "daily",
    Weekly => "weekly",
    Monthly => "monthly",
    Yearly => "yearly",
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: RecordId,
    pub user_id: RecordId,
    pub name: String,
    pub r#type: AccountType,
    pub icon: String,
    pub color: String,
    pub currency: String,
    pub initial_balance: Decimal,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub r#type: AccountType,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub currency: Option<String>,
    pub initial_balance: Option<Decimal>,
    pub is_default: bool,
}

impl NewAccount {
    pub fn validate(&self) -> FinanceResult<()> {
        if self.name.trim().is_empty() {
            return Err(FinanceError::validation("Account name is required"));
        }
        Ok(())
    }
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub r#type: Option<AccountType>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub currency: Option<String>,
    pub is_default: Option<bool>,
}

impl AccountPatch {
    /// Applies the patch the way the service stores it: the name is trimmed.
    pub fn apply(&self, a: &mut Account) {
        if let Some(v) = &self.name {
            a.name = v.trim().to_string();
        }
        if let Some(v) = self.r#type {
            a.r#type = v;
        }
        if let Some(v) = &self.icon {
            a.icon = v.clone();
        }
        if let Some(v) = &self.color {
            a.color = v.clone();
        }
        if let Some(v) = &self.currency {
            a.currency = v.clone();
        }
        if let Some(v) = self.is_default {
            a.is_default = v;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: RecordId,
    pub user_id: RecordId,
    pub account_id: RecordId,
    pub kind: TxKind,
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub account_id: RecordId,
    pub kind: TxKind,
    pub amount: Decimal,
    pub category: String,
    pub description: Option<String>,
    pub date: NaiveDate,
}

fn check_amount(amount: Decimal) -> FinanceResult<()> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(FinanceError::validation("Amount must not be negative"));
    }
    Ok(())
}

impl NewTransaction {
    pub fn validate(&self) -> FinanceResult<()> {
        check_amount(self.amount)?;
        if self.category.trim().is_empty() {
            return Err(FinanceError::validation("Missing required fields: category"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionPatch {
    pub account_id: Option<RecordId>,
    pub kind: Option<TxKind>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

impl TransactionPatch {
    pub fn validate(&self) -> FinanceResult<()> {
        if let Some(a) = self.amount {
            check_amount(a)?;
        }
        if let Some(c) = &self.category {
            if c.trim().is_empty() {
                return Err(FinanceError::validation("Category must not be empty"));
            }
        }
        Ok(())
    }

    pub fn apply(&self, t: &mut Transaction) {
        if let Some(v) = self.account_id {
            t.account_id = v;
        }
        if let Some(v) = self.kind {
            t.kind = v;
        }
        if let Some(v) = self.amount {
            t.amount = v;
        }
        if let Some(v) = &self.category {
            t.category = v.trim().to_string();
        }
        if let Some(v) = &self.description {
            t.description = v.clone();
        }
        if let Some(v) = self.date {
            t.date = v;
        }
    }
}

pub const DEFAULT_BASE_CURRENCY: &str = "TZS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub user_id: RecordId,
    pub mode: Mode,
    pub base_currency: String,
    pub display_currency: String,
    pub theme: Theme,
    pub updated_at: DateTime<Utc>,
}

impl Preferences {
    pub fn defaults_for(user_id: RecordId) -> Self {
        Preferences {
            user_id,
            mode: Mode::Personal,
            base_currency: DEFAULT_BASE_CURRENCY.to_string(),
            display_currency: DEFAULT_BASE_CURRENCY.to_string(),
            theme: Theme::Dark,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferencesPatch {
    pub mode: Option<Mode>,
    pub base_currency: Option<String>,
    pub display_currency: Option<String>,
    pub theme: Option<Theme>,
}

impl PreferencesPatch {
    pub fn apply(&self, p: &mut Preferences) {
        if let Some(v) = self.mode {
            p.mode = v;
        }
        if let Some(v) = &self.base_currency {
            p.base_currency = v.clone();
        }
        if let Some(v) = &self.display_currency {
            p.display_currency = v.clone();
        }
        if let Some(v) = self.theme {
            p.theme = v;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: RecordId,
    pub user_id: RecordId,
    pub category: String,
    pub amount: Decimal,
    pub spent: Decimal,
    pub period: String,
    pub month: u32,
    pub year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    pub fn remaining(&self) -> Decimal {
        self.amount - self.spent
    }

    pub fn percentage(&self) -> Decimal {
        percent_of(self.spent, self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub id: RecordId,
    pub user_id: RecordId,
    pub direction: DebtDirection,
    pub name: String,
    pub description: String,
    pub amount: Decimal,
    pub amount_paid: Decimal,
    pub status: DebtStatus,
    pub interest_rate: Decimal,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Debt {
    pub fn remaining(&self) -> Decimal {
        self.amount - self.amount_paid
    }

    /// Records a payment; the debt is settled once the paid total reaches
    /// the original amount.
    pub fn apply_payment(&mut self, payment: Decimal) -> FinanceResult<()> {
        if payment <= Decimal::ZERO {
            return Err(FinanceError::validation("Payment must be positive"));
        }
        self.amount_paid += payment;
        self.status = if self.amount_paid >= self.amount {
            DebtStatus::Paid
        } else {
            DebtStatus::Partial
        };
        Ok(())
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != DebtStatus::Paid && self.due_date.is_some_and(|d| d < today)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub id: RecordId,
    pub user_id: RecordId,
    pub name: String,
    pub r#type: String,
    pub amount: Decimal,
    pub current_value: Decimal,
    pub return_rate: Decimal,
    pub purchase_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Investment {
    pub fn gain(&self) -> Decimal {
        self.current_value - self.amount
    }

    pub fn gain_percentage(&self) -> Decimal {
        percent_of(self.gain(), self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringPayment {
    pub id: RecordId,
    pub user_id: RecordId,
    pub name: String,
    pub amount: Decimal,
    pub category: String,
    pub frequency: Frequency,
    pub next_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecurringPayment {
    pub fn following_date(&self) -> NaiveDate {
        let d = self.next_date;
        let next = match self.frequency {
            Frequency::Daily => d.checked_add_days(Days::new(1)),
            Frequency::Weekly => d.checked_add_days(Days::new(7)),
            Frequency::Monthly => d.checked_add_months(Months::new(1)),
            Frequency::Yearly => d.checked_add_months(Months::new(12)),
        };
        next.unwrap_or(d)
    }

    pub fn advance(&mut self) {
        self.next_date = self.following_date();
    }

    /// Approximate cost per month, for totals across mixed frequencies.
    pub fn monthly_equivalent(&self) -> Decimal {
        match self.frequency {
            Frequency::Daily => self.amount.saturating_mul(Decimal::from(30)),
            Frequency::Weekly => self.amount.saturating_mul(Decimal::from(52)) / Decimal::from(12),
            Frequency::Monthly => self.amount,
            Frequency::Yearly => self.amount / Decimal::from(12),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: RecordId,
    pub user_id: RecordId,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub deadline: Option<NaiveDate>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    pub fn remaining(&self) -> Decimal {
        (self.target_amount - self.current_amount).max(Decimal::ZERO)
    }

    pub fn percentage(&self) -> i64 {
        calculate_percentage(self.current_amount, self.target_amount)
    }
}

/// The records without cross-entity invariants, handled uniformly by the
/// backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Budget(Budget),
    Debt(Debt),
    Investment(Investment),
    Recurring(RecurringPayment),
    Goal(Goal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Budget,
    Debt,
    Investment,
    Recurring,
    Goal,
}

impl RecordKind {
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Budget => "Budget",
            RecordKind::Debt => "Debt",
            RecordKind::Investment => "Investment",
            RecordKind::Recurring => "Recurring payment",
            RecordKind::Goal => "Goal",
        }
    }
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Budget(_) => RecordKind::Budget,
            Record::Debt(_) => RecordKind::Debt,
            Record::Investment(_) => RecordKind::Investment,
            Record::Recurring(_) => RecordKind::Recurring,
            Record::Goal(_) => RecordKind::Goal,
        }
    }

    pub fn id(&self) -> RecordId {
        match self {
            Record::Budget(r) => r.id,
            Record::Debt(r) => r.id,
            Record::Investment(r) => r.id,
            Record::Recurring(r) => r.id,
            Record::Goal(r) => r.id,
        }
    }

    pub fn set_id(&mut self, id: RecordId) {
        match self {
            Record::Budget(r) => r.id = id,
            Record::Debt(r) => r.id = id,
            Record::Investment(r) => r.id = id,
            Record::Recurring(r) => r.id = id,
            Record::Goal(r) => r.id = id,
        }
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        match self {
            Record::Budget(r) => r.updated_at,
            Record::Debt(r) => r.updated_at,
            Record::Investment(r) => r.updated_at,
            Record::Recurring(r) => r.updated_at,
            Record::Goal(r) => r.updated_at,
        }
    }

    pub fn validate(&self) -> FinanceResult<()> {
        let (name, amounts): (&str, Vec<Decimal>) = match self {
            Record::Budget(r) => {
                if !(1..=12).contains(&r.month) {
                    return Err(FinanceError::validation(format!(
                        "Invalid month number {}",
                        r.month
                    )));
                }
                (r.category.as_str(), vec![r.amount, r.spent])
            }
            Record::Debt(r) => (r.name.as_str(), vec![r.amount, r.amount_paid]),
            Record::Investment(r) => (r.name.as_str(), vec![r.amount, r.current_value]),
            Record::Recurring(r) => (r.name.as_str(), vec![r.amount]),
            Record::Goal(r) => (r.name.as_str(), vec![r.target_amount, r.current_amount]),
        };
        if name.trim().is_empty() {
            return Err(FinanceError::validation(format!(
                "{} name is required",
                self.kind().label()
            )));
        }
        amounts.into_iter().try_for_each(check_amount)
    }
}
