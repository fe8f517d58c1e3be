// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! REST client for the hosted backend.
//!
//! The server answers with raw table rows: snake_case columns, numerics as
//! strings, dates as full timestamps. Requests use camelCase bodies. The
//! DTOs below accept either spelling and normalize into the crate's models.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use reqwest::Method;
use reqwest::blocking::{Client, Response};
use rust_decimal::Decimal;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{Value, json};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{FinanceError, FinanceResult};
use crate::ledger::{Backend, Snapshot};
use crate::models::{
    Account, AccountPatch, AccountType, Budget, DEFAULT_BASE_CURRENCY, Debt, DebtStatus, Goal,
    Investment, NewAccount, NewTransaction, Preferences, PreferencesPatch, Record, RecordId,
    RecordKind, RecurringPayment, Transaction, TransactionPatch,
};

const UA: &str = concat!("budgeta/", env!("CARGO_PKG_VERSION"));

// ---- field normalization ----

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(serde_json::Number),
    Text(String),
}

fn decimal_from(raw: NumberOrString) -> Result<Decimal, String> {
    let text = match raw {
        NumberOrString::Number(n) => n.to_string(),
        NumberOrString::Text(s) => s,
    };
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|e| format!("invalid decimal '{}': {}", text, e))
}

fn de_decimal<'de, D: Deserializer<'de>>(d: D) -> Result<Decimal, D::Error> {
    let raw = Option::<NumberOrString>::deserialize(d)?;
    match raw {
        Some(v) => decimal_from(v).map_err(de::Error::custom),
        None => Ok(Decimal::ZERO),
    }
}

fn de_opt_decimal<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Decimal>, D::Error> {
    Option::<NumberOrString>::deserialize(d)?
        .map(decimal_from)
        .transpose()
        .map_err(de::Error::custom)
}

/// `YYYY-MM-DD`, or any ISO timestamp whose date part is kept.
fn date_from(text: &str) -> Result<NaiveDate, String> {
    let head = text.trim().get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").map_err(|e| format!("invalid date '{}': {}", text, e))
}

fn de_date<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
    let text = String::deserialize(d)?;
    date_from(&text).map_err(de::Error::custom)
}

fn de_opt_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    match Option::<String>::deserialize(d)? {
        Some(t) if !t.trim().is_empty() => date_from(&t).map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}

fn de_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

fn parse_enum<T: FromStr<Err = FinanceError>>(text: &str) -> FinanceResult<T> {
    text.parse()
}

// ---- DTOs ----

#[derive(Debug, Deserialize)]
pub struct AccountDto {
    pub id: RecordId,
    #[serde(alias = "userId", default)]
    pub user_id: RecordId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub icon: String,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub color: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(alias = "initialBalance", default, deserialize_with = "de_decimal")]
    pub initial_balance: Decimal,
    #[serde(alias = "isDefault", default)]
    pub is_default: bool,
    #[serde(alias = "createdAt", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "updatedAt", default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl AccountDto {
    pub fn into_model(self) -> FinanceResult<Account> {
        let r#type: AccountType = parse_enum(&self.kind)?;
        Ok(Account {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            icon: if self.icon.is_empty() {
                r#type.default_icon().to_string()
            } else {
                self.icon
            },
            color: if self.color.is_empty() {
                r#type.default_color().to_string()
            } else {
                self.color
            },
            r#type,
            currency: self
                .currency
                .filter(|c| !c.trim().is_empty())
                .map(|c| c.trim().to_uppercase())
                .unwrap_or_else(|| "USD".to_string()),
            initial_balance: self.initial_balance,
            is_default: self.is_default,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct TransactionDto {
    pub id: RecordId,
    #[serde(alias = "userId", default)]
    pub user_id: RecordId,
    #[serde(alias = "accountId")]
    pub account_id: RecordId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "de_decimal")]
    pub amount: Decimal,
    pub category: String,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub description: String,
    #[serde(deserialize_with = "de_date")]
    pub date: NaiveDate,
    #[serde(alias = "createdAt", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "updatedAt", default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl TransactionDto {
    pub fn into_model(self) -> FinanceResult<Transaction> {
        Ok(Transaction {
            id: self.id,
            user_id: self.user_id,
            account_id: self.account_id,
            kind: parse_enum(&self.kind)?,
            amount: self.amount,
            category: self.category,
            description: self.description,
            date: self.date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PreferencesDto {
    #[serde(alias = "userId", default)]
    pub user_id: RecordId,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(alias = "baseCurrency", default)]
    pub base_currency: Option<String>,
    #[serde(alias = "displayCurrency", default)]
    pub display_currency: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(alias = "updatedAt", default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl PreferencesDto {
    pub fn into_model(self) -> FinanceResult<Preferences> {
        let base = self
            .base_currency
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_CURRENCY.to_string());
        Ok(Preferences {
            user_id: self.user_id,
            mode: self.mode.as_deref().map(parse_enum).transpose()?.unwrap_or_default(),
            display_currency: self
                .display_currency
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| base.clone()),
            base_currency: base,
            theme: self.theme.as_deref().map(parse_enum).transpose()?.unwrap_or_default(),
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct BudgetDto {
    pub id: RecordId,
    #[serde(alias = "userId", default)]
    pub user_id: RecordId,
    pub category: String,
    #[serde(deserialize_with = "de_decimal")]
    pub amount: Decimal,
    #[serde(default, deserialize_with = "de_decimal")]
    pub spent: Decimal,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(alias = "createdAt", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "updatedAt", default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl BudgetDto {
    /// Budgets without an explicit month belong to the month they were
    /// created in.
    pub fn into_model(self) -> Budget {
        let created = self.created_at.date_naive();
        Budget {
            id: self.id,
            user_id: self.user_id,
            category: self.category,
            amount: self.amount,
            spent: self.spent,
            period: self.period.unwrap_or_else(|| "monthly".to_string()),
            month: self.month.unwrap_or(created.month()),
            year: self.year.unwrap_or(created.year()),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DebtDto {
    pub id: RecordId,
    #[serde(alias = "userId", default)]
    pub user_id: RecordId,
    #[serde(rename = "type", alias = "direction")]
    pub direction: String,
    pub name: String,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub description: String,
    #[serde(alias = "totalAmount", alias = "amount", deserialize_with = "de_decimal")]
    pub total_amount: Decimal,
    #[serde(alias = "remainingAmount", default, deserialize_with = "de_opt_decimal")]
    pub remaining_amount: Option<Decimal>,
    #[serde(alias = "amountPaid", default, deserialize_with = "de_opt_decimal")]
    pub amount_paid: Option<Decimal>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(alias = "interestRate", default, deserialize_with = "de_decimal")]
    pub interest_rate: Decimal,
    #[serde(alias = "dueDate", default, deserialize_with = "de_opt_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(alias = "createdAt", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "updatedAt", default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl DebtDto {
    /// The server tracks what is left; the model tracks what was paid.
    pub fn into_model(self) -> FinanceResult<Debt> {
        let amount_paid = self
            .amount_paid
            .or_else(|| self.remaining_amount.map(|r| self.total_amount - r))
            .unwrap_or_default();
        let status = match self.status.as_deref() {
            Some(s) if !s.trim().is_empty() => parse_enum(s)?,
            _ if amount_paid >= self.total_amount && !self.total_amount.is_zero() => DebtStatus::Paid,
            _ if amount_paid > Decimal::ZERO => DebtStatus::Partial,
            _ => DebtStatus::Pending,
        };
        Ok(Debt {
            id: self.id,
            user_id: self.user_id,
            direction: parse_enum(&self.direction)?,
            name: self.name,
            description: self.description,
            amount: self.total_amount,
            amount_paid,
            status,
            interest_rate: self.interest_rate,
            due_date: self.due_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct InvestmentDto {
    pub id: RecordId,
    #[serde(alias = "userId", default)]
    pub user_id: RecordId,
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "de_opt_string")]
    pub kind: String,
    #[serde(deserialize_with = "de_decimal")]
    pub amount: Decimal,
    #[serde(alias = "currentValue", default, deserialize_with = "de_decimal")]
    pub current_value: Decimal,
    #[serde(alias = "returnRate", default, deserialize_with = "de_decimal")]
    pub return_rate: Decimal,
    #[serde(alias = "purchaseDate", default, deserialize_with = "de_opt_date")]
    pub purchase_date: Option<NaiveDate>,
    #[serde(alias = "createdAt", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "updatedAt", default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl InvestmentDto {
    pub fn into_model(self) -> Investment {
        Investment {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            r#type: self.kind,
            amount: self.amount,
            current_value: self.current_value,
            return_rate: self.return_rate,
            purchase_date: self.purchase_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecurringDto {
    pub id: RecordId,
    #[serde(alias = "userId", default)]
    pub user_id: RecordId,
    pub name: String,
    #[serde(deserialize_with = "de_decimal")]
    pub amount: Decimal,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub category: String,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(alias = "nextDate", deserialize_with = "de_date")]
    pub next_date: NaiveDate,
    #[serde(alias = "isActive", default = "active_by_default")]
    pub is_active: bool,
    #[serde(alias = "createdAt", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "updatedAt", default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn active_by_default() -> bool {
    true
}

impl RecurringDto {
    pub fn into_model(self) -> FinanceResult<RecurringPayment> {
        Ok(RecurringPayment {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            amount: self.amount,
            category: self.category,
            frequency: self
                .frequency
                .as_deref()
                .map(parse_enum)
                .transpose()?
                .unwrap_or_default(),
            next_date: self.next_date,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct GoalDto {
    pub id: RecordId,
    #[serde(alias = "userId", default)]
    pub user_id: RecordId,
    pub name: String,
    #[serde(alias = "targetAmount", deserialize_with = "de_decimal")]
    pub target_amount: Decimal,
    #[serde(alias = "currentAmount", default, deserialize_with = "de_decimal")]
    pub current_amount: Decimal,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(alias = "createdAt", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "updatedAt", default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl GoalDto {
    pub fn into_model(self) -> Goal {
        Goal {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            target_amount: self.target_amount,
            current_amount: self.current_amount,
            deadline: self.deadline,
            category: self.category.filter(|c| !c.trim().is_empty()),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Parses one record row of `kind` from a server response.
pub fn record_from_value(kind: RecordKind, v: Value) -> FinanceResult<Record> {
    Ok(match kind {
        RecordKind::Budget => Record::Budget(serde_json::from_value::<BudgetDto>(v)?.into_model()),
        RecordKind::Debt => Record::Debt(serde_json::from_value::<DebtDto>(v)?.into_model()?),
        RecordKind::Investment => {
            Record::Investment(serde_json::from_value::<InvestmentDto>(v)?.into_model())
        }
        RecordKind::Recurring => {
            Record::Recurring(serde_json::from_value::<RecurringDto>(v)?.into_model()?)
        }
        RecordKind::Goal => Record::Goal(serde_json::from_value::<GoalDto>(v)?.into_model()),
    })
}

fn record_path(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Budget => "/budgets",
        RecordKind::Debt => "/debts",
        RecordKind::Investment => "/investments",
        RecordKind::Recurring => "/recurring",
        RecordKind::Goal => "/goals",
    }
}

fn record_body(rec: &Record) -> Value {
    match rec {
        Record::Budget(b) => json!({
            "category": b.category,
            "amount": b.amount.to_string(),
            "spent": b.spent.to_string(),
            "period": b.period,
            "month": b.month,
            "year": b.year,
        }),
        Record::Debt(d) => json!({
            "type": d.direction.as_str(),
            "name": d.name,
            "description": d.description,
            "totalAmount": d.amount.to_string(),
            "remainingAmount": d.remaining().to_string(),
            "amountPaid": d.amount_paid.to_string(),
            "status": d.status.as_str(),
            "interestRate": d.interest_rate.to_string(),
            "dueDate": d.due_date,
        }),
        Record::Investment(i) => json!({
            "name": i.name,
            "type": i.r#type,
            "amount": i.amount.to_string(),
            "currentValue": i.current_value.to_string(),
            "returnRate": i.return_rate.to_string(),
            "purchaseDate": i.purchase_date,
        }),
        Record::Recurring(r) => json!({
            "name": r.name,
            "amount": r.amount.to_string(),
            "category": r.category,
            "frequency": r.frequency.as_str(),
            "nextDate": r.next_date,
            "isActive": r.is_active,
        }),
        Record::Goal(g) => json!({
            "name": g.name,
            "targetAmount": g.target_amount.to_string(),
            "currentAmount": g.current_amount.to_string(),
            "deadline": g.deadline,
            "category": g.category,
        }),
    }
}

/// Removes `null` members so partial updates leave server values alone.
fn without_nulls(mut v: Value) -> Value {
    if let Value::Object(map) = &mut v {
        map.retain(|_, x| !x.is_null());
    }
    v
}

// ---- client ----

pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
}

fn transport_error(e: reqwest::Error) -> FinanceError {
    if e.is_timeout() {
        FinanceError::Unavailable(format!("request timed out ({})", e))
    } else {
        FinanceError::Unavailable(e.to_string())
    }
}

impl HttpBackend {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> FinanceResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(UA)
            .build()
            .map_err(transport_error)?;
        Ok(HttpBackend {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(cfg: &Config) -> FinanceResult<Self> {
        let url = cfg
            .api_url
            .as_deref()
            .ok_or_else(|| FinanceError::validation("BUDGETA_API_URL is not set"))?;
        Self::new(url, cfg.token.clone(), cfg.timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends one request and returns the decoded JSON body. `what` names the
    /// resource in a 404.
    fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        what: &'static str,
    ) -> FinanceResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "backend request");
        let mut req = self.client.request(method, &url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        if let Some(b) = body {
            req = req.json(&b);
        }
        let resp = req.send().map_err(transport_error)?;
        Self::decode(resp, what)
    }

    fn decode(resp: Response, what: &'static str) -> FinanceResult<Value> {
        let status = resp.status();
        let text = resp.text().map_err(transport_error)?;
        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_str(&text)?);
        }
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .or_else(|| v.get("message"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                )
            });
        warn!(status = status.as_u16(), %message, "backend rejected request");
        Err(match status.as_u16() {
            404 => FinanceError::NotFound(what),
            400 => FinanceError::Validation(message),
            code => FinanceError::Remote {
                status: code,
                message,
            },
        })
    }

    fn get<T: DeserializeOwned>(&self, path: &str, what: &'static str) -> FinanceResult<T> {
        Ok(serde_json::from_value(self.send(
            Method::GET,
            path,
            None,
            what,
        )?)?)
    }

    fn list_records(&self, kind: RecordKind) -> FinanceResult<Vec<Record>> {
        let rows: Vec<Value> = self.get(record_path(kind), kind.label())?;
        rows.into_iter()
            .map(|v| record_from_value(kind, v))
            .collect()
    }
}

impl Backend for HttpBackend {
    fn snapshot(&self) -> FinanceResult<Snapshot> {
        let accounts: Vec<AccountDto> = self.get("/accounts", "Account")?;
        let transactions: Vec<TransactionDto> = self.get("/transactions", "Transaction")?;
        let prefs: PreferencesDto = self.get("/preferences", "Preferences")?;
        let mut records = Vec::new();
        for kind in [
            RecordKind::Budget,
            RecordKind::Debt,
            RecordKind::Investment,
            RecordKind::Recurring,
            RecordKind::Goal,
        ] {
            records.extend(self.list_records(kind)?);
        }
        Ok(Snapshot {
            accounts: accounts
                .into_iter()
                .map(AccountDto::into_model)
                .collect::<FinanceResult<_>>()?,
            transactions: transactions
                .into_iter()
                .map(TransactionDto::into_model)
                .collect::<FinanceResult<_>>()?,
            records,
            preferences: Some(prefs.into_model()?),
        })
    }

    fn create_account(&self, new: &NewAccount) -> FinanceResult<Account> {
        let body = json!({
            "name": new.name,
            "type": new.r#type.as_str(),
            "icon": new.icon,
            "color": new.color,
            "currency": new.currency,
            "initialBalance": new.initial_balance.unwrap_or_default().to_string(),
            "isDefault": new.is_default,
        });
        let v = self.send(Method::POST, "/accounts", Some(without_nulls(body)), "Account")?;
        serde_json::from_value::<AccountDto>(v)?.into_model()
    }

    fn update_account(&self, id: RecordId, patch: &AccountPatch) -> FinanceResult<Account> {
        let body = json!({
            "name": patch.name,
            "type": patch.r#type.map(|t| t.as_str()),
            "icon": patch.icon,
            "color": patch.color,
            "currency": patch.currency,
            "isDefault": patch.is_default,
        });
        let v = self.send(
            Method::PUT,
            &format!("/accounts/{}", id),
            Some(without_nulls(body)),
            "Account",
        )?;
        serde_json::from_value::<AccountDto>(v)?.into_model()
    }

    fn delete_account(&self, id: RecordId) -> FinanceResult<()> {
        self.send(Method::DELETE, &format!("/accounts/{}", id), None, "Account")?;
        Ok(())
    }

    fn set_default_account(&self, id: RecordId) -> FinanceResult<Account> {
        let v = self.send(
            Method::PATCH,
            &format!("/accounts/{}/set-default", id),
            None,
            "Account",
        )?;
        serde_json::from_value::<AccountDto>(v)?.into_model()
    }

    fn create_transaction(&self, new: &NewTransaction) -> FinanceResult<Transaction> {
        let body = json!({
            "accountId": new.account_id,
            "type": new.kind.as_str(),
            "amount": new.amount.to_string(),
            "category": new.category,
            "description": new.description,
            "date": new.date,
        });
        let v = self.send(
            Method::POST,
            "/transactions",
            Some(without_nulls(body)),
            "Transaction",
        )?;
        serde_json::from_value::<TransactionDto>(v)?.into_model()
    }

    fn update_transaction(
        &self,
        id: RecordId,
        patch: &TransactionPatch,
    ) -> FinanceResult<Transaction> {
        let body = json!({
            "accountId": patch.account_id,
            "type": patch.kind.map(|k| k.as_str()),
            "amount": patch.amount.map(|a| a.to_string()),
            "category": patch.category,
            "description": patch.description,
            "date": patch.date,
        });
        let v = self.send(
            Method::PUT,
            &format!("/transactions/{}", id),
            Some(without_nulls(body)),
            "Transaction",
        )?;
        serde_json::from_value::<TransactionDto>(v)?.into_model()
    }

    fn delete_transaction(&self, id: RecordId) -> FinanceResult<()> {
        self.send(
            Method::DELETE,
            &format!("/transactions/{}", id),
            None,
            "Transaction",
        )?;
        Ok(())
    }

    fn update_preferences(&self, patch: &PreferencesPatch) -> FinanceResult<Preferences> {
        let body = json!({
            "mode": patch.mode.map(|m| m.as_str()),
            "baseCurrency": patch.base_currency,
            "displayCurrency": patch.display_currency,
            "theme": patch.theme.map(|t| t.as_str()),
        });
        let v = self.send(
            Method::PUT,
            "/preferences",
            Some(without_nulls(body)),
            "Preferences",
        )?;
        serde_json::from_value::<PreferencesDto>(v)?.into_model()
    }

    fn create_record(&self, rec: &Record) -> FinanceResult<Record> {
        let kind = rec.kind();
        let v = self.send(
            Method::POST,
            record_path(kind),
            Some(record_body(rec)),
            kind.label(),
        )?;
        record_from_value(kind, v)
    }

    fn update_record(&self, rec: &Record) -> FinanceResult<Record> {
        let kind = rec.kind();
        let v = self.send(
            Method::PUT,
            &format!("{}/{}", record_path(kind), rec.id()),
            Some(record_body(rec)),
            kind.label(),
        )?;
        record_from_value(kind, v)
    }

    fn delete_record(&self, kind: RecordKind, id: RecordId) -> FinanceResult<()> {
        self.send(
            Method::DELETE,
            &format!("{}/{}", record_path(kind), id),
            None,
            kind.label(),
        )?;
        Ok(())
    }
}
