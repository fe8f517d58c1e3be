// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{AccountType, NewAccount, TxKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
}

pub const INCOME_CATEGORIES: &[CategoryInfo] = &[
    CategoryInfo { id: "salary", name: "Salary", icon: "💼" },
    CategoryInfo { id: "freelance", name: "Freelance", icon: "💻" },
    CategoryInfo { id: "business", name: "Business", icon: "🏢" },
    CategoryInfo { id: "investment", name: "Investment Returns", icon: "📈" },
    CategoryInfo { id: "gift", name: "Gift", icon: "🎁" },
    CategoryInfo { id: "other-income", name: "Other Income", icon: "💰" },
];

pub const EXPENSE_CATEGORIES: &[CategoryInfo] = &[
    CategoryInfo { id: "food", name: "Food & Dining", icon: "🍔" },
    CategoryInfo { id: "transport", name: "Transport", icon: "🚗" },
    CategoryInfo { id: "bills", name: "Bills & Utilities", icon: "📄" },
    CategoryInfo { id: "shopping", name: "Shopping", icon: "🛍️" },
    CategoryInfo { id: "entertainment", name: "Entertainment", icon: "🎬" },
    CategoryInfo { id: "health", name: "Health & Fitness", icon: "🏥" },
    CategoryInfo { id: "education", name: "Education", icon: "📚" },
    CategoryInfo { id: "rent", name: "Rent/Mortgage", icon: "🏠" },
    CategoryInfo { id: "subscription", name: "Subscriptions", icon: "📱" },
    CategoryInfo { id: "business-expense", name: "Business Expense", icon: "💼" },
    CategoryInfo { id: "other-expense", name: "Other Expense", icon: "💸" },
];

pub fn categories_for(kind: TxKind) -> &'static [CategoryInfo] {
    match kind {
        TxKind::Income => INCOME_CATEGORIES,
        TxKind::Expense => EXPENSE_CATEGORIES,
    }
}

pub fn lookup(id: &str) -> Option<&'static CategoryInfo> {
    INCOME_CATEGORIES
        .iter()
        .chain(EXPENSE_CATEGORIES.iter())
        .find(|c| c.id == id)
}

pub fn is_known(id: &str) -> bool {
    lookup(id).is_some()
}

/// Display name for a category id; unknown ids are shown verbatim.
pub fn display_name(id: &str) -> &str {
    lookup(id).map(|c| c.name).unwrap_or(id)
}

#[derive(Debug, Clone, Copy)]
pub struct AccountTemplate {
    pub name: &'static str,
    pub r#type: AccountType,
    pub icon: &'static str,
    pub color: &'static str,
}

pub const QUICK_ADD_ACCOUNTS: &[AccountTemplate] = &[
    AccountTemplate { name: "CRDB – PLC", r#type: AccountType::Bank, icon: "🏦", color: "#0066b2" },
    AccountTemplate { name: "NMB", r#type: AccountType::Bank, icon: "🏦", color: "#10b981" },
    AccountTemplate { name: "M-Pesa", r#type: AccountType::MobileMoney, icon: "📱", color: "#10b981" },
    AccountTemplate { name: "Airtel Money", r#type: AccountType::MobileMoney, icon: "📱", color: "#ed1c24" },
    AccountTemplate { name: "Mix By Yas", r#type: AccountType::MobileMoney, icon: "📱", color: "#8b5cf6" },
    AccountTemplate { name: "Binance", r#type: AccountType::DigitalWallet, icon: "💳", color: "#f0b90b" },
    AccountTemplate { name: "Cash Kibubu", r#type: AccountType::Cash, icon: "💵", color: "#22c55e" },
];

pub fn quick_add_template(name: &str) -> Option<&'static AccountTemplate> {
    QUICK_ADD_ACCOUNTS
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name.trim()))
}

impl AccountTemplate {
    pub fn to_new_account(&self, currency: &str) -> NewAccount {
        NewAccount {
            name: self.name.to_string(),
            r#type: self.r#type,
            icon: Some(self.icon.to_string()),
            color: Some(self.color.to_string()),
            currency: Some(currency.to_string()),
            initial_balance: None,
            is_default: false,
        }
    }
}
