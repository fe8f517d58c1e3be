// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Static currency metadata and USD-pivot conversion.
//!
//! Lookups never fail: an unknown code converts at a rate of 1 and formats
//! with the USD symbol and precision, so display code can always render.

use once_cell::sync::Lazy;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolPosition {
    Prefix,
    Suffix,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
    pub decimals: u32,
    pub position: SymbolPosition,
    /// Units of this currency per one US dollar.
    pub rate: Decimal,
}

const fn info(
    code: &'static str,
    symbol: &'static str,
    name: &'static str,
    decimals: u32,
    rate: Decimal,
) -> CurrencyInfo {
    CurrencyInfo {
        code,
        symbol,
        name,
        decimals,
        position: SymbolPosition::Prefix,
        rate,
    }
}

pub static CURRENCIES: Lazy<Vec<CurrencyInfo>> = Lazy::new(|| {
    vec![
        info("USD", "$", "US Dollar", 2, Decimal::ONE),
        CurrencyInfo {
            position: SymbolPosition::Suffix,
            ..info("EUR", "€", "Euro", 2, Decimal::new(92, 2))
        },
        info("GBP", "£", "British Pound", 2, Decimal::new(79, 2)),
        info("JPY", "¥", "Japanese Yen", 0, Decimal::new(14950, 2)),
        info("CNY", "¥", "Chinese Yuan", 2, Decimal::new(724, 2)),
        info("TZS", "TSh", "Tanzanian Shilling", 0, Decimal::new(2500, 0)),
        info("KES", "KSh", "Kenyan Shilling", 2, Decimal::new(12950, 2)),
        info("UGX", "USh", "Ugandan Shilling", 0, Decimal::new(3750, 0)),
        info("ZAR", "R", "South African Rand", 2, Decimal::new(1850, 2)),
        info("NGN", "₦", "Nigerian Naira", 2, Decimal::new(790, 0)),
        info("EGP", "E£", "Egyptian Pound", 2, Decimal::new(3090, 2)),
        info("CAD", "C$", "Canadian Dollar", 2, Decimal::new(136, 2)),
        info("AUD", "A$", "Australian Dollar", 2, Decimal::new(153, 2)),
        info("CHF", "Fr", "Swiss Franc", 2, Decimal::new(88, 2)),
        info("INR", "₹", "Indian Rupee", 2, Decimal::new(8312, 2)),
        info("BRL", "R$", "Brazilian Real", 2, Decimal::new(498, 2)),
        info("MXN", "Mex$", "Mexican Peso", 2, Decimal::new(1705, 2)),
        info("BTC", "₿", "Bitcoin", 8, Decimal::new(27, 6)),
        info("ETH", "Ξ", "Ethereum", 6, Decimal::new(51, 5)),
    ]
});

static BY_CODE: Lazy<HashMap<&'static str, CurrencyInfo>> =
    Lazy::new(|| CURRENCIES.iter().map(|c| (c.code, *c)).collect());

pub const GROUPS: &[(&str, &[&str])] = &[
    ("POPULAR", &["USD", "EUR", "GBP", "JPY", "CNY"]),
    ("AFRICA", &["TZS", "KES", "UGX", "ZAR", "NGN", "EGP"]),
    ("AMERICAS", &["USD", "CAD", "BRL", "MXN"]),
    ("EUROPE", &["EUR", "GBP", "CHF"]),
    ("ASIA", &["JPY", "CNY", "INR"]),
    ("CRYPTO", &["BTC", "ETH"]),
];

pub fn lookup(code: &str) -> Option<&'static CurrencyInfo> {
    BY_CODE.get(code)
}

pub fn is_known(code: &str) -> bool {
    BY_CODE.contains_key(code)
}

/// Metadata for `code`, falling back to USD.
pub fn info_or_usd(code: &str) -> &'static CurrencyInfo {
    lookup(code).unwrap_or_else(|| {
        debug!(currency = code, "unknown currency code, using USD defaults");
        &BY_CODE["USD"]
    })
}

pub fn rate(code: &str) -> Decimal {
    lookup(code).map(|c| c.rate).unwrap_or(Decimal::ONE)
}

pub fn group(name: &str) -> &'static [&'static str] {
    GROUPS
        .iter()
        .find(|(g, _)| g.eq_ignore_ascii_case(name))
        .map(|(_, codes)| *codes)
        .unwrap_or(&[])
}

/// Converts through USD: `amount / rate[from] * rate[to]`.
///
/// Identical codes return `amount` untouched. A result outside the `Decimal`
/// range saturates to `Decimal::MAX` or `Decimal::MIN` with the sign of
/// `amount`.
pub fn convert(amount: Decimal, from: &str, to: &str) -> Decimal {
    if from == to {
        return amount;
    }
    let from_rate = rate(from);
    let to_rate = rate(to);
    if from_rate.is_zero() {
        return amount;
    }
    match amount
        .checked_div(from_rate)
        .and_then(|usd| usd.checked_mul(to_rate))
    {
        Some(v) => v,
        None => {
            warn!(%amount, from, to, "conversion overflowed; saturating");
            if amount.is_sign_negative() {
                Decimal::MIN
            } else {
                Decimal::MAX
            }
        }
    }
}

/// Renders `amount` with the currency's symbol and precision, e.g.
/// `-$1,234.50`, `92.00€`, `TSh2,500`.
pub fn format(amount: Decimal, code: &str) -> String {
    let cur = info_or_usd(code);
    let abs = amount
        .abs()
        .round_dp_with_strategy(cur.decimals, RoundingStrategy::MidpointAwayFromZero);
    let body = group_thousands(abs, cur.decimals);
    let sign = if amount < Decimal::ZERO { "-" } else { "" };
    // Unknown codes fall back to USD metadata, including prefix placement.
    match cur.position {
        SymbolPosition::Suffix => format!("{}{}{}", sign, body, cur.symbol),
        SymbolPosition::Prefix => format!("{}{}{}", sign, cur.symbol, body),
    }
}

/// Converts then formats in the target currency.
pub fn format_converted(amount: Decimal, from: &str, to: &str) -> String {
    format(convert(amount, from, to), to)
}

fn group_thousands(abs: Decimal, decimals: u32) -> String {
    let fixed = format!("{:.*}", decimals as usize, abs);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (fixed.clone(), None),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    match frac_part {
        Some(f) => format!("{}.{}", grouped, f),
        None => grouped,
    }
}
