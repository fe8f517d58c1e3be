// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use budgeta::currency;
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[test]
fn same_currency_is_identity() {
    let amount = dec("1234.5678");
    assert_eq!(currency::convert(amount, "TZS", "TZS"), amount);
    assert_eq!(currency::convert(amount, "XYZ", "XYZ"), amount);
}

#[test]
fn converts_through_usd() {
    assert_eq!(currency::convert(dec("100"), "USD", "EUR"), dec("92"));
    assert_eq!(currency::convert(dec("2500"), "TZS", "USD"), dec("1"));
    assert_eq!(currency::convert(dec("2500"), "TZS", "KES"), dec("129.5"));
}

#[test]
fn unknown_codes_use_rate_one() {
    assert_eq!(currency::convert(dec("10"), "XYZ", "USD"), dec("10"));
    assert_eq!(currency::convert(dec("10"), "USD", "XYZ"), dec("10"));
}

#[test]
fn formats_with_symbol_precision_and_grouping() {
    assert_eq!(currency::format(dec("1234.5"), "USD"), "$1,234.50");
    assert_eq!(currency::format(dec("-1234.5"), "USD"), "-$1,234.50");
    assert_eq!(currency::format(dec("92"), "EUR"), "92.00€");
    assert_eq!(currency::format(dec("2500"), "TZS"), "TSh2,500");
    assert_eq!(currency::format(dec("1234567.4"), "TZS"), "TSh1,234,567");
    assert_eq!(currency::format(dec("0.5"), "JPY"), "¥1");
}

#[test]
fn unknown_code_formats_like_usd() {
    assert_eq!(currency::format(dec("5"), "XYZ"), "$5.00");
}

#[test]
fn format_converted_uses_target_currency() {
    assert_eq!(currency::format_converted(dec("100"), "USD", "EUR"), "92.00€");
}

#[test]
fn groups_and_lookup() {
    assert!(currency::group("africa").contains(&"TZS"));
    assert!(currency::group("nowhere").is_empty());
    assert!(currency::is_known("BTC"));
    assert!(!currency::is_known("btc"));
    assert_eq!(currency::lookup("BTC").map(|c| c.decimals), Some(8));
}

#[test]
fn round_trip_between_every_pair_stays_within_tolerance() {
    let tolerance = dec("0.000000000001");
    for amount in [dec("0.01"), dec("1234.5678"), dec("1000000000")] {
        for a in currency::CURRENCIES.iter() {
            for b in currency::CURRENCIES.iter() {
                let there = currency::convert(amount, a.code, b.code);
                let back = currency::convert(there, b.code, a.code);
                let drift = (back - amount).abs();
                assert!(
                    drift <= amount * tolerance,
                    "{} {} -> {} -> {}: got {}",
                    amount,
                    a.code,
                    b.code,
                    a.code,
                    back
                );
            }
        }
    }
    for (a, b) in [("BTC", "JPY"), ("TZS", "BTC"), ("JPY", "TZS")] {
        let back = currency::convert(currency::convert(dec("250"), a, b), b, a);
        assert!((back - dec("250")).abs() <= dec("250") * tolerance);
    }
}

#[test]
fn overflowing_conversion_saturates() {
    let huge = dec("1000000000000000000000000");
    assert_eq!(currency::convert(huge, "BTC", "TZS"), Decimal::MAX);
    assert_eq!(currency::convert(-huge, "BTC", "TZS"), Decimal::MIN);
    let shown = currency::format_converted(huge, "BTC", "TZS");
    assert!(shown.starts_with("TSh79,228,162,514,264,337,593,543,950,335"));
}
