//! Display formatting for already-rounded results. Money renders with two
//! decimals and thousands separators, ratios as a one-decimal percentage.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::types::{Money, Ratio};

pub const CURRENCY_PREFIX: &str = "RM";

/// `1992.73` → `1,992.73`
pub fn format_money(value: Money) -> String {
    group_thousands(value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero), 2)
}

/// `1992.73` → `RM 1,992.73`
pub fn format_currency(value: Money) -> String {
    format!("{CURRENCY_PREFIX} {}", format_money(value))
}

/// Ratio to percent with one decimal: `0.6` → `60.0%`
pub fn format_percent(ratio: Ratio) -> String {
    let pct = (ratio * dec!(100)).round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    format!("{pct:.1}%")
}

fn group_thousands(value: Decimal, dp: usize) -> String {
    let raw = format!("{:.*}", dp, value.abs());
    let (int_part, frac_part) = raw.split_once('.').unwrap_or((raw.as_str(), ""));

    let digits = int_part.as_bytes();
    let mut grouped = String::with_capacity(raw.len() + digits.len() / 3 + 1);
    if value.is_sign_negative() && !value.is_zero() {
        grouped.push('-');
    }
    for (i, d) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*d as char);
    }
    if !frac_part.is_empty() {
        grouped.push('.');
        grouped.push_str(frac_part);
    }
    grouped
}
