//! Lenient coercion of caller input.
//!
//! A half-filled form must never crash a calculation, so every numeric field
//! accepts numbers, numeric strings (with thousands separators), `null`, or
//! garbage; anything non-numeric becomes zero.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::types::{Money, MAX_TENURE_YEARS};

/// Coerce an arbitrary JSON value to a Decimal, zero when not numeric.
pub fn coerce_decimal(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => Decimal::ZERO,
    }
}

/// Parse a numeric string, tolerating `1,234.50`, whitespace and `1e5`.
pub fn parse_decimal(raw: &str) -> Decimal {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .unwrap_or(Decimal::ZERO)
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

pub fn lenient_money<'de, D>(deserializer: D) -> Result<Money, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_decimal).unwrap_or(Decimal::ZERO))
}

pub fn lenient_optional_money<'de, D>(deserializer: D) -> Result<Option<Money>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(ref s)) if s.trim().is_empty() => None,
        Some(v) => Some(coerce_decimal(&v)),
    })
}

/// Whole years; fractions are truncated and negatives become zero.
pub fn lenient_years<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let years = value.as_ref().map(coerce_decimal).unwrap_or(Decimal::ZERO);
    Ok(decimal_to_u32(years))
}

pub fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => parse_date(&s),
        _ => None,
    })
}

pub fn decimal_to_u32(value: Decimal) -> u32 {
    if value <= Decimal::ZERO {
        return 0;
    }
    value.trunc().to_u32().unwrap_or(0)
}

/// Clamp a negative amount to zero, recording a warning when it changes.
pub fn non_negative(field: &str, value: Decimal, warnings: &mut Vec<String>) -> Decimal {
    if value < Decimal::ZERO {
        warn!(field, %value, "negative input normalized to zero");
        warnings.push(format!("{field} was negative ({value}); treated as zero"));
        Decimal::ZERO
    } else {
        value
    }
}

/// Tenure outside (0, 35] years is treated as zero.
pub fn tenure(field: &str, years: u32, warnings: &mut Vec<String>) -> u32 {
    if years > MAX_TENURE_YEARS {
        warn!(field, years, "tenure above maximum normalized to zero");
        warnings.push(format!(
            "{field} of {years} exceeds the {MAX_TENURE_YEARS}-year maximum; treated as zero"
        ));
        0
    } else {
        years
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_coerce_numbers_and_strings() {
        assert_eq!(coerce_decimal(&json!(4.1)), dec!(4.1));
        assert_eq!(coerce_decimal(&json!(450000)), dec!(450000));
        assert_eq!(coerce_decimal(&json!(" 1,234.50 ")), dec!(1234.50));
        assert_eq!(coerce_decimal(&json!("1e5")), dec!(100000));
    }

    #[test]
    fn test_coerce_garbage_is_zero() {
        assert_eq!(coerce_decimal(&json!("RM")), Decimal::ZERO);
        assert_eq!(coerce_decimal(&json!(null)), Decimal::ZERO);
        assert_eq!(coerce_decimal(&json!(true)), Decimal::ZERO);
        assert_eq!(coerce_decimal(&json!([1, 2])), Decimal::ZERO);
        assert_eq!(coerce_decimal(&json!("")), Decimal::ZERO);
    }

    #[test]
    fn test_decimal_to_u32() {
        assert_eq!(decimal_to_u32(dec!(30.9)), 30);
        assert_eq!(decimal_to_u32(dec!(-3)), 0);
    }

    #[test]
    fn test_non_negative_records_warning() {
        let mut warnings = Vec::new();
        assert_eq!(non_negative("amount", dec!(-1), &mut warnings), Decimal::ZERO);
        assert_eq!(non_negative("amount", dec!(5), &mut warnings), dec!(5));
        assert_eq!(warnings.len(), 1);
    }
}
