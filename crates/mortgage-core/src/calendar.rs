//! Month stepping and day-count conventions shared by the schedule builder
//! and the flexi simulator.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate, MONTHS_PER_YEAR};

pub const DAYS_PER_YEAR: Decimal = dec!(365);

/// How interest for one monthly period is accrued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayCount {
    /// Every month is 1/12 of a year (the annuity convention).
    #[default]
    Monthly,
    /// Daily rest: actual days elapsed over a 365-day year.
    Actual365,
}

impl DayCount {
    /// Unrounded interest on `balance` for a period spanning `days`.
    pub fn period_interest(self, balance: Money, annual_rate: Rate, days: i64) -> Money {
        match self {
            DayCount::Monthly => balance * (annual_rate / Decimal::from(MONTHS_PER_YEAR)),
            DayCount::Actual365 => daily_rest_interest(balance, annual_rate, days),
        }
    }
}

/// `balance × rate × days / 365`
pub fn daily_rest_interest(balance: Money, annual_rate: Rate, days: i64) -> Money {
    if days <= 0 || balance <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    balance * annual_rate * Decimal::from(days) / DAYS_PER_YEAR
}

/// Add whole months, clamping to the last valid day of the target month
/// (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Due date of 1-based `period`, always stepped from the original start so
/// that clamping in short months does not drift later dates.
pub fn due_date(start: NaiveDate, period: u32) -> NaiveDate {
    add_months(start, period)
}

/// Whole days from `from` to `to`; never negative.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days().max(0)
}
