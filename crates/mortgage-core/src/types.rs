use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::normalize;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%).
pub type Rate = Decimal;

/// Rates quoted as percentages (4.1 = 4.1% p.a.). Only used at the API
/// boundary; convert with [`LoanTerms::annual_rate`] before doing maths.
pub type Percent = Decimal;

/// Dimensionless ratios such as DSR or margin (0.60 = 60%).
pub type Ratio = Decimal;

/// Longest tenure any entry point will accept.
pub const MAX_TENURE_YEARS: u32 = 35;

pub const MONTHS_PER_YEAR: u32 = 12;

/// Parameters of a single loan. Immutable once built; every calculation
/// takes it by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    #[serde(default, deserialize_with = "normalize::lenient_money")]
    pub principal: Money,
    #[serde(default, deserialize_with = "normalize::lenient_money")]
    pub annual_rate_percent: Percent,
    #[serde(default, deserialize_with = "normalize::lenient_years")]
    pub tenure_years: u32,
    #[serde(default, deserialize_with = "normalize::lenient_date")]
    pub start_date: Option<NaiveDate>,
}

impl LoanTerms {
    pub fn new(
        principal: Money,
        annual_rate_percent: Percent,
        tenure_years: u32,
        start_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            principal,
            annual_rate_percent,
            tenure_years,
            start_date,
        }
    }

    /// Copy with every out-of-range field forced to zero, plus one warning
    /// per field that was changed.
    pub fn normalized(&self) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        let principal = normalize::non_negative("principal", self.principal, &mut warnings);
        let annual_rate_percent =
            normalize::non_negative("annual_rate_percent", self.annual_rate_percent, &mut warnings);
        let tenure_years = normalize::tenure("tenure_years", self.tenure_years, &mut warnings);
        (
            Self {
                principal,
                annual_rate_percent,
                tenure_years,
                start_date: self.start_date,
            },
            warnings,
        )
    }

    /// Annual rate as a fraction (4.1% → 0.041).
    pub fn annual_rate(&self) -> Rate {
        self.annual_rate_percent / dec!(100)
    }

    pub fn monthly_rate(&self) -> Rate {
        self.annual_rate() / Decimal::from(MONTHS_PER_YEAR)
    }

    pub fn periods(&self) -> u32 {
        self.tenure_years * MONTHS_PER_YEAR
    }

    /// True when no meaningful loan can be computed from these terms.
    pub fn is_degenerate(&self) -> bool {
        self.principal <= Decimal::ZERO
            || self.annual_rate_percent < Decimal::ZERO
            || self.tenure_years == 0
            || self.tenure_years > MAX_TENURE_YEARS
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
