//! Lending policy "handbook": tenure and age limits, income haircuts and
//! per-bank DSR strategies.
//!
//! The handbook is an immutable value passed into every call that needs it.
//! Hosts load overrides from wherever they persist them and merge them over
//! [`Handbook::default`].

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::MortgageError;
use crate::types::{Ratio, MAX_TENURE_YEARS};
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeType {
    BasicSalary,
    FixedAllowance,
    Commission,
    Bonus,
    Rental,
    Other,
}

impl IncomeType {
    pub const ALL: [IncomeType; 6] = [
        IncomeType::BasicSalary,
        IncomeType::FixedAllowance,
        IncomeType::Commission,
        IncomeType::Bonus,
        IncomeType::Rental,
        IncomeType::Other,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalPolicy {
    pub max_tenure: u32,
    pub max_age: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeRule {
    /// Fraction of the income that is recognised (0.8 = 80%).
    pub haircut: Ratio,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankStrategy {
    pub id: String,
    pub name: String,
    pub tier1_limit: Ratio,
    pub tier2_limit: Ratio,
    #[serde(default)]
    pub notes: String,
}

/// Where a DSR lands against one bank's limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankTier {
    Tier1,
    Tier2,
    Exceeds,
}

impl BankStrategy {
    pub fn classify(&self, dsr: Ratio) -> BankTier {
        if dsr <= self.tier1_limit {
            BankTier::Tier1
        } else if dsr <= self.tier2_limit {
            BankTier::Tier2
        } else {
            BankTier::Exceeds
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankStrategies {
    pub default_dsr_limit: Ratio,
    pub banks: Vec<BankStrategy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handbook {
    pub global: GlobalPolicy,
    pub income_matrix: BTreeMap<IncomeType, IncomeRule>,
    pub bank_strategies: BankStrategies,
}

/// Partial handbook as persisted by a host. Every field is optional and is
/// merged section by section over the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandbookOverride {
    #[serde(default)]
    pub global: Option<GlobalOverride>,
    #[serde(default)]
    pub income_matrix: Option<BTreeMap<IncomeType, IncomeRule>>,
    #[serde(default)]
    pub bank_strategies: Option<BankStrategiesOverride>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalOverride {
    pub max_tenure: Option<u32>,
    pub max_age: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BankStrategiesOverride {
    pub default_dsr_limit: Option<Ratio>,
    pub banks: Option<Vec<BankStrategy>>,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for Handbook {
    fn default() -> Self {
        let income_matrix = [
            (IncomeType::BasicSalary, dec!(1.0)),
            (IncomeType::FixedAllowance, dec!(1.0)),
            (IncomeType::Commission, dec!(0.8)),
            (IncomeType::Bonus, dec!(0.7)),
            (IncomeType::Rental, dec!(0.8)),
            (IncomeType::Other, dec!(0.3)),
        ]
        .into_iter()
        .map(|(income_type, haircut)| (income_type, IncomeRule { haircut }))
        .collect();

        Self {
            global: GlobalPolicy {
                max_tenure: MAX_TENURE_YEARS,
                max_age: 70,
            },
            income_matrix,
            bank_strategies: BankStrategies {
                default_dsr_limit: dec!(0.60),
                banks: vec![
                    BankStrategy {
                        id: "mbb".into(),
                        name: "MBB".into(),
                        tier1_limit: dec!(0.60),
                        tier2_limit: dec!(0.70),
                        notes: "Tier 1 for strong profile, Tier 2 for borderline cases.".into(),
                    },
                    BankStrategy {
                        id: "cimb".into(),
                        name: "CIMB".into(),
                        tier1_limit: dec!(0.60),
                        tier2_limit: dec!(0.70),
                        notes: String::new(),
                    },
                ],
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Loading and validation
// ---------------------------------------------------------------------------

impl Handbook {
    /// Apply `overrides` over the built-in defaults.
    pub fn merged_over_defaults(overrides: HandbookOverride) -> Self {
        let mut handbook = Self::default();

        if let Some(global) = overrides.global {
            if let Some(max_tenure) = global.max_tenure {
                handbook.global.max_tenure = max_tenure;
            }
            if let Some(max_age) = global.max_age {
                handbook.global.max_age = max_age;
            }
        }
        if let Some(matrix) = overrides.income_matrix {
            handbook.income_matrix.extend(matrix);
        }
        if let Some(strategies) = overrides.bank_strategies {
            if let Some(limit) = strategies.default_dsr_limit {
                handbook.bank_strategies.default_dsr_limit = limit;
            }
            if let Some(banks) = strategies.banks {
                handbook.bank_strategies.banks = banks;
            }
        }

        handbook
    }

    /// Parse a JSON override document, merge it and validate the result.
    pub fn from_json_str(raw: &str) -> MortgageResult<Self> {
        let overrides: HandbookOverride = serde_json::from_str(raw)?;
        let handbook = Self::merged_over_defaults(overrides);
        handbook.validate()?;
        Ok(handbook)
    }

    pub fn validate(&self) -> MortgageResult<()> {
        if self.global.max_tenure == 0 || self.global.max_tenure > MAX_TENURE_YEARS {
            return Err(MortgageError::InvalidConfig {
                field: "global.max_tenure".into(),
                reason: format!("must be between 1 and {MAX_TENURE_YEARS} years"),
            });
        }
        for (income_type, rule) in &self.income_matrix {
            if rule.haircut < Decimal::ZERO || rule.haircut > Decimal::ONE {
                return Err(MortgageError::InvalidConfig {
                    field: format!("income_matrix.{income_type:?}.haircut"),
                    reason: "haircut must be between 0 and 1".into(),
                });
            }
        }
        check_dsr_limit(
            "bank_strategies.default_dsr_limit",
            self.bank_strategies.default_dsr_limit,
        )?;
        for bank in &self.bank_strategies.banks {
            check_dsr_limit(&format!("banks.{}.tier1_limit", bank.id), bank.tier1_limit)?;
            check_dsr_limit(&format!("banks.{}.tier2_limit", bank.id), bank.tier2_limit)?;
            if bank.tier1_limit > bank.tier2_limit {
                return Err(MortgageError::InvalidConfig {
                    field: format!("banks.{}", bank.id),
                    reason: "tier1_limit cannot exceed tier2_limit".into(),
                });
            }
        }
        Ok(())
    }

    /// Recognition fraction for an income type; unlisted types count in full.
    pub fn haircut(&self, income_type: IncomeType) -> Ratio {
        self.income_matrix
            .get(&income_type)
            .map(|rule| rule.haircut)
            .unwrap_or(Decimal::ONE)
    }
}

fn check_dsr_limit(field: &str, limit: Ratio) -> MortgageResult<()> {
    if limit <= Decimal::ZERO || limit > dec!(2) {
        return Err(MortgageError::InvalidConfig {
            field: field.into(),
            reason: "DSR limit must be in (0, 2]".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
