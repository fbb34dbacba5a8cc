//! Rescue scenarios for cases that are not GREEN: how much extra income the
//! target DSR needs, what a tenure extension on the subject housing loan
//! does, and what clearing one non-housing debt does.

use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::affordability::commitments::{summarize_commitments, CommitmentLine};
use crate::affordability::dsr::{compute_affordability, AffordabilityBand, AffordabilityInput, AffordabilityResult};
use crate::amortization::installment::compute_installment;
use crate::handbook::Handbook;
use crate::normalize::{self, lenient_money, lenient_optional_money, lenient_years};
use crate::rounding::ceil_cents;
use crate::types::*;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MitigationInput {
    #[serde(default, deserialize_with = "lenient_money")]
    pub net_income: Money,
    #[serde(default, deserialize_with = "lenient_money")]
    pub living_cost_baseline: Money,
    #[serde(default)]
    pub commitments: Vec<CommitmentLine>,
    /// Remaining tenure of the subject housing loan, in years.
    #[serde(default, deserialize_with = "lenient_years")]
    pub current_tenure_years: u32,
    /// Rate used to re-price the housing loan over the longer tenure. Without
    /// it the installment is scaled by `current / max` tenure.
    #[serde(default, deserialize_with = "lenient_optional_money")]
    pub housing_rate_percent: Option<Percent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MitigationScenario {
    pub description: String,
    pub new_total_commitment: Money,
    #[serde(flatten)]
    pub result: AffordabilityResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MitigationOutput {
    pub current: AffordabilityResult,
    pub target_dsr: Ratio,
    /// Extra net income that brings DSR down to the target.
    pub income_deficit: Money,
    pub soft_fix: Option<MitigationScenario>,
    pub debt_settlement: Option<MitigationScenario>,
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

pub fn income_deficit(total_commitment: Money, net_income: Money, target_dsr: Ratio) -> Money {
    if total_commitment <= Decimal::ZERO || target_dsr <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    ceil_cents((total_commitment / target_dsr - net_income).max(Decimal::ZERO))
}

/// New housing installment when the loan is stretched to `max_tenure` years.
fn extended_housing_installment(
    housing: &CommitmentLine,
    current_tenure: u32,
    max_tenure: u32,
    rate_percent: Option<Percent>,
) -> Money {
    match rate_percent {
        Some(rate) if housing.outstanding_balance > Decimal::ZERO && rate >= Decimal::ZERO => {
            compute_installment(housing.outstanding_balance, rate, max_tenure)
        }
        _ => ceil_cents(
            housing.monthly_installment * Decimal::from(current_tenure) / Decimal::from(max_tenure),
        ),
    }
}

fn scenario(
    description: String,
    new_total: Money,
    net_income: Money,
    living_cost: Money,
) -> MitigationScenario {
    let result = compute_affordability(&AffordabilityInput {
        total_commitment: new_total,
        net_income,
        living_cost_baseline: living_cost,
    });
    MitigationScenario {
        description,
        new_total_commitment: new_total,
        result,
    }
}

/// The non-housing line that frees the most installment per unit of
/// balance settled.
pub fn best_debt_to_settle(lines: &[CommitmentLine]) -> Option<&CommitmentLine> {
    lines
        .iter()
        .filter(|l| !l.is_housing)
        .filter(|l| l.monthly_installment > Decimal::ZERO && l.outstanding_balance > Decimal::ZERO)
        .fold(None, |best: Option<&CommitmentLine>, line| match best {
            Some(b) if score(b) >= score(line) => Some(b),
            _ => Some(line),
        })
}

fn score(line: &CommitmentLine) -> Decimal {
    line.monthly_installment / line.outstanding_balance
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Scenarios are only produced when the current band is not GREEN.
pub fn simulate_mitigation(input: &MitigationInput, handbook: &Handbook) -> ComputationOutput<MitigationOutput> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let net_income = normalize::non_negative("net_income", input.net_income, &mut warnings);
    let living_cost = normalize::non_negative("living_cost_baseline", input.living_cost_baseline, &mut warnings);
    let summary = summarize_commitments(&input.commitments);
    let total = summary.total_commitment;
    let target_dsr = handbook.bank_strategies.default_dsr_limit;
    let max_tenure = handbook.global.max_tenure;

    let current = compute_affordability(&AffordabilityInput {
        total_commitment: total,
        net_income,
        living_cost_baseline: living_cost,
    });

    let needs_rescue = current.band != AffordabilityBand::Green;
    if !needs_rescue {
        warnings.push("case is GREEN; no mitigation needed".into());
    }

    let housing = input
        .commitments
        .iter()
        .find(|l| l.is_housing && l.monthly_installment > Decimal::ZERO);

    let soft_fix = match housing {
        Some(line) if needs_rescue && input.current_tenure_years < max_tenure => {
            let new_installment = extended_housing_installment(
                line,
                input.current_tenure_years,
                max_tenure,
                input.housing_rate_percent,
            );
            Some(scenario(
                format!(
                    "extend {} from {} to {} years (installment {} -> {})",
                    line.label, input.current_tenure_years, max_tenure, line.monthly_installment, new_installment
                ),
                total - line.monthly_installment.max(Decimal::ZERO) + new_installment,
                net_income,
                living_cost,
            ))
        }
        Some(_) if needs_rescue => {
            warnings.push(format!("housing tenure already at the {max_tenure}-year maximum"));
            None
        }
        _ => None,
    };

    let debt_settlement = if needs_rescue {
        best_debt_to_settle(&input.commitments).map(|line| {
            scenario(
                format!("settle {} (balance {})", line.label, line.outstanding_balance),
                total - line.monthly_installment,
                net_income,
                living_cost,
            )
        })
    } else {
        None
    };

    let output = MitigationOutput {
        current,
        target_dsr,
        income_deficit: income_deficit(total, net_income, target_dsr),
        soft_fix,
        debt_settlement,
    };

    debug!(band = ?current.band, deficit = %output.income_deficit, "simulated mitigation");

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Mitigation scenarios: income deficit, tenure extension, debt settlement",
        &serde_json::json!({
            "target_dsr": target_dsr.to_string(),
            "max_tenure": max_tenure,
        }),
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
