use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::handbook::{BankTier, Handbook};
use crate::normalize::{self, lenient_money};
use crate::rounding::ceil_cents;
use crate::types::*;

/// DSR at or above which a case is YELLOW, and the target line used by the
/// remediation gap.
pub const DSR_WATCH_LINE: Ratio = dec!(0.60);

/// DSR at or above which a case is RED.
pub const DSR_DECLINE_LINE: Ratio = dec!(0.70);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AffordabilityInput {
    #[serde(default, deserialize_with = "lenient_money")]
    pub total_commitment: Money,
    #[serde(default, deserialize_with = "lenient_money")]
    pub net_income: Money,
    #[serde(default, deserialize_with = "lenient_money")]
    pub living_cost_baseline: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AffordabilityBand {
    Green,
    Yellow,
    Red,
    /// Net disposable income is below the cost-of-living floor.
    FailCost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffordabilityResult {
    pub dsr_ratio: Ratio,
    /// May be negative when commitments exceed income.
    pub net_disposable_income: Money,
    pub band: AffordabilityBand,
}

/// Two independent ways to reach the 60% line: raise income, or clear debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffordabilityGap {
    pub extra_income_needed: Money,
    pub debt_clearance_needed: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankTierPlacement {
    pub bank_id: String,
    pub bank_name: String,
    pub tier: BankTier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityAssessment {
    #[serde(flatten)]
    pub result: AffordabilityResult,
    pub passes_cost_check: bool,
    pub gap: AffordabilityGap,
    pub default_dsr_limit: Ratio,
    pub within_default_limit: bool,
    pub bank_tiers: Vec<BankTierPlacement>,
}

// ---------------------------------------------------------------------------
// Core calculations
// ---------------------------------------------------------------------------

/// DSR, NDI and the risk band. The cost-of-living check runs first: a case
/// that leaves less than `living_cost_baseline` fails regardless of DSR.
pub fn compute_affordability(input: &AffordabilityInput) -> AffordabilityResult {
    let commitment = input.total_commitment.max(Decimal::ZERO);
    let income = input.net_income.max(Decimal::ZERO);
    let living_cost = input.living_cost_baseline.max(Decimal::ZERO);

    let dsr_ratio = if income > Decimal::ZERO {
        commitment / income
    } else {
        Decimal::ZERO
    };
    let net_disposable_income = income - commitment;

    AffordabilityResult {
        dsr_ratio,
        net_disposable_income,
        band: classify(dsr_ratio, net_disposable_income, living_cost),
    }
}

pub fn classify(dsr_ratio: Ratio, net_disposable_income: Money, living_cost: Money) -> AffordabilityBand {
    if net_disposable_income < living_cost {
        AffordabilityBand::FailCost
    } else if dsr_ratio >= DSR_DECLINE_LINE {
        AffordabilityBand::Red
    } else if dsr_ratio >= DSR_WATCH_LINE {
        AffordabilityBand::Yellow
    } else {
        AffordabilityBand::Green
    }
}

/// Income top-up or debt reduction that would bring DSR to 60%, each
/// computed on its own. Rounded up so the target is actually reached.
pub fn affordability_gap(total_commitment: Money, net_income: Money) -> AffordabilityGap {
    let commitment = total_commitment.max(Decimal::ZERO);
    let income = net_income.max(Decimal::ZERO);

    AffordabilityGap {
        extra_income_needed: ceil_cents((commitment / DSR_WATCH_LINE - income).max(Decimal::ZERO)),
        debt_clearance_needed: ceil_cents((commitment - income * DSR_WATCH_LINE).max(Decimal::ZERO)),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Full affordability view: band, remediation gap and where each bank in
/// the handbook would place the case.
pub fn assess_affordability(
    input: &AffordabilityInput,
    handbook: &Handbook,
) -> ComputationOutput<AffordabilityAssessment> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let clean = AffordabilityInput {
        total_commitment: normalize::non_negative("total_commitment", input.total_commitment, &mut warnings),
        net_income: normalize::non_negative("net_income", input.net_income, &mut warnings),
        living_cost_baseline: normalize::non_negative(
            "living_cost_baseline",
            input.living_cost_baseline,
            &mut warnings,
        ),
    };
    if clean.net_income.is_zero() {
        warnings.push("net_income is zero; DSR reported as 0".into());
    }

    let result = compute_affordability(&clean);
    let gap = affordability_gap(clean.total_commitment, clean.net_income);
    let limit = handbook.bank_strategies.default_dsr_limit;

    let bank_tiers = handbook
        .bank_strategies
        .banks
        .iter()
        .map(|bank| BankTierPlacement {
            bank_id: bank.id.clone(),
            bank_name: bank.name.clone(),
            tier: bank.classify(result.dsr_ratio),
        })
        .collect();

    debug!(dsr = %result.dsr_ratio, ndi = %result.net_disposable_income, band = ?result.band, "assessed affordability");

    let output = AffordabilityAssessment {
        result,
        passes_cost_check: result.band != AffordabilityBand::FailCost,
        gap,
        default_dsr_limit: limit,
        within_default_limit: result.dsr_ratio <= limit,
        bank_tiers,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "DSR / NDI affordability (cost-of-living check first)",
        &serde_json::json!({
            "living_cost_baseline": clean.living_cost_baseline.to_string(),
            "yellow_from": DSR_WATCH_LINE.to_string(),
            "red_from": DSR_DECLINE_LINE.to_string(),
            "gap_target_dsr": DSR_WATCH_LINE.to_string(),
        }),
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn input(commitment: Decimal, income: Decimal, living: Decimal) -> AffordabilityInput {
        AffordabilityInput {
            total_commitment: commitment,
            net_income: income,
            living_cost_baseline: living,
        }
    }

    #[test]
    fn test_yellow_lower_bound_inclusive() {
        let r = compute_affordability(&input(dec!(3000), dec!(5000), dec!(1500)));
        assert_eq!(r.dsr_ratio, dec!(0.6));
        assert_eq!(r.net_disposable_income, dec!(2000));
        assert_eq!(r.band, AffordabilityBand::Yellow);
    }

    #[test]
    fn test_red_at_seventy_percent() {
        let r = compute_affordability(&input(dec!(7000), dec!(10_000), dec!(1000)));
        assert_eq!(r.band, AffordabilityBand::Red);
    }

    #[test]
    fn test_green_below_sixty() {
        let r = compute_affordability(&input(dec!(2000), dec!(10_000), dec!(1500)));
        assert_eq!(r.band, AffordabilityBand::Green);
    }

    #[test]
    fn test_cost_check_overrides_low_dsr() {
        // DSR 50% but only 1000 left over against a 1500 floor
        let r = compute_affordability(&input(dec!(1000), dec!(2000), dec!(1500)));
        assert_eq!(r.dsr_ratio, dec!(0.5));
        assert_eq!(r.band, AffordabilityBand::FailCost);
    }

    #[test]
    fn test_zero_income() {
        let r = compute_affordability(&input(dec!(1000), Decimal::ZERO, Decimal::ZERO));
        assert_eq!(r.dsr_ratio, Decimal::ZERO);
        assert_eq!(r.net_disposable_income, dec!(-1000));
        assert_eq!(r.band, AffordabilityBand::FailCost);
    }

    #[test]
    fn test_gap_targets() {
        let gap = affordability_gap(dec!(3500), dec!(5000));
        // 3500 / 0.6 = 5833.33… − 5000
        assert_eq!(gap.extra_income_needed, dec!(833.34));
        // 3500 − 3000
        assert_eq!(gap.debt_clearance_needed, dec!(500));
    }

    #[test]
    fn test_gap_zero_when_under_line() {
        let gap = affordability_gap(dec!(1000), dec!(5000));
        assert_eq!(gap.extra_income_needed, Decimal::ZERO);
        assert_eq!(gap.debt_clearance_needed, Decimal::ZERO);
    }

    #[test]
    fn test_assessment_bank_tiers() {
        let out = assess_affordability(&input(dec!(3250), dec!(5000), dec!(1000)), &Handbook::default());
        let a = &out.result;
        assert_eq!(a.result.band, AffordabilityBand::Yellow);
        assert!(!a.within_default_limit);
        assert!(a.passes_cost_check);
        assert!(a.bank_tiers.iter().all(|p| p.tier == BankTier::Tier2));
    }
}
