//! Recognised income: raw income lines, less statutory deductions on basic
//! salary, scaled by the bank haircut for each income type.

use std::collections::BTreeMap;
use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::handbook::{Handbook, IncomeType};
use crate::normalize::{self, lenient_money, lenient_optional_money};
use crate::rounding::round_cents;
use crate::types::*;

const EPF_RATE: Rate = dec!(0.11);
const SOCSO_RATE: Rate = dec!(0.005);
const SOCSO_CAP: Money = dec!(80);
const PCB_THRESHOLD: Money = dec!(2500);
const CHILD_RELIEF_EACH: Money = dec!(100);
const CHILD_RELIEF_CAP: Money = dec!(500);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeLine {
    pub income_type: IncomeType,
    #[serde(default, deserialize_with = "lenient_money")]
    pub amount: Money,
    /// Replaces the handbook haircut for this line (0.8 = 80% recognised).
    #[serde(default, deserialize_with = "lenient_optional_money")]
    pub haircut_override: Option<Ratio>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomeInput {
    #[serde(default)]
    pub lines: Vec<IncomeLine>,
    #[serde(default)]
    pub children: u32,
    /// Manual statutory deduction replacing the EPF/SOCSO/PCB estimate.
    #[serde(default, deserialize_with = "lenient_optional_money")]
    pub statutory_deduction_override: Option<Money>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatutoryDeductions {
    pub epf: Money,
    pub socso: Money,
    pub pcb: Money,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeRow {
    pub income_type: IncomeType,
    pub raw_amount: Money,
    pub statutory_deduction: Money,
    pub haircut: Ratio,
    pub recognized_amount: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeRecognitionOutput {
    pub rows: Vec<IncomeRow>,
    pub statutory: StatutoryDeductions,
    pub total_raw_income: Money,
    pub total_recognized_income: Money,
}

// ---------------------------------------------------------------------------
// Statutory deductions
// ---------------------------------------------------------------------------

/// Simplified monthly EPF, SOCSO and PCB estimate for a basic salary.
pub fn statutory_deductions(basic_salary: Money, children: u32) -> StatutoryDeductions {
    if basic_salary <= Decimal::ZERO {
        return StatutoryDeductions::default();
    }

    let epf = round_cents(basic_salary * EPF_RATE);
    let socso = round_cents((basic_salary * SOCSO_RATE).min(SOCSO_CAP));

    let child_relief = (Decimal::from(children) * CHILD_RELIEF_EACH).min(CHILD_RELIEF_CAP);
    let taxable = (basic_salary - PCB_THRESHOLD - child_relief).max(Decimal::ZERO);
    let pcb_rate = if taxable > dec!(8000) {
        dec!(0.15)
    } else if taxable > dec!(4000) {
        dec!(0.08)
    } else {
        dec!(0.03)
    };
    let pcb = round_cents(taxable * pcb_rate);

    StatutoryDeductions {
        epf,
        socso,
        pcb,
        total: epf + socso + pcb,
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Lines of the same type are summed; the last haircut override given for a
/// type wins.
pub fn recognize_income(input: &IncomeInput, handbook: &Handbook) -> ComputationOutput<IncomeRecognitionOutput> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let mut by_type: BTreeMap<IncomeType, (Money, Option<Ratio>)> = BTreeMap::new();
    for line in &input.lines {
        let amount = normalize::non_negative("amount", line.amount, &mut warnings);
        let entry = by_type.entry(line.income_type).or_insert((Decimal::ZERO, None));
        entry.0 += amount;
        if let Some(haircut) = line.haircut_override {
            entry.1 = Some(clamp_haircut(haircut, &mut warnings));
        }
    }

    let basic_salary = by_type
        .get(&IncomeType::BasicSalary)
        .map(|(amount, _)| *amount)
        .unwrap_or(Decimal::ZERO);
    let statutory = match input.statutory_deduction_override {
        Some(manual) => {
            let total = normalize::non_negative("statutory_deduction_override", manual, &mut warnings);
            StatutoryDeductions {
                total,
                ..StatutoryDeductions::default()
            }
        }
        None => statutory_deductions(basic_salary, input.children),
    };

    let rows: Vec<IncomeRow> = by_type
        .into_iter()
        .map(|(income_type, (raw_amount, haircut_override))| {
            let statutory_deduction = if income_type == IncomeType::BasicSalary {
                statutory.total.min(raw_amount)
            } else {
                Decimal::ZERO
            };
            let haircut = haircut_override.unwrap_or_else(|| handbook.haircut(income_type));
            IncomeRow {
                income_type,
                raw_amount,
                statutory_deduction,
                haircut,
                recognized_amount: round_cents((raw_amount - statutory_deduction) * haircut),
            }
        })
        .collect();

    let total_raw_income: Money = rows.iter().map(|r| r.raw_amount).sum();
    let total_recognized_income: Money = rows.iter().map(|r| r.recognized_amount).sum();

    debug!(%total_raw_income, %total_recognized_income, "recognized income");

    let output = IncomeRecognitionOutput {
        rows,
        statutory,
        total_raw_income,
        total_recognized_income,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Income recognition (statutory deductions on basic salary, then haircut)",
        &serde_json::json!({
            "children": input.children,
            "statutory_override": input.statutory_deduction_override.is_some(),
            "epf_rate": EPF_RATE.to_string(),
            "socso_cap": SOCSO_CAP.to_string(),
        }),
        warnings,
        elapsed,
        output,
    )
}

fn clamp_haircut(haircut: Ratio, warnings: &mut Vec<String>) -> Ratio {
    if haircut < Decimal::ZERO || haircut > Decimal::ONE {
        let clamped = haircut.max(Decimal::ZERO).min(Decimal::ONE);
        warnings.push(format!("haircut override {haircut} clamped to {clamped}"));
        clamped
    } else {
        haircut
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
