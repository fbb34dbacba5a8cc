use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::normalize::lenient_money;
use crate::types::Money;

fn default_visible() -> bool {
    true
}

/// One monthly obligation on the applicant's commitment stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentLine {
    #[serde(default)]
    pub label: String,
    #[serde(default, deserialize_with = "lenient_money")]
    pub monthly_installment: Money,
    #[serde(default, deserialize_with = "lenient_money")]
    pub outstanding_balance: Money,
    /// Whether the line shows up on the credit bureau report.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// The subject property's own housing loan.
    #[serde(default)]
    pub is_housing: bool,
}

impl CommitmentLine {
    pub fn new(label: impl Into<String>, monthly_installment: Money, outstanding_balance: Money) -> Self {
        Self {
            label: label.into(),
            monthly_installment,
            outstanding_balance,
            visible: true,
            is_housing: false,
        }
    }

    pub fn housing(mut self) -> Self {
        self.is_housing = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    fn installment(&self) -> Money {
        self.monthly_installment.max(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommitmentSummary {
    /// Commitments the bank can see.
    pub bank_commitment: Money,
    pub hidden_commitment: Money,
    pub total_commitment: Money,
    pub total_outstanding: Money,
}

/// Totals over a commitment stack. Negative amounts count as zero.
pub fn summarize_commitments(lines: &[CommitmentLine]) -> CommitmentSummary {
    lines.iter().fold(CommitmentSummary::default(), |mut acc, line| {
        let installment = line.installment();
        if line.visible {
            acc.bank_commitment += installment;
        } else {
            acc.hidden_commitment += installment;
        }
        acc.total_commitment += installment;
        acc.total_outstanding += line.outstanding_balance.max(Decimal::ZERO);
        acc
    })
}
