use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::amortization::installment::settle_period;
use crate::calendar::daily_rest_interest;
use crate::flexi::events::{BalanceSnapshot, FlexiEventDetails};
use crate::rounding::round_cents;
use crate::types::{Money, Rate, Ratio};

/// Share of a semi-flexi advance that goes to the offset bucket.
pub const SEMI_FLEXI_BUCKET_SHARE: Ratio = dec!(0.80);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlexiLoanType {
    /// Advances split 80/20 between bucket and reserve; the bucket is never
    /// drawn to pay installments.
    #[default]
    #[serde(alias = "semi", alias = "semi-flexi")]
    SemiFlexi,
    /// Advances go wholly to the bucket, which also backs up the reserve.
    #[serde(alias = "full", alias = "full-flexi")]
    FullFlexi,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Installment debited from parked funds first.
    #[default]
    #[serde(alias = "auto-debit")]
    AutoDebit,
    /// Installment paid from fresh cash; parked funds untouched.
    Direct,
}

/// Balances carried between transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexiState {
    pub housing_loan_balance: Money,
    pub savings_reserve_balance: Money,
    pub offset_bucket_balance: Money,
    pub cumulative_interest: Money,
    /// Unrounded interest accrued since the last due date.
    pub accrued_interest: Money,
}

impl FlexiState {
    pub fn opening(principal: Money) -> Self {
        Self {
            housing_loan_balance: principal.max(Decimal::ZERO),
            savings_reserve_balance: Decimal::ZERO,
            offset_bucket_balance: Decimal::ZERO,
            cumulative_interest: Decimal::ZERO,
            accrued_interest: Decimal::ZERO,
        }
    }

    /// Balance that accrues interest: loan less bucket, floored at zero.
    pub fn effective_balance(&self) -> Money {
        (self.housing_loan_balance - self.offset_bucket_balance).max(Decimal::ZERO)
    }

    pub fn is_paid_off(&self) -> bool {
        self.housing_loan_balance <= Decimal::ZERO
    }

    pub fn snapshot(&self) -> BalanceSnapshot {
        BalanceSnapshot {
            housing_loan_balance: self.housing_loan_balance,
            savings_reserve_balance: self.savings_reserve_balance,
            offset_bucket_balance: self.offset_bucket_balance,
        }
    }

    fn accrue(mut self, annual_rate: Rate, days: i64) -> Self {
        self.accrued_interest += daily_rest_interest(self.effective_balance(), annual_rate, days);
        self
    }
}

/// Fixed terms of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlexiPolicy {
    /// Annual rate as a fraction (0.041 = 4.1%).
    pub annual_rate: Rate,
    pub installment: Money,
    pub loan_type: FlexiLoanType,
    pub payment_method: PaymentMethod,
}

impl FlexiPolicy {
    /// `(bucket, reserve)` portions of an advance.
    pub fn split_advance(&self, amount: Money) -> (Money, Money) {
        match self.loan_type {
            FlexiLoanType::FullFlexi => (amount, Decimal::ZERO),
            FlexiLoanType::SemiFlexi => {
                let bucket = round_cents(amount * SEMI_FLEXI_BUCKET_SHARE);
                (bucket, amount - bucket)
            }
        }
    }
}

/// Input to one step of the state machine. `days_elapsed` counts days since
/// the previous transition; interest for those days accrues at the balances
/// held before this transition applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Advance {
        date: NaiveDate,
        amount: Money,
        days_elapsed: i64,
    },
    DueDate {
        date: NaiveDate,
        period_index: u32,
        days_elapsed: i64,
        /// Last contractual period; any residual is retired here.
        is_final: bool,
    },
}

/// Apply one transition. Pure: the input state is not touched and the
/// emitted events are returned in the order they must be logged.
pub fn transition(state: FlexiState, policy: &FlexiPolicy, t: Transition) -> (FlexiState, Vec<FlexiEventDetails>) {
    match t {
        Transition::Advance {
            date,
            amount,
            days_elapsed,
        } => {
            let mut next = state.accrue(policy.annual_rate, days_elapsed);
            let (bucket_portion, reserve_portion) = policy.split_advance(amount.max(Decimal::ZERO));
            next.offset_bucket_balance += bucket_portion;
            next.savings_reserve_balance += reserve_portion;

            trace!(%date, %amount, bucket = %next.offset_bucket_balance, "advance applied");

            let event = FlexiEventDetails::Advance {
                amount,
                bucket_portion,
                reserve_portion,
                balances: next.snapshot(),
            };
            (next, vec![event])
        }
        Transition::DueDate {
            date,
            period_index,
            days_elapsed,
            is_final,
        } => {
            let mut next = state.accrue(policy.annual_rate, days_elapsed);
            let effective_balance = next.effective_balance();
            let settled = settle_period(next.housing_loan_balance, next.accrued_interest, policy.installment, is_final);

            next.housing_loan_balance = settled.closing_balance;
            next.cumulative_interest += settled.interest;
            next.accrued_interest = Decimal::ZERO;

            let mut owed = settled.payment;
            let mut from_reserve = Decimal::ZERO;
            let mut from_bucket = Decimal::ZERO;
            if policy.payment_method == PaymentMethod::AutoDebit {
                from_reserve = owed.min(next.savings_reserve_balance);
                next.savings_reserve_balance -= from_reserve;
                owed -= from_reserve;

                if policy.loan_type == FlexiLoanType::FullFlexi {
                    from_bucket = owed.min(next.offset_bucket_balance);
                    next.offset_bucket_balance -= from_bucket;
                    owed -= from_bucket;
                }
            }

            trace!(%date, period_index, interest = %settled.interest, balance = %next.housing_loan_balance, "due date settled");

            let mut emitted = vec![FlexiEventDetails::DueDate {
                period_index,
                installment: settled.payment,
                interest: settled.interest,
                principal_paid: settled.principal,
                from_reserve,
                from_bucket,
                from_cash: owed,
                effective_balance,
                balances: next.snapshot(),
            }];
            if from_bucket > Decimal::ZERO {
                emitted.push(FlexiEventDetails::SmartLogicTrigger {
                    bucket_used: from_bucket,
                    offset_bucket_balance: next.offset_bucket_balance,
                });
            }
            (next, emitted)
        }
    }
}
