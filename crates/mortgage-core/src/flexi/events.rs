use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Percent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlexiEventKind {
    LoanStart,
    Advance,
    DueDate,
    SmartLogicTrigger,
}

/// Balances after an event has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub housing_loan_balance: Money,
    pub savings_reserve_balance: Money,
    pub offset_bucket_balance: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlexiEventDetails {
    LoanStart {
        principal: Money,
        annual_rate_percent: Percent,
        tenure_years: u32,
        installment: Money,
    },
    Advance {
        amount: Money,
        bucket_portion: Money,
        reserve_portion: Money,
        #[serde(flatten)]
        balances: BalanceSnapshot,
    },
    DueDate {
        period_index: u32,
        installment: Money,
        interest: Money,
        principal_paid: Money,
        from_reserve: Money,
        from_bucket: Money,
        from_cash: Money,
        /// Loan balance less bucket over the final accrual segment.
        effective_balance: Money,
        #[serde(flatten)]
        balances: BalanceSnapshot,
    },
    SmartLogicTrigger {
        bucket_used: Money,
        offset_bucket_balance: Money,
    },
}

impl FlexiEventDetails {
    pub fn kind(&self) -> FlexiEventKind {
        match self {
            FlexiEventDetails::LoanStart { .. } => FlexiEventKind::LoanStart,
            FlexiEventDetails::Advance { .. } => FlexiEventKind::Advance,
            FlexiEventDetails::DueDate { .. } => FlexiEventKind::DueDate,
            FlexiEventDetails::SmartLogicTrigger { .. } => FlexiEventKind::SmartLogicTrigger,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexiEvent {
    /// Insertion order; breaks ties between events on the same date.
    pub sequence: u32,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub details: FlexiEventDetails,
}

impl FlexiEvent {
    pub fn kind(&self) -> FlexiEventKind {
        self.details.kind()
    }
}

/// Append-only event log ordered by `(date, sequence)`.
///
/// Events can only be pushed to the end; existing entries are exposed
/// read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<FlexiEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, date: NaiveDate, details: FlexiEventDetails) -> &FlexiEvent {
        debug_assert!(
            self.events.last().map_or(true, |last| last.date <= date),
            "event dated {date} appended after a later event"
        );
        let sequence = self.events.len() as u32;
        self.events.push(FlexiEvent {
            sequence,
            date,
            details,
        });
        &self.events[self.events.len() - 1]
    }

    pub fn extend_at(&mut self, date: NaiveDate, details: impl IntoIterator<Item = FlexiEventDetails>) {
        for d in details {
            self.append(date, d);
        }
    }

    pub fn events(&self) -> &[FlexiEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlexiEvent> {
        self.events.iter()
    }

    pub fn into_vec(self) -> Vec<FlexiEvent> {
        self.events
    }
}
