use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{QuoteId, ReamortizationPolicy};

/// events emitted while working a quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    QuoteCalculated {
        quote_id: QuoteId,
        financed_amount: Money,
        period_count: u32,
        first_payment_date: NaiveDate,
        nominal_payment: Money,
        total_payments: Money,
        timestamp: DateTime<Utc>,
    },
    ExtraPaymentSimulated {
        quote_id: QuoteId,
        period: u32,
        amount: Money,
        policy: ReamortizationPolicy,
        old_nominal_payment: Money,
        new_nominal_payment: Money,
        total_payments: Money,
        timestamp: DateTime<Utc>,
    },
    /// extra payment covered the whole outstanding balance
    EarlyPayoff {
        quote_id: QuoteId,
        period: u32,
        due_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    ExtraPaymentCleared {
        quote_id: QuoteId,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
