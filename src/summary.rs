use serde::{Deserialize, Serialize};

use crate::decimal::{CentsAccumulator, Money, Rate};
use crate::payments::Schedule;
use crate::types::PaymentRow;

/// headline figures of a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// amount before tax
    pub subtotal: Money,
    pub tax_total: Money,
    /// subtotal + tax
    pub financed_amount: Money,
    pub nominal_payment: Money,
    pub grand_total: Money,
}

/// derive the summary of `schedule` for a tax-inclusive amount
pub fn summarize(schedule: &Schedule, tax_inclusive_amount: Money, tax_rate: Rate) -> Summary {
    let subtotal = tax_inclusive_amount.exclusive_of(tax_rate).round_cents();
    let tax_total = (tax_inclusive_amount - subtotal).round_cents();

    Summary {
        subtotal,
        tax_total,
        financed_amount: subtotal + tax_total,
        nominal_payment: schedule.nominal_payment,
        grand_total: schedule.total_payments,
    }
}

/// column totals, each summed in cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScheduleTotals {
    pub principal: Money,
    pub interest: Money,
    pub tax: Money,
    pub payments: Money,
}

impl ScheduleTotals {
    pub fn from_rows(rows: &[PaymentRow]) -> Self {
        let mut principal = CentsAccumulator::new();
        let mut interest = CentsAccumulator::new();
        let mut tax = CentsAccumulator::new();
        let mut payments = CentsAccumulator::new();

        for row in rows {
            principal.add(row.principal);
            interest.add(row.interest);
            tax.add(row.tax);
            payments.add(row.total_payment);
        }

        Self {
            principal: principal.total(),
            interest: interest.total(),
            tax: tax.total(),
            payments: payments.total(),
        }
    }
}
