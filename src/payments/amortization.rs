use chrono::NaiveDate;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::decimal::{CentsAccumulator, Money, Rate};
use crate::errors::Result;
use crate::summary::ScheduleTotals;
use crate::types::{PaymentRow, ScheduleInput, ScheduleKind, TaxBase};

use super::level_payment::solve_level_payment;

/// amortization schedule
///
/// immutable once built; a what-if produces a new schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub kind: ScheduleKind,
    pub input: ScheduleInput,
    /// tax-exclusive level payment the rows were built from
    pub level_payment: Money,
    pub rows: Vec<PaymentRow>,
    /// exact sum of every row's total payment
    pub total_payments: Money,
    /// payment surfaced to the customer as "the monthly payment"
    pub nominal_payment: Money,
}

impl Schedule {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// get row for a 1-based period
    pub fn get_row(&self, period: u32) -> Option<&PaymentRow> {
        let index = period.checked_sub(1)? as usize;
        self.rows.get(index)
    }

    pub fn final_row(&self) -> Option<&PaymentRow> {
        self.rows.last()
    }

    /// balance outstanding after a 1-based period, principal before period 1
    pub fn balance_after(&self, period: u32) -> Money {
        if period == 0 {
            return self.input.principal;
        }
        self.get_row(period)
            .or_else(|| self.final_row())
            .map(|row| row.closing_balance)
            .unwrap_or(self.input.principal)
    }

    /// last row closes at exactly zero
    pub fn is_fully_amortized(&self) -> bool {
        self.final_row()
            .map(|row| row.closing_balance.is_zero())
            .unwrap_or(self.input.principal.is_zero())
    }

    /// exact column totals
    pub fn totals(&self) -> ScheduleTotals {
        ScheduleTotals::from_rows(&self.rows)
    }
}

/// schedule builder
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleBuilder {
    tax_base: TaxBase,
}

impl ScheduleBuilder {
    pub fn new(tax_base: TaxBase) -> Self {
        Self { tax_base }
    }

    pub fn tax_base(&self) -> TaxBase {
        self.tax_base
    }

    /// solve the level payment for `input`, round it to cents, and build
    pub fn solve_and_build(&self, input: &ScheduleInput) -> Result<Schedule> {
        let level_payment =
            solve_level_payment(input.period_rate, input.period_count, input.principal).round_cents();
        self.build(input, level_payment)
    }

    /// build one row per period from an already solved tax-exclusive level payment
    pub fn build(&self, input: &ScheduleInput, level_payment: Money) -> Result<Schedule> {
        let math = PeriodMath::new(input.period_rate, input.tax_rate, self.tax_base);

        let mut rows = Vec::with_capacity(input.period_count as usize);
        let mut total = CentsAccumulator::new();
        let mut balance = input.principal;

        for period in 1..=input.period_count {
            let due_date = calendar::due_date_for_period(input.first_payment_date, period)?;
            let amounts = math.amortize(
                balance,
                level_payment,
                Money::ZERO,
                false,
                period == input.period_count,
            );

            let row = amounts.into_row(period, due_date, balance, Money::ZERO);
            trace!(
                "period {} due {}: principal {}, interest {}, tax {}, closing {}",
                row.period, row.due_date, row.principal, row.interest, row.tax, row.closing_balance
            );

            total.add(row.total_payment);
            balance = row.closing_balance;
            rows.push(row);
        }

        let nominal_payment = rows.first().map(|row| row.total_payment).unwrap_or(Money::ZERO);
        debug!(
            "built {} rows from level payment {}, total of payments {}",
            rows.len(),
            level_payment,
            total.total()
        );

        Ok(Schedule {
            kind: ScheduleKind::Base,
            input: input.clone(),
            level_payment,
            rows,
            total_payments: total.total(),
            nominal_payment,
        })
    }
}

/// build a schedule with tax on principal + interest
pub fn build_schedule(input: &ScheduleInput, level_payment: Money) -> Result<Schedule> {
    ScheduleBuilder::default().build(input, level_payment)
}

/// rounded amounts of one period before dating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PeriodAmounts {
    pub principal: Money,
    pub interest: Money,
    pub tax: Money,
    pub total_payment: Money,
    pub closing_balance: Money,
}

impl PeriodAmounts {
    pub(crate) fn into_row(
        self,
        period: u32,
        due_date: NaiveDate,
        opening_balance: Money,
        extra_payment: Money,
    ) -> PaymentRow {
        PaymentRow {
            period,
            due_date,
            opening_balance,
            principal: self.principal,
            interest: self.interest,
            tax: self.tax,
            total_payment: self.total_payment,
            closing_balance: self.closing_balance,
            extra_payment,
        }
    }
}

/// per-period arithmetic shared by the builder and the re-amortizer
#[derive(Debug, Clone, Copy)]
pub(crate) struct PeriodMath {
    rate: Rate,
    tax_rate: Rate,
    tax_base: TaxBase,
}

impl PeriodMath {
    pub(crate) fn new(rate: Rate, tax_rate: Rate, tax_base: TaxBase) -> Self {
        Self {
            rate,
            tax_rate,
            tax_base,
        }
    }

    /// split one payment into interest, principal and tax
    ///
    /// rounds to cents at each step; on the final period the closing balance is
    /// folded into principal so the schedule ends at exactly zero
    pub(crate) fn amortize(
        &self,
        opening_balance: Money,
        level_payment: Money,
        extra_principal: Money,
        clamp_to_balance: bool,
        is_final: bool,
    ) -> PeriodAmounts {
        let interest = (opening_balance * self.rate).round_cents();
        let mut principal = (level_payment - interest + extra_principal).round_cents();

        if clamp_to_balance && principal >= opening_balance {
            principal = opening_balance.round_cents();
        }

        let mut closing_balance = (opening_balance - principal).round_cents();

        if is_final && !closing_balance.is_zero() {
            principal = (principal + closing_balance).round_cents();
            closing_balance = Money::ZERO;
        }

        let tax = (self.tax_base.taxable(principal, interest) * self.tax_rate).round_cents();
        let total_payment = (principal + interest + tax).round_cents();

        PeriodAmounts {
            principal,
            interest,
            tax,
            total_payment,
            closing_balance,
        }
    }
}
