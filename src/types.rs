use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar;
use crate::decimal::{Money, Rate};
use crate::errors::{Result, ScheduleError};

/// unique identifier for a quote
pub type QuoteId = Uuid;

/// inputs of one amortization run
///
/// `period_rate` is already scaled to the period length (0.01 for 12% on a
/// 30/360 month), `principal` excludes tax
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub principal: Money,
    pub period_rate: Rate,
    pub period_count: u32,
    pub first_payment_date: NaiveDate,
    pub tax_rate: Rate,
}

impl ScheduleInput {
    pub fn new(
        principal: Money,
        period_rate: Rate,
        period_count: u32,
        first_payment_date: NaiveDate,
        tax_rate: Rate,
    ) -> Result<Self> {
        let input = Self {
            principal,
            period_rate,
            period_count,
            first_payment_date,
            tax_rate,
        };
        input.validate()?;
        Ok(input)
    }

    pub fn validate(&self) -> Result<()> {
        if self.principal.is_negative() {
            return Err(ScheduleError::InvalidPrincipal {
                principal: self.principal,
            });
        }
        if self.period_count == 0 {
            return Err(ScheduleError::InvalidPeriodCount {
                periods: self.period_count,
            });
        }
        if self.period_rate.is_negative() {
            return Err(ScheduleError::InvalidInterestRate {
                rate: self.period_rate,
            });
        }
        if self.tax_rate.is_negative() {
            return Err(ScheduleError::InvalidTaxRate {
                rate: self.tax_rate,
            });
        }
        Ok(())
    }
}

/// one period of a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRow {
    pub period: u32,
    pub due_date: NaiveDate,
    pub opening_balance: Money,
    pub principal: Money,
    pub interest: Money,
    pub tax: Money,
    pub total_payment: Money,
    pub closing_balance: Money,
    /// tax-inclusive extra payment applied on this row, zero elsewhere
    pub extra_payment: Money,
}

impl PaymentRow {
    pub fn due_instant(&self) -> DateTime<Utc> {
        calendar::at_midday(self.due_date)
    }
}

/// lump principal reduction applied at a period of the base schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraPaymentEvent {
    pub period: u32,
    /// tax-inclusive
    pub amount: Money,
}

impl ExtraPaymentEvent {
    pub fn new(period: u32, amount: Money) -> Result<Self> {
        if !amount.is_positive() {
            return Err(ScheduleError::InvalidExtraPaymentAmount { amount });
        }
        if period == 0 {
            return Err(ScheduleError::ExtraPaymentTargetOutOfRange {
                period,
                period_count: 0,
            });
        }
        Ok(Self { period, amount })
    }

    /// check the target against the base schedule length
    pub fn validate_against(&self, period_count: u32) -> Result<()> {
        if self.period == 0 || self.period > period_count {
            return Err(ScheduleError::ExtraPaymentTargetOutOfRange {
                period: self.period,
                period_count,
            });
        }
        if !self.amount.is_positive() {
            return Err(ScheduleError::InvalidExtraPaymentAmount {
                amount: self.amount,
            });
        }
        Ok(())
    }
}

/// what the per-period tax is levied on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TaxBase {
    /// tax on principal + interest
    #[default]
    PrincipalAndInterest,
    /// tax on interest only
    InterestOnly,
}

impl TaxBase {
    pub fn taxable(&self, principal: Money, interest: Money) -> Money {
        match self {
            TaxBase::PrincipalAndInterest => principal + interest,
            TaxBase::InterestOnly => interest,
        }
    }
}

/// effect of an extra principal payment on the rest of the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ReamortizationPolicy {
    /// keep the term, solve a lower level payment
    #[default]
    RecalculatePayment,
    /// keep the level payment, finish early
    ShortenTerm,
}

/// whether a schedule is the original run or a what-if over it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleKind {
    Base,
    WhatIf,
}

/// down payment on a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownPayment {
    /// tax-inclusive amount
    Amount(Money),
    /// fraction of the tax-inclusive total price
    Percentage(Rate),
}

impl Default for DownPayment {
    fn default() -> Self {
        DownPayment::Amount(Money::ZERO)
    }
}
