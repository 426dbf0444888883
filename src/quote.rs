use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{Result, ScheduleError};
use crate::events::{Event, EventStore};
use crate::payments::{period_rate_from_annual, ExtraPaymentOutcome, Schedule};
use crate::summary::{summarize, ScheduleTotals, Summary};
use crate::types::{DownPayment, ExtraPaymentEvent, QuoteId, ScheduleInput};

/// what the customer asked to finance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub customer: String,
    pub product: String,
    /// tax-inclusive price of the sale
    pub total_price: Money,
    pub down_payment: DownPayment,
    pub annual_rate: Rate,
    pub months: u32,
    /// defaults to today when missing
    pub first_payment_date: Option<NaiveDate>,
}

impl QuoteRequest {
    pub fn validate(&self) -> Result<()> {
        if !self.total_price.is_positive() {
            return Err(ScheduleError::InvalidTotalPrice {
                total: self.total_price,
            });
        }
        if self.months == 0 {
            return Err(ScheduleError::InvalidPeriodCount {
                periods: self.months,
            });
        }
        if self.annual_rate.is_negative() {
            return Err(ScheduleError::InvalidInterestRate {
                rate: self.annual_rate,
            });
        }
        match self.down_payment {
            DownPayment::Amount(amount) if amount.is_negative() => {
                Err(ScheduleError::InvalidDownPayment {
                    message: format!("amount {} is negative", amount),
                })
            }
            DownPayment::Percentage(pct) if pct.is_negative() => {
                Err(ScheduleError::InvalidDownPayment {
                    message: format!("percentage {} is negative", pct),
                })
            }
            _ => Ok(()),
        }
    }

    /// down payment in currency, capped at the total price
    pub fn down_payment_amount(&self) -> Money {
        let requested = match self.down_payment {
            DownPayment::Amount(amount) => amount,
            DownPayment::Percentage(pct) => self.total_price * pct,
        };
        requested.min(self.total_price).round_cents()
    }
}

/// price breakdown of a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    /// total price before tax
    pub subtotal: Money,
    /// tax included in the total price
    pub tax_total: Money,
    pub down_payment: Money,
    /// down payment as a share of the total price
    pub down_payment_ratio: Rate,
    /// amount financed, tax included
    pub financed_amount: Money,
    /// amount financed before tax; the schedule principal
    pub financed_principal: Money,
    pub period_rate: Rate,
}

impl Pricing {
    fn for_request(request: &QuoteRequest, config: &EngineConfig) -> Self {
        let total = request.total_price;
        let down_payment = request.down_payment_amount();
        let subtotal = total.exclusive_of(config.tax_rate).round_cents();
        let financed_amount = (total - down_payment).round_cents();

        Self {
            subtotal,
            tax_total: (total - subtotal).round_cents(),
            down_payment,
            down_payment_ratio: Rate::from_decimal(down_payment.as_decimal() / total.as_decimal()),
            financed_amount,
            financed_principal: financed_amount.exclusive_of(config.tax_rate).round_cents(),
            period_rate: period_rate_from_annual(
                request.annual_rate,
                config.days_per_period,
                config.day_count_basis,
            ),
        }
    }
}

/// extra payment currently layered on the base schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatIf {
    pub event: ExtraPaymentEvent,
    pub extra_principal: Money,
    pub previous_nominal_payment: Money,
    pub new_level_payment: Option<Money>,
    pub periods_saved: u32,
    pub paid_off_at_target: bool,
}

/// a financed sale quote
///
/// `base` is the original run; `active` is either `base` or the latest what-if
/// replayed against `base`
#[derive(Debug)]
pub struct Quote {
    pub id: QuoteId,
    pub request: QuoteRequest,
    pub config: EngineConfig,
    pub pricing: Pricing,
    pub base: Schedule,
    pub active: Schedule,
    pub what_if: Option<WhatIf>,
    pub events: EventStore,
}

impl Quote {
    pub fn builder() -> QuoteBuilder {
        QuoteBuilder::new()
    }

    /// price the request and build the base schedule
    pub fn calculate(
        request: QuoteRequest,
        config: EngineConfig,
        time_provider: &SafeTimeProvider,
    ) -> Result<Self> {
        config.validate()?;
        request.validate()?;

        let now = time_provider.now();
        let pricing = Pricing::for_request(&request, &config);
        let first_payment_date = request.first_payment_date.unwrap_or_else(|| now.date_naive());

        let input = ScheduleInput::new(
            pricing.financed_principal,
            pricing.period_rate,
            request.months,
            first_payment_date,
            config.tax_rate,
        )?;
        let base = config.schedule_builder().solve_and_build(&input)?;

        let id = Uuid::new_v4();
        info!(
            "quote {}: financing {} over {} months, nominal payment {}",
            id, pricing.financed_amount, request.months, base.nominal_payment
        );

        let mut events = EventStore::new();
        events.emit(Event::QuoteCalculated {
            quote_id: id,
            financed_amount: pricing.financed_amount,
            period_count: request.months,
            first_payment_date,
            nominal_payment: base.nominal_payment,
            total_payments: base.total_payments,
            timestamp: now,
        });

        Ok(Self {
            id,
            request,
            config,
            pricing,
            active: base.clone(),
            base,
            what_if: None,
            events,
        })
    }

    /// replay the base schedule with a tax-inclusive extra payment at `period`
    ///
    /// replaces any earlier what-if
    pub fn simulate_extra_payment(
        &mut self,
        period: u32,
        amount: Money,
        time_provider: &SafeTimeProvider,
    ) -> Result<&Schedule> {
        let event = ExtraPaymentEvent::new(period, amount)?;
        let ExtraPaymentOutcome {
            schedule,
            event,
            policy,
            extra_principal,
            previous_nominal_payment,
            new_level_payment,
            paid_off_at_target,
            periods_saved,
        } = self
            .config
            .extra_payment_calculator()
            .apply(&self.base.input, self.base.level_payment, event)?;

        let now = time_provider.now();
        self.events.emit(Event::ExtraPaymentSimulated {
            quote_id: self.id,
            period,
            amount,
            policy,
            old_nominal_payment: previous_nominal_payment,
            new_nominal_payment: schedule.nominal_payment,
            total_payments: schedule.total_payments,
            timestamp: now,
        });
        if paid_off_at_target {
            if let Some(last) = schedule.final_row() {
                self.events.emit(Event::EarlyPayoff {
                    quote_id: self.id,
                    period: last.period,
                    due_date: last.due_date,
                    timestamp: now,
                });
            }
        }

        self.what_if = Some(WhatIf {
            event,
            extra_principal,
            previous_nominal_payment,
            new_level_payment,
            periods_saved,
            paid_off_at_target,
        });
        self.active = schedule;
        Ok(&self.active)
    }

    /// drop the what-if and go back to the base schedule
    pub fn clear_extra_payment(&mut self, time_provider: &SafeTimeProvider) {
        if self.what_if.take().is_some() {
            self.active = self.base.clone();
            self.events.emit(Event::ExtraPaymentCleared {
                quote_id: self.id,
                timestamp: time_provider.now(),
            });
        }
    }

    pub fn is_what_if(&self) -> bool {
        self.what_if.is_some()
    }

    /// summary of the active schedule over the financed amount
    pub fn summary(&self) -> Summary {
        summarize(&self.active, self.pricing.financed_amount, self.config.tax_rate)
    }

    pub fn totals(&self) -> ScheduleTotals {
        self.active.totals()
    }
}

/// builder for quotes
#[derive(Debug, Default)]
pub struct QuoteBuilder {
    customer: Option<String>,
    product: Option<String>,
    total_price: Option<Money>,
    down_payment: Option<DownPayment>,
    annual_rate: Option<Rate>,
    months: Option<u32>,
    first_payment_date: Option<NaiveDate>,
    config: Option<EngineConfig>,
}

impl QuoteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customer(mut self, customer: impl Into<String>) -> Self {
        self.customer = Some(customer.into());
        self
    }

    pub fn product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    pub fn total_price(mut self, total: Money) -> Self {
        self.total_price = Some(total);
        self
    }

    /// a positive amount wins over a percentage set earlier or later
    pub fn down_payment_amount(mut self, amount: Money) -> Self {
        if amount.is_positive() || !matches!(self.down_payment, Some(DownPayment::Percentage(_))) {
            self.down_payment = Some(DownPayment::Amount(amount));
        }
        self
    }

    pub fn down_payment_percentage(mut self, pct: Rate) -> Self {
        match self.down_payment {
            Some(DownPayment::Amount(amount)) if amount.is_positive() => {}
            _ => self.down_payment = Some(DownPayment::Percentage(pct)),
        }
        self
    }

    pub fn annual_rate(mut self, rate: Rate) -> Self {
        self.annual_rate = Some(rate);
        self
    }

    pub fn months(mut self, months: u32) -> Self {
        self.months = Some(months);
        self
    }

    pub fn first_payment_date(mut self, date: NaiveDate) -> Self {
        self.first_payment_date = Some(date);
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn request(&self) -> Result<QuoteRequest> {
        let total_price = self.total_price.ok_or(ScheduleError::InvalidConfiguration {
            message: "Total price required".to_string(),
        })?;

        let months = self.months.ok_or(ScheduleError::InvalidConfiguration {
            message: "Months required".to_string(),
        })?;

        Ok(QuoteRequest {
            customer: self.customer.clone().unwrap_or_default(),
            product: self.product.clone().unwrap_or_default(),
            total_price,
            down_payment: self.down_payment.unwrap_or_default(),
            annual_rate: self.annual_rate.unwrap_or(Rate::ZERO),
            months,
            first_payment_date: self.first_payment_date,
        })
    }

    pub fn build(self, time_provider: &SafeTimeProvider) -> Result<Quote> {
        let request = self.request()?;
        Quote::calculate(request, self.config.unwrap_or_default(), time_provider)
    }

    /// build against the system clock
    pub fn build_now(self) -> Result<Quote> {
        let time = SafeTimeProvider::new(hourglass_rs::TimeSource::System);
        self.build(&time)
    }
}
