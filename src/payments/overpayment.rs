use log::info;
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::decimal::{CentsAccumulator, Money};
use crate::errors::Result;
use crate::types::{ExtraPaymentEvent, PaymentRow, ReamortizationPolicy, ScheduleInput, ScheduleKind, TaxBase};

use super::amortization::{PeriodMath, Schedule};
use super::level_payment::solve_level_payment;

/// result of replaying a base schedule with one extra principal payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraPaymentOutcome {
    pub schedule: Schedule,
    pub event: ExtraPaymentEvent,
    pub policy: ReamortizationPolicy,
    /// tax-exclusive part of the extra payment that went to principal
    pub extra_principal: Money,
    /// nominal payment of the base schedule
    pub previous_nominal_payment: Money,
    /// level payment solved for the remaining periods, when one was solved
    pub new_level_payment: Option<Money>,
    /// balance hit zero at or before the target period
    pub paid_off_at_target: bool,
    pub periods_saved: u32,
}

/// extra payment calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtraPaymentCalculator {
    policy: ReamortizationPolicy,
    tax_base: TaxBase,
}

impl ExtraPaymentCalculator {
    pub fn new(policy: ReamortizationPolicy, tax_base: TaxBase) -> Self {
        Self { policy, tax_base }
    }

    pub fn policy(&self) -> ReamortizationPolicy {
        self.policy
    }

    /// replay the base run through the target period with the extra payment
    /// applied, then continue according to the policy
    ///
    /// always starts from the base input and its level payment, never from a
    /// previous what-if
    pub fn apply(
        &self,
        base_input: &ScheduleInput,
        base_level_payment: Money,
        event: ExtraPaymentEvent,
    ) -> Result<ExtraPaymentOutcome> {
        let period_count = base_input.period_count;
        event.validate_against(period_count)?;

        let math = PeriodMath::new(base_input.period_rate, base_input.tax_rate, self.tax_base);
        let extra_principal = event.amount.exclusive_of(base_input.tax_rate).round_cents();
        let previous_nominal_payment = math
            .amortize(base_input.principal, base_level_payment, Money::ZERO, false, period_count == 1)
            .total_payment;

        let mut replay = Replay::new(base_input, math);

        for period in 1..=event.period {
            let (extra, marker) = if period == event.period {
                (extra_principal, event.amount)
            } else {
                (Money::ZERO, Money::ZERO)
            };
            replay.push(period, base_level_payment, extra, marker)?;
            if replay.is_settled() {
                break;
            }
        }

        let remaining_periods = period_count - event.period;
        let paid_off_at_target = replay.is_settled();

        if paid_off_at_target || remaining_periods == 0 {
            info!(
                "extra payment {} at period {} settles the balance after {} rows",
                event.amount,
                event.period,
                replay.rows.len()
            );
            let schedule = replay.finish(base_level_payment, previous_nominal_payment);
            let periods_saved = period_count - schedule.len() as u32;
            return Ok(ExtraPaymentOutcome {
                schedule,
                event,
                policy: self.policy,
                extra_principal,
                previous_nominal_payment,
                new_level_payment: None,
                paid_off_at_target,
                periods_saved,
            });
        }

        let (level_payment, new_level_payment) = match self.policy {
            ReamortizationPolicy::RecalculatePayment => {
                let solved =
                    solve_level_payment(base_input.period_rate, remaining_periods, replay.balance)
                        .round_cents();
                (solved, Some(solved))
            }
            ReamortizationPolicy::ShortenTerm => (base_level_payment, None),
        };

        for period in (event.period + 1)..=period_count {
            replay.push(period, level_payment, Money::ZERO, Money::ZERO)?;
            if replay.is_settled() {
                break;
            }
        }

        // first payment under the continuation is what the customer pays from now on
        let nominal_payment = replay
            .rows
            .get(event.period as usize)
            .map(|row| row.total_payment)
            .unwrap_or(previous_nominal_payment);

        info!(
            "extra payment {} at period {} ({:?}): nominal payment {} -> {}",
            event.amount, event.period, self.policy, previous_nominal_payment, nominal_payment
        );

        let schedule = replay.finish(level_payment, nominal_payment);
        let periods_saved = period_count - schedule.len() as u32;

        Ok(ExtraPaymentOutcome {
            schedule,
            event,
            policy: self.policy,
            extra_principal,
            previous_nominal_payment,
            new_level_payment,
            paid_off_at_target,
            periods_saved,
        })
    }
}

/// apply an extra payment keeping the term and recalculating the payment
pub fn apply_extra_payment(
    base_input: &ScheduleInput,
    base_level_payment: Money,
    target_period: u32,
    extra_amount: Money,
) -> Result<Schedule> {
    let event = ExtraPaymentEvent::new(target_period, extra_amount)?;
    ExtraPaymentCalculator::default()
        .apply(base_input, base_level_payment, event)
        .map(|outcome| outcome.schedule)
}

/// rows emitted so far while replaying a base run
struct Replay<'a> {
    input: &'a ScheduleInput,
    math: PeriodMath,
    rows: Vec<PaymentRow>,
    total: CentsAccumulator,
    balance: Money,
}

impl<'a> Replay<'a> {
    fn new(input: &'a ScheduleInput, math: PeriodMath) -> Self {
        Self {
            input,
            math,
            rows: Vec::with_capacity(input.period_count as usize),
            total: CentsAccumulator::new(),
            balance: input.principal,
        }
    }

    fn push(&mut self, period: u32, level_payment: Money, extra_principal: Money, marker: Money) -> Result<()> {
        let due_date = calendar::due_date_for_period(self.input.first_payment_date, period)?;
        let amounts = self.math.amortize(
            self.balance,
            level_payment,
            extra_principal,
            true,
            period == self.input.period_count,
        );
        let row = amounts.into_row(period, due_date, self.balance, marker);

        self.total.add(row.total_payment);
        self.balance = row.closing_balance;
        self.rows.push(row);
        Ok(())
    }

    fn is_settled(&self) -> bool {
        !self.balance.is_positive()
    }

    fn finish(self, level_payment: Money, nominal_payment: Money) -> Schedule {
        Schedule {
            kind: ScheduleKind::WhatIf,
            input: self.input.clone(),
            level_payment,
            rows: self.rows,
            total_payments: self.total.total(),
            nominal_payment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::errors::ScheduleError;
    use crate::payments::ScheduleBuilder;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use test_log::test;

    fn base() -> Schedule {
        let input = ScheduleInput::new(
            Money::from_decimal(dec!(86206.90)),
            Rate::from_decimal(dec!(0.01)),
            12,
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            Rate::from_percentage(16),
        )
        .unwrap();
        ScheduleBuilder::default().solve_and_build(&input).unwrap()
    }

    fn assert_row_invariants(schedule: &Schedule) {
        for row in &schedule.rows {
            assert_eq!(row.total_payment, row.principal + row.interest + row.tax);
            assert!(!row.closing_balance.is_negative());
        }
        for pair in schedule.rows.windows(2) {
            assert_eq!(pair[0].closing_balance, pair[1].opening_balance);
        }
        assert_eq!(schedule.final_row().unwrap().closing_balance, Money::ZERO);
    }

    #[test]
    fn test_recalculate_payment_at_period_six() {
        let base = base();
        let event = ExtraPaymentEvent::new(6, Money::from_major(10_000)).unwrap();

        let outcome = ExtraPaymentCalculator::default()
            .apply(&base.input, base.level_payment, event)
            .unwrap();
        let schedule = &outcome.schedule;

        assert_eq!(outcome.extra_principal, Money::from_decimal(dec!(8620.69)));
        assert_eq!(schedule.kind, ScheduleKind::WhatIf);
        assert_eq!(schedule.len(), 12);

        // untouched before the target
        assert_eq!(&schedule.rows[..5], &base.rows[..5]);

        let target = &schedule.rows[5];
        assert_eq!(target.principal, base.rows[5].principal + outcome.extra_principal);
        assert_eq!(target.principal, Money::from_decimal(dec!(15764.73)));
        assert_eq!(target.closing_balance, Money::from_decimal(dec!(35769.05)));
        assert_eq!(target.extra_payment, Money::from_major(10_000));
        assert_eq!(schedule.rows[6].extra_payment, Money::ZERO);

        assert_eq!(outcome.new_level_payment, Some(Money::from_decimal(dec!(6171.89))));
        assert_eq!(schedule.level_payment, Money::from_decimal(dec!(6171.89)));
        assert_eq!(schedule.nominal_payment, Money::from_decimal(dec!(7159.39)));
        assert_eq!(outcome.previous_nominal_payment, Money::from_decimal(dec!(8884.88)));
        assert_eq!(schedule.total_payments, Money::from_decimal(dec!(106265.63)));
        assert_eq!(outcome.periods_saved, 0);
        assert!(!outcome.paid_off_at_target);
        assert_row_invariants(schedule);
    }

    #[test]
    fn test_extra_payment_over_balance_pays_off() {
        let base = base();
        let event = ExtraPaymentEvent::new(6, Money::from_major(60_000)).unwrap();

        let outcome = ExtraPaymentCalculator::default()
            .apply(&base.input, base.level_payment, event)
            .unwrap();
        let schedule = &outcome.schedule;

        assert_eq!(schedule.len(), 6);
        let last = schedule.final_row().unwrap();
        assert_eq!(last.principal, last.opening_balance);
        assert_eq!(last.principal, Money::from_decimal(dec!(51533.78)));
        assert_eq!(last.closing_balance, Money::ZERO);

        assert!(outcome.paid_off_at_target);
        assert_eq!(outcome.new_level_payment, None);
        assert_eq!(outcome.periods_saved, 6);
        assert_eq!(schedule.nominal_payment, base.nominal_payment);
        assert_eq!(schedule.total_payments, Money::from_decimal(dec!(104801.38)));
        assert_row_invariants(schedule);
    }

    #[test]
    fn test_payoff_at_every_period() {
        let base = base();

        for period in 1..=12 {
            let schedule = apply_extra_payment(
                &base.input,
                base.level_payment,
                period,
                Money::from_major(200_000),
            )
            .unwrap();

            assert_eq!(schedule.len(), period as usize);
            assert_row_invariants(&schedule);
        }
    }

    #[test]
    fn test_extra_payment_on_final_period() {
        let base = base();
        let event = ExtraPaymentEvent::new(12, Money::from_major(1_000)).unwrap();

        let outcome = ExtraPaymentCalculator::default()
            .apply(&base.input, base.level_payment, event)
            .unwrap();

        // nothing left to re-amortize; the last row just closes the loan
        assert_eq!(outcome.schedule.len(), 12);
        assert_eq!(outcome.new_level_payment, None);
        assert_eq!(outcome.schedule.nominal_payment, base.nominal_payment);
        assert_row_invariants(&outcome.schedule);
    }

    #[test]
    fn test_extra_payment_on_first_period() {
        let base = base();
        let schedule =
            apply_extra_payment(&base.input, base.level_payment, 1, Money::from_major(1_160)).unwrap();

        assert_eq!(schedule.rows[0].principal, base.rows[0].principal + Money::from_major(1_000));
        assert!(schedule.nominal_payment < base.nominal_payment);
        assert_eq!(schedule.nominal_payment, schedule.rows[1].total_payment);
        assert_row_invariants(&schedule);
    }

    #[test]
    fn test_replays_from_base_every_time() {
        let base = base();
        let first = apply_extra_payment(&base.input, base.level_payment, 6, Money::from_major(10_000)).unwrap();
        let second = apply_extra_payment(&base.input, base.level_payment, 6, Money::from_major(10_000)).unwrap();

        assert_eq!(first, second);
        assert_eq!(base.len(), 12);
        assert_eq!(base.kind, ScheduleKind::Base);
    }

    #[test]
    fn test_shorten_term_policy() {
        let base = base();
        let event = ExtraPaymentEvent::new(6, Money::from_major(10_000)).unwrap();

        let outcome = ExtraPaymentCalculator::new(ReamortizationPolicy::ShortenTerm, TaxBase::default())
            .apply(&base.input, base.level_payment, event)
            .unwrap();
        let schedule = &outcome.schedule;

        assert_eq!(schedule.len(), 11);
        assert_eq!(outcome.periods_saved, 1);
        assert_eq!(outcome.new_level_payment, None);
        assert_eq!(schedule.level_payment, base.level_payment);
        assert_eq!(schedule.nominal_payment, Money::from_decimal(dec!(8884.88)));

        let last = schedule.final_row().unwrap();
        assert_eq!(last.principal, Money::from_decimal(dec!(6121.26)));
        assert_eq!(last.total_payment, Money::from_decimal(dec!(7171.67)));
        assert_eq!(schedule.total_payments, Money::from_decimal(dec!(106020.47)));
        assert_row_invariants(schedule);
    }

    #[test]
    fn test_interest_only_tax_on_what_if() {
        let base = base();
        let event = ExtraPaymentEvent::new(6, Money::from_major(10_000)).unwrap();

        let outcome = ExtraPaymentCalculator::new(ReamortizationPolicy::RecalculatePayment, TaxBase::InterestOnly)
            .apply(&base.input, base.level_payment, event)
            .unwrap();
        let schedule = &outcome.schedule;

        // principal path matches the default tax base, only tax moves
        assert_eq!(schedule.rows[5].principal, Money::from_decimal(dec!(15764.73)));
        assert_eq!(schedule.rows[5].closing_balance, Money::from_decimal(dec!(35769.05)));
        assert_eq!(outcome.new_level_payment, Some(Money::from_decimal(dec!(6171.89))));

        for row in &schedule.rows {
            assert_eq!(row.tax, (row.interest * Rate::from_percentage(16)).round_cents());
        }
        assert_eq!(schedule.rows[5].tax, Money::from_decimal(dec!(82.45)));
        assert_eq!(schedule.rows[5].total_payment, Money::from_decimal(dec!(16362.52)));
        assert_eq!(outcome.previous_nominal_payment, Money::from_decimal(dec!(7797.31)));
        assert_eq!(schedule.nominal_payment, Money::from_decimal(dec!(6229.12)));
        assert_eq!(schedule.total_payments, Money::from_decimal(dec!(92472.55)));
        assert_row_invariants(schedule);
    }

    #[test]
    fn test_out_of_range_target_is_rejected() {
        let base = base();

        let result = apply_extra_payment(&base.input, base.level_payment, 13, Money::from_major(100));
        assert_eq!(
            result,
            Err(ScheduleError::ExtraPaymentTargetOutOfRange {
                period: 13,
                period_count: 12,
            })
        );

        let result = apply_extra_payment(&base.input, base.level_payment, 0, Money::from_major(100));
        assert!(result.is_err());

        let result = apply_extra_payment(&base.input, base.level_payment, 3, Money::ZERO);
        assert!(matches!(result, Err(ScheduleError::InvalidExtraPaymentAmount { .. })));
    }
}
