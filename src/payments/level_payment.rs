use log::debug;
use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};

/// level payment that amortizes `present_value` over `periods` at `rate` per period
///
/// `pv · r / (1 − (1+r)^−n)`, or `pv / n` when the rate is zero. The result is
/// not rounded; callers round it to cents.
pub fn solve_level_payment(rate: Rate, periods: u32, present_value: Money) -> Money {
    if periods == 0 {
        return Money::ZERO;
    }

    let r = rate.as_decimal();
    if r.is_zero() {
        return present_value / Decimal::from(periods);
    }

    // (1 + r)^n by repeated multiplication, then pv · r / (1 − 1/c) so no
    // intermediate grows past pv · r
    let base = Decimal::ONE + r;
    let mut compound = Decimal::ONE;
    for _ in 0..periods {
        match compound.checked_mul(base) {
            Some(next) => compound = next,
            None => {
                // (1+r)^-n is below Decimal precision, the annuity factor is 1
                debug!("compound factor overflowed at rate {} over {} periods", rate, periods);
                return present_value * r;
            }
        }
    }

    let annuity_factor = Decimal::ONE - Decimal::ONE / compound;
    let payment = match (present_value.as_decimal() * r).checked_div(annuity_factor) {
        Some(payment) => payment,
        None => {
            // 1/c rounds to one for rates below Decimal precision
            debug!("annuity factor vanished at rate {} over {} periods", rate, periods);
            return present_value / Decimal::from(periods);
        }
    };
    debug!(
        "level payment {} for pv {} at {} over {} periods",
        payment, present_value, rate, periods
    );
    Money::from_decimal(payment)
}

/// per-period rate from an annual rate on a day-count basis
///
/// `annual · days_per_period / basis`, so 12% on 30/360 gives exactly 0.01
pub fn period_rate_from_annual(annual_rate: Rate, days_per_period: u32, day_count_basis: u32) -> Rate {
    if day_count_basis == 0 {
        return Rate::ZERO;
    }
    Rate::from_decimal(
        annual_rate.as_decimal() * Decimal::from(days_per_period) / Decimal::from(day_count_basis),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::ScheduleBuilder;
    use crate::types::ScheduleInput;
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_level_payment_twelve_months() {
        let payment = solve_level_payment(
            Rate::from_decimal(dec!(0.01)),
            12,
            Money::from_decimal(dec!(86206.90)),
        );

        assert_eq!(payment.round_cents(), Money::from_decimal(dec!(7659.38)));
        // unrounded result is kept for callers
        assert!(payment != payment.round_cents());
    }

    #[rstest]
    #[case(12, dec!(12000), dec!(1000))]
    #[case(7, dec!(1000), dec!(142.86))]
    #[case(1, dec!(555.55), dec!(555.55))]
    fn test_zero_rate_divides_evenly(#[case] periods: u32, #[case] pv: Decimal, #[case] expected: Decimal) {
        let payment = solve_level_payment(Rate::ZERO, periods, Money::from_decimal(pv));
        assert_eq!(payment, Money::from_decimal(pv) / Decimal::from(periods));
        assert_eq!(payment.round_cents(), Money::from_decimal(expected));
    }

    #[test]
    fn test_zero_periods_returns_zero() {
        let payment = solve_level_payment(Rate::from_percentage(1), 0, Money::from_major(1_000));
        assert_eq!(payment, Money::ZERO);
    }

    #[test]
    fn test_single_period_repays_principal_plus_interest() {
        let payment = solve_level_payment(Rate::from_percentage(1), 1, Money::from_major(1_000));
        assert_eq!(payment.round_cents(), Money::from_major(1_010));
    }

    #[test]
    fn test_huge_compound_degenerates_to_interest_only() {
        // (1 + 1)^400 does not fit in a Decimal
        let payment = solve_level_payment(Rate::ONE, 400, Money::from_major(1_000));
        assert_eq!(payment, Money::from_major(1_000));
    }

    #[test]
    fn test_large_compound_that_still_fits() {
        // 1.1^650 fits in a Decimal but pv · (1.1)^650 does not
        let payment = solve_level_payment(Rate::from_decimal(dec!(0.1)), 650, Money::from_major(100_000));
        assert_eq!(payment.round_cents(), Money::from_major(10_000));

        let input = ScheduleInput::new(
            Money::from_major(100_000),
            Rate::from_decimal(dec!(0.1)),
            650,
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            Rate::from_percentage(16),
        )
        .unwrap();
        let schedule = ScheduleBuilder::default().solve_and_build(&input).unwrap();

        assert_eq!(schedule.len(), 650);
        assert_eq!(schedule.level_payment, Money::from_major(10_000));
        assert_eq!(schedule.rows[0].principal, Money::ZERO);
        assert_eq!(schedule.final_row().unwrap().principal, Money::from_major(100_000));
        assert_eq!(schedule.final_row().unwrap().closing_balance, Money::ZERO);
    }

    #[test]
    fn test_period_rate_from_annual() {
        let rate = period_rate_from_annual(Rate::from_percentage(12), 30, 360);
        assert_eq!(rate.as_decimal(), dec!(0.01));

        let rate = period_rate_from_annual(Rate::from_percentage(18), 30, 360);
        assert_eq!(rate.as_decimal(), dec!(0.015));
    }
}
