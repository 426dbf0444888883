/// engine functions - solve, build, re-amortize and summarize without a quote
use financed_sale_rs::chrono::NaiveDate;
use financed_sale_rs::{
    apply_extra_payment, build_schedule, period_rate_from_annual, solve_level_payment, summarize,
    Money, Rate, ScheduleInput,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let tax_rate = Rate::from_percentage(16);
    let principal = Money::from_major(100_000).exclusive_of(tax_rate).round_cents();
    let rate = period_rate_from_annual(Rate::from_percentage(12), 30, 360);

    let input = ScheduleInput::new(
        principal,
        rate,
        12,
        NaiveDate::from_ymd_opt(2024, 2, 1).ok_or("bad date")?,
        tax_rate,
    )?;

    let level_payment = solve_level_payment(rate, 12, principal).round_cents();
    let base = build_schedule(&input, level_payment)?;
    let what_if = apply_extra_payment(&input, level_payment, 6, Money::from_major(10_000))?;

    for (label, schedule) in [("base", &base), ("what-if", &what_if)] {
        let summary = summarize(schedule, Money::from_major(100_000), tax_rate);
        println!(
            "{}: {} rows, monthly payment {}, total {}",
            label,
            schedule.len(),
            summary.nominal_payment,
            summary.grand_total
        );
    }

    Ok(())
}
