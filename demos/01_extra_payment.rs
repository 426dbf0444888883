/// what-if - extra principal payment on an existing quote
use financed_sale_rs::chrono::{NaiveDate, TimeZone, Utc};
use financed_sale_rs::{format_currency, Money, Quote, Rate, SafeTimeProvider, TimeSource};
use simple_logger::SimpleLogger;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()?;

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
    ));

    let mut quote = Quote::builder()
        .customer("Luis García")
        .total_price(Money::from_major(100_000))
        .annual_rate(Rate::from_percentage(12))
        .months(12)
        .first_payment_date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
        .build(&time)?;

    print_schedule("base", &quote);

    // 10,000 tax included on payment #6, keep the term
    quote.simulate_extra_payment(6, Money::from_major(10_000), &time)?;
    print_schedule("with extra payment", &quote);

    // a payment larger than the balance closes the loan at #6
    quote.simulate_extra_payment(6, Money::from_major(60_000), &time)?;
    print_schedule("payoff", &quote);

    quote.clear_extra_payment(&time);
    for event in quote.events.take_events() {
        println!("{:?}", event);
    }

    Ok(())
}

fn print_schedule(label: &str, quote: &Quote) {
    println!("== {}", label);
    println!(
        "{:>3} {:>10} {:>14} {:>12} {:>10} {:>10} {:>12} {:>14}",
        "#", "due", "opening", "principal", "interest", "tax", "payment", "closing"
    );
    for row in &quote.active.rows {
        println!(
            "{:>3} {:>10} {:>14} {:>12} {:>10} {:>10} {:>12} {:>14}",
            row.period,
            row.due_date,
            format_currency(row.opening_balance),
            format_currency(row.principal),
            format_currency(row.interest),
            format_currency(row.tax),
            format_currency(row.total_payment),
            format_currency(row.closing_balance),
        );
    }
    let totals = quote.totals();
    let summary = quote.summary();
    println!(
        "interest {} tax {} payments {} | monthly payment {}",
        format_currency(totals.interest),
        format_currency(totals.tax),
        format_currency(totals.payments),
        format_currency(summary.nominal_payment),
    );
}
