/// quick start - quote a financed sale and print the share text
use financed_sale_rs::{Money, Quote, Rate};
use simple_logger::SimpleLogger;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()?;

    // $25,000 tax included, 10% down, 18% annual over 24 months
    let quote = Quote::builder()
        .customer("Ana Pérez")
        .product("Living room set")
        .total_price(Money::from_major(25_000))
        .down_payment_percentage(Rate::from_percentage(10))
        .annual_rate(Rate::from_percentage(18))
        .months(24)
        .build_now()?;

    println!("{}", quote.share_text());
    Ok(())
}
