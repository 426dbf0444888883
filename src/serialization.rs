/// serialization and plain-text views of a quote
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::quote::{Pricing, Quote, WhatIf};
use crate::summary::{ScheduleTotals, Summary};
use crate::types::{PaymentRow, QuoteId, ScheduleKind};

/// serializable view of a quote's active schedule
#[derive(Debug, Serialize, Deserialize)]
pub struct QuoteView {
    pub id: QuoteId,
    pub customer: String,
    pub product: String,
    pub mode: ScheduleKind,
    pub annual_rate: Rate,
    pub days_per_period: u32,
    pub day_count_basis: u32,
    pub pricing: Pricing,
    pub summary: Summary,
    pub totals: ScheduleTotals,
    pub extra_payment: Option<WhatIf>,
    pub rows: Vec<PaymentRow>,
}

impl QuoteView {
    pub fn from_quote(quote: &Quote) -> Self {
        QuoteView {
            id: quote.id,
            customer: quote.request.customer.clone(),
            product: quote.request.product.clone(),
            mode: quote.active.kind,
            annual_rate: quote.request.annual_rate,
            days_per_period: quote.config.days_per_period,
            day_count_basis: quote.config.day_count_basis,
            pricing: quote.pricing,
            summary: quote.summary(),
            totals: quote.totals(),
            extra_payment: quote.what_if,
            rows: quote.active.rows.clone(),
        }
    }
}

impl Quote {
    /// get quote as JSON string
    pub fn json(&self) -> String {
        serde_json::to_string_pretty(&QuoteView::from_quote(self)).unwrap_or_else(|_| "{}".to_string())
    }

    /// plain-text quote summary for sharing over chat or email
    pub fn share_text(&self) -> String {
        let summary = self.summary();
        let customer = if self.request.customer.is_empty() {
            "—"
        } else {
            self.request.customer.as_str()
        };

        let mut lines = vec!["QUOTE · FINANCED SALE".to_string()];
        if !self.request.product.is_empty() {
            lines.push(format!("Product: {}", self.request.product));
        }
        lines.push(format!("Customer: {}", customer));
        lines.push(format!("Down payment: {}", format_currency(self.pricing.down_payment)));
        lines.push(format!(
            "Amount financed (tax incl.): {}",
            format_currency(self.pricing.financed_amount)
        ));
        lines.push(format!("Term: {} months", self.active.len()));
        lines.push(format!(
            "Annual rate: {} · Days/period: {} (basis {})",
            format_percentage(self.request.annual_rate),
            self.config.days_per_period,
            self.config.day_count_basis
        ));
        lines.push(format!("Monthly payment approx.: {}", format_currency(summary.nominal_payment)));
        lines.push(format!("Total (sum of payments): {}", format_currency(summary.grand_total)));

        if let Some(what_if) = &self.what_if {
            lines.push(format!(
                "Extra payment: payment #{} +{} (tax incl.)",
                what_if.event.period,
                format_currency(what_if.event.amount)
            ));
            lines.push(format!("New monthly payment: {}", format_currency(summary.nominal_payment)));
        }

        lines.join("\n")
    }
}

/// `$1,234.56`, rounded half-up to cents
pub fn format_currency(amount: Money) -> String {
    let cents = amount.to_cents();
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// rate as a percentage with two decimals, e.g. `16.00%`
pub fn format_percentage(rate: Rate) -> String {
    format!("{:.2}%", rate.as_percentage())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use hourglass_rs::{SafeTimeProvider, TimeSource};
    use rust_decimal_macros::dec;

    fn quote(time: &SafeTimeProvider) -> Quote {
        Quote::builder()
            .customer("Ana Pérez")
            .product("Refrigerator")
            .total_price(Money::from_major(100_000))
            .annual_rate(Rate::from_percentage(12))
            .months(12)
            .first_payment_date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
            .build(time)
            .unwrap()
    }

    fn time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()))
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(Money::from_major(100_000)), "$100,000.00");
        assert_eq!(format_currency(Money::from_decimal(dec!(8884.875))), "$8,884.88");
        assert_eq!(format_currency(Money::from_decimal(dec!(0.5))), "$0.50");
        assert_eq!(format_currency(Money::from_decimal(dec!(-1234567.1))), "-$1,234,567.10");
        assert_eq!(format_currency(Money::from_major(999)), "$999.00");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(Rate::from_percentage(16)), "16.00%");
        assert_eq!(format_percentage(Rate::from_bps(1250)), "12.50%");
    }

    #[test]
    fn test_share_text_base() {
        let time = time();
        let quote = quote(&time);
        let text = quote.share_text();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "QUOTE · FINANCED SALE");
        assert_eq!(lines[1], "Product: Refrigerator");
        assert_eq!(lines[2], "Customer: Ana Pérez");
        assert_eq!(lines[3], "Down payment: $0.00");
        assert_eq!(lines[4], "Amount financed (tax incl.): $100,000.00");
        assert_eq!(lines[5], "Term: 12 months");
        assert_eq!(lines[6], "Annual rate: 12.00% · Days/period: 30 (basis 360)");
        assert_eq!(lines[7], "Monthly payment approx.: $8,884.88");
        assert_eq!(lines[8], "Total (sum of payments): $106,618.55");
        assert_eq!(lines.len(), 9);
    }

    #[test]
    fn test_share_text_with_extra_payment() {
        let time = time();
        let mut quote = quote(&time);
        quote.simulate_extra_payment(6, Money::from_major(10_000), &time).unwrap();

        let text = quote.share_text();
        assert!(text.contains("Extra payment: payment #6 +$10,000.00 (tax incl.)"));
        assert!(text.ends_with("New monthly payment: $7,159.39"));
        assert!(text.contains("Total (sum of payments): $106,265.63"));
        assert_eq!(text.lines().count(), 11);

        quote.clear_extra_payment(&time);
        assert!(!quote.share_text().contains("Extra payment"));
    }

    #[test]
    fn test_json_view() {
        let time = time();
        let quote = quote(&time);

        let value: serde_json::Value = serde_json::from_str(&quote.json()).unwrap();
        assert_eq!(value["rows"].as_array().unwrap().len(), 12);
        assert_eq!(value["mode"], "Base");
        assert_eq!(value["summary"]["grand_total"], "106618.55");
        assert_eq!(value["rows"][0]["due_date"], "2024-02-01");
        assert!(value["extra_payment"].is_null());

        let view: QuoteView = serde_json::from_str(&quote.json()).unwrap();
        assert_eq!(view.id, quote.id);
        assert_eq!(view.rows, quote.active.rows);
    }
}
