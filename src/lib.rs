pub mod calendar;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod payments;
pub mod quote;
pub mod serialization;
pub mod summary;
pub mod types;

// re-export key types
pub use config::EngineConfig;
pub use decimal::{CentsAccumulator, Money, Rate};
pub use errors::{Result, ScheduleError};
pub use events::{Event, EventStore};
pub use payments::{
    apply_extra_payment, build_schedule, period_rate_from_annual, solve_level_payment,
    ExtraPaymentCalculator, ExtraPaymentOutcome, Schedule, ScheduleBuilder,
};
pub use quote::{Pricing, Quote, QuoteBuilder, QuoteRequest, WhatIf};
pub use serialization::{format_currency, format_percentage, QuoteView};
pub use summary::{summarize, ScheduleTotals, Summary};
pub use types::{
    DownPayment, ExtraPaymentEvent, PaymentRow, QuoteId, ReamortizationPolicy, ScheduleInput,
    ScheduleKind, TaxBase,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
