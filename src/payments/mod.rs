pub mod amortization;
pub mod level_payment;
pub mod overpayment;

pub use amortization::{build_schedule, Schedule, ScheduleBuilder};
pub use level_payment::{period_rate_from_annual, solve_level_payment};
pub use overpayment::{apply_extra_payment, ExtraPaymentCalculator, ExtraPaymentOutcome};
