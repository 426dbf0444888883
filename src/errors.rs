use thiserror::Error;

use crate::decimal::{Money, Rate};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("invalid principal: {principal}")]
    InvalidPrincipal {
        principal: Money,
    },

    #[error("invalid total price: {total}")]
    InvalidTotalPrice {
        total: Money,
    },

    #[error("invalid period count: {periods}")]
    InvalidPeriodCount {
        periods: u32,
    },

    #[error("invalid interest rate: {rate}")]
    InvalidInterestRate {
        rate: Rate,
    },

    #[error("invalid tax rate: {rate}")]
    InvalidTaxRate {
        rate: Rate,
    },

    #[error("invalid down payment: {message}")]
    InvalidDownPayment {
        message: String,
    },

    #[error("extra payment target {period} outside 1..={period_count}")]
    ExtraPaymentTargetOutOfRange {
        period: u32,
        period_count: u32,
    },

    #[error("invalid extra payment amount: {amount}")]
    InvalidExtraPaymentAmount {
        amount: Money,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
