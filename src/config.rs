use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Rate;
use crate::errors::{Result, ScheduleError};
use crate::payments::{ExtraPaymentCalculator, ScheduleBuilder};
use crate::types::{ReamortizationPolicy, TaxBase};

/// engine configuration
///
/// every field has a default, so a JSON document only needs the overrides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// flat consumption tax applied per period
    pub tax_rate: Rate,
    /// days in one billing period
    pub days_per_period: u32,
    /// days in the rate year
    pub day_count_basis: u32,
    pub tax_base: TaxBase,
    pub reamortization_policy: ReamortizationPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tax_rate: Rate::from_decimal(dec!(0.16)),
            days_per_period: 30,
            day_count_basis: 360,
            tax_base: TaxBase::PrincipalAndInterest,
            reamortization_policy: ReamortizationPolicy::RecalculatePayment,
        }
    }
}

impl EngineConfig {
    /// parse a (possibly partial) JSON document over the defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| ScheduleError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn validate(&self) -> Result<()> {
        if self.tax_rate.is_negative() {
            return Err(ScheduleError::InvalidTaxRate {
                rate: self.tax_rate,
            });
        }
        if self.days_per_period == 0 {
            return Err(ScheduleError::InvalidConfiguration {
                message: "days_per_period must be positive".to_string(),
            });
        }
        if self.day_count_basis == 0 {
            return Err(ScheduleError::InvalidConfiguration {
                message: "day_count_basis must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn schedule_builder(&self) -> ScheduleBuilder {
        ScheduleBuilder::new(self.tax_base)
    }

    pub fn extra_payment_calculator(&self) -> ExtraPaymentCalculator {
        ExtraPaymentCalculator::new(self.reamortization_policy, self.tax_base)
    }
}
