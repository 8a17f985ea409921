use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};

/// longest repayment period the cooperative offers, in months
pub const MAX_PERIOD_MONTHS: u32 = 36;

/// how the application validator reports problems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// report every violated rule, in rule order
    #[default]
    CollectAll,
    /// stop at the first violated rule
    FailFast,
}

/// lending policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPolicy {
    /// flat interest charged per month on the full principal
    pub monthly_rate: Rate,
    pub minimum_principal: Money,
    pub maximum_principal: Money,
    /// repayment periods offered to members, in months
    pub offered_periods: Vec<u32>,
    #[serde(default)]
    pub validation_mode: ValidationMode,
}

impl LoanPolicy {
    /// policy observed at the cooperative: 1.5% per month, UGX 50,000 to 2,000,000
    pub fn cooperative() -> Self {
        Self {
            monthly_rate: Rate::from_bps(150),
            minimum_principal: Money::from_major(50_000),
            maximum_principal: Money::from_major(2_000_000),
            offered_periods: vec![3, 6, 9, 12, 18, 24, 36],
            validation_mode: ValidationMode::CollectAll,
        }
    }

    /// load and check a policy from json
    pub fn from_json(raw: &str) -> Result<Self> {
        let policy: LoanPolicy =
            serde_json::from_str(raw).map_err(|e| LoanError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| LoanError::InvalidConfiguration {
            message: e.to_string(),
        })
    }

    pub fn with_monthly_rate(mut self, rate: Rate) -> Self {
        self.monthly_rate = rate;
        self
    }

    pub fn with_validation_mode(mut self, mode: ValidationMode) -> Self {
        self.validation_mode = mode;
        self
    }

    pub fn offers_period(&self, months: u32) -> bool {
        self.offered_periods.contains(&months)
    }

    /// check internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.monthly_rate.is_negative() {
            return Err(LoanError::InvalidInterestRate {
                rate: self.monthly_rate,
            });
        }

        if !self.minimum_principal.is_positive() {
            return Err(LoanError::InvalidConfiguration {
                message: format!(
                    "minimum principal must be positive, got {}",
                    self.minimum_principal
                ),
            });
        }

        if self.minimum_principal > self.maximum_principal {
            return Err(LoanError::InvalidConfiguration {
                message: format!(
                    "minimum principal {} exceeds maximum {}",
                    self.minimum_principal, self.maximum_principal
                ),
            });
        }

        if self.offered_periods.is_empty() {
            return Err(LoanError::InvalidConfiguration {
                message: "at least one repayment period must be offered".to_string(),
            });
        }

        if let Some(bad) = self
            .offered_periods
            .iter()
            .find(|m| **m == 0 || **m > MAX_PERIOD_MONTHS)
        {
            return Err(LoanError::InvalidConfiguration {
                message: format!("offered period {bad} outside 1..={MAX_PERIOD_MONTHS} months"),
            });
        }

        Ok(())
    }
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self::cooperative()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cooperative_policy_is_valid() {
        let policy = LoanPolicy::cooperative();
        assert!(policy.validate().is_ok());
        assert_eq!(policy.monthly_rate.as_decimal(), dec!(0.015));
        assert!(policy.offers_period(6));
        assert!(!policy.offers_period(7));
    }

    #[test]
    fn test_policy_json_roundtrip() {
        let policy = LoanPolicy::cooperative().with_validation_mode(ValidationMode::FailFast);
        let raw = policy.to_json_pretty().unwrap();
        let loaded = LoanPolicy::from_json(&raw).unwrap();
        assert_eq!(loaded, policy);
    }

    #[test]
    fn test_validation_mode_defaults_when_absent() {
        let raw = r#"{
            "monthly_rate": "0.02",
            "minimum_principal": "100000",
            "maximum_principal": "500000",
            "offered_periods": [6, 12]
        }"#;
        let policy = LoanPolicy::from_json(raw).unwrap();
        assert_eq!(policy.validation_mode, ValidationMode::CollectAll);
        assert_eq!(policy.monthly_rate, Rate::from_percentage(2));
    }

    #[test]
    fn test_rejects_negative_rate() {
        let policy = LoanPolicy::cooperative().with_monthly_rate(Rate::from_decimal(dec!(-0.01)));
        assert!(matches!(
            policy.validate(),
            Err(LoanError::InvalidInterestRate { .. })
        ));
    }

    #[test]
    fn test_rejects_inverted_bounds_and_bad_periods() {
        let mut policy = LoanPolicy::cooperative();
        policy.minimum_principal = Money::from_major(3_000_000);
        assert!(policy.validate().is_err());

        let mut policy = LoanPolicy::cooperative();
        policy.offered_periods = vec![6, 48];
        assert!(policy.validate().is_err());

        let mut policy = LoanPolicy::cooperative();
        policy.offered_periods.clear();
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_configuration_error() {
        assert!(matches!(
            LoanPolicy::from_json("{ not json"),
            Err(LoanError::InvalidConfiguration { .. })
        ));
    }
}
