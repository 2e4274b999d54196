use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::types::InstallmentCount;

/// origination and repayment rules applied by the loan service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoanPolicy {
    /// smallest principal a loan may be originated with
    pub minimum_principal: Money,
    pub minimum_interest_rate: Rate,
    pub maximum_interest_rate: Rate,
    /// schedule lengths customers may pick from
    pub allowed_installments: Vec<InstallmentCount>,
    /// unpaid installments due within this many months of today are payable
    pub payment_window_months: u32,
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            minimum_principal: Money::from_major(100),
            minimum_interest_rate: Rate::from_decimal(dec!(0.1)),
            maximum_interest_rate: Rate::from_decimal(dec!(0.5)),
            allowed_installments: InstallmentCount::ALL.to_vec(),
            payment_window_months: 3,
        }
    }
}

impl LoanPolicy {
    /// load a policy from json, missing keys fall back to the defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let policy: LoanPolicy =
            serde_json::from_str(json).map_err(|e| LoanError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.minimum_principal.is_positive() {
            return Err(LoanError::InvalidConfiguration {
                message: "minimum_principal must be greater than 0".to_string(),
            });
        }

        if self.minimum_interest_rate.as_decimal().is_sign_negative()
            || self.minimum_interest_rate > self.maximum_interest_rate
        {
            return Err(LoanError::InvalidConfiguration {
                message: format!(
                    "interest rate bounds out of order: {} > {}",
                    self.minimum_interest_rate, self.maximum_interest_rate
                ),
            });
        }

        if self.allowed_installments.is_empty() {
            return Err(LoanError::InvalidConfiguration {
                message: "allowed_installments must not be empty".to_string(),
            });
        }

        Ok(())
    }

    pub fn allows_installments(&self, count: InstallmentCount) -> bool {
        self.allowed_installments.contains(&count)
    }

    pub fn allows_rate(&self, rate: Rate) -> bool {
        rate >= self.minimum_interest_rate && rate <= self.maximum_interest_rate
    }

    /// human readable list, e.g. "6, 9, 12, or 24"
    pub fn installments_description(&self) -> String {
        let mut counts: Vec<String> = self
            .allowed_installments
            .iter()
            .map(|c| c.to_string())
            .collect();

        match counts.len() {
            0 => String::new(),
            1 => counts.remove(0),
            2 => counts.join(" or "),
            _ => {
                let last = counts.pop().unwrap_or_default();
                format!("{}, or {}", counts.join(", "), last)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = LoanPolicy::default();
        assert!(policy.validate().is_ok());
        assert_eq!(policy.minimum_principal, Money::from_major(100));
        assert_eq!(policy.payment_window_months, 3);
        assert!(policy.allows_rate(Rate::from_decimal(dec!(0.1))));
        assert!(policy.allows_rate(Rate::from_decimal(dec!(0.5))));
        assert!(!policy.allows_rate(Rate::from_decimal(dec!(0.51))));
        assert_eq!(policy.installments_description(), "6, 9, 12, or 24");
    }

    #[test]
    fn test_installments_description_wording() {
        let policy = |counts: Vec<InstallmentCount>| LoanPolicy {
            allowed_installments: counts,
            ..LoanPolicy::default()
        };

        assert_eq!(policy(vec![InstallmentCount::Nine]).installments_description(), "9");
        assert_eq!(
            policy(vec![InstallmentCount::Six, InstallmentCount::Twelve]).installments_description(),
            "6 or 12"
        );
        assert_eq!(
            policy(vec![InstallmentCount::Six, InstallmentCount::Nine, InstallmentCount::Twelve])
                .installments_description(),
            "6, 9, or 12"
        );
    }

    #[test]
    fn test_from_json_partial_override() {
        let policy = LoanPolicy::from_json(
            r#"{ "payment_window_months": 6, "allowed_installments": [12, 24] }"#,
        )
        .unwrap();

        assert_eq!(policy.payment_window_months, 6);
        assert!(policy.allows_installments(InstallmentCount::Twelve));
        assert!(!policy.allows_installments(InstallmentCount::Six));
        assert_eq!(policy.minimum_principal, Money::from_major(100));
        assert_eq!(policy.installments_description(), "12 or 24");
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(LoanPolicy::from_json(r#"{ "allowed_installments": [7] }"#).is_err());
        assert!(LoanPolicy::from_json(r#"{ "unknown_key": 1 }"#).is_err());
        assert!(LoanPolicy::from_json(r#"{ "allowed_installments": [] }"#).is_err());

        let inverted = r#"{ "minimum_interest_rate": "0.6", "maximum_interest_rate": "0.5" }"#;
        let err = LoanPolicy::from_json(inverted).unwrap_err();
        assert_eq!(err.code(), "INVALID_CONFIGURATION");
    }
}
