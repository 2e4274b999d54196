use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::types::{CustomerId, Role};

/// credit ledger of a borrowing customer
///
/// `0 <= used_credit_limit <= credit_limit` holds after every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditLine {
    credit_limit: Money,
    used_credit_limit: Money,
}

impl CreditLine {
    pub fn new(credit_limit: Money, used_credit_limit: Money) -> Result<Self> {
        if credit_limit.is_negative() || used_credit_limit.is_negative() {
            return Err(LoanError::CreditLedger {
                message: "credit amounts must not be negative".to_string(),
            });
        }
        if used_credit_limit > credit_limit {
            return Err(LoanError::CreditLedger {
                message: format!(
                    "used credit {} exceeds credit limit {}",
                    used_credit_limit, credit_limit
                ),
            });
        }
        Ok(Self { credit_limit, used_credit_limit })
    }

    pub fn credit_limit(&self) -> Money {
        self.credit_limit
    }

    pub fn used_credit_limit(&self) -> Money {
        self.used_credit_limit
    }

    pub fn available(&self) -> Money {
        self.credit_limit - self.used_credit_limit
    }

    /// book a new loan total against the limit
    pub fn debit(&mut self, amount: Money) -> Result<()> {
        if amount.is_negative() {
            return Err(LoanError::CreditLedger {
                message: format!("cannot debit negative amount {}", amount),
            });
        }

        let available = self.available();
        if available < amount {
            return Err(LoanError::InsufficientCreditLimit {
                available,
                required: amount,
            });
        }

        self.used_credit_limit += amount;
        Ok(())
    }

    /// release repaid amounts back to the customer
    pub fn credit(&mut self, amount: Money) -> Result<()> {
        if amount.is_negative() {
            return Err(LoanError::CreditLedger {
                message: format!("cannot credit negative amount {}", amount),
            });
        }
        if amount > self.used_credit_limit {
            return Err(LoanError::CreditLedger {
                message: format!(
                    "credit of {} exceeds used credit {}",
                    amount, self.used_credit_limit
                ),
            });
        }

        self.used_credit_limit -= amount;
        Ok(())
    }
}

/// customer record, admins carry no credit line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub role: Role,
    pub credit: Option<CreditLine>,
}

impl Customer {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn credit_limit(&self) -> Option<Money> {
        self.credit.map(|c| c.credit_limit())
    }

    pub fn used_credit_limit(&self) -> Option<Money> {
        self.credit.map(|c| c.used_credit_limit())
    }

    pub fn available_credit(&self) -> Option<Money> {
        self.credit.map(|c| c.available())
    }
}

/// self-service or back-office registration input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub email: String,
    pub name: String,
    pub surname: String,
    pub role: Role,
    pub credit_limit: Option<Money>,
    pub used_credit_limit: Option<Money>,
}

impl RegistrationRequest {
    pub fn customer(
        email: impl Into<String>,
        name: impl Into<String>,
        surname: impl Into<String>,
        credit_limit: Money,
        used_credit_limit: Money,
    ) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            surname: surname.into(),
            role: Role::Customer,
            credit_limit: Some(credit_limit),
            used_credit_limit: Some(used_credit_limit),
        }
    }

    pub fn admin(
        email: impl Into<String>,
        name: impl Into<String>,
        surname: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            surname: surname.into(),
            role: Role::Admin,
            credit_limit: None,
            used_credit_limit: None,
        }
    }

    /// collect every field problem instead of stopping at the first
    pub fn validate(&self) -> Result<()> {
        let mut details = Vec::new();

        if self.email.trim().is_empty() {
            details.push("email: Email is required".to_string());
        } else if !is_email_shaped(self.email.trim()) {
            details.push("email: Invalid email format".to_string());
        }
        if self.name.trim().is_empty() {
            details.push("name: Name is required".to_string());
        }
        if self.surname.trim().is_empty() {
            details.push("surname: Surname is required".to_string());
        }

        if self.role == Role::Customer {
            match self.credit_limit {
                None => details.push("creditLimit: Credit limit is required for CUSTOMER role".to_string()),
                Some(limit) if limit.is_negative() => {
                    details.push("creditLimit: Credit limit must be positive".to_string())
                }
                Some(_) => {}
            }
            match self.used_credit_limit {
                None => details.push(
                    "usedCreditLimit: Used credit limit is required for CUSTOMER role".to_string(),
                ),
                Some(used) if used.is_negative() => {
                    details.push("usedCreditLimit: Used credit limit must be positive".to_string())
                }
                Some(_) => {}
            }
            if let (Some(limit), Some(used)) = (self.credit_limit, self.used_credit_limit) {
                if used > limit {
                    details.push(
                        "usedCreditLimit: Used credit limit must not exceed credit limit".to_string(),
                    );
                }
            }
        }

        if details.is_empty() {
            Ok(())
        } else {
            Err(LoanError::Validation { details })
        }
    }

    /// build the unsaved customer record (id 0 until stored)
    pub fn into_customer(self) -> Result<Customer> {
        self.validate()?;

        let credit = match (self.role, self.credit_limit, self.used_credit_limit) {
            (Role::Customer, Some(limit), Some(used)) => Some(CreditLine::new(limit, used)?),
            _ => None,
        };

        Ok(Customer {
            id: 0,
            email: self.email.trim().to_string(),
            name: self.name,
            surname: self.surname,
            role: self.role,
            credit,
        })
    }
}

fn is_email_shaped(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(limit: i64, used: i64) -> CreditLine {
        CreditLine::new(Money::from_major(limit), Money::from_major(used)).unwrap()
    }

    #[test]
    fn test_credit_line_invariants() {
        assert!(CreditLine::new(Money::from_major(100), Money::from_major(101)).is_err());
        assert!(CreditLine::new(Money::from_major(-1), Money::ZERO).is_err());
        assert_eq!(line(15_000, 10_000).available(), Money::from_major(5_000));
    }

    #[test]
    fn test_debit_rejects_over_limit() {
        let mut credit = line(15_000, 10_000);
        let err = credit.debit(Money::from_major(12_000)).unwrap_err();
        match err {
            LoanError::InsufficientCreditLimit { available, required } => {
                assert_eq!(available, Money::from_major(5_000));
                assert_eq!(required, Money::from_major(12_000));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // untouched on failure
        assert_eq!(credit.used_credit_limit(), Money::from_major(10_000));

        credit.debit(Money::from_major(5_000)).unwrap();
        assert_eq!(credit.available(), Money::ZERO);
    }

    #[test]
    fn test_credit_never_goes_negative() {
        let mut credit = line(1_000, 300);
        assert!(credit.credit(Money::from_major(301)).is_err());
        credit.credit(Money::from_major(300)).unwrap();
        assert_eq!(credit.used_credit_limit(), Money::ZERO);
        assert!(credit.credit(Money::from_major(-5)).is_err());
    }

    #[test]
    fn test_registration_aggregates_errors() {
        let request = RegistrationRequest {
            email: "not-an-email".to_string(),
            name: " ".to_string(),
            surname: String::new(),
            role: Role::Customer,
            credit_limit: Some(Money::from_major(100)),
            used_credit_limit: Some(Money::from_major(200)),
        };

        match request.validate().unwrap_err() {
            LoanError::Validation { details } => {
                assert_eq!(details.len(), 4);
                assert!(details[0].starts_with("email:"));
                assert!(details.iter().any(|d| d.starts_with("usedCreditLimit:")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_admin_registration_drops_credit_fields() {
        let mut request = RegistrationRequest::admin("root@bank.test", "Root", "User");
        request.credit_limit = Some(Money::from_major(5));

        let admin = request.into_customer().unwrap();
        assert!(admin.is_admin());
        assert_eq!(admin.credit, None);
        assert_eq!(admin.available_credit(), None);
    }

    #[test]
    fn test_customer_registration() {
        let customer = RegistrationRequest::customer(
            " jane@bank.test ",
            "Jane",
            "Doe",
            Money::from_major(20_000),
            Money::ZERO,
        )
        .into_customer()
        .unwrap();

        assert_eq!(customer.email, "jane@bank.test");
        assert_eq!(customer.credit_limit(), Some(Money::from_major(20_000)));
        assert_eq!(customer.used_credit_limit(), Some(Money::ZERO));
    }

    #[test]
    fn test_email_shape() {
        assert!(is_email_shaped("a@b.co"));
        assert!(!is_email_shaped("a@b"));
        assert!(!is_email_shaped("@b.co"));
        assert!(!is_email_shaped("a@@b.co"));
        assert!(!is_email_shaped("a b@c.co"));
    }
}
