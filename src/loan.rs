use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::types::{CustomerId, InstallmentCount, InstallmentId, LoanId};

/// one scheduled repayment of a loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanInstallment {
    pub id: InstallmentId,
    pub loan_id: LoanId,
    pub amount: Money,
    pub due_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    pub paid_amount: Option<Money>,
    pub is_paid: bool,
}

impl LoanInstallment {
    /// unpaid installment, ids are assigned by the store
    pub fn scheduled(amount: Money, due_date: NaiveDate) -> Self {
        Self {
            id: 0,
            loan_id: 0,
            amount,
            due_date,
            payment_date: None,
            paid_amount: None,
            is_paid: false,
        }
    }

    /// settle in full; an installment is paid at most once
    pub fn pay(&mut self, payment_date: NaiveDate) -> Result<Money> {
        if self.is_paid {
            return Err(LoanError::DataIntegrity {
                loan_id: self.loan_id,
                message: format!("installment {} is already paid", self.id),
            });
        }

        self.is_paid = true;
        self.paid_amount = Some(self.amount);
        self.payment_date = Some(payment_date);
        Ok(self.amount)
    }
}

/// loan with its full installment schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub customer_id: CustomerId,
    pub principal: Money,
    pub interest_rate: Rate,
    pub number_of_installments: InstallmentCount,
    pub created_at: DateTime<Utc>,
    pub is_paid: bool,
    /// ordered by due date ascending
    pub installments: Vec<LoanInstallment>,
}

impl Loan {
    /// principal plus the flat one-time interest, rounded half-up
    pub fn total_amount(&self) -> Money {
        self.principal.with_rate(self.interest_rate)
    }

    pub fn remaining_installments(&self) -> usize {
        self.installments.iter().filter(|i| !i.is_paid).count()
    }

    pub fn all_installments_paid(&self) -> bool {
        self.installments.iter().all(|i| i.is_paid)
    }

    /// flip `is_paid` once every installment is paid; never reverts
    pub fn refresh_paid_status(&mut self) -> bool {
        if !self.is_paid && !self.installments.is_empty() && self.all_installments_paid() {
            self.is_paid = true;
        }
        self.is_paid
    }

    /// fail when the schedule is missing, which only corrupted state produces
    pub fn ensure_schedule(&self) -> Result<()> {
        if self.installments.is_empty() {
            return Err(LoanError::DataIntegrity {
                loan_id: self.id,
                message: "no installments found, this might indicate a data integrity issue"
                    .to_string(),
            });
        }
        Ok(())
    }
}
