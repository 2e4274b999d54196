use chrono::{Datelike, Months, NaiveDate};

use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::loan::LoanInstallment;
use crate::types::InstallmentCount;

/// total the customer repays: round2(principal * (1 + rate))
pub fn total_payable(principal: Money, rate: Rate) -> Money {
    principal.with_rate(rate)
}

/// equal share per installment, rounded half-up
///
/// The shares are not reconciled against the total, so their sum may drift
/// from `total_payable` by up to one cent per installment.
pub fn installment_amount(total: Money, count: InstallmentCount) -> Money {
    total.split(count.months())
}

/// first day of the month after `today`
pub fn first_due_date(today: NaiveDate) -> Result<NaiveDate> {
    today
        .with_day(1)
        .and_then(|d| d.checked_add_months(Months::new(1)))
        .ok_or_else(|| LoanError::CalculationError {
            message: format!("no due date after {}", today),
        })
}

/// installment schedule generated at origination
#[derive(Debug, Clone, PartialEq)]
pub struct InstallmentSchedule {
    pub total_amount: Money,
    pub installment_amount: Money,
    pub installments: Vec<LoanInstallment>,
}

impl InstallmentSchedule {
    /// due date for installment i (0-based) = first due date + i months
    pub fn generate(
        principal: Money,
        rate: Rate,
        count: InstallmentCount,
        today: NaiveDate,
    ) -> Result<Self> {
        let total_amount = total_payable(principal, rate);
        let amount = installment_amount(total_amount, count);
        let first_due = first_due_date(today)?;

        let installments = (0..count.months())
            .map(|i| {
                first_due
                    .checked_add_months(Months::new(i))
                    .map(|due| LoanInstallment::scheduled(amount, due))
                    .ok_or_else(|| LoanError::CalculationError {
                        message: format!("due date {} months after {} out of range", i, first_due),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            total_amount,
            installment_amount: amount,
            installments,
        })
    }

    /// sum of all installment amounts, may differ from `total_amount` by rounding
    pub fn scheduled_sum(&self) -> Money {
        self.installments.iter().map(|i| i.amount).sum()
    }
}
