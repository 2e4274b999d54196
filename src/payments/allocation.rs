use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::loan::Loan;
use crate::types::InstallmentId;

use super::PaymentWindow;

/// installment settled by an allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaidInstallment {
    pub installment_id: InstallmentId,
    pub amount: Money,
    pub due_date: NaiveDate,
}

/// result of distributing one payment over a loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub paid: Vec<PaidInstallment>,
    pub total_spent: Money,
    /// left over funds, neither applied nor refunded
    pub unapplied: Money,
    pub fully_paid: bool,
}

impl Allocation {
    pub fn installments_paid(&self) -> usize {
        self.paid.len()
    }
}

/// greedy allocator: whole installments, earliest due first
#[derive(Debug, Clone, Copy)]
pub struct PaymentAllocator {
    window: PaymentWindow,
}

impl PaymentAllocator {
    pub fn new(window: PaymentWindow) -> Self {
        Self { window }
    }

    /// distribute `amount` over the loan's payable installments
    ///
    /// Walks eligible installments in due-date order and stops at the first
    /// one the remaining funds cannot cover in full, even if a later one
    /// would fit. Mutates the loan in place; callers persist it.
    pub fn allocate(&self, loan: &mut Loan, amount: Money, today: NaiveDate) -> Result<Allocation> {
        if !amount.is_positive() {
            return Err(LoanError::Validation {
                details: vec!["amount: must be greater than 0".to_string()],
            });
        }

        if loan.is_paid {
            return Err(LoanError::LoanAlreadyPaid { loan_id: loan.id });
        }

        let mut eligible: Vec<usize> = loan
            .installments
            .iter()
            .enumerate()
            .filter(|(_, inst)| self.window.is_eligible(inst, today))
            .map(|(idx, _)| idx)
            .collect();

        // stable, ties keep schedule order
        eligible.sort_by_key(|&idx| loan.installments[idx].due_date);

        let Some(&first) = eligible.first() else {
            return Err(LoanError::NoPayableInstallments {
                loan_id: loan.id,
                window_months: self.window.months,
            });
        };

        let minimum = loan.installments[first].amount;
        if amount < minimum {
            return Err(LoanError::InvalidPaymentAmount {
                provided: amount,
                minimum,
            });
        }

        let mut remaining = amount;
        let mut total_spent = Money::ZERO;
        let mut paid = Vec::new();

        for idx in eligible {
            let installment = &mut loan.installments[idx];
            if remaining < installment.amount {
                break;
            }

            let spent = installment.pay(today)?;
            remaining -= spent;
            total_spent += spent;
            paid.push(PaidInstallment {
                installment_id: installment.id,
                amount: spent,
                due_date: installment.due_date,
            });
        }

        let fully_paid = loan.refresh_paid_status();

        Ok(Allocation {
            paid,
            total_spent,
            unapplied: remaining,
            fully_paid,
        })
    }
}

impl Default for PaymentAllocator {
    fn default() -> Self {
        Self::new(PaymentWindow::default())
    }
}
