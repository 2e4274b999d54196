pub mod allocation;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::loan::LoanInstallment;

pub use allocation::{Allocation, PaidInstallment, PaymentAllocator};

/// which unpaid installments a payment may reach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentWindow {
    pub months: u32,
}

impl PaymentWindow {
    pub fn new(months: u32) -> Self {
        Self { months }
    }

    /// last due date still payable today
    pub fn cutoff(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_add_months(Months::new(self.months))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn is_eligible(&self, installment: &LoanInstallment, today: NaiveDate) -> bool {
        !installment.is_paid && installment.due_date <= self.cutoff(today)
    }
}

impl Default for PaymentWindow {
    fn default() -> Self {
        Self::new(3)
    }
}
