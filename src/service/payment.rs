use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{AccessGate, Principal};
use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::events::Event;
use crate::store::{CustomerStore, LoanStore, Store};
use crate::types::LoanId;

use super::{ensure_positive_id, store_failure, LoanService};

/// what a payment settled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOutcome {
    pub loan_id: LoanId,
    pub installments_paid: usize,
    pub total_spent: Money,
    pub fully_paid: bool,
    pub message: String,
    pub payment_reference: Uuid,
}

impl<'t, S: Store> LoanService<'t, S> {
    /// pay whole installments of a loan, earliest due first
    ///
    /// Funds that cannot cover the next installment are left unapplied. The
    /// repaid total is released back to the customer's credit line in the
    /// same transaction as the installment updates.
    pub fn pay_loan(&self, caller: &Principal, loan_id: LoanId, amount: Money) -> Result<PaymentOutcome> {
        ensure_positive_id("loanId", loan_id)?;
        if !amount.is_positive() {
            return Err(LoanError::Validation {
                details: vec!["amount: must be greater than 0".to_string()],
            });
        }

        let context = format!(
            "Database error while processing loan payment for loan ID: {}",
            loan_id
        );
        let mut tx = self.begin(&context)?;

        let mut loan = tx
            .find_loan(loan_id)
            .map_err(|e| store_failure(&context, e))?
            .ok_or(LoanError::LoanNotFound { loan_id })?;

        AccessGate::ensure(caller, loan.customer_id)?;

        if loan.is_paid {
            tracing::warn!(loan_id, "payment rejected, loan already paid");
            return Err(LoanError::LoanAlreadyPaid { loan_id });
        }
        loan.ensure_schedule()?;

        let total_amount = loan.total_amount();
        let paid_before: Money = loan.installments.iter().filter_map(|i| i.paid_amount).sum();

        let today = self.today();
        let allocation = self
            .allocator
            .allocate(&mut loan, amount, today)
            .inspect_err(|e| {
                tracing::warn!(loan_id, amount = %amount, error = %e, "payment rejected");
            })?;

        let mut customer = tx
            .find_customer(loan.customer_id)
            .map_err(|e| store_failure(&context, e))?
            .ok_or_else(|| LoanError::DataIntegrity {
                loan_id,
                message: format!("owning customer {} is missing", loan.customer_id),
            })?;

        let credit = customer.credit.as_mut().ok_or_else(|| LoanError::CreditLedger {
            message: format!("customer {} has no credit line", loan.customer_id),
        })?;
        // installments rounded up can sum past the debited total, release at most that
        let paid_after = paid_before + allocation.total_spent;
        let released = paid_after.min(total_amount) - paid_before.min(total_amount);
        credit.credit(released)?;
        let used_credit_limit = credit.used_credit_limit();

        let customer_id = customer.id;
        tx.save_loan(loan).map_err(|e| store_failure(&context, e))?;
        tx.save_customer(customer)
            .map_err(|e| store_failure(&context, e))?;
        self.commit(tx, &context)?;

        let payment_reference = Uuid::new_v4();
        let timestamp = self.now();
        tracing::info!(
            loan_id,
            customer_id,
            installments_paid = allocation.installments_paid(),
            total_spent = %allocation.total_spent,
            unapplied = %allocation.unapplied,
            fully_paid = allocation.fully_paid,
            %payment_reference,
            "loan payment applied"
        );

        let mut events: Vec<Event> = allocation
            .paid
            .iter()
            .map(|paid| Event::InstallmentPaid {
                loan_id,
                installment_id: paid.installment_id,
                amount: paid.amount,
                due_date: paid.due_date,
                payment_date: today,
                payment_reference,
            })
            .collect();
        events.push(Event::CreditLimitCredited {
            customer_id,
            amount: released,
            used_credit_limit,
            timestamp,
        });
        if allocation.fully_paid {
            events.push(Event::LoanSettled { loan_id, customer_id, timestamp });
        }
        self.publish(events);

        let mut message = format!(
            "Successfully paid {} installment(s) for a total of {}",
            allocation.installments_paid(),
            allocation.total_spent
        );
        if allocation.fully_paid {
            message.push_str(". Loan is now fully paid!");
        }

        Ok(PaymentOutcome {
            loan_id,
            installments_paid: allocation.installments_paid(),
            total_spent: allocation.total_spent,
            fully_paid: allocation.fully_paid,
            message,
            payment_reference,
        })
    }
}
