use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{AccessGate, Principal};
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::loan::{Loan, LoanInstallment};
use crate::store::{CustomerStore, LoanStore, Store};
use crate::types::{CustomerId, InstallmentCount, InstallmentId, LoanFilter, LoanId};

use super::{ensure_positive_id, store_failure, LoanService};

/// one row of a customer's loan listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSummary {
    pub id: LoanId,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub customer_surname: String,
    pub loan_amount: Money,
    pub interest_rate: Rate,
    pub number_of_installments: InstallmentCount,
    pub create_date: DateTime<Utc>,
    pub is_paid: bool,
    pub total_amount: Money,
    pub remaining_installments: usize,
}

impl LoanSummary {
    fn new(loan: &Loan, name: &str, surname: &str) -> Self {
        Self {
            id: loan.id,
            customer_id: loan.customer_id,
            customer_name: name.to_string(),
            customer_surname: surname.to_string(),
            loan_amount: loan.principal,
            interest_rate: loan.interest_rate,
            number_of_installments: loan.number_of_installments,
            create_date: loan.created_at,
            is_paid: loan.is_paid,
            total_amount: loan.total_amount(),
            remaining_installments: loan.remaining_installments(),
        }
    }
}

/// one installment of a loan, numbered from 1 in due-date order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentDetail {
    pub id: InstallmentId,
    pub loan_id: LoanId,
    pub amount: Money,
    pub due_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    pub paid_amount: Option<Money>,
    pub is_paid: bool,
    pub installment_number: usize,
}

impl InstallmentDetail {
    fn new(installment: &LoanInstallment, number: usize) -> Self {
        Self {
            id: installment.id,
            loan_id: installment.loan_id,
            amount: installment.amount,
            due_date: installment.due_date,
            payment_date: installment.payment_date,
            paid_amount: installment.paid_amount,
            is_paid: installment.is_paid,
            installment_number: number,
        }
    }
}

impl<'t, S: Store> LoanService<'t, S> {
    /// loans of a customer, optionally filtered, ordered by loan id
    pub fn list_loans(
        &self,
        caller: &Principal,
        customer_id: CustomerId,
        is_paid: Option<bool>,
        number_of_installments: Option<i64>,
    ) -> Result<Vec<LoanSummary>> {
        ensure_positive_id("customerId", customer_id)?;
        let filter = LoanFilter {
            is_paid,
            number_of_installments: self.installments_filter(number_of_installments)?,
        };
        AccessGate::ensure(caller, customer_id)?;

        let context = format!(
            "Database error while retrieving loans for customer ID: {}",
            customer_id
        );
        let tx = self.begin(&context)?;

        let customer = tx
            .find_customer(customer_id)
            .map_err(|e| store_failure(&context, e))?
            .ok_or(LoanError::CustomerNotFound { customer_id })?;

        let loans = tx
            .find_loans_by_customer(customer_id, &filter)
            .map_err(|e| store_failure(&context, e))?;

        tracing::debug!(customer_id, count = loans.len(), "loans listed");
        Ok(loans
            .iter()
            .map(|loan| LoanSummary::new(loan, &customer.name, &customer.surname))
            .collect())
    }

    /// installments of one loan in due-date order
    pub fn list_loan_installments(
        &self,
        caller: &Principal,
        loan_id: LoanId,
    ) -> Result<Vec<InstallmentDetail>> {
        ensure_positive_id("loanId", loan_id)?;

        let context = format!(
            "Database error while retrieving installments for loan ID: {}",
            loan_id
        );
        let tx = self.begin(&context)?;

        let loan = tx
            .find_loan(loan_id)
            .map_err(|e| store_failure(&context, e))?
            .ok_or(LoanError::LoanNotFound { loan_id })?;
        drop(tx);

        AccessGate::ensure(caller, loan.customer_id)?;
        loan.ensure_schedule().inspect_err(|_| {
            tracing::error!(loan_id, "loan has no installments");
        })?;

        Ok(loan
            .installments
            .iter()
            .enumerate()
            .map(|(idx, installment)| InstallmentDetail::new(installment, idx + 1))
            .collect())
    }

    fn installments_filter(&self, requested: Option<i64>) -> Result<Option<InstallmentCount>> {
        let Some(months) = requested else {
            return Ok(None);
        };
        if months <= 0 {
            return Err(LoanError::invalid_parameter(
                "numberOfInstallments",
                "must be a positive number",
            ));
        }

        u32::try_from(months)
            .ok()
            .and_then(InstallmentCount::from_months)
            .filter(|c| self.policy.allows_installments(*c))
            .map(Some)
            .ok_or_else(|| {
                LoanError::invalid_parameter(
                    "numberOfInstallments",
                    format!("must be one of: {}", self.policy.installments_description()),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::super::CreateLoanRequest;
    use super::*;
    use crate::store::{MemoryStore, StoreTx};
    use rust_decimal_macros::dec;

    fn originate<'t>(
        service: &LoanService<'t, MemoryStore>,
        customer_id: CustomerId,
        amount: i64,
        n: u32,
    ) -> Loan {
        service
            .create_loan(
                &Principal::customer(customer_id),
                CreateLoanRequest {
                    customer_id,
                    amount: Money::from_major(amount),
                    interest_rate: Rate::from_decimal(dec!(0.2)),
                    number_of_installments: n,
                },
            )
            .unwrap()
    }

    #[test]
    fn test_list_loans_with_filters() {
        let time = clock();
        let service = service(&time);
        let id = customer(&service, "jane@bank.test", 100_000, 0);

        originate(&service, id, 1_000, 6);
        let second = originate(&service, id, 2_000, 12);
        originate(&service, id, 3_000, 6);

        let caller = Principal::customer(id);
        let all = service.list_loans(&caller, id, None, None).unwrap();
        assert_eq!(all.iter().map(|l| l.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(all[1].total_amount, Money::from_major(2_400));
        assert_eq!(all[1].remaining_installments, 12);
        assert_eq!(all[1].customer_name, "Jane");

        let twelve = service.list_loans(&caller, id, None, Some(12)).unwrap();
        assert_eq!(twelve.len(), 1);
        assert_eq!(twelve[0].id, second.id);

        assert!(service.list_loans(&caller, id, Some(true), None).unwrap().is_empty());
        assert!(service.list_loans(&caller, id, Some(true), Some(6)).unwrap().is_empty());
        assert_eq!(service.list_loans(&caller, id, Some(false), Some(6)).unwrap().len(), 2);
    }

    #[test]
    fn test_list_loans_empty_is_ok() {
        let time = clock();
        let service = service(&time);
        let id = customer(&service, "jane@bank.test", 100_000, 0);
        assert!(service.list_loans(&Principal::customer(id), id, None, None).unwrap().is_empty());
    }

    #[test]
    fn test_list_loans_parameter_errors() {
        let time = clock();
        let service = service(&time);
        let caller = Principal::admin(1);

        let err = service.list_loans(&caller, 0, None, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'customerId': must be a positive number"
        );

        let err = service.list_loans(&caller, 1, None, Some(-6)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'numberOfInstallments': must be a positive number"
        );

        let err = service.list_loans(&caller, 1, None, Some(10)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'numberOfInstallments': must be one of: 6, 9, 12, or 24"
        );

        let err = service.list_loans(&caller, 1, None, None).unwrap_err();
        assert_eq!(err.code(), "CUSTOMER_NOT_FOUND");
    }

    #[test]
    fn test_list_access_rules() {
        let time = clock();
        let service = service(&time);
        let owner = customer(&service, "jane@bank.test", 100_000, 0);
        let other = customer(&service, "john@bank.test", 100_000, 0);
        let root = admin(&service, "root@bank.test");
        let loan = originate(&service, owner, 1_000, 6);

        let err = service
            .list_loans(&Principal::customer(other), owner, None, None)
            .unwrap_err();
        assert_eq!(err.code(), "CUSTOMER_ACCESS_DENIED");

        let err = service
            .list_loan_installments(&Principal::customer(other), loan.id)
            .unwrap_err();
        assert_eq!(err.status().as_u16(), 403);

        assert_eq!(service.list_loans(&Principal::admin(root), owner, None, None).unwrap().len(), 1);
        assert_eq!(
            service.list_loan_installments(&Principal::admin(root), loan.id).unwrap().len(),
            6
        );
    }

    #[test]
    fn test_list_installments_numbering() {
        let time = clock();
        let service = service(&time);
        let id = customer(&service, "jane@bank.test", 100_000, 0);
        let loan = originate(&service, id, 1_000, 9);

        let details = service
            .list_loan_installments(&Principal::customer(id), loan.id)
            .unwrap();

        assert_eq!(details.len(), 9);
        assert_eq!(
            details.iter().map(|d| d.installment_number).collect::<Vec<_>>(),
            (1..=9).collect::<Vec<_>>()
        );
        assert!(details.windows(2).all(|w| w[0].due_date < w[1].due_date));
        assert!(details.iter().all(|d| d.loan_id == loan.id && !d.is_paid));
        assert_eq!(details[0].amount.as_decimal(), dec!(133.33));
    }

    #[test]
    fn test_list_installments_errors() {
        let time = clock();
        let service = service(&time);
        let id = customer(&service, "jane@bank.test", 100_000, 0);

        let err = service.list_loan_installments(&Principal::admin(9), -1).unwrap_err();
        assert_eq!(err.code(), "INVALID_PARAMETER");

        let err = service.list_loan_installments(&Principal::admin(9), 5).unwrap_err();
        assert_eq!(err.to_string(), "Loan not found with ID: 5");

        // corrupted row without a schedule
        let mut loan = originate(&service, id, 1_000, 6);
        loan.installments.clear();
        let mut tx = service.store().begin().unwrap();
        tx.save_loan(loan.clone()).unwrap();
        tx.commit().unwrap();

        let err = service
            .list_loan_installments(&Principal::customer(id), loan.id)
            .unwrap_err();
        assert_eq!(err.code(), "LOAN_DATA_ACCESS_ERROR");
        assert!(matches!(err, LoanError::DataIntegrity { .. }));
    }

    #[test]
    fn test_store_outage_is_wrapped() {
        let time = clock();
        let service = LoanService::new(
            FlakyStore::default(),
            crate::config::LoanPolicy::default(),
            &time,
        )
        .unwrap();
        service.store().fail_begin(true);

        let err = service.list_loan_installments(&Principal::admin(1), 3).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Database error while retrieving installments for loan ID: 3"
        );
        assert_eq!(err.to_response().status, 500);
    }
}
