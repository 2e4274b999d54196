use serde::{Deserialize, Serialize};

use crate::auth::{AccessGate, Principal};
use crate::customer::RegistrationRequest;
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::events::Event;
use crate::loan::Loan;
use crate::schedule::InstallmentSchedule;
use crate::store::{CustomerStore, LoanStore, Store};
use crate::types::{CustomerId, InstallmentCount, Role};

use super::{ensure_positive_id, store_failure, LoanService};

/// result of a successful registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredCustomer {
    pub customer_id: CustomerId,
    pub email: String,
    pub role: Role,
    pub message: String,
}

/// loan origination input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoanRequest {
    pub customer_id: CustomerId,
    pub amount: Money,
    pub interest_rate: Rate,
    /// raw count, checked against the policy
    pub number_of_installments: u32,
}

impl<'t, S: Store> LoanService<'t, S> {
    pub fn register_customer(&self, request: RegistrationRequest) -> Result<RegisteredCustomer> {
        let customer = request.into_customer()?;
        let context = format!(
            "Database error while registering customer with email: {}",
            customer.email
        );

        let mut tx = self.begin(&context)?;
        if tx
            .find_customer_by_email(&customer.email)
            .map_err(|e| store_failure(&context, e))?
            .is_some()
        {
            tracing::warn!(email = %customer.email, "registration rejected, email already in use");
            return Err(LoanError::DuplicateEmail { email: customer.email });
        }

        let saved = tx
            .save_customer(customer)
            .map_err(|e| store_failure(&context, e))?;
        self.commit(tx, &context)?;

        tracing::info!(
            customer_id = saved.id,
            role = %saved.role,
            "customer registered"
        );
        self.publish(vec![Event::CustomerRegistered {
            customer_id: saved.id,
            role: saved.role,
            credit_limit: saved.credit_limit(),
            timestamp: self.now(),
        }]);

        Ok(RegisteredCustomer {
            customer_id: saved.id,
            email: saved.email,
            role: saved.role,
            message: format!("User account created successfully with ID: {}", saved.id),
        })
    }

    /// originate a loan and debit its total from the customer's credit line
    ///
    /// The loan, its installments and the ledger debit are written in one
    /// transaction; any failure leaves the store untouched.
    pub fn create_loan(&self, caller: &Principal, request: CreateLoanRequest) -> Result<Loan> {
        ensure_positive_id("customerId", request.customer_id)?;
        let count = self.validate_origination(&request)?;
        AccessGate::ensure(caller, request.customer_id)?;

        let context = format!(
            "Database error while creating loan for customer ID: {}",
            request.customer_id
        );
        let mut tx = self.begin(&context)?;

        let mut customer = tx
            .find_customer(request.customer_id)
            .map_err(|e| store_failure(&context, e))?
            .ok_or(LoanError::CustomerNotFound { customer_id: request.customer_id })?;

        let Some(credit) = customer.credit.as_mut() else {
            tracing::warn!(customer_id = customer.id, "loan requested for admin account");
            return Err(LoanError::AdminCannotCreateLoan);
        };

        let now = self.now();
        let schedule =
            InstallmentSchedule::generate(request.amount, request.interest_rate, count, now.date_naive())?;

        credit.debit(schedule.total_amount).inspect_err(|_| {
            tracing::warn!(
                customer_id = request.customer_id,
                required = %schedule.total_amount,
                "loan rejected, insufficient credit limit"
            );
        })?;
        let used_credit_limit = credit.used_credit_limit();

        let loan = Loan {
            id: 0,
            customer_id: customer.id,
            principal: request.amount,
            interest_rate: request.interest_rate,
            number_of_installments: count,
            created_at: now,
            is_paid: false,
            installments: schedule.installments,
        };

        let loan = tx.save_loan(loan).map_err(|e| store_failure(&context, e))?;
        tx.save_customer(customer)
            .map_err(|e| store_failure(&context, e))?;
        self.commit(tx, &context)?;

        tracing::info!(
            loan_id = loan.id,
            customer_id = loan.customer_id,
            principal = %loan.principal,
            total_amount = %schedule.total_amount,
            installments = count.months(),
            "loan originated"
        );
        self.publish(vec![
            Event::LoanOriginated {
                loan_id: loan.id,
                customer_id: loan.customer_id,
                principal: loan.principal,
                interest_rate: loan.interest_rate,
                number_of_installments: count,
                total_amount: schedule.total_amount,
                timestamp: now,
            },
            Event::CreditLimitDebited {
                customer_id: loan.customer_id,
                amount: schedule.total_amount,
                used_credit_limit,
                timestamp: now,
            },
        ]);

        Ok(loan)
    }

    /// check amount, rate and installment count together
    fn validate_origination(&self, request: &CreateLoanRequest) -> Result<InstallmentCount> {
        let policy = &self.policy;
        let mut details = Vec::new();

        if request.amount < policy.minimum_principal {
            details.push(format!(
                "amount: must be at least {}",
                policy.minimum_principal.as_decimal().normalize()
            ));
        }
        if !policy.allows_rate(request.interest_rate) {
            details.push(format!(
                "interestRate: must be between {} and {}",
                policy.minimum_interest_rate, policy.maximum_interest_rate
            ));
        }

        let count = InstallmentCount::from_months(request.number_of_installments)
            .filter(|c| policy.allows_installments(*c));
        if count.is_none() {
            details.push(format!(
                "numberOfInstallments: must be {}",
                policy.installments_description()
            ));
        }

        match count {
            Some(count) if details.is_empty() => Ok(count),
            _ => Err(LoanError::Validation { details }),
        }
    }
}
