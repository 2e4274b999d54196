use std::collections::BTreeMap;

use parking_lot::{Mutex, MutexGuard};

use crate::customer::Customer;
use crate::errors::StoreError;
use crate::loan::Loan;
use crate::types::{CustomerId, InstallmentId, LoanFilter, LoanId};

use super::{CustomerStore, LoanStore, Store, StoreResult, StoreTx};

#[derive(Debug, Clone, Default)]
struct Tables {
    customers: BTreeMap<CustomerId, Customer>,
    loans: BTreeMap<LoanId, Loan>,
    last_customer_id: CustomerId,
    last_loan_id: LoanId,
    last_installment_id: InstallmentId,
}

/// in-process store, one writer at a time
///
/// `begin` takes the table lock and works on a staged copy, so a transaction
/// sees a stable snapshot and partial writes never become visible.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customer_count(&self) -> usize {
        self.tables.lock().customers.len()
    }

    pub fn loan_count(&self) -> usize {
        self.tables.lock().loans.len()
    }
}

impl Store for MemoryStore {
    type Tx<'a> = MemoryTx<'a>;

    fn begin(&self) -> StoreResult<MemoryTx<'_>> {
        let guard = self.tables.lock();
        let staged = guard.clone();
        Ok(MemoryTx { guard, staged })
    }
}

/// staged writes over a locked [`MemoryStore`]
pub struct MemoryTx<'a> {
    guard: MutexGuard<'a, Tables>,
    staged: Tables,
}

impl CustomerStore for MemoryTx<'_> {
    fn find_customer(&self, id: CustomerId) -> StoreResult<Option<Customer>> {
        Ok(self.staged.customers.get(&id).cloned())
    }

    fn find_customer_by_email(&self, email: &str) -> StoreResult<Option<Customer>> {
        Ok(self
            .staged
            .customers
            .values()
            .find(|c| c.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn save_customer(&mut self, mut customer: Customer) -> StoreResult<Customer> {
        let tables = &mut self.staged;

        if tables
            .customers
            .values()
            .any(|c| c.email.eq_ignore_ascii_case(&customer.email) && c.id != customer.id)
        {
            return Err(StoreError::Rejected {
                message: format!("unique constraint violated on email {}", customer.email),
            });
        }

        if customer.id == 0 {
            tables.last_customer_id += 1;
            customer.id = tables.last_customer_id;
        } else if !tables.customers.contains_key(&customer.id) {
            return Err(StoreError::Missing { entity: "customer", id: customer.id });
        }

        tables.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }
}

impl LoanStore for MemoryTx<'_> {
    fn find_loan(&self, id: LoanId) -> StoreResult<Option<Loan>> {
        Ok(self.staged.loans.get(&id).cloned())
    }

    fn find_loans_by_customer(
        &self,
        customer_id: CustomerId,
        filter: &LoanFilter,
    ) -> StoreResult<Vec<Loan>> {
        Ok(self
            .staged
            .loans
            .values()
            .filter(|l| l.customer_id == customer_id)
            .filter(|l| filter.matches(l.is_paid, l.number_of_installments))
            .cloned()
            .collect())
    }

    fn save_loan(&mut self, mut loan: Loan) -> StoreResult<Loan> {
        let tables = &mut self.staged;

        if !tables.customers.contains_key(&loan.customer_id) {
            return Err(StoreError::Missing { entity: "customer", id: loan.customer_id });
        }

        if loan.id == 0 {
            tables.last_loan_id += 1;
            loan.id = tables.last_loan_id;
        } else if !tables.loans.contains_key(&loan.id) {
            return Err(StoreError::Missing { entity: "loan", id: loan.id });
        }

        for installment in loan.installments.iter_mut() {
            if installment.id == 0 {
                tables.last_installment_id += 1;
                installment.id = tables.last_installment_id;
            }
            installment.loan_id = loan.id;
        }
        loan.installments.sort_by_key(|i| i.due_date);

        tables.loans.insert(loan.id, loan.clone());
        Ok(loan)
    }
}

impl StoreTx for MemoryTx<'_> {
    fn commit(self) -> StoreResult<()> {
        let MemoryTx { mut guard, staged } = self;
        *guard = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::RegistrationRequest;
    use crate::decimal::{Money, Rate};
    use crate::loan::LoanInstallment;
    use crate::types::InstallmentCount;
    use chrono::{Datelike, NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn customer(email: &str) -> Customer {
        RegistrationRequest::customer(email, "Ada", "Byron", Money::from_major(10_000), Money::ZERO)
            .into_customer()
            .unwrap()
    }

    fn loan(customer_id: CustomerId, count: InstallmentCount) -> Loan {
        let due = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        Loan {
            id: 0,
            customer_id,
            principal: Money::from_major(1_000),
            interest_rate: Rate::from_decimal(dec!(0.1)),
            number_of_installments: count,
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
            is_paid: false,
            installments: vec![
                LoanInstallment::scheduled(Money::from_major(550), due),
                LoanInstallment::scheduled(Money::from_major(550), due.with_month(3).unwrap()),
            ],
        }
    }

    #[test]
    fn test_commit_publishes_writes() {
        let store = MemoryStore::new();

        let mut tx = store.begin().unwrap();
        let saved = tx.save_customer(customer("a@bank.test")).unwrap();
        assert_eq!(saved.id, 1);
        tx.commit().unwrap();

        let tx = store.begin().unwrap();
        assert_eq!(tx.find_customer(1).unwrap().unwrap().email, "a@bank.test");
        assert_eq!(tx.find_customer_by_email("A@Bank.test").unwrap().unwrap().id, 1);
        assert!(tx.find_customer_by_email("b@bank.test").unwrap().is_none());
    }

    #[test]
    fn test_drop_rolls_back() {
        let store = MemoryStore::new();
        {
            let mut tx = store.begin().unwrap();
            tx.save_customer(customer("a@bank.test")).unwrap();
        }
        assert_eq!(store.customer_count(), 0);

        // ids are not consumed by the discarded insert
        let mut tx = store.begin().unwrap();
        assert_eq!(tx.save_customer(customer("b@bank.test")).unwrap().id, 1);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        let mut tx = store.begin().unwrap();
        tx.save_customer(customer("a@bank.test")).unwrap();
        let err = tx.save_customer(customer("A@BANK.test")).unwrap_err();
        assert!(matches!(err, StoreError::Rejected { .. }));
    }

    #[test]
    fn test_save_loan_assigns_ids() {
        let store = MemoryStore::new();
        let mut tx = store.begin().unwrap();
        let owner = tx.save_customer(customer("a@bank.test")).unwrap();

        let first = tx.save_loan(loan(owner.id, InstallmentCount::Six)).unwrap();
        let second = tx.save_loan(loan(owner.id, InstallmentCount::Nine)).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(
            second.installments.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![3, 4]
        );
        assert!(second.installments.iter().all(|i| i.loan_id == 2));

        // updates keep existing installment ids
        let mut paid = first.clone();
        paid.installments[0].is_paid = true;
        let updated = tx.save_loan(paid).unwrap();
        assert_eq!(updated.installments[0].id, 1);
        assert!(tx.find_loan(1).unwrap().unwrap().installments[0].is_paid);
    }

    #[test]
    fn test_loan_for_unknown_customer() {
        let store = MemoryStore::new();
        let mut tx = store.begin().unwrap();
        let err = tx.save_loan(loan(42, InstallmentCount::Six)).unwrap_err();
        assert!(matches!(err, StoreError::Missing { entity: "customer", id: 42 }));
    }

    #[test]
    fn test_find_loans_by_customer_filters_and_orders() {
        let store = MemoryStore::new();
        let mut tx = store.begin().unwrap();
        let a = tx.save_customer(customer("a@bank.test")).unwrap();
        let b = tx.save_customer(customer("b@bank.test")).unwrap();

        tx.save_loan(loan(a.id, InstallmentCount::Six)).unwrap();
        tx.save_loan(loan(b.id, InstallmentCount::Six)).unwrap();
        let mut settled = loan(a.id, InstallmentCount::Twelve);
        settled.is_paid = true;
        tx.save_loan(settled).unwrap();
        tx.commit().unwrap();

        let tx = store.begin().unwrap();
        let all = tx.find_loans_by_customer(a.id, &LoanFilter::default()).unwrap();
        assert_eq!(all.iter().map(|l| l.id).collect::<Vec<_>>(), vec![1, 3]);

        let unpaid = LoanFilter { is_paid: Some(false), ..Default::default() };
        assert_eq!(tx.find_loans_by_customer(a.id, &unpaid).unwrap().len(), 1);

        let twelve = LoanFilter {
            number_of_installments: Some(InstallmentCount::Twelve),
            ..Default::default()
        };
        let found = tx.find_loans_by_customer(a.id, &twelve).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].is_paid);
    }
}
