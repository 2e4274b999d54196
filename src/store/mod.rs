//! persistence seam for customers and loans
//!
//! The service only ever talks to a [`StoreTx`]: it opens one per operation,
//! reads and writes through it, and commits once. Dropping a transaction
//! without committing discards every staged write.

pub mod memory;

use crate::customer::Customer;
use crate::errors::StoreError;
use crate::loan::Loan;
use crate::types::{CustomerId, LoanFilter, LoanId};

pub use memory::{MemoryStore, MemoryTx};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub trait CustomerStore {
    fn find_customer(&self, id: CustomerId) -> StoreResult<Option<Customer>>;

    /// ascii case-insensitive match
    fn find_customer_by_email(&self, email: &str) -> StoreResult<Option<Customer>>;

    /// insert when `id == 0`, otherwise replace; returns the stored record
    fn save_customer(&mut self, customer: Customer) -> StoreResult<Customer>;
}

pub trait LoanStore {
    /// loan with its installments, ordered by due date
    fn find_loan(&self, id: LoanId) -> StoreResult<Option<Loan>>;

    /// loans of one customer ordered by id
    fn find_loans_by_customer(
        &self,
        customer_id: CustomerId,
        filter: &LoanFilter,
    ) -> StoreResult<Vec<Loan>>;

    /// insert when `id == 0`, otherwise replace; new installments get ids too
    fn save_loan(&mut self, loan: Loan) -> StoreResult<Loan>;
}

/// unit of work over both tables
pub trait StoreTx: CustomerStore + LoanStore {
    fn commit(self) -> StoreResult<()>;
}

pub trait Store {
    type Tx<'a>: StoreTx
    where
        Self: 'a;

    /// open a transaction; concurrent writers serialise behind it
    fn begin(&self) -> StoreResult<Self::Tx<'_>>;
}

/// lets several services share one store
impl<T: Store> Store for &T {
    type Tx<'a> = T::Tx<'a>
    where
        Self: 'a;

    fn begin(&self) -> StoreResult<Self::Tx<'_>> {
        (**self).begin()
    }
}
