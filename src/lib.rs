pub mod auth;
pub mod config;
pub mod customer;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod loan;
pub mod payments;
pub mod schedule;
pub mod service;
pub mod store;
pub mod types;

// re-export key types
pub use auth::{AccessGate, Principal, PrincipalResolver, RequestContext, StaticPrincipalResolver};
pub use config::LoanPolicy;
pub use customer::{CreditLine, Customer, RegistrationRequest};
pub use decimal::{Money, Rate};
pub use errors::{ErrorResponse, LoanError, Result, StatusClass, StoreError};
pub use events::{Event, EventStore};
pub use loan::{Loan, LoanInstallment};
pub use payments::{Allocation, PaidInstallment, PaymentAllocator, PaymentWindow};
pub use schedule::InstallmentSchedule;
pub use service::{
    CreateLoanRequest, InstallmentDetail, LoanService, LoanSummary, PaymentOutcome,
    RegisteredCustomer,
};
pub use store::{CustomerStore, LoanStore, MemoryStore, Store, StoreTx};
pub use types::{CustomerId, InstallmentCount, InstallmentId, LoanFilter, LoanId, Role};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
