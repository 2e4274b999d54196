//! loan service: the only entry point that touches the store
//!
//! Every operation takes the calling [`Principal`] explicitly, runs inside one
//! store transaction and publishes its events only after that transaction has
//! committed.

mod origination;
mod payment;
mod query;

use chrono::{DateTime, NaiveDate, Utc};
use hourglass_rs::SafeTimeProvider;
use parking_lot::Mutex;

use crate::auth::{self, Principal, PrincipalResolver, RequestContext};
use crate::config::LoanPolicy;
use crate::errors::{LoanError, Result, StoreError};
use crate::events::{Event, EventStore};
use crate::payments::{PaymentAllocator, PaymentWindow};
use crate::store::{Store, StoreTx};

pub use origination::{CreateLoanRequest, RegisteredCustomer};
pub use payment::PaymentOutcome;
pub use query::{InstallmentDetail, LoanSummary};

pub struct LoanService<'t, S: Store> {
    store: S,
    policy: LoanPolicy,
    allocator: PaymentAllocator,
    time: &'t SafeTimeProvider,
    events: Mutex<EventStore>,
}

impl<'t, S: Store> LoanService<'t, S> {
    pub fn new(store: S, policy: LoanPolicy, time: &'t SafeTimeProvider) -> Result<Self> {
        policy.validate()?;
        let allocator = PaymentAllocator::new(PaymentWindow::new(policy.payment_window_months));

        Ok(Self {
            store,
            policy,
            allocator,
            time,
            events: Mutex::new(EventStore::new()),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> &LoanPolicy {
        &self.policy
    }

    /// drain events published by committed operations
    pub fn take_events(&self) -> Vec<Event> {
        self.events.lock().take_events()
    }

    /// resolve the request's caller, anonymous requests are rejected
    pub fn authenticate<R: PrincipalResolver + ?Sized>(
        &self,
        resolver: &R,
        ctx: &RequestContext,
    ) -> Result<Principal> {
        auth::authenticate(resolver, ctx).inspect_err(|_| {
            tracing::warn!(
                has_token = ctx.bearer_token.is_some(),
                "request could not be authenticated"
            );
        })
    }

    fn now(&self) -> DateTime<Utc> {
        self.time.now()
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    fn begin(&self, context: &str) -> Result<S::Tx<'_>> {
        self.store
            .begin()
            .map_err(|source| store_failure(context, source))
    }

    fn commit<'s>(&'s self, tx: S::Tx<'s>, context: &str) -> Result<()> {
        tx.commit().map_err(|source| store_failure(context, source))
    }

    fn publish(&self, events: Vec<Event>) {
        self.events.lock().extend(events);
    }
}

/// wrap a store failure without leaking it to the caller
fn store_failure(context: &str, source: StoreError) -> LoanError {
    tracing::error!(error = %source, "{}", context);
    LoanError::data_access(context, source)
}

fn ensure_positive_id(parameter: &'static str, id: i64) -> Result<()> {
    if id <= 0 {
        return Err(LoanError::invalid_parameter(parameter, "must be a positive number"));
    }
    Ok(())
}
