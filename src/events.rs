use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::types::{CustomerId, InstallmentCount, InstallmentId, LoanId, Role};

/// all events emitted by the loan service once a unit of work commits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // customer events
    CustomerRegistered {
        customer_id: CustomerId,
        role: Role,
        credit_limit: Option<Money>,
        timestamp: DateTime<Utc>,
    },

    // ledger events
    CreditLimitDebited {
        customer_id: CustomerId,
        amount: Money,
        used_credit_limit: Money,
        timestamp: DateTime<Utc>,
    },
    CreditLimitCredited {
        customer_id: CustomerId,
        amount: Money,
        used_credit_limit: Money,
        timestamp: DateTime<Utc>,
    },

    // lifecycle events
    LoanOriginated {
        loan_id: LoanId,
        customer_id: CustomerId,
        principal: Money,
        interest_rate: Rate,
        number_of_installments: InstallmentCount,
        total_amount: Money,
        timestamp: DateTime<Utc>,
    },
    InstallmentPaid {
        loan_id: LoanId,
        installment_id: InstallmentId,
        amount: Money,
        due_date: NaiveDate,
        payment_date: NaiveDate,
        payment_reference: Uuid,
    },
    LoanSettled {
        loan_id: LoanId,
        customer_id: CustomerId,
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    pub fn customer_id(&self) -> Option<CustomerId> {
        match self {
            Event::CustomerRegistered { customer_id, .. }
            | Event::CreditLimitDebited { customer_id, .. }
            | Event::CreditLimitCredited { customer_id, .. }
            | Event::LoanOriginated { customer_id, .. }
            | Event::LoanSettled { customer_id, .. } => Some(*customer_id),
            Event::InstallmentPaid { .. } => None,
        }
    }
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
