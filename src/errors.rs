use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decimal::Money;
use crate::types::{CustomerId, LoanId};

/// failures raised by a backing store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {message}")]
    Unavailable {
        message: String,
    },

    #[error("{entity} {id} does not exist")]
    Missing {
        entity: &'static str,
        id: i64,
    },

    #[error("store rejected write: {message}")]
    Rejected {
        message: String,
    },
}

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("Customer not found with ID: {customer_id}")]
    CustomerNotFound {
        customer_id: CustomerId,
    },

    #[error("Loan not found with ID: {loan_id}")]
    LoanNotFound {
        loan_id: LoanId,
    },

    #[error("Access denied. Customer {} cannot access data for customer {target}", caller_label(.caller))]
    AccessDenied {
        target: CustomerId,
        caller: Option<CustomerId>,
    },

    #[error("Authentication required. Please provide valid credentials")]
    AuthenticationRequired,

    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },

    #[error("Input validation failed: {}", .details.join("; "))]
    Validation {
        details: Vec<String>,
    },

    #[error("Admin users cannot create loans. Only customers with credit limits can create loans.")]
    AdminCannotCreateLoan,

    #[error("Insufficient credit limit. Available: {available}, Required: {required}")]
    InsufficientCreditLimit {
        available: Money,
        required: Money,
    },

    #[error("Loan with ID {loan_id} is already fully paid")]
    LoanAlreadyPaid {
        loan_id: LoanId,
    },

    #[error("No installments available for payment within the next {window_months} months for loan ID: {loan_id}")]
    NoPayableInstallments {
        loan_id: LoanId,
        window_months: u32,
    },

    #[error("Payment amount {provided} is insufficient. Minimum amount required to pay at least one installment: {minimum}")]
    InvalidPaymentAmount {
        provided: Money,
        minimum: Money,
    },

    #[error("Email already registered: {email}")]
    DuplicateEmail {
        email: String,
    },

    #[error("Loan installments data is corrupted for loan ID {loan_id}: {message}")]
    DataIntegrity {
        loan_id: LoanId,
        message: String,
    },

    #[error("{context}")]
    DataAccess {
        context: String,
        #[source]
        source: StoreError,
    },

    #[error("credit ledger violation: {message}")]
    CreditLedger {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("calculation error: {message}")]
    CalculationError {
        message: String,
    },
}

fn caller_label(caller: &Option<CustomerId>) -> String {
    caller.map_or_else(|| "<anonymous>".to_string(), |id| id.to_string())
}

pub type Result<T> = std::result::Result<T, LoanError>;

/// http-equivalent status class of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusClass {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Internal,
}

impl StatusClass {
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusClass::BadRequest => 400,
            StatusClass::Unauthorized => 401,
            StatusClass::Forbidden => 403,
            StatusClass::NotFound => 404,
            StatusClass::Conflict => 409,
            StatusClass::Internal => 500,
        }
    }
}

impl LoanError {
    pub fn invalid_parameter(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter,
            reason: reason.into(),
        }
    }

    pub fn data_access(context: impl Into<String>, source: StoreError) -> Self {
        Self::DataAccess {
            context: context.into(),
            source,
        }
    }

    /// stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            LoanError::CustomerNotFound { .. } => "CUSTOMER_NOT_FOUND",
            LoanError::LoanNotFound { .. } => "LOAN_NOT_FOUND",
            LoanError::AccessDenied { .. } => "CUSTOMER_ACCESS_DENIED",
            LoanError::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            LoanError::InvalidParameter { .. } => "INVALID_PARAMETER",
            LoanError::Validation { .. } => "VALIDATION_FAILED",
            LoanError::AdminCannotCreateLoan => "ADMIN_CANNOT_CREATE_LOAN",
            LoanError::InsufficientCreditLimit { .. } => "INSUFFICIENT_CREDIT_LIMIT",
            LoanError::LoanAlreadyPaid { .. } => "LOAN_ALREADY_PAID",
            LoanError::NoPayableInstallments { .. } => "NO_PAYABLE_INSTALLMENTS",
            LoanError::InvalidPaymentAmount { .. } => "INVALID_PAYMENT_AMOUNT",
            LoanError::DuplicateEmail { .. } => "DUPLICATE_EMAIL",
            LoanError::DataIntegrity { .. } | LoanError::DataAccess { .. } => {
                "LOAN_DATA_ACCESS_ERROR"
            }
            LoanError::CreditLedger { .. } | LoanError::CalculationError { .. } => {
                "INTERNAL_SERVER_ERROR"
            }
            LoanError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
        }
    }

    pub fn status(&self) -> StatusClass {
        match self {
            LoanError::CustomerNotFound { .. } | LoanError::LoanNotFound { .. } => {
                StatusClass::NotFound
            }
            LoanError::AccessDenied { .. } | LoanError::AdminCannotCreateLoan => {
                StatusClass::Forbidden
            }
            LoanError::AuthenticationRequired => StatusClass::Unauthorized,
            LoanError::DuplicateEmail { .. } => StatusClass::Conflict,
            LoanError::InvalidParameter { .. }
            | LoanError::Validation { .. }
            | LoanError::InsufficientCreditLimit { .. }
            | LoanError::LoanAlreadyPaid { .. }
            | LoanError::NoPayableInstallments { .. }
            | LoanError::InvalidPaymentAmount { .. } => StatusClass::BadRequest,
            LoanError::DataIntegrity { .. }
            | LoanError::DataAccess { .. }
            | LoanError::CreditLedger { .. }
            | LoanError::InvalidConfiguration { .. }
            | LoanError::CalculationError { .. } => StatusClass::Internal,
        }
    }

    /// build the wire error body
    pub fn to_response(&self) -> ErrorResponse {
        let details = match self {
            LoanError::Validation { details } => details.clone(),
            _ => Vec::new(),
        };

        // storage internals never reach the caller
        let message = match self {
            LoanError::CreditLedger { .. } | LoanError::CalculationError { .. } => {
                "An unexpected error occurred".to_string()
            }
            _ => self.to_string(),
        };

        ErrorResponse {
            error: self.code().to_string(),
            message,
            status: self.status().as_u16(),
            details,
        }
    }
}

/// serialisable error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}
