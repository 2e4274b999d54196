use serde::{Deserialize, Serialize};
use std::fmt;

/// unique identifier for a customer
pub type CustomerId = i64;

/// unique identifier for a loan
pub type LoanId = i64;

/// unique identifier for a loan installment
pub type InstallmentId = i64;

/// role carried by a customer record and by the authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// borrower with a credit limit
    Customer,
    /// back-office user, may act on any customer, never owns loans
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Customer => write!(f, "CUSTOMER"),
            Role::Admin => write!(f, "ADMIN"),
        }
    }
}

/// schedule lengths a loan can be originated with
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum InstallmentCount {
    Six,
    Nine,
    Twelve,
    TwentyFour,
}

impl InstallmentCount {
    pub const ALL: [InstallmentCount; 4] = [
        InstallmentCount::Six,
        InstallmentCount::Nine,
        InstallmentCount::Twelve,
        InstallmentCount::TwentyFour,
    ];

    pub fn months(&self) -> u32 {
        match self {
            InstallmentCount::Six => 6,
            InstallmentCount::Nine => 9,
            InstallmentCount::Twelve => 12,
            InstallmentCount::TwentyFour => 24,
        }
    }

    /// parse a raw count, None for anything outside {6, 9, 12, 24}
    pub fn from_months(months: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.months() == months)
    }
}

impl TryFrom<u32> for InstallmentCount {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        InstallmentCount::from_months(value)
            .ok_or_else(|| format!("unsupported number of installments: {}", value))
    }
}

impl From<InstallmentCount> for u32 {
    fn from(count: InstallmentCount) -> Self {
        count.months()
    }
}

impl fmt::Display for InstallmentCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.months())
    }
}

/// optional filters applied when listing a customer's loans
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoanFilter {
    pub is_paid: Option<bool>,
    pub number_of_installments: Option<InstallmentCount>,
}

impl LoanFilter {
    pub fn matches(&self, is_paid: bool, count: InstallmentCount) -> bool {
        self.is_paid.map_or(true, |p| p == is_paid)
            && self.number_of_installments.map_or(true, |n| n == count)
    }
}
