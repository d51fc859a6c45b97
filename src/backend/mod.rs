//! The REST backend that owns customers, accounts, balances and loans.
//!
//! Handlers talk to the backend through the [Backend] trait so that tests can
//! swap in an in-memory fake.

mod http;
mod models;

#[cfg(test)]
mod fake;

use async_trait::async_trait;

use crate::{deposit_kind::DepositKind, validation::DepositTerms};

pub use http::{ApiPaths, DashboardPaths, DepositPaths, HttpBackend};
pub use models::{
    AccountTrend, ChartSlice, Customer, DashboardStats, DepositAccount, LoanTrend, LogInRequest,
    Loan, PaymentMode, PaymentRequest, SavingsAccount, SavingsTransaction, StaffRole, StaffUser,
    TransactionType,
};

#[cfg(test)]
pub use fake::{FakeBackend, FakeDashboard};

/// The ways a call to the backend can fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    /// The request could not be sent or the connection failed.
    #[error("could not reach the backend: {0}")]
    Transport(String),

    /// The backend did not answer before the client-side timeout.
    #[error("the backend did not respond in time")]
    Timeout,

    /// The backend answered with a non-success status.
    #[error("the backend responded with status {status}: {body}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The response body, which usually holds the backend's error message.
        body: String,
    },

    /// The backend answered with a body that could not be decoded.
    #[error("could not decode the backend response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Whether the backend rejected the request because of a foreign key
    /// constraint, e.g. deleting accounts that still have transactions.
    pub fn is_foreign_key_violation(&self) -> bool {
        match self {
            BackendError::Status { body, .. } => body.to_lowercase().contains("foreign key constraint"),
            _ => false,
        }
    }

    /// Whether the backend rejected a log-in attempt.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, BackendError::Status { status: 401 | 403, .. })
    }
}

/// The operations the dashboard needs from the REST backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Check a staff member's credentials.
    async fn log_in(&self, credentials: &LogInRequest) -> Result<StaffUser, BackendError>;

    /// Every savings account.
    async fn list_savings_accounts(&self) -> Result<Vec<SavingsAccount>, BackendError>;

    /// Every transaction on the savings account `account_number`.
    async fn list_savings_transactions(
        &self,
        account_number: &str,
    ) -> Result<Vec<SavingsTransaction>, BackendError>;

    /// Record a credit or a withdrawal, depending on the payment's
    /// transaction type.
    async fn record_payment(
        &self,
        account_number: &str,
        payment: &PaymentRequest,
    ) -> Result<(), BackendError>;

    /// Every registered customer.
    async fn list_customers(&self) -> Result<Vec<Customer>, BackendError>;

    /// The `kind` accounts held by the customer `customer_id`.
    ///
    /// A customer without accounts yields an empty list, not an error.
    async fn list_deposits(
        &self,
        kind: DepositKind,
        customer_id: i64,
    ) -> Result<Vec<DepositAccount>, BackendError>;

    /// Open a new `kind` account for the customer `customer_id`.
    async fn create_deposit(
        &self,
        kind: DepositKind,
        customer_id: i64,
        terms: &DepositTerms,
    ) -> Result<(), BackendError>;

    /// Change the terms of the `kind` account `account_number`.
    async fn update_deposit(
        &self,
        kind: DepositKind,
        account_number: &str,
        terms: &DepositTerms,
    ) -> Result<(), BackendError>;

    /// Close the `kind` account `account_number`.
    async fn delete_deposit(
        &self,
        kind: DepositKind,
        account_number: &str,
    ) -> Result<(), BackendError>;

    /// Close every `kind` account of the customer `customer_id`.
    async fn delete_all_deposits(
        &self,
        kind: DepositKind,
        customer_id: i64,
    ) -> Result<(), BackendError>;

    /// The names of every branch.
    async fn list_branches(&self) -> Result<Vec<String>, BackendError>;

    /// Every sanctioned loan.
    async fn list_loans(&self) -> Result<Vec<Loan>, BackendError>;

    /// The dashboard totals for `branch`, or for every branch if `None`.
    async fn dashboard_stats(&self, branch: Option<&str>) -> Result<DashboardStats, BackendError>;

    /// Monthly account balances by kind.
    async fn account_trends(
        &self,
        branch: Option<&str>,
    ) -> Result<Vec<AccountTrend>, BackendError>;

    /// Monthly loan disbursements and repayments.
    async fn loan_trends(&self, branch: Option<&str>) -> Result<Vec<LoanTrend>, BackendError>;

    /// Loans counted by loan type.
    async fn loan_types(&self, branch: Option<&str>) -> Result<Vec<ChartSlice>, BackendError>;

    /// Accounts counted by account kind.
    async fn account_distribution(
        &self,
        branch: Option<&str>,
    ) -> Result<Vec<ChartSlice>, BackendError>;

    /// The most recently registered customers, newest first.
    async fn recent_customers(&self, branch: Option<&str>) -> Result<Vec<Customer>, BackendError>;
}
