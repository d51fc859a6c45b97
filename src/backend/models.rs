//! The JSON shapes exchanged with the REST backend.

use serde::{Deserialize, Serialize};

use crate::sentinel::{na, no};

/// A customer's savings account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsAccount {
    /// The backend's ID for the account holder.
    pub id: i64,
    /// The account holder's name.
    pub name: String,
    /// The account number, unique across savings accounts.
    pub account_number: String,
    /// When the account was opened, in one of the backend's timestamp formats.
    pub created_at: String,
    /// "ACTIVE" or another status string.
    #[serde(default)]
    pub status: String,
    /// The balance as last reported by the backend.
    pub current_balance: f64,
    /// The annual interest rate in percent.
    #[serde(default)]
    pub interest_rate: f64,
}

impl SavingsAccount {
    /// Whether the backend reports the account as active.
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("ACTIVE")
    }
}

/// Whether money went into or out of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// A deposit.
    Credit,
    /// A withdrawal.
    Debit,
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
    /// Cash over the counter.
    #[serde(rename = "CASH")]
    Cash,
    /// An electronic transfer identified by a UTR number.
    #[serde(rename = "IMPS")]
    Imps,
    /// A cheque identified by its number.
    #[serde(rename = "Cheque")]
    Cheque,
}

impl PaymentMode {
    /// Every payment mode, in the order shown in forms.
    pub const ALL: [PaymentMode; 3] = [PaymentMode::Cash, PaymentMode::Imps, PaymentMode::Cheque];

    /// The wire value, also used as the form value.
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMode::Cash => "CASH",
            PaymentMode::Imps => "IMPS",
            PaymentMode::Cheque => "Cheque",
        }
    }

    /// Parse a wire or form value.
    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == value)
    }
}

/// A single credit or debit on a savings account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsTransaction {
    /// The backend's ID for the transaction.
    pub id: i64,
    /// The amount in rupees.
    pub amount: f64,
    /// The payment mode as sent by the backend, e.g. "CASH".
    #[serde(default)]
    pub pay_mode: String,
    /// The UTR number of an IMPS payment.
    #[serde(default, with = "na")]
    pub utr_no: Option<String>,
    /// The cash amount of a cash payment.
    #[serde(default, with = "na")]
    pub cash: Option<String>,
    /// The cheque number of a cheque payment.
    #[serde(default, with = "na")]
    pub cheque_number: Option<String>,
    /// A free text note.
    #[serde(default, with = "no")]
    pub note: Option<String>,
    /// When the transaction was recorded, in one of the backend's timestamp formats.
    pub created_at: String,
    /// Whether this was a credit or a debit.
    pub transaction_type: TransactionType,
}

/// The body sent to record a credit or a withdrawal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// The amount in rupees.
    pub amount: f64,
    /// How the payment was made.
    pub pay_mode: PaymentMode,
    /// The UTR number, only for IMPS payments.
    #[serde(with = "na")]
    pub utr_no: Option<String>,
    /// The amount as text, only for cash payments.
    #[serde(with = "na")]
    pub cash: Option<String>,
    /// The cheque number, only for cheque payments.
    #[serde(with = "na")]
    pub cheque_number: Option<String>,
    /// A free text note.
    #[serde(with = "no")]
    pub note: Option<String>,
    /// Whether this is a credit or a withdrawal.
    pub transaction_type: TransactionType,
}

/// A customer registered with the institution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// The backend's ID for the customer.
    pub user_id: i64,
    /// The customer's first name.
    pub first_name: String,
    /// The customer's middle name, if any.
    #[serde(default, with = "na")]
    pub middle_name: Option<String>,
    /// The customer's last name.
    #[serde(default)]
    pub last_name: String,
    /// The customer's mobile number.
    #[serde(default, with = "na")]
    pub mobile: Option<String>,
    /// The customer's email address.
    #[serde(default, with = "na")]
    pub email: Option<String>,
    /// The customer's postal address.
    #[serde(default, with = "na")]
    pub address: Option<String>,
    /// The branch the customer is registered with.
    #[serde(default, with = "na")]
    pub branch: Option<String>,
    /// When the customer registered, in one of the backend's timestamp formats.
    #[serde(default)]
    pub created_at: String,
}

impl Customer {
    /// The customer's name with any middle name, e.g. "Sunita K Rao".
    pub fn full_name(&self) -> String {
        [
            Some(self.first_name.as_str()),
            self.middle_name.as_deref(),
            Some(self.last_name.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// A fixed or recurring deposit account held by a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositAccount {
    /// The deposit's account number.
    pub account_number: String,
    /// The principal of a fixed deposit or the monthly amount of a recurring deposit.
    #[serde(alias = "principalAmount", alias = "depositAmount")]
    pub amount: f64,
    /// The annual interest rate in percent.
    pub interest_rate: f64,
    /// The tenure in months.
    pub tenure_months: u32,
    /// The maturity amount computed by the backend.
    #[serde(default)]
    pub maturity_amount: Option<f64>,
    /// The maturity date computed by the backend.
    #[serde(default)]
    pub maturity_date: Option<String>,
    /// The account status, e.g. "ACTIVE".
    #[serde(default)]
    pub status: String,
    /// When the deposit was opened.
    #[serde(default)]
    pub created_at: String,
}

/// A sanctioned loan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Loan {
    /// The backend's ID for the loan.
    pub id: i64,
    /// The loan application number.
    pub application_no: String,
    /// The borrowing member's name.
    pub member_name: String,
    /// The member's father's name.
    #[serde(with = "na")]
    pub father_name: Option<String>,
    /// The member's mobile number.
    #[serde(with = "na")]
    pub mobile: Option<String>,
    /// The branch that sanctioned the loan.
    pub branch_name: String,
    /// What the loan is for.
    #[serde(with = "na")]
    pub purpose_of_loan: Option<String>,
    /// The loan scheme, if any.
    #[serde(with = "na")]
    pub loan_scheme: Option<String>,
    /// The sanctioned amount in rupees.
    pub loan_amount: f64,
    /// The annual rate of interest in percent.
    pub roi: f64,
    /// The tenure in months.
    pub tenure: u32,
    /// The monthly instalment in rupees.
    pub emi_amount: f64,
    /// The processing fee in rupees.
    pub processing_fee: f64,
    /// The amount actually disbursed in rupees.
    pub disbursed_amount: f64,
    /// The date the application was made.
    pub applied_date: String,
    /// The date the member joined.
    pub date_of_joining: String,
    /// The kind of membership.
    #[serde(with = "na")]
    pub member_type: Option<String>,
    /// The member's address.
    #[serde(with = "na")]
    pub address: Option<String>,
    /// The member's PAN.
    #[serde(with = "na")]
    pub pan_number: Option<String>,
    /// The member's Aadhaar number.
    #[serde(with = "na")]
    pub adhaar_number: Option<String>,
    /// The guarantor's name.
    #[serde(with = "na")]
    pub grantor_name: Option<String>,
    /// The guarantor's address.
    #[serde(with = "na")]
    pub grantor_address: Option<String>,
    /// The guarantor's mobile number.
    #[serde(with = "na")]
    pub grantor_mobile: Option<String>,
    /// The nominee's name.
    #[serde(with = "na")]
    pub nominee_name: Option<String>,
    /// The nominee's address.
    #[serde(with = "na")]
    pub nominee_address: Option<String>,
    /// The nominee's mobile number.
    #[serde(with = "na")]
    pub nominee_mobile: Option<String>,
}

/// The headline totals shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    /// The number of registered customers.
    pub total_users: u64,
    /// The balance of every savings account in rupees.
    pub total_savings: f64,
    /// The principal of every fixed deposit in rupees.
    pub total_fd: f64,
    /// The balance of every recurring deposit in rupees.
    pub total_rd: f64,
    /// The amount of every disbursed loan in rupees.
    pub total_loans: f64,
}

/// Account balances by kind for one month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountTrend {
    /// The month label, e.g. "Jan".
    pub name: String,
    /// Savings balances in rupees.
    pub savings: f64,
    /// Fixed deposit balances in rupees.
    pub fd: f64,
    /// Recurring deposit balances in rupees.
    pub rd: f64,
}

/// Loan money out and back in for one month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanTrend {
    /// The month label, e.g. "Jan".
    pub name: String,
    /// Disbursed in rupees.
    pub loans: f64,
    /// Repaid in rupees.
    pub repaid: f64,
}

/// One named share of a whole, e.g. the number of fixed deposit accounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSlice {
    /// What the share counts.
    pub name: String,
    /// The size of the share.
    pub value: f64,
}

/// The credentials sent to log a staff member in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogInRequest {
    /// The staff member's email address.
    pub email: String,
    /// The staff member's password.
    pub password: String,
}

/// What a staff member may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    /// Sees every branch.
    SuperAdmin,
    /// Sees their own branch.
    Admin,
    /// Any other role, treated like [StaffRole::Admin].
    #[serde(other)]
    Staff,
}

/// A logged in staff member, as returned by the log-in endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffUser {
    /// The staff member's display name.
    #[serde(default)]
    pub name: String,
    /// The branch the staff member works at.
    #[serde(default, with = "na")]
    pub branch_name: Option<String>,
    /// The staff member's role.
    pub role: StaffRole,
}
