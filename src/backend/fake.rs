//! An in-memory [Backend] for tests.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;

use crate::{deposit_kind::DepositKind, validation::DepositTerms};

use super::{
    AccountTrend, Backend, BackendError, ChartSlice, Customer, DashboardStats, DepositAccount,
    LogInRequest, Loan, LoanTrend, PaymentRequest, SavingsAccount, SavingsTransaction, StaffUser,
    TransactionType,
};

/// Canned dashboard responses, the same for every branch.
#[derive(Debug, Clone, Default)]
pub struct FakeDashboard {
    pub stats: DashboardStats,
    pub account_trends: Vec<AccountTrend>,
    pub loan_trends: Vec<LoanTrend>,
    pub loan_types: Vec<ChartSlice>,
    pub account_distribution: Vec<ChartSlice>,
}

#[derive(Debug, Default)]
struct FakeState {
    savings_accounts: Vec<SavingsAccount>,
    transactions: HashMap<String, Vec<SavingsTransaction>>,
    customers: Vec<Customer>,
    deposits: HashMap<(DepositKind, i64), Vec<DepositAccount>>,
    branches: Vec<String>,
    loans: Vec<Loan>,
    dashboard: FakeDashboard,
    dashboard_branches: Vec<Option<String>>,
    staff: HashMap<String, (String, StaffUser)>,
    failing_lookups: HashMap<i64, BackendError>,
    read_error: Option<BackendError>,
    write_error: Option<BackendError>,
    payments: Vec<(String, PaymentRequest)>,
    next_id: i64,
}

/// Stores everything in memory and can be told to fail specific calls.
#[derive(Debug, Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    /// Register a staff member who can log in with `email` and `password`.
    pub fn add_staff(&self, email: &str, password: &str, user: StaffUser) {
        self.state
            .lock()
            .unwrap()
            .staff
            .insert(email.to_owned(), (password.to_owned(), user));
    }

    pub fn add_savings_account(&self, account_number: &str, name: &str, balance: f64) {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;

        state.savings_accounts.push(SavingsAccount {
            id,
            name: name.to_owned(),
            account_number: account_number.to_owned(),
            created_at: "2024-01-01T10:00:00".to_owned(),
            status: "ACTIVE".to_owned(),
            current_balance: balance,
            interest_rate: 3.5,
        });
    }

    pub fn add_transaction(&self, account_number: &str, transaction: SavingsTransaction) {
        self.state
            .lock()
            .unwrap()
            .transactions
            .entry(account_number.to_owned())
            .or_default()
            .push(transaction);
    }

    pub fn add_customer(&self, user_id: i64, name: &str, branch: &str) -> Customer {
        let customer = Customer {
            user_id,
            first_name: name.to_owned(),
            middle_name: None,
            last_name: String::new(),
            mobile: Some(format!("98765{user_id:05}")),
            email: None,
            address: None,
            branch: Some(branch.to_owned()),
            created_at: format!("2024-01-{:02}T10:00:00", user_id.clamp(1, 28)),
        };

        self.state.lock().unwrap().customers.push(customer.clone());

        customer
    }

    pub fn add_deposit(
        &self,
        kind: DepositKind,
        customer_id: i64,
        account_number: &str,
        amount: f64,
    ) {
        self.state
            .lock()
            .unwrap()
            .deposits
            .entry((kind, customer_id))
            .or_default()
            .push(DepositAccount {
                account_number: account_number.to_owned(),
                amount,
                interest_rate: 7.0,
                tenure_months: 12,
                maturity_amount: None,
                maturity_date: None,
                status: "ACTIVE".to_owned(),
                created_at: "2024-02-01T10:00:00".to_owned(),
            });
    }

    pub fn set_branches(&self, branches: &[&str]) {
        self.state.lock().unwrap().branches =
            branches.iter().map(|branch| (*branch).to_owned()).collect();
    }

    pub fn add_loan(&self, loan: Loan) {
        self.state.lock().unwrap().loans.push(loan);
    }

    pub fn set_dashboard(&self, dashboard: FakeDashboard) {
        self.state.lock().unwrap().dashboard = dashboard;
    }

    /// The branch named by each dashboard request so far.
    pub fn dashboard_branches(&self) -> Vec<Option<String>> {
        self.state.lock().unwrap().dashboard_branches.clone()
    }

    /// Like [FakeBackend::read], also noting the branch a dashboard request names.
    fn read_dashboard<T>(
        &self,
        branch: Option<&str>,
        get: impl FnOnce(&FakeState) -> T,
    ) -> Result<T, BackendError> {
        self.state
            .lock()
            .unwrap()
            .dashboard_branches
            .push(branch.map(str::to_owned));

        self.read(get)
    }

    /// Make every deposit lookup for `customer_id` fail with `error`.
    pub fn fail_deposit_lookup(&self, customer_id: i64, error: BackendError) {
        self.state
            .lock()
            .unwrap()
            .failing_lookups
            .insert(customer_id, error);
    }

    /// Make every list call fail with `error`.
    pub fn fail_reads(&self, error: BackendError) {
        self.state.lock().unwrap().read_error = Some(error);
    }

    /// Make every create, update, delete and payment call fail with `error`.
    pub fn fail_writes(&self, error: BackendError) {
        self.state.lock().unwrap().write_error = Some(error);
    }

    /// The payments recorded so far, oldest first.
    pub fn payments(&self) -> Vec<(String, PaymentRequest)> {
        self.state.lock().unwrap().payments.clone()
    }

    /// The `kind` accounts currently held by `customer_id`.
    pub fn deposits_of(&self, kind: DepositKind, customer_id: i64) -> Vec<DepositAccount> {
        self.state
            .lock()
            .unwrap()
            .deposits
            .get(&(kind, customer_id))
            .cloned()
            .unwrap_or_default()
    }

    fn read<T>(&self, get: impl FnOnce(&FakeState) -> T) -> Result<T, BackendError> {
        let state = self.state.lock().unwrap();

        match &state.read_error {
            Some(error) => Err(error.clone()),
            None => Ok(get(&state)),
        }
    }

    fn write(&self, change: impl FnOnce(&mut FakeState)) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();

        match &state.write_error {
            Some(error) => Err(error.clone()),
            None => {
                change(&mut state);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn log_in(&self, credentials: &LogInRequest) -> Result<StaffUser, BackendError> {
        let found = self.read(|state| {
            state
                .staff
                .get(&credentials.email)
                .filter(|(password, _)| *password == credentials.password)
                .map(|(_, user)| user.clone())
        })?;

        found.ok_or_else(|| BackendError::Status {
            status: 401,
            body: "Invalid email or password".to_owned(),
        })
    }

    async fn list_savings_accounts(&self) -> Result<Vec<SavingsAccount>, BackendError> {
        self.read(|state| state.savings_accounts.clone())
    }

    async fn list_savings_transactions(
        &self,
        account_number: &str,
    ) -> Result<Vec<SavingsTransaction>, BackendError> {
        self.read(|state| {
            state
                .transactions
                .get(account_number)
                .cloned()
                .unwrap_or_default()
        })
    }

    async fn record_payment(
        &self,
        account_number: &str,
        payment: &PaymentRequest,
    ) -> Result<(), BackendError> {
        self.write(|state| {
            let change = match payment.transaction_type {
                TransactionType::Credit => payment.amount,
                TransactionType::Debit => -payment.amount,
            };

            if let Some(account) = state
                .savings_accounts
                .iter_mut()
                .find(|account| account.account_number == account_number)
            {
                account.current_balance += change;
            }

            state
                .payments
                .push((account_number.to_owned(), payment.clone()));
        })
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, BackendError> {
        self.read(|state| state.customers.clone())
    }

    async fn list_deposits(
        &self,
        kind: DepositKind,
        customer_id: i64,
    ) -> Result<Vec<DepositAccount>, BackendError> {
        let state = self.state.lock().unwrap();

        if let Some(error) = state.failing_lookups.get(&customer_id) {
            return Err(error.clone());
        }

        Ok(state
            .deposits
            .get(&(kind, customer_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn create_deposit(
        &self,
        kind: DepositKind,
        customer_id: i64,
        terms: &DepositTerms,
    ) -> Result<(), BackendError> {
        self.write(|state| {
            state.next_id += 1;
            let account_number = format!("{}{:04}", kind.abbreviation(), state.next_id);

            state
                .deposits
                .entry((kind, customer_id))
                .or_default()
                .push(DepositAccount {
                    account_number,
                    amount: terms.amount,
                    interest_rate: terms.interest_rate,
                    tenure_months: terms.tenure_months,
                    maturity_amount: None,
                    maturity_date: None,
                    status: "ACTIVE".to_owned(),
                    created_at: "2024-03-01T10:00:00".to_owned(),
                });
        })
    }

    async fn update_deposit(
        &self,
        kind: DepositKind,
        account_number: &str,
        terms: &DepositTerms,
    ) -> Result<(), BackendError> {
        self.write(|state| {
            let account = state
                .deposits
                .iter_mut()
                .filter(|((account_kind, _), _)| *account_kind == kind)
                .flat_map(|(_, accounts)| accounts.iter_mut())
                .find(|account| account.account_number == account_number);

            if let Some(account) = account {
                account.amount = terms.amount;
                account.interest_rate = terms.interest_rate;
                account.tenure_months = terms.tenure_months;
            }
        })
    }

    async fn delete_deposit(
        &self,
        kind: DepositKind,
        account_number: &str,
    ) -> Result<(), BackendError> {
        self.write(|state| {
            for ((account_kind, _), accounts) in state.deposits.iter_mut() {
                if *account_kind == kind {
                    accounts.retain(|account| account.account_number != account_number);
                }
            }
        })
    }

    async fn delete_all_deposits(
        &self,
        kind: DepositKind,
        customer_id: i64,
    ) -> Result<(), BackendError> {
        self.write(|state| {
            state.deposits.remove(&(kind, customer_id));
        })
    }

    async fn list_branches(&self) -> Result<Vec<String>, BackendError> {
        self.read(|state| state.branches.clone())
    }

    async fn list_loans(&self) -> Result<Vec<Loan>, BackendError> {
        self.read(|state| state.loans.clone())
    }

    async fn dashboard_stats(&self, branch: Option<&str>) -> Result<DashboardStats, BackendError> {
        self.read_dashboard(branch, |state| state.dashboard.stats.clone())
    }

    async fn account_trends(
        &self,
        branch: Option<&str>,
    ) -> Result<Vec<AccountTrend>, BackendError> {
        self.read_dashboard(branch, |state| state.dashboard.account_trends.clone())
    }

    async fn loan_trends(&self, branch: Option<&str>) -> Result<Vec<LoanTrend>, BackendError> {
        self.read_dashboard(branch, |state| state.dashboard.loan_trends.clone())
    }

    async fn loan_types(&self, branch: Option<&str>) -> Result<Vec<ChartSlice>, BackendError> {
        self.read_dashboard(branch, |state| state.dashboard.loan_types.clone())
    }

    async fn account_distribution(
        &self,
        branch: Option<&str>,
    ) -> Result<Vec<ChartSlice>, BackendError> {
        self.read_dashboard(branch, |state| state.dashboard.account_distribution.clone())
    }

    async fn recent_customers(&self, branch: Option<&str>) -> Result<Vec<Customer>, BackendError> {
        self.read_dashboard(branch, |state| {
            let mut customers: Vec<Customer> = state
                .customers
                .iter()
                .filter(|customer| branch.is_none() || customer.branch.as_deref() == branch)
                .cloned()
                .collect();
            customers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            customers.truncate(5);

            customers
        })
    }
}
