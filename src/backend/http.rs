//! A [Backend] that talks to the REST backend over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    deposit_kind::DepositKind,
    endpoints::format_endpoint,
    validation::DepositTerms,
};

use super::{
    AccountTrend, Backend, BackendError, ChartSlice, Customer, DashboardStats, DepositAccount,
    LogInRequest, Loan, LoanTrend, PaymentRequest, SavingsAccount, SavingsTransaction, StaffUser,
    TransactionType,
};

/// The paths of the deposit endpoints for one deposit kind.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DepositPaths {
    /// `GET` the accounts of a customer. Takes `{user_id}`.
    pub list: String,
    /// `POST` a new account for a customer. Takes `{user_id}`.
    pub create: String,
    /// `PATCH` an account. Takes `{account_number}`.
    pub update: String,
    /// `DELETE` an account. Takes `{account_number}`.
    pub delete: String,
    /// `DELETE` every account of a customer. Takes `{user_id}`.
    pub delete_all: String,
}

/// The path templates of every backend endpoint.
///
/// Parameters are written in braces, e.g. `{account_number}`, and are
/// substituted in order. Any path left out of a configuration file keeps its
/// default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiPaths {
    /// `POST` staff credentials.
    pub log_in: String,
    /// `GET` every savings account.
    pub savings_accounts: String,
    /// `GET` the transactions of a savings account. Takes `{account_number}`.
    pub savings_transactions: String,
    /// `POST` a credit to a savings account. Takes `{account_number}`.
    pub savings_credit: String,
    /// `POST` a withdrawal from a savings account. Takes `{account_number}`.
    pub savings_withdraw: String,
    /// `GET` every customer.
    pub customers: String,
    /// The fixed deposit endpoints.
    pub fixed_deposits: DepositPaths,
    /// The recurring deposit endpoints.
    pub recurring_deposits: DepositPaths,
    /// `GET` the branch names, served by the loans backend.
    pub branches: String,
    /// `GET` every sanctioned loan, served by the loans backend.
    pub loans: String,
    /// The dashboard endpoints.
    pub dashboard: DashboardPaths,
}

/// The paths of the dashboard endpoints.
///
/// Each takes an optional `branchName` query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DashboardPaths {
    /// `GET` the headline totals.
    pub stats: String,
    /// `GET` monthly account balances by kind.
    pub account_trends: String,
    /// `GET` monthly loan disbursements and repayments.
    pub loan_trends: String,
    /// `GET` loans counted by type.
    pub loan_types: String,
    /// `GET` accounts counted by kind.
    pub account_distribution: String,
    /// `GET` the newest customers.
    pub recent_customers: String,
}

impl Default for DashboardPaths {
    fn default() -> Self {
        Self {
            stats: "/api/dashboard/stats".to_owned(),
            account_trends: "/api/dashboard/account-trends".to_owned(),
            loan_trends: "/api/dashboard/loan-trends".to_owned(),
            loan_types: "/api/dashboard/loan-types".to_owned(),
            account_distribution: "/api/dashboard/account-distribution".to_owned(),
            recent_customers: "/api/dashboard/recent-customers".to_owned(),
        }
    }
}

impl Default for ApiPaths {
    fn default() -> Self {
        Self {
            log_in: "/api/admins/login".to_owned(),
            savings_accounts: "/api/saving/get-all-savings-users".to_owned(),
            savings_transactions:
                "/api/saving/transactions/get-user-transactions/{account_number}".to_owned(),
            savings_credit: "/api/saving/transactions/create-transaction/{account_number}"
                .to_owned(),
            savings_withdraw: "/api/saving/{account_number}/withdraw".to_owned(),
            customers: "/api/users/get-all-users".to_owned(),
            fixed_deposits: DepositPaths {
                list: "/api/fds/get-all-fds-by-userId/{user_id}".to_owned(),
                create: "/api/accounts/{user_id}/fd".to_owned(),
                update: "/api/fds/patch-fd-by-accNum/{account_number}".to_owned(),
                delete: "/api/fds/delete-fd-by-accNum/{account_number}".to_owned(),
                delete_all: "/api/fds/delete-all-fds-by-userId/{user_id}".to_owned(),
            },
            recurring_deposits: DepositPaths {
                list: "/api/rds/get-all-rds-by-userId/{user_id}".to_owned(),
                create: "/api/rds/create-rd/{user_id}".to_owned(),
                update: "/api/rds/patch-rd-by-accNum/{account_number}".to_owned(),
                delete: "/api/rds/delete-rd-by-accNum/{account_number}".to_owned(),
                delete_all: "/api/rds/delete-all-rds-by-userId/{user_id}".to_owned(),
            },
            branches: "/api/admins/get-branch-list".to_owned(),
            loans: "/api/loans/get-all-loans".to_owned(),
            dashboard: DashboardPaths::default(),
        }
    }
}

impl ApiPaths {
    /// The deposit endpoints for `kind`.
    pub fn deposits(&self, kind: DepositKind) -> &DepositPaths {
        match kind {
            DepositKind::Fixed => &self.fixed_deposits,
            DepositKind::Recurring => &self.recurring_deposits,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            BackendError::Timeout
        } else if error.is_decode() {
            BackendError::Decode(error.to_string())
        } else {
            BackendError::Transport(error.to_string())
        }
    }
}

/// Calls the REST backend with a client-side timeout on every request.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    loans_base_url: String,
    paths: ApiPaths,
}

impl HttpBackend {
    /// Create a client for the backend at `base_url`.
    ///
    /// Branches and loans are served by a separate service at `loans_base_url`.
    ///
    /// # Errors
    ///
    /// Returns [BackendError::Transport] if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        loans_base_url: &str,
        paths: ApiPaths,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            loans_base_url: loans_base_url.trim_end_matches('/').to_owned(),
            paths,
        })
    }

    /// Fills `template` with percent-encoded `params`.
    fn url(&self, template: &str, params: &[&str]) -> String {
        let encoded: Vec<String> = params
            .iter()
            .map(|param| urlencoding::encode(param).into_owned())
            .collect();
        let encoded: Vec<&str> = encoded.iter().map(String::as_str).collect();

        format!("{}{}", self.base_url, format_endpoint(template, &encoded))
    }

    fn loans_url(&self, template: &str) -> String {
        format!("{}{}", self.loans_base_url, template)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!("backend responded with {status}: {body}");

        Err(BackendError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, BackendError> {
        tracing::debug!("GET {url}");

        let response = self.send(self.client.get(url)).await?;

        Ok(response.json::<T>().await?)
    }

    /// Like [HttpBackend::get_json], limited to `branch` if one is given.
    async fn get_branch_json<T: DeserializeOwned>(
        &self,
        template: &str,
        branch: Option<&str>,
    ) -> Result<T, BackendError> {
        let url = self.url(template, &[]);
        tracing::debug!("GET {url} for branch {branch:?}");

        let mut request = self.client.get(&url);
        if let Some(branch) = branch {
            request = request.query(&[("branchName", branch)]);
        }
        let response = self.send(request).await?;

        Ok(response.json::<T>().await?)
    }

    fn deposit_body(kind: DepositKind, terms: &DepositTerms) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        body.insert(kind.amount_field().to_owned(), terms.amount.into());
        body.insert("interestRate".to_owned(), terms.interest_rate.into());
        body.insert("tenureMonths".to_owned(), terms.tenure_months.into());

        serde_json::Value::Object(body)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn log_in(&self, credentials: &LogInRequest) -> Result<StaffUser, BackendError> {
        let url = self.url(&self.paths.log_in, &[]);
        let response = self.send(self.client.post(&url).json(credentials)).await?;

        Ok(response.json().await?)
    }

    async fn list_savings_accounts(&self) -> Result<Vec<SavingsAccount>, BackendError> {
        self.get_json(&self.url(&self.paths.savings_accounts, &[]))
            .await
    }

    async fn list_savings_transactions(
        &self,
        account_number: &str,
    ) -> Result<Vec<SavingsTransaction>, BackendError> {
        self.get_json(&self.url(&self.paths.savings_transactions, &[account_number]))
            .await
    }

    async fn record_payment(
        &self,
        account_number: &str,
        payment: &PaymentRequest,
    ) -> Result<(), BackendError> {
        let template = match payment.transaction_type {
            TransactionType::Credit => &self.paths.savings_credit,
            TransactionType::Debit => &self.paths.savings_withdraw,
        };
        let url = self.url(template, &[account_number]);
        tracing::debug!("POST {url}");

        self.send(self.client.post(&url).json(payment)).await?;

        Ok(())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, BackendError> {
        self.get_json(&self.url(&self.paths.customers, &[])).await
    }

    async fn list_deposits(
        &self,
        kind: DepositKind,
        customer_id: i64,
    ) -> Result<Vec<DepositAccount>, BackendError> {
        let customer_id = customer_id.to_string();
        let url = self.url(&self.paths.deposits(kind).list, &[&customer_id]);

        match self.get_json(&url).await {
            Err(BackendError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(Vec::new())
            }
            result => result,
        }
    }

    async fn create_deposit(
        &self,
        kind: DepositKind,
        customer_id: i64,
        terms: &DepositTerms,
    ) -> Result<(), BackendError> {
        let customer_id = customer_id.to_string();
        let url = self.url(&self.paths.deposits(kind).create, &[&customer_id]);
        tracing::debug!("POST {url}");

        self.send(self.client.post(&url).json(&Self::deposit_body(kind, terms)))
            .await?;

        Ok(())
    }

    async fn update_deposit(
        &self,
        kind: DepositKind,
        account_number: &str,
        terms: &DepositTerms,
    ) -> Result<(), BackendError> {
        let url = self.url(&self.paths.deposits(kind).update, &[account_number]);
        tracing::debug!("PATCH {url}");

        self.send(self.client.patch(&url).json(&Self::deposit_body(kind, terms)))
            .await?;

        Ok(())
    }

    async fn delete_deposit(
        &self,
        kind: DepositKind,
        account_number: &str,
    ) -> Result<(), BackendError> {
        let url = self.url(&self.paths.deposits(kind).delete, &[account_number]);
        tracing::debug!("DELETE {url}");

        self.send(self.client.delete(&url)).await?;

        Ok(())
    }

    async fn delete_all_deposits(
        &self,
        kind: DepositKind,
        customer_id: i64,
    ) -> Result<(), BackendError> {
        let customer_id = customer_id.to_string();
        let url = self.url(&self.paths.deposits(kind).delete_all, &[&customer_id]);
        tracing::debug!("DELETE {url}");

        self.send(self.client.delete(&url)).await?;

        Ok(())
    }

    async fn list_branches(&self) -> Result<Vec<String>, BackendError> {
        self.get_json(&self.loans_url(&self.paths.branches)).await
    }

    async fn list_loans(&self) -> Result<Vec<Loan>, BackendError> {
        self.get_json(&self.loans_url(&self.paths.loans)).await
    }

    async fn dashboard_stats(&self, branch: Option<&str>) -> Result<DashboardStats, BackendError> {
        self.get_branch_json(&self.paths.dashboard.stats, branch)
            .await
    }

    async fn account_trends(
        &self,
        branch: Option<&str>,
    ) -> Result<Vec<AccountTrend>, BackendError> {
        self.get_branch_json(&self.paths.dashboard.account_trends, branch)
            .await
    }

    async fn loan_trends(&self, branch: Option<&str>) -> Result<Vec<LoanTrend>, BackendError> {
        self.get_branch_json(&self.paths.dashboard.loan_trends, branch)
            .await
    }

    async fn loan_types(&self, branch: Option<&str>) -> Result<Vec<ChartSlice>, BackendError> {
        self.get_branch_json(&self.paths.dashboard.loan_types, branch)
            .await
    }

    async fn account_distribution(
        &self,
        branch: Option<&str>,
    ) -> Result<Vec<ChartSlice>, BackendError> {
        self.get_branch_json(&self.paths.dashboard.account_distribution, branch)
            .await
    }

    async fn recent_customers(&self, branch: Option<&str>) -> Result<Vec<Customer>, BackendError> {
        self.get_branch_json(&self.paths.dashboard.recent_customers, branch)
            .await
    }
}

#[cfg(test)]
mod http_backend_tests {
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
        time::Duration,
    };

    use axum::{
        Json, Router,
        extract::{Path, Query, State},
        http::StatusCode,
        routing::{delete, get, post},
    };
    use serde_json::{Value, json};

    use crate::{
        backend::{
            Backend, BackendError, PaymentMode, PaymentRequest, TransactionType,
        },
        deposit_kind::DepositKind,
        validation::DepositTerms,
    };

    use super::{ApiPaths, HttpBackend};

    type Received = Arc<Mutex<Vec<(String, Value)>>>;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        format!("http://{address}")
    }

    fn backend_at(base_url: &str, timeout: Duration) -> HttpBackend {
        HttpBackend::new(base_url, base_url, ApiPaths::default(), timeout).unwrap()
    }

    #[test]
    fn path_parameters_are_percent_encoded() {
        let backend = backend_at("http://localhost:8080", Duration::from_secs(1));

        let url = backend.url("/api/fixed-deposits/{account_number}", &["../admins/1"]);

        assert_eq!(
            url,
            "http://localhost:8080/api/fixed-deposits/..%2Fadmins%2F1"
        );
    }

    #[tokio::test]
    async fn decodes_savings_accounts() {
        let paths = ApiPaths::default();
        let router = Router::new().route(
            &paths.savings_accounts,
            get(|| async {
                Json(json!([{
                    "id": 1,
                    "name": "Amit",
                    "accountNumber": "SB001",
                    "createdAt": "2024-03-15 2:05 PM",
                    "status": "ACTIVE",
                    "currentBalance": 100.0,
                    "interestRate": 3.5
                }]))
            }),
        );
        let backend = backend_at(&serve(router).await, Duration::from_secs(5));

        let got = backend.list_savings_accounts().await.unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].account_number, "SB001");
        assert_eq!(got[0].current_balance, 100.0);
    }

    #[tokio::test]
    async fn payments_go_to_credit_or_withdraw_endpoint() {
        let paths = ApiPaths::default();
        let received = Received::default();

        async fn record(
            State(received): State<Received>,
            Path(account_number): Path<String>,
            Json(body): Json<Value>,
        ) -> StatusCode {
            received.lock().unwrap().push((account_number, body));
            StatusCode::CREATED
        }

        async fn withdraw(
            State(received): State<Received>,
            Path(account_number): Path<String>,
            Json(body): Json<Value>,
        ) -> StatusCode {
            received
                .lock()
                .unwrap()
                .push((format!("withdraw {account_number}"), body));
            StatusCode::OK
        }

        let router = Router::new()
            .route(&paths.savings_credit, post(record))
            .route(&paths.savings_withdraw, post(withdraw))
            .with_state(received.clone());
        let backend = backend_at(&serve(router).await, Duration::from_secs(5));
        let mut payment = PaymentRequest {
            amount: 100.0,
            pay_mode: PaymentMode::Cash,
            utr_no: None,
            cash: Some("100".to_owned()),
            cheque_number: None,
            note: None,
            transaction_type: TransactionType::Credit,
        };

        backend.record_payment("SB001", &payment).await.unwrap();
        payment.transaction_type = TransactionType::Debit;
        backend.record_payment("SB001", &payment).await.unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received[0].0, "SB001");
        assert_eq!(received[0].1["transactionType"], "CREDIT");
        assert_eq!(received[0].1["utrNo"], "NA");
        assert_eq!(received[0].1["note"], "NO");
        assert_eq!(received[1].0, "withdraw SB001");
        assert_eq!(received[1].1["transactionType"], "DEBIT");
    }

    #[tokio::test]
    async fn create_deposit_uses_the_kind_amount_field() {
        let paths = ApiPaths::default();
        let received = Received::default();

        async fn create(
            State(received): State<Received>,
            Path(user_id): Path<String>,
            Json(body): Json<Value>,
        ) -> StatusCode {
            received.lock().unwrap().push((user_id, body));
            StatusCode::CREATED
        }

        let router = Router::new()
            .route(&paths.fixed_deposits.create, post(create))
            .route(&paths.recurring_deposits.create, post(create))
            .with_state(received.clone());
        let backend = backend_at(&serve(router).await, Duration::from_secs(5));
        let terms = DepositTerms {
            amount: 5000.0,
            interest_rate: 7.5,
            tenure_months: 12,
        };

        backend
            .create_deposit(DepositKind::Fixed, 42, &terms)
            .await
            .unwrap();
        backend
            .create_deposit(DepositKind::Recurring, 43, &terms)
            .await
            .unwrap();

        let received = received.lock().unwrap();
        assert_eq!(
            received[0],
            (
                "42".to_owned(),
                json!({"principalAmount": 5000.0, "interestRate": 7.5, "tenureMonths": 12})
            )
        );
        assert_eq!(
            received[1],
            (
                "43".to_owned(),
                json!({"depositAmount": 5000.0, "interestRate": 7.5, "tenureMonths": 12})
            )
        );
    }

    #[tokio::test]
    async fn missing_deposits_are_an_empty_list() {
        let backend = backend_at(&serve(Router::new()).await, Duration::from_secs(5));

        let got = backend.list_deposits(DepositKind::Fixed, 7).await;

        assert_eq!(got, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn error_status_keeps_the_body() {
        let paths = ApiPaths::default();
        let router = Router::new().route(
            &paths.fixed_deposits.delete_all,
            delete(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "violates foreign key constraint \"fk_fd_transactions\"",
                )
            }),
        );
        let backend = backend_at(&serve(router).await, Duration::from_secs(5));

        let error = backend
            .delete_all_deposits(DepositKind::Fixed, 3)
            .await
            .unwrap_err();

        assert!(matches!(error, BackendError::Status { status: 500, .. }));
        assert!(error.is_foreign_key_violation());
    }

    #[tokio::test]
    async fn slow_responses_time_out() {
        let paths = ApiPaths::default();
        let router = Router::new().route(
            &paths.loans,
            get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Json(json!([]))
            }),
        );
        let backend = backend_at(&serve(router).await, Duration::from_millis(50));

        let got = backend.list_loans().await;

        assert_eq!(got, Err(BackendError::Timeout));
    }

    #[tokio::test]
    async fn branches_and_loans_use_the_loans_service() {
        let paths = ApiPaths::default();
        let main = serve(Router::new()).await;
        let loans = serve(Router::new().route(
            &paths.branches,
            get(|| async { Json(json!(["Pune", "Nashik"])) }),
        ))
        .await;
        let backend = HttpBackend::new(&main, &loans, paths, Duration::from_secs(5)).unwrap();

        let got = backend.list_branches().await;

        assert_eq!(got, Ok(vec!["Pune".to_owned(), "Nashik".to_owned()]));
    }

    #[tokio::test]
    async fn dashboard_requests_name_the_branch() {
        let paths = ApiPaths::default();
        let router = Router::new().route(
            &paths.dashboard.stats,
            get(|Query(query): Query<HashMap<String, String>>| async move {
                let users = match query.get("branchName").map(String::as_str) {
                    Some("Pune") => 12,
                    Some(_) => 0,
                    None => 40,
                };

                Json(json!({
                    "totalUsers": users,
                    "totalSavings": 1500.0,
                    "totalFd": 0,
                    "totalRd": 0,
                    "totalLoans": 0
                }))
            }),
        );
        let backend = backend_at(&serve(router).await, Duration::from_secs(5));

        let pune = backend.dashboard_stats(Some("Pune")).await.unwrap();
        let everywhere = backend.dashboard_stats(None).await.unwrap();

        assert_eq!(pune.total_users, 12);
        assert_eq!(pune.total_savings, 1500.0);
        assert_eq!(everywhere.total_users, 40);
    }

    #[test]
    fn paths_file_may_override_some_paths() {
        let paths: ApiPaths =
            serde_json::from_str(r#"{"customers": "/api/customers"}"#).unwrap();

        assert_eq!(paths.customers, "/api/customers");
        assert_eq!(paths.loans, ApiPaths::default().loans);
        assert_eq!(paths.dashboard.stats, "/api/dashboard/stats");
    }
}
