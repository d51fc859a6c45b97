//! Implements a struct that holds the state of the web server.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};

use crate::{
    account_check::{CustomerHoldings, check_accounts},
    backend::{Backend, BackendError, Loan, SavingsAccount},
    cache::{REFRESH_DEBOUNCE, RefreshingCache},
    deposit_kind::DepositKind,
};

/// The cached customer holdings for each deposit kind.
#[derive(Debug, Clone)]
pub struct DepositCaches {
    fixed: RefreshingCache<Vec<CustomerHoldings>>,
    recurring: RefreshingCache<Vec<CustomerHoldings>>,
}

impl DepositCaches {
    fn spawn(backend: &Arc<dyn Backend>) -> Self {
        Self {
            fixed: spawn_holdings_cache(backend.clone(), DepositKind::Fixed),
            recurring: spawn_holdings_cache(backend.clone(), DepositKind::Recurring),
        }
    }

    /// The cache for `kind`.
    pub fn get(&self, kind: DepositKind) -> &RefreshingCache<Vec<CustomerHoldings>> {
        match kind {
            DepositKind::Fixed => &self.fixed,
            DepositKind::Recurring => &self.recurring,
        }
    }
}

fn spawn_holdings_cache(
    backend: Arc<dyn Backend>,
    kind: DepositKind,
) -> RefreshingCache<Vec<CustomerHoldings>> {
    RefreshingCache::spawn(REFRESH_DEBOUNCE, move || {
        let backend = backend.clone();

        async move { fetch_holdings(backend.as_ref(), kind).await }
    })
}

/// Fetch every customer and check which `kind` accounts each holds.
pub async fn fetch_holdings(
    backend: &dyn Backend,
    kind: DepositKind,
) -> Result<Vec<CustomerHoldings>, BackendError> {
    let customers = backend.list_customers().await?;

    Ok(check_accounts(backend, kind, customers).await)
}

/// The state of the web server.
#[derive(Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,

    /// The REST backend that owns all account data.
    pub backend: Arc<dyn Backend>,

    /// The last known savings accounts.
    pub savings: RefreshingCache<Vec<SavingsAccount>>,

    /// The last known customer holdings per deposit kind.
    pub deposits: DepositCaches,

    /// The last known sanctioned loans.
    pub loans: RefreshingCache<Vec<Loan>>,
}

impl AppState {
    /// Create a new [AppState] talking to `backend`.
    ///
    /// The caches start empty and are filled on first use. Their refresh
    /// tasks are spawned on the current tokio runtime.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Asia/Kolkata".
    pub fn new(cookie_secret: &str, local_timezone: &str, backend: Arc<dyn Backend>) -> Self {
        let savings = {
            let backend = backend.clone();
            RefreshingCache::spawn(REFRESH_DEBOUNCE, move || {
                let backend = backend.clone();
                async move { backend.list_savings_accounts().await }
            })
        };
        let loans = {
            let backend = backend.clone();
            RefreshingCache::spawn(REFRESH_DEBOUNCE, move || {
                let backend = backend.clone();
                async move { backend.list_loans().await }
            })
        };

        Self {
            cookie_key: create_cookie_key(cookie_secret),
            local_timezone: local_timezone.to_owned(),
            deposits: DepositCaches::spawn(&backend),
            backend,
            savings,
            loans,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
