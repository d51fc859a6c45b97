//! Concurrent lookup of the deposit accounts held by each customer.

use futures::future::join_all;

use crate::{
    backend::{Backend, Customer, DepositAccount},
    deposit_kind::DepositKind,
};

/// A customer together with the deposit accounts of one kind they hold.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerHoldings {
    /// The customer.
    pub customer: Customer,
    /// The customer's accounts of the page's deposit kind.
    pub accounts: Vec<DepositAccount>,
}

impl CustomerHoldings {
    /// Whether the customer holds at least one account.
    pub fn has_account(&self) -> bool {
        !self.accounts.is_empty()
    }
}

/// Fetch the `kind` accounts of every customer, one request per customer.
///
/// The requests run concurrently and the result is returned once all of them
/// have settled, in the same order as `customers`. A failed request is logged
/// and leaves that customer with no accounts; it never fails the batch.
pub async fn check_accounts(
    backend: &dyn Backend,
    kind: DepositKind,
    customers: Vec<Customer>,
) -> Vec<CustomerHoldings> {
    let checks = customers.into_iter().map(|customer| async move {
        match backend.list_deposits(kind, customer.user_id).await {
            Ok(accounts) => CustomerHoldings { customer, accounts },
            Err(error) => {
                tracing::warn!(
                    "could not check {} accounts for customer {}: {error}",
                    kind.abbreviation(),
                    customer.user_id
                );

                CustomerHoldings {
                    customer,
                    accounts: Vec::new(),
                }
            }
        }
    });

    join_all(checks).await
}
