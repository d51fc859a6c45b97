//! Closing a single deposit account, or every account of a customer, after
//! the staff member confirms.

use axum::{
    Extension,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    account_check::CustomerHoldings,
    alert::Alert,
    auth::Session,
    backend::{BackendError, DepositAccount},
    deposit_kind::DepositKind,
    endpoints::{self, format_endpoint},
    html::{BUTTON_DANGER_STYLE, BUTTON_SECONDARY_STYLE, MODAL_CONTAINER_ID, modal},
    modal::{DeleteTarget, ModalEvent, ModalState},
    timezone::local_offset,
    validation::DepositDraft,
};

use super::customers_page::{
    DepositsState, customer_row, find_customer, find_customer_account, reload_customer,
};

/// The customer who holds the account being closed.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountOwner {
    /// The customer's ID.
    pub customer_id: i64,
}

fn delete_url(kind: DepositKind, customer_id: i64, target: &DeleteTarget) -> String {
    match target {
        DeleteTarget::Account { account_number } => format!(
            "{}?customer_id={customer_id}",
            format_endpoint(endpoints::DEPOSIT, &[kind.as_path_segment(), account_number])
        ),
        DeleteTarget::AllOfCustomer { customer_id } => format_endpoint(
            endpoints::CUSTOMER_DEPOSITS,
            &[kind.as_path_segment(), &customer_id.to_string()],
        ),
    }
}

fn delete_modal(
    state: &ModalState<DepositDraft>,
    kind: DepositKind,
    holdings: &CustomerHoldings,
) -> Markup {
    let ModalState::DeleteConfirmOpen { target } = state else {
        return html! {};
    };

    let customer_name = holdings.customer.full_name();
    let (title, question) = match target {
        DeleteTarget::Account { account_number } => (
            format!("Delete {account_number}"),
            format!(
                "Are you sure you want to delete {} {account_number} of {customer_name}?",
                kind.abbreviation()
            ),
        ),
        DeleteTarget::AllOfCustomer { .. } => (
            format!("Delete all {}s", kind.abbreviation()),
            format!(
                "Are you sure you want to delete all {} {} accounts of {customer_name}?",
                holdings.accounts.len(),
                kind.abbreviation()
            ),
        ),
    };

    let content = html! {
        p class="text-sm" { (question) " This cannot be undone." }

        div class="flex gap-2"
        {
            button
                type="button"
                class=(BUTTON_SECONDARY_STYLE)
                hx-get=(endpoints::MODAL_CLOSE)
                hx-target={ "#" (MODAL_CONTAINER_ID) }
            {
                "Cancel"
            }
            button
                type="button"
                class=(BUTTON_DANGER_STYLE)
                hx-delete=(delete_url(kind, holdings.customer.user_id, target))
                hx-target={ "#" (MODAL_CONTAINER_ID) }
                hx-target-error="#alert-container"
                hx-disabled-elt="this"
            {
                "Delete"
            }
        }
    };

    modal(&title, &content)
}

fn ask_delete(target: DeleteTarget) -> ModalState<DepositDraft> {
    ModalState::Idle.apply(ModalEvent::AskDelete(target))
}

/// Asks the staff member to confirm closing a single account.
pub async fn get_delete_deposit_confirm(
    State(state): State<DepositsState>,
    Extension(session): Extension<Session>,
    Path((kind, account_number)): Path<(DepositKind, String)>,
    Query(owner): Query<AccountOwner>,
) -> Response {
    let holdings = match find_customer_account(
        &state,
        kind,
        owner.customer_id,
        &account_number,
        &session.branch_scope(),
    )
    .await
    {
        Ok(holdings) => holdings,
        Err(error) => return error.into_alert_response(),
    };

    let asking = ask_delete(DeleteTarget::Account { account_number });

    delete_modal(&asking, kind, &holdings).into_response()
}

/// Asks the staff member to confirm closing every account of a customer.
pub async fn get_delete_customer_deposits_confirm(
    State(state): State<DepositsState>,
    Extension(session): Extension<Session>,
    Path((kind, customer_id)): Path<(DepositKind, i64)>,
) -> Response {
    let holdings = match find_customer(&state, kind, customer_id, &session.branch_scope()).await {
        Ok(holdings) => holdings,
        Err(error) => return error.into_alert_response(),
    };

    let asking = ask_delete(DeleteTarget::AllOfCustomer { customer_id });

    delete_modal(&asking, kind, &holdings).into_response()
}

fn failure_response(message: String, error: &BackendError) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Alert::Error {
            message,
            details: error.to_string(),
        }
        .into_html(),
    )
        .into_response()
}

async fn deleted_response(
    state: &DepositsState,
    kind: DepositKind,
    customer_id: i64,
    message: String,
    optimistic: impl FnOnce(&mut Vec<DepositAccount>),
) -> Response {
    let local_offset = match local_offset(&state.local_timezone) {
        Ok(offset) => offset,
        Err(error) => return error.into_alert_response(),
    };
    let reloaded = reload_customer(state, kind, customer_id, optimistic).await;

    // The status code has to be 200 OK or HTMX will not swap the modal out.
    html! {
        (Alert::SuccessSimple { message }.into_html())
        @if let Some(reloaded) = reloaded {
            template
            {
                (customer_row(kind, &reloaded, local_offset, true))
            }
        }
    }
    .into_response()
}

/// Closes a single account, responding with an alert and the customer's
/// updated row.
pub async fn delete_deposit(
    State(state): State<DepositsState>,
    Extension(session): Extension<Session>,
    Path((kind, account_number)): Path<(DepositKind, String)>,
    Query(owner): Query<AccountOwner>,
) -> Response {
    if let Err(error) = find_customer_account(
        &state,
        kind,
        owner.customer_id,
        &account_number,
        &session.branch_scope(),
    )
    .await
    {
        return error.into_alert_response();
    }

    if let Err(error) = state.backend.delete_deposit(kind, &account_number).await {
        tracing::error!("could not delete {account_number}: {error}");
        return failure_response(
            format!("Failed to delete {} account", kind.abbreviation()),
            &error,
        );
    }

    deleted_response(
        &state,
        kind,
        owner.customer_id,
        format!("{} deleted successfully!", kind.name()),
        move |accounts| accounts.retain(|account| account.account_number != account_number),
    )
    .await
}

/// Closes every account of a customer, responding with an alert and the
/// customer's updated row.
pub async fn delete_customer_deposits(
    State(state): State<DepositsState>,
    Extension(session): Extension<Session>,
    Path((kind, customer_id)): Path<(DepositKind, i64)>,
) -> Response {
    if let Err(error) = find_customer(&state, kind, customer_id, &session.branch_scope()).await {
        return error.into_alert_response();
    }

    if let Err(error) = state.backend.delete_all_deposits(kind, customer_id).await {
        tracing::error!(
            "could not delete the {} accounts of customer {customer_id}: {error}",
            kind.abbreviation()
        );

        if error.is_foreign_key_violation() {
            return (
                StatusCode::CONFLICT,
                Alert::ErrorSimple {
                    message: format!(
                        "Cannot delete {} accounts because they have associated transactions. \
                        Please contact the backend team to resolve this issue.",
                        kind.abbreviation()
                    ),
                }
                .into_html(),
            )
                .into_response();
        }

        return failure_response(
            format!("Failed to delete all {} accounts", kind.abbreviation()),
            &error,
        );
    }

    deleted_response(
        &state,
        kind,
        customer_id,
        format!("All {} deleted successfully!", kind.title()),
        |accounts| accounts.clear(),
    )
    .await
}
