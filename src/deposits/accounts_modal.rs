//! The modal listing the deposit accounts of one customer.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::UtcOffset;

use crate::{
    account_check::CustomerHoldings,
    auth::Session,
    backend::DepositAccount,
    deposit_kind::DepositKind,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, LINK_STYLE,
        MODAL_CONTAINER_ID, format_currency, format_date, modal,
    },
    timestamp::parse_timestamp,
    timezone::local_offset,
};

use super::customers_page::{DepositsState, find_customer};

/// The URL of the form opening a new account for `customer_id`, or changing
/// `account_number` if given.
pub(super) fn form_url(kind: DepositKind, customer_id: i64, account_number: Option<&str>) -> String {
    let form = format_endpoint(endpoints::DEPOSIT_FORM, &[kind.as_path_segment()]);

    match account_number {
        Some(account_number) => {
            format!("{form}?customer_id={customer_id}&account_number={account_number}")
        }
        None => format!("{form}?customer_id={customer_id}"),
    }
}

fn detail(label: &str, value: &str) -> Markup {
    html! {
        div
        {
            dt class="text-xs text-gray-500 dark:text-gray-400" { (label) }
            dd class="font-medium" { (value) }
        }
    }
}

fn account_card(
    kind: DepositKind,
    customer_id: i64,
    account: &DepositAccount,
    local_offset: UtcOffset,
) -> Markup {
    let delete_url = format!(
        "{}?customer_id={customer_id}",
        format_endpoint(
            endpoints::DEPOSIT_DELETE_CONFIRM,
            &[kind.as_path_segment(), &account.account_number],
        )
    );
    let maturity_amount = account
        .maturity_amount
        .map(format_currency)
        .unwrap_or_else(|| "-".to_owned());
    let maturity_date = account
        .maturity_date
        .as_deref()
        .map(|raw| format_date(parse_timestamp(raw, local_offset), local_offset))
        .unwrap_or_else(|| "-".to_owned());
    let opened = format_date(parse_timestamp(&account.created_at, local_offset), local_offset);

    html! {
        article
            id={ "deposit-" (account.account_number) }
            class="rounded-lg border p-4 space-y-3 dark:border-gray-700"
        {
            header class="flex justify-between items-center"
            {
                h3 class="font-semibold" { (account.account_number) }
                span class="text-xs uppercase" { (account.status) }
            }

            dl class="grid grid-cols-2 gap-2 text-sm"
            {
                (detail(kind.amount_label(), &format_currency(account.amount)))
                (detail("Interest Rate", &format!("{}%", account.interest_rate)))
                (detail("Tenure", &format!("{} months", account.tenure_months)))
                (detail("Maturity Amount", &maturity_amount))
                (detail("Maturity Date", &maturity_date))
                (detail("Opened", &opened))
            }

            div class="flex gap-4"
            {
                button
                    type="button"
                    class=(LINK_STYLE)
                    hx-get=(form_url(kind, customer_id, Some(&account.account_number)))
                    hx-target={ "#" (MODAL_CONTAINER_ID) }
                    hx-target-error="#alert-container"
                {
                    "Update"
                }
                button
                    type="button"
                    class=(BUTTON_DELETE_STYLE)
                    hx-get=(delete_url)
                    hx-target={ "#" (MODAL_CONTAINER_ID) }
                    hx-target-error="#alert-container"
                {
                    "Delete"
                }
            }
        }
    }
}

/// The customer's details and one card per account.
pub(super) fn accounts_modal(
    kind: DepositKind,
    holdings: &CustomerHoldings,
    local_offset: UtcOffset,
) -> Markup {
    let customer = &holdings.customer;
    let customer_id = customer.user_id.to_string();
    let delete_all_url = format_endpoint(
        endpoints::CUSTOMER_DEPOSITS_DELETE_CONFIRM,
        &[kind.as_path_segment(), &customer_id],
    );
    let abbreviation = kind.abbreviation();

    let content = html! {
        dl class="grid grid-cols-2 gap-2 text-sm"
        {
            (detail("User ID", &customer_id))
            (detail("Mobile", customer.mobile.as_deref().unwrap_or("-")))
            (detail("Email", customer.email.as_deref().unwrap_or("-")))
            (detail("Branch", customer.branch.as_deref().unwrap_or("-")))
            (detail(&format!("Total {abbreviation}s"), &holdings.accounts.len().to_string()))
        }

        div class="flex gap-2"
        {
            button
                type="button"
                class=(BUTTON_PRIMARY_STYLE)
                hx-get=(form_url(kind, customer.user_id, None))
                hx-target={ "#" (MODAL_CONTAINER_ID) }
                hx-target-error="#alert-container"
            {
                "Create " (abbreviation)
            }

            @if holdings.has_account() {
                button
                    type="button"
                    class=(BUTTON_SECONDARY_STYLE)
                    hx-get=(delete_all_url)
                    hx-target={ "#" (MODAL_CONTAINER_ID) }
                    hx-target-error="#alert-container"
                {
                    "Delete All " (abbreviation) "s"
                }
            }
        }

        @for account in &holdings.accounts {
            (account_card(kind, customer.user_id, account, local_offset))
        }

        @if !holdings.has_account() {
            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                "No " (abbreviation) " accounts found for this customer."
            }
        }
    };

    modal(&format!("{}s of {}", abbreviation, customer.full_name()), &content)
}

/// Shows the customer's accounts, fetched again so the cards are current.
///
/// If the fetch fails, the cached accounts are shown instead.
pub async fn get_customer_deposits(
    State(state): State<DepositsState>,
    Extension(session): Extension<Session>,
    Path((kind, customer_id)): Path<(DepositKind, i64)>,
) -> Response {
    let local_offset = match local_offset(&state.local_timezone) {
        Ok(offset) => offset,
        Err(error) => return error.into_alert_response(),
    };
    let mut holdings =
        match find_customer(&state, kind, customer_id, &session.branch_scope()).await {
            Ok(holdings) => holdings,
            Err(error) => return error.into_alert_response(),
        };

    match state.backend.list_deposits(kind, customer_id).await {
        Ok(accounts) => holdings.accounts = accounts,
        Err(error) => tracing::warn!(
            "could not refetch {} accounts of customer {customer_id}, showing cached accounts: {error}",
            kind.abbreviation()
        ),
    }

    accounts_modal(kind, &holdings, local_offset).into_response()
}
