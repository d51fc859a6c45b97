//! The modal for opening a deposit or changing the terms of one.
//!
//! Like the payment modal, every step posts the whole draft back and the
//! handler rebuilds the modal state from the request.

use axum::{
    Extension, Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error,
    account_check::CustomerHoldings,
    alert::Alert,
    auth::Session,
    backend::DepositAccount,
    deposit_kind::DepositKind,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, MODAL_CONTAINER_ID, format_currency, loading_spinner, modal,
    },
    maturity::estimate_maturity_amount,
    modal::{FormMode, ModalEvent, ModalState},
    timezone::local_offset,
    validation::{DepositDraft, DepositTerms, validate_deposit},
};

use super::customers_page::{
    DepositsState, customer_row, find_customer, find_customer_account, reload_customer,
};

type DepositModal = ModalState<DepositDraft>;

/// Which form to open.
#[derive(Debug, Clone, Deserialize)]
pub struct DepositFormQuery {
    /// The customer who holds or will hold the account.
    pub customer_id: i64,
    /// The account to change. Blank or missing opens a new account.
    #[serde(default)]
    pub account_number: Option<String>,
}

/// The fields posted by the deposit form and its confirmation.
#[derive(Debug, Clone, Deserialize)]
pub struct DepositForm {
    /// The customer who holds or will hold the account.
    pub customer_id: i64,
    /// The account to change. Blank opens a new account.
    #[serde(default)]
    pub account_number: String,
    /// The principal or monthly amount as entered.
    #[serde(default)]
    pub amount: String,
    /// The annual interest rate as entered.
    #[serde(default)]
    pub interest_rate: String,
    /// The tenure in months as entered.
    #[serde(default)]
    pub tenure_months: String,
}

impl DepositForm {
    fn mode(&self) -> FormMode {
        FormMode::from_account_number(Some(&self.account_number))
    }

    fn into_draft(self) -> DepositDraft {
        DepositDraft {
            amount: self.amount,
            interest_rate: self.interest_rate,
            tenure_months: self.tenure_months,
        }
    }
}

fn hidden_ids(customer_id: i64, mode: &FormMode) -> Markup {
    html! {
        input type="hidden" name="customer_id" value=(customer_id);
        input type="hidden" name="account_number" value=(mode.account_number().unwrap_or(""));
    }
}

fn number_input(name: &str, label: &str, value: &str, step: &str, rupees: bool) -> Markup {
    let input = html! {
        input
            type="number"
            id=(name)
            name=(name)
            step=(step)
            min="0"
            required
            value=(value)
            class=(FORM_TEXT_INPUT_STYLE);
    };

    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }
            @if rupees {
                div class="input-wrapper" { (input) }
            } @else {
                (input)
            }
        }
    }
}

fn deposit_form(
    kind: DepositKind,
    holdings: &CustomerHoldings,
    mode: &FormMode,
    draft: &DepositDraft,
    error: Option<&str>,
) -> Markup {
    let review_url = format_endpoint(endpoints::DEPOSIT_REVIEW, &[kind.as_path_segment()]);
    let limits = kind.limits();

    html! {
        form
            class="space-y-4"
            hx-post=(review_url)
            hx-target={ "#" (MODAL_CONTAINER_ID) }
            hx-target-error="#alert-container"
        {
            @if let Some(error) = error {
                p class=(FORM_ERROR_STYLE) role="alert" { (error) }
            }

            p class="text-sm"
            {
                (holdings.customer.full_name())
                @if let Some(account_number) = mode.account_number() {
                    " · " (account_number)
                }
            }

            (hidden_ids(holdings.customer.user_id, mode))
            (number_input("amount", kind.amount_label(), &draft.amount, "0.01", true))
            (number_input(
                "interest_rate",
                &format!("Interest Rate ({}% to {}%)", limits.min_rate, limits.max_rate),
                &draft.interest_rate,
                "0.01",
                false,
            ))
            (number_input(
                "tenure_months",
                &format!(
                    "Tenure in Months ({} to {})",
                    limits.min_tenure_months, limits.max_tenure_months
                ),
                &draft.tenure_months,
                "1",
                false,
            ))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Review" }
        }
    }
}

fn deposit_confirmation(
    kind: DepositKind,
    holdings: &CustomerHoldings,
    mode: &FormMode,
    draft: &DepositDraft,
) -> Markup {
    let submit_url = format_endpoint(endpoints::DEPOSITS_API, &[kind.as_path_segment()]);
    let edit_url = format_endpoint(endpoints::DEPOSIT_EDIT, &[kind.as_path_segment()]);
    let terms = validate_deposit(kind, draft).ok();
    let action = match mode {
        FormMode::Create => "Create",
        FormMode::Update { .. } => "Update",
    };

    html! {
        form
            class="space-y-4"
            hx-post=(submit_url)
            hx-target={ "#" (MODAL_CONTAINER_ID) }
            hx-target-error="#alert-container"
            hx-disabled-elt="find button"
        {
            dl class="grid grid-cols-2 gap-2 text-sm"
            {
                dt class="font-medium" { "Customer" }
                dd { (holdings.customer.full_name()) }
                @if let Some(account_number) = mode.account_number() {
                    dt class="font-medium" { "Account" }
                    dd { (account_number) }
                }
                @if let Some(terms) = terms {
                    dt class="font-medium" { (kind.amount_label()) }
                    dd class="tabular-nums" { (format_currency(terms.amount)) }
                    dt class="font-medium" { "Interest Rate" }
                    dd { (terms.interest_rate) "%" }
                    dt class="font-medium" { "Tenure" }
                    dd { (terms.tenure_months) " months" }
                    dt class="font-medium" { "Estimated maturity amount" }
                    dd class="tabular-nums" id="estimated-maturity"
                    {
                        (format_currency(estimate_maturity_amount(kind, &terms)))
                    }
                }
            }

            (hidden_ids(holdings.customer.user_id, mode))
            input type="hidden" name="amount" value=(draft.amount);
            input type="hidden" name="interest_rate" value=(draft.interest_rate);
            input type="hidden" name="tenure_months" value=(draft.tenure_months);

            div class="flex gap-2"
            {
                button type="button" hx-post=(edit_url) class=(BUTTON_SECONDARY_STYLE) { "Edit" }
                button type="submit" class=(BUTTON_PRIMARY_STYLE)
                {
                    "Confirm " (action)
                }
            }
        }
    }
}

fn deposit_modal(state: &DepositModal, kind: DepositKind, holdings: &CustomerHoldings) -> Markup {
    let title = |mode: &FormMode| match mode {
        FormMode::Create => format!("Create {}", kind.name()),
        FormMode::Update { account_number } => format!("Update {account_number}"),
    };

    match state {
        ModalState::FormOpen { mode, draft, error } => modal(
            &title(mode),
            &deposit_form(kind, holdings, mode, draft, error.as_deref()),
        ),
        ModalState::ConfirmOpen { mode, draft } => modal(
            &format!("Confirm {}", kind.name()),
            &deposit_confirmation(kind, holdings, mode, draft),
        ),
        ModalState::Submitting { mode, .. } => modal(
            &title(mode),
            &html! { p class="text-sm" { (loading_spinner()) "Submitting…" } },
        ),
        _ => html! {},
    }
}

fn open_form(mode: FormMode, draft: DepositDraft) -> DepositModal {
    ModalState::Idle.apply(ModalEvent::Open { mode, draft })
}

fn failure_message(kind: DepositKind, mode: &FormMode, error: impl std::fmt::Display) -> String {
    let verb = match mode {
        FormMode::Create => "create",
        FormMode::Update { .. } => "update",
    };

    format!("Failed to {verb} {} account: {error}", kind.abbreviation())
}

/// Opens the form for a new account, or for an existing account filled with
/// its current terms.
pub async fn get_deposit_form(
    State(state): State<DepositsState>,
    Extension(session): Extension<Session>,
    Path(kind): Path<DepositKind>,
    Query(query): Query<DepositFormQuery>,
) -> Response {
    let result = async {
        let holdings =
            find_customer(&state, kind, query.customer_id, &session.branch_scope()).await?;
        let mode = FormMode::from_account_number(query.account_number.as_deref());

        let draft = match mode.account_number() {
            None => DepositDraft::default(),
            Some(account_number) => {
                let account = holdings
                    .accounts
                    .iter()
                    .find(|account| account.account_number == account_number)
                    .ok_or(Error::NotFound)?;

                DepositDraft::from(DepositTerms {
                    amount: account.amount,
                    interest_rate: account.interest_rate,
                    tenure_months: account.tenure_months,
                })
            }
        };

        Ok::<_, Error>(deposit_modal(&open_form(mode, draft), kind, &holdings))
    }
    .await;

    match result {
        Ok(markup) => markup.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Validates the deposit form and shows the confirmation with an estimated
/// maturity amount, or the form again with the reason it was rejected.
pub async fn post_deposit_review(
    State(state): State<DepositsState>,
    Extension(session): Extension<Session>,
    Path(kind): Path<DepositKind>,
    Form(form): Form<DepositForm>,
) -> Response {
    let holdings =
        match find_customer(&state, kind, form.customer_id, &session.branch_scope()).await {
            Ok(holdings) => holdings,
            Err(error) => return error.into_alert_response(),
        };
    let mode = form.mode();
    let draft = form.into_draft();

    let event = match validate_deposit(kind, &draft) {
        Ok(_) => ModalEvent::Validated(draft.clone()),
        Err(error) => ModalEvent::Rejected {
            draft: draft.clone(),
            message: error.to_string(),
        },
    };
    let next = open_form(mode, draft).apply(event);

    deposit_modal(&next, kind, &holdings).into_response()
}

/// Goes back from the confirmation to the form, keeping the entered values.
pub async fn post_deposit_edit(
    State(state): State<DepositsState>,
    Extension(session): Extension<Session>,
    Path(kind): Path<DepositKind>,
    Form(form): Form<DepositForm>,
) -> Response {
    let holdings =
        match find_customer(&state, kind, form.customer_id, &session.branch_scope()).await {
            Ok(holdings) => holdings,
            Err(error) => return error.into_alert_response(),
        };
    let confirming = ModalState::ConfirmOpen {
        mode: form.mode(),
        draft: form.into_draft(),
    };

    deposit_modal(&confirming.apply(ModalEvent::Back), kind, &holdings).into_response()
}

/// Opens or changes a confirmed deposit with the backend.
///
/// On success the modal closes, an alert confirms the change and the
/// customer's row is swapped in with the new account count. On failure the
/// form is shown again with the entered values.
pub async fn post_deposit(
    State(state): State<DepositsState>,
    Extension(session): Extension<Session>,
    Path(kind): Path<DepositKind>,
    Form(form): Form<DepositForm>,
) -> Response {
    let customer_id = form.customer_id;
    let mode = form.mode();
    let scope = session.branch_scope();
    let found = match mode.account_number() {
        None => find_customer(&state, kind, customer_id, &scope).await,
        Some(account_number) => {
            find_customer_account(&state, kind, customer_id, account_number, &scope).await
        }
    };
    let holdings = match found {
        Ok(holdings) => holdings,
        Err(error) => return error.into_alert_response(),
    };
    let local_offset = match local_offset(&state.local_timezone) {
        Ok(offset) => offset,
        Err(error) => return error.into_alert_response(),
    };
    let draft = form.into_draft();

    let terms = match validate_deposit(kind, &draft) {
        Ok(terms) => terms,
        Err(error) => {
            let rejected = open_form(mode, draft.clone()).apply(ModalEvent::Rejected {
                draft,
                message: error.to_string(),
            });
            return deposit_modal(&rejected, kind, &holdings).into_response();
        }
    };

    let submitting = ModalState::ConfirmOpen {
        mode: mode.clone(),
        draft,
    }
    .apply(ModalEvent::Confirm);

    let written = match &mode {
        FormMode::Create => state.backend.create_deposit(kind, customer_id, &terms).await,
        FormMode::Update { account_number } => {
            state
                .backend
                .update_deposit(kind, account_number, &terms)
                .await
        }
    };

    if let Err(error) = written {
        tracing::error!(
            "could not save {} for customer {customer_id}: {error}",
            kind.abbreviation()
        );
        let failed = submitting.apply(ModalEvent::Failed {
            message: failure_message(kind, &mode, &error),
        });
        return deposit_modal(&failed, kind, &holdings).into_response();
    }

    let optimistic_mode = mode.clone();
    let reloaded = reload_customer(&state, kind, customer_id, move |accounts| {
        match optimistic_mode {
            FormMode::Create => accounts.push(DepositAccount {
                account_number: String::new(),
                amount: terms.amount,
                interest_rate: terms.interest_rate,
                tenure_months: terms.tenure_months,
                maturity_amount: None,
                maturity_date: None,
                status: "PENDING".to_owned(),
                created_at: String::new(),
            }),
            FormMode::Update { account_number } => {
                if let Some(account) = accounts
                    .iter_mut()
                    .find(|account| account.account_number == account_number)
                {
                    account.amount = terms.amount;
                    account.interest_rate = terms.interest_rate;
                    account.tenure_months = terms.tenure_months;
                }
            }
        }
    })
    .await;

    let closed = submitting.apply(ModalEvent::Succeeded);
    let message = match mode {
        FormMode::Create => format!("{} created successfully!", kind.name()),
        FormMode::Update { .. } => format!("{} updated successfully!", kind.name()),
    };

    html! {
        (deposit_modal(&closed, kind, &holdings))
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
