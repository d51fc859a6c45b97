//! The deposit and withdrawal modal of the savings page.
//!
//! Every step posts the whole draft back, so each handler rebuilds the modal
//! state from the request, applies the step's event and renders the result.

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    alert::Alert,
    backend::{PaymentMode, SavingsAccount, TransactionType},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, MODAL_CONTAINER_ID, format_currency, loading_spinner, modal,
    },
    modal::{FormMode, ModalEvent, ModalState},
    timezone::local_offset,
    validation::{PaymentDraft, validate_payment},
};

use super::accounts_page::{SavingsState, find_account, savings_row};

/// Whether money is paid into or taken out of a savings account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentDirection {
    /// A credit to the account.
    Deposit,
    /// A debit from the account.
    Withdraw,
}

impl PaymentDirection {
    /// The value used in the payment endpoints' `{direction}` parameter.
    pub fn as_path_segment(self) -> &'static str {
        match self {
            PaymentDirection::Deposit => "deposit",
            PaymentDirection::Withdraw => "withdraw",
        }
    }

    /// The transaction type recorded by the backend.
    pub fn transaction_type(self) -> TransactionType {
        match self {
            PaymentDirection::Deposit => TransactionType::Credit,
            PaymentDirection::Withdraw => TransactionType::Debit,
        }
    }

    fn noun(self) -> &'static str {
        match self {
            PaymentDirection::Deposit => "payment",
            PaymentDirection::Withdraw => "withdrawal",
        }
    }

    fn title(self) -> &'static str {
        match self {
            PaymentDirection::Deposit => "Deposit",
            PaymentDirection::Withdraw => "Withdraw",
        }
    }
}

type PaymentModal = ModalState<PaymentDraft>;

fn payment_url(endpoint: &str, account_number: &str, direction: PaymentDirection) -> String {
    format_endpoint(endpoint, &[account_number, direction.as_path_segment()])
}

fn text_input(name: &str, label: &str, value: &str, hint: &str) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }
            input
                type="text"
                id=(name)
                name=(name)
                value=(value)
                autocomplete="off"
                class=(FORM_TEXT_INPUT_STYLE);
            @if !hint.is_empty() {
                p class="mt-1 text-xs text-gray-500 dark:text-gray-400" { (hint) }
            }
        }
    }
}

fn payment_form(
    account: &SavingsAccount,
    direction: PaymentDirection,
    draft: &PaymentDraft,
    error: Option<&str>,
) -> Markup {
    let review_url = payment_url(endpoints::PAYMENT_REVIEW, &account.account_number, direction);

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
                (account.name) " · " (account.account_number) " · Balance "
                span class="font-semibold tabular-nums" { (format_currency(account.current_balance)) }
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                div class="input-wrapper"
                {
                    input
                        type="number"
                        id="amount"
                        name="amount"
                        step="0.01"
                        min="0.01"
                        required
                        autofocus
                        value=(draft.amount)
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="pay_mode" class=(FORM_LABEL_STYLE) { "Payment Mode" }
                select id="pay_mode" name="pay_mode" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for mode in PaymentMode::ALL {
                        option value=(mode.as_str()) selected[draft.pay_mode == mode.as_str()]
                        {
                            (mode.as_str())
                        }
                    }
                }
            }

            (text_input("utr_no", "UTR Number", &draft.utr_no, "Required for IMPS payments."))
            (text_input("cheque_number", "Cheque Number", &draft.cheque_number, "Required for cheque payments."))
            (text_input("note", "Note", &draft.note, ""))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Review" }
        }
    }
}

fn hidden_draft(draft: &PaymentDraft) -> Markup {
    html! {
        input type="hidden" name="amount" value=(draft.amount);
        input type="hidden" name="pay_mode" value=(draft.pay_mode);
        input type="hidden" name="utr_no" value=(draft.utr_no);
        input type="hidden" name="cheque_number" value=(draft.cheque_number);
        input type="hidden" name="note" value=(draft.note);
    }
}

fn display_amount(raw: &str) -> String {
    raw.trim()
        .parse::<f64>()
        .map(format_currency)
        .unwrap_or_else(|_| raw.to_owned())
}

fn payment_confirmation(
    account: &SavingsAccount,
    direction: PaymentDirection,
    draft: &PaymentDraft,
) -> Markup {
    let submit_url = payment_url(endpoints::PAYMENTS, &account.account_number, direction);
    let edit_url = payment_url(endpoints::PAYMENT_EDIT, &account.account_number, direction);
    let reference = match PaymentMode::from_wire(draft.pay_mode.trim()) {
        Some(PaymentMode::Imps) => Some(("UTR Number", draft.utr_no.trim())),
        Some(PaymentMode::Cheque) => Some(("Cheque Number", draft.cheque_number.trim())),
        _ => None,
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
                dt class="font-medium" { "Account" }
                dd { (account.account_number) }
                dt class="font-medium" { "Holder" }
                dd { (account.name) }
                dt class="font-medium" { "Amount" }
                dd class="tabular-nums" { (display_amount(&draft.amount)) }
                dt class="font-medium" { "Payment Mode" }
                dd { (draft.pay_mode) }
                @if let Some((label, value)) = reference {
                    dt class="font-medium" { (label) }
                    dd { (value) }
                }
                @if !draft.note.trim().is_empty() {
                    dt class="font-medium" { "Note" }
                    dd { (draft.note.trim()) }
                }
            }

            (hidden_draft(draft))

            div class="flex gap-2"
            {
                button type="button" hx-post=(edit_url) class=(BUTTON_SECONDARY_STYLE) { "Edit" }
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Confirm " (direction.title()) }
            }
        }
    }
}

fn payment_modal(
    state: &PaymentModal,
    account: &SavingsAccount,
    direction: PaymentDirection,
) -> Markup {
    let title = format!("{} - {}", direction.title(), account.account_number);

    match state {
        ModalState::FormOpen { draft, error, .. } => modal(
            &title,
            &payment_form(account, direction, draft, error.as_deref()),
        ),
        ModalState::ConfirmOpen { draft, .. } => modal(
            &format!("Confirm {}", direction.noun()),
            &payment_confirmation(account, direction, draft),
        ),
        ModalState::Submitting { .. } => modal(
            &title,
            &html! { p class="text-sm" { (loading_spinner()) "Submitting…" } },
        ),
        _ => html! {},
    }
}

fn open_form(account_number: &str, draft: PaymentDraft) -> PaymentModal {
    ModalState::Idle.apply(ModalEvent::Open {
        mode: FormMode::Update {
            account_number: account_number.to_owned(),
        },
        draft,
    })
}

/// Opens the deposit or withdrawal form for an account.
pub async fn get_payment_form(
    State(state): State<SavingsState>,
    Path((account_number, direction)): Path<(String, PaymentDirection)>,
) -> Response {
    let account = match find_account(&state, &account_number).await {
        Ok(account) => account,
        Err(error) => return error.into_alert_response(),
    };
    let draft = PaymentDraft {
        pay_mode: PaymentMode::Cash.as_str().to_owned(),
        ..PaymentDraft::default()
    };

    payment_modal(&open_form(&account_number, draft), &account, direction).into_response()
}

/// Validates the payment form and shows the confirmation, or the form again
/// with the reason it was rejected.
pub async fn post_payment_review(
    State(state): State<SavingsState>,
    Path((account_number, direction)): Path<(String, PaymentDirection)>,
    Form(draft): Form<PaymentDraft>,
) -> Response {
    let account = match find_account(&state, &account_number).await {
        Ok(account) => account,
        Err(error) => return error.into_alert_response(),
    };

    let event = match validate_payment(
        direction.transaction_type(),
        &draft,
        account.current_balance,
    ) {
        Ok(_) => ModalEvent::Validated(draft.clone()),
        Err(error) => ModalEvent::Rejected {
            draft: draft.clone(),
            message: error.to_string(),
        },
    };
    let next = open_form(&account_number, draft).apply(event);

    payment_modal(&next, &account, direction).into_response()
}

/// Goes back from the confirmation to the form, keeping the entered values.
pub async fn post_payment_edit(
    State(state): State<SavingsState>,
    Path((account_number, direction)): Path<(String, PaymentDirection)>,
    Form(draft): Form<PaymentDraft>,
) -> Response {
    let account = match find_account(&state, &account_number).await {
        Ok(account) => account,
        Err(error) => return error.into_alert_response(),
    };

    let confirming = ModalState::ConfirmOpen {
        mode: FormMode::Update { account_number },
        draft,
    };

    payment_modal(&confirming.apply(ModalEvent::Back), &account, direction).into_response()
}

/// Records a confirmed payment with the backend.
///
/// On success the modal closes, an alert confirms the payment and the
/// account's row is swapped in with the new balance. On failure the form is
/// shown again with the entered values.
pub async fn post_payment(
    State(state): State<SavingsState>,
    Path((account_number, direction)): Path<(String, PaymentDirection)>,
    Form(draft): Form<PaymentDraft>,
) -> Response {
    let account = match find_account(&state, &account_number).await {
        Ok(account) => account,
        Err(error) => return error.into_alert_response(),
    };
    let local_offset = match local_offset(&state.local_timezone) {
        Ok(offset) => offset,
        Err(error) => return error.into_alert_response(),
    };

    let payment = match validate_payment(
        direction.transaction_type(),
        &draft,
        account.current_balance,
    ) {
        Ok(payment) => payment,
        Err(error) => {
            let rejected = open_form(&account_number, draft.clone()).apply(ModalEvent::Rejected {
                draft,
                message: error.to_string(),
            });
            return payment_modal(&rejected, &account, direction).into_response();
        }
    };

    let submitting = ModalState::ConfirmOpen {
        mode: FormMode::Update {
            account_number: account_number.clone(),
        },
        draft,
    }
    .apply(ModalEvent::Confirm);

    if let Err(error) = state.backend.record_payment(&account_number, &payment).await {
        tracing::error!(
            "could not record {} for {account_number}: {error}",
            direction.noun()
        );
        let failed = submitting.apply(ModalEvent::Failed {
            message: format!("Failed to submit {}: {error}", direction.noun()),
        });
        return payment_modal(&failed, &account, direction).into_response();
    }

    let change = match payment.transaction_type {
        TransactionType::Credit => payment.amount,
        TransactionType::Debit => -payment.amount,
    };
    let updated = SavingsAccount {
        current_balance: account.current_balance + change,
        ..account
    };
    let cached = state.accounts.write_through(|accounts| {
        if let Some(cached) = accounts
            .iter_mut()
            .find(|cached| cached.account_number == account_number)
        {
            cached.current_balance += change;
        }
    });
    if let Err(error) = cached {
        tracing::warn!("could not update the cached balance of {account_number}: {error}");
    }

    let closed = submitting.apply(ModalEvent::Succeeded);
    let alert = Alert::Success {
        message: format!(
            "Amount {} {} successfully!",
            format_currency(payment.amount),
            direction.noun()
        ),
        details: format!(
            "New balance of {account_number} is {}.",
            format_currency(updated.current_balance)
        ),
    };

    html! {
        (payment_modal(&closed, &updated, direction))
        (alert.into_html())
        template
        {
            (savings_row(&updated, local_offset, true))
        }
    }
    .into_response()
}
