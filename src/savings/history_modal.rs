//! The transaction history modal of the savings page.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::{Date, UtcOffset, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    backend::{PaymentMode, SavingsAccount, SavingsTransaction, TransactionType},
    endpoints::{self, format_endpoint},
    history::HistoryFilter,
    html::{
        BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, MODAL_CONTAINER_ID,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency, format_timestamp,
        load_error, modal,
    },
    timestamp::parse_timestamp,
    timezone::local_offset,
};

use super::accounts_page::{SavingsState, find_account};

const DATE_INPUT_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

fn date_input_value(date: Option<Date>) -> String {
    date.and_then(|date| date.format(DATE_INPUT_FORMAT).ok())
        .unwrap_or_default()
}

fn reference(transaction: &SavingsTransaction) -> &str {
    transaction
        .utr_no
        .as_deref()
        .or(transaction.cheque_number.as_deref())
        .unwrap_or("-")
}

fn transaction_row(transaction: &SavingsTransaction, local_offset: UtcOffset) -> Markup {
    let timestamp = parse_timestamp(&transaction.created_at, local_offset);
    let (type_label, amount_style) = match transaction.transaction_type {
        TransactionType::Credit => ("Credit", "text-green-700 dark:text-green-400"),
        TransactionType::Debit => ("Debit", "text-red-700 dark:text-red-400"),
    };

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (format_timestamp(timestamp, local_offset)) }
            td class={ "px-6 py-4 text-right tabular-nums " (amount_style) }
            {
                (format_currency(transaction.amount))
            }
            td class=(TABLE_CELL_STYLE) { (type_label) }
            td class=(TABLE_CELL_STYLE) { (transaction.pay_mode) }
            td class=(TABLE_CELL_STYLE) { (reference(transaction)) }
            td class=(TABLE_CELL_STYLE) { (transaction.note.as_deref().unwrap_or("")) }
        }
    }
}

fn filter_form(history_url: &str, filter: &HistoryFilter) -> Markup {
    let target = format!("#{MODAL_CONTAINER_ID}");
    let selected_mode = filter.mode().unwrap_or("");

    html! {
        form
            class="grid grid-cols-1 sm:grid-cols-3 gap-2 items-end"
            hx-get=(history_url)
            hx-target=(target)
            hx-target-error="#alert-container"
            hx-trigger="change"
        {
            div
            {
                label for="from" class=(FORM_LABEL_STYLE) { "From" }
                input
                    type="date"
                    id="from"
                    name="from"
                    value=(date_input_value(filter.from))
                    class=(FORM_TEXT_INPUT_STYLE);
            }
            div
            {
                label for="to" class=(FORM_LABEL_STYLE) { "To" }
                input
                    type="date"
                    id="to"
                    name="to"
                    value=(date_input_value(filter.to))
                    class=(FORM_TEXT_INPUT_STYLE);
            }
            div
            {
                label for="mode" class=(FORM_LABEL_STYLE) { "Payment Mode" }
                select id="mode" name="mode" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[selected_mode.is_empty()] { "All" }
                    @for mode in PaymentMode::ALL {
                        option
                            value=(mode.as_str())
                            selected[selected_mode.eq_ignore_ascii_case(mode.as_str())]
                        {
                            (mode.as_str())
                        }
                    }
                }
            }

            @if filter.is_active() {
                button
                    type="button"
                    class=(BUTTON_SECONDARY_STYLE)
                    hx-get=(history_url)
                    hx-target=(target)
                {
                    "Clear filters"
                }
            }
        }
    }
}

fn transactions_table(
    transactions: &[SavingsTransaction],
    filtered: bool,
    local_offset: UtcOffset,
) -> Markup {
    html! {
        div class="overflow-x-auto"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date & Time" }
                        th scope="col" class="px-6 py-3 text-right" { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Mode" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Reference" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Note" }
                    }
                }
                tbody
                {
                    @for transaction in transactions {
                        (transaction_row(transaction, local_offset))
                    }

                    @if transactions.is_empty() {
                        tr
                        {
                            td colspan="6" class="px-6 py-4 text-center"
                            {
                                @if filtered {
                                    "No transactions match the filters."
                                } @else {
                                    "No transactions found."
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn history_modal(
    account: &SavingsAccount,
    filter: &HistoryFilter,
    transactions: Result<&[SavingsTransaction], &str>,
    local_offset: UtcOffset,
) -> Markup {
    let history_url = format_endpoint(endpoints::SAVINGS_HISTORY, &[&account.account_number]);

    let content = html! {
        p class="text-sm"
        {
            (account.name) " · Balance "
            span class="font-semibold tabular-nums" { (format_currency(account.current_balance)) }
        }

        (filter_form(&history_url, filter))

        @match transactions {
            Ok(transactions) => { (transactions_table(transactions, filter.is_active(), local_offset)) }
            Err(message) => { (load_error(message)) }
        }
    };

    modal(&format!("History - {}", account.account_number), &content)
}

/// Shows the transactions of a savings account, newest first, narrowed by
/// the filter in the query string.
///
/// The history is refetched on every request. Opening the modal from the
/// accounts table sends no filters, so it always starts unfiltered.
pub async fn get_savings_history(
    State(state): State<SavingsState>,
    Path(account_number): Path<String>,
    Query(filter): Query<HistoryFilter>,
) -> Response {
    let local_offset = match local_offset(&state.local_timezone) {
        Ok(offset) => offset,
        Err(error) => return error.into_alert_response(),
    };
    let account = match find_account(&state, &account_number).await {
        Ok(account) => account,
        Err(error) => return error.into_alert_response(),
    };

    let view = match state.backend.list_savings_transactions(&account_number).await {
        Ok(transactions) => {
            let transactions = filter.apply(&transactions, local_offset);
            history_modal(&account, &filter, Ok(&transactions), local_offset)
        }
        Err(error) => {
            tracing::error!("could not fetch transactions of {account_number}: {error}");
            history_modal(
                &account,
                &filter,
                Err("Failed to fetch transactions"),
                local_offset,
            )
        }
    };

    view.into_response()
}
