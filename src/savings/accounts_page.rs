//! Lists savings accounts with a debounced search by holder name or account number.

use std::{borrow::Cow, sync::Arc};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::UtcOffset;

use crate::{
    AppState, Error,
    auth::Session,
    backend::{Backend, SavingsAccount},
    browser::RecordBrowser,
    cache::RefreshingCache,
    debounce::SEARCH_DEBOUNCE,
    endpoints::{self, format_endpoint},
    html::{
        BADGE_STYLE, LINK_STYLE, MODAL_CONTAINER_ID, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency, format_date, load_error,
        rupee_input_styles, search_controls,
    },
    navigation::NavBar,
    search::{SearchField, SearchQuery, SearchSpec, Searchable},
    timestamp::parse_timestamp,
    timezone::local_offset,
};

use super::payment::PaymentDirection;

impl Searchable for SavingsAccount {
    const SEARCH_FIELDS: &'static [SearchField] = &[SearchField::Name, SearchField::AccountNumber];

    fn search_value(&self, field: SearchField) -> Option<Cow<'_, str>> {
        match field {
            SearchField::Name => Some(Cow::Borrowed(&self.name)),
            SearchField::AccountNumber => Some(Cow::Borrowed(&self.account_number)),
            _ => None,
        }
    }
}

const DEFAULT_SEARCH_FIELD: SearchField = SearchField::Name;
const ROWS_ID: &str = "savings-rows";
const COLUMN_COUNT: u8 = 6;

/// The state needed by the savings page and its modals.
#[derive(Clone)]
pub struct SavingsState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
    /// The REST backend.
    pub backend: Arc<dyn Backend>,
    /// The last known savings accounts.
    pub accounts: RefreshingCache<Vec<SavingsAccount>>,
}

impl FromRef<AppState> for SavingsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            backend: state.backend.clone(),
            accounts: state.savings.clone(),
        }
    }
}

/// The cached account with `account_number`, fetching the list if nothing is
/// cached yet.
///
/// # Errors
///
/// Returns [Error::NotFound] if no such account is known.
pub(super) async fn find_account(
    state: &SavingsState,
    account_number: &str,
) -> Result<SavingsAccount, Error> {
    state
        .accounts
        .cache()
        .get_or_refresh(state.backend.list_savings_accounts())
        .await?
        .into_iter()
        .find(|account| account.account_number == account_number)
        .ok_or(Error::NotFound)
}

/// The ID of the table row showing `account_number`.
pub(super) fn row_id(account_number: &str) -> String {
    format!("savings-row-{account_number}")
}

fn action_button(label: &str, url: &str) -> Markup {
    html! {
        button
            type="button"
            class=(LINK_STYLE)
            hx-get=(url)
            hx-target={ "#" (MODAL_CONTAINER_ID) }
            hx-target-error="#alert-container"
        {
            (label)
        }
    }
}

/// A row of the accounts table, tagged for an out-of-band swap by its ID if
/// `out_of_band` is set.
pub(super) fn savings_row(
    account: &SavingsAccount,
    local_offset: UtcOffset,
    out_of_band: bool,
) -> Markup {
    let payment_url = |direction: PaymentDirection| {
        format_endpoint(
            endpoints::PAYMENT_FORM,
            &[&account.account_number, direction.as_path_segment()],
        )
    };
    let history_url = format_endpoint(endpoints::SAVINGS_HISTORY, &[&account.account_number]);
    let opened = format_date(parse_timestamp(&account.created_at, local_offset), local_offset);

    html! {
        tr
            id=(row_id(&account.account_number))
            hx-swap-oob=[out_of_band.then_some("true")]
            class=(TABLE_ROW_STYLE)
        {
            th
                scope="row"
                class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
            {
                (account.name)
            }
            td class=(TABLE_CELL_STYLE) { (account.account_number) }
            td class="px-6 py-4 text-right tabular-nums" { (format_currency(account.current_balance)) }
            td class=(TABLE_CELL_STYLE) { (opened) }
            td class=(TABLE_CELL_STYLE) { span class=(BADGE_STYLE) { (account.status) } }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    (action_button("Deposit", &payment_url(PaymentDirection::Deposit)))
                    (action_button("Withdraw", &payment_url(PaymentDirection::Withdraw)))
                    (action_button("History", &history_url))
                }
            }
        }
    }
}

fn savings_rows(accounts: &[SavingsAccount], searching: bool, local_offset: UtcOffset) -> Markup {
    html! {
        @for account in accounts {
            (savings_row(account, local_offset, false))
        }

        @if accounts.is_empty() {
            tr
            {
                td
                    colspan=(COLUMN_COUNT)
                    class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                {
                    @if searching {
                        "No savings accounts match your search."
                    } @else {
                        "No savings accounts found."
                    }
                }
            }
        }
    }
}

fn savings_view(
    staff_name: &str,
    spec: &SearchSpec,
    accounts: Result<&[SavingsAccount], &str>,
    local_offset: UtcOffset,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::SAVINGS_VIEW, staff_name).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Savings Accounts" }
                }

                (search_controls(
                    endpoints::SAVINGS_ROWS,
                    &format!("#{ROWS_ID}"),
                    SavingsAccount::SEARCH_FIELDS,
                    spec,
                    SEARCH_DEBOUNCE.as_millis(),
                ))

                @match accounts {
                    Ok(accounts) => {
                        section class="w-full overflow-x-auto dark:bg-gray-800"
                        {
                            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                            {
                                thead class=(TABLE_HEADER_STYLE)
                                {
                                    tr
                                    {
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Account Number" }
                                        th scope="col" class="px-6 py-3 text-right" { "Balance" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Opened" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                                    }
                                }

                                tbody id=(ROWS_ID)
                                {
                                    (savings_rows(accounts, !spec.is_blank(), local_offset))
                                }
                            }
                        }
                    }
                    Err(message) => { (load_error(message)) }
                }
            }
        }
    };

    base("Savings", &[rupee_input_styles()], &content)
}

/// Renders the savings page, refetching the account list.
pub async fn get_savings_page(
    State(state): State<SavingsState>,
    Extension(session): Extension<Session>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, Error> {
    let local_offset = local_offset(&state.local_timezone)?;
    let spec = query.into_spec::<SavingsAccount>(DEFAULT_SEARCH_FIELD)?;

    let fetched = state
        .accounts
        .cache()
        .refresh(state.backend.list_savings_accounts())
        .await
        .inspect_err(|error| tracing::error!("could not fetch savings accounts: {error}"));

    let view = match fetched {
        Ok(accounts) => {
            let accounts = RecordBrowser::new(accounts, spec.clone()).into_view();
            savings_view(&session.user.name, &spec, Ok(&accounts), local_offset)
        }
        Err(_) => savings_view(
            &session.user.name,
            &spec,
            Err("Failed to fetch accounts. Try refreshing the page."),
            local_offset,
        ),
    };

    Ok(view.into_response())
}

/// Renders the rows of the accounts table that match the search.
pub async fn get_savings_rows(
    State(state): State<SavingsState>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let result = async {
        let local_offset = local_offset(&state.local_timezone)?;
        let spec = query.into_spec::<SavingsAccount>(DEFAULT_SEARCH_FIELD)?;
        let accounts = state
            .accounts
            .cache()
            .get_or_refresh(state.backend.list_savings_accounts())
            .await?;
        let searching = !spec.is_blank();
        let accounts = RecordBrowser::new(accounts, spec).into_view();

        Ok::<_, Error>(savings_rows(&accounts, searching, local_offset))
    }
    .await;

    match result {
        Ok(rows) => rows.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

#[cfg(test)]
mod savings_page_tests {
    use std::sync::Arc;

    use axum::{
        Extension,
        extract::{FromRef, Query, State},
        http::StatusCode,
    };
    use scraper::{Html, Selector};

    use crate::{
        backend::{BackendError, FakeBackend, StaffRole},
        search::SearchQuery,
        test_utils::{
            assert_valid_html, parse_html_document, parse_html_rows, staff_session,
            test_app_state,
        },
    };

    use super::{SavingsState, get_savings_page, get_savings_rows};

    fn get_test_state() -> (SavingsState, Arc<FakeBackend>) {
        let backend = Arc::new(FakeBackend::default());
        backend.add_savings_account("SB001", "Amit Kumar", 1500.0);
        backend.add_savings_account("SB002", "Sunita Rao", 250.5);
        backend.add_savings_account("SB010", "Ravi Shah", 0.0);

        let state = SavingsState::from_ref(&test_app_state(backend.clone()));

        (state, backend)
    }

    fn query(q: &str, field: &str) -> Query<SearchQuery> {
        Query(SearchQuery {
            q: q.to_owned(),
            field: field.to_owned(),
        })
    }

    fn row_names(html: &Html) -> Vec<String> {
        html.select(&Selector::parse("tr[id^='savings-row-'] th").unwrap())
            .map(|cell| cell.text().collect::<String>().trim().to_owned())
            .collect()
    }

    #[tokio::test]
    async fn page_lists_every_account() {
        let (state, _) = get_test_state();

        let response = get_savings_page(
            State(state),
            Extension(staff_session(StaffRole::Admin, Some("Pune"))),
            query("", ""),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(row_names(&html), vec!["Amit Kumar", "Sunita Rao", "Ravi Shah"]);

        let search = html
            .select(&Selector::parse("form[hx-get='/api/savings/rows']").unwrap())
            .next()
            .expect("no search form");
        let trigger = search.value().attr("hx-trigger").unwrap();
        assert!(trigger.contains("delay:500ms"), "got trigger {trigger}");
    }

    #[tokio::test]
    async fn rows_filter_by_account_number() {
        let (state, _) = get_test_state();

        let response = get_savings_rows(State(state), query("sb00", "accountNumber")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_rows(response).await;
        assert_eq!(row_names(&html), vec!["Amit Kumar", "Sunita Rao"]);
    }

    #[tokio::test]
    async fn rows_with_no_match_show_message() {
        let (state, _) = get_test_state();

        let response = get_savings_rows(State(state), query("zzz", "name")).await;

        let html = parse_html_rows(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("No savings accounts match your search."));
    }

    #[tokio::test]
    async fn rows_reject_unsupported_field() {
        let (state, _) = get_test_state();

        let response = get_savings_rows(State(state), query("98765", "mobile")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn failed_fetch_shows_error_instead_of_table() {
        let (state, backend) = get_test_state();
        backend.fail_reads(BackendError::Timeout);

        let response = get_savings_page(
            State(state),
            Extension(staff_session(StaffRole::Admin, Some("Pune"))),
            query("", ""),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert!(html.select(&Selector::parse("table").unwrap()).next().is_none());
        let alert = html
            .select(&Selector::parse("p[role='alert']").unwrap())
            .next()
            .expect("no load error");
        assert!(alert.text().collect::<String>().contains("Failed to fetch accounts"));
    }
}
