//! Lists the customers of the staff member's branch with the deposits of
//! one kind that each of them holds.

use std::{borrow::Cow, sync::Arc};

use axum::{
    Extension,
    extract::{FromRef, Path, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::UtcOffset;

use crate::{
    AppState, Error,
    account_check::CustomerHoldings,
    app_state::{DepositCaches, fetch_holdings},
    auth::{BranchScope, Session},
    backend::{Backend, DepositAccount},
    browser::RecordBrowser,
    debounce::SEARCH_DEBOUNCE,
    deposit_kind::DepositKind,
    endpoints::{self, format_endpoint},
    html::{
        BADGE_STYLE, LINK_STYLE, MODAL_CONTAINER_ID, NEW_BADGE_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_date, load_error, rupee_input_styles, search_controls,
    },
    navigation::NavBar,
    priority::sort_by_account_priority,
    search::{SearchField, SearchQuery, SearchSpec, Searchable},
    timestamp::parse_timestamp,
    timezone::local_offset,
};

use super::accounts_modal::form_url;

impl Searchable for CustomerHoldings {
    const SEARCH_FIELDS: &'static [SearchField] = &[SearchField::Name, SearchField::Mobile];

    fn search_value(&self, field: SearchField) -> Option<Cow<'_, str>> {
        match field {
            SearchField::Name => Some(Cow::Owned(self.customer.full_name())),
            SearchField::Mobile => self.customer.mobile.as_deref().map(Cow::Borrowed),
            _ => None,
        }
    }
}

const DEFAULT_SEARCH_FIELD: SearchField = SearchField::Name;
const ROWS_ID: &str = "customer-rows";
const COLUMN_COUNT: u8 = 8;

/// The state needed by the deposit pages and their modals.
#[derive(Clone)]
pub struct DepositsState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
    /// The REST backend.
    pub backend: Arc<dyn Backend>,
    /// The last known customer holdings per deposit kind.
    pub holdings: DepositCaches,
}

impl FromRef<AppState> for DepositsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            backend: state.backend.clone(),
            holdings: state.deposits.clone(),
        }
    }
}

/// The cached holdings of `customer_id`, fetching every customer first if
/// nothing is cached yet.
///
/// # Errors
///
/// Returns [Error::NotFound] if the customer does not exist or belongs to a
/// branch outside `scope`.
pub(super) async fn find_customer(
    state: &DepositsState,
    kind: DepositKind,
    customer_id: i64,
    scope: &BranchScope,
) -> Result<CustomerHoldings, Error> {
    state
        .holdings
        .get(kind)
        .cache()
        .get_or_refresh(fetch_holdings(state.backend.as_ref(), kind))
        .await?
        .into_iter()
        .find(|holdings| holdings.customer.user_id == customer_id)
        .filter(|holdings| scope.admits(holdings.customer.branch.as_deref()))
        .ok_or(Error::NotFound)
}

/// Like [find_customer], but also requires `account_number` to be one of the
/// customer's accounts.
pub(super) async fn find_customer_account(
    state: &DepositsState,
    kind: DepositKind,
    customer_id: i64,
    account_number: &str,
    scope: &BranchScope,
) -> Result<CustomerHoldings, Error> {
    let holdings = find_customer(state, kind, customer_id, scope).await?;

    if !holdings
        .accounts
        .iter()
        .any(|account| account.account_number == account_number)
    {
        tracing::warn!("{account_number} is not an account of customer {customer_id}");
        return Err(Error::NotFound);
    }

    Ok(holdings)
}

/// Reload the accounts of `customer_id` after a write, storing them in the
/// cache.
///
/// If the reload fails, `optimistic` is applied to the cached accounts
/// instead. Either way the cache schedules a full refetch. Returns the
/// customer's cached holdings, if the customer is cached.
pub(super) async fn reload_customer(
    state: &DepositsState,
    kind: DepositKind,
    customer_id: i64,
    optimistic: impl FnOnce(&mut Vec<DepositAccount>),
) -> Option<CustomerHoldings> {
    let fetched = state
        .backend
        .list_deposits(kind, customer_id)
        .await
        .inspect_err(|error| {
            tracing::warn!(
                "could not reload {} accounts of customer {customer_id}: {error}",
                kind.abbreviation()
            )
        })
        .ok();
    let cache = state.holdings.get(kind);

    let written = cache.write_through(|all: &mut Vec<CustomerHoldings>| {
        if let Some(holdings) = all
            .iter_mut()
            .find(|holdings| holdings.customer.user_id == customer_id)
        {
            match fetched {
                Some(accounts) => holdings.accounts = accounts,
                None => optimistic(&mut holdings.accounts),
            }
        }
    });
    if let Err(error) = written {
        tracing::warn!("could not update the cached holdings of customer {customer_id}: {error}");
        return None;
    }

    cache
        .cache()
        .get()
        .ok()
        .flatten()?
        .into_iter()
        .find(|holdings| holdings.customer.user_id == customer_id)
}

/// The ID of the table row showing `customer_id`.
pub(super) fn row_id(kind: DepositKind, customer_id: i64) -> String {
    format!("customer-{kind}-{customer_id}")
}

fn holdings_badge(kind: DepositKind, holdings: &CustomerHoldings) -> Markup {
    let count = holdings.accounts.len();

    html! {
        @if count == 0 {
            span class=(NEW_BADGE_STYLE) { "New" }
        } @else {
            span class=(BADGE_STYLE)
            {
                (count) " " (kind.abbreviation()) @if count > 1 { "s" }
            }
        }
    }
}

/// A row of the customer table, tagged for an out-of-band swap by its ID if
/// `out_of_band` is set.
pub(super) fn customer_row(
    kind: DepositKind,
    holdings: &CustomerHoldings,
    local_offset: UtcOffset,
    out_of_band: bool,
) -> Markup {
    let customer = &holdings.customer;
    let customer_id = customer.user_id.to_string();
    let registered = format_date(parse_timestamp(&customer.created_at, local_offset), local_offset);

    let (action_label, action_url) = if holdings.has_account() {
        (
            format!("View {}s", kind.abbreviation()),
            format_endpoint(
                endpoints::CUSTOMER_DEPOSITS,
                &[kind.as_path_segment(), &customer_id],
            ),
        )
    } else {
        (
            format!("Create {}", kind.abbreviation()),
            form_url(kind, customer.user_id, None),
        )
    };

    html! {
        tr
            id=(row_id(kind, customer.user_id))
            hx-swap-oob=[out_of_band.then_some("true")]
            class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (customer.user_id) }
            th
                scope="row"
                class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
            {
                (customer.full_name()) " " (holdings_badge(kind, holdings))
            }
            td class=(TABLE_CELL_STYLE) { (customer.mobile.as_deref().unwrap_or("-")) }
            td class=(TABLE_CELL_STYLE) { (customer.email.as_deref().unwrap_or("-")) }
            td class=(TABLE_CELL_STYLE) { (customer.address.as_deref().unwrap_or("-")) }
            td class=(TABLE_CELL_STYLE) { (customer.branch.as_deref().unwrap_or("-")) }
            td class=(TABLE_CELL_STYLE) { (registered) }
            td class=(TABLE_CELL_STYLE)
            {
                button
                    type="button"
                    class=(LINK_STYLE)
                    hx-get=(action_url)
                    hx-target={ "#" (MODAL_CONTAINER_ID) }
                    hx-target-error="#alert-container"
                {
                    (action_label)
                }
            }
        }
    }
}

fn empty_message(scope: &BranchScope, searching: bool) -> &'static str {
    match scope {
        BranchScope::NoBranch => "Please select a valid branch",
        _ if searching => "No customers match your search.",
        BranchScope::AllBranches => "No customers found",
        BranchScope::Branch(_) => "No customers found for this branch",
    }
}

fn customer_rows(
    kind: DepositKind,
    customers: &[CustomerHoldings],
    empty_message: &str,
    local_offset: UtcOffset,
) -> Markup {
    html! {
        @for holdings in customers {
            (customer_row(kind, holdings, local_offset, false))
        }

        @if customers.is_empty() {
            tr
            {
                td
                    colspan=(COLUMN_COUNT)
                    class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                {
                    (empty_message)
                }
            }
        }
    }
}

/// Search the customers, keep those `scope` admits and put customers without
/// an account first.
fn visible_customers(
    holdings: Vec<CustomerHoldings>,
    spec: SearchSpec,
    scope: BranchScope,
    local_offset: UtcOffset,
) -> Vec<CustomerHoldings> {
    RecordBrowser::new(holdings, spec)
        .with_refinement(move |view| {
            view.retain(|holdings| scope.admits(holdings.customer.branch.as_deref()));
            sort_by_account_priority(view, local_offset);
        })
        .into_view()
}

fn page_description(scope: &BranchScope) -> String {
    match scope {
        BranchScope::AllBranches => "Customers across all branches.".to_owned(),
        BranchScope::Branch(branch) => format!("Customers of the {branch} branch."),
        BranchScope::NoBranch => "Your account is not assigned to a branch.".to_owned(),
    }
}

fn deposits_view(
    kind: DepositKind,
    session: &Session,
    spec: &SearchSpec,
    customers: Result<&[CustomerHoldings], &str>,
    local_offset: UtcOffset,
) -> Markup {
    let page_url = format_endpoint(endpoints::DEPOSITS_VIEW, &[kind.as_path_segment()]);
    let rows_url = format_endpoint(endpoints::DEPOSIT_ROWS, &[kind.as_path_segment()]);
    let nav_bar = NavBar::new(&page_url, &session.user.name).into_html();
    let scope = session.branch_scope();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-6xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    div
                    {
                        h1 class="text-xl font-bold" { (kind.title()) }
                        p class="text-sm text-gray-500 dark:text-gray-400" { (page_description(&scope)) }
                    }
                }

                (search_controls(
                    &rows_url,
                    &format!("#{ROWS_ID}"),
                    CustomerHoldings::SEARCH_FIELDS,
                    spec,
                    SEARCH_DEBOUNCE.as_millis(),
                ))

                @match customers {
                    Ok(customers) => {
                        section class="w-full overflow-x-auto dark:bg-gray-800"
                        {
                            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                            {
                                thead class=(TABLE_HEADER_STYLE)
                                {
                                    tr
                                    {
                                        th scope="col" class=(TABLE_CELL_STYLE) { "ID" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Mobile" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Email" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Address" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Branch" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Registered" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                                    }
                                }

                                tbody id=(ROWS_ID)
                                {
                                    (customer_rows(
                                        kind,
                                        customers,
                                        empty_message(&scope, !spec.is_blank()),
                                        local_offset,
                                    ))
                                }
                            }
                        }
                    }
                    Err(message) => { (load_error(message)) }
                }
            }
        }
    };

    base(kind.title(), &[rupee_input_styles()], &content)
}

/// Renders the page for one deposit kind, refetching every customer and
/// checking their accounts.
pub async fn get_deposits_page(
    State(state): State<DepositsState>,
    Extension(session): Extension<Session>,
    Path(kind): Path<String>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, Error> {
    let kind: DepositKind = kind.parse()?;
    let local_offset = local_offset(&state.local_timezone)?;
    let spec = query.into_spec::<CustomerHoldings>(DEFAULT_SEARCH_FIELD)?;

    let fetched = state
        .holdings
        .get(kind)
        .cache()
        .refresh(fetch_holdings(state.backend.as_ref(), kind))
        .await
        .inspect_err(|error| {
            tracing::error!("could not fetch customers for {}: {error}", kind.title())
        });

    let view = match fetched {
        Ok(holdings) => {
            let customers =
                visible_customers(holdings, spec.clone(), session.branch_scope(), local_offset);
            deposits_view(kind, &session, &spec, Ok(&customers), local_offset)
        }
        Err(_) => {
            let message = format!(
                "Failed to fetch {} accounts data. Try refreshing the page.",
                kind.abbreviation()
            );
            deposits_view(kind, &session, &spec, Err(&message), local_offset)
        }
    };

    Ok(view.into_response())
}

/// Renders the rows of the customer table that match the search.
pub async fn get_deposit_rows(
    State(state): State<DepositsState>,
    Extension(session): Extension<Session>,
    Path(kind): Path<DepositKind>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let result = async {
        let local_offset = local_offset(&state.local_timezone)?;
        let spec = query.into_spec::<CustomerHoldings>(DEFAULT_SEARCH_FIELD)?;
        let holdings = state
            .holdings
            .get(kind)
            .cache()
            .get_or_refresh(fetch_holdings(state.backend.as_ref(), kind))
            .await?;
        let scope = session.branch_scope();
        let message = empty_message(&scope, !spec.is_blank());
        let customers = visible_customers(holdings, spec, scope, local_offset);

        Ok::<_, Error>(customer_rows(kind, &customers, message, local_offset))
    }
    .await;

    match result {
        Ok(rows) => rows.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

#[cfg(test)]
mod deposits_page_tests {
    use std::sync::Arc;

    use axum::{
        Extension,
        extract::{FromRef, Path, Query, State},
        http::StatusCode,
    };
    use scraper::{Html, Selector};

    use crate::{
        Error,
        backend::{BackendError, FakeBackend, StaffRole},
        deposit_kind::DepositKind,
        search::SearchQuery,
        test_utils::{
            assert_valid_html, must_get_text, parse_html_document, parse_html_rows,
            staff_session, test_app_state,
        },
    };

    use super::{DepositsState, get_deposit_rows, get_deposits_page};

    fn get_test_state() -> (DepositsState, Arc<FakeBackend>) {
        let backend = Arc::new(FakeBackend::default());
        backend.add_customer(1, "Amit", "Pune");
        backend.add_customer(2, "Sunita", "Pune");
        backend.add_customer(3, "Ravi", "Nashik");
        backend.add_customer(4, "Meera", "Pune");
        backend.add_deposit(DepositKind::Fixed, 4, "FD0001", 5000.0);
        backend.add_deposit(DepositKind::Fixed, 4, "FD0002", 8000.0);

        (DepositsState::from_ref(&test_app_state(backend.clone())), backend)
    }

    fn query(q: &str, field: &str) -> Query<SearchQuery> {
        Query(SearchQuery {
            q: q.to_owned(),
            field: field.to_owned(),
        })
    }

    fn row_ids(html: &Html) -> Vec<String> {
        html.select(&Selector::parse("tr[id^='customer-']").unwrap())
            .filter_map(|row| row.value().attr("id").map(str::to_owned))
            .collect()
    }

    #[tokio::test]
    async fn branch_staff_see_own_branch_new_customers_first() {
        let (state, _) = get_test_state();

        let response = get_deposits_page(
            State(state),
            Extension(staff_session(StaffRole::Admin, Some("Pune"))),
            Path("fixed".to_owned()),
            query("", ""),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(
            row_ids(&html),
            vec!["customer-fixed-2", "customer-fixed-1", "customer-fixed-4"]
        );
        assert_eq!(must_get_text(&html, "#customer-fixed-2 th span"), "New");
        assert_eq!(must_get_text(&html, "#customer-fixed-4 th span"), "2 FDs");
    }

    #[tokio::test]
    async fn super_admin_sees_every_branch() {
        let (state, _) = get_test_state();

        let response = get_deposit_rows(
            State(state),
            Extension(staff_session(StaffRole::SuperAdmin, None)),
            Path(DepositKind::Fixed),
            query("", ""),
        )
        .await;

        let html = parse_html_rows(response).await;
        assert_eq!(row_ids(&html).len(), 4);
    }

    #[tokio::test]
    async fn staff_without_branch_are_asked_to_select_one() {
        let (state, _) = get_test_state();

        let response = get_deposit_rows(
            State(state),
            Extension(staff_session(StaffRole::Staff, None)),
            Path(DepositKind::Recurring),
            query("", ""),
        )
        .await;

        let html = parse_html_rows(response).await;
        assert!(row_ids(&html).is_empty());
        assert_eq!(must_get_text(&html, "td"), "Please select a valid branch");
    }

    #[tokio::test]
    async fn rows_search_by_mobile() {
        let (state, _) = get_test_state();

        let response = get_deposit_rows(
            State(state),
            Extension(staff_session(StaffRole::SuperAdmin, None)),
            Path(DepositKind::Fixed),
            query("0003", "mobile"),
        )
        .await;

        let html = parse_html_rows(response).await;
        assert_eq!(row_ids(&html), vec!["customer-fixed-3"]);
    }

    #[tokio::test]
    async fn unknown_kind_is_not_found() {
        let (state, _) = get_test_state();

        let result = get_deposits_page(
            State(state),
            Extension(staff_session(StaffRole::Admin, Some("Pune"))),
            Path("savings".to_owned()),
            query("", ""),
        )
        .await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }

    #[tokio::test]
    async fn failed_customer_fetch_shows_error() {
        let (state, backend) = get_test_state();
        backend.fail_reads(BackendError::Timeout);

        let response = get_deposits_page(
            State(state),
            Extension(staff_session(StaffRole::Admin, Some("Pune"))),
            Path("recurring".to_owned()),
            query("", ""),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert!(must_get_text(&html, "p[role='alert']").starts_with("Failed to fetch RD accounts data"));
    }
}
