//! Lists sanctioned loans with a search across application number, member
//! name and mobile, narrowed by an exact branch filter.

use std::{borrow::Cow, sync::Arc};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use time::UtcOffset;

use crate::{
    AppState, Error,
    auth::Session,
    backend::{Backend, Loan},
    browser::RecordBrowser,
    cache::RefreshingCache,
    debounce::LOANS_SEARCH_DEBOUNCE,
    endpoints,
    html::{
        BADGE_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, MODAL_CONTAINER_ID, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency, format_date,
        load_error, search_controls,
    },
    navigation::NavBar,
    search::{SearchField, SearchQuery, SearchSpec, Searchable},
    timestamp::parse_timestamp,
    timezone::local_offset,
};

impl Searchable for Loan {
    const SEARCH_FIELDS: &'static [SearchField] = &[
        SearchField::ApplicationNumber,
        SearchField::Name,
        SearchField::Mobile,
    ];

    fn search_value(&self, field: SearchField) -> Option<Cow<'_, str>> {
        match field {
            SearchField::ApplicationNumber => Some(Cow::Borrowed(&self.application_no)),
            SearchField::Name => Some(Cow::Borrowed(&self.member_name)),
            SearchField::Mobile => self.mobile.as_deref().map(Cow::Borrowed),
            _ => None,
        }
    }
}

const DEFAULT_SEARCH_FIELD: SearchField = SearchField::All;
const ROWS_ID: &str = "loan-rows";
const BRANCH_FILTER_ID: &str = "branch-filter";
const COLUMN_COUNT: u8 = 8;

/// The state needed by the loans page and the loan profile.
#[derive(Clone)]
pub struct LoansState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
    /// The REST backend.
    pub backend: Arc<dyn Backend>,
    /// The last known sanctioned loans.
    pub loans: RefreshingCache<Vec<Loan>>,
}

impl FromRef<AppState> for LoansState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            backend: state.backend.clone(),
            loans: state.loans.clone(),
        }
    }
}

/// The search and branch filter sent by the loans page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoanQuery {
    /// The search term.
    #[serde(default)]
    pub q: String,
    /// The query value of a [SearchField]. Blank searches every field.
    #[serde(default)]
    pub field: String,
    /// The exact branch name to show. Blank shows every branch.
    #[serde(default)]
    pub branch: String,
}

impl LoanQuery {
    fn into_parts(self) -> Result<(SearchSpec, Option<String>), Error> {
        let spec = SearchQuery {
            q: self.q,
            field: self.field,
        }
        .into_spec::<Loan>(DEFAULT_SEARCH_FIELD)?;
        let branch = Some(self.branch.trim().to_owned()).filter(|branch| !branch.is_empty());

        Ok((spec, branch))
    }
}

fn visible_loans(loans: Vec<Loan>, spec: SearchSpec, branch: Option<String>) -> Vec<Loan> {
    RecordBrowser::new(loans, spec)
        .with_refinement(move |view| {
            if let Some(branch) = &branch {
                view.retain(|loan| &loan.branch_name == branch);
            }
        })
        .into_view()
}

fn loan_row(loan: &Loan, local_offset: UtcOffset) -> Markup {
    let applied = format_date(parse_timestamp(&loan.applied_date, local_offset), local_offset);
    let profile_url = endpoints::format_endpoint(endpoints::LOAN_PROFILE, &[&loan.id.to_string()]);

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (loan.application_no) }
            th
                scope="row"
                class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
            {
                (loan.member_name)
            }
            td class="px-6 py-4 hidden md:table-cell" { (loan.purpose_of_loan.as_deref().unwrap_or("-")) }
            td class="px-6 py-4 text-right tabular-nums" { (format_currency(loan.loan_amount)) }
            td class="px-6 py-4 hidden lg:table-cell" { (loan.roi) "%" }
            td class="px-6 py-4 hidden xl:table-cell" { (applied) }
            td class=(TABLE_CELL_STYLE) { span class=(BADGE_STYLE) { (loan.branch_name) } }
            td class=(TABLE_CELL_STYLE)
            {
                button
                    type="button"
                    class=(LINK_STYLE)
                    hx-get=(profile_url)
                    hx-target={ "#" (MODAL_CONTAINER_ID) }
                    hx-target-error="#alert-container"
                {
                    "View"
                }
            }
        }
    }
}

fn loan_rows(loans: &[Loan], local_offset: UtcOffset) -> Markup {
    html! {
        @for loan in loans {
            (loan_row(loan, local_offset))
        }

        @if loans.is_empty() {
            tr
            {
                td
                    colspan=(COLUMN_COUNT)
                    class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                {
                    "No loans found matching your criteria"
                }
            }
        }
    }
}

fn branch_filter(branches: &[String], selected: Option<&str>) -> Markup {
    html! {
        select
            id=(BRANCH_FILTER_ID)
            name="branch"
            aria-label="Branch"
            class={ (FORM_TEXT_INPUT_STYLE) " sm:w-56" }
            hx-get=(endpoints::LOAN_ROWS)
            hx-target={ "#" (ROWS_ID) }
            hx-target-error="#alert-container"
            hx-trigger="change"
            hx-include="[name='q'], [name='field']"
        {
            option value="" selected[selected.is_none()] { "All Branches" }
            @for branch in branches {
                option value=(branch) selected[selected == Some(branch.as_str())] { (branch) }
            }
        }
    }
}

struct LoansView<'a> {
    staff_name: &'a str,
    spec: &'a SearchSpec,
    branch: Option<&'a str>,
    branches: &'a [String],
    total: usize,
}

fn loans_view(view: LoansView<'_>, loans: Result<&[Loan], &str>, local_offset: UtcOffset) -> Markup {
    let nav_bar = NavBar::new(endpoints::LOANS_VIEW, view.staff_name).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-6xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "All Sanctioned Loans (" (view.total) ")" }
                }

                div class="flex flex-col sm:flex-row gap-2"
                {
                    div class="flex-1" hx-include={ "#" (BRANCH_FILTER_ID) }
                    {
                        (search_controls(
                            endpoints::LOAN_ROWS,
                            &format!("#{ROWS_ID}"),
                            &[SearchField::All],
                            view.spec,
                            LOANS_SEARCH_DEBOUNCE.as_millis(),
                        ))
                    }

                    (branch_filter(view.branches, view.branch))
                }

                @match loans {
                    Ok(loans) => {
                        section class="w-full overflow-x-auto dark:bg-gray-800"
                        {
                            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                            {
                                thead class=(TABLE_HEADER_STYLE)
                                {
                                    tr
                                    {
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Application No" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Member Name" }
                                        th scope="col" class="px-6 py-3 hidden md:table-cell" { "Purpose of Loan" }
                                        th scope="col" class="px-6 py-3 text-right" { "Loan Amount" }
                                        th scope="col" class="px-6 py-3 hidden lg:table-cell" { "ROI" }
                                        th scope="col" class="px-6 py-3 hidden xl:table-cell" { "Applied Date" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Branch" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                                    }
                                }

                                tbody id=(ROWS_ID)
                                {
                                    (loan_rows(loans, local_offset))
                                }
                            }
                        }
                    }
                    Err(message) => { (load_error(message)) }
                }
            }
        }
    };

    base("Loans", &[], &content)
}

/// Renders the loans page, refetching the loans and the branch list.
///
/// A failed branch fetch only leaves the branch filter with "All Branches".
pub async fn get_loans_page(
    State(state): State<LoansState>,
    Extension(session): Extension<Session>,
    Query(query): Query<LoanQuery>,
) -> Result<Response, Error> {
    let local_offset = local_offset(&state.local_timezone)?;
    let (spec, branch) = query.into_parts()?;

    let branches = state
        .backend
        .list_branches()
        .await
        .inspect_err(|error| tracing::warn!("could not fetch the branch list: {error}"))
        .unwrap_or_default();

    let fetched = {
        let backend = state.backend.clone();
        state
            .loans
            .cache()
            .refresh(async move { backend.list_loans().await })
            .await
            .inspect_err(|error| tracing::error!("could not fetch loans: {error}"))
    };

    let (total, loans) = match fetched {
        Ok(loans) => (loans.len(), Ok(visible_loans(loans, spec.clone(), branch.clone()))),
        Err(_) => (0, Err("Error loading loans: Failed to fetch data")),
    };
    let view = LoansView {
        staff_name: &session.user.name,
        spec: &spec,
        branch: branch.as_deref(),
        branches: &branches,
        total,
    };

    let loans = loans.as_deref().map_err(|message| *message);

    Ok(loans_view(view, loans, local_offset).into_response())
}

/// Renders the rows of the loans table that match the search and branch.
pub async fn get_loan_rows(State(state): State<LoansState>, Query(query): Query<LoanQuery>) -> Response {
    let result = async {
        let local_offset = local_offset(&state.local_timezone)?;
        let (spec, branch) = query.into_parts()?;
        let backend = state.backend.clone();
        let loans = state
            .loans
            .cache()
            .get_or_refresh(async move { backend.list_loans().await })
            .await?;

        Ok::<_, Error>(loan_rows(&visible_loans(loans, spec, branch), local_offset))
    }
    .await;

    match result {
        Ok(rows) => rows.into_response(),
        Err(error) => error.into_alert_response(),
    }
}
