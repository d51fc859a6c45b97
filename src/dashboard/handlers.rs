//! The dashboard page handler and its views.

use std::sync::Arc;

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::UtcOffset;

use crate::{
    AppState, Error,
    auth::{BranchScope, Session},
    backend::{
        AccountTrend, Backend, BackendError, ChartSlice, Customer, DashboardStats, LoanTrend,
    },
    dashboard::{
        cards::stat_cards_view,
        charts::{
            DashboardChart, account_distribution_chart, account_growth_chart, charts_script,
            charts_view, loan_activity_chart, loan_types_chart,
        },
        tables::recent_customers_table,
    },
    endpoints,
    html::{HeadElement, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    timezone::local_offset,
};

const ECHARTS_SCRIPT: &str = "/static/echarts.6.0.0.min.js";

/// The state needed for displaying the dashboard page.
#[derive(Clone)]
pub struct DashboardState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
    /// The REST backend.
    pub backend: Arc<dyn Backend>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            backend: state.backend.clone(),
        }
    }
}

/// Everything the backend reports for the dashboard.
struct DashboardData {
    stats: DashboardStats,
    account_trends: Vec<AccountTrend>,
    loan_trends: Vec<LoanTrend>,
    loan_types: Vec<ChartSlice>,
    account_distribution: Vec<ChartSlice>,
    recent_customers: Vec<Customer>,
}

/// Fetch the six dashboard reports at once for `branch`, or for every branch if `None`.
async fn fetch_dashboard_data(
    backend: &dyn Backend,
    branch: Option<&str>,
) -> Result<DashboardData, BackendError> {
    let (stats, account_trends, loan_trends, loan_types, account_distribution, recent_customers) =
        tokio::try_join!(
            backend.dashboard_stats(branch),
            backend.account_trends(branch),
            backend.loan_trends(branch),
            backend.loan_types(branch),
            backend.account_distribution(branch),
            backend.recent_customers(branch)
        )?;

    Ok(DashboardData {
        stats,
        account_trends,
        loan_trends,
        loan_types,
        account_distribution,
        recent_customers,
    })
}

/// Display the branch totals, trend charts and newest customers.
///
/// Super admins see every branch. Staff without a branch see a notice
/// instead, and the backend is not asked.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(session): Extension<Session>,
) -> Result<Response, Error> {
    let local_offset = local_offset(&state.local_timezone)?;
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW, &session.user.name);
    let scope = session.branch_scope();

    let branch = match &scope {
        BranchScope::AllBranches => None,
        BranchScope::Branch(branch) => Some(branch.as_str()),
        BranchScope::NoBranch => {
            tracing::warn!("{} has no branch, not loading the dashboard", session.user.name);
            return Ok(dashboard_notice_view(
                nav_bar,
                "No Branch Assigned",
                "Your account is not linked to a branch. Ask a super admin to assign one.",
            )
            .into_response());
        }
    };

    let data = match fetch_dashboard_data(state.backend.as_ref(), branch).await {
        Ok(data) => data,
        Err(error) => {
            tracing::error!("could not fetch dashboard data for branch {branch:?}: {error}");
            return Ok(dashboard_notice_view(
                nav_bar,
                "No Data Available",
                "We couldn't fetch the dashboard data. Please try again later.",
            )
            .into_response());
        }
    };

    Ok(dashboard_view(nav_bar, data, &scope, local_offset).into_response())
}

fn build_dashboard_charts(data: &DashboardData) -> [DashboardChart; 4] {
    [
        DashboardChart {
            id: "account-growth-chart",
            options: account_growth_chart(&data.account_trends).to_string(),
        },
        DashboardChart {
            id: "loan-activity-chart",
            options: loan_activity_chart(&data.loan_trends).to_string(),
        },
        DashboardChart {
            id: "account-distribution-chart",
            options: account_distribution_chart(&data.account_distribution).to_string(),
        },
        DashboardChart {
            id: "loan-types-chart",
            options: loan_types_chart(&data.loan_types).to_string(),
        },
    ]
}

fn dashboard_view(
    nav_bar: NavBar,
    data: DashboardData,
    scope: &BranchScope,
    local_offset: UtcOffset,
) -> Markup {
    let charts = build_dashboard_charts(&data);
    let recent_customers: Vec<Customer> = data
        .recent_customers
        .into_iter()
        .filter(|customer| scope.admits(customer.branch.as_deref()))
        .collect();
    let subtitle = match scope {
        BranchScope::Branch(branch) => branch.as_str(),
        _ => "All branches",
    };

    let content = html!(
        (nav_bar.into_html())

        main
            id="dashboard-content"
            class={ (PAGE_CONTAINER_STYLE) " max-w-screen-xl" }
        {
            header class="w-full flex justify-between items-baseline mb-4"
            {
                h1 class="text-xl font-bold" { "Dashboard" }
                span class="text-sm text-gray-600 dark:text-gray-400" { (subtitle) }
            }

            (stat_cards_view(&data.stats))
            (charts_view(&charts))
            (recent_customers_table(&recent_customers, local_offset))
        }
    );

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_SCRIPT.to_owned()),
        charts_script(&charts),
    ];

    base("Dashboard", &scripts, &content)
}

fn dashboard_notice_view(nav_bar: NavBar, title: &str, message: &str) -> Markup {
    let content = html!(
        (nav_bar.into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            section
                id="dashboard-notice"
                class="flex flex-col items-center bg-white dark:bg-gray-800 rounded-lg shadow-md p-6"
            {
                h2 class="text-xl font-semibold mb-2" { (title) }
                p class="text-center text-gray-600 dark:text-gray-400" { (message) }
            }
        }
    );

    base("Dashboard", &[], &content)
}
